//! Structural validation of requirement trees.

use thiserror::Error;

use super::types::Requirement;

/// A violation of the canonical requirement invariants.
///
/// `path` locates the offending node in JSONPath-like notation, e.g.
/// `$.requirements[1].requirements[0]`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A connective with fewer than two children.
    #[error("{path}: {kind} has {found} requirement(s), expected at least 2")]
    TooFewChildren {
        path: String,
        kind: &'static str,
        found: usize,
    },

    /// A connective that directly contains the same connective.
    #[error("{path}: {kind} directly contains another {kind}")]
    Unflattened { path: String, kind: &'static str },

    /// `NONE` nested inside a connective.
    #[error("{path}: NONE is not allowed inside {kind}")]
    NestedNone { path: String, kind: &'static str },

    /// A GPA that is not a positive finite number.
    #[error("{path}: GPA must be a positive finite number, got {gpa}")]
    InvalidGpa { path: String, gpa: f64 },

    /// A course key with a non-alphabetic subject or non-alphanumeric number.
    #[error("{path}: invalid course key {course:?}")]
    InvalidCourse { path: String, course: String },

    /// A required text field is blank.
    #[error("{path}: {field} must not be empty")]
    EmptyField { path: String, field: &'static str },
}

impl Requirement {
    /// Checks every node against the canonical invariants, returning the
    /// first violation in depth-first order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_node(self, "$")
    }
}

fn validate_node(req: &Requirement, path: &str) -> Result<(), ValidationError> {
    match req {
        Requirement::None | Requirement::Level { .. } => Ok(()),
        Requirement::Permission { authority } => non_empty(authority, path, "authority"),
        Requirement::Gpa { gpa } => {
            if gpa.is_finite() && *gpa > 0.0 {
                Ok(())
            } else {
                Err(ValidationError::InvalidGpa {
                    path: path.to_string(),
                    gpa: *gpa,
                })
            }
        }
        Requirement::Course { course, .. } => {
            let subject_ok = !course.subject().is_empty()
                && course.subject().chars().all(|c| c.is_ascii_uppercase());
            let number_ok = !course.number().is_empty()
                && course
                    .number()
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase());
            if subject_ok && number_ok {
                Ok(())
            } else {
                Err(ValidationError::InvalidCourse {
                    path: path.to_string(),
                    course: course.to_string(),
                })
            }
        }
        Requirement::Placement { level, .. } => non_empty(level, path, "level"),
        Requirement::Other { other } => non_empty(other, path, "other"),
        Requirement::And { requirements } | Requirement::Or { requirements } => {
            let kind = req.type_name();
            if requirements.len() < 2 {
                return Err(ValidationError::TooFewChildren {
                    path: path.to_string(),
                    kind,
                    found: requirements.len(),
                });
            }
            for (i, child) in requirements.iter().enumerate() {
                let child_path = format!("{path}.requirements[{i}]");
                if child.is_none() {
                    return Err(ValidationError::NestedNone {
                        path: child_path,
                        kind,
                    });
                }
                if child.type_name() == kind {
                    return Err(ValidationError::Unflattened {
                        path: child_path,
                        kind,
                    });
                }
                validate_node(child, &child_path)?;
            }
            Ok(())
        }
    }
}

fn non_empty(value: &str, path: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField {
            path: path.to_string(),
            field,
        })
    } else {
        Ok(())
    }
}
