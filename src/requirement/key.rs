//! Course keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a course key cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseKeyError {
    /// The text is empty or whitespace only.
    #[error("course key is empty")]
    Empty,

    /// The text has no alphabetic subject prefix.
    #[error("course key {0:?} has no subject")]
    MissingSubject(String),

    /// The text has no number after the subject.
    #[error("course key {0:?} has no number")]
    MissingNumber(String),

    /// The text contains characters outside `[A-Za-z0-9 ]`.
    #[error("course key {0:?} contains invalid characters")]
    InvalidCharacters(String),
}

/// Identifies a course in the catalog by subject code and number.
///
/// The textual form is `"SUBJECT NUMBER"`, e.g. `"MATH 1200"`. Parsing is
/// case-insensitive and tolerates a missing space (`"cs101"` parses as
/// `CS 101`); the stored subject and number are always uppercase.
///
/// # Examples
///
/// ```
/// use u_prereq::requirement::CourseKey;
///
/// let key: CourseKey = "math 1200l".parse().unwrap();
/// assert_eq!(key.subject(), "MATH");
/// assert_eq!(key.number(), "1200L");
/// assert_eq!(key.to_string(), "MATH 1200L");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseKey {
    subject: String,
    number: String,
}

impl CourseKey {
    /// Creates a key from already-separated parts, uppercasing both.
    pub fn new(subject: impl AsRef<str>, number: impl AsRef<str>) -> Self {
        Self {
            subject: subject.as_ref().trim().to_ascii_uppercase(),
            number: number.as_ref().trim().to_ascii_uppercase(),
        }
    }

    /// Department code, e.g. `"MATH"`.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Course number, e.g. `"1200L"`.
    pub fn number(&self) -> &str {
        &self.number
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.subject, self.number)
    }
}

impl FromStr for CourseKey {
    type Err = CourseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CourseKeyError::Empty);
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ')
        {
            return Err(CourseKeyError::InvalidCharacters(trimmed.to_string()));
        }

        // Subject is the leading alphabetic run; the rest is the number.
        let split = trimmed
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (subject, rest) = trimmed.split_at(split);
        let number: String = rest.chars().filter(|c| *c != ' ').collect();

        if subject.is_empty() {
            return Err(CourseKeyError::MissingSubject(trimmed.to_string()));
        }
        if number.is_empty() {
            return Err(CourseKeyError::MissingNumber(trimmed.to_string()));
        }
        Ok(Self::new(subject, number))
    }
}

impl TryFrom<String> for CourseKey {
    type Error = CourseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CourseKey> for String {
    fn from(key: CourseKey) -> Self {
        key.to_string()
    }
}
