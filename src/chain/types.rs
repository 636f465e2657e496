//! Chain evaluation result.

use serde::Serialize;

use crate::requirement::CourseKey;

/// The longest prerequisite chain ending at a target course.
///
/// Serializes as `{"length", "path", "terms", "cycles"?, "missing"?,
/// "truncated"?}`; the optional fields are omitted when empty or false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainResult {
    /// Number of courses on the selected path, the target included.
    pub length: usize,

    /// Courses on the selected path, target first.
    pub path: Vec<CourseKey>,

    /// Sequential terms needed along the path. A course that may only be
    /// taken concurrently with its dependent shares that course's term.
    pub terms: usize,

    /// Courses excluded because they close a prerequisite cycle, in
    /// discovery order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<CourseKey>,

    /// Referenced courses that have no catalog entry, in discovery order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<CourseKey>,

    /// Whether some branch exceeded the depth limit.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl ChainResult {
    /// Whether the evaluation saw no cycles, missing entries, or truncation.
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.missing.is_empty() && !self.truncated
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}
