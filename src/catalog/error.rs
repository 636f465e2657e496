//! Catalog construction errors.

use thiserror::Error;

use crate::requirement::{CourseKey, CourseKeyError, ValidationError};

/// Error returned when a catalog cannot be built.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The input is not valid catalog JSON.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A map key is not a course key.
    #[error("invalid course key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: CourseKeyError,
    },

    /// A structured requirement violates the canonical invariants.
    #[error("invalid requirement for {course}: {source}")]
    InvalidRequirement {
        course: CourseKey,
        #[source]
        source: ValidationError,
    },
}
