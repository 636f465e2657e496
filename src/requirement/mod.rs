//! Canonical requirement model.
//!
//! A [`Requirement`] is a closed tagged tree describing what a student must
//! satisfy before enrolling in a course: courses (with a timing qualifier),
//! class standing, GPA, placement results, permission, free text, and
//! `AND`/`OR` combinations of those.
//!
//! Trees are canonical when every connective holds at least two children and
//! same-connective runs are flattened. [`Requirement::canonicalize`] produces
//! that form and [`Requirement::validate`] checks it.
//! [`Requirement::is_satisfied`] checks a tree against a [`StudentRecord`].

mod canonical;
mod key;
mod satisfy;
mod types;
mod validate;

pub use key::{CourseKey, CourseKeyError};
pub use satisfy::StudentRecord;
pub use types::{Level, PlacementSubject, Requirement, Timing};
pub use validate::ValidationError;
