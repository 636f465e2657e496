//! Course prerequisite normalization and chain analysis.
//!
//! - **Requirement model** ([`requirement`]): the canonical, strictly typed
//!   tree for a course's prerequisites, with its closed JSON schema, and
//!   the check of a tree against a student's record.
//! - **Normalizer** ([`normalize`]): converts free-text requisite
//!   descriptions from course catalogs into requirement trees. Total:
//!   unrecognized text degrades to `OTHER` leaves.
//! - **Catalog** ([`catalog`]): the caller-owned map from course key to
//!   requirement, built from JSON or course records.
//! - **Chain evaluator** ([`chain`]): the longest sequence of prerequisite
//!   courses ending at a target, with cycle and missing-entry reporting.
//!
//! # Examples
//!
//! ```
//! use u_prereq::{longest_chain, normalize, Catalog, CourseKey, Requirement};
//!
//! let mut catalog = Catalog::new();
//! catalog.insert(CourseKey::new("AST", "1010"), normalize("none"));
//! catalog.insert(CourseKey::new("AST", "1020"), normalize("Prereq: AST 1010."));
//! catalog.insert(
//!     CourseKey::new("AST", "2010"),
//!     normalize("AST 1020 and Soph or Jr standing"),
//! );
//!
//! let result = longest_chain(&CourseKey::new("AST", "2010"), &catalog);
//! assert_eq!(result.length, 3);
//! assert_eq!(catalog.get(&CourseKey::new("AST", "1010")), Some(&Requirement::None));
//! ```
//!
//! # Logging
//!
//! Degraded input and graph anomalies (cycles, missing entries, depth-limit
//! cut-offs) are reported through [`tracing`]. No subscriber is installed.

pub mod catalog;
pub mod chain;
pub mod normalize;
pub mod requirement;

pub use catalog::{Catalog, CatalogError, CourseRecord};
pub use chain::{longest_chain, ChainConfig, ChainResult, ChainRunner, OrPolicy};
pub use normalize::{normalize, Normalizer, NormalizerConfig};
pub use requirement::{CourseKey, Level, PlacementSubject, Requirement, StudentRecord, Timing};
