//! Requirement graph evaluation.
//!
//! Computes the longest chain of sequential prerequisites a student must
//! complete before enrolling in a course. A course counts one plus the chain
//! of its requirement; `AND` takes the longest child and `OR` the shortest
//! (or the longest, under [`OrPolicy::Longest`]). Non-course leaves count
//! zero.
//!
//! Courses absent from the catalog count one and are reported. Courses that
//! close a cycle are excluded from the branch that reaches them and reported;
//! the rest of the graph still evaluates.
//!
//! # Examples
//!
//! ```
//! use u_prereq::catalog::Catalog;
//! use u_prereq::chain::longest_chain;
//! use u_prereq::requirement::{CourseKey, Requirement};
//!
//! let catalog: Catalog = [
//!     (CourseKey::new("MATH", "1200"), Requirement::None),
//!     (CourseKey::new("MATH", "2301"), Requirement::course("MATH", "1200")),
//!     (CourseKey::new("MATH", "2302"), Requirement::all(vec![
//!         Requirement::course("MATH", "2301"),
//!         Requirement::course("MATH", "1200"),
//!     ])),
//! ]
//! .into_iter()
//! .collect();
//!
//! let result = longest_chain(&CourseKey::new("MATH", "2302"), &catalog);
//! assert_eq!(result.length, 3);
//! assert_eq!(result.path[1], CourseKey::new("MATH", "2301"));
//! ```

mod config;
mod runner;
mod types;

pub use config::{ChainConfig, OrPolicy};
pub use runner::ChainRunner;
pub use types::ChainResult;

use crate::catalog::Catalog;
use crate::requirement::CourseKey;

/// Longest chain ending at `target` under the default configuration.
pub fn longest_chain(target: &CourseKey, catalog: &Catalog) -> ChainResult {
    ChainRunner::run(target, catalog, &ChainConfig::default())
}
