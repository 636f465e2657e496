//! Course catalog.
//!
//! A [`Catalog`] maps course keys to their canonical requirement trees. It is
//! built once by the caller, from JSON or from course records, and then
//! shared read-only with the chain evaluator.
//!
//! Two JSON shapes are accepted:
//!
//! ```text
//! { "MATH 1200": { "type": "NONE" }, "MATH 2301": { "type": "COURSE", ... } }
//!
//! [ { "name": "Calculus I", "code": "MATH 2301",
//!     "requisite_string": "MATH 1200 or Math placement level 3" } ]
//! ```
//!
//! Records without a structured `requisite` are normalized from
//! `requisite_string`.

mod error;
mod record;
mod store;

pub use error::CatalogError;
pub use record::CourseRecord;
pub use store::Catalog;
