//! Course records as exported by catalog scrapers.

use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use crate::requirement::{CourseKey, Requirement};

/// One course as listed in a catalog export.
///
/// `requisite` takes precedence over `requisite_string` when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Course title.
    pub name: String,

    /// Course key, e.g. `"MATH 2301"`.
    pub code: CourseKey,

    /// Requisite text as printed in the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requisite_string: Option<String>,

    /// Already-structured requisite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requisite: Option<Requirement>,
}

impl CourseRecord {
    pub fn new(name: impl Into<String>, code: CourseKey) -> Self {
        Self {
            name: name.into(),
            code,
            requisite_string: None,
            requisite: None,
        }
    }

    pub fn with_requisite_string(mut self, text: impl Into<String>) -> Self {
        self.requisite_string = Some(text.into());
        self
    }

    pub fn with_requisite(mut self, requisite: Requirement) -> Self {
        self.requisite = Some(requisite);
        self
    }

    /// Decodes a JSON array of records.
    pub fn parse_many(json: &str) -> Result<Vec<CourseRecord>, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }
}
