//! The catalog map.

use std::collections::{BTreeMap, HashMap};

use super::error::CatalogError;
use super::record::CourseRecord;
use crate::normalize::Normalizer;
use crate::requirement::{CourseKey, Requirement};

/// Immutable mapping from course key to requirement tree.
///
/// # Examples
///
/// ```
/// use u_prereq::catalog::Catalog;
/// use u_prereq::requirement::{CourseKey, Requirement};
///
/// let catalog = Catalog::from_json(r#"{
///     "MATH 1200": {"type": "NONE"},
///     "MATH 2301": {"type": "COURSE", "course": "MATH 1200"}
/// }"#).unwrap();
///
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(
///     catalog.get(&CourseKey::new("MATH", "2301")),
///     Some(&Requirement::course("MATH", "1200"))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: HashMap<CourseKey, Requirement>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the requirement it replaced.
    pub fn insert(&mut self, key: CourseKey, requirement: Requirement) -> Option<Requirement> {
        self.entries.insert(key, requirement)
    }

    pub fn get(&self, key: &CourseKey) -> Option<&Requirement> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &CourseKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&CourseKey, &Requirement)> {
        self.entries.iter()
    }

    /// Course keys in sorted order.
    pub fn keys(&self) -> Vec<&CourseKey> {
        let mut keys: Vec<&CourseKey> = self.entries.keys().collect();
        keys.sort();
        keys
    }

    /// Decodes either JSON shape, normalizing record text with the default
    /// normalizer.
    pub fn from_json(json: &str) -> Result<Catalog, CatalogError> {
        Self::from_json_with(json, &Normalizer::default())
    }

    /// Decodes either JSON shape, normalizing record text with `normalizer`.
    ///
    /// A top-level array is read as course records; anything else as a map
    /// from course key to requirement. Map entries are canonicalized and
    /// validated.
    pub fn from_json_with(json: &str, normalizer: &Normalizer) -> Result<Catalog, CatalogError> {
        if json.trim_start().starts_with('[') {
            let records = CourseRecord::parse_many(json)?;
            return Self::from_records(records, normalizer);
        }

        let raw: BTreeMap<String, Requirement> = serde_json::from_str(json)?;
        let mut catalog = Catalog::new();
        for (text, requirement) in raw {
            let key: CourseKey = text.parse().map_err(|source| CatalogError::InvalidKey {
                key: text.clone(),
                source,
            })?;
            let requirement = checked(&key, requirement)?;
            if catalog.insert(key.clone(), requirement).is_some() {
                tracing::warn!(course = %key, "duplicate catalog key, keeping the later entry");
            }
        }
        Ok(catalog)
    }

    /// Builds a catalog from course records.
    ///
    /// Structured requisites are canonicalized and validated; the rest are
    /// normalized from their text (absent text means no prerequisite). When
    /// two records share a code, the later one wins.
    pub fn from_records(
        records: Vec<CourseRecord>,
        normalizer: &Normalizer,
    ) -> Result<Catalog, CatalogError> {
        let texts: Vec<&str> = records
            .iter()
            .filter(|r| r.requisite.is_none())
            .map(|r| r.requisite_string.as_deref().unwrap_or(""))
            .collect();
        let mut normalized = normalizer.normalize_all(&texts).into_iter();

        let mut catalog = Catalog::new();
        for record in &records {
            let requirement = match &record.requisite {
                Some(req) => checked(&record.code, req.clone())?,
                None => normalized.next().unwrap_or_default(),
            };
            if catalog.insert(record.code.clone(), requirement).is_some() {
                tracing::warn!(
                    course = %record.code,
                    name = %record.name,
                    "duplicate course record, keeping the later entry"
                );
            }
        }
        Ok(catalog)
    }

    /// Encodes the map form with keys in sorted order.
    pub fn to_json(&self) -> String {
        let sorted: BTreeMap<String, &Requirement> = self
            .entries
            .iter()
            .map(|(key, req)| (key.to_string(), req))
            .collect();
        serde_json::to_string(&sorted).unwrap_or_else(|_| String::from("{}"))
    }

    /// Course keys referenced by some requirement but absent from the
    /// catalog, sorted and without duplicates.
    pub fn dangling_references(&self) -> Vec<CourseKey> {
        let mut missing: Vec<CourseKey> = self
            .entries
            .values()
            .flat_map(|req| req.course_keys())
            .filter(|key| !self.entries.contains_key(*key))
            .cloned()
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

impl FromIterator<(CourseKey, Requirement)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (CourseKey, Requirement)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn checked(key: &CourseKey, requirement: Requirement) -> Result<Requirement, CatalogError> {
    let requirement = requirement.canonicalize();
    requirement
        .validate()
        .map_err(|source| CatalogError::InvalidRequirement {
            course: key.clone(),
            source,
        })?;
    Ok(requirement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::{Level, Timing};

    fn key(s: &str) -> CourseKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_json_map() {
        let catalog = Catalog::from_json(
            r#"{
                "ast1010": {"type": "NONE"},
                "AST 1020": {"type": "COURSE", "course": "AST 1010", "timing": "CONCURRENT"},
                "AST 2010": {"type": "AND", "requirements": [
                    {"type": "COURSE", "course": "AST 1020"},
                    {"type": "LEVEL", "level": "Sophomore"}
                ]}
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(&key("AST 1010")), Some(&Requirement::None));
        assert_eq!(
            catalog.get(&key("AST 1020")),
            Some(&Requirement::course_with(key("AST 1010"), Timing::Concurrent))
        );
        assert_eq!(
            catalog.get(&key("AST 2010")),
            Some(&Requirement::And {
                requirements: vec![
                    Requirement::course("AST", "1020"),
                    Requirement::Level {
                        level: Level::Sophomore
                    }
                ]
            })
        );
    }

    #[test]
    fn test_from_json_canonicalizes() {
        let catalog = Catalog::from_json(
            r#"{"CS 2401": {"type": "OR", "requirements": [{"type": "COURSE", "course": "CS 2400"}]}}"#,
        )
        .unwrap();
        assert_eq!(
            catalog.get(&key("CS 2401")),
            Some(&Requirement::course("CS", "2400"))
        );
    }

    #[test]
    fn test_from_json_invalid_key() {
        let err = Catalog::from_json(r#"{"1200": {"type": "NONE"}}"#).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidKey { ref key, .. } if key == "1200"));
    }

    #[test]
    fn test_from_json_invalid_requirement() {
        let err = Catalog::from_json(r#"{"CS 2400": {"type": "GPA", "gpa": 0}}"#).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidRequirement { ref course, .. } if *course == key("CS 2400")
        ));
    }

    #[test]
    fn test_from_json_unknown_field() {
        let err = Catalog::from_json(r#"{"CS 2400": {"type": "NONE", "extra": 1}}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn test_from_json_records() {
        let catalog = Catalog::from_json(
            r#"[
                {"name": "Astronomy I", "code": "AST 1010"},
                {"name": "Astronomy II", "code": "AST 1020", "requisite_string": "Prereq: AST 1010."},
                {"name": "Seminar", "code": "AST 4900", "requisite_string": "ignored",
                 "requisite": {"type": "LEVEL", "level": "senior"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.get(&key("AST 1010")), Some(&Requirement::None));
        assert_eq!(
            catalog.get(&key("AST 1020")),
            Some(&Requirement::course("AST", "1010"))
        );
        assert_eq!(
            catalog.get(&key("AST 4900")),
            Some(&Requirement::Level {
                level: Level::Senior
            })
        );
    }

    #[test]
    fn test_duplicate_records_later_wins() {
        let records = vec![
            CourseRecord::new("Old", key("CS 2400")).with_requisite_string("CS 1000"),
            CourseRecord::new("New", key("CS 2400")).with_requisite_string("CS 1100"),
        ];
        let catalog = Catalog::from_records(records, &Normalizer::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(&key("CS 2400")),
            Some(&Requirement::course("CS", "1100"))
        );
    }

    #[test]
    fn test_to_json_round_trip() {
        let catalog: Catalog = [
            (key("MATH 1200"), Requirement::None),
            (key("MATH 2301"), Requirement::course("MATH", "1200")),
        ]
        .into_iter()
        .collect();
        let json = catalog.to_json();
        assert!(json.starts_with(r#"{"MATH 1200":"#));
        assert_eq!(Catalog::from_json(&json).unwrap(), catalog);
    }

    #[test]
    fn test_dangling_references() {
        let catalog: Catalog = [
            (key("CS 2400"), Requirement::course("CS", "1000")),
            (
                key("CS 2401"),
                Requirement::all(vec![
                    Requirement::course("CS", "2400"),
                    Requirement::course("MATH", "1200"),
                    Requirement::course("CS", "1000"),
                ]),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            catalog.dangling_references(),
            vec![key("CS 1000"), key("MATH 1200")]
        );
    }

    #[test]
    fn test_keys_sorted() {
        let catalog: Catalog = [
            (key("MATH 2301"), Requirement::None),
            (key("CS 2400"), Requirement::None),
        ]
        .into_iter()
        .collect();
        assert_eq!(catalog.keys(), vec![&key("CS 2400"), &key("MATH 2301")]);
    }
}
