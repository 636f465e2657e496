//! Checking requirements against a student's record.

use std::collections::{HashMap, HashSet};

use super::key::CourseKey;
use super::types::{Level, PlacementSubject, Requirement, Timing};

/// What a student has completed, is enrolled in, and has been granted.
///
/// # Examples
///
/// ```
/// use u_prereq::requirement::{CourseKey, Level, Requirement, StudentRecord};
///
/// let record = StudentRecord::new()
///     .with_completed([CourseKey::new("MATH", "1200")])
///     .with_level(Level::Junior);
///
/// let req = Requirement::all(vec![
///     Requirement::course("MATH", "1200"),
///     Requirement::Level { level: Level::Sophomore },
/// ]);
/// assert!(req.is_satisfied(&record));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    /// Courses finished in earlier terms.
    pub completed: HashSet<CourseKey>,
    /// Courses taken in the term being planned.
    pub concurrent: HashSet<CourseKey>,
    /// Cumulative GPA, if known.
    pub gpa: Option<f64>,
    /// Class standing.
    pub level: Level,
    /// Placement results by subject.
    pub placements: HashMap<PlacementSubject, String>,
    /// Authorities that have granted permission.
    pub permissions: HashSet<String>,
}

impl Default for StudentRecord {
    fn default() -> Self {
        Self {
            completed: HashSet::new(),
            concurrent: HashSet::new(),
            gpa: None,
            level: Level::Freshman,
            placements: HashMap::new(),
            permissions: HashSet::new(),
        }
    }
}

impl StudentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completed(mut self, courses: impl IntoIterator<Item = CourseKey>) -> Self {
        self.completed.extend(courses);
        self
    }

    pub fn with_concurrent(mut self, courses: impl IntoIterator<Item = CourseKey>) -> Self {
        self.concurrent.extend(courses);
        self
    }

    pub fn with_gpa(mut self, gpa: f64) -> Self {
        self.gpa = Some(gpa);
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the standing from earned credit hours.
    pub fn with_credits(mut self, credits: u32) -> Self {
        self.level = Level::from_credits(credits);
        self
    }

    pub fn with_placement(mut self, subject: PlacementSubject, level: impl Into<String>) -> Self {
        self.placements.insert(subject, level.into());
        self
    }

    pub fn with_permission(mut self, authority: impl Into<String>) -> Self {
        self.permissions.insert(authority.into());
        self
    }

    fn has_course(&self, course: &CourseKey, timing: Timing) -> bool {
        match timing {
            Timing::Completed => self.completed.contains(course),
            Timing::Concurrent => self.concurrent.contains(course),
            Timing::ConcurrentOrCompleted => {
                self.completed.contains(course) || self.concurrent.contains(course)
            }
        }
    }

    fn has_permission(&self, authority: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| granted.eq_ignore_ascii_case(authority))
    }

    fn has_placement(&self, subject: PlacementSubject, required: &str) -> bool {
        self.placements
            .get(&subject)
            .is_some_and(|placed| placement_rank(placed) >= placement_rank(required))
    }
}

/// Numeric placement levels compare by value; "DV" (developmental) and
/// anything unparseable rank lowest.
fn placement_rank(level: &str) -> f64 {
    level.trim().parse::<f64>().unwrap_or(0.0)
}

impl Requirement {
    /// The part of this requirement `record` does not yet meet, in canonical
    /// form. [`Requirement::None`] means fully satisfied.
    ///
    /// `OTHER` leaves count as met; `PERMISSION` is met only when the record
    /// holds a matching grant.
    pub fn remaining(&self, record: &StudentRecord) -> Requirement {
        let met = match self {
            Requirement::None | Requirement::Other { .. } => true,
            Requirement::Permission { authority } => record.has_permission(authority),
            Requirement::Gpa { gpa } => record.gpa.is_some_and(|have| have >= *gpa),
            Requirement::Level { level } => record.level >= *level,
            Requirement::Course { course, timing } => record.has_course(course, *timing),
            Requirement::Placement { subject, level } => record.has_placement(*subject, level),
            Requirement::And { requirements } => {
                return Requirement::all(requirements.iter().map(|r| r.remaining(record)).collect())
            }
            Requirement::Or { requirements } => {
                return Requirement::any(requirements.iter().map(|r| r.remaining(record)).collect())
            }
        };
        if met {
            Requirement::None
        } else {
            self.clone()
        }
    }

    /// Whether `record` meets this requirement.
    pub fn is_satisfied(&self, record: &StudentRecord) -> bool {
        self.remaining(record).is_none()
    }
}
