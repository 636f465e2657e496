//! Requirement AST.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::key::CourseKey;

/// When a referenced course must be taken relative to the gated course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Timing {
    /// Must be finished before enrolling.
    #[default]
    Completed,
    /// Must be taken in the same term.
    Concurrent,
    /// Either finished before or taken in the same term.
    ConcurrentOrCompleted,
}

/// Class standing.
///
/// Ordered from `Freshman` (lowest) to `Senior` (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "Freshman", alias = "FRESHMAN")]
    Freshman,
    #[serde(alias = "Sophomore", alias = "SOPHOMORE")]
    Sophomore,
    #[serde(alias = "Junior", alias = "JUNIOR")]
    Junior,
    #[serde(alias = "Senior", alias = "SENIOR")]
    Senior,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 4] = [
        Level::Freshman,
        Level::Sophomore,
        Level::Junior,
        Level::Senior,
    ];

    /// Lowercase name used in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Freshman => "freshman",
            Level::Sophomore => "sophomore",
            Level::Junior => "junior",
            Level::Senior => "senior",
        }
    }

    /// Earned credit hours a student must exceed to hold this standing
    /// (freshman needs none).
    pub fn min_credits(self) -> u32 {
        match self {
            Level::Freshman => 0,
            Level::Sophomore => 30,
            Level::Junior => 60,
            Level::Senior => 90,
        }
    }

    /// Standing reached with the given number of earned credits.
    pub fn from_credits(credits: u32) -> Level {
        Level::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| *level == Level::Freshman || credits > level.min_credits())
            .unwrap_or(Level::Freshman)
    }

    /// Recognizes a single level word or abbreviation ("Jr", "soph.",
    /// "Seniors", "first-year").
    pub fn from_word(word: &str) -> Option<Level> {
        let w = word.trim().trim_end_matches('.').to_ascii_lowercase();
        match w.as_str() {
            "fr" | "fresh" | "freshman" | "freshmen" | "first-year" | "first year" => {
                Some(Level::Freshman)
            }
            "so" | "soph" | "sophomore" | "sophomores" => Some(Level::Sophomore),
            "jr" | "junior" | "juniors" => Some(Level::Junior),
            "sr" | "senior" | "seniors" => Some(Level::Senior),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::from_word(s).ok_or_else(|| format!("unknown level {s:?}"))
    }
}

/// Subjects that offer a placement exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementSubject {
    Math,
    #[serde(rename = "Computer Science")]
    ComputerScience,
    Chemistry,
    #[serde(rename = "HTC Chemistry")]
    HtcChemistry,
    #[serde(rename = "Music Theory")]
    MusicTheory,
    Arabic,
    Chinese,
    French,
    German,
    Greek,
    Hebrew,
    Italian,
    Japanese,
    Latin,
    Portuguese,
    Russian,
    Spanish,
}

impl PlacementSubject {
    /// Every placement subject.
    pub const ALL: [PlacementSubject; 17] = [
        PlacementSubject::Math,
        PlacementSubject::ComputerScience,
        PlacementSubject::Chemistry,
        PlacementSubject::HtcChemistry,
        PlacementSubject::MusicTheory,
        PlacementSubject::Arabic,
        PlacementSubject::Chinese,
        PlacementSubject::French,
        PlacementSubject::German,
        PlacementSubject::Greek,
        PlacementSubject::Hebrew,
        PlacementSubject::Italian,
        PlacementSubject::Japanese,
        PlacementSubject::Latin,
        PlacementSubject::Portuguese,
        PlacementSubject::Russian,
        PlacementSubject::Spanish,
    ];

    /// Display name, identical to the JSON form.
    pub fn name(self) -> &'static str {
        match self {
            PlacementSubject::Math => "Math",
            PlacementSubject::ComputerScience => "Computer Science",
            PlacementSubject::Chemistry => "Chemistry",
            PlacementSubject::HtcChemistry => "HTC Chemistry",
            PlacementSubject::MusicTheory => "Music Theory",
            PlacementSubject::Arabic => "Arabic",
            PlacementSubject::Chinese => "Chinese",
            PlacementSubject::French => "French",
            PlacementSubject::German => "German",
            PlacementSubject::Greek => "Greek",
            PlacementSubject::Hebrew => "Hebrew",
            PlacementSubject::Italian => "Italian",
            PlacementSubject::Japanese => "Japanese",
            PlacementSubject::Latin => "Latin",
            PlacementSubject::Portuguese => "Portuguese",
            PlacementSubject::Russian => "Russian",
            PlacementSubject::Spanish => "Spanish",
        }
    }

    /// Matches a subject name case-insensitively ("math", "Mathematics",
    /// "computer science").
    pub fn from_name(name: &str) -> Option<PlacementSubject> {
        let n = name.trim().to_ascii_lowercase();
        match n.as_str() {
            "mathematics" => return Some(PlacementSubject::Math),
            "chem" => return Some(PlacementSubject::Chemistry),
            _ => {}
        }
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(&n))
    }

    /// Matches the catalog abbreviation used in "MATH PL2" style phrasing.
    pub fn from_abbreviation(abbr: &str) -> Option<PlacementSubject> {
        let a = abbr.trim().to_ascii_uppercase();
        let subject = match a.as_str() {
            "MATH" | "MTH" => PlacementSubject::Math,
            "CS" => PlacementSubject::ComputerScience,
            "CHEM" => PlacementSubject::Chemistry,
            "HTCC" | "HTCCHEM" => PlacementSubject::HtcChemistry,
            "MUS" | "MUTH" | "MUSTH" => PlacementSubject::MusicTheory,
            "ARAB" => PlacementSubject::Arabic,
            "CHIN" => PlacementSubject::Chinese,
            "FR" | "FREN" => PlacementSubject::French,
            "GER" | "GERM" => PlacementSubject::German,
            "GK" | "GRK" => PlacementSubject::Greek,
            "HEBR" => PlacementSubject::Hebrew,
            "ITAL" => PlacementSubject::Italian,
            "JPNS" | "JAPN" => PlacementSubject::Japanese,
            "LAT" => PlacementSubject::Latin,
            "PORT" => PlacementSubject::Portuguese,
            "RUS" => PlacementSubject::Russian,
            "SPAN" => PlacementSubject::Spanish,
            _ => return None,
        };
        Some(subject)
    }
}

impl fmt::Display for PlacementSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the canonical requirement tree.
///
/// Serializes to the closed JSON schema:
///
/// ```text
/// { "type": "NONE" }
/// { "type": "PERMISSION", "authority": "Instructor" }
/// { "type": "GPA", "gpa": 2.5 }
/// { "type": "LEVEL", "level": "junior" }
/// { "type": "COURSE", "course": "MATH 1200", "timing": "COMPLETED" }
/// { "type": "PLACEMENT", "subject": "Math", "level": "3" }
/// { "type": "OTHER", "other": "free text" }
/// { "type": "AND", "requirements": [ ... ] }
/// { "type": "OR", "requirements": [ ... ] }
/// ```
///
/// Trees produced by this crate are canonical: connectives hold at least two
/// children, same-connective runs are flattened, and `None` never appears
/// inside a connective. See [`Requirement::canonicalize`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    deny_unknown_fields
)]
pub enum Requirement {
    /// No prerequisite.
    #[default]
    None,
    /// Sign-off from an instructor, department, or similar authority.
    Permission { authority: String },
    /// Minimum cumulative GPA.
    Gpa { gpa: f64 },
    /// Minimum class standing.
    Level { level: Level },
    /// A course, taken with the given timing.
    Course {
        course: CourseKey,
        #[serde(default)]
        timing: Timing,
    },
    /// A placement exam result.
    Placement {
        subject: PlacementSubject,
        level: String,
    },
    /// Free text that has no structured form.
    Other { other: String },
    /// Every child must be satisfied.
    And { requirements: Vec<Requirement> },
    /// At least one child must be satisfied.
    Or { requirements: Vec<Requirement> },
}

impl Requirement {
    /// A completed-course requirement.
    pub fn course(subject: &str, number: &str) -> Self {
        Requirement::Course {
            course: CourseKey::new(subject, number),
            timing: Timing::Completed,
        }
    }

    /// A course requirement with explicit timing.
    pub fn course_with(course: CourseKey, timing: Timing) -> Self {
        Requirement::Course { course, timing }
    }

    /// Canonical conjunction of `children`.
    ///
    /// Hoists a single child, flattens nested `And`, and returns `None`
    /// for an empty list.
    pub fn all(children: Vec<Requirement>) -> Self {
        Requirement::And {
            requirements: children,
        }
        .canonicalize()
    }

    /// Canonical disjunction of `children`.
    pub fn any(children: Vec<Requirement>) -> Self {
        Requirement::Or {
            requirements: children,
        }
        .canonicalize()
    }

    /// Returns `true` for [`Requirement::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Requirement::None)
    }

    /// Name of the JSON `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Requirement::None => "NONE",
            Requirement::Permission { .. } => "PERMISSION",
            Requirement::Gpa { .. } => "GPA",
            Requirement::Level { .. } => "LEVEL",
            Requirement::Course { .. } => "COURSE",
            Requirement::Placement { .. } => "PLACEMENT",
            Requirement::Other { .. } => "OTHER",
            Requirement::And { .. } => "AND",
            Requirement::Or { .. } => "OR",
        }
    }

    /// Children of a connective; empty for leaves.
    pub fn children(&self) -> &[Requirement] {
        match self {
            Requirement::And { requirements } | Requirement::Or { requirements } => requirements,
            _ => &[],
        }
    }

    /// Every course key referenced anywhere in the tree, in first-seen order
    /// without duplicates.
    pub fn course_keys(&self) -> Vec<&CourseKey> {
        let mut keys = Vec::new();
        self.collect_course_keys(&mut keys);
        keys
    }

    fn collect_course_keys<'a>(&'a self, keys: &mut Vec<&'a CourseKey>) {
        match self {
            Requirement::Course { course, .. } => {
                if !keys.contains(&course) {
                    keys.push(course);
                }
            }
            Requirement::And { requirements } | Requirement::Or { requirements } => {
                for child in requirements {
                    child.collect_course_keys(keys);
                }
            }
            _ => {}
        }
    }

    /// Returns a copy with `timing` applied to every `Completed` course in
    /// the tree. Courses that already carry a concurrency qualifier keep it.
    pub fn with_completed_timing(self, timing: Timing) -> Self {
        match self {
            Requirement::Course {
                course,
                timing: Timing::Completed,
            } => Requirement::Course { course, timing },
            Requirement::And { requirements } => Requirement::And {
                requirements: requirements
                    .into_iter()
                    .map(|r| r.with_completed_timing(timing))
                    .collect(),
            },
            Requirement::Or { requirements } => Requirement::Or {
                requirements: requirements
                    .into_iter()
                    .map(|r| r.with_completed_timing(timing))
                    .collect(),
            },
            other => other,
        }
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> String {
        // Every field is a string, number, or nested node; encoding cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"type\":\"NONE\"}"))
    }
}

/// Renders requisite text that normalizes back to the same tree, as long as
/// the tree contains no `Other` leaves.
impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::None => f.write_str("none"),
            Requirement::Permission { authority } => write!(f, "permission of {authority}"),
            Requirement::Gpa { gpa } => write!(f, "{gpa} GPA"),
            Requirement::Level { level } => write!(f, "{level} standing"),
            Requirement::Course { course, timing } => match timing {
                Timing::Completed => write!(f, "{course}"),
                Timing::Concurrent => write!(f, "{course} concurrent"),
                Timing::ConcurrentOrCompleted => {
                    write!(f, "{course} (may be taken concurrently)")
                }
            },
            Requirement::Placement { subject, level } => {
                write!(f, "{subject} placement level {level}")
            }
            Requirement::Other { other } => f.write_str(other),
            Requirement::And { requirements } => write_joined(f, requirements, " and "),
            Requirement::Or { requirements } => write_joined(f, requirements, " or "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Requirement], sep: &str) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        if child.children().is_empty() {
            write!(f, "{child}")?;
        } else {
            write!(f, "({child})")?;
        }
    }
    Ok(())
}
