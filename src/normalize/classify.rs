//! Leaf span classification.
//!
//! Each span between connectives is matched, in priority order, against
//! permission, GPA, level, placement, and course-code phrasing. A span that
//! matches nothing is kept verbatim as `OTHER`.

use std::sync::LazyLock;

use regex::Regex;

use super::config::NormalizerConfig;
use crate::requirement::{CourseKey, Level, PlacementSubject, Requirement, Timing};

/// Result of classifying one span.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Leaf {
    Req(Requirement),
    /// A requirement written with a trailing qualifier ("AST 2020
    /// concurrent"). The qualifier also covers the comma list it closes.
    Qualified(Requirement, Timing),
    /// A span that is nothing but a concurrency qualifier ("concurrent").
    Marker(Timing),
}

impl Leaf {
    /// The requirement, unless this is a bare marker.
    pub(crate) fn requirement(self) -> Option<Requirement> {
        match self {
            Leaf::Req(req) | Leaf::Qualified(req, _) => Some(req),
            Leaf::Marker(_) => None,
        }
    }

    /// Applies `timing` to the completed courses of a requirement.
    pub(crate) fn with_timing(self, timing: Timing) -> Leaf {
        match self {
            Leaf::Req(req) => Leaf::Req(req.with_completed_timing(timing)),
            Leaf::Qualified(req, own) => Leaf::Qualified(req.with_completed_timing(timing), own),
            marker => marker,
        }
    }
}

/// Where a span's concurrency qualifier was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    /// "Coreq: X", "concurrent enrollment in X".
    Leading(Timing),
    /// "X concurrent", "X may be taken concurrently".
    Trailing(Timing),
}

impl Qualifier {
    fn timing(self) -> Timing {
        match self {
            Qualifier::Leading(t) | Qualifier::Trailing(t) => t,
        }
    }
}

static OPTIONAL_CONCURRENT_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\s,-]*(?:which\s+)?(?:may|can)\s+be\s+taken\s+concurrently$")
        .expect("valid optional concurrency regex")
});

static CONCURRENT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:concurrent(?:ly)?\s+(?:enrollment|registration)(?:\s+(?:in|with))?|concurrent(?:ly)?\s+with|co-?req(?:uisite)?s?\s*:?)(?:\s+|$)",
    )
    .expect("valid concurrency prefix regex")
});

static CONCURRENT_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[\s,-]+)(?:(?:must\s+be\s+)?taken\s+concurrently|concurrent(?:ly)?(?:\s+(?:enrollment|registration))?|co-?req(?:uisite)?)$",
    )
    .expect("valid concurrency suffix regex")
});

static ONE_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:any\s+)?one\s+of(?:\s+the\s+following)?\s*:?\s*")
        .expect("valid one-of regex")
});

static PERMISSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:permission|consent|approval)\b").expect("valid permission regex")
});

static PERMISSION_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:permission|consent|approval)\s+(?:of|from|by)\s+(?:the\s+)?(?P<who>[a-z][a-z .&'-]*?)\s*(?:is\s+)?(?:required)?$",
    )
    .expect("valid permission-of regex")
});

static WHO_PERMISSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:with\s+)?(?:the\s+)?(?P<who>[a-z][a-z .&'-]*?)(?:'s)?\s+(?:permission|consent|approval)\b",
    )
    .expect("valid authority-permission regex")
});

static GPA_BEFORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<value>\d+(?:\.\d+)?)\s*(?:minimum\s+)?(?:cumulative\s+|overall\s+)?(?:gpa|grade\s+point\s+average)\b",
    )
    .expect("valid gpa regex")
});

static GPA_AFTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:gpa|grade\s+point\s+average)\s*(?:of\s+|:\s*)?(?:at\s+least\s+)?(?:a\s+)?(?:minimum\s+(?:of\s+)?)?(?P<value>\d+(?:\.\d+)?)",
    )
    .expect("valid gpa-of regex")
});

static LEVEL_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:class\s+)?(?:standing|status|rank|level|only|students?|class)\b")
        .expect("valid level noise regex")
});

static PLACEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<subject>[a-z][a-z ]*?)\s+placement(?:\s+(?:test|exam|examination))?(?:\s+(?:level|score|tier))?\s*(?:of\s+)?(?:at\s+least\s+)?(?P<level>\d+(?:\.\d+)?|dv)$",
    )
    .expect("valid placement regex")
});

static PLACEMENT_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^placement(?:\s+(?:test|exam|examination))?(?:\s+(?:level|score|tier))?\s*(?:of\s+)?(?P<level>\d+(?:\.\d+)?|dv)\s+in\s+(?P<subject>[a-z][a-z ]*)$",
    )
    .expect("valid placement-in regex")
});

static PLACEMENT_ABBR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<abbr>[a-z]{2,7})\s*-?\s*pl\s*-?\s*(?P<level>\d+(?:\.\d+)?)$")
        .expect("valid placement abbreviation regex")
});

static COURSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<subject>[A-Z]{2,5})\s*(?P<number>\d{3,4}[A-Za-z]{0,2})$")
        .expect("valid course regex")
});

static BARE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<number>\d{3,4}[A-Za-z]{0,2})$").expect("valid course number regex")
});

/// Strips a leading "one of" and reports whether it was present.
pub(crate) fn strip_one_of(span: &str) -> (String, bool) {
    match ONE_OF_RE.find(span) {
        Some(m) => (span[m.end()..].to_string(), true),
        None => (span.to_string(), false),
    }
}

/// Classifies leaf spans against the fixed requisite vocabulary.
pub(crate) struct Classifier<'a> {
    config: &'a NormalizerConfig,
}

impl<'a> Classifier<'a> {
    pub(crate) fn new(config: &'a NormalizerConfig) -> Self {
        Self { config }
    }

    /// Classifies `span`. `subject_hint` carries the subject of the nearest
    /// preceding course code and is updated when this span names one.
    ///
    /// Also returns the timing of a leading qualifier ("Coreq:"), which the
    /// parser extends over the rest of the clause.
    pub(crate) fn classify(
        &self,
        span: &str,
        subject_hint: &mut Option<String>,
    ) -> (Leaf, Option<Timing>) {
        let span = clean(span);
        let (body, qualifier) = split_timing(&span);
        if body.is_empty() {
            // A bare qualifier applies to its neighbours, not the clause.
            let leaf = match qualifier {
                Some(q) => Leaf::Marker(q.timing()),
                None => Leaf::Req(Requirement::None),
            };
            return (leaf, None);
        }
        let carry = match qualifier {
            Some(Qualifier::Leading(t)) => Some(t),
            _ => None,
        };

        let req = self
            .permission(&body)
            .or_else(|| gpa(&body))
            .or_else(|| level(&body))
            .or_else(|| placement(&body))
            .or_else(|| self.course(&body, subject_hint))
            .unwrap_or_else(|| {
                tracing::debug!(span = %body, "requisite span has no structured form");
                Requirement::Other {
                    other: body.clone(),
                }
            });

        let leaf = match qualifier {
            Some(Qualifier::Leading(t)) => Leaf::Req(req.with_completed_timing(t)),
            Some(Qualifier::Trailing(t)) => Leaf::Qualified(req.with_completed_timing(t), t),
            None => Leaf::Req(req),
        };
        (leaf, carry)
    }

    fn permission(&self, body: &str) -> Option<Requirement> {
        if !PERMISSION_RE.is_match(body) {
            return None;
        }
        let who = PERMISSION_OF_RE
            .captures(body)
            .or_else(|| WHO_PERMISSION_RE.captures(body))
            .and_then(|caps| caps.name("who"))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        Some(Requirement::Permission {
            authority: self.authority(&who),
        })
    }

    fn authority(&self, who: &str) -> String {
        let lower = who.to_ascii_lowercase();
        match lower.as_str() {
            "" | "required" => self.config.default_authority.clone(),
            "instructor" | "the instructor" | "professor" => String::from("Instructor"),
            "department" | "departmental" | "dept" | "dept." => String::from("Department"),
            _ => title_case(who),
        }
    }

    fn course(&self, body: &str, subject_hint: &mut Option<String>) -> Option<Requirement> {
        if let Some(caps) = COURSE_RE.captures(body) {
            let key = CourseKey::new(&caps["subject"], &caps["number"]);
            *subject_hint = Some(key.subject().to_string());
            return Some(Requirement::Course {
                course: key,
                timing: Timing::Completed,
            });
        }
        if !self.config.inherit_subject {
            return None;
        }
        let caps = BARE_NUMBER_RE.captures(body)?;
        let subject = subject_hint.as_deref()?;
        Some(Requirement::Course {
            course: CourseKey::new(subject, &caps["number"]),
            timing: Timing::Completed,
        })
    }
}

/// Trims whitespace and stray punctuation around a span.
fn clean(span: &str) -> String {
    span.trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':'))
        .to_string()
}

/// Separates a concurrency qualifier from the rest of the span.
fn split_timing(span: &str) -> (String, Option<Qualifier>) {
    if let Some(m) = OPTIONAL_CONCURRENT_SUFFIX_RE.find(span) {
        return (
            clean(&span[..m.start()]),
            Some(Qualifier::Trailing(Timing::ConcurrentOrCompleted)),
        );
    }
    if let Some(m) = CONCURRENT_PREFIX_RE.find(span) {
        return (
            clean(&span[m.end()..]),
            Some(Qualifier::Leading(Timing::Concurrent)),
        );
    }
    if let Some(m) = CONCURRENT_SUFFIX_RE.find(span) {
        return (
            clean(&span[..m.start()]),
            Some(Qualifier::Trailing(Timing::Concurrent)),
        );
    }
    (span.to_string(), None)
}

fn gpa(body: &str) -> Option<Requirement> {
    let caps = GPA_BEFORE_RE
        .captures(body)
        .or_else(|| GPA_AFTER_RE.captures(body))?;
    let value: f64 = caps["value"].parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(Requirement::Gpa { gpa: value })
}

fn level(body: &str) -> Option<Requirement> {
    let rest = LEVEL_NOISE_RE.replace_all(body, " ");
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    if let Some(level) = Level::from_word(rest) {
        return Some(Requirement::Level { level });
    }
    // "junior/senior"
    if rest.contains('/') {
        let levels = rest
            .split('/')
            .map(|part| Level::from_word(part.trim()))
            .collect::<Option<Vec<_>>>()?;
        return Some(Requirement::any(
            levels
                .into_iter()
                .map(|level| Requirement::Level { level })
                .collect(),
        ));
    }
    None
}

fn placement(body: &str) -> Option<Requirement> {
    let (subject, level) = if let Some(caps) = PLACEMENT_RE
        .captures(body)
        .or_else(|| PLACEMENT_IN_RE.captures(body))
    {
        (
            PlacementSubject::from_name(&caps["subject"])?,
            caps["level"].to_string(),
        )
    } else {
        let caps = PLACEMENT_ABBR_RE.captures(body)?;
        (
            PlacementSubject::from_abbreviation(&caps["abbr"])?,
            caps["level"].to_string(),
        )
    };
    let level = if level.eq_ignore_ascii_case("dv") {
        String::from("DV")
    } else {
        level
    };
    Some(Requirement::Placement { subject, level })
}

/// Capitalizes each word, leaving all-uppercase words ("HTC") alone.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            if word.len() > 1 && word.chars().all(|c| !c.is_ascii_lowercase()) {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
