//! Removal of text that does not gate enrollment.

use std::sync::LazyLock;

use regex::Regex;

/// Phrases that start trailing advisory text. Everything from the phrase
/// onward is dropped.
const ADVISORY_TRIGGERS: &[&str] = &[
    "warning:",
    "note:",
    "notes:",
    "no credit for both",
    "credit not given for both",
    "credit will not be given",
    "no credit will be given",
    "not open to students",
    "may not receive credit",
    "cannot receive credit",
    "will not receive credit",
    "students who have received credit",
    "students with credit for",
];

/// Openings of parenthetical notices that are removed wholesale.
const NOTICE_OPENINGS: &[&str] = &[
    "no credit",
    "credit ",
    "formerly",
    "same as",
    "cross-listed",
    "crosslisted",
    "cross listed",
    "warning",
    "note",
    "not open",
    "students ",
];

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:pre-?req(?:uisite)?s?|requisites?)\s*[:.\-]\s*")
        .expect("valid label regex")
});

static GRADE_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:a\s+)?(?:minimum\s+)?(?:grade\s+of\s+)?(?-i:[A-D])(?:[+-]|\b)\s*or\s+(?:better|higher|above)\s+in\b",
    )
    .expect("valid grade regex")
});

static MIN_GRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:a\s+)?minimum\s+grade\s+of\s+(?-i:[A-D])(?:[+-]|\b)\s*(?:in\b)?")
        .expect("valid minimum grade regex")
});

static WITH_GRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i),?\s*with\s+(?:a\s+)?(?:minimum\s+)?(?:grade\s+of\s+)?(?-i:[A-D])(?:[+-]|\b)(?:\s*or\s+(?:better|higher|above))?(?:\s+grade)?",
    )
    .expect("valid trailing grade regex")
});

/// "or higher" after a GPA or placement value, a letter grade, or a
/// standing. Course numbers (three or more digits) are not values.
static OR_HIGHER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<value>\b\d(?:\.\d+)?|\b\d+\.\d+|(?-i:\b[A-D][+-]?)|\b(?:freshman|sophomore|junior|senior|standing|status|dv|jr|sr|soph|fr)\b\.?)\s+or\s+(?:higher|better|above|greater|more)\b",
    )
    .expect("valid or-higher regex")
});

static AND_OR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\band\s*/\s*or\b").expect("valid and/or regex"));

/// "either"/"both" opening a group or following a connective.
static FILLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<lead>^|[(\[,;:]|\b(?:and|or|of|in)\b)\s*(?:either|both)\s+")
        .expect("valid filler regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Reduces raw requisite text to its gating content.
///
/// Collapses whitespace, removes the leading "Prereq:" label, parenthetical
/// notices, grade qualifiers and "or higher" tails, then truncates at the
/// first advisory trigger (built-in or `extra_triggers`).
pub(crate) fn strip_non_semantic(text: &str, extra_triggers: &[String]) -> String {
    let text = text.replace("...", " ").replace('\u{2026}', " ");
    let mut text = WHITESPACE_RE.replace_all(&text, " ").trim().to_string();

    // "Requisites: Prereq: ..." carries two labels.
    for _ in 0..2 {
        text = LABEL_RE.replace(&text, "").into_owned();
    }

    text = remove_notices(&text);
    text = truncate_advisory(&text, extra_triggers);

    for re in [&*GRADE_IN_RE, &*MIN_GRADE_RE, &*WITH_GRADE_RE] {
        text = re.replace_all(&text, "").into_owned();
    }
    text = OR_HIGHER_RE.replace_all(&text, "$value").into_owned();
    text = AND_OR_RE.replace_all(&text, "or").into_owned();
    text = FILLER_RE.replace_all(&text, "$lead ").into_owned();

    WHITESPACE_RE
        .replace_all(&text, " ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':'))
        .to_string()
}

/// Removes balanced parenthetical groups whose content opens with a notice
/// phrase or contains an advisory trigger.
fn remove_notices(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        let Some(close) = matching_close(rest, open) else {
            break;
        };
        let inner = rest[open + 1..close].trim().to_ascii_lowercase();
        let is_notice = NOTICE_OPENINGS.iter().any(|p| inner.starts_with(p))
            || ADVISORY_TRIGGERS.iter().any(|t| inner.contains(t));
        if is_notice {
            out.push_str(rest[..open].trim_end());
        } else {
            out.push_str(&rest[..=close]);
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Byte index of the `)` matching the `(` at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Cuts the text at the earliest advisory trigger. A cut inside an open
/// parenthesis moves back to that parenthesis so no unbalanced group is left.
fn truncate_advisory(text: &str, extra_triggers: &[String]) -> String {
    let lower = text.to_ascii_lowercase();
    let cut = ADVISORY_TRIGGERS
        .iter()
        .map(|t| t.to_string())
        .chain(extra_triggers.iter().map(|t| t.trim().to_ascii_lowercase()))
        .filter(|t| !t.is_empty())
        .filter_map(|t| lower.find(&t))
        .min();

    let Some(mut cut) = cut else {
        return text.to_string();
    };

    let mut open_stack = Vec::new();
    for (i, c) in text[..cut].char_indices() {
        match c {
            '(' => open_stack.push(i),
            ')' => {
                open_stack.pop();
            }
            _ => {}
        }
    }
    if let Some(&first_open) = open_stack.first() {
        cut = first_open;
    }
    text[..cut].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(text: &str) -> String {
        strip_non_semantic(text, &[])
    }

    #[test]
    fn test_grade_and_warning_removed() {
        assert_eq!(
            strip("C or better in MATH 1200 or MATH 1321... WARNING: no credit for both MATH 1200 and MATH 1321"),
            "MATH 1200 or MATH 1321"
        );
    }

    #[test]
    fn test_label_removed() {
        assert_eq!(strip("Prereq: AST 1010."), "AST 1010");
        assert_eq!(strip("Requisites: Prerequisites: CS 2400"), "CS 2400");
    }

    #[test]
    fn test_parenthetical_notice_removed() {
        assert_eq!(
            strip("MATH 2301 (no credit for both this course and MATH 2500) and CS 2400"),
            "MATH 2301 and CS 2400"
        );
        assert_eq!(strip("CS 3610 (formerly CS 361)"), "CS 3610");
    }

    #[test]
    fn test_plain_parentheses_kept() {
        assert_eq!(
            strip("(BIOS 4630 or CHEM 4901) or concurrent"),
            "(BIOS 4630 or CHEM 4901) or concurrent"
        );
    }

    #[test]
    fn test_or_higher_removed() {
        assert_eq!(strip("GPA of 2.5 or higher"), "GPA of 2.5");
        assert_eq!(strip("Math placement level 3 or above"), "Math placement level 3");
    }

    #[test]
    fn test_or_more_kept_after_course() {
        assert_eq!(
            strip("MATH 2301 or more advanced course"),
            "MATH 2301 or more advanced course"
        );
        assert_eq!(strip("junior standing or higher"), "junior standing");
        assert_eq!(strip("Jr. or above"), "Jr");
    }

    #[test]
    fn test_filler_words_kept_inside_text() {
        assert_eq!(
            strip("MATH 1200 and either CS 2400 or CS 2401"),
            "MATH 1200 and CS 2400 or CS 2401"
        );
        assert_eq!(
            strip("experience with both Python and Java"),
            "experience with both Python and Java"
        );
    }

    #[test]
    fn test_minimum_grade_removed() {
        assert_eq!(strip("minimum grade of C- in PHYS 2051"), "PHYS 2051");
        assert_eq!(strip("CHEM 1510 with a C or better"), "CHEM 1510");
    }

    #[test]
    fn test_and_or_and_fillers() {
        assert_eq!(strip("either MATH 1200 and/or MATH 1300"), "MATH 1200 or MATH 1300");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(strip("  MATH\n1200\t and   CS 2400 "), "MATH 1200 and CS 2400");
    }

    #[test]
    fn test_truncation_inside_parenthesis() {
        assert_eq!(
            strip("MATH 1200 and (CS 2400; warning: see advisor)"),
            "MATH 1200 and"
        );
    }

    #[test]
    fn test_extra_trigger() {
        let extra = vec!["See Advisor".to_string()];
        assert_eq!(
            strip_non_semantic("CS 2400 see advisor for details", &extra),
            "CS 2400"
        );
    }

    #[test]
    fn test_only_advisory_is_empty() {
        assert_eq!(strip("WARNING: no credit for both"), "");
    }
}
