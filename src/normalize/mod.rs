//! Requisite normalizer.
//!
//! Converts free-text prerequisite descriptions into canonical
//! [`Requirement`] trees. The pipeline is deterministic and total: every
//! input produces a tree, and text that matches no known phrasing degrades
//! to an `OTHER` leaf instead of failing.
//!
//! 1. Strip non-semantic content (labels, grade qualifiers, advisory notes)
//! 2. Tokenize connectives and parentheses
//! 3. Classify leaf spans (permission, GPA, level, placement, course)
//! 4. Assemble by precedence and resolve concurrency qualifiers
//! 5. Canonicalize (flatten, hoist, deduplicate)
//!
//! # Examples
//!
//! ```
//! use u_prereq::normalize::normalize;
//! use u_prereq::requirement::Requirement;
//!
//! let req = normalize("C or better in MATH 1200 or MATH 1321... WARNING: no credit for both");
//! assert_eq!(
//!     req,
//!     Requirement::any(vec![
//!         Requirement::course("MATH", "1200"),
//!         Requirement::course("MATH", "1321"),
//!     ])
//! );
//! ```

mod classify;
mod config;
mod lexer;
mod parser;
mod strip;

pub use config::NormalizerConfig;

use rayon::prelude::*;

use crate::requirement::Requirement;
use classify::{Classifier, Leaf};
use parser::Parser;

/// Phrases that mean "no prerequisite", compared case-insensitively after
/// trimming trailing punctuation.
const NONE_PHRASES: &[&str] = &[
    "",
    "none",
    "n/a",
    "na",
    "no prerequisite",
    "no prerequisites",
    "no requisite",
    "no requisites",
];

/// Normalizes `text` with the default configuration.
pub fn normalize(text: &str) -> Requirement {
    Normalizer::default().normalize(text)
}

/// Rule-based requisite normalizer.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Creates a normalizer.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`NormalizerConfig::validate`].
    pub fn new(config: NormalizerConfig) -> Self {
        config.validate().expect("invalid NormalizerConfig");
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes one requisite string into a canonical tree.
    pub fn normalize(&self, text: &str) -> Requirement {
        if is_none_phrase(text) {
            return Requirement::None;
        }
        if self.config.accept_json {
            if let Some(req) = parse_json(text) {
                return req;
            }
        }

        let stripped = strip::strip_non_semantic(text, &self.config.advisory_triggers);
        if is_none_phrase(&stripped) {
            return Requirement::None;
        }

        let tokens = lexer::tokenize(&stripped);
        match Parser::new(tokens, Classifier::new(&self.config)).parse() {
            Leaf::Req(req) | Leaf::Qualified(req, _) => req.canonicalize(),
            // A qualifier with nothing to qualify.
            Leaf::Marker(_) => Requirement::Other { other: stripped },
        }
    }

    /// Normalizes many strings, in parallel when the config asks for it.
    /// Output order matches input order.
    pub fn normalize_all<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<Requirement> {
        if self.config.parallel {
            texts
                .par_iter()
                .map(|t| self.normalize(t.as_ref()))
                .collect()
        } else {
            texts.iter().map(|t| self.normalize(t.as_ref())).collect()
        }
    }
}

fn is_none_phrase(text: &str) -> bool {
    let text = text
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ';' | ':'))
        .trim()
        .to_ascii_lowercase();
    NONE_PHRASES.contains(&text.as_str())
}

/// Accepts text that is already a valid requirement document.
fn parse_json(text: &str) -> Option<Requirement> {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let req = match serde_json::from_str::<Requirement>(trimmed) {
        Ok(req) => req.canonicalize(),
        Err(err) => {
            tracing::debug!(error = %err, "requisite looks like JSON but does not decode");
            return None;
        }
    };
    match req.validate() {
        Ok(()) => Some(req),
        Err(err) => {
            tracing::debug!(error = %err, "decoded requisite JSON is invalid");
            None
        }
    }
}
