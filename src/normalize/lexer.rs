//! Connective tokenizer.
//!
//! Splits cleaned requisite text into grouping tokens, connectives, and the
//! text spans between them. Parentheses and brackets are interchangeable.
//! "with" joins like "and" ("MATH 1200 with a 2.5 GPA"), except after a
//! concurrency phrase ("concurrently with"), and `&` is a connective only
//! when spaced.
//! A region with an unmatched parenthesis is emitted as a single
//! [`Token::Opaque`] span so the rest of the text still tokenizes normally.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static CONNECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(and|or|with)\b").expect("valid connective regex"));

static CONCURRENT_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bconcurrent(?:ly)?(?:\s+(?:enrollment|registration))?\s*$")
        .expect("valid concurrency tail regex")
});

/// A lexical unit of requisite text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Open,
    Close,
    And,
    Or,
    Comma,
    Semicolon,
    /// Leaf text between connectives.
    Text(String),
    /// Text covered by an unbalanced parenthesis, kept verbatim.
    Opaque(String),
}

/// Tokenizes `text`.
pub(crate) fn tokenize(text: &str) -> Vec<Token> {
    let opaque = unbalanced_regions(text);
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut region_iter = opaque.iter().peekable();
    let mut skip_until = 0usize;

    for (i, c) in text.char_indices() {
        if i < skip_until {
            continue;
        }
        if let Some(region) = region_iter.peek() {
            if region.start == i {
                flush_text(&mut buf, &mut tokens);
                let span = text[(*region).clone()].trim();
                if !span.is_empty() {
                    tokens.push(Token::Opaque(span.to_string()));
                }
                skip_until = region.end;
                region_iter.next();
                continue;
            }
        }
        let punct = match c {
            '(' | '[' => Some(Token::Open),
            ')' | ']' => Some(Token::Close),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '&' if is_spaced(text, i) => Some(Token::And),
            _ => None,
        };
        match punct {
            Some(token) => {
                flush_text(&mut buf, &mut tokens);
                tokens.push(token);
            }
            None => buf.push(c),
        }
    }
    flush_text(&mut buf, &mut tokens);
    tokens
}

/// Splits buffered text on whole-word `and`/`or` and pushes the pieces.
fn flush_text(buf: &mut String, tokens: &mut Vec<Token>) {
    if buf.trim().is_empty() {
        buf.clear();
        return;
    }
    let mut last = 0;
    for m in CONNECTIVE_RE.find_iter(buf) {
        let word = m.as_str();
        if word.eq_ignore_ascii_case("with") && CONCURRENT_TAIL_RE.is_match(&buf[last..m.start()]) {
            continue;
        }
        push_span(&buf[last..m.start()], tokens);
        if word.eq_ignore_ascii_case("or") {
            tokens.push(Token::Or);
        } else {
            tokens.push(Token::And);
        }
        last = m.end();
    }
    push_span(&buf[last..], tokens);
    buf.clear();
}

/// Whether the `&` at byte `i` has whitespace on both sides.
fn is_spaced(text: &str, i: usize) -> bool {
    let before = text[..i].chars().next_back();
    let after = text[i + 1..].chars().next();
    before.is_some_and(char::is_whitespace) && after.is_some_and(char::is_whitespace)
}

fn push_span(span: &str, tokens: &mut Vec<Token>) {
    let span = span.trim();
    if !span.is_empty() {
        tokens.push(Token::Text(span.to_string()));
    }
}

/// Byte ranges covered by unmatched parentheses, sorted and disjoint.
///
/// An unmatched closer covers the text back to the previous top-level `,` or
/// `;` (or the start). An unmatched opener covers the text to the end.
fn unbalanced_regions(text: &str) -> Vec<Range<usize>> {
    let mut regions: Vec<Range<usize>> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut clause_start = 0usize;

    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => stack.push(i),
            ')' | ']' => {
                if stack.pop().is_none() {
                    let start = regions
                        .last()
                        .map_or(clause_start, |r| r.end.max(clause_start));
                    regions.push(start..i + 1);
                    clause_start = i + 1;
                }
            }
            ',' | ';' if stack.is_empty() => clause_start = i + 1,
            _ => {}
        }
    }

    // The outermost unmatched opener swallows everything after it.
    if let Some(&first_open) = stack.first() {
        regions.retain(|r| r.end <= first_open);
        regions.push(first_open..text.len());
    }
    regions
}
