//! Tree assembly from tokens.
//!
//! # Grammar
//!
//! Within one parenthesized group (or the whole text), items are joined by
//! separators with this precedence, loosest first:
//!
//! 1. `;` — clauses, combined with `AND` unless written `; or`
//! 2. `,` — list items, combined with the connective that follows the last
//!    comma (`A, B, or C`), else `OR` after "one of", else `AND`
//! 3. `and`
//! 4. `or`
//!
//! Adjacent items with no separator are combined with `AND`, except that a
//! concurrency qualifier applies to its neighbour instead. A group that opens
//! with a connective (`(or concurrent)`) attaches to the preceding item with
//! that connective.
//!
//! A leading qualifier ("Coreq: X and Y") covers the rest of its `;` clause.
//! A trailing qualifier on the last member of a comma list ("A, B, C
//! concurrent") covers every member of the list.

use std::mem;

use super::classify::{strip_one_of, Classifier, Leaf};
use super::lexer::Token;
use crate::requirement::{Requirement, Timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conn {
    And,
    Or,
}

/// Separator between two items; consecutive separator tokens merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Sep {
    semicolon: bool,
    comma: bool,
    word: Option<Conn>,
}

impl Sep {
    fn from_token(token: &Token) -> Option<Sep> {
        let mut sep = Sep::default();
        match token {
            Token::And => sep.word = Some(Conn::And),
            Token::Or => sep.word = Some(Conn::Or),
            Token::Comma => sep.comma = true,
            Token::Semicolon => sep.semicolon = true,
            _ => return None,
        }
        Some(sep)
    }

    fn merge(self, next: Sep) -> Sep {
        Sep {
            semicolon: self.semicolon || next.semicolon,
            comma: self.comma || next.comma,
            word: next.word.or(self.word),
        }
    }
}

/// Items of one group with the separators between them
/// (`seps.len() == items.len() - 1`).
type Segment = (Vec<Leaf>, Vec<Sep>);

/// A parsed group and the separator it opened with, if any.
struct Group {
    leaf: Leaf,
    leading: Option<Sep>,
}

/// Recursive-descent assembler over a token stream.
pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    classifier: Classifier<'a>,
    subject_hint: Option<String>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: Vec<Token>, classifier: Classifier<'a>) -> Self {
        Self {
            tokens,
            pos: 0,
            classifier,
            subject_hint: None,
        }
    }

    /// Parses the whole token stream.
    pub(crate) fn parse(mut self) -> Leaf {
        self.parse_group(false).leaf
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_group(&mut self, nested: bool) -> Group {
        let mut items: Vec<Leaf> = Vec::new();
        let mut seps: Vec<Sep> = Vec::new();
        let mut pending: Option<Sep> = None;
        let mut leading: Option<Sep> = None;
        let mut one_of = false;
        let mut carry: Option<Timing> = None;

        while let Some(token) = self.next_token() {
            let mut opens: Option<Timing> = None;
            let (leaf, inner_leading) = match token {
                Token::Close if nested => break,
                Token::Close => continue,
                Token::Open => {
                    let group = self.parse_group(true);
                    (group.leaf, group.leading)
                }
                Token::Opaque(text) => (Leaf::Req(Requirement::Other { other: text }), None),
                Token::Text(text) => {
                    let (text, has_one_of) = strip_one_of(&text);
                    if has_one_of && items.is_empty() {
                        one_of = true;
                    }
                    let (leaf, qualifier) = self.classifier.classify(&text, &mut self.subject_hint);
                    opens = qualifier;
                    (leaf, None)
                }
                other => {
                    if other == Token::Semicolon {
                        carry = None;
                    }
                    if let Some(sep) = Sep::from_token(&other) {
                        pending = Some(pending.map_or(sep, |p| p.merge(sep)));
                    }
                    continue;
                }
            };
            let leaf = match carry {
                Some(timing) => leaf.with_timing(timing),
                None => leaf,
            };
            carry = opens.or(carry);

            if items.is_empty() {
                leading = pending.take();
                items.push(leaf);
                continue;
            }
            match pending.take().or(inner_leading) {
                Some(sep) => {
                    seps.push(sep);
                    items.push(leaf);
                }
                None => {
                    let prev = items.pop().unwrap_or(Leaf::Req(Requirement::None));
                    items.push(adjacent(prev, leaf));
                }
            }
        }

        Group {
            leaf: assemble(items, seps, one_of),
            leading,
        }
    }
}

/// Combines two items written next to each other without a separator.
/// A qualifier written after its item counts as trailing.
fn adjacent(left: Leaf, right: Leaf) -> Leaf {
    match (left, right) {
        (Leaf::Marker(timing), Leaf::Marker(_)) => Leaf::Marker(timing),
        (Leaf::Marker(timing), right) => right.with_timing(timing),
        (left, Leaf::Marker(timing)) => match left.requirement() {
            Some(req) => Leaf::Qualified(req.with_completed_timing(timing), timing),
            None => Leaf::Marker(timing),
        },
        (left, right) => {
            let reqs = left.requirement().into_iter().chain(right.requirement()).collect();
            Leaf::Req(Requirement::all(reqs))
        }
    }
}

fn assemble(items: Vec<Leaf>, seps: Vec<Sep>, one_of: bool) -> Leaf {
    if items.is_empty() {
        return Leaf::Req(Requirement::None);
    }
    let links: Vec<Sep> = seps.iter().filter(|sep| sep.semicolon).copied().collect();
    let mut clauses = split_where(items, seps, |_, sep| sep.semicolon)
        .into_iter()
        .enumerate()
        .map(|(i, (items, seps))| assemble_clause(items, seps, one_of && i == 0));

    // Clauses fold left to right; "; or X" offers X as an alternative to
    // everything before it.
    let Some(mut acc) = clauses.next() else {
        return Leaf::Req(Requirement::None);
    };
    for (clause, link) in clauses.zip(links) {
        let conn = link.word.unwrap_or(Conn::And);
        acc = join(conn, vec![acc, clause]);
    }
    acc
}

fn assemble_clause(items: Vec<Leaf>, seps: Vec<Sep>, one_of: bool) -> Leaf {
    let Some(last_comma) = seps.iter().rposition(|sep| sep.comma) else {
        return precedence(items, seps);
    };

    let (conn, word_cut) = match seps[last_comma].word {
        Some(word) => (word, None),
        None => match seps
            .iter()
            .enumerate()
            .skip(last_comma + 1)
            .find_map(|(j, sep)| sep.word.map(|w| (w, j)))
        {
            Some((word, j)) => (word, Some(j)),
            None if one_of => (Conn::Or, None),
            None => (Conn::And, None),
        },
    };

    let list = split_where(items, seps, |i, sep| sep.comma || Some(i) == word_cut);
    let spread = list.last().and_then(|(items, _)| match items.last() {
        Some(Leaf::Qualified(_, timing)) => Some(*timing),
        _ => None,
    });
    let members = list
        .into_iter()
        .map(|(items, seps)| precedence(items, seps))
        .map(|member| match spread {
            Some(timing) => member.with_timing(timing),
            None => member,
        })
        .collect();
    join(conn, members)
}

/// `and` binds looser than `or`.
fn precedence(items: Vec<Leaf>, seps: Vec<Sep>) -> Leaf {
    let groups = split_where(items, seps, |_, sep| sep.word == Some(Conn::And));
    let alternatives = groups
        .into_iter()
        .map(|(items, _)| join(Conn::Or, items))
        .collect();
    join(Conn::And, alternatives)
}

/// Splits at every separator for which `cut(index, sep)` holds.
fn split_where(items: Vec<Leaf>, seps: Vec<Sep>, cut: impl Fn(usize, &Sep) -> bool) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cur_items = Vec::new();
    let mut cur_seps = Vec::new();
    let mut seps = seps.into_iter().enumerate();

    for item in items {
        cur_items.push(item);
        if let Some((i, sep)) = seps.next() {
            if cut(i, &sep) {
                segments.push((mem::take(&mut cur_items), mem::take(&mut cur_seps)));
            } else {
                cur_seps.push(sep);
            }
        }
    }
    segments.push((cur_items, cur_seps));
    segments
}

/// Joins items with a connective, resolving concurrency markers.
///
/// In `OR`, a marker alternative ("or concurrent") is dropped and its
/// siblings' completed courses become `CONCURRENT_OR_COMPLETED`. In `AND`, a
/// marker qualifies the item before it (or after it, when it comes first).
fn join(conn: Conn, items: Vec<Leaf>) -> Leaf {
    match conn {
        Conn::Or => {
            let mut marker = None;
            let mut reqs = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Leaf::Req(req) | Leaf::Qualified(req, _) => reqs.push(req),
                    Leaf::Marker(timing) => {
                        marker.get_or_insert(timing);
                    }
                }
            }
            match (reqs.is_empty(), marker) {
                (true, Some(timing)) => Leaf::Marker(timing),
                (_, Some(_)) => Leaf::Req(Requirement::any(
                    reqs.into_iter()
                        .map(|r| r.with_completed_timing(Timing::ConcurrentOrCompleted))
                        .collect(),
                )),
                (_, None) => Leaf::Req(Requirement::any(reqs)),
            }
        }
        Conn::And => {
            let mut reqs: Vec<Requirement> = Vec::with_capacity(items.len());
            let mut pending: Option<Timing> = None;
            for item in items {
                match item {
                    Leaf::Marker(timing) => match reqs.pop() {
                        Some(prev) => reqs.push(prev.with_completed_timing(timing)),
                        None => pending = Some(timing),
                    },
                    Leaf::Req(req) | Leaf::Qualified(req, _) => reqs.push(match pending.take() {
                        Some(timing) => req.with_completed_timing(timing),
                        None => req,
                    }),
                }
            }
            match (reqs.is_empty(), pending) {
                (true, Some(timing)) => Leaf::Marker(timing),
                _ => Leaf::Req(Requirement::all(reqs)),
            }
        }
    }
}
