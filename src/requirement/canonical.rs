//! Canonical form: flattening and hoisting.

use super::types::Requirement;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Requirement {
    /// Rewrites the tree into canonical form.
    ///
    /// - same-connective children are spliced into their parent
    ///   (`A or (B or C)` becomes a 3-way `Or`);
    /// - `None` children are dropped from `And`; an `Or` with a `None`
    ///   alternative is trivially satisfied and becomes `None`;
    /// - exact duplicate siblings keep only their first occurrence;
    /// - a connective left with one child is replaced by that child, and one
    ///   left with none becomes `None`.
    ///
    /// Cross-connective nesting is preserved. The operation is idempotent.
    pub fn canonicalize(self) -> Requirement {
        match self {
            Requirement::And { requirements } => rebuild(Connective::And, requirements),
            Requirement::Or { requirements } => rebuild(Connective::Or, requirements),
            leaf => leaf,
        }
    }
}

fn rebuild(kind: Connective, children: Vec<Requirement>) -> Requirement {
    let mut out: Vec<Requirement> = Vec::with_capacity(children.len());
    for child in children {
        match child.canonicalize() {
            Requirement::None => {
                if kind == Connective::Or {
                    return Requirement::None;
                }
            }
            Requirement::And { requirements } if kind == Connective::And => {
                for grandchild in requirements {
                    push_unique(&mut out, grandchild);
                }
            }
            Requirement::Or { requirements } if kind == Connective::Or => {
                for grandchild in requirements {
                    push_unique(&mut out, grandchild);
                }
            }
            other => push_unique(&mut out, other),
        }
    }

    match out.len() {
        0 => Requirement::None,
        1 => out.pop().unwrap_or_default(),
        _ => match kind {
            Connective::And => Requirement::And { requirements: out },
            Connective::Or => Requirement::Or { requirements: out },
        },
    }
}

fn push_unique(out: &mut Vec<Requirement>, req: Requirement) {
    if !out.contains(&req) {
        out.push(req);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::{Level, Timing};

    fn c(n: &str) -> Requirement {
        Requirement::course("X", n)
    }

    #[test]
    fn test_flatten_same_connective() {
        let req = Requirement::Or {
            requirements: vec![
                c("1"),
                Requirement::Or {
                    requirements: vec![c("2"), c("3")],
                },
            ],
        };
        assert_eq!(
            req.canonicalize(),
            Requirement::Or {
                requirements: vec![c("1"), c("2"), c("3")]
            }
        );
    }

    #[test]
    fn test_cross_connective_kept() {
        let inner = Requirement::Or {
            requirements: vec![c("2"), c("3")],
        };
        let req = Requirement::And {
            requirements: vec![c("1"), inner.clone()],
        };
        assert_eq!(
            req.canonicalize(),
            Requirement::And {
                requirements: vec![c("1"), inner]
            }
        );
    }

    #[test]
    fn test_hoist_singleton() {
        let req = Requirement::And {
            requirements: vec![Requirement::Or {
                requirements: vec![c("1")],
            }],
        };
        assert_eq!(req.canonicalize(), c("1"));
    }

    #[test]
    fn test_empty_connective_is_none() {
        let req = Requirement::And {
            requirements: vec![],
        };
        assert_eq!(req.canonicalize(), Requirement::None);
    }

    #[test]
    fn test_none_dropped_from_and() {
        let req = Requirement::And {
            requirements: vec![Requirement::None, c("1"), Requirement::None],
        };
        assert_eq!(req.canonicalize(), c("1"));
    }

    #[test]
    fn test_none_alternative_satisfies_or() {
        let req = Requirement::Or {
            requirements: vec![c("1"), Requirement::None],
        };
        assert_eq!(req.canonicalize(), Requirement::None);
    }

    #[test]
    fn test_duplicates_collapsed() {
        let level = Requirement::Level {
            level: Level::Junior,
        };
        let req = Requirement::Or {
            requirements: vec![level.clone(), c("1"), level.clone()],
        };
        assert_eq!(
            req.canonicalize(),
            Requirement::Or {
                requirements: vec![level, c("1")]
            }
        );
    }

    #[test]
    fn test_different_timing_not_duplicate() {
        let concurrent = Requirement::course_with(
            crate::requirement::CourseKey::new("X", "1"),
            Timing::Concurrent,
        );
        let req = Requirement::And {
            requirements: vec![c("1"), concurrent],
        };
        assert_eq!(req.canonicalize().children().len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let req = Requirement::And {
            requirements: vec![
                Requirement::And {
                    requirements: vec![c("1"), Requirement::None],
                },
                Requirement::Or {
                    requirements: vec![
                        c("2"),
                        Requirement::Or {
                            requirements: vec![c("3"), c("4")],
                        },
                    ],
                },
            ],
        };
        let once = req.canonicalize();
        assert_eq!(once.clone().canonicalize(), once);
    }
}
