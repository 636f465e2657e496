//! Longest-chain evaluation.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use super::config::{ChainConfig, OrPolicy};
use super::types::ChainResult;
use crate::catalog::Catalog;
use crate::requirement::{CourseKey, Requirement, Timing};

/// A resolved sub-chain: course count, terms, and the courses on it.
#[derive(Debug, Clone, Default)]
struct Resolved {
    depth: usize,
    terms: usize,
    path: Vec<CourseKey>,
}

/// Outcome of evaluating one node. `resolved` is `None` when every branch
/// below was excluded; `limited` is set when the depth limit cut a branch.
#[derive(Debug, Default)]
struct Outcome {
    resolved: Option<Resolved>,
    limited: bool,
}

/// A finished course. Results cut by the depth limit record the stack depth
/// they were computed at and are reused only at that depth.
#[derive(Debug, Clone)]
struct Memo {
    resolved: Resolved,
    limited_at: Option<usize>,
}

/// Computes longest prerequisite chains over a [`Catalog`].
pub struct ChainRunner;

impl ChainRunner {
    /// Evaluates the longest chain ending at `target`.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`ChainConfig::validate`].
    pub fn run(target: &CourseKey, catalog: &Catalog, config: &ChainConfig) -> ChainResult {
        config.validate().expect("invalid ChainConfig");
        Evaluator::new(catalog, config).run(target)
    }

    /// Evaluates every target, in parallel when the config asks for it.
    /// Output order matches input order.
    pub fn run_batch(
        targets: &[CourseKey],
        catalog: &Catalog,
        config: &ChainConfig,
    ) -> Vec<ChainResult> {
        config.validate().expect("invalid ChainConfig");
        if config.parallel {
            targets
                .par_iter()
                .map(|t| Evaluator::new(catalog, config).run(t))
                .collect()
        } else {
            targets
                .iter()
                .map(|t| Evaluator::new(catalog, config).run(t))
                .collect()
        }
    }

    /// The longest chain across `targets`; the first wins on ties.
    /// Returns `None` when `targets` is empty.
    pub fn longest_among(
        targets: &[CourseKey],
        catalog: &Catalog,
        config: &ChainConfig,
    ) -> Option<ChainResult> {
        Self::run_batch(targets, catalog, config)
            .into_iter()
            .reduce(|best, r| if r.length > best.length { r } else { best })
    }
}

/// Per-call evaluation state. The memo table lives only as long as one
/// top-level evaluation.
///
/// Every finished course is memoized, so each course is expanded once per
/// call (once per stack depth when the depth limit cuts it) and evaluation
/// is linear in the size of the reachable catalog. Inside a cycle the
/// chain found is the one the depth-first walk reaches first.
struct Evaluator<'a> {
    catalog: &'a Catalog,
    config: &'a ChainConfig,
    memo: HashMap<CourseKey, Memo>,
    active: HashSet<CourseKey>,
    cycles: Vec<CourseKey>,
    missing: Vec<CourseKey>,
    truncated: bool,
}

impl<'a> Evaluator<'a> {
    fn new(catalog: &'a Catalog, config: &'a ChainConfig) -> Self {
        Self {
            catalog,
            config,
            memo: HashMap::new(),
            active: HashSet::new(),
            cycles: Vec::new(),
            missing: Vec::new(),
            truncated: false,
        }
    }

    fn run(mut self, target: &CourseKey) -> ChainResult {
        let resolved = self.course(target).resolved.unwrap_or_else(|| Resolved {
            depth: 1,
            terms: 1,
            path: vec![target.clone()],
        });
        tracing::debug!(
            target = %target,
            length = resolved.depth,
            cycles = self.cycles.len(),
            missing = self.missing.len(),
            "evaluated prerequisite chain"
        );
        ChainResult {
            length: resolved.depth,
            path: resolved.path,
            terms: resolved.terms,
            cycles: self.cycles,
            missing: self.missing,
            truncated: self.truncated,
        }
    }

    /// Resolves a course node: the course itself plus its longest
    /// prerequisite chain. Unresolved when the course is already on the
    /// active path or lies beyond the depth limit.
    fn course(&mut self, key: &CourseKey) -> Outcome {
        if self.active.contains(key) {
            if !self.cycles.contains(key) {
                tracing::warn!(course = %key, "prerequisite cycle detected");
                self.cycles.push(key.clone());
            }
            return Outcome::default();
        }

        let depth = self.active.len();
        if let Some(memo) = self.memo.get(key) {
            if self.reusable(memo, depth) {
                return Outcome {
                    resolved: Some(memo.resolved.clone()),
                    limited: memo.limited_at.is_some(),
                };
            }
        }

        if depth >= self.config.max_depth {
            if !self.truncated {
                tracing::warn!(
                    course = %key,
                    max_depth = self.config.max_depth,
                    "prerequisite chain exceeds depth limit"
                );
            }
            self.truncated = true;
            return Outcome {
                resolved: None,
                limited: true,
            };
        }

        let catalog = self.catalog;
        let Some(requirement) = catalog.get(key) else {
            if !self.missing.contains(key) {
                tracing::warn!(course = %key, "course missing from catalog");
                self.missing.push(key.clone());
            }
            let resolved = Resolved {
                depth: 1,
                terms: 1,
                path: vec![key.clone()],
            };
            self.remember(key, &resolved, None);
            return Outcome {
                resolved: Some(resolved),
                limited: false,
            };
        };

        self.active.insert(key.clone());
        let child = self.requirement(requirement);
        self.active.remove(key);

        let sub = child.resolved.unwrap_or_default();
        let mut path = Vec::with_capacity(sub.path.len() + 1);
        path.push(key.clone());
        path.extend(sub.path);
        let resolved = Resolved {
            depth: sub.depth + 1,
            terms: sub.terms + 1,
            path,
        };

        self.remember(key, &resolved, child.limited.then_some(depth));
        Outcome {
            resolved: Some(resolved),
            limited: child.limited,
        }
    }

    /// Courses on an unlimited result finished before it and are never
    /// expanded again, so such a result is always safe to reuse. A limited
    /// result is reused only at its own depth and only while none of its
    /// courses is active.
    fn reusable(&self, memo: &Memo, depth: usize) -> bool {
        match memo.limited_at {
            None => true,
            Some(at) => {
                at == depth && !memo.resolved.path.iter().any(|k| self.active.contains(k))
            }
        }
    }

    fn remember(&mut self, key: &CourseKey, resolved: &Resolved, limited_at: Option<usize>) {
        self.memo.insert(
            key.clone(),
            Memo {
                resolved: resolved.clone(),
                limited_at,
            },
        );
    }

    fn requirement(&mut self, req: &Requirement) -> Outcome {
        match req {
            Requirement::None
            | Requirement::Permission { .. }
            | Requirement::Gpa { .. }
            | Requirement::Level { .. }
            | Requirement::Placement { .. }
            | Requirement::Other { .. } => Outcome {
                resolved: Some(Resolved::default()),
                limited: false,
            },
            Requirement::Course { course, timing } => {
                let mut outcome = self.course(course);
                if *timing == Timing::Concurrent {
                    if let Some(r) = outcome.resolved.as_mut() {
                        r.terms -= 1;
                    }
                }
                outcome
            }
            Requirement::And { requirements } => self.select(requirements, |cand, best| cand > best),
            Requirement::Or { requirements } => match self.config.or_policy {
                OrPolicy::Shortest => self.select(requirements, |cand, best| cand < best),
                OrPolicy::Longest => self.select(requirements, |cand, best| cand > best),
            },
        }
    }

    /// Picks the child whose depth beats every earlier one under `better`.
    /// Unresolved children are skipped; if none resolves, neither does the
    /// connective.
    fn select(&mut self, children: &[Requirement], better: impl Fn(usize, usize) -> bool) -> Outcome {
        let mut best: Option<Resolved> = None;
        let mut limited = false;
        for child in children {
            let outcome = self.requirement(child);
            limited |= outcome.limited;
            let Some(resolved) = outcome.resolved else {
                continue;
            };
            match &best {
                Some(b) if !better(resolved.depth, b.depth) => {}
                _ => best = Some(resolved),
            }
        }
        Outcome {
            resolved: best,
            limited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CourseKey {
        s.parse().unwrap()
    }

    fn course(s: &str) -> Requirement {
        Requirement::course_with(key(s), Timing::Completed)
    }

    fn catalog(entries: Vec<(&str, Requirement)>) -> Catalog {
        entries.into_iter().map(|(k, r)| (key(k), r)).collect()
    }

    fn run(target: &str, catalog: &Catalog) -> ChainResult {
        ChainRunner::run(&key(target), catalog, &ChainConfig::default())
    }

    #[test]
    fn test_and_takes_longest() {
        let catalog = catalog(vec![
            ("A 100", Requirement::None),
            ("B 100", course("A 100")),
            ("C 100", Requirement::all(vec![course("B 100"), course("A 100")])),
        ]);
        let result = run("C 100", &catalog);
        assert_eq!(result.length, 3);
        assert_eq!(result.path, vec![key("C 100"), key("B 100"), key("A 100")]);
        assert_eq!(result.terms, 3);
        assert!(result.is_clean());
    }

    #[test]
    fn test_or_policies() {
        let catalog = catalog(vec![
            ("A 100", Requirement::None),
            ("B 100", course("A 100")),
            ("C 100", Requirement::any(vec![course("B 100"), course("A 100")])),
        ]);
        assert_eq!(run("C 100", &catalog).length, 2);

        let longest = ChainConfig::default().with_or_policy(OrPolicy::Longest);
        let result = ChainRunner::run(&key("C 100"), &catalog, &longest);
        assert_eq!(result.length, 3);
        assert_eq!(result.path, vec![key("C 100"), key("B 100"), key("A 100")]);
    }

    #[test]
    fn test_or_with_non_course_alternative() {
        let catalog = catalog(vec![
            ("A 100", Requirement::None),
            (
                "B 100",
                Requirement::any(vec![
                    course("A 100"),
                    Requirement::Permission {
                        authority: "Instructor".into(),
                    },
                ]),
            ),
        ]);
        let result = run("B 100", &catalog);
        assert_eq!(result.length, 1);
        assert_eq!(result.path, vec![key("B 100")]);
    }

    #[test]
    fn test_ties_keep_first() {
        let catalog = catalog(vec![
            ("A 100", Requirement::None),
            ("B 100", Requirement::None),
            ("C 100", Requirement::all(vec![course("B 100"), course("A 100")])),
            ("D 100", Requirement::any(vec![course("A 100"), course("B 100")])),
        ]);
        assert_eq!(run("C 100", &catalog).path, vec![key("C 100"), key("B 100")]);
        assert_eq!(run("D 100", &catalog).path, vec![key("D 100"), key("A 100")]);
    }

    #[test]
    fn test_concurrent_edge_shares_term() {
        let catalog = catalog(vec![
            ("A 100", Requirement::None),
            ("B 100", course("A 100")),
            (
                "C 100",
                Requirement::course_with(key("B 100"), Timing::Concurrent),
            ),
        ]);
        let result = run("C 100", &catalog);
        assert_eq!(result.length, 3);
        assert_eq!(result.terms, 2);
    }

    #[test]
    fn test_missing_entry_counts_one() {
        let catalog = catalog(vec![(
            "B 100",
            Requirement::all(vec![course("A 100"), course("Z 999")]),
        )]);
        let result = run("B 100", &catalog);
        assert_eq!(result.length, 2);
        assert_eq!(result.path, vec![key("B 100"), key("A 100")]);
        assert_eq!(result.missing, vec![key("A 100"), key("Z 999")]);
    }

    #[test]
    fn test_missing_target() {
        let result = run("X 100", &Catalog::new());
        assert_eq!(result.length, 1);
        assert_eq!(result.path, vec![key("X 100")]);
        assert_eq!(result.missing, vec![key("X 100")]);
    }

    #[test]
    fn test_self_cycle() {
        let catalog = catalog(vec![
            ("A 100", course("A 100")),
            ("B 100", Requirement::None),
            ("C 100", Requirement::all(vec![course("A 100"), course("B 100")])),
        ]);
        let result = run("A 100", &catalog);
        assert_eq!(result.length, 1);
        assert_eq!(result.cycles, vec![key("A 100")]);

        let result = run("C 100", &catalog);
        assert_eq!(result.length, 2);
        assert_eq!(result.cycles, vec![key("A 100")]);

        let result = run("B 100", &catalog);
        assert_eq!(result.length, 1);
        assert!(result.cycles.is_empty());
    }

    #[test]
    fn test_mutual_cycle_excludes_back_edge() {
        // A -> B -> C -> A, and D -> B.
        let catalog = catalog(vec![
            ("A 100", course("B 100")),
            ("B 100", course("C 100")),
            ("C 100", course("A 100")),
            ("D 100", course("B 100")),
        ]);
        let result = run("A 100", &catalog);
        assert_eq!(result.length, 3);
        assert_eq!(result.path, vec![key("A 100"), key("B 100"), key("C 100")]);
        assert_eq!(result.cycles, vec![key("A 100")]);

        let result = run("D 100", &catalog);
        assert_eq!(result.length, 4);
        assert_eq!(
            result.path,
            vec![key("D 100"), key("B 100"), key("C 100"), key("A 100")]
        );
        assert_eq!(result.cycles, vec![key("B 100")]);
    }

    #[test]
    fn test_cycle_entered_twice() {
        // E reaches the A/B cycle twice, entering at A first and B second.
        let catalog = catalog(vec![
            ("A 100", course("B 100")),
            ("B 100", course("A 100")),
            ("E 100", Requirement::all(vec![course("A 100"), course("B 100")])),
        ]);
        let result = run("E 100", &catalog);
        assert_eq!(result.length, 3);
        assert_eq!(result.path, vec![key("E 100"), key("A 100"), key("B 100")]);
    }

    #[test]
    fn test_depth_limit() {
        let catalog = catalog(vec![
            ("A 100", Requirement::None),
            ("B 100", course("A 100")),
            ("C 100", course("B 100")),
            ("D 100", course("C 100")),
        ]);
        let config = ChainConfig::default().with_max_depth(2);
        let result = ChainRunner::run(&key("D 100"), &catalog, &config);
        assert_eq!(result.length, 2);
        assert!(result.truncated);

        let result = run("D 100", &catalog);
        assert_eq!(result.length, 4);
        assert!(!result.truncated);
    }

    #[test]
    fn test_dense_cycle_is_linear() {
        // Every course requires all of the others.
        let n = 40;
        let keys: Vec<CourseKey> = (0..n)
            .map(|i| CourseKey::new("CS", format!("{}", 1000 + i)))
            .collect();
        let catalog: Catalog = keys
            .iter()
            .map(|k| {
                let others = keys
                    .iter()
                    .filter(|o| *o != k)
                    .map(|o| Requirement::course_with(o.clone(), Timing::Completed))
                    .collect();
                (k.clone(), Requirement::all(others))
            })
            .collect();

        let start = std::time::Instant::now();
        let result = ChainRunner::run(&keys[0], &catalog, &ChainConfig::default());
        assert!(start.elapsed() < std::time::Duration::from_secs(2));

        assert_eq!(result.length, n);
        assert_eq!(result.path, keys);
        assert!(!result.cycles.is_empty());
        assert!(!result.truncated);
    }

    #[test]
    fn test_depth_limit_independent_of_child_order() {
        let chain = vec![
            ("AA 100", course("BB 100")),
            ("BB 100", course("CC 100")),
            ("CC 100", course("DD 100")),
            ("DD 100", Requirement::None),
        ];
        let mut forward = chain.clone();
        forward.push((
            "TT 100",
            Requirement::all(vec![course("AA 100"), course("BB 100")]),
        ));
        let mut backward = chain;
        backward.push((
            "TT 100",
            Requirement::all(vec![course("BB 100"), course("AA 100")]),
        ));

        let config = ChainConfig::default().with_max_depth(3);
        let forward = ChainRunner::run(&key("TT 100"), &catalog(forward), &config);
        let backward = ChainRunner::run(&key("TT 100"), &catalog(backward), &config);
        assert_eq!(forward.length, 3);
        assert_eq!(backward.length, 3);
        assert_eq!(backward.path, vec![key("TT 100"), key("BB 100"), key("CC 100")]);
        assert!(forward.truncated && backward.truncated);
    }

    #[test]
    fn test_run_batch_and_longest_among() {
        let catalog = catalog(vec![
            ("A 100", Requirement::None),
            ("B 100", course("A 100")),
            ("C 100", course("B 100")),
            ("D 100", course("A 100")),
        ]);
        let targets = vec![key("B 100"), key("C 100"), key("D 100"), key("A 100")];

        let sequential = ChainRunner::run_batch(&targets, &catalog, &ChainConfig::default());
        let parallel = ChainRunner::run_batch(
            &targets,
            &catalog,
            &ChainConfig::default().with_parallel(true),
        );
        assert_eq!(sequential, parallel);
        let lengths: Vec<usize> = sequential.iter().map(|r| r.length).collect();
        assert_eq!(lengths, vec![2, 3, 2, 1]);

        let best = ChainRunner::longest_among(&targets, &catalog, &ChainConfig::default()).unwrap();
        assert_eq!(best.path[0], key("C 100"));
        assert!(ChainRunner::longest_among(&[], &catalog, &ChainConfig::default()).is_none());
    }

    #[test]
    #[should_panic(expected = "invalid ChainConfig")]
    fn test_invalid_config_panics() {
        let config = ChainConfig::default().with_max_depth(0);
        ChainRunner::run(&key("A 100"), &Catalog::new(), &config);
    }
}
