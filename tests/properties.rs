//! Property-based tests for normalization and chain evaluation.

use proptest::prelude::*;

use u_prereq::catalog::Catalog;
use u_prereq::chain::{ChainConfig, ChainRunner};
use u_prereq::normalize::normalize;
use u_prereq::requirement::{CourseKey, Level, PlacementSubject, Requirement, Timing};

/// Fragments of real requisite prose, including the awkward ones.
fn vocabulary_text() -> impl Strategy<Value = String> {
    let words = prop::sample::select(vec![
        "MATH 1200",
        "CS 2400",
        "AST 1010",
        "1020",
        "and",
        "or",
        "and/or",
        ",",
        ";",
        "(",
        ")",
        "[",
        "]",
        "&",
        "concurrent",
        "or concurrent",
        "may be taken concurrently",
        "one of",
        "either",
        "Jr",
        "Soph",
        "senior standing",
        "2.5 GPA",
        "permission of instructor",
        "Math placement level 3",
        "C or better in",
        "WARNING:",
        "(formerly CS 240)",
        "Prereq:",
        "none",
        "equivalent experience",
    ]);
    prop::collection::vec(words, 0..16).prop_map(|words| words.join(" "))
}

fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![vocabulary_text(), "\\PC{0,80}"]
}

fn leaf() -> impl Strategy<Value = Requirement> {
    let course = (
        prop::sample::select(vec!["MATH", "CS", "AST", "CHEM", "PHYS"]),
        1000u32..5000,
        prop::sample::select(vec![
            Timing::Completed,
            Timing::Concurrent,
            Timing::ConcurrentOrCompleted,
        ]),
    )
        .prop_map(|(subject, number, timing)| {
            Requirement::course_with(CourseKey::new(subject, number.to_string()), timing)
        });
    let level = prop::sample::select(Level::ALL.to_vec()).prop_map(|level| Requirement::Level { level });
    let gpa = prop::sample::select(vec![2.0, 2.5, 2.75, 3.0, 3.5]).prop_map(|gpa| Requirement::Gpa { gpa });
    let permission = prop::sample::select(vec!["Instructor", "Department", "Department Chair"])
        .prop_map(|authority| Requirement::Permission {
            authority: authority.to_string(),
        });
    let placement = (
        prop::sample::select(PlacementSubject::ALL.to_vec()),
        prop::sample::select(vec!["1", "2", "2.5", "3", "DV"]),
    )
        .prop_map(|(subject, level)| Requirement::Placement {
            subject,
            level: level.to_string(),
        });
    prop_oneof![4 => course, 1 => level, 1 => gpa, 1 => permission, 1 => placement]
}

/// Canonical trees without `OTHER` leaves.
fn tree() -> impl Strategy<Value = Requirement> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        (prop::collection::vec(inner, 2..5), any::<bool>()).prop_map(|(children, conj)| {
            if conj {
                Requirement::all(children)
            } else {
                Requirement::any(children)
            }
        })
    })
}

/// A catalog of `n` courses whose requirements reference each other
/// arbitrarily, cycles included.
fn catalog() -> impl Strategy<Value = (Catalog, Vec<CourseKey>)> {
    (1usize..12).prop_flat_map(|n| {
        prop::collection::vec(
            (prop::collection::vec(0usize..n + 2, 0..4), any::<bool>()),
            n,
        )
        .prop_map(move |specs| {
            let key = |i: usize| CourseKey::new("CS", format!("{}", 1000 + i));
            let keys: Vec<CourseKey> = (0..n).map(key).collect();
            let catalog = specs
                .into_iter()
                .enumerate()
                .map(|(i, (refs, conj))| {
                    let children = refs
                        .into_iter()
                        .map(|r| Requirement::course_with(key(r), Timing::Completed))
                        .collect();
                    let req = if conj {
                        Requirement::all(children)
                    } else {
                        Requirement::any(children)
                    };
                    (key(i), req)
                })
                .collect();
            (catalog, keys)
        })
    })
}

proptest! {
    /// Property: normalization never panics and always yields a valid tree.
    #[test]
    fn prop_normalize_is_total_and_valid(text in any_text()) {
        let req = normalize(&text);
        prop_assert!(req.validate().is_ok(), "{:?} -> {:?}", text, req);
    }

    /// Property: re-normalizing serialized output is the identity.
    #[test]
    fn prop_normalize_serialize_idempotent(text in any_text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once.to_json()), once);
    }

    /// Property: JSON round-trip preserves the tree.
    #[test]
    fn prop_json_round_trip(req in tree()) {
        let decoded: Requirement = serde_json::from_str(&req.to_json()).unwrap();
        prop_assert_eq!(decoded, req);
    }

    /// Property: rendered text of a structured tree parses back to it.
    #[test]
    fn prop_display_renormalizes(req in tree()) {
        let text = req.to_string();
        prop_assert_eq!(normalize(&text), req, "{}", text);
    }

    /// Property: every chain is a real, repetition-free walk through the
    /// catalog that starts at the target.
    #[test]
    fn prop_chain_is_consistent((catalog, keys) in catalog()) {
        let config = ChainConfig::default();
        for (target, result) in keys.iter().zip(ChainRunner::run_batch(&keys, &catalog, &config)) {
            prop_assert!(result.length >= 1);
            prop_assert_eq!(result.path.len(), result.length);
            prop_assert_eq!(&result.path[0], target);
            prop_assert!(result.terms <= result.length);
            prop_assert!(!result.truncated);

            for pair in result.path.windows(2) {
                let references = catalog
                    .get(&pair[0])
                    .map(|req| req.course_keys().contains(&&pair[1]))
                    .unwrap_or(false);
                prop_assert!(references, "{} does not require {}", pair[0], pair[1]);
            }

            let mut seen = result.path.clone();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), result.path.len());
        }
    }
}
