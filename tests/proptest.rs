// SPDX-License-Identifier: MPL-2.0

//! Property tests for the algebraic laws the specification requires of `VersionSet` and `Term`
//! (§8): complement is an involution, union/intersection with the complement are full/empty, and
//! containment is the complement's negation.

use pubgrub_resolver::{Term, Version, VersionSet};
use proptest::prelude::*;

/// A version drawn from a small, densely overlapping range, so random intervals built from pairs
/// of these tend to actually intersect one another instead of almost always being disjoint.
fn arb_version() -> impl Strategy<Value = Version> {
    (0u32..6, 0u32..4, 0u32..4).prop_map(|(major, minor, patch)| Version::new(major, minor, patch))
}

fn arb_version_set() -> impl Strategy<Value = VersionSet> {
    prop_oneof![
        Just(VersionSet::empty()),
        Just(VersionSet::full()),
        arb_version().prop_map(VersionSet::singleton),
        arb_version().prop_map(|v| VersionSet::higher_than(v)),
        arb_version().prop_map(|v| VersionSet::strictly_lower_than(v)),
        (arb_version(), arb_version()).prop_map(|(a, b)| {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            VersionSet::between(low, high)
        }),
    ]
}

proptest! {
    #[test]
    fn union_with_complement_is_full(set in arb_version_set()) {
        prop_assert_eq!(set.union(&set.complement()), VersionSet::full());
    }

    #[test]
    fn intersection_with_complement_is_empty(set in arb_version_set()) {
        prop_assert_eq!(set.intersection(&set.complement()), VersionSet::empty());
    }

    #[test]
    fn double_complement_is_identity(set in arb_version_set()) {
        prop_assert_eq!(set.complement().complement(), set);
    }

    #[test]
    fn containment_and_complement_are_exclusive(set in arb_version_set(), version in arb_version()) {
        prop_assert_ne!(set.contains(&version), set.complement().contains(&version));
    }

    #[test]
    fn intersection_is_commutative(a in arb_version_set(), b in arb_version_set()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn union_is_commutative(a in arb_version_set(), b in arb_version_set()) {
        prop_assert_eq!(a.union(&b), b.union(&a));
    }

    #[test]
    fn intersection_contains_iff_both_contain(a in arb_version_set(), b in arb_version_set(), version in arb_version()) {
        prop_assert_eq!(
            a.intersection(&b).contains(&version),
            a.contains(&version) && b.contains(&version)
        );
    }

    #[test]
    fn union_contains_iff_either_contains(a in arb_version_set(), b in arb_version_set(), version in arb_version()) {
        prop_assert_eq!(
            a.union(&b).contains(&version),
            a.contains(&version) || b.contains(&version)
        );
    }

    #[test]
    fn term_double_negation_is_identity(set in arb_version_set()) {
        let term = Term::Positive(set);
        prop_assert_eq!(term.negate().negate(), term);
    }

    #[test]
    fn term_self_relation_is_satisfied(set in arb_version_set()) {
        let term = Term::Positive(set);
        prop_assert_eq!(term.relation_with(&term), pubgrub_resolver::Relation::Satisfied);
    }

    #[test]
    fn term_contains_matches_set_contains(set in arb_version_set(), version in arb_version()) {
        let term = Term::Positive(set.clone());
        prop_assert_eq!(term.contains(&version), set.contains(&version));
        prop_assert_eq!(term.negate().contains(&version), !set.contains(&version));
    }
}

#[test]
fn round_trip_algebra_example() {
    use pubgrub_resolver::parse_constraint;

    let s = parse_constraint(">=1.0.0,<2.0.0").unwrap();
    let t = parse_constraint(">=1.5.0").unwrap();
    assert_eq!(s.intersection(&t), parse_constraint(">=1.5.0,<2.0.0").unwrap());
    assert_eq!(
        s.complement(),
        parse_constraint("<1.0.0").unwrap().union(&parse_constraint(">=2.0.0").unwrap())
    );
    assert!(s.contains(&Version::new(1, 0, 0)));
    assert!(!s.contains(&Version::new(2, 0, 0)));
}
