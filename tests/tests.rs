// SPDX-License-Identifier: MPL-2.0

//! End-to-end resolution scenarios, including the concrete cases enumerated in the
//! specification's testable-properties section.

use pubgrub_resolver::{solve, DefaultStringReporter, OfflineDependencyProvider, Package, PubGrubError, Reporter};
use pubgrub_resolver::{parse_constraint, Version};

fn pkg(name: &str) -> Package {
    Package::new(name)
}

fn root() -> Package {
    Package::root("root")
}

fn v(major: u32, minor: u32, patch: u32) -> Version {
    Version::new(major, minor, patch)
}

fn cs(s: &str) -> pubgrub_resolver::VersionSet {
    parse_constraint(s).unwrap()
}

/// Scenario 1: a basic two-sibling-dependency case with no conflicts.
#[test]
fn scenario_basic() {
    let mut provider = OfflineDependencyProvider::new();
    provider.add_dependencies(
        root(),
        v(1, 0, 0),
        [
            (pkg("a"), cs(">=1.0.0")),
            (pkg("b"), cs(">=1.0.0")),
        ],
    );
    provider.add_dependencies(pkg("a"), v(1, 0, 0), []);
    provider.add_dependencies(pkg("b"), v(1, 0, 0), []);

    let solution = solve(&provider, root(), v(1, 0, 0)).unwrap();
    assert_eq!(solution.get(&root()), Some(&v(1, 0, 0)));
    assert_eq!(solution.get(&pkg("a")), Some(&v(1, 0, 0)));
    assert_eq!(solution.get(&pkg("b")), Some(&v(1, 0, 0)));
}

/// Scenario 2 (pubgrub scenario 2): bounded lookahead should steer the solver away from
/// `foo:1.1.0`, which would force a `bar` conflict, straight to `foo:1.0.0`, without needing to
/// backtrack.
#[test]
fn scenario_lookahead_avoids_a_conflicting_candidate() {
    let mut provider = OfflineDependencyProvider::new();
    provider.add_dependencies(
        root(),
        v(1, 0, 0),
        [
            (pkg("foo"), cs(">=1.0.0,<2.0.0")),
            (pkg("bar"), cs(">=1.0.0,<2.0.0")),
        ],
    );
    provider.add_dependencies(pkg("foo"), v(1, 0, 0), []);
    provider.add_dependencies(pkg("foo"), v(1, 1, 0), [(pkg("bar"), cs(">=2.0.0"))]);
    provider.add_dependencies(pkg("bar"), v(1, 0, 0), []);
    provider.add_dependencies(pkg("bar"), v(1, 1, 0), []);

    let solution = solve(&provider, root(), v(1, 0, 0)).unwrap();
    assert_eq!(solution.get(&pkg("foo")), Some(&v(1, 0, 0)));
}

/// Scenario 3: a hard conflict between two shared-dependency subtrees, unsatisfiable regardless
/// of backtracking.
#[test]
fn scenario_hard_conflict_reports_no_solution() {
    let mut provider = OfflineDependencyProvider::new();
    provider.add_dependencies(
        root(),
        v(1, 0, 0),
        [(pkg("a"), cs(">=1.0.0")), (pkg("b"), cs(">=1.0.0"))],
    );
    provider.add_dependencies(pkg("a"), v(1, 0, 0), [(pkg("shared"), cs(">=1.0.0,<2.0.0"))]);
    provider.add_dependencies(pkg("b"), v(1, 0, 0), [(pkg("shared"), cs(">=2.0.0"))]);
    provider.add_dependencies(pkg("shared"), v(1, 0, 0), []);
    provider.add_dependencies(pkg("shared"), v(2, 0, 0), []);

    match solve(&provider, root(), v(1, 0, 0)) {
        Err(PubGrubError::NoSolution(tree)) => {
            let packages = tree.packages();
            assert!(packages.contains(&pkg("shared")));
            assert!(packages.contains(&pkg("a")) || packages.contains(&pkg("b")));
            // The rendered report should at least mention the conflicting package.
            let report = DefaultStringReporter::report(&tree);
            assert!(report.contains("shared"));
        }
        other => panic!("expected NoSolution, got {:?}", other.map(|_| ())),
    }
}

/// Scenario 4: the first candidate for `x` (2.0.0) requires a `y` version that does not exist;
/// the solver must backtrack across a decision level to try `x:1.0.0` instead.
#[test]
fn scenario_backtracks_across_a_decision_level() {
    let mut provider = OfflineDependencyProvider::new();
    provider.add_dependencies(root(), v(1, 0, 0), [(pkg("x"), cs(">=1.0.0"))]);
    provider.add_dependencies(pkg("x"), v(1, 0, 0), []);
    provider.add_dependencies(pkg("x"), v(2, 0, 0), [(pkg("y"), cs("==1.0.0"))]);
    provider.add_dependencies(pkg("y"), v(2, 0, 0), []);

    let solution = solve(&provider, root(), v(1, 0, 0)).unwrap();
    assert_eq!(solution.get(&pkg("x")), Some(&v(1, 0, 0)));
    assert_eq!(solution.get(&pkg("y")), None);
}

/// Scenario 5: a direct dependency on a version that plain does not exist reduces to the empty
/// clause immediately (no decision was ever free to backtrack).
#[test]
fn scenario_empty_clause_on_an_unsatisfiable_direct_dependency() {
    let mut provider = OfflineDependencyProvider::new();
    provider.add_dependencies(root(), v(1, 0, 0), [(pkg("z"), cs("==1.0.0"))]);
    provider.add_dependencies(pkg("z"), v(2, 0, 0), []);

    match solve(&provider, root(), v(1, 0, 0)) {
        Err(PubGrubError::NoSolution(tree)) => {
            assert!(tree.packages().contains(&pkg("z")));
        }
        other => panic!("expected NoSolution, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn unlisted_dependency_reduces_to_no_solution() {
    let mut provider = OfflineDependencyProvider::new();
    provider.add_dependencies(root(), v(1, 0, 0), [(pkg("ghost"), cs("*"))]);
    // "ghost" is never added to the provider at all, so it has no versions.

    assert!(matches!(
        solve(&provider, root(), v(1, 0, 0)),
        Err(PubGrubError::NoSolution(_))
    ));
}

#[test]
fn a_provider_that_forgets_a_versions_dependencies_is_reported_as_an_error() {
    use pubgrub_resolver::{Dependencies, DependencyProvider};
    use std::convert::Infallible;

    struct Forgetful;

    impl DependencyProvider for Forgetful {
        type Err = Infallible;

        fn list_versions(&self, package: &Package) -> Result<Vec<Version>, Infallible> {
            Ok(if package == &root() || package == &pkg("a") {
                vec![v(1, 0, 0)]
            } else {
                vec![]
            })
        }

        fn get_dependencies(&self, package: &Package, _version: &Version) -> Result<Dependencies, Infallible> {
            Ok(if package == &root() {
                Dependencies::Known(vec![(pkg("a"), cs("*"))])
            } else {
                // "a" is listed as having a version, but that version's dependencies were never
                // recorded.
                Dependencies::Unknown
            })
        }
    }

    assert!(matches!(
        solve(&Forgetful, root(), v(1, 0, 0)),
        Err(PubGrubError::UnknownPackage { .. })
    ));
}

#[test]
fn diamond_dependency_converges_on_a_compatible_version() {
    let mut provider = OfflineDependencyProvider::new();
    provider.add_dependencies(
        root(),
        v(1, 0, 0),
        [(pkg("a"), cs("*")), (pkg("b"), cs("*"))],
    );
    provider.add_dependencies(pkg("a"), v(1, 0, 0), [(pkg("c"), cs(">=1.0.0,<2.0.0"))]);
    provider.add_dependencies(pkg("b"), v(1, 0, 0), [(pkg("c"), cs(">=1.5.0,<3.0.0"))]);
    provider.add_dependencies(pkg("c"), v(1, 0, 0), []);
    provider.add_dependencies(pkg("c"), v(1, 5, 0), []);
    provider.add_dependencies(pkg("c"), v(2, 0, 0), []);

    let solution = solve(&provider, root(), v(1, 0, 0)).unwrap();
    assert_eq!(solution.get(&pkg("c")), Some(&v(1, 5, 0)));
}
