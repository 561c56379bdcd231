// SPDX-License-Identifier: MPL-2.0

//! The public entry point: the `solve` loop that drives [State](crate::internal) to a fixpoint,
//! alternating unit propagation with decisions, and the bounded lookahead (§4.8) that screens a
//! decision candidate before it gets added to the solution.

use crate::error::PubGrubError;
use crate::internal::{Incompatibility, State};
use crate::package::Package;
use crate::provider::{Dependencies, DependencyProvider};
use crate::term::Term;
use crate::type_aliases::{DependencyConstraints, SelectedDependencies};
use crate::version::Version;
use crate::version_set::VersionSet;

/// Tunables for a single [solve] call.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Abort with [PubGrubError::IterationLimitExceeded] after this many passes through the
    /// decide/propagate loop. `None` (the default) never gives up.
    pub max_iterations: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: None,
        }
    }
}

/// Find a set of package versions satisfying every dependency reachable from `root_package` at
/// `root_version`, using `provider` as the source of truth for what versions exist and what they
/// depend on.
pub fn solve<DP: DependencyProvider>(
    provider: &DP,
    root_package: Package,
    root_version: Version,
) -> Result<SelectedDependencies, PubGrubError> {
    solve_with_config(provider, root_package, root_version, &SolverConfig::default())
}

/// Like [solve], but with explicit [SolverConfig] tunables.
pub fn solve_with_config<DP: DependencyProvider>(
    provider: &DP,
    root_package: Package,
    root_version: Version,
    config: &SolverConfig,
) -> Result<SelectedDependencies, PubGrubError> {
    let mut state = State::init(root_package.clone(), root_version);
    let mut next = root_package;
    let mut iterations: usize = 0;

    loop {
        if let Some(limit) = config.max_iterations {
            if iterations >= limit {
                return Err(PubGrubError::IterationLimitExceeded { limit });
            }
        }
        iterations += 1;

        state
            .unit_propagation(next)
            .map_err(PubGrubError::NoSolution)?;

        let Some((package, term_set)) = state
            .partial_solution
            .pick_next_package()
            .map(|(p, s)| (p.clone(), s.clone()))
        else {
            return Ok(state.partial_solution.extract_solution());
        };

        let Some(candidate) = pick_candidate(provider, &package, &term_set)? else {
            state.add_incompatibility(Incompatibility::no_versions(package.clone(), term_set));
            next = package;
            continue;
        };

        let initial_dependencies = get_dependencies(provider, &package, candidate)?;
        let (version, dependencies) =
            select_with_lookahead(provider, &state, &package, initial_dependencies, &term_set)?;

        let new_incompatibilities = state.add_incompatibilities(Incompatibility::from_dependencies(
            package.clone(),
            version,
            &dependencies,
        ));
        state.partial_solution.add_version_if_consistent(
            package.clone(),
            version,
            &new_incompatibilities,
            &state.incompatibility_store,
        );

        next = package;
    }
}

/// The provider's preferred candidate for `package` within `term_set`, falling back to scanning
/// [list_versions](DependencyProvider::list_versions) if the provider's
/// [choose_version](DependencyProvider::choose_version) hint turns out to not actually lie in
/// `term_set`: a misbehaving provider should make the solve slower, never wrong.
fn pick_candidate<DP: DependencyProvider>(
    provider: &DP,
    package: &Package,
    term_set: &VersionSet,
) -> Result<Option<Version>, PubGrubError> {
    let hinted = provider
        .choose_version(package, term_set)
        .map_err(|source| PubGrubError::ErrorRetrievingVersions {
            package: package.clone(),
            source: Box::new(source),
        })?;
    if let Some(version) = hinted {
        if term_set.contains(&version) {
            return Ok(Some(version));
        }
        log::warn!(
            "dependency provider suggested {} {} outside of {}, ignoring the hint",
            package,
            version,
            term_set
        );
    }
    let versions = provider
        .list_versions(package)
        .map_err(|source| PubGrubError::ErrorRetrievingVersions {
            package: package.clone(),
            source: Box::new(source),
        })?;
    Ok(versions.into_iter().find(|v| term_set.contains(v)))
}

fn get_dependencies<DP: DependencyProvider>(
    provider: &DP,
    package: &Package,
    version: Version,
) -> Result<(Version, DependencyConstraints), PubGrubError> {
    match provider
        .get_dependencies(package, &version)
        .map_err(|source| PubGrubError::ErrorRetrievingDependencies {
            package: package.clone(),
            version,
            source: Box::new(source),
        })? {
        Dependencies::Unknown => Err(PubGrubError::UnknownPackage {
            package: package.clone(),
        }),
        Dependencies::Known(deps) => Ok((version, deps)),
    }
}

/// Bounded lookahead (§4.8): before the main loop commits to `candidate`, check whether any of
/// its direct dependencies would immediately empty the accumulated term of an already-constrained
/// package, and if so, walk the provider's remaining candidates for `package` looking for one
/// that avoids the conflict. Falls back to the original candidate if no better alternative is
/// found: this is a heuristic that reduces thrashing, not a correctness gate, since the main
/// loop's own incompatibility bookkeeping remains the final authority either way.
fn select_with_lookahead<DP: DependencyProvider>(
    provider: &DP,
    state: &State,
    package: &Package,
    candidate: (Version, DependencyConstraints),
    term_set: &VersionSet,
) -> Result<(Version, DependencyConstraints), PubGrubError> {
    if is_lookahead_safe(state, package, &candidate.1) {
        return Ok(candidate);
    }
    log::debug!(
        "{} {} conflicts with an already-decided package one hop ahead, looking for an alternative",
        package,
        candidate.0
    );
    let versions = provider
        .list_versions(package)
        .map_err(|source| PubGrubError::ErrorRetrievingVersions {
            package: package.clone(),
            source: Box::new(source),
        })?;
    for version in versions {
        if version == candidate.0 || !term_set.contains(&version) {
            continue;
        }
        let alternative = get_dependencies(provider, package, version)?;
        if is_lookahead_safe(state, package, &alternative.1) {
            return Ok(alternative);
        }
    }
    Ok(candidate)
}

fn is_lookahead_safe(state: &State, package: &Package, dependencies: &DependencyConstraints) -> bool {
    dependencies.iter().all(|(dependency, dependency_set)| {
        dependency == package
            || match state.partial_solution.term_intersection_for_package(dependency) {
                None => true,
                Some(current) => {
                    current.intersection(&Term::Positive(dependency_set.clone())) != Term::empty()
                }
            }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OfflineDependencyProvider;
    use crate::version_set::parse_constraint;

    fn pkg(name: &str) -> Package {
        Package::new(name)
    }

    fn v(major: u32, minor: u32, patch: u32) -> Version {
        Version::new(major, minor, patch)
    }

    #[test]
    fn solves_a_trivial_dependency_chain() {
        let mut provider = OfflineDependencyProvider::new();
        provider.add_dependencies(
            pkg("root"),
            v(1, 0, 0),
            [(pkg("a"), parse_constraint(">=1.0.0").unwrap())],
        );
        provider.add_dependencies(pkg("a"), v(1, 0, 0), []);
        provider.add_dependencies(pkg("a"), v(2, 0, 0), []);

        let solution = solve(&provider, pkg("root"), v(1, 0, 0)).unwrap();
        assert_eq!(solution.get(&pkg("a")), Some(&v(2, 0, 0)));
    }

    #[test]
    fn backtracks_across_a_shared_dependency_conflict() {
        // root depends on a (any) and b (any).
        // a 2.0.0 depends on c >=2.0.0; a 1.0.0 has no dependencies.
        // b depends on c <2.0.0.
        // Picking a 2.0.0 first must be undone in favor of a 1.0.0.
        let mut provider = OfflineDependencyProvider::new();
        provider.add_dependencies(
            pkg("root"),
            v(1, 0, 0),
            [
                (pkg("a"), parse_constraint("*").unwrap()),
                (pkg("b"), parse_constraint("*").unwrap()),
            ],
        );
        provider.add_dependencies(pkg("a"), v(1, 0, 0), []);
        provider.add_dependencies(
            pkg("a"),
            v(2, 0, 0),
            [(pkg("c"), parse_constraint(">=2.0.0").unwrap())],
        );
        provider.add_dependencies(
            pkg("b"),
            v(1, 0, 0),
            [(pkg("c"), parse_constraint("<2.0.0").unwrap())],
        );
        provider.add_dependencies(pkg("c"), v(1, 0, 0), []);
        provider.add_dependencies(pkg("c"), v(2, 0, 0), []);

        let solution = solve(&provider, pkg("root"), v(1, 0, 0)).unwrap();
        assert_eq!(solution.get(&pkg("a")), Some(&v(1, 0, 0)));
        assert_eq!(solution.get(&pkg("b")), Some(&v(1, 0, 0)));
        assert_eq!(solution.get(&pkg("c")), Some(&v(1, 0, 0)));
    }

    #[test]
    fn reports_no_solution_for_a_direct_conflict() {
        let mut provider = OfflineDependencyProvider::new();
        provider.add_dependencies(
            pkg("root"),
            v(1, 0, 0),
            [
                (pkg("a"), parse_constraint(">=2.0.0").unwrap()),
                (pkg("a"), parse_constraint("<2.0.0").unwrap()),
            ],
        );
        provider.add_dependencies(pkg("a"), v(1, 0, 0), []);
        provider.add_dependencies(pkg("a"), v(2, 0, 0), []);

        assert!(matches!(
            solve(&provider, pkg("root"), v(1, 0, 0)),
            Err(PubGrubError::NoSolution(_))
        ));
    }

    #[test]
    fn reports_no_versions_when_a_dependency_is_unsatisfiable() {
        let mut provider = OfflineDependencyProvider::new();
        provider.add_dependencies(
            pkg("root"),
            v(1, 0, 0),
            [(pkg("a"), parse_constraint(">=3.0.0").unwrap())],
        );
        provider.add_dependencies(pkg("a"), v(1, 0, 0), []);
        provider.add_dependencies(pkg("a"), v(2, 0, 0), []);

        assert!(matches!(
            solve(&provider, pkg("root"), v(1, 0, 0)),
            Err(PubGrubError::NoSolution(_))
        ));
    }

    #[test]
    fn honors_an_iteration_cap() {
        let mut provider = OfflineDependencyProvider::new();
        provider.add_dependencies(pkg("root"), v(1, 0, 0), []);

        let config = SolverConfig {
            max_iterations: Some(0),
        };
        assert!(matches!(
            solve_with_config(&provider, pkg("root"), v(1, 0, 0), &config),
            Err(PubGrubError::IterationLimitExceeded { limit: 0 })
        ));
    }
}
