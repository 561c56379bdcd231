// SPDX-License-Identifier: MPL-2.0

//! An incompatibility is a set of terms for different packages that should never be satisfied
//! all together.

use std::fmt;

use crate::internal::arena::{Arena, Id};
use crate::package::Package;
use crate::report::{DefaultStringReporter, Derived, DerivationTree, External};
use crate::term::{self, Term};
use crate::type_aliases::{DependencyConstraints, Map, Set};
use crate::version::Version;
use crate::version_set::VersionSet;

/// An incompatibility is a set of terms for different packages that should never be satisfied
/// all together.
///
/// An incompatibility usually originates from a package dependency. For example, if package A at
/// version 1 depends on package B at version 2, you can never have both terms `A = 1` and
/// `not B = 2` satisfied at the same time in a partial solution: that would mean a solution was
/// found with A at 1 but not B at 2, which dependency says is impossible. So the set
/// `{ A = 1, not B = 2 }` is an incompatibility, derived from the dependencies of A at 1.
///
/// Incompatibilities can also be derived from two other incompatibilities during conflict
/// resolution; see [Incompatibility::prior_cause].
#[derive(Debug, Clone)]
pub struct Incompatibility {
    package_terms: Map<Package, Term>,
    cause: Cause,
}

/// Why an incompatibility holds.
#[derive(Debug, Clone)]
enum Cause {
    /// The initial incompatibility forcing the root package to be selected.
    Root { package: Package, version: Version },
    /// There are no versions satisfying `set` for `package`.
    NoVersions { package: Package, set: VersionSet },
    /// `package` at `version` depends on `dependency` within `dependency_set`.
    DependencyOf {
        package: Package,
        version: Version,
        dependency: Package,
        dependency_set: VersionSet,
    },
    /// Derived by the rule of resolution from two prior incompatibilities.
    Derived {
        id1: Id<Incompatibility>,
        id2: Id<Incompatibility>,
    },
}

/// How a set of terms (typically the terms known so far in the partial solution) compares to an
/// incompatibility.
#[derive(Eq, PartialEq, Debug)]
pub enum Relation {
    /// S satisfies I if S satisfies every term in I.
    Satisfied,
    /// S contradicts I if S contradicts at least one term in I.
    Contradicted(Package, Term),
    /// S satisfies all but one of I's terms, and is inconclusive for the remaining one.
    AlmostSatisfied(Package),
    /// Otherwise.
    Inconclusive,
}

impl Incompatibility {
    /// The initial incompatibility forcing the resolution to pick `root_version` for
    /// `root_package`: `{ root_package: not root_version }`.
    pub fn from_root(root_package: Package, root_version: Version) -> Self {
        let mut package_terms = Map::default();
        package_terms.insert(
            root_package.clone(),
            Term::Negative(VersionSet::singleton(root_version)),
        );
        Self {
            package_terms,
            cause: Cause::Root {
                package: root_package,
                version: root_version,
            },
        }
    }

    /// Remember that `set` has no satisfying version of `package`.
    pub fn no_versions(package: Package, set: VersionSet) -> Self {
        let mut package_terms = Map::default();
        package_terms.insert(package.clone(), Term::Positive(set.clone()));
        Self {
            package_terms,
            cause: Cause::NoVersions { package, set },
        }
    }

    /// Build one incompatibility per dependency of `package` at `version`:
    /// `{ package: version, dependency: not dependency_set }`.
    pub fn from_dependencies(
        package: Package,
        version: Version,
        deps: &DependencyConstraints,
    ) -> Vec<Self> {
        deps.iter()
            .map(|(dependency, dependency_set)| {
                Self::from_dependency(
                    package.clone(),
                    version,
                    dependency.clone(),
                    dependency_set.clone(),
                )
            })
            .collect()
    }

    fn from_dependency(
        package: Package,
        version: Version,
        dependency: Package,
        dependency_set: VersionSet,
    ) -> Self {
        let mut package_terms = Map::default();
        package_terms.insert(package.clone(), Term::exact(version));
        package_terms.insert(dependency.clone(), Term::Negative(dependency_set.clone()));
        Self {
            package_terms,
            cause: Cause::DependencyOf {
                package,
                version,
                dependency,
                dependency_set,
            },
        }
    }

    /// Derive a new incompatibility from `incompat` and `satisfier_cause` by the rule of
    /// resolution, eliminating `package` (which must appear, with opposite sign, in both).
    ///
    /// `package`'s terms are dropped entirely from the result. For every other package that
    /// appears in both parents, the result keeps the intersection of the two terms, unless that
    /// intersection is `Term::any()` (always true), in which case the package carries no
    /// information and is dropped too.
    pub fn prior_cause(
        id1: Id<Incompatibility>,
        id2: Id<Incompatibility>,
        incompat: &Self,
        satisfier_cause: &Self,
        package: &Package,
    ) -> Self {
        let mut package_terms = incompat.package_terms.clone();
        let t1 = package_terms.remove(package).expect("package must be present");
        for (p, t2) in satisfier_cause.package_terms.iter() {
            if p == package {
                continue;
            }
            match package_terms.get(p) {
                Some(t1_other) => {
                    let merged = t1_other.intersection(t2);
                    package_terms.insert(p.clone(), merged);
                }
                None => {
                    package_terms.insert(p.clone(), t2.clone());
                }
            }
        }
        package_terms.retain(|_, t| *t != Term::any());
        let t2 = satisfier_cause
            .package_terms
            .get(package)
            .expect("package must be present");
        let term = t1.union(t2);
        if term != Term::any() {
            package_terms.insert(package.clone(), term);
        }
        Self {
            package_terms,
            cause: Cause::Derived { id1, id2 },
        }
    }

    /// How the terms known so far (queried via `terms`) relate to this incompatibility.
    pub fn relation(&self, mut terms: impl FnMut(&Package) -> Option<Term>) -> Relation {
        let mut relation = Relation::Satisfied;
        for (package, incompat_term) in self.package_terms.iter() {
            match terms(package).map(|term| incompat_term.relation_with(&term)) {
                Some(term::Relation::Satisfied) => {}
                Some(term::Relation::Contradicted) => {
                    return Relation::Contradicted(package.clone(), incompat_term.clone());
                }
                None | Some(term::Relation::Inconclusive) => {
                    // A package absent from `terms` behaves as `Term::any()`, which we never
                    // leave in `package_terms`, so this can only be inconclusive or the first
                    // near-miss.
                    if relation == Relation::Satisfied {
                        relation = Relation::AlmostSatisfied(package.clone());
                    } else {
                        relation = Relation::Inconclusive;
                    }
                }
            }
        }
        relation
    }

    /// Whether this incompatibility, once satisfied, ends the solve: it must force the root
    /// package to be excluded, which is impossible, so the algorithm instead reports success (if
    /// this is the very first decision) or terminates via conflict resolution.
    pub fn is_terminal(&self, root_package: &Package, root_version: &Version) -> bool {
        match self.package_terms.len() {
            0 => true,
            1 => {
                let (package, term) = self.package_terms.iter().next().unwrap();
                package == root_package && term.contains(root_version)
            }
            _ => false,
        }
    }

    /// The term this incompatibility places on `package`, if any.
    pub fn get(&self, package: &Package) -> Option<&Term> {
        self.package_terms.get(package)
    }

    /// Iterate over the `(package, term)` pairs of this incompatibility.
    pub fn iter(&self) -> impl Iterator<Item = (&Package, &Term)> {
        self.package_terms.iter()
    }

    /// The two parent ids, if this incompatibility was [derived](Cause::Derived).
    pub fn causes(&self) -> Option<(Id<Incompatibility>, Id<Incompatibility>)> {
        match self.cause {
            Cause::Derived { id1, id2 } => Some((id1, id2)),
            _ => None,
        }
    }

    /// Build a [DerivationTree] explaining this incompatibility, for error reporting.
    pub fn build_derivation_tree(
        &self,
        self_id: Id<Incompatibility>,
        shared_ids: &Set<Id<Incompatibility>>,
        store: &Arena<Incompatibility>,
    ) -> DerivationTree {
        match &self.cause {
            Cause::Derived { id1, id2 } => {
                let cause1 = store[*id1].build_derivation_tree(*id1, shared_ids, store);
                let cause2 = store[*id2].build_derivation_tree(*id2, shared_ids, store);
                DerivationTree::Derived(Derived {
                    terms: self.package_terms.clone(),
                    shared_id: shared_ids.contains(&self_id).then_some(self_id.into_raw()),
                    cause1: Box::new(cause1),
                    cause2: Box::new(cause2),
                })
            }
            Cause::Root { package, version } => {
                DerivationTree::External(External::NotRoot(package.clone(), *version))
            }
            Cause::NoVersions { package, set } => {
                DerivationTree::External(External::NoVersions(package.clone(), set.clone()))
            }
            Cause::DependencyOf {
                package,
                version,
                dependency,
                dependency_set,
            } => DerivationTree::External(External::FromDependencyOf(
                package.clone(),
                *version,
                dependency.clone(),
                dependency_set.clone(),
            )),
        }
    }
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", DefaultStringReporter::string_terms(&self.package_terms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> VersionSet {
        crate::version_set::parse_constraint(s).unwrap()
    }

    #[test]
    fn rule_of_resolution_drops_the_shared_package() {
        // { p1: >=1.0.0, p2: not >=2.0.0 }, { p2: >=2.0.0, p3: >=1.0.0 } -> { p1: >=1.0.0, p3: >=1.0.0 }
        let p1 = Package::new("p1");
        let p2 = Package::new("p2");
        let p3 = Package::new("p3");

        let mut terms1 = Map::default();
        terms1.insert(p1.clone(), Term::Positive(set(">=1.0.0")));
        terms1.insert(p2.clone(), Term::Negative(set(">=2.0.0")));
        let i1 = Incompatibility {
            package_terms: terms1,
            cause: Cause::Root {
                package: p1.clone(),
                version: Version::new(1, 0, 0),
            },
        };

        let mut terms2 = Map::default();
        terms2.insert(p2.clone(), Term::Positive(set(">=2.0.0")));
        terms2.insert(p3.clone(), Term::Positive(set(">=1.0.0")));
        let i2 = Incompatibility {
            package_terms: terms2,
            cause: Cause::Root {
                package: p2.clone(),
                version: Version::new(1, 0, 0),
            },
        };

        let mut arena: Arena<Incompatibility> = Arena::new();
        let id1 = arena.alloc(i1.clone());
        let id2 = arena.alloc(i2.clone());

        let resolved = Incompatibility::prior_cause(id1, id2, &i1, &i2, &p2);
        assert_eq!(resolved.get(&p2), None);
        assert_eq!(resolved.get(&p1), Some(&Term::Positive(set(">=1.0.0"))));
        assert_eq!(resolved.get(&p3), Some(&Term::Positive(set(">=1.0.0"))));
    }

    #[test]
    fn is_terminal_when_only_term_is_root_at_its_version() {
        let root = Package::root("root");
        let version = Version::new(1, 0, 0);
        let incompat = Incompatibility::from_root(root.clone(), version);
        // from_root builds { root: not version }, which is terminal only for the negated form
        // used directly by the solver; check the positive exact-root case instead.
        let mut package_terms = Map::default();
        package_terms.insert(root.clone(), Term::exact(version));
        let terminal = Incompatibility {
            package_terms,
            cause: Cause::Root {
                package: root.clone(),
                version,
            },
        };
        assert!(terminal.is_terminal(&root, &version));
        assert!(!incompat.is_terminal(&root, &Version::new(2, 0, 0)));
    }
}
