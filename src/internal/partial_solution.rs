// SPDX-License-Identifier: MPL-2.0

//! The partial solution is the ordered assignment log the solver builds as it decides and
//! derives package versions, together with the per-package intersection of everything asserted
//! about it so far.

use std::fmt;

use crate::internal::arena::Arena;
use crate::internal::incompatibility::{Incompatibility, Relation};
use crate::package::Package;
use crate::term::Term;
use crate::type_aliases::{Map, SelectedDependencies};
use crate::version::Version;
use crate::version_set::VersionSet;

use super::IncompId;

/// A counter incremented by every [Decision](AssignmentsIntersection::Decision); scopes
/// [PartialSolution::backtrack].
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default)]
pub struct DecisionLevel(pub u32);

impl DecisionLevel {
    fn increment(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for DecisionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the per-package history: either the exact version assigned by a
/// [Decision](AssignmentsIntersection::Decision), or a [Term] forced on the package by unit
/// propagation from `cause`.
#[derive(Clone, Debug)]
struct DatedDerivation {
    global_index: u32,
    decision_level: DecisionLevel,
    cause: IncompId,
    accumulated_intersection: Term,
}

#[derive(Clone, Debug)]
enum AssignmentsIntersection {
    Decision(u32, Version, Term),
    Derivations(Term),
}

impl AssignmentsIntersection {
    fn term(&self) -> &Term {
        match self {
            Self::Decision(_, _, term) => term,
            Self::Derivations(term) => term,
        }
    }

    /// A package is undecided and positively constrained: a candidate for the next decision.
    fn undecided_candidate<'a>(&'a self, package: &'a Package) -> Option<(&'a Package, &'a VersionSet)> {
        match self {
            Self::Decision(..) => None,
            Self::Derivations(term) => term.is_positive().then(|| (package, term.unwrap_positive())),
        }
    }
}

#[derive(Clone, Debug)]
struct PackageAssignments {
    smallest_decision_level: DecisionLevel,
    highest_decision_level: DecisionLevel,
    dated_derivations: Vec<DatedDerivation>,
    assignments_intersection: AssignmentsIntersection,
}

/// The ordered log of decisions and derivations the solver has made so far, plus the per-package
/// intersection of every term asserted about it.
#[derive(Clone, Debug, Default)]
pub struct PartialSolution {
    next_global_index: u32,
    current_decision_level: DecisionLevel,
    package_assignments: Map<Package, PackageAssignments>,
}

/// Where conflict resolution should resume after [PartialSolution::satisfier_search].
#[derive(Clone, Debug)]
pub enum SatisfierSearch {
    DifferentDecisionLevels {
        previous_satisfier_level: DecisionLevel,
    },
    SameDecisionLevels {
        satisfier_cause: IncompId,
    },
}

impl PartialSolution {
    /// An empty partial solution, with nothing decided or derived yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The current decision level: incremented by every [PartialSolution::add_decision].
    pub fn current_decision_level(&self) -> DecisionLevel {
        self.current_decision_level
    }

    /// Record that `package` was decided to be exactly `version`, opening a new decision level.
    pub fn add_decision(&mut self, package: Package, version: Version) {
        self.current_decision_level = self.current_decision_level.increment();
        let pa = self
            .package_assignments
            .get_mut(&package)
            .expect("a package can only be decided after a derivation introduced it");
        debug_assert!(
            matches!(&pa.assignments_intersection, AssignmentsIntersection::Derivations(term) if term.contains(&version)),
            "{} was expected to already be a positively constrained, undecided package",
            package
        );
        pa.highest_decision_level = self.current_decision_level;
        pa.assignments_intersection =
            AssignmentsIntersection::Decision(self.next_global_index, version, Term::exact(version));
        self.next_global_index += 1;
    }

    /// Record that unit propagation forced `term` on `package`, because `cause` would otherwise
    /// have become violated.
    pub fn add_derivation(&mut self, package: Package, cause: IncompId, store: &Arena<Incompatibility>) {
        let incoming_term = store[cause]
            .get(&package)
            .expect("the cause must mention the package being derived")
            .negate();
        let mut dated_derivation = DatedDerivation {
            global_index: self.next_global_index,
            decision_level: self.current_decision_level,
            cause,
            accumulated_intersection: incoming_term.clone(),
        };
        self.next_global_index += 1;
        match self.package_assignments.get_mut(&package) {
            Some(pa) => {
                pa.highest_decision_level = self.current_decision_level;
                match &mut pa.assignments_intersection {
                    AssignmentsIntersection::Decision(..) => {
                        panic!("a decided package cannot receive a further derivation")
                    }
                    AssignmentsIntersection::Derivations(t) => {
                        *t = t.intersection(&incoming_term);
                        dated_derivation.accumulated_intersection = t.clone();
                    }
                }
                pa.dated_derivations.push(dated_derivation);
            }
            None => {
                self.package_assignments.insert(
                    package,
                    PackageAssignments {
                        smallest_decision_level: self.current_decision_level,
                        highest_decision_level: self.current_decision_level,
                        dated_derivations: vec![dated_derivation],
                        assignments_intersection: AssignmentsIntersection::Derivations(incoming_term),
                    },
                );
            }
        }
    }

    /// The accumulated term known so far for `package`, if anything has been asserted about it.
    pub fn term_intersection_for_package(&self, package: &Package) -> Option<&Term> {
        self.package_assignments
            .get(package)
            .map(|pa| pa.assignments_intersection.term())
    }

    /// How the partial solution relates to `incompat`: whether it is violated, forces a unique
    /// derivation, is irrelevant, or is inconclusive.
    pub fn relation(&self, incompat: &Incompatibility) -> Relation {
        incompat.relation(|package| self.term_intersection_for_package(package).cloned())
    }

    /// An undecided package that the partial solution already constrains to a non-trivial
    /// positive set, i.e. a candidate for the next decision. `None` once every positively
    /// constrained package has been decided.
    pub fn pick_next_package(&self) -> Option<(&Package, &VersionSet)> {
        self.package_assignments
            .iter()
            .find_map(|(p, pa)| pa.assignments_intersection.undecided_candidate(p))
    }

    /// Drop every assignment made at a decision level deeper than `to_level`.
    pub fn backtrack(&mut self, to_level: DecisionLevel) {
        self.current_decision_level = to_level;
        self.package_assignments.retain(|_, pa| {
            if pa.smallest_decision_level > to_level {
                false
            } else if pa.highest_decision_level <= to_level {
                true
            } else {
                while pa
                    .dated_derivations
                    .last()
                    .map(|dd| dd.decision_level)
                    .is_some_and(|level| level > to_level)
                {
                    pa.dated_derivations.pop();
                }
                debug_assert!(!pa.dated_derivations.is_empty());
                let last = pa.dated_derivations.last().unwrap();
                pa.highest_decision_level = last.decision_level;
                pa.assignments_intersection =
                    AssignmentsIntersection::Derivations(last.accumulated_intersection.clone());
                true
            }
        });
    }

    /// Every package that received a [Decision](AssignmentsIntersection::Decision), with its
    /// chosen version.
    pub fn extract_solution(&self) -> SelectedDependencies {
        self.package_assignments
            .iter()
            .filter_map(|(p, pa)| match &pa.assignments_intersection {
                AssignmentsIntersection::Decision(_, v, _) => Some((p.clone(), *v)),
                AssignmentsIntersection::Derivations(_) => None,
            })
            .collect()
    }

    /// Add `package` at `version` as a decision, but only if doing so does not immediately
    /// violate one of its freshly added `new_incompatibilities` (the bounded-lookahead check of
    /// §4.8 already screened the candidate; this is the final guard applied right before commit).
    pub fn add_version_if_consistent(
        &mut self,
        package: Package,
        version: Version,
        new_incompatibilities: &[IncompId],
        store: &Arena<Incompatibility>,
    ) -> bool {
        let exact = Term::exact(version);
        let consistent = new_incompatibilities.iter().all(|id| {
            store[*id].relation(|p| {
                if p == &package {
                    Some(exact.clone())
                } else {
                    self.term_intersection_for_package(p).cloned()
                }
            }) != Relation::Satisfied
        });
        if consistent {
            self.add_decision(package, version);
        }
        consistent
    }

    /// Locate the "satisfier" of a just-violated incompatibility: the most recent assignment
    /// whose addition made every one of its terms hold, and the decision level conflict
    /// resolution should consider backtracking to if that assignment turns out to have been a
    /// free decision (§4.7).
    pub fn satisfier_search(
        &self,
        incompat: &Incompatibility,
        store: &Arena<Incompatibility>,
    ) -> (Package, SatisfierSearch) {
        let mut satisfied: Vec<(Package, Option<IncompId>, u32, DecisionLevel)> = Vec::new();
        for (package, incompat_term) in incompat.iter() {
            let pa = self
                .package_assignments
                .get(package)
                .expect("every package in a relevant incompatibility has been assigned");
            let (cause, idx, level) = pa.satisfier(package, &incompat_term.negate());
            satisfied.push((package.clone(), cause, idx, level));
        }
        let (satisfier_package, satisfier_cause, _, satisfier_level) = satisfied
            .iter()
            .max_by_key(|(_, _, idx, _)| *idx)
            .cloned()
            .expect("a violated incompatibility has at least one term");

        let previous_satisfier_level = self.previous_satisfier_level(
            incompat,
            &satisfier_package,
            satisfied,
            store,
        );

        let result = if previous_satisfier_level >= satisfier_level {
            SatisfierSearch::SameDecisionLevels {
                satisfier_cause: satisfier_cause.expect(
                    "a satisfier at the same level as the previous satisfier must itself be a derivation",
                ),
            }
        } else {
            SatisfierSearch::DifferentDecisionLevels {
                previous_satisfier_level,
            }
        };
        (satisfier_package, result)
    }

    /// Re-run the satisfier search for `satisfier_package` alone, this time requiring the
    /// stricter term that excludes the exact assignment that completed the original satisfier, to
    /// find when the incompatibility would have been satisfied *without* that last piece.
    fn previous_satisfier_level(
        &self,
        incompat: &Incompatibility,
        satisfier_package: &Package,
        mut satisfied: Vec<(Package, Option<IncompId>, u32, DecisionLevel)>,
        store: &Arena<Incompatibility>,
    ) -> DecisionLevel {
        let pa = self.package_assignments.get(satisfier_package).unwrap();
        let (cause, _, _) = satisfied
            .iter()
            .find(|(p, ..)| p == satisfier_package)
            .map(|(_, cause, idx, level)| (*cause, *idx, *level))
            .unwrap();

        let accum_term = match cause {
            Some(cause) => store[cause].get(satisfier_package).unwrap().negate(),
            None => match &pa.assignments_intersection {
                AssignmentsIntersection::Decision(_, _, term) => term.clone(),
                AssignmentsIntersection::Derivations(_) => {
                    panic!("the overall satisfier without a cause must be a decision")
                }
            },
        };
        let incompat_term = incompat.get(satisfier_package).unwrap();
        let (cause, idx, level) =
            pa.satisfier(satisfier_package, &accum_term.intersection(&incompat_term.negate()));
        if let Some(entry) = satisfied.iter_mut().find(|(p, ..)| p == satisfier_package) {
            *entry = (satisfier_package.clone(), cause, idx, level);
        }

        satisfied
            .iter()
            .max_by_key(|(_, _, idx, _)| *idx)
            .map(|(_, _, _, level)| *level)
            .unwrap_or(DecisionLevel(0))
            .max(DecisionLevel(1))
    }
}

impl PackageAssignments {
    /// The earliest assignment of this package (by global order) at which the accumulated term
    /// so far already contradicts `start_term`, i.e. already implies `start_term.negate()`.
    fn satisfier(&self, package: &Package, start_term: &Term) -> (Option<IncompId>, u32, DecisionLevel) {
        let idx = self
            .dated_derivations
            .partition_point(|dd| dd.accumulated_intersection.intersection(start_term) != Term::empty());
        if let Some(dd) = self.dated_derivations.get(idx) {
            (Some(dd.cause), dd.global_index, dd.decision_level)
        } else {
            match &self.assignments_intersection {
                AssignmentsIntersection::Decision(global_index, _, _) => {
                    (None, *global_index, self.highest_decision_level)
                }
                AssignmentsIntersection::Derivations(term) => unreachable!(
                    "while searching a satisfier for {package}: the accumulated term {term} \
                     overlaps {start_term}, which is only possible if the last assignment was a \
                     decision"
                ),
            }
        }
    }
}
