// SPDX-License-Identifier: MPL-2.0

//! The solver's mutable state: the incompatibility pool, the partial solution, and the unit
//! propagation / conflict resolution loop that keeps them consistent (§4.6, §4.7).

use std::collections::HashSet as Set;

use crate::internal::{Arena, DecisionLevel, IncompId, Incompatibility, PartialSolution, Relation, SatisfierSearch};
use crate::package::Package;
use crate::report::DerivationTree;
use crate::type_aliases::Map;
use crate::version::Version;

/// All the mutable state of a single solve.
pub(crate) struct State {
    root_package: Package,
    root_version: Version,

    /// For each package, every incompatibility that mentions it, in allocation order.
    incompatibilities: Map<Package, Vec<IncompId>>,

    pub(crate) partial_solution: PartialSolution,
    pub(crate) incompatibility_store: Arena<Incompatibility>,

    /// Reused scratch buffer for the propagation work queue.
    unit_propagation_queue: Vec<Package>,
}

impl State {
    /// Seed a fresh state with the root incompatibility `{ root_package: not root_version }`.
    pub(crate) fn init(root_package: Package, root_version: Version) -> Self {
        let mut incompatibility_store = Arena::new();
        let root_id =
            incompatibility_store.alloc(Incompatibility::from_root(root_package.clone(), root_version));
        let mut incompatibilities = Map::default();
        incompatibilities.insert(root_package.clone(), vec![root_id]);
        Self {
            root_package,
            root_version,
            incompatibilities,
            partial_solution: PartialSolution::empty(),
            incompatibility_store,
            unit_propagation_queue: Vec::new(),
        }
    }

    /// Add `incompat` to the pool, indexing it under every package it mentions.
    pub(crate) fn add_incompatibility(&mut self, incompat: Incompatibility) -> IncompId {
        let id = self.incompatibility_store.alloc(incompat);
        self.index_incompatibility(id);
        id
    }

    /// Add each of a batch of incompatibilities (typically the dependencies of a single decided
    /// version), returning their ids in allocation order.
    pub(crate) fn add_incompatibilities(
        &mut self,
        incompats: impl IntoIterator<Item = Incompatibility>,
    ) -> Vec<IncompId> {
        incompats
            .into_iter()
            .map(|incompat| self.add_incompatibility(incompat))
            .collect()
    }

    fn index_incompatibility(&mut self, id: IncompId) {
        for (package, _) in self.incompatibility_store[id].iter() {
            self.incompatibilities.entry(package.clone()).or_default().push(id);
        }
    }

    /// Unit propagation (§4.6 step 1): repeatedly walk every incompatibility mentioning a changed
    /// package until a fixpoint is reached, either deriving new terms or detecting and resolving
    /// conflicts. Returns the terminal incompatibility's derivation tree if the instance turns
    /// out to be unsolvable.
    pub(crate) fn unit_propagation(&mut self, package: Package) -> Result<(), DerivationTree> {
        self.unit_propagation_queue.clear();
        self.unit_propagation_queue.push(package);
        while let Some(current_package) = self.unit_propagation_queue.pop() {
            let Some(relevant) = self.incompatibilities.get(&current_package) else {
                continue;
            };
            let mut conflict = None;
            for &incompat_id in relevant.iter().rev() {
                let incompat = &self.incompatibility_store[incompat_id];
                match self.partial_solution.relation(incompat) {
                    Relation::Satisfied => {
                        log::info!("conflict: {}", incompat);
                        conflict = Some(incompat_id);
                        break;
                    }
                    Relation::AlmostSatisfied(unit_package) => {
                        let unit_term = self.incompatibility_store[incompat_id]
                            .get(&unit_package)
                            .expect("the almost-satisfied package must be a term of this incompatibility")
                            .negate();
                        if !self.unit_propagation_queue.contains(&unit_package) {
                            self.unit_propagation_queue.push(unit_package.clone());
                        }
                        log::info!("derived {} {} (from {})", unit_package, unit_term, incompat_id.into_raw());
                        self.partial_solution.add_derivation(
                            unit_package,
                            incompat_id,
                            &self.incompatibility_store,
                        );
                    }
                    Relation::Contradicted(..) | Relation::Inconclusive => {}
                }
            }
            if let Some(incompat_id) = conflict {
                let (unit_package, root_cause) =
                    self.conflict_resolution(incompat_id).map_err(|terminal| self.build_derivation_tree(terminal))?;
                self.unit_propagation_queue.clear();
                self.unit_propagation_queue.push(unit_package.clone());
                self.partial_solution.add_derivation(unit_package, root_cause, &self.incompatibility_store);
            }
        }
        Ok(())
    }

    /// Conflict-driven clause learning (§4.7): walk from a violated incompatibility, resolving it
    /// against the cause of its most recent satisfier until either the satisfier was a decision
    /// made strictly after every other relevant assignment (learn and backtrack), or the empty
    /// clause is reached (unsolvable).
    fn conflict_resolution(&mut self, violated: IncompId) -> Result<(Package, IncompId), IncompId> {
        let mut current = violated;
        loop {
            if self.incompatibility_store[current].is_terminal(&self.root_package, &self.root_version) {
                return Err(current);
            }
            let (satisfier_package, search) = self
                .partial_solution
                .satisfier_search(&self.incompatibility_store[current], &self.incompatibility_store);
            match search {
                SatisfierSearch::DifferentDecisionLevels { previous_satisfier_level } => {
                    self.backtrack(previous_satisfier_level);
                    log::info!("backtrack to decision level {}", previous_satisfier_level);
                    return Ok((satisfier_package, current));
                }
                SatisfierSearch::SameDecisionLevels { satisfier_cause } => {
                    let prior_cause = Incompatibility::prior_cause(
                        current,
                        satisfier_cause,
                        &self.incompatibility_store[current],
                        &self.incompatibility_store[satisfier_cause],
                        &satisfier_package,
                    );
                    log::info!("derived by resolution: {}", prior_cause);
                    current = self.incompatibility_store.alloc(prior_cause);
                }
            }
        }
    }

    fn backtrack(&mut self, level: DecisionLevel) {
        self.partial_solution.backtrack(level);
    }

    /// Walk the cause DAG rooted at `incompat`, finding ids that are reachable by more than one
    /// path (these get explained once and referenced by id in the rendered report).
    fn build_derivation_tree(&self, incompat: IncompId) -> DerivationTree {
        let mut seen: Set<IncompId> = Set::default();
        let mut shared: Set<IncompId> = Set::default();
        let mut stack = vec![incompat];
        while let Some(id) = stack.pop() {
            if let Some((id1, id2)) = self.incompatibility_store[id].causes() {
                if seen.contains(&id) {
                    shared.insert(id);
                } else {
                    stack.push(id1);
                    stack.push(id2);
                }
            }
            seen.insert(id);
        }
        self.incompatibility_store[incompat].build_derivation_tree(incompat, &shared, &self.incompatibility_store)
    }
}
