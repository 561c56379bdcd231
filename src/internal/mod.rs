// SPDX-License-Identifier: MPL-2.0

//! Non-exposed modules implementing the solving loop: the incompatibility pool, the partial
//! solution, and the [State](core::State) that drives propagation and conflict resolution.

mod arena;
mod core;
mod incompatibility;
mod partial_solution;

pub(crate) use arena::{Arena, Id};
pub(crate) use core::State;
pub(crate) use incompatibility::{Incompatibility, Relation};
pub(crate) use partial_solution::{DecisionLevel, PartialSolution, SatisfierSearch};

/// An index into the incompatibility [Arena].
pub(crate) type IncompId = Id<Incompatibility>;
