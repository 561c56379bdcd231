// SPDX-License-Identifier: MPL-2.0

//! Publicly exported type aliases.

use std::hash::BuildHasherDefault;

/// Map implementation used by the crate.
pub type Map<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<rustc_hash::FxHasher>>;

/// Set implementation used by the crate.
pub type Set<V> = std::collections::HashSet<V, BuildHasherDefault<rustc_hash::FxHasher>>;

/// Concrete dependencies picked by the solver during [resolve](crate::solver::resolve),
/// from [DependencyConstraints].
pub type SelectedDependencies = Map<crate::package::Package, crate::version::Version>;

/// Holds information about all versions a given package can accept.
///
/// There is a difference in semantics between an empty list here and
/// [Dependencies::Unknown](crate::provider::Dependencies::Unknown): the former means the package
/// has no dependency and it is a known fact, while the latter means dependencies could not be
/// fetched by the [DependencyProvider](crate::provider::DependencyProvider).
pub type DependencyConstraints = Vec<(crate::package::Package, crate::version_set::VersionSet)>;
