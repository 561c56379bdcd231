// SPDX-License-Identifier: MPL-2.0

//! The external interface the core consults for package metadata (§4.5): available versions,
//! dependencies of a version, and (optionally) a fast path for picking a version.

use std::collections::BTreeMap;

use crate::package::Package;
use crate::type_aliases::{DependencyConstraints, Map};
use crate::version::Version;
use crate::version_set::VersionSet;

/// What the provider knows about the dependencies of one (package, version) pair.
#[derive(Debug, Clone)]
pub enum Dependencies {
    /// The provider has no record of this exact version: distinct from a version that is known
    /// to exist but declares no dependencies.
    Unknown,
    /// The dependencies of record, possibly empty.
    Known(DependencyConstraints),
}

/// Supplies the solver with everything it cannot derive on its own: which versions of a package
/// exist, what a given version depends on, and (optionally) which version to prefer for an
/// under-constrained package.
///
/// Implementations may do network or filesystem I/O; the core never calls these concurrently or
/// caches across solves, so an implementor is free to do its own caching (see the commented
/// `cache.rs` sketch in examples from the wider ecosystem for one approach).
pub trait DependencyProvider {
    /// The error an implementor's own I/O or bookkeeping may fail with.
    type Err: std::error::Error + Send + Sync + 'static;

    /// Every version known for `package`, ordered from most-preferred to least-preferred. The
    /// core treats "first version in this order that also satisfies the current term" as the
    /// version to try next; the ordering itself is this provider's policy, not the core's.
    fn list_versions(&self, package: &Package) -> Result<Vec<Version>, Self::Err>;

    /// The dependencies declared by `package` at `version`.
    fn get_dependencies(
        &self,
        package: &Package,
        version: &Version,
    ) -> Result<Dependencies, Self::Err>;

    /// A fast path: if this provider can cheaply pick a version of `package` satisfying `set`
    /// without enumerating [list_versions], it may do so here. The core never trusts the result
    /// blindly — a candidate outside `set` is discarded and the core falls back to filtering
    /// [list_versions] itself (see §9's open question on `choose_version` mis-hints).
    ///
    /// The default implementation does exactly that fallback, so a provider only needs to
    /// override this for performance.
    fn choose_version(&self, package: &Package, set: &VersionSet) -> Result<Option<Version>, Self::Err> {
        Ok(self
            .list_versions(package)?
            .into_iter()
            .find(|version| set.contains(version)))
    }
}

/// A [DependencyProvider] that holds its entire universe of packages, versions, and dependencies
/// in memory. Mainly useful for tests and for scenario-file-driven tooling (see `demos/cli`).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OfflineDependencyProvider {
    dependencies: Map<Package, BTreeMap<Version, DependencyConstraints>>,
}

impl OfflineDependencyProvider {
    /// An empty provider with no known packages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the dependencies of `package` at `version`. A second call for the same pair
    /// replaces the first: there is no API to add dependencies one at a time, to uphold the
    /// invariant that [get_dependencies](DependencyProvider::get_dependencies) reports all of a
    /// version's dependencies at once.
    pub fn add_dependencies(
        &mut self,
        package: Package,
        version: Version,
        dependencies: impl IntoIterator<Item = (Package, VersionSet)>,
    ) {
        *self
            .dependencies
            .entry(package)
            .or_default()
            .entry(version)
            .or_default() = dependencies.into_iter().collect();
    }

    /// Every package this provider has recorded at least one version for.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.dependencies.keys()
    }

    /// Every version recorded for `package`, ascending, or `None` if the package is unknown.
    pub fn versions(&self, package: &Package) -> Option<impl Iterator<Item = &Version>> {
        self.dependencies.get(package).map(|versions| versions.keys())
    }
}

impl DependencyProvider for OfflineDependencyProvider {
    type Err = std::convert::Infallible;

    fn list_versions(&self, package: &Package) -> Result<Vec<Version>, Self::Err> {
        Ok(self
            .dependencies
            .get(package)
            .map(|versions| versions.keys().rev().copied().collect())
            .unwrap_or_default())
    }

    fn get_dependencies(
        &self,
        package: &Package,
        version: &Version,
    ) -> Result<Dependencies, Self::Err> {
        Ok(match self.dependencies.get(package).and_then(|versions| versions.get(version)) {
            Some(deps) => Dependencies::Known(deps.clone()),
            None => Dependencies::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_versions_newest_first() {
        let mut provider = OfflineDependencyProvider::new();
        let foo = Package::new("foo");
        provider.add_dependencies(foo.clone(), Version::new(1, 0, 0), []);
        provider.add_dependencies(foo.clone(), Version::new(2, 0, 0), []);
        provider.add_dependencies(foo.clone(), Version::new(1, 5, 0), []);
        assert_eq!(
            provider.list_versions(&foo).unwrap(),
            vec![Version::new(2, 0, 0), Version::new(1, 5, 0), Version::new(1, 0, 0)]
        );
    }

    #[test]
    fn unknown_package_has_no_versions() {
        let provider = OfflineDependencyProvider::new();
        assert_eq!(provider.list_versions(&Package::new("ghost")).unwrap(), vec![]);
    }

    #[test]
    fn unrecorded_version_is_unknown() {
        let mut provider = OfflineDependencyProvider::new();
        let foo = Package::new("foo");
        provider.add_dependencies(foo.clone(), Version::new(1, 0, 0), []);
        assert!(matches!(
            provider.get_dependencies(&foo, &Version::new(2, 0, 0)).unwrap(),
            Dependencies::Unknown
        ));
    }
}
