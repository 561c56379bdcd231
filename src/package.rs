// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Package identity.

use std::fmt::{self, Display};
use std::sync::Arc;

/// Identifies a package by name.
///
/// Two `Package`s are equal, and hash equally, iff their names are equal; `is_root` is metadata
/// describing the package, not part of its identity, so it never participates in comparison.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "SerdePackage", into = "SerdePackage"))]
pub struct Package {
    name: Arc<str>,
    is_root: bool,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct SerdePackage {
    name: String,
    #[serde(default)]
    is_root: bool,
}

#[cfg(feature = "serde")]
impl From<SerdePackage> for Package {
    fn from(p: SerdePackage) -> Self {
        Self {
            name: Arc::from(p.name),
            is_root: p.is_root,
        }
    }
}

#[cfg(feature = "serde")]
impl From<Package> for SerdePackage {
    fn from(p: Package) -> Self {
        Self {
            name: p.name.to_string(),
            is_root: p.is_root,
        }
    }
}

impl Package {
    /// A regular, non-root package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            is_root: false,
        }
    }

    /// The distinguished root package of a solve.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            is_root: true,
        }
    }

    /// The package's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the distinguished root package of the solve it belongs to.
    pub fn is_root(&self) -> bool {
        self.is_root
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Package {}

impl std::hash::Hash for Package {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
