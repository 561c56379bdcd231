// SPDX-License-Identifier: MPL-2.0

//! PubGrub version solving algorithm.
//!
//! Version solving consists in efficiently finding a set of packages and versions
//! that satisfy all the constraints of a given project's dependencies.
//! In addition, when that is not possible,
//! we try to provide a clear, human-readable explanation of why it failed.
//!
//! # Package, version and version set
//!
//! Packages are identified by [Package], a name-based identity with no further structure.
//! Versions are [Version], a `MAJOR.MINOR.PATCH` triple ordered lexicographically. Constraints on
//! a package are expressed as a [VersionSet]: a union of half-open intervals over [Version], built
//! either programmatically (`VersionSet::singleton(v)`, `above(v, true)`, ...) or by parsing a
//! compound constraint string with [parse_constraint] (`">=1.0.0,<2.0.0"`).
//!
//! # Basic example
//!
//! Let's imagine that we are building a user interface
//! with a menu containing dropdowns with some icons,
//! icons that we are also directly using in other parts of the interface.
//! For this scenario our direct dependencies are `menu` and `icons`,
//! but the complete set of dependencies looks like follows:
//!
//! - `root` depends on `menu` and `icons`
//! - `menu` depends on `dropdown`
//! - `dropdown` depends on `icons`
//! - `icons` has no dependency
//!
//! We can model that scenario with this library as follows:
//! ```
//! use pubgrub_resolver::{solve, OfflineDependencyProvider, Package, Version, VersionSet};
//!
//! let mut dependency_provider = OfflineDependencyProvider::new();
//!
//! let root = Package::root("root");
//! let v1 = Version::new(1, 0, 0);
//!
//! dependency_provider.add_dependencies(
//!     root.clone(),
//!     v1,
//!     [
//!         (Package::new("menu"), VersionSet::full()),
//!         (Package::new("icons"), VersionSet::full()),
//!     ],
//! );
//! dependency_provider.add_dependencies(
//!     Package::new("menu"),
//!     v1,
//!     [(Package::new("dropdown"), VersionSet::full())],
//! );
//! dependency_provider.add_dependencies(
//!     Package::new("dropdown"),
//!     v1,
//!     [(Package::new("icons"), VersionSet::full())],
//! );
//! dependency_provider.add_dependencies(Package::new("icons"), v1, []);
//!
//! // Run the algorithm.
//! let solution = solve(&dependency_provider, root, v1).unwrap();
//! ```
//!
//! # DependencyProvider trait
//!
//! In the previous example we used [OfflineDependencyProvider], a basic in-memory implementation
//! of the [DependencyProvider] trait. A real implementation may need to hit the filesystem or the
//! network to answer [list_versions](DependencyProvider::list_versions) and
//! [get_dependencies](DependencyProvider::get_dependencies): implementors are free to hold their
//! own cache, since the solver itself never caches across a call to [solve].
//!
//! # Solution and error reporting
//!
//! When everything goes well, [solve] returns the complete set of direct and indirect
//! dependencies satisfying every constraint, as [SelectedDependencies]. When there is no solution,
//! [solve] returns [PubGrubError::NoSolution], carrying a [DerivationTree]: the full chain of
//! reasons the instance is unsatisfiable.
//!
//! Every node of the tree is an incompatibility, either "external" ([External], a leaf with a
//! reason independent of the algorithm itself — a missing version, a declared dependency) or
//! "derived" ([Derived], an internal node obtained by resolution from two prior
//! incompatibilities, e.g. "a depends on b, b depends on c, therefore a depends on c").
//!
//! This crate defines a [Reporter] trait, with an associated [Output](Reporter::Output) type and
//! a `report` method, plus a default implementation, [DefaultStringReporter], that renders a tree
//! as a [String]:
//! ```
//! # use pubgrub_resolver::{solve, OfflineDependencyProvider, DefaultStringReporter, Reporter, PubGrubError, Package, Version};
//! #
//! # let dependency_provider = OfflineDependencyProvider::new();
//! # let root_package = Package::root("root");
//! # let root_version = Version::new(1, 0, 0);
//! #
//! match solve(&dependency_provider, root_package, root_version) {
//!     Ok(solution) => println!("{:?}", solution),
//!     Err(PubGrubError::NoSolution(mut derivation_tree)) => {
//!         derivation_tree.collapse_no_versions();
//!         eprintln!("{}", DefaultStringReporter::report(&derivation_tree));
//!     }
//!     Err(err) => panic!("{:?}", err),
//! };
//! ```
//! [collapse_no_versions](DerivationTree::collapse_no_versions) above simplifies the tree by
//! folding [NoVersions](External::NoVersions) leaves into the incompatibility they are paired
//! with, which is usually what you want unless the absence of a version is itself surprising
//! (e.g. an offline provider with a stale cache).

#![warn(missing_docs)]

mod error;
mod internal;
mod package;
mod provider;
mod report;
mod solver;
mod term;
mod type_aliases;
mod version;
mod version_set;

pub use error::{ConstraintParseError, PubGrubError};
pub use package::Package;
pub use provider::{Dependencies, DependencyProvider, OfflineDependencyProvider};
pub use report::{
    DefaultStringReportFormatter, DefaultStringReporter, DerivationTree, Derived, External,
    ReportFormatter, Reporter,
};
pub use solver::{solve, solve_with_config, SolverConfig};
pub use term::{Relation, Term};
pub use type_aliases::{DependencyConstraints, Map, SelectedDependencies, Set};
pub use version::{Version, VersionParseError};
pub use version_set::{above, below, parse_constraint, Constraint, VersionSet};
