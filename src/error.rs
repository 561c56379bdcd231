// SPDX-License-Identifier: MPL-2.0

//! Errors produced while solving, or while parsing solver inputs.

use thiserror::Error;

use crate::package::Package;
use crate::report::DerivationTree;
use crate::version::{Version, VersionParseError};

/// A constraint string failed to parse.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ConstraintParseError {
    /// One comma-separated atom did not match any recognized operator.
    #[error("{0:?} is not a valid constraint atom (expected *, ==X, >=X, >X, <=X or <X)")]
    InvalidAtom(String),

    /// An atom's version part failed to parse.
    #[error(transparent)]
    InvalidVersion(#[from] VersionParseError),
}

/// Errors that may occur while solving dependencies.
#[derive(Error, Debug)]
pub enum PubGrubError {
    /// A version string given to the solver could not be parsed.
    #[error(transparent)]
    InvalidVersion(#[from] VersionParseError),

    /// A constraint string given to the solver could not be parsed.
    #[error(transparent)]
    InvalidConstraint(#[from] ConstraintParseError),

    /// A package appeared in a dependency requirement but the dependency provider never heard of
    /// it.
    #[error("{package} is not known to the dependency provider")]
    UnknownPackage {
        /// The unrecognized package.
        package: Package,
    },

    /// Error arising when the implementer of
    /// [DependencyProvider](crate::provider::DependencyProvider) returned an error from
    /// [list_versions](crate::provider::DependencyProvider::list_versions).
    #[error("retrieving available versions of {package} failed")]
    ErrorRetrievingVersions {
        /// Package for which we want the list of versions.
        package: Package,
        /// Error raised by the implementer of
        /// [DependencyProvider](crate::provider::DependencyProvider).
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error arising when the implementer of
    /// [DependencyProvider](crate::provider::DependencyProvider) returned an error from
    /// [get_dependencies](crate::provider::DependencyProvider::get_dependencies).
    #[error("retrieving dependencies of {package} {version} failed")]
    ErrorRetrievingDependencies {
        /// Package whose dependencies we want.
        package: Package,
        /// Version of the package for which we want the dependencies.
        version: Version,
        /// Error raised by the implementer of
        /// [DependencyProvider](crate::provider::DependencyProvider).
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No set of versions satisfies every constraint; carries the proof of unsatisfiability.
    #[error("no solution satisfies every constraint")]
    NoSolution(DerivationTree),

    /// The solver gave up after the configured number of iterations
    /// ([SolverConfig](crate::solver::SolverConfig)).
    #[error("solving did not converge within {limit} iterations")]
    IterationLimitExceeded {
        /// The configured limit that was hit.
        limit: usize,
    },
}
