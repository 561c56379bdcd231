// SPDX-License-Identifier: MPL-2.0

//! Loads a scenario JSON file, resolves it, and prints the outcome: the selected versions on
//! success, or a rendered derivation tree on failure. Wires the core's public API to a file and a
//! terminal; contributes no resolution logic of its own.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use pubgrub_resolver::{
    parse_constraint, solve, DefaultStringReporter, OfflineDependencyProvider, Package,
    PubGrubError, Reporter, Version,
};

#[derive(Parser, Debug)]
#[command(about = "Resolve a scenario file with the pubgrub-resolver core")]
struct Cli {
    /// Path to a scenario JSON file.
    scenario: PathBuf,
    /// Name of the root package to resolve from.
    #[arg(long)]
    root: String,
    /// Version of the root package to resolve from.
    #[arg(long)]
    root_version: String,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    description: Option<String>,
    packages: Vec<ScenarioPackage>,
    dependencies: Vec<ScenarioDependency>,
}

#[derive(Debug, Deserialize)]
struct ScenarioPackage {
    name: String,
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScenarioDependency {
    package: String,
    version: String,
    dependency: String,
    constraint: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("could not read scenario file {path}: {source}")]
    ReadScenario {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse scenario file {path}: {source}")]
    ParseScenario {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("scenario declares package {package:?} at version {version:?} but never lists that version under `packages`")]
    UndeclaredVersion { package: String, version: String },
    #[error(transparent)]
    InvalidVersion(#[from] pubgrub_resolver::VersionParseError),
    #[error(transparent)]
    InvalidConstraint(#[from] pubgrub_resolver::ConstraintParseError),
    #[error(transparent)]
    Resolution(#[from] PubGrubError),
}

/// Turns a scenario document into the in-memory provider the core consumes. Every version
/// mentioned in `dependencies` must also appear in `packages`, so that a typo in a scenario file
/// is caught here rather than silently read back as "this version has no dependencies".
fn load_scenario(file: ScenarioFile) -> Result<OfflineDependencyProvider, CliError> {
    let mut provider = OfflineDependencyProvider::new();

    type DependencyList = Vec<(Package, pubgrub_resolver::VersionSet)>;
    let mut by_package: std::collections::HashMap<String, Vec<(Version, DependencyList)>> =
        std::collections::HashMap::new();
    for package in &file.packages {
        let versions = package
            .versions
            .iter()
            .map(|v| Ok((v.parse::<Version>()?, Vec::new())))
            .collect::<Result<Vec<_>, CliError>>()?;
        by_package.insert(package.name.clone(), versions);
    }

    for dep in &file.dependencies {
        let version: Version = dep.version.parse()?;
        let constraint = parse_constraint(&dep.constraint)?;
        let entries = by_package
            .get_mut(&dep.package)
            .ok_or_else(|| CliError::UndeclaredVersion {
                package: dep.package.clone(),
                version: dep.version.clone(),
            })?;
        let entry = entries
            .iter_mut()
            .find(|(v, _)| *v == version)
            .ok_or_else(|| CliError::UndeclaredVersion {
                package: dep.package.clone(),
                version: dep.version.clone(),
            })?;
        entry.1.push((Package::new(dep.dependency.clone()), constraint));
    }

    for (name, versions) in by_package {
        for (version, dependencies) in versions {
            provider.add_dependencies(Package::new(name.clone()), version, dependencies);
        }
    }

    Ok(provider)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let raw = fs::read_to_string(&cli.scenario).map_err(|source| CliError::ReadScenario {
        path: cli.scenario.clone(),
        source,
    })?;
    let file: ScenarioFile =
        serde_json::from_str(&raw).map_err(|source| CliError::ParseScenario {
            path: cli.scenario.clone(),
            source,
        })?;
    let provider = load_scenario(file)?;

    let root = Package::root(cli.root);
    let root_version: Version = cli.root_version.parse()?;

    match solve(&provider, root, root_version) {
        Ok(solution) => {
            let mut names: Vec<_> = solution.iter().collect();
            names.sort_by(|(a, _), (b, _)| a.name().cmp(b.name()));
            for (package, version) in names {
                println!("{} {}", package, version);
            }
            Ok(())
        }
        Err(PubGrubError::NoSolution(mut tree)) => {
            tree.collapse_no_versions();
            eprintln!("{}", DefaultStringReporter::report(&tree));
            Err(PubGrubError::NoSolution(tree).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> ExitCode {
    env_logger::builder().filter_level(LevelFilter::Warn).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
