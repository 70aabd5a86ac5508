//! Ecosystem adapters for package manifests
//!
//! Each supported language ecosystem (Cargo, npm/pnpm, Python, CMake)
//! implements [`PackageAdapter`] to provide package resolution, workspace
//! discovery, version rewriting, and internal-dependency reporting.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::error::FoldResult;

pub mod cargo;
pub mod cmake;
pub mod node;
pub mod python;

/// A package ecosystem semifold knows how to manage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Ecosystem {
  Cargo,
  Node,
  Python,
  Cmake,
}

impl Ecosystem {
  pub const ALL: [Ecosystem; 4] = [Ecosystem::Cargo, Ecosystem::Node, Ecosystem::Python, Ecosystem::Cmake];
}

impl fmt::Display for Ecosystem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Ecosystem::Cargo => write!(f, "cargo"),
      Ecosystem::Node => write!(f, "node"),
      Ecosystem::Python => write!(f, "python"),
      Ecosystem::Cmake => write!(f, "cmake"),
    }
  }
}

/// A package resolved from its ecosystem manifest
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
  pub name: String,
  pub version: Version,
  /// Path of the package directory, relative to the repository root
  pub path: PathBuf,
  /// Private packages are versioned but never published
  pub private: bool,
}

/// Ecosystem adapter trait
///
/// `root` is always the repository root; package paths are relative to it.
pub trait PackageAdapter: Send + Sync {
  /// Which ecosystem this adapter manages
  fn ecosystem(&self) -> Ecosystem;

  /// The manifest filename (e.g. "Cargo.toml", "package.json")
  fn manifest_filename(&self) -> &'static str;

  /// Detect whether this adapter applies to the given root
  fn can_handle(&self, root: &Path) -> bool;

  /// Resolve a single package at `path`
  fn resolve(&self, root: &Path, path: &Path) -> FoldResult<ResolvedPackage>;

  /// Discover all packages reachable from the root (workspace members included)
  fn discover(&self, root: &Path) -> FoldResult<Vec<ResolvedPackage>>;

  /// Write a new version into the package manifest
  fn set_version(&self, root: &Path, path: &Path, version: &Version) -> FoldResult<()>;

  /// Names from `known` that the package at `path` depends on
  fn internal_deps(&self, root: &Path, path: &Path, known: &BTreeSet<String>) -> FoldResult<Vec<String>>;
}

/// Construct the adapter for an ecosystem
pub fn adapter_for(ecosystem: Ecosystem) -> Box<dyn PackageAdapter> {
  match ecosystem {
    Ecosystem::Cargo => Box::new(cargo::CargoAdapter),
    Ecosystem::Node => Box::new(node::NodeAdapter),
    Ecosystem::Python => Box::new(python::PythonAdapter),
    Ecosystem::Cmake => Box::new(cmake::CmakeAdapter),
  }
}

/// Detect every ecosystem present at the given root
pub fn detect_ecosystems(root: &Path) -> Vec<Ecosystem> {
  Ecosystem::ALL
    .into_iter()
    .filter(|eco| adapter_for(*eco).can_handle(root))
    .collect()
}
