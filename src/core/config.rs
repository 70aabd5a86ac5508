//! Changes-directory configuration
//!
//! Semifold is configured from a `config.toml` (or `config.json`) inside a
//! `.changes`/`.changesets` directory, found by walking up from the current
//! directory. `CHANGESET_PATH` overrides discovery.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::Ecosystem;
use crate::core::error::{ConfigError, FoldError, FoldResult};

/// Directory names probed during upward discovery
const CHANGES_DIRS: [&str; 2] = [".changes", ".changesets"];

/// Environment override for the changes directory
pub const CHANGESET_PATH_ENV: &str = "CHANGESET_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchesConfig {
  /// Branch that accumulates changesets
  pub base: String,
  /// Branch the release pull request is opened from
  pub release: String,
}

/// Stdio wiring for configured hook commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdioMode {
  #[default]
  Inherit,
  Pipe,
  Null,
}

impl StdioMode {
  pub fn is_inherit(&self) -> bool {
    matches!(self, Self::Inherit)
  }
}

impl From<StdioMode> for std::process::Stdio {
  fn from(value: StdioMode) -> Self {
    match value {
      StdioMode::Inherit => Self::inherit(),
      StdioMode::Pipe => Self::piped(),
      StdioMode::Null => Self::null(),
    }
  }
}

/// A command to run as part of a lifecycle hook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
  /// Executable to run
  pub command: String,
  /// Arguments to pass
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub args: Option<Vec<String>>,
  /// Extra environment variables
  #[serde(default, rename = "extra-env", skip_serializing_if = "BTreeMap::is_empty")]
  pub extra_env: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "StdioMode::is_inherit")]
  pub stdout: StdioMode,
  #[serde(default, skip_serializing_if = "StdioMode::is_inherit")]
  pub stderr: StdioMode,
  /// Run even under --dry-run
  #[serde(default, rename = "dry-run", skip_serializing_if = "Option::is_none")]
  pub dry_run: Option<bool>,
}

/// Registry probe performed before publishing a package
///
/// The URL may contain `{name}` and `{version}` placeholders. A successful
/// response means the version already exists and publishing is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryCheck {
  pub url: String,
  #[serde(default, rename = "extra-headers", skip_serializing_if = "BTreeMap::is_empty")]
  pub extra_headers: BTreeMap<String, String>,
}

impl RegistryCheck {
  /// Substitute `{name}` / `{version}` placeholders
  pub fn url_for(&self, name: &str, version: &str) -> String {
    self.url.replace("{name}", name).replace("{version}", version)
  }
}

/// Per-ecosystem publish pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcosystemConfig {
  #[serde(default, rename = "registry-check", skip_serializing_if = "Option::is_none")]
  pub registry_check: Option<RegistryCheck>,
  /// Commands to run before publish
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub prepublish: Vec<CommandSpec>,
  /// Commands that perform the publish
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub publish: Vec<CommandSpec>,
  /// Commands to run after versioning
  #[serde(default, rename = "post-version", skip_serializing_if = "Vec::is_empty")]
  pub post_version: Vec<CommandSpec>,
}

/// A managed package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
  /// Package directory, relative to the repository root
  pub path: PathBuf,
  pub ecosystem: Ecosystem,
  /// Extra files attached to the GitHub release, relative to the repository root
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub assets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldConfig {
  pub branches: BranchesConfig,
  /// Changeset tag → changelog heading
  #[serde(default)]
  pub tags: BTreeMap<String, String>,
  pub packages: BTreeMap<String, PackageEntry>,
  #[serde(default)]
  pub ecosystem: BTreeMap<Ecosystem, EcosystemConfig>,
}

impl FoldConfig {
  pub fn package(&self, name: &str) -> FoldResult<&PackageEntry> {
    self
      .packages
      .get(name)
      .ok_or_else(|| FoldError::Config(ConfigError::PackageNotFound { name: name.to_string() }))
  }

  pub fn ecosystem_config(&self, ecosystem: Ecosystem) -> FoldResult<&EcosystemConfig> {
    self.ecosystem.get(&ecosystem).ok_or_else(|| {
      FoldError::Config(ConfigError::EcosystemNotConfigured {
        ecosystem: ecosystem.to_string(),
      })
    })
  }

  /// Changelog heading for a changeset tag
  pub fn tag_heading(&self, tag: Option<&str>) -> &str {
    tag
      .and_then(|t| self.tags.get(t))
      .map(String::as_str)
      .unwrap_or("Changes")
  }
}

/// Find the changes directory by walking up from `start`
pub fn find_changes_dir(start: &Path) -> Option<PathBuf> {
  if let Ok(path) = std::env::var(CHANGESET_PATH_ENV) {
    return Some(PathBuf::from(path));
  }

  let mut current = start;
  loop {
    for dir in CHANGES_DIRS {
      let candidate = current.join(dir);
      if candidate.is_dir() {
        return Some(candidate);
      }
    }
    match current.parent() {
      Some(parent) => current = parent,
      None => return None,
    }
  }
}

/// Locate `config.toml` or `config.json` inside a changes directory
pub fn config_path_in(changes_dir: &Path) -> FoldResult<PathBuf> {
  ["config.toml", "config.json"]
    .iter()
    .map(|name| changes_dir.join(name))
    .find(|path| path.exists())
    .ok_or_else(|| {
      FoldError::Config(ConfigError::NotFound {
        searched_from: changes_dir.to_path_buf(),
      })
    })
}

/// Load a config, dispatching on the file extension
pub fn load_config(path: &Path) -> FoldResult<FoldConfig> {
  let content = std::fs::read_to_string(path)?;
  let config = if path.extension() == Some(OsStr::new("toml")) {
    toml_edit::de::from_str(&content).map_err(|e| {
      FoldError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })?
  } else {
    serde_json::from_str(&content).map_err(|e| {
      FoldError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })?
  };
  tracing::debug!(path = %path.display(), "loaded config");
  Ok(config)
}

/// Save a config, dispatching on the file extension
pub fn save_config(path: &Path, config: &FoldConfig) -> FoldResult<()> {
  let content = if path.extension() == Some(OsStr::new("toml")) {
    toml_edit::ser::to_string_pretty(config)?
  } else {
    serde_json::to_string_pretty(config)?
  };
  std::fs::write(path, content)?;
  Ok(())
}
