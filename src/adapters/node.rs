//! Node.js ecosystem adapter (npm, pnpm, yarn workspaces)

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use saphyr::{LoadableYamlNode, Yaml};
use semver::Version;
use serde::Deserialize;

use crate::adapters::{Ecosystem, PackageAdapter, ResolvedPackage};
use crate::core::error::{ConfigError, FoldError, FoldResult};

pub struct NodeAdapter;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
  #[serde(default)]
  name: String,
  version: Option<String>,
  workspaces: Option<Vec<String>>,
  dependencies: Option<BTreeMap<String, String>>,
  dev_dependencies: Option<BTreeMap<String, String>>,
  peer_dependencies: Option<BTreeMap<String, String>>,
  private: Option<bool>,
}

fn manifest_invalid(path: &Path, reason: impl Into<String>) -> FoldError {
  FoldError::Config(ConfigError::ManifestInvalid {
    path: path.to_path_buf(),
    reason: reason.into(),
  })
}

impl NodeAdapter {
  fn load(manifest_path: &Path) -> FoldResult<PackageJson> {
    if !manifest_path.exists() {
      return Err(manifest_invalid(manifest_path, "file not found"));
    }
    let content = std::fs::read_to_string(manifest_path)?;
    serde_json::from_str(&content).map_err(|e| manifest_invalid(manifest_path, e.to_string()))
  }

  /// Workspace patterns from pnpm-workspace.yaml, if present
  fn pnpm_workspace_patterns(root: &Path) -> FoldResult<Option<Vec<String>>> {
    let workspace_path = root.join("pnpm-workspace.yaml");
    if !workspace_path.exists() {
      return Ok(None);
    }

    let content = std::fs::read_to_string(&workspace_path)?;
    let docs = Yaml::load_from_str(&content).map_err(|e| manifest_invalid(&workspace_path, e.to_string()))?;

    Ok(
      docs
        .first()
        .and_then(|doc| doc.as_mapping_get("packages"))
        .and_then(|packages| packages.as_vec())
        .map(|patterns| {
          patterns
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect()
        }),
    )
  }
}

impl PackageAdapter for NodeAdapter {
  fn ecosystem(&self) -> Ecosystem {
    Ecosystem::Node
  }

  fn manifest_filename(&self) -> &'static str {
    "package.json"
  }

  fn can_handle(&self, root: &Path) -> bool {
    root.join("package.json").exists()
  }

  fn resolve(&self, root: &Path, path: &Path) -> FoldResult<ResolvedPackage> {
    let manifest_path = root.join(path).join("package.json");
    let manifest = Self::load(&manifest_path)?;

    if manifest.name.is_empty() {
      return Err(manifest_invalid(&manifest_path, "missing package name"));
    }
    let version = manifest
      .version
      .ok_or_else(|| manifest_invalid(&manifest_path, "missing package version"))?;

    Ok(ResolvedPackage {
      name: manifest.name,
      version: Version::parse(&version)?,
      path: path.to_path_buf(),
      private: manifest.private.unwrap_or(false),
    })
  }

  fn discover(&self, root: &Path) -> FoldResult<Vec<ResolvedPackage>> {
    let manifest_path = root.join("package.json");
    if !manifest_path.exists() {
      tracing::warn!(root = %root.display(), "no package.json found, skipping node discovery");
      return Ok(Vec::new());
    }
    let manifest = Self::load(&manifest_path)?;

    let patterns = Self::pnpm_workspace_patterns(root)?.or(manifest.workspaces);
    let Some(patterns) = patterns else {
      if manifest.name.is_empty() {
        tracing::warn!(root = %root.display(), "package.json has no name and no workspaces");
        return Ok(Vec::new());
      }
      return Ok(vec![self.resolve(root, Path::new("."))?]);
    };

    let mut packages = Vec::new();
    for pattern in patterns {
      let full_pattern = format!("{}/{}", root.display(), pattern);
      for entry in glob::glob(&full_pattern)?.flatten() {
        if !entry.join("package.json").exists() {
          continue;
        }
        let relative = pathdiff::diff_paths(&entry, root).unwrap_or_else(|| entry.clone());
        match self.resolve(root, &relative) {
          Ok(package) => packages.push(package),
          Err(e) => {
            tracing::warn!(path = %entry.display(), "failed to resolve workspace package: {}", e);
          }
        }
      }
    }

    Ok(packages)
  }

  fn set_version(&self, root: &Path, path: &Path, version: &Version) -> FoldResult<()> {
    let manifest_path = root.join(path).join("package.json");
    let content = std::fs::read_to_string(&manifest_path)?;
    let mut manifest: serde_json::Value =
      serde_json::from_str(&content).map_err(|e| manifest_invalid(&manifest_path, e.to_string()))?;

    let Some(object) = manifest.as_object_mut() else {
      return Err(manifest_invalid(&manifest_path, "manifest is not a JSON object"));
    };
    object.insert(
      "version".to_string(),
      serde_json::Value::String(version.to_string()),
    );

    let mut rendered = serde_json::to_string_pretty(&manifest)?;
    rendered.push('\n');
    std::fs::write(&manifest_path, rendered)?;
    Ok(())
  }

  fn internal_deps(&self, root: &Path, path: &Path, known: &BTreeSet<String>) -> FoldResult<Vec<String>> {
    let manifest_path = root.join(path).join("package.json");
    let manifest = Self::load(&manifest_path)?;

    let mut deps = BTreeSet::new();
    for section in [
      &manifest.dependencies,
      &manifest.dev_dependencies,
      &manifest.peer_dependencies,
    ] {
      if let Some(map) = section {
        for name in map.keys() {
          if known.contains(name) {
            deps.insert(name.clone());
          }
        }
      }
    }

    Ok(deps.into_iter().collect())
  }
}
