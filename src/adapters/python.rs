//! Python ecosystem adapter (PEP 621 and Poetry pyproject.toml)
//!
//! PEP 621 projects may declare `version` as dynamic; in that case the
//! version is read from (and written back to) a `__version__` assignment in
//! the conventional source locations.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use regex::Regex;
use semver::Version;
use serde::Deserialize;
use toml_edit::DocumentMut;

use crate::adapters::{Ecosystem, PackageAdapter, ResolvedPackage};
use crate::core::error::{ConfigError, FoldError, FoldResult};

pub struct PythonAdapter;

#[derive(Debug, Deserialize)]
struct PyProject {
  project: Option<ProjectMeta>,
  tool: Option<ToolMeta>,
}

#[derive(Debug, Deserialize)]
struct ProjectMeta {
  name: String,
  version: Option<String>,
  dynamic: Option<Vec<String>>,
  dependencies: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ToolMeta {
  poetry: Option<PoetryMeta>,
}

#[derive(Debug, Deserialize)]
struct PoetryMeta {
  name: Option<String>,
  version: Option<String>,
  dependencies: Option<BTreeMap<String, serde_json::Value>>,
}

fn manifest_invalid(path: &Path, reason: impl Into<String>) -> FoldError {
  FoldError::Config(ConfigError::ManifestInvalid {
    path: path.to_path_buf(),
    reason: reason.into(),
  })
}

const VERSION_RE: &str = r#"__version__\s*=\s*["']([^"']+)["']"#;

impl PythonAdapter {
  fn load(manifest_path: &Path) -> FoldResult<PyProject> {
    if !manifest_path.exists() {
      return Err(manifest_invalid(manifest_path, "file not found"));
    }
    let content = std::fs::read_to_string(manifest_path)?;
    toml_edit::de::from_str(&content).map_err(|e| manifest_invalid(manifest_path, e.to_string()))
  }

  /// Conventional files that may carry a `__version__` assignment
  fn version_file_candidates(root: &Path, path: &Path, package_name: &str) -> Vec<PathBuf> {
    let module = package_name.replace('-', "_");
    let base = root.join(path);
    vec![
      base.join(&module).join("__init__.py"),
      base.join("src").join(&module).join("__init__.py"),
      base.join(&module).join("__version__.py"),
      base.join("src").join(&module).join("__version__.py"),
    ]
  }

  fn extract_dynamic_version(root: &Path, path: &Path, package_name: &str) -> Option<String> {
    let re = Regex::new(VERSION_RE).ok()?;
    for candidate in Self::version_file_candidates(root, path, package_name) {
      if let Ok(content) = std::fs::read_to_string(&candidate)
        && let Some(caps) = re.captures(&content)
      {
        tracing::debug!(file = %candidate.display(), "extracted dynamic version");
        return Some(caps[1].to_string());
      }
    }
    None
  }

  fn write_dynamic_version(root: &Path, path: &Path, package_name: &str, version: &Version) -> FoldResult<bool> {
    let re = Regex::new(VERSION_RE)?;
    for candidate in Self::version_file_candidates(root, path, package_name) {
      if !candidate.exists() {
        continue;
      }
      let content = std::fs::read_to_string(&candidate)?;
      if re.is_match(&content) {
        let replaced = re.replace(&content, format!("__version__ = \"{}\"", version));
        std::fs::write(&candidate, replaced.as_ref())?;
        return Ok(true);
      }
    }
    Ok(false)
  }

  fn has_dynamic_version(project: &ProjectMeta) -> bool {
    project
      .dynamic
      .as_ref()
      .is_some_and(|fields| fields.iter().any(|field| field == "version"))
  }
}

impl PackageAdapter for PythonAdapter {
  fn ecosystem(&self) -> Ecosystem {
    Ecosystem::Python
  }

  fn manifest_filename(&self) -> &'static str {
    "pyproject.toml"
  }

  fn can_handle(&self, root: &Path) -> bool {
    root.join("pyproject.toml").exists()
  }

  fn resolve(&self, root: &Path, path: &Path) -> FoldResult<ResolvedPackage> {
    let manifest_path = root.join(path).join("pyproject.toml");
    let manifest = Self::load(&manifest_path)?;

    let (name, version) = if let Some(project) = &manifest.project {
      let version = if Self::has_dynamic_version(project) {
        Self::extract_dynamic_version(root, path, &project.name)
          .ok_or_else(|| manifest_invalid(&manifest_path, "dynamic version not found in source files"))?
      } else {
        project
          .version
          .clone()
          .ok_or_else(|| manifest_invalid(&manifest_path, "missing project version"))?
      };
      (project.name.clone(), version)
    } else if let Some(poetry) = manifest.tool.and_then(|t| t.poetry) {
      let name = poetry
        .name
        .ok_or_else(|| manifest_invalid(&manifest_path, "missing poetry project name"))?;
      let version = poetry
        .version
        .ok_or_else(|| manifest_invalid(&manifest_path, "missing poetry project version"))?;
      (name, version)
    } else {
      return Err(manifest_invalid(&manifest_path, "no [project] or [tool.poetry] metadata"));
    };

    Ok(ResolvedPackage {
      name,
      version: Version::parse(&version)?,
      path: path.to_path_buf(),
      private: false,
    })
  }

  fn discover(&self, root: &Path) -> FoldResult<Vec<ResolvedPackage>> {
    let mut packages = Vec::new();

    if root.join("pyproject.toml").exists() {
      match self.resolve(root, Path::new(".")) {
        Ok(package) => packages.push(package),
        Err(e) => tracing::warn!("failed to resolve root python package: {}", e),
      }
    }

    // Common monorepo layouts
    for pattern in ["packages/*", "libs/*", "apps/*"] {
      let full_pattern = format!("{}/{}", root.display(), pattern);
      for entry in glob::glob(&full_pattern)?.flatten() {
        if !entry.join("pyproject.toml").exists() {
          continue;
        }
        let relative = pathdiff::diff_paths(&entry, root).unwrap_or_else(|| entry.clone());
        match self.resolve(root, &relative) {
          Ok(package) => packages.push(package),
          Err(e) => {
            tracing::warn!(path = %entry.display(), "failed to resolve python package: {}", e);
          }
        }
      }
    }

    Ok(packages)
  }

  fn set_version(&self, root: &Path, path: &Path, version: &Version) -> FoldResult<()> {
    let manifest_path = root.join(path).join("pyproject.toml");
    let content = std::fs::read_to_string(&manifest_path)?;
    let mut doc = content
      .parse::<DocumentMut>()
      .map_err(|e| manifest_invalid(&manifest_path, e.to_string()))?;

    let manifest: PyProject =
      toml_edit::de::from_str(&content).map_err(|e| manifest_invalid(&manifest_path, e.to_string()))?;

    let mut updated = false;

    if let Some(project) = &manifest.project {
      if Self::has_dynamic_version(project) {
        updated = Self::write_dynamic_version(root, path, &project.name, version)?;
      } else if let Some(table) = doc.get_mut("project").and_then(|p| p.as_table_mut()) {
        table.insert("version", toml_edit::value(version.to_string()));
        updated = true;
      }
    }

    if let Some(poetry) = doc
      .get_mut("tool")
      .and_then(|t| t.as_table_mut())
      .and_then(|t| t.get_mut("poetry"))
      .and_then(|p| p.as_table_mut())
      && poetry.contains_key("version")
    {
      poetry.insert("version", toml_edit::value(version.to_string()));
      updated = true;
    }

    if !updated {
      return Err(manifest_invalid(&manifest_path, "found no version declaration to update"));
    }

    std::fs::write(&manifest_path, doc.to_string())?;
    Ok(())
  }

  fn internal_deps(&self, root: &Path, path: &Path, known: &BTreeSet<String>) -> FoldResult<Vec<String>> {
    let manifest_path = root.join(path).join("pyproject.toml");
    let manifest = Self::load(&manifest_path)?;

    let mut deps = BTreeSet::new();

    if let Some(dependencies) = manifest.project.and_then(|p| p.dependencies) {
      for requirement in dependencies {
        // "requests>=2.0.0 ; python_version < '3.12'" -> "requests"
        let name = requirement
          .split(&['>', '<', '=', '~', '!', ';', '[', ' '][..])
          .next()
          .unwrap_or("")
          .trim();
        if known.contains(name) {
          deps.insert(name.to_string());
        }
      }
    }

    if let Some(dependencies) = manifest.tool.and_then(|t| t.poetry).and_then(|p| p.dependencies) {
      for name in dependencies.keys() {
        if name != "python" && known.contains(name) {
          deps.insert(name.clone());
        }
      }
    }

    Ok(deps.into_iter().collect())
  }
}
