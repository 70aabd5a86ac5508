//! CMake (C++) ecosystem adapter
//!
//! Reads and rewrites the `project(... VERSION x.y.z ...)` declaration in
//! CMakeLists.txt; a `vcpkg.json` manifest is updated alongside when present.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;
use semver::Version;

use crate::adapters::{Ecosystem, PackageAdapter, ResolvedPackage};
use crate::core::error::{ConfigError, FoldError, FoldResult};

pub struct CmakeAdapter;

fn manifest_invalid(path: &Path, reason: impl Into<String>) -> FoldError {
  FoldError::Config(ConfigError::ManifestInvalid {
    path: path.to_path_buf(),
    reason: reason.into(),
  })
}

impl CmakeAdapter {
  fn read_manifest(root: &Path, path: &Path) -> FoldResult<(std::path::PathBuf, String)> {
    let manifest_path = root.join(path).join("CMakeLists.txt");
    if !manifest_path.exists() {
      return Err(manifest_invalid(&manifest_path, "file not found"));
    }
    let content = std::fs::read_to_string(&manifest_path)?;
    Ok((manifest_path, content))
  }

  fn update_vcpkg_version(root: &Path, path: &Path, version: &Version) -> FoldResult<()> {
    let vcpkg_path = root.join(path).join("vcpkg.json");
    if !vcpkg_path.exists() {
      return Ok(());
    }

    let content = std::fs::read_to_string(&vcpkg_path)?;
    let mut manifest: serde_json::Value =
      serde_json::from_str(&content).map_err(|e| manifest_invalid(&vcpkg_path, e.to_string()))?;

    if let Some(object) = manifest.as_object_mut() {
      object.insert(
        "version".to_string(),
        serde_json::Value::String(version.to_string()),
      );
    }

    let mut rendered = serde_json::to_string_pretty(&manifest)?;
    rendered.push('\n');
    std::fs::write(&vcpkg_path, rendered)?;
    Ok(())
  }
}

impl PackageAdapter for CmakeAdapter {
  fn ecosystem(&self) -> Ecosystem {
    Ecosystem::Cmake
  }

  fn manifest_filename(&self) -> &'static str {
    "CMakeLists.txt"
  }

  fn can_handle(&self, root: &Path) -> bool {
    root.join("CMakeLists.txt").exists()
  }

  fn resolve(&self, root: &Path, path: &Path) -> FoldResult<ResolvedPackage> {
    let (manifest_path, content) = Self::read_manifest(root, path)?;

    let name_re = Regex::new(r"project\s*\(\s*(\w+)")?;
    let name = name_re
      .captures(&content)
      .and_then(|caps| caps.get(1))
      .map(|m| m.as_str().to_string())
      .ok_or_else(|| manifest_invalid(&manifest_path, "project name not found in project() declaration"))?;

    let version_re = Regex::new(r"project\s*\([^)]*VERSION\s+([\d.]+)")?;
    let version = version_re
      .captures(&content)
      .and_then(|caps| caps.get(1))
      .map(|m| m.as_str().to_string())
      .ok_or_else(|| manifest_invalid(&manifest_path, "VERSION not found in project() declaration"))?;

    Ok(ResolvedPackage {
      name,
      version: Version::parse(&version)?,
      path: path.to_path_buf(),
      private: false,
    })
  }

  fn discover(&self, root: &Path) -> FoldResult<Vec<ResolvedPackage>> {
    if !root.join("CMakeLists.txt").exists() {
      return Ok(Vec::new());
    }
    // No workspace concept; a single project at the root
    Ok(vec![self.resolve(root, Path::new("."))?])
  }

  fn set_version(&self, root: &Path, path: &Path, version: &Version) -> FoldResult<()> {
    let (manifest_path, content) = Self::read_manifest(root, path)?;

    let re = Regex::new(r"(project\s*\([^)]*VERSION\s+)([\d.]+)")?;
    if !re.is_match(&content) {
      return Err(manifest_invalid(&manifest_path, "VERSION not found in project() declaration"));
    }
    let updated = re.replace(&content, |caps: &regex::Captures| format!("{}{}", &caps[1], version));
    std::fs::write(&manifest_path, updated.as_ref())?;

    Self::update_vcpkg_version(root, path, version)?;
    Ok(())
  }

  fn internal_deps(&self, _root: &Path, _path: &Path, _known: &BTreeSet<String>) -> FoldResult<Vec<String>> {
    // CMake declares no machine-readable dependencies between managed packages
    Ok(Vec::new())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CMAKE: &str = "cmake_minimum_required(VERSION 3.20)\nproject(Widget VERSION 1.2.3 LANGUAGES CXX)\n";

  #[test]
  fn test_resolve() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("CMakeLists.txt"), CMAKE).unwrap();

    let adapter = CmakeAdapter;
    let package = adapter.resolve(dir.path(), Path::new(".")).unwrap();
    assert_eq!(package.name, "Widget");
    assert_eq!(package.version, Version::new(1, 2, 3));
  }

  #[test]
  fn test_set_version_preserves_rest() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("CMakeLists.txt"), CMAKE).unwrap();

    let adapter = CmakeAdapter;
    adapter.set_version(dir.path(), Path::new("."), &Version::new(2, 0, 0)).unwrap();

    let content = std::fs::read_to_string(dir.path().join("CMakeLists.txt")).unwrap();
    assert!(content.contains("project(Widget VERSION 2.0.0 LANGUAGES CXX)"));
    assert!(content.contains("cmake_minimum_required"));
  }

  #[test]
  fn test_updates_vcpkg_manifest() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("CMakeLists.txt"), CMAKE).unwrap();
    std::fs::write(
      dir.path().join("vcpkg.json"),
      "{\n  \"name\": \"widget\",\n  \"version\": \"1.2.3\"\n}\n",
    )
    .unwrap();

    let adapter = CmakeAdapter;
    adapter.set_version(dir.path(), Path::new("."), &Version::new(1, 3, 0)).unwrap();

    let vcpkg: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(dir.path().join("vcpkg.json")).unwrap()).unwrap();
    assert_eq!(vcpkg["version"], "1.3.0");
  }

  #[test]
  fn test_missing_version_errors() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("CMakeLists.txt"), "project(NoVersion)\n").unwrap();

    let adapter = CmakeAdapter;
    assert!(adapter.resolve(dir.path(), Path::new(".")).is_err());
  }
}
