//! Cargo (Rust) ecosystem adapter
//!
//! Manifests are edited with toml_edit so user formatting and comments
//! survive version bumps. Workspace discovery expands `members` globs
//! directly instead of invoking the cargo toolchain, which may not be
//! installed in a polyglot monorepo.

use std::collections::BTreeSet;
use std::path::Path;

use semver::Version;
use toml_edit::DocumentMut;

use crate::adapters::{Ecosystem, PackageAdapter, ResolvedPackage};
use crate::core::error::{ConfigError, FoldError, FoldResult};

pub struct CargoAdapter;

fn manifest_invalid(path: &Path, reason: impl Into<String>) -> FoldError {
  FoldError::Config(ConfigError::ManifestInvalid {
    path: path.to_path_buf(),
    reason: reason.into(),
  })
}

impl CargoAdapter {
  fn load_doc(manifest_path: &Path) -> FoldResult<DocumentMut> {
    if !manifest_path.exists() {
      return Err(manifest_invalid(manifest_path, "file not found"));
    }
    let content = std::fs::read_to_string(manifest_path)?;
    content
      .parse::<DocumentMut>()
      .map_err(|e| manifest_invalid(manifest_path, e.to_string()))
  }

  /// Version declared under `[workspace.package]` in the root manifest
  fn workspace_version(root: &Path) -> FoldResult<Version> {
    let manifest_path = root.join("Cargo.toml");
    let doc = Self::load_doc(&manifest_path)?;
    let version = doc
      .get("workspace")
      .and_then(|w| w.as_table_like())
      .and_then(|t| t.get("package"))
      .and_then(|p| p.as_table_like())
      .and_then(|t| t.get("version"))
      .and_then(|v| v.as_str())
      .ok_or_else(|| manifest_invalid(&manifest_path, "no [workspace.package] version to inherit"))?;
    Ok(Version::parse(version)?)
  }

  fn is_workspace_inherited(item: Option<&toml_edit::Item>) -> bool {
    item
      .and_then(|i| i.as_table_like())
      .and_then(|t| t.get("workspace"))
      .and_then(|w| w.as_bool())
      == Some(true)
  }
}

impl PackageAdapter for CargoAdapter {
  fn ecosystem(&self) -> Ecosystem {
    Ecosystem::Cargo
  }

  fn manifest_filename(&self) -> &'static str {
    "Cargo.toml"
  }

  fn can_handle(&self, root: &Path) -> bool {
    root.join("Cargo.toml").exists()
  }

  fn resolve(&self, root: &Path, path: &Path) -> FoldResult<ResolvedPackage> {
    let manifest_path = root.join(path).join("Cargo.toml");
    let doc = Self::load_doc(&manifest_path)?;

    let package = doc
      .get("package")
      .and_then(|p| p.as_table_like())
      .ok_or_else(|| manifest_invalid(&manifest_path, "missing [package] table"))?;

    let name = package
      .get("name")
      .and_then(|n| n.as_str())
      .ok_or_else(|| manifest_invalid(&manifest_path, "missing package name"))?
      .to_string();

    let version_item = package.get("version");
    let version = if let Some(version) = version_item.and_then(|v| v.as_str()) {
      Version::parse(version)?
    } else if Self::is_workspace_inherited(version_item) {
      Self::workspace_version(root)?
    } else {
      return Err(manifest_invalid(&manifest_path, "missing package version"));
    };

    let private = match package.get("publish") {
      Some(item) => item.as_bool() == Some(false) || item.as_array().is_some_and(|a| a.is_empty()),
      None => false,
    };

    Ok(ResolvedPackage {
      name,
      version,
      path: path.to_path_buf(),
      private,
    })
  }

  fn discover(&self, root: &Path) -> FoldResult<Vec<ResolvedPackage>> {
    let manifest_path = root.join("Cargo.toml");
    let doc = Self::load_doc(&manifest_path)?;

    let mut packages = Vec::new();
    let mut seen = BTreeSet::new();

    if doc.get("package").is_some() {
      let package = self.resolve(root, Path::new("."))?;
      seen.insert(package.name.clone());
      packages.push(package);
    }

    let members = doc
      .get("workspace")
      .and_then(|w| w.as_table_like())
      .and_then(|t| t.get("members"))
      .and_then(|m| m.as_array());

    if let Some(members) = members {
      for member in members.iter().filter_map(|m| m.as_str()) {
        let pattern = root.join(member).to_string_lossy().to_string();
        for entry in glob::glob(&pattern)?.flatten() {
          if !entry.join("Cargo.toml").exists() {
            continue;
          }
          let relative = pathdiff::diff_paths(&entry, root).unwrap_or_else(|| entry.clone());
          match self.resolve(root, &relative) {
            Ok(package) => {
              if seen.insert(package.name.clone()) {
                packages.push(package);
              }
            }
            Err(e) => {
              tracing::warn!(path = %entry.display(), "failed to resolve workspace member: {}", e);
            }
          }
        }
      }
    }

    Ok(packages)
  }

  fn set_version(&self, root: &Path, path: &Path, version: &Version) -> FoldResult<()> {
    let manifest_path = root.join(path).join("Cargo.toml");
    let content = std::fs::read_to_string(&manifest_path)?;
    let mut doc = content
      .parse::<DocumentMut>()
      .map_err(|e| manifest_invalid(&manifest_path, e.to_string()))?;

    let package = doc
      .get_mut("package")
      .and_then(|p| p.as_table_like_mut())
      .ok_or_else(|| manifest_invalid(&manifest_path, "missing [package] table"))?;

    if Self::is_workspace_inherited(package.get("version")) {
      return Err(manifest_invalid(
        &manifest_path,
        "version is workspace-inherited; bump the workspace root instead",
      ));
    }

    package.insert("version", toml_edit::value(version.to_string()));
    std::fs::write(&manifest_path, doc.to_string())?;
    Ok(())
  }

  fn internal_deps(&self, root: &Path, path: &Path, known: &BTreeSet<String>) -> FoldResult<Vec<String>> {
    let manifest_path = root.join(path).join("Cargo.toml");
    let doc = Self::load_doc(&manifest_path)?;

    let mut deps = BTreeSet::new();
    for section in ["dependencies", "dev-dependencies", "build-dependencies"] {
      let Some(table) = doc.get(section).and_then(|s| s.as_table_like()) else {
        continue;
      };
      for (key, item) in table.iter() {
        // `package = "..."` renames take precedence over the dependency key
        let name = item
          .as_table_like()
          .and_then(|t| t.get("package"))
          .and_then(|p| p.as_str())
          .unwrap_or(key);
        if known.contains(name) {
          deps.insert(name.to_string());
        }
      }
    }

    Ok(deps.into_iter().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  fn write_workspace(root: &Path) {
    std::fs::write(
      root.join("Cargo.toml"),
      "[workspace]\nmembers = [\"crates/*\"]\nresolver = \"2\"\n",
    )
    .unwrap();
    for (name, version, dep) in [("pkg-a", "0.1.0", Some("pkg-b")), ("pkg-b", "0.2.1", None)] {
      let dir = root.join("crates").join(name);
      std::fs::create_dir_all(&dir).unwrap();
      let mut manifest = format!(
        "[package]\nname = \"{}\"\nversion = \"{}\" # keep in sync\nedition = \"2024\"\n\n[dependencies]\nserde = \"1\"\n",
        name, version
      );
      if let Some(dep) = dep {
        manifest.push_str(&format!("{} = {{ path = \"../{}\" }}\n", dep, dep));
      }
      std::fs::write(dir.join("Cargo.toml"), manifest).unwrap();
    }
  }

  #[test]
  fn test_resolve_package() {
    let dir = tempfile::tempdir().unwrap();
    write_workspace(dir.path());

    let adapter = CargoAdapter;
    let package = adapter.resolve(dir.path(), Path::new("crates/pkg-a")).unwrap();
    assert_eq!(package.name, "pkg-a");
    assert_eq!(package.version, Version::new(0, 1, 0));
    assert!(!package.private);
  }

  #[test]
  fn test_discover_workspace_members() {
    let dir = tempfile::tempdir().unwrap();
    write_workspace(dir.path());

    let adapter = CargoAdapter;
    let mut names: Vec<String> = adapter
      .discover(dir.path())
      .unwrap()
      .into_iter()
      .map(|p| p.name)
      .collect();
    names.sort();
    assert_eq!(names, vec!["pkg-a", "pkg-b"]);
  }

  #[test]
  fn test_set_version_preserves_comments() {
    let dir = tempfile::tempdir().unwrap();
    write_workspace(dir.path());

    let adapter = CargoAdapter;
    adapter
      .set_version(dir.path(), Path::new("crates/pkg-a"), &Version::new(0, 2, 0))
      .unwrap();

    let content = std::fs::read_to_string(dir.path().join("crates/pkg-a/Cargo.toml")).unwrap();
    assert!(content.contains("version = \"0.2.0\""));
    assert!(content.contains("# keep in sync"));
  }

  #[test]
  fn test_internal_deps() {
    let dir = tempfile::tempdir().unwrap();
    write_workspace(dir.path());

    let adapter = CargoAdapter;
    let known: BTreeSet<String> = ["pkg-a", "pkg-b"].iter().map(|s| s.to_string()).collect();
    let deps = adapter.internal_deps(dir.path(), Path::new("crates/pkg-a"), &known).unwrap();
    assert_eq!(deps, vec!["pkg-b"]);

    let deps = adapter.internal_deps(dir.path(), Path::new("crates/pkg-b"), &known).unwrap();
    assert!(deps.is_empty());
  }

  #[test]
  fn test_private_package() {
    let dir = tempfile::tempdir().unwrap();
    let pkg = dir.path().join("internal");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(
      pkg.join("Cargo.toml"),
      "[package]\nname = \"internal\"\nversion = \"0.1.0\"\npublish = false\n",
    )
    .unwrap();

    let adapter = CargoAdapter;
    let package = adapter.resolve(dir.path(), Path::new("internal")).unwrap();
    assert!(package.private);
  }

  #[test]
  fn test_workspace_inherited_version() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("Cargo.toml"),
      "[workspace]\nmembers = [\"member\"]\n\n[workspace.package]\nversion = \"1.4.0\"\n",
    )
    .unwrap();
    let member = dir.path().join("member");
    std::fs::create_dir_all(&member).unwrap();
    std::fs::write(
      member.join("Cargo.toml"),
      "[package]\nname = \"member\"\nversion = { workspace = true }\n",
    )
    .unwrap();

    let adapter = CargoAdapter;
    let package = adapter.resolve(dir.path(), Path::new("member")).unwrap();
    assert_eq!(package.version, Version::new(1, 4, 0));

    let err = adapter
      .set_version(dir.path(), Path::new("member"), &Version::new(1, 5, 0))
      .unwrap_err();
    assert!(err.to_string().contains("workspace-inherited"));
  }

  #[test]
  fn test_missing_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = CargoAdapter;
    let err = adapter.resolve(dir.path(), PathBuf::from("nope").as_path()).unwrap_err();
    assert!(err.to_string().contains("not found"));
  }
}
