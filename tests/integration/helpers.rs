//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A test monorepo with git history and a Cargo workspace
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new workspace with basic structure
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("Cargo.toml"),
      r#"[workspace]
members = ["crates/*"]
resolver = "2"
"#,
    )?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial workspace setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Add a crate to the workspace
  pub fn add_crate(&self, name: &str, version: &str, path_deps: &[&str]) -> Result<PathBuf> {
    let crate_path = self.path.join("crates").join(name);
    std::fs::create_dir_all(crate_path.join("src"))?;

    let mut cargo_toml = format!(
      r#"[package]
name = "{}"
version = "{}"
edition = "2024"

[dependencies]
"#,
      name, version
    );
    for dep in path_deps {
      cargo_toml.push_str(&format!("{} = {{ path = \"../{}\" }}\n", dep, dep));
    }

    std::fs::write(crate_path.join("Cargo.toml"), cargo_toml)?;
    std::fs::write(crate_path.join("src/lib.rs"), "\n")?;

    Ok(crate_path)
  }

  /// Write a minimal semifold config without lifecycle hooks
  pub fn write_config(&self, packages: &[&str]) -> Result<()> {
    let changes = self.path.join(".changes");
    std::fs::create_dir_all(&changes)?;

    let mut config = String::from(
      "[branches]\nbase = \"main\"\nrelease = \"release\"\n\n[tags]\nfeat = \"New Features\"\nfix = \"Bug Fixes\"\n\n",
    );
    for package in packages {
      config.push_str(&format!(
        "[packages.{}]\npath = \"crates/{}\"\necosystem = \"cargo\"\n\n",
        package, package
      ));
    }
    config.push_str("[ecosystem.cargo]\n");

    std::fs::write(changes.join("config.toml"), config)?;
    Ok(())
  }

  /// Write a changeset file directly
  pub fn write_changeset(&self, name: &str, entries: &[(&str, &str)], summary: &str) -> Result<PathBuf> {
    let mut content = String::from("---\n");
    for (package, mark) in entries {
      content.push_str(&format!("{}: {}\n", package, mark));
    }
    content.push_str(&format!("---\n\n{}\n", summary));

    let path = self.path.join(".changes").join(format!("{}.md", name));
    std::fs::write(&path, content)?;
    Ok(path)
  }

  /// Commit current changes, returning the commit SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run semifold, returning the raw output without asserting success
pub fn run_semifold_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_semifold");

  let output = Command::new(bin)
    .current_dir(cwd)
    .env_remove("CHANGESET_PATH")
    .env_remove("GITHUB_ACTIONS")
    .env_remove("GITHUB_REPOSITORY")
    .args(args)
    .output()
    .context("Failed to run semifold")?;

  Ok(output)
}

/// Run semifold and require success
pub fn run_semifold(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_semifold_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "semifold command failed: semifold {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
