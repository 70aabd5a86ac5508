//! Integration tests for `semifold init`

use crate::helpers::{TestWorkspace, run_semifold, run_semifold_raw};

#[test]
fn test_init_writes_config() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.add_crate("pkg-b", "0.2.0", &[]).unwrap();
  ws.commit("add crates").unwrap();

  run_semifold(
    &ws.path,
    &[
      "init",
      "--ecosystem",
      "cargo",
      "--base-branch",
      "main",
      "--release-branch",
      "release",
    ],
  )
  .unwrap();

  assert!(ws.file_exists(".changes/config.toml"));
  let config = ws.read_file(".changes/config.toml").unwrap();
  assert!(config.contains("base = \"main\""));
  assert!(config.contains("release = \"release\""));
  assert!(config.contains("[packages.pkg-a]"));
  assert!(config.contains("[packages.pkg-b]"));
  assert!(config.contains("ecosystem = \"cargo\""));
  assert!(config.contains("[ecosystem.cargo"));
}

#[test]
fn test_init_is_idempotent_without_force() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.commit("add crate").unwrap();

  run_semifold(
    &ws.path,
    &["init", "--ecosystem", "cargo", "--base-branch", "main", "--release-branch", "release"],
  )
  .unwrap();
  let before = ws.read_file(".changes/config.toml").unwrap();

  // Second init succeeds but leaves the config alone
  let output = run_semifold(
    &ws.path,
    &["init", "--ecosystem", "cargo", "--base-branch", "other", "--release-branch", "other"],
  )
  .unwrap();
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("already initialized"));

  let after = ws.read_file(".changes/config.toml").unwrap();
  assert_eq!(before, after);
}

#[test]
fn test_init_detects_ecosystem() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.commit("add crate").unwrap();

  // No --ecosystem flag: the Cargo workspace is detected
  run_semifold(
    &ws.path,
    &["init", "--base-branch", "main", "--release-branch", "release"],
  )
  .unwrap();

  let config = ws.read_file(".changes/config.toml").unwrap();
  assert!(config.contains("[packages.pkg-a]"));
}

#[test]
fn test_init_docs_metadata() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.commit("add crate").unwrap();

  run_semifold(
    &ws.path,
    &[
      "init",
      "--ecosystem",
      "cargo",
      "--base-branch",
      "main",
      "--release-branch",
      "release",
      "--docs",
    ],
  )
  .unwrap();

  let site: serde_json::Value = serde_json::from_str(&ws.read_file("docs/site.json").unwrap()).unwrap();
  assert_eq!(site["socialLinks"][0]["icon"], "github");
  assert_eq!(site["locales"][0]["lang"], "en");
}

#[test]
fn test_init_ci_workflows() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.commit("add crate").unwrap();

  run_semifold(
    &ws.path,
    &[
      "init",
      "--ecosystem",
      "cargo",
      "--base-branch",
      "main",
      "--release-branch",
      "release",
      "--ci",
    ],
  )
  .unwrap();

  let release = ws.read_file(".github/workflows/semifold-release.yml").unwrap();
  assert!(release.contains("semifold ci"));
  assert!(release.contains("- main"));

  let status = ws.read_file(".github/workflows/semifold-status.yml").unwrap();
  assert!(status.contains("semifold status"));
}

#[test]
fn test_init_fails_without_ecosystem() {
  let ws = TestWorkspace::new().unwrap();
  std::fs::remove_file(ws.path.join("Cargo.toml")).unwrap();

  let output = run_semifold_raw(
    &ws.path,
    &["init", "--base-branch", "main", "--release-branch", "release"],
  )
  .unwrap();
  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No supported ecosystems"));
}
