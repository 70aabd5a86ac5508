//! Integration tests for `semifold version`

use crate::helpers::{TestWorkspace, run_semifold};

fn workspace() -> TestWorkspace {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.add_crate("pkg-b", "1.0.0", &[]).unwrap();
  ws.write_config(&["pkg-a", "pkg-b"]).unwrap();
  ws
}

#[test]
fn test_version_applies_bumps_and_writes_changelogs() {
  let ws = workspace();
  ws.write_changeset("one", &[("pkg-a", "minor:feat")], "Add widgets.").unwrap();
  ws.write_changeset("two", &[("pkg-a", "patch:fix"), ("pkg-b", "patch")], "Fix a widget leak.").unwrap();
  ws.commit("record changesets").unwrap();

  run_semifold(&ws.path, &["version"]).unwrap();

  // Highest pending level wins: minor for pkg-a
  let manifest_a = ws.read_file("crates/pkg-a/Cargo.toml").unwrap();
  assert!(manifest_a.contains("version = \"0.2.0\""));
  let manifest_b = ws.read_file("crates/pkg-b/Cargo.toml").unwrap();
  assert!(manifest_b.contains("version = \"1.0.1\""));

  let changelog_a = ws.read_file("crates/pkg-a/CHANGELOG.md").unwrap();
  assert!(changelog_a.starts_with("# Changelog"));
  assert!(changelog_a.contains("## 0.2.0"));
  assert!(changelog_a.contains("### New Features"));
  assert!(changelog_a.contains("Add widgets."));
  assert!(changelog_a.contains("### Bug Fixes"));
  assert!(changelog_a.contains("Fix a widget leak."));

  let changelog_b = ws.read_file("crates/pkg-b/CHANGELOG.md").unwrap();
  assert!(changelog_b.contains("## 1.0.1"));
  assert!(changelog_b.contains("### Changes"));

  // Consumed changesets are removed
  assert!(!ws.file_exists(".changes/one.md"));
  assert!(!ws.file_exists(".changes/two.md"));
}

#[test]
fn test_version_dry_run_touches_nothing() {
  let ws = workspace();
  ws.write_changeset("one", &[("pkg-a", "major")], "Break the API.").unwrap();
  ws.commit("record changeset").unwrap();

  let output = run_semifold(&ws.path, &["version", "--dry-run"]).unwrap();
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("pkg-a 0.1.0 → 1.0.0 (major)"));
  assert!(stdout.contains("dry-run"));

  let manifest = ws.read_file("crates/pkg-a/Cargo.toml").unwrap();
  assert!(manifest.contains("version = \"0.1.0\""));
  assert!(!ws.file_exists("crates/pkg-a/CHANGELOG.md"));
  assert!(ws.file_exists(".changes/one.md"));
}

#[test]
fn test_version_without_changesets() {
  let ws = workspace();
  ws.commit("no changesets").unwrap();

  let output = run_semifold(&ws.path, &["version"]).unwrap();
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("No changesets found"));
}

#[test]
fn test_version_stacks_changelog_sections() {
  let ws = workspace();

  ws.write_changeset("one", &[("pkg-a", "patch:fix")], "First fix.").unwrap();
  ws.commit("first changeset").unwrap();
  run_semifold(&ws.path, &["version"]).unwrap();

  ws.write_changeset("two", &[("pkg-a", "patch:fix")], "Second fix.").unwrap();
  ws.commit("second changeset").unwrap();
  run_semifold(&ws.path, &["version"]).unwrap();

  let changelog = ws.read_file("crates/pkg-a/CHANGELOG.md").unwrap();
  let newest = changelog.find("## 0.1.2").unwrap();
  let older = changelog.find("## 0.1.1").unwrap();
  assert!(newest < older, "newest release section must come first");
  assert!(changelog.contains("First fix."));
  assert!(changelog.contains("Second fix."));
}
