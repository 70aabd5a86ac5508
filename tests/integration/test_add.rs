//! Integration tests for `semifold add`

use crate::helpers::{TestWorkspace, run_semifold, run_semifold_raw};

fn workspace() -> TestWorkspace {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.add_crate("pkg-b", "0.2.0", &[]).unwrap();
  ws.write_config(&["pkg-a", "pkg-b"]).unwrap();
  ws.commit("set up workspace").unwrap();
  ws
}

#[test]
fn test_add_creates_changeset() {
  let ws = workspace();

  run_semifold(
    &ws.path,
    &[
      "add",
      "my-change",
      "--package",
      "pkg-a:minor",
      "--package",
      "pkg-b",
      "--tag",
      "feat",
      "--summary",
      "Teach pkg-a new tricks.",
    ],
  )
  .unwrap();

  let content = ws.read_file(".changes/my-change.md").unwrap();
  assert!(content.starts_with("---\n"));
  assert!(content.contains("pkg-a: minor:feat"));
  assert!(content.contains("pkg-b: patch:feat"));
  assert!(content.contains("Teach pkg-a new tricks."));
}

#[test]
fn test_add_sanitizes_name() {
  let ws = workspace();

  run_semifold(
    &ws.path,
    &["add", "My Change", "--package", "pkg-a", "--summary", "Something."],
  )
  .unwrap();

  assert!(ws.file_exists(".changes/my-change.md"));
}

#[test]
fn test_add_rejects_duplicate_name() {
  let ws = workspace();

  run_semifold(
    &ws.path,
    &["add", "dup", "--package", "pkg-a", "--summary", "First."],
  )
  .unwrap();

  let output = run_semifold_raw(
    &ws.path,
    &["add", "dup", "--package", "pkg-a", "--summary", "Second."],
  )
  .unwrap();
  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("already exists"));
}

#[test]
fn test_add_rejects_unknown_package() {
  let ws = workspace();

  let output = run_semifold_raw(
    &ws.path,
    &["add", "oops", "--package", "pkg-zzz", "--summary", "Broken."],
  )
  .unwrap();
  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("pkg-zzz"));
  assert!(!ws.file_exists(".changes/oops.md"));
}

#[test]
fn test_add_without_tag_uses_bare_mark() {
  let ws = workspace();

  run_semifold(
    &ws.path,
    &["add", "untagged", "--package", "pkg-a:major", "--tag", "", "--summary", "Break things."],
  )
  .unwrap();

  let content = ws.read_file(".changes/untagged.md").unwrap();
  assert!(content.contains("pkg-a: major\n"));
}
