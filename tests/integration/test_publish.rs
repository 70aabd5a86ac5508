//! Integration tests for `semifold publish`
//!
//! The test config has no registry-check and no publish commands, so these
//! exercise ordering and skip logic without touching the network.

use crate::helpers::{TestWorkspace, run_semifold, run_semifold_raw};

#[test]
fn test_publish_orders_dependencies_first() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-b", "0.2.0", &[]).unwrap();
  ws.add_crate("pkg-a", "0.1.0", &["pkg-b"]).unwrap();
  ws.write_config(&["pkg-a", "pkg-b"]).unwrap();
  ws.commit("set up").unwrap();

  let output = run_semifold(&ws.path, &["publish"]).unwrap();
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Order: pkg-b → pkg-a"));
}

#[test]
fn test_publish_skips_private_packages() {
  let ws = TestWorkspace::new().unwrap();
  let crate_path = ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  let manifest = std::fs::read_to_string(crate_path.join("Cargo.toml")).unwrap();
  std::fs::write(
    crate_path.join("Cargo.toml"),
    manifest.replace("edition = \"2024\"", "edition = \"2024\"\npublish = false"),
  )
  .unwrap();
  ws.write_config(&["pkg-a"]).unwrap();
  ws.commit("set up").unwrap();

  let output = run_semifold(&ws.path, &["publish"]).unwrap();
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Private package, skipping"));
}

#[test]
fn test_publish_single_package_filter() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.add_crate("pkg-b", "0.2.0", &[]).unwrap();
  ws.write_config(&["pkg-a", "pkg-b"]).unwrap();
  ws.commit("set up").unwrap();

  let output = run_semifold(&ws.path, &["publish", "--package", "pkg-b"]).unwrap();
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("pkg-b"));
  assert!(!stdout.contains("[2/2]"));

  let output = run_semifold_raw(&ws.path, &["publish", "--package", "nope"]).unwrap();
  assert!(!output.status.success());
}

#[test]
fn test_ci_refuses_outside_github_actions() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.write_config(&["pkg-a"]).unwrap();
  ws.commit("set up").unwrap();

  let output = run_semifold_raw(&ws.path, &["ci"]).unwrap();
  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("requires a CI environment"));
}
