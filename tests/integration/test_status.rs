//! Integration tests for `semifold status`

use crate::helpers::{TestWorkspace, run_semifold};

#[test]
fn test_status_json_reports_pending_bumps() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.add_crate("pkg-b", "1.0.0", &[]).unwrap();
  ws.write_config(&["pkg-a", "pkg-b"]).unwrap();
  ws.write_changeset("one", &[("pkg-a", "minor:feat")], "Add widgets.").unwrap();
  ws.write_changeset("two", &[("pkg-a", "patch"), ("pkg-b", "major")], "Break things.").unwrap();
  ws.commit("set up").unwrap();

  let output = run_semifold(&ws.path, &["status", "--json"]).unwrap();
  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

  assert_eq!(report["changesets"], 2);
  let packages = report["packages"].as_array().unwrap();
  assert_eq!(packages.len(), 2);

  let pkg_a = packages.iter().find(|p| p["package"] == "pkg-a").unwrap();
  assert_eq!(pkg_a["level"], "minor");
  assert_eq!(pkg_a["current"], "0.1.0");
  assert_eq!(pkg_a["next"], "0.2.0");

  let pkg_b = packages.iter().find(|p| p["package"] == "pkg-b").unwrap();
  assert_eq!(pkg_b["level"], "major");
  assert_eq!(pkg_b["next"], "2.0.0");
}

#[test]
fn test_status_without_changesets() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.write_config(&["pkg-a"]).unwrap();
  ws.commit("set up").unwrap();

  let output = run_semifold(&ws.path, &["status", "--json"]).unwrap();
  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

  assert_eq!(report["changesets"], 0);
  assert!(report["packages"].as_array().unwrap().is_empty());
}

#[test]
fn test_status_table_output() {
  let ws = TestWorkspace::new().unwrap();
  ws.add_crate("pkg-a", "0.1.0", &[]).unwrap();
  ws.write_config(&["pkg-a"]).unwrap();
  ws.write_changeset("one", &[("pkg-a", "patch:fix")], "Fix a leak.").unwrap();
  ws.commit("set up").unwrap();

  let output = run_semifold(&ws.path, &["status"]).unwrap();
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("1 changeset(s) pending"));
  assert!(stdout.contains("pkg-a"));
  assert!(stdout.contains("0.1.0 → 0.1.1 (patch)"));
}
