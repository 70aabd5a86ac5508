//! GitHub interactions via the `gh` CLI
//!
//! Pull requests, PR comments, and releases all go through `gh`, which
//! handles authentication from the ambient `GITHUB_TOKEN` in workflows.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use crate::core::error::{FoldError, FoldResult};

/// Whether the `gh` CLI is on PATH
pub fn gh_available() -> bool {
  Command::new("gh")
    .arg("--version")
    .output()
    .map(|output| output.status.success())
    .unwrap_or(false)
}

fn run_gh(cwd: &Path, args: &[&str]) -> FoldResult<String> {
  tracing::debug!(?args, "running gh");
  let output = Command::new("gh")
    .current_dir(cwd)
    .args(args)
    .output()
    .map_err(|e| FoldError::with_help(format!("Failed to execute gh: {}", e), "Install the GitHub CLI: https://cli.github.com"))?;

  if !output.status.success() {
    return Err(FoldError::message(format!(
      "gh {} failed:\n{}",
      args.join(" "),
      String::from_utf8_lossy(&output.stderr)
    )));
  }

  Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[derive(Deserialize)]
struct PrListEntry {
  number: u64,
}

/// Find the open pull request from `head` into `base`, if one exists
pub fn find_open_pr(cwd: &Path, head: &str, base: &str) -> FoldResult<Option<u64>> {
  let stdout = run_gh(
    cwd,
    &[
      "pr", "list", "--head", head, "--base", base, "--state", "open", "--json", "number",
    ],
  )?;
  let entries: Vec<PrListEntry> = serde_json::from_str(stdout.trim())?;
  Ok(entries.first().map(|entry| entry.number))
}

pub fn create_pr(cwd: &Path, head: &str, base: &str, title: &str, body: &str) -> FoldResult<()> {
  run_gh(
    cwd,
    &[
      "pr", "create", "--head", head, "--base", base, "--title", title, "--body", body,
    ],
  )?;
  Ok(())
}

pub fn update_pr(cwd: &Path, number: u64, title: &str, body: &str) -> FoldResult<()> {
  let number = number.to_string();
  run_gh(cwd, &["pr", "edit", &number, "--title", title, "--body", body])?;
  Ok(())
}

/// Add or refresh a bot comment on a pull request
pub fn upsert_pr_comment(cwd: &Path, number: u64, body: &str) -> FoldResult<()> {
  let number = number.to_string();
  // --edit-last updates our previous comment; fall back to a fresh one
  if run_gh(cwd, &["pr", "comment", &number, "--edit-last", "--body", body]).is_err() {
    run_gh(cwd, &["pr", "comment", &number, "--body", body])?;
  }
  Ok(())
}

/// Whether a release with this tag already exists
pub fn release_exists(cwd: &Path, tag: &str) -> bool {
  run_gh(cwd, &["release", "view", tag]).is_ok()
}

pub fn create_release(cwd: &Path, tag: &str, title: &str, notes: &str, assets: &[String]) -> FoldResult<()> {
  let mut args = vec!["release", "create", tag, "--title", title, "--notes", notes];
  for asset in assets {
    args.push(asset);
  }
  run_gh(cwd, &args)?;
  Ok(())
}
