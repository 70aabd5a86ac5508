//! CI release pipeline: version, release branch, release pull request
//!
//! Runs on pushes to the base branch. With no pending changesets the current
//! versions are published; otherwise versions are bumped, the release branch
//! is reset to carry the bumps, and the release pull request is created or
//! refreshed with the aggregated changelogs.

use clap::Args;

use crate::commands::{publish, version};
use crate::core::changeset;
use crate::core::context::Context;
use crate::core::error::{FoldError, FoldResult, ValidationError};
use crate::core::github;

const RELEASE_COMMIT_MESSAGE: &str = "chore(release): bump versions";
const BOT_NAME: &str = "github-actions";
const BOT_EMAIL: &str = "github-actions@users.noreply.github.com";

#[derive(Debug, Args)]
pub struct CiArgs {}

pub fn run(_args: &CiArgs, ctx: &Context) -> FoldResult<()> {
  let (config, changes_dir) = ctx.require_config()?;

  if !ctx.is_ci() {
    return Err(FoldError::Validation(ValidationError::NotCi {
      command: "ci".to_string(),
    }));
  }

  let ref_name = std::env::var("GITHUB_REF_NAME").map_err(|_| {
    FoldError::with_help(
      "GITHUB_REF_NAME is not set",
      "Run `semifold ci` from a GitHub Actions push workflow.",
    )
  })?;
  if ref_name != config.branches.base {
    println!("ℹ️  Not a push to '{}', skipping versioning and publishing", config.branches.base);
    return Ok(());
  }

  let changesets = changeset::load_changesets(changes_dir)?;
  if changesets.is_empty() {
    println!("ℹ️  No changesets found, publishing current versions");
    return publish::publish_packages(ctx, None, false, 0);
  }

  if !github::gh_available() {
    return Err(FoldError::with_help(
      "The `gh` CLI is required for the release pull request",
      "Install it in the workflow: https://cli.github.com (preinstalled on GitHub-hosted runners).",
    ));
  }

  let applied = version::apply_versions(ctx)?;
  if applied.is_empty() {
    return Ok(());
  }

  let base = config.branches.base.clone();
  let release = config.branches.release.clone();

  let git = ctx.git()?;
  git.checkout_branch_at_head(&release)?;
  git.stage_all()?;
  git.commit_with_identity(RELEASE_COMMIT_MESSAGE, BOT_NAME, BOT_EMAIL)?;
  git.force_push("origin", &release)?;
  println!("🚀 Pushed release branch '{}'", release);

  let body = format!(
    "# Releases\n\n{}",
    applied
      .iter()
      .map(|(name, bump)| format!("## {} v{}\n\n{}", name, bump.version, bump.changelog))
      .collect::<Vec<_>>()
      .join("\n\n")
  );

  let root = ctx.root()?;
  match github::find_open_pr(&root, &release, &base)? {
    Some(number) => {
      println!("ℹ️  Updating existing release pull request #{}", number);
      github::update_pr(&root, number, RELEASE_COMMIT_MESSAGE, &body)?;
    }
    None => {
      github::create_pr(&root, &release, &base, RELEASE_COMMIT_MESSAGE, &body)?;
      println!("✅ Opened release pull request");
    }
  }

  Ok(())
}
