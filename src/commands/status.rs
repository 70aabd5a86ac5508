//! Report pending changesets and the version bumps they imply

use clap::Args;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::changeset::{self, BumpLevel};
use crate::core::context::Context;
use crate::core::error::{FoldResult, ResultExt};
use crate::core::github;
use crate::ui::progress::ParallelProgress;

#[derive(Debug, Args)]
pub struct StatusArgs {
  /// Output as JSON for CI integration
  #[arg(long)]
  pub json: bool,

  /// Skip the pull request comment in CI
  #[arg(long)]
  pub no_comment: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BumpReport {
  pub package: String,
  pub level: BumpLevel,
  pub current: String,
  pub next: String,
}

#[derive(Debug, Serialize)]
struct StatusReport {
  changesets: usize,
  packages: Vec<BumpReport>,
}

// Relevant slice of the GitHub Actions pull_request event payload
#[derive(Debug, Deserialize)]
struct GitHubEvent {
  pull_request: PullRequest,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
  number: u64,
  head: Branch,
  base: Branch,
}

#[derive(Debug, Deserialize)]
struct Branch {
  #[serde(rename = "ref")]
  ref_name: String,
}

/// Resolve the pending bump for every configured package, in parallel
pub fn collect_bumps(ctx: &Context, show_progress: bool) -> FoldResult<(usize, Vec<BumpReport>)> {
  let (config, changes_dir) = ctx.require_config()?;
  let changesets = changeset::load_changesets(changes_dir)?;
  let root = ctx.root()?;

  let pending: Vec<(&String, BumpLevel)> = config
    .packages
    .keys()
    .map(|name| (name, changeset::pending_level(&changesets, name)))
    .filter(|(_, level)| *level != BumpLevel::None)
    .collect();

  let progress = show_progress.then(ParallelProgress::new);
  let bars: Vec<_> = progress
    .as_ref()
    .map(|p| {
      pending
        .iter()
        .map(|(name, _)| p.add_bar(1, format!("Resolving {}", name)))
        .collect()
    })
    .unwrap_or_default();

  let reports: Vec<FoldResult<BumpReport>> = pending
    .par_iter()
    .enumerate()
    .map(|(idx, (name, level))| {
      let entry = config.package(name.as_str())?;
      let adapter = ctx.adapter(entry);
      let resolved = adapter
        .resolve(&root, &entry.path)
        .with_context(|| format!("Failed to read {} for '{}'", adapter.manifest_filename(), name))?;
      let next = level.apply(&resolved.version);

      if let Some(progress) = &progress {
        progress.inc(&bars[idx]);
      }

      Ok(BumpReport {
        package: (*name).clone(),
        level: *level,
        current: resolved.version.to_string(),
        next: next.to_string(),
      })
    })
    .collect();

  let reports = reports.into_iter().collect::<FoldResult<Vec<_>>>()?;
  Ok((changesets.len(), reports))
}

pub fn run(args: &StatusArgs, ctx: &Context) -> FoldResult<()> {
  let (config, _) = ctx.require_config()?;
  let (changeset_count, reports) = collect_bumps(ctx, !args.json)?;

  if args.json {
    let report = StatusReport {
      changesets: changeset_count,
      packages: reports.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    println!("📋 {} changeset(s) pending\n", changeset_count);
    if reports.is_empty() {
      println!("No packages need a version bump.");
    } else {
      let name_width = reports.iter().map(|r| r.package.len()).max().unwrap_or(0) + 1;
      for report in &reports {
        println!(
          "{:<width$} {} → {} ({})",
          report.package,
          report.current,
          report.next,
          report.level,
          width = name_width
        );
      }
    }
  }

  if args.no_comment || !ctx.is_ci() {
    return Ok(());
  }

  // Comment only on pull requests into the base branch
  let Ok(event_path) = std::env::var("GITHUB_EVENT_PATH") else {
    return Ok(());
  };
  let event_data = std::fs::read_to_string(&event_path)?;
  let Ok(event) = serde_json::from_str::<GitHubEvent>(&event_data) else {
    tracing::debug!("event payload has no pull_request, skipping comment");
    return Ok(());
  };

  let head = &event.pull_request.head.ref_name;
  let base = &event.pull_request.base.ref_name;
  if base != &config.branches.base || head == &config.branches.base {
    tracing::debug!(head = %head, base = %base, "not a pull request into the base branch");
    return Ok(());
  }

  let body = comment_body(changeset_count, &reports);
  let root = ctx.root()?;
  github::upsert_pr_comment(&root, event.pull_request.number, &body)?;
  println!("\n💬 Updated pull request comment");

  Ok(())
}

fn comment_body(changeset_count: usize, reports: &[BumpReport]) -> String {
  let table = reports
    .iter()
    .map(|r| format!("| {} | {} | {} | {} |", r.package, r.level, r.current, r.next))
    .collect::<Vec<_>>()
    .join("\n");

  format!(
    "## Semifold status\n\n\
     {} changeset(s) found\n\n\
     <details>\n\
     <summary>Planned changes to release</summary>\n\n\
     | Package | Bump Level | Current Version | Next Version |\n\
     | ------- | ---------- | --------------- | ------------ |\n\
     {}\n\
     </details>",
    changeset_count, table
  )
}
