//! Apply pending version bumps, write changelogs, and consume changesets

use std::collections::{BTreeMap, BTreeSet};

use clap::Args;
use semver::Version;

use crate::changelog;
use crate::core::changeset::{self, BumpLevel};
use crate::core::context::Context;
use crate::core::error::{FoldResult, ResultExt};
use crate::core::hooks;
use crate::core::vcs::Vcs;
use crate::core::vcs::git::GitBackend;

#[derive(Debug, Args)]
pub struct VersionArgs {}

/// A bump that was applied to a package
pub struct AppliedBump {
  pub version: Version,
  pub changelog: String,
}

/// Apply every pending bump; honors the global --dry-run flag
///
/// Returns the applied versions with their changelog sections, keyed by
/// package name (empty under --dry-run).
pub fn apply_versions(ctx: &Context) -> FoldResult<BTreeMap<String, AppliedBump>> {
  let (config, changes_dir) = ctx.require_config()?;

  let changesets = changeset::load_changesets(changes_dir)?;
  if changesets.is_empty() {
    println!("ℹ️  No changesets found, nothing to version");
    return Ok(BTreeMap::new());
  }

  let root = ctx.root()?;
  let git = GitBackend::open(&root).ok();

  let mut applied = BTreeMap::new();
  let mut touched = BTreeSet::new();

  for (name, entry) in &config.packages {
    let level = changeset::pending_level(&changesets, name);
    if level == BumpLevel::None {
      continue;
    }

    let adapter = ctx.adapter(entry);
    let resolved = adapter
      .resolve(&root, &entry.path)
      .with_context(|| format!("Failed to read {} for '{}'", adapter.manifest_filename(), name))?;
    let next = level.apply(&resolved.version);

    println!("📦 {} {} → {} ({})", name, resolved.version, next, level);
    touched.insert(entry.ecosystem);

    if ctx.dry_run {
      continue;
    }

    let section = changelog::package_section(config, ctx.repo_info.as_ref(), git.as_ref(), &changesets, name);
    adapter.set_version(&root, &entry.path, &next)?;
    changelog::prepend_section(&root.join(&entry.path).join("CHANGELOG.md"), &next.to_string(), &section)?;

    applied.insert(
      name.clone(),
      AppliedBump {
        version: next,
        changelog: section,
      },
    );
  }

  if touched.is_empty() {
    println!("ℹ️  Changesets name no configured packages, nothing to do");
    return Ok(applied);
  }

  if ctx.dry_run {
    println!("\n💡 This was a dry-run. Re-run without --dry-run to apply.");
    return Ok(applied);
  }

  for changeset in &changesets {
    if let Some(path) = &changeset.path {
      std::fs::remove_file(path)?;
      tracing::debug!(path = %path.display(), "removed consumed changeset");
    }
  }

  for ecosystem in touched {
    let Ok(eco_config) = config.ecosystem_config(ecosystem) else {
      continue;
    };
    for spec in &eco_config.post_version {
      if hooks::should_run(spec, ctx.dry_run) {
        hooks::run_spec(spec, &root)?;
      }
    }
  }

  println!("\n✅ Applied {} version bump(s)", applied.len());
  Ok(applied)
}

pub fn run(_args: &VersionArgs, ctx: &Context) -> FoldResult<()> {
  apply_versions(ctx)?;
  Ok(())
}
