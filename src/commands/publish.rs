//! Publish packages in dependency order, with registry pre-checks

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use clap::Args;

use crate::adapters::ResolvedPackage;
use crate::changelog;
use crate::core::config::{FoldConfig, RegistryCheck};
use crate::core::context::Context;
use crate::core::error::{FoldResult, ResultExt};
use crate::core::github;
use crate::core::graph::PackageGraph;
use crate::core::hooks;

#[derive(Debug, Args)]
pub struct PublishArgs {
  /// Target a specific package (default: all)
  #[arg(short, long)]
  pub package: Option<String>,

  /// Skip creating GitHub releases
  #[arg(long)]
  pub no_github: bool,

  /// Delay between dependent publishes (seconds), for registry propagation
  #[arg(long, default_value = "0")]
  pub delay: u64,
}

pub fn run(args: &PublishArgs, ctx: &Context) -> FoldResult<()> {
  publish_packages(ctx, args.package.as_deref(), args.no_github, args.delay)
}

pub fn publish_packages(ctx: &Context, filter: Option<&str>, no_github: bool, delay: u64) -> FoldResult<()> {
  let (config, _) = ctx.require_config()?;
  let root = ctx.root()?;

  let known: BTreeSet<String> = config.packages.keys().cloned().collect();
  let pairs: Vec<(String, Vec<String>)> = config
    .packages
    .iter()
    .map(|(name, entry)| {
      let adapter = ctx.adapter(entry);
      let deps = adapter.internal_deps(&root, &entry.path, &known).unwrap_or_else(|e| {
        tracing::warn!(package = name.as_str(), "failed to read dependencies: {}", e);
        Vec::new()
      });
      (name.clone(), deps)
    })
    .collect();

  let mut order = PackageGraph::new(&pairs).publish_order()?;
  if let Some(filter) = filter {
    config.package(filter)?;
    order.retain(|name| name == filter);
  }

  if order.is_empty() {
    println!("ℹ️  No packages to publish");
    return Ok(());
  }

  println!("📦 Publishing {} package(s)", order.len());
  println!("   Order: {}\n", order.join(" → "));

  let client = reqwest::blocking::Client::builder()
    .timeout(Duration::from_secs(30))
    .build()?;

  for (idx, name) in order.iter().enumerate() {
    let entry = config.package(name)?;
    let adapter = ctx.adapter(entry);
    let resolved = adapter
      .resolve(&root, &entry.path)
      .with_context(|| format!("Failed to read {} for '{}'", adapter.manifest_filename(), name))?;

    println!("📌 [{}/{}] {} v{}", idx + 1, order.len(), resolved.name, resolved.version);

    if resolved.private {
      println!("   ⏭  Private package, skipping");
      continue;
    }

    let eco_config = config.ecosystem_config(adapter.ecosystem())?;

    if let Some(check) = &eco_config.registry_check {
      match registry_has_version(&client, check, &resolved) {
        Ok(true) => {
          println!("   ℹ️  v{} is already on the registry, skipping", resolved.version);
          continue;
        }
        Ok(false) => {}
        Err(e) => tracing::warn!("registry pre-check failed: {}", e),
      }
    }

    let package_dir = root.join(&entry.path);
    for spec in eco_config.prepublish.iter().chain(&eco_config.publish) {
      if hooks::should_run(spec, ctx.dry_run) {
        hooks::run_spec(spec, &package_dir)?;
      } else {
        println!("   ⏭  Skipping `{}` (dry-run)", spec.command);
      }
    }

    if idx + 1 < order.len() && delay > 0 && !ctx.dry_run {
      println!("   ⏳ Waiting {}s for registry propagation...", delay);
      thread::sleep(Duration::from_secs(delay));
    }

    println!();
  }

  if !no_github && ctx.is_ci() && !ctx.dry_run {
    create_github_releases(ctx, config)?;
  }

  Ok(())
}

fn registry_has_version(
  client: &reqwest::blocking::Client,
  check: &RegistryCheck,
  package: &ResolvedPackage,
) -> FoldResult<bool> {
  let url = check.url_for(&package.name, &package.version.to_string());
  tracing::debug!(url = %url, "registry pre-check");

  let mut request = client.get(&url);
  for (key, value) in &check.extra_headers {
    request = request.header(key.as_str(), value.as_str());
  }

  let response = request.send()?;
  Ok(response.status().is_success())
}

/// Create a GitHub release per package from its latest changelog section
fn create_github_releases(ctx: &Context, config: &FoldConfig) -> FoldResult<()> {
  let root = ctx.root()?;

  for (name, entry) in &config.packages {
    let changelog_path = root.join(&entry.path).join("CHANGELOG.md");
    let Some(latest) = changelog::read_latest(&changelog_path)? else {
      println!("⚠️  No changelog for {}, skipping GitHub release", name);
      continue;
    };

    let tag = format!("{}-{}", name, latest.version);
    if github::release_exists(&root, &tag) {
      println!("ℹ️  Release {} already exists", tag);
      continue;
    }

    github::create_release(&root, &tag, &tag, &latest.body, &entry.assets)?;
    println!("🏷  Created GitHub release {}", tag);
  }

  Ok(())
}
