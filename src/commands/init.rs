//! Initialize a changes directory with configuration for the detected ecosystems

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;

use crate::adapters::{self, Ecosystem};
use crate::commands::prompt_line;
use crate::core::config::{
  self, BranchesConfig, CommandSpec, EcosystemConfig, FoldConfig, PackageEntry, RegistryCheck, StdioMode,
};
use crate::core::context::Context;
use crate::core::error::{FoldError, FoldResult};
use crate::site::SiteConfig;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum EcosystemArg {
  Cargo,
  Node,
  Python,
  Cmake,
}

impl From<EcosystemArg> for Ecosystem {
  fn from(value: EcosystemArg) -> Self {
    match value {
      EcosystemArg::Cargo => Ecosystem::Cargo,
      EcosystemArg::Node => Ecosystem::Node,
      EcosystemArg::Python => Ecosystem::Python,
      EcosystemArg::Cmake => Ecosystem::Cmake,
    }
  }
}

#[derive(Debug, Args)]
pub struct InitArgs {
  /// Changes directory to create (relative to the repository root)
  #[arg(short, long, default_value = ".changes")]
  pub target: PathBuf,

  /// Ecosystems to manage (detected from the repository when omitted)
  #[arg(short, long, value_enum)]
  pub ecosystem: Vec<EcosystemArg>,

  /// Branch that accumulates changesets
  #[arg(long)]
  pub base_branch: Option<String>,

  /// Branch the release pull request is opened from
  #[arg(long)]
  pub release_branch: Option<String>,

  /// Overwrite an existing configuration
  #[arg(short, long)]
  pub force: bool,

  /// Also write GitHub Actions release/status workflows
  #[arg(long)]
  pub ci: bool,

  /// Also write the documentation-site metadata (docs/site.json)
  #[arg(long)]
  pub docs: bool,
}

pub fn run(args: &InitArgs, ctx: &Context) -> FoldResult<()> {
  if ctx.is_initialized() && !args.force {
    println!("ℹ️  Semifold is already initialized here (use --force to overwrite)");
    return Ok(());
  }

  let root = ctx.root()?;
  let target = root.join(&args.target);

  let ecosystems: Vec<Ecosystem> = if args.ecosystem.is_empty() {
    adapters::detect_ecosystems(&root)
  } else {
    args.ecosystem.iter().map(|e| Ecosystem::from(*e)).collect()
  };
  if ecosystems.is_empty() {
    return Err(FoldError::with_help(
      format!("No supported ecosystems detected at {}", root.display()),
      "Pass --ecosystem cargo|node|python|cmake explicitly.",
    ));
  }

  let mut packages = BTreeMap::new();
  for ecosystem in &ecosystems {
    let adapter = adapters::adapter_for(*ecosystem);
    let discovered = adapter.discover(&root)?;
    println!("🔍 Found {} {} package(s)", discovered.len(), ecosystem);
    for package in discovered {
      packages.entry(package.name.clone()).or_insert(PackageEntry {
        path: package.path,
        ecosystem: *ecosystem,
        assets: Vec::new(),
      });
    }
  }

  let base = match &args.base_branch {
    Some(branch) => branch.clone(),
    None => prompt_line("Base branch", Some("main"))?,
  };
  let release = match &args.release_branch {
    Some(branch) => branch.clone(),
    None => prompt_line("Release branch", Some("release"))?,
  };

  let config = FoldConfig {
    branches: BranchesConfig {
      base: base.clone(),
      release,
    },
    tags: default_tags(),
    packages,
    ecosystem: ecosystems
      .iter()
      .map(|eco| (*eco, default_ecosystem_config(*eco)))
      .collect(),
  };

  std::fs::create_dir_all(&target)?;
  let config_path = target.join("config.toml");
  config::save_config(&config_path, &config)?;
  println!("✅ Wrote {}", config_path.display());

  if args.ci {
    let workflows = root.join(".github").join("workflows");
    std::fs::create_dir_all(&workflows)?;
    std::fs::write(workflows.join("semifold-release.yml"), release_workflow(&base))?;
    std::fs::write(workflows.join("semifold-status.yml"), status_workflow(&base))?;
    println!("✅ Wrote GitHub Actions workflows");
  }

  if args.docs {
    let site = SiteConfig::semifold();
    site.validate()?;
    let docs_dir = root.join("docs");
    std::fs::create_dir_all(&docs_dir)?;
    std::fs::write(docs_dir.join("site.json"), site.to_json()?)?;
    println!("✅ Wrote docs/site.json");
  }

  println!();
  println!("Next steps:");
  println!("  1. Review {}", config_path.display());
  println!("  2. Record a change: semifold add");
  println!("  3. Inspect pending bumps: semifold status");

  Ok(())
}

fn default_tags() -> BTreeMap<String, String> {
  BTreeMap::from_iter([
    ("chore".to_string(), "Chores".to_string()),
    ("feat".to_string(), "New Features".to_string()),
    ("fix".to_string(), "Bug Fixes".to_string()),
    ("perf".to_string(), "Performance Improvements".to_string()),
    ("refactor".to_string(), "Refactors".to_string()),
  ])
}

fn user_agent_header() -> BTreeMap<String, String> {
  BTreeMap::from_iter([(
    "User-Agent".to_string(),
    format!("Semifold {}", env!("CARGO_PKG_VERSION")),
  )])
}

fn command(command: &str, args: &[&str]) -> CommandSpec {
  CommandSpec {
    command: command.to_string(),
    args: Some(args.iter().map(|s| s.to_string()).collect()),
    extra_env: BTreeMap::new(),
    stdout: StdioMode::Inherit,
    stderr: StdioMode::Inherit,
    dry_run: None,
  }
}

fn default_ecosystem_config(ecosystem: Ecosystem) -> EcosystemConfig {
  match ecosystem {
    Ecosystem::Cargo => EcosystemConfig {
      registry_check: Some(RegistryCheck {
        url: "https://crates.io/api/v1/crates/{name}/{version}".to_string(),
        extra_headers: user_agent_header(),
      }),
      prepublish: Vec::new(),
      publish: vec![command("cargo", &["publish"])],
      post_version: vec![command("cargo", &["generate-lockfile", "--offline"])],
    },
    Ecosystem::Node => EcosystemConfig {
      registry_check: Some(RegistryCheck {
        url: "https://registry.npmjs.org/{name}/{version}".to_string(),
        extra_headers: BTreeMap::new(),
      }),
      prepublish: Vec::new(),
      publish: vec![command("npm", &["publish", "--provenance", "--access", "public"])],
      post_version: Vec::new(),
    },
    Ecosystem::Python => EcosystemConfig {
      registry_check: Some(RegistryCheck {
        url: "https://pypi.org/pypi/{name}/{version}/json".to_string(),
        extra_headers: user_agent_header(),
      }),
      prepublish: Vec::new(),
      publish: Vec::new(),
      post_version: Vec::new(),
    },
    Ecosystem::Cmake => EcosystemConfig::default(),
  }
}

fn release_workflow(base: &str) -> String {
  format!(
    r#"name: Semifold Release

on:
  push:
    branches:
      - {base}

permissions:
  contents: write
  pull-requests: write

jobs:
  release:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
        with:
          fetch-depth: 0
      - name: Install semifold
        run: cargo install semifold
      - name: Version and publish
        run: semifold ci
        env:
          GITHUB_TOKEN: ${{{{ secrets.GITHUB_TOKEN }}}}
          CARGO_REGISTRY_TOKEN: ${{{{ secrets.CARGO_REGISTRY_TOKEN }}}}
"#
  )
}

fn status_workflow(base: &str) -> String {
  format!(
    r#"name: Semifold Status

on:
  pull_request:
    branches:
      - {base}

permissions:
  pull-requests: write

jobs:
  status:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
        with:
          fetch-depth: 0
      - name: Install semifold
        run: cargo install semifold
      - name: Report planned bumps
        run: semifold status
        env:
          GITHUB_TOKEN: ${{{{ secrets.GITHUB_TOKEN }}}}
"#
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_tags_cover_conventional_kinds() {
    let tags = default_tags();
    assert_eq!(tags["feat"], "New Features");
    assert_eq!(tags["fix"], "Bug Fixes");
  }

  #[test]
  fn test_cargo_defaults() {
    let config = default_ecosystem_config(Ecosystem::Cargo);
    let check = config.registry_check.unwrap();
    assert!(check.url.contains("{name}"));
    assert!(check.extra_headers["User-Agent"].starts_with("Semifold "));
    assert_eq!(config.publish[0].command, "cargo");
  }

  #[test]
  fn test_workflows_reference_base_branch() {
    let workflow = release_workflow("trunk");
    assert!(workflow.contains("- trunk"));
    assert!(workflow.contains("semifold ci"));
    assert!(workflow.contains("${{ secrets.GITHUB_TOKEN }}"));

    let status = status_workflow("trunk");
    assert!(status.contains("pull_request"));
    assert!(status.contains("semifold status"));
  }
}
