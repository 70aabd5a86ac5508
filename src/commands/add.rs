//! Record a changeset describing pending version bumps

use clap::Args;

use crate::commands::prompt_line;
use crate::core::changeset::{BumpLevel, Changeset};
use crate::core::context::Context;
use crate::core::error::{FoldError, FoldResult};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LevelArg {
  Patch,
  Minor,
  Major,
}

impl From<LevelArg> for BumpLevel {
  fn from(value: LevelArg) -> Self {
    match value {
      LevelArg::Patch => BumpLevel::Patch,
      LevelArg::Minor => BumpLevel::Minor,
      LevelArg::Major => BumpLevel::Major,
    }
  }
}

#[derive(Debug, Args)]
pub struct AddArgs {
  /// Name for the changeset file
  pub name: Option<String>,

  /// Package to bump, optionally with a level (e.g. `pkg-a:minor`)
  #[arg(short, long = "package", value_name = "NAME[:LEVEL]")]
  pub packages: Vec<String>,

  /// Default bump level for packages given without one
  #[arg(short, long, value_enum)]
  pub level: Option<LevelArg>,

  /// Changeset tag selecting the changelog heading
  #[arg(short, long)]
  pub tag: Option<String>,

  /// One-line summary of the change
  #[arg(short, long)]
  pub summary: Option<String>,
}

fn sanitize_filename(filename: &str) -> String {
  const ILLEGAL_CHARS: [char; 8] = ['<', '>', ':', '"', '/', '\\', '|', ' '];

  filename
    .chars()
    .map(|c| if ILLEGAL_CHARS.contains(&c) { '-' } else { c.to_ascii_lowercase() })
    .collect()
}

fn parse_package_spec(spec: &str, default_level: BumpLevel) -> FoldResult<(String, BumpLevel)> {
  match spec.split_once(':') {
    Some((name, level)) => {
      let level = match level {
        "major" => BumpLevel::Major,
        "minor" => BumpLevel::Minor,
        "patch" => BumpLevel::Patch,
        other => {
          return Err(FoldError::message(format!(
            "Invalid bump level '{}' for package '{}' (expected major, minor or patch)",
            other, name
          )));
        }
      };
      Ok((name.to_string(), level))
    }
    None => Ok((spec.to_string(), default_level)),
  }
}

pub fn run(args: &AddArgs, ctx: &Context) -> FoldResult<()> {
  let (config, changes_dir) = ctx.require_config()?;

  let name = match &args.name {
    Some(name) => name.clone(),
    None => prompt_line("Name of the change", None)?,
  };
  let name = sanitize_filename(name.trim());
  if name.is_empty() {
    return Err(FoldError::message("Changeset name cannot be empty"));
  }
  if changes_dir.join(format!("{}.md", name)).exists() {
    return Err(FoldError::message(format!("Changeset '{}' already exists", name)));
  }

  let default_level = args.level.map(BumpLevel::from).unwrap_or(BumpLevel::Patch);

  let specs: Vec<String> = if args.packages.is_empty() {
    let known = config.packages.keys().cloned().collect::<Vec<_>>().join(", ");
    println!("Configured packages: {}", known);
    prompt_line("Packages to bump (comma-separated)", None)?
      .split(',')
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect()
  } else {
    args.packages.clone()
  };
  if specs.is_empty() {
    return Err(FoldError::message("At least one package must be selected"));
  }

  let tag = match &args.tag {
    Some(tag) => tag.clone(),
    None => {
      let known = config.tags.keys().cloned().collect::<Vec<_>>().join(", ");
      prompt_line(&format!("Tag ({}; empty for none)", known), Some(""))?
    }
  };
  let tag = (!tag.is_empty()).then_some(tag);

  let mut changeset = Changeset::new(name.clone());
  for spec in &specs {
    let (package, level) = parse_package_spec(spec, default_level)?;
    config.package(&package)?;
    changeset.add_entry(package, level, tag.clone());
  }

  changeset.summary = match &args.summary {
    Some(summary) => summary.clone(),
    None => loop {
      let summary = prompt_line("Summary", None)?;
      if !summary.is_empty() {
        break summary;
      }
      println!("⚠️  Summary cannot be empty");
    },
  };

  let path = changeset.write_to(changes_dir)?;
  println!("📝 Created changeset {}", path.display());

  Ok(())
}
