//! Changeset files: intended version bumps recorded as markdown
//!
//! A changeset is a markdown file whose YAML front matter maps package names
//! to bump marks, followed by a human-written summary:
//!
//! ```text
//! ---
//! pkg-a: minor:feat
//! pkg-b: patch
//! ---
//!
//! Teach the frobnicator to self-calibrate.
//! ```
//!
//! A mark is `level` or `level:tag`; the tag selects the changelog heading.

use std::fmt;
use std::path::{Path, PathBuf};

use saphyr::{LoadableYamlNode, Yaml};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::error::{FoldError, FoldResult, ValidationError};

/// Version bump level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
  Major,
  Minor,
  Patch,
  None,
}

impl BumpLevel {
  /// Apply the bump to a version, zeroing lower components
  pub fn apply(self, version: &Version) -> Version {
    if self == BumpLevel::None {
      return version.clone();
    }

    let mut next = version.clone();
    next.pre = semver::Prerelease::EMPTY;
    next.build = semver::BuildMetadata::EMPTY;
    match self {
      BumpLevel::Major => {
        next.major += 1;
        next.minor = 0;
        next.patch = 0;
      }
      BumpLevel::Minor => {
        next.minor += 1;
        next.patch = 0;
      }
      BumpLevel::Patch => {
        next.patch += 1;
      }
      BumpLevel::None => unreachable!(),
    }
    next
  }

  /// Combine two levels (returns the larger bump)
  pub fn combine(self, other: Self) -> Self {
    match (self, other) {
      (BumpLevel::Major, _) | (_, BumpLevel::Major) => BumpLevel::Major,
      (BumpLevel::Minor, _) | (_, BumpLevel::Minor) => BumpLevel::Minor,
      (BumpLevel::Patch, _) | (_, BumpLevel::Patch) => BumpLevel::Patch,
      _ => BumpLevel::None,
    }
  }

  fn parse(s: &str) -> Option<Self> {
    match s {
      "major" => Some(BumpLevel::Major),
      "minor" => Some(BumpLevel::Minor),
      "patch" => Some(BumpLevel::Patch),
      _ => None,
    }
  }
}

impl fmt::Display for BumpLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BumpLevel::Major => write!(f, "major"),
      BumpLevel::Minor => write!(f, "minor"),
      BumpLevel::Patch => write!(f, "patch"),
      BumpLevel::None => write!(f, "none"),
    }
  }
}

/// One package's entry in a changeset
#[derive(Debug, Clone)]
pub struct PackageBump {
  pub package: String,
  pub level: BumpLevel,
  pub tag: Option<String>,
}

/// A parsed changeset file
#[derive(Debug, Clone)]
pub struct Changeset {
  /// File stem of the changeset
  pub name: String,
  pub entries: Vec<PackageBump>,
  pub summary: String,
  /// Where the changeset was loaded from, if it exists on disk
  pub path: Option<PathBuf>,
}

impl Changeset {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      entries: Vec::new(),
      summary: String::new(),
      path: None,
    }
  }

  pub fn add_entry(&mut self, package: impl Into<String>, level: BumpLevel, tag: Option<String>) {
    self.entries.push(PackageBump {
      package: package.into(),
      level,
      tag,
    });
  }

  pub fn file_name(&self) -> String {
    format!("{}.md", self.name)
  }

  /// Parse changeset content; errors carry a reason only
  fn parse(content: &str) -> Result<(Vec<PackageBump>, String), String> {
    let rest = content
      .strip_prefix("---")
      .ok_or_else(|| "missing front matter fence".to_string())?;
    let close = rest
      .find("\n---")
      .ok_or_else(|| "missing closing front matter fence".to_string())?;
    let front = &rest[..close];
    let summary = rest[close + 4..].trim().to_string();

    let docs = Yaml::load_from_str(front).map_err(|e| format!("invalid front matter: {}", e))?;
    let mapping = docs
      .first()
      .and_then(|doc| doc.as_mapping())
      .ok_or_else(|| "front matter is not a mapping".to_string())?;

    let mut entries = Vec::new();
    for (key, value) in mapping.iter() {
      let package = key
        .as_str()
        .ok_or_else(|| format!("invalid package key: {:?}", key))?
        .to_string();
      let mark = value
        .as_str()
        .ok_or_else(|| format!("invalid bump mark for '{}'", package))?;

      let (level_str, tag) = match mark.split_once(':') {
        Some((level, tag)) => (level, Some(tag.to_string())),
        None => (mark, None),
      };
      let level = BumpLevel::parse(level_str).ok_or_else(|| format!("invalid bump level '{}'", level_str))?;
      entries.push(PackageBump { package, level, tag });
    }

    if entries.is_empty() {
      return Err("changeset names no packages".to_string());
    }

    Ok((entries, summary))
  }

  pub fn from_file(path: &Path) -> FoldResult<Self> {
    let content = std::fs::read_to_string(path)?;
    let (entries, summary) = Self::parse(&content).map_err(|reason| {
      FoldError::Validation(ValidationError::Changeset {
        path: path.to_path_buf(),
        reason,
      })
    })?;

    let name = path
      .file_stem()
      .map(|stem| stem.to_string_lossy().to_string())
      .ok_or_else(|| {
        FoldError::Validation(ValidationError::Changeset {
          path: path.to_path_buf(),
          reason: "changeset file has no stem".to_string(),
        })
      })?;

    Ok(Self {
      name,
      entries,
      summary,
      path: Some(path.to_path_buf()),
    })
  }

  /// Serialize back to the on-disk format
  pub fn render(&self) -> String {
    let mut out = String::from("---\n");
    for entry in &self.entries {
      match entry.tag.as_deref() {
        Some(tag) if !tag.is_empty() => {
          out.push_str(&format!("{}: {}:{}\n", entry.package, entry.level, tag));
        }
        _ => out.push_str(&format!("{}: {}\n", entry.package, entry.level)),
      }
    }
    out.push_str("---\n\n");
    out.push_str(self.summary.trim());
    out.push('\n');
    out
  }

  /// Write the changeset into a changes directory
  pub fn write_to(&self, changes_dir: &Path) -> FoldResult<PathBuf> {
    let path = changes_dir.join(self.file_name());
    std::fs::write(&path, self.render())?;
    tracing::debug!(path = %path.display(), "wrote changeset");
    Ok(path)
  }
}

/// Load every changeset (`*.md`) in a changes directory, sorted by name
pub fn load_changesets(changes_dir: &Path) -> FoldResult<Vec<Changeset>> {
  let mut changesets = Vec::new();
  for entry in std::fs::read_dir(changes_dir)? {
    let path = entry?.path();
    if path.is_file() && path.extension() == Some("md".as_ref()) {
      changesets.push(Changeset::from_file(&path)?);
    }
  }
  changesets.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(changesets)
}

/// The pending bump for a package across all changesets
pub fn pending_level(changesets: &[Changeset], package: &str) -> BumpLevel {
  changesets
    .iter()
    .flat_map(|cs| cs.entries.iter())
    .filter(|entry| entry.package == package)
    .fold(BumpLevel::None, |acc, entry| acc.combine(entry.level))
}
