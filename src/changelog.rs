//! Changelog assembly from changesets
//!
//! Each released version gets a `## <version>` section whose bullet lines
//! come from changeset summaries, grouped under the headings configured for
//! their tags. When the changeset's introducing commit can be found, the
//! line links it; a `(#N)` pull request reference is recovered from the
//! commit message (squash merges put it there).

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::core::changeset::Changeset;
use crate::core::config::FoldConfig;
use crate::core::context::RepoInfo;
use crate::core::error::FoldResult;
use crate::core::vcs::CommitInfo;
use crate::core::vcs::Vcs;
use crate::core::vcs::git::GitBackend;

/// The most recent release section of a CHANGELOG.md
#[derive(Debug, Clone)]
pub struct LatestEntry {
  pub version: String,
  pub body: String,
}

/// Extract a `(#N)` pull request reference from a commit message
pub fn pr_number_from_message(message: &str) -> Option<u64> {
  let re = Regex::new(r"\(#(\d+)\)").ok()?;
  re.captures(message).and_then(|caps| caps[1].parse().ok())
}

fn format_line(summary: &str, attribution: Option<(&CommitInfo, &RepoInfo)>) -> String {
  let mut line = String::from("- ");
  if let Some((commit, repo)) = attribution {
    line.push_str(&format!(
      "[`{}`]({}): ",
      commit.short_sha(),
      repo.commit_url(&commit.sha)
    ));
  }
  line.push_str(summary);
  if let Some((commit, _)) = attribution
    && let Some(pr) = pr_number_from_message(&commit.message)
  {
    line.push_str(&format!(" (#{})", pr));
  }
  line
}

/// Build the release section body for one package from pending changesets
pub fn package_section(
  config: &FoldConfig,
  repo_info: Option<&RepoInfo>,
  git: Option<&GitBackend>,
  changesets: &[Changeset],
  package: &str,
) -> String {
  let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

  for changeset in changesets {
    let Some(entry) = changeset.entries.iter().find(|e| e.package == package) else {
      continue;
    };

    let commit = match (git, &changeset.path) {
      (Some(git), Some(path)) => git.first_commit_for_path(path).ok().flatten(),
      _ => None,
    };
    let attribution = commit.as_ref().zip(repo_info);

    let heading = config.tag_heading(entry.tag.as_deref()).to_string();
    groups
      .entry(heading)
      .or_default()
      .push(format_line(&changeset.summary, attribution));
  }

  groups
    .iter()
    .map(|(heading, lines)| format!("### {}\n\n{}", heading, lines.join("\n")))
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Prepend a release section beneath the changelog title
pub fn prepend_section(changelog_path: &Path, version: &str, body: &str) -> FoldResult<()> {
  let date = chrono::Utc::now().format("%Y-%m-%d");
  let new_section = format!("## {} - {}\n\n{}\n", version, date, body.trim());

  let content = if changelog_path.exists() {
    let existing = std::fs::read_to_string(changelog_path)?;
    if let Some(idx) = existing.find("\n## ") {
      let (head, tail) = existing.split_at(idx + 1);
      format!("{}{}\n{}", head, new_section, tail)
    } else {
      format!("{}\n{}", existing.trim_end(), new_section)
    }
  } else {
    format!("# Changelog\n\n{}", new_section)
  };

  std::fs::write(changelog_path, content)?;
  Ok(())
}

/// Read the most recent `## <version>` section
pub fn read_latest(changelog_path: &Path) -> FoldResult<Option<LatestEntry>> {
  if !changelog_path.exists() {
    return Ok(None);
  }

  let content = std::fs::read_to_string(changelog_path)?;
  let mut version: Option<String> = None;
  let mut body_lines = Vec::new();

  for line in content.lines() {
    if let Some(rest) = line.strip_prefix("## ") {
      if version.is_some() {
        break;
      }
      version = Some(rest.split_whitespace().next().unwrap_or("").to_string());
      continue;
    }
    if version.is_some() {
      body_lines.push(line);
    }
  }

  Ok(version.map(|version| LatestEntry {
    version,
    body: body_lines.join("\n").trim().to_string(),
  }))
}
