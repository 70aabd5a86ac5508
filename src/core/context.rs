//! Execution context shared by all commands
//!
//! Discovers the changes directory, loads the configuration, and locates the
//! enclosing git repository. Discovery is forgiving: commands that need a
//! piece of context ask for it and get a helpful error when it is missing.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::adapters::{self, PackageAdapter};
use crate::core::config::{self, FoldConfig, PackageEntry};
use crate::core::error::{ConfigError, FoldError, FoldResult};
use crate::core::vcs::Vcs;
use crate::core::vcs::git::GitBackend;

/// Owner and repository name on the forge
#[derive(Debug, Clone)]
pub struct RepoInfo {
  pub owner: String,
  pub repo: String,
}

impl RepoInfo {
  pub fn commit_url(&self, sha: &str) -> String {
    format!("https://github.com/{}/{}/commit/{}", self.owner, self.repo, sha)
  }
}

pub struct Context {
  pub changes_dir: Option<PathBuf>,
  pub config_path: Option<PathBuf>,
  pub config: Option<FoldConfig>,
  pub repo_root: Option<PathBuf>,
  pub repo_info: Option<RepoInfo>,
  pub dry_run: bool,
}

impl Context {
  /// Discover context from the current directory
  pub fn discover(dry_run: bool) -> FoldResult<Self> {
    let cwd = std::env::current_dir()?;

    let changes_dir = config::find_changes_dir(&cwd);
    let config_path = changes_dir.as_deref().and_then(|dir| config::config_path_in(dir).ok());
    let config = match &config_path {
      Some(path) => Some(config::load_config(path)?),
      None => None,
    };

    let git = GitBackend::discover(&cwd).ok();
    let repo_root = git.as_ref().map(|g| g.root().to_path_buf());
    let repo_info = repo_info_from_env().or_else(|| {
      git
        .as_ref()
        .and_then(|g| g.remote_url("origin"))
        .and_then(|url| parse_github_url(&url))
    });

    tracing::debug!(
      changes_dir = ?changes_dir,
      repo_root = ?repo_root,
      has_config = config.is_some(),
      "discovered context"
    );

    Ok(Self {
      changes_dir,
      config_path,
      config,
      repo_root,
      repo_info,
      dry_run,
    })
  }

  pub fn is_initialized(&self) -> bool {
    self.config.is_some() && self.changes_dir.is_some()
  }

  /// Running under GitHub Actions
  pub fn is_ci(&self) -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok()
  }

  /// The repository root, falling back to the current directory
  pub fn root(&self) -> FoldResult<PathBuf> {
    match &self.repo_root {
      Some(root) => Ok(root.clone()),
      None => Ok(std::env::current_dir()?),
    }
  }

  /// Config and changes directory, or a helpful "not initialized" error
  pub fn require_config(&self) -> FoldResult<(&FoldConfig, &Path)> {
    match (&self.config, &self.changes_dir) {
      (Some(config), Some(dir)) => Ok((config, dir)),
      _ => Err(FoldError::Config(ConfigError::NotFound {
        searched_from: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
      })),
    }
  }

  /// Adapter for a configured package
  pub fn adapter(&self, entry: &PackageEntry) -> Box<dyn PackageAdapter> {
    adapters::adapter_for(entry.ecosystem)
  }

  /// Open the enclosing git repository
  pub fn git(&self) -> FoldResult<GitBackend> {
    let root = self.root()?;
    GitBackend::open(&root)
  }
}

fn repo_info_from_env() -> Option<RepoInfo> {
  std::env::var("GITHUB_REPOSITORY").ok().and_then(|value| {
    value.split_once('/').map(|(owner, repo)| RepoInfo {
      owner: owner.to_string(),
      repo: repo.to_string(),
    })
  })
}

/// Extract owner/repo from an HTTPS or SSH GitHub remote URL
pub fn parse_github_url(url: &str) -> Option<RepoInfo> {
  let re = Regex::new(r"github\.com[:/]([^/]+)/([^/]+?)(?:\.git)?/?$").ok()?;
  let caps = re.captures(url)?;
  Some(RepoInfo {
    owner: caps[1].to_string(),
    repo: caps[2].to_string(),
  })
}
