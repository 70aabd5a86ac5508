use std::path::{Path, PathBuf};
use std::process::Command;

use gix::Repository;

use super::{CommitInfo, Vcs};
use crate::core::error::{FoldError, FoldResult, GitError};

/// Git implementation using gix (gitoxide) for reads and system git elsewhere
pub struct GitBackend {
  repo: Repository,
  root: PathBuf,
}

impl Vcs for GitBackend {
  fn open(path: &Path) -> FoldResult<Self> {
    let repo = gix::open(path)?;
    let root = repo
      .workdir()
      .ok_or_else(|| FoldError::message("Repository has no working directory"))?
      .to_path_buf();

    Ok(Self { repo, root })
  }

  fn root(&self) -> &Path {
    &self.root
  }

  fn head_commit(&self) -> FoldResult<String> {
    let mut head = self.repo.head().map_err(|e| FoldError::message(format!("Failed to get HEAD: {}", e)))?;
    let commit = head.peel_to_commit()?;
    Ok(commit.id().to_string())
  }

  fn current_branch(&self) -> FoldResult<String> {
    let stdout = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(stdout.trim().to_string())
  }

  fn is_clean(&self) -> FoldResult<bool> {
    let stdout = self.run(&["status", "--porcelain"])?;
    Ok(stdout.trim().is_empty())
  }

  fn first_commit_for_path(&self, path: &Path) -> FoldResult<Option<CommitInfo>> {
    let relative = if path.is_absolute() {
      path.strip_prefix(&self.root).unwrap_or(path)
    } else {
      path
    };

    let path_str = relative.to_string_lossy();
    let stdout = self.run(&["log", "--reverse", "--format=%H", "--", &path_str])?;

    match stdout.lines().next() {
      Some(sha) if !sha.trim().is_empty() => Ok(Some(self.commit_info(sha.trim())?)),
      _ => Ok(None),
    }
  }
}

impl GitBackend {
  /// Discover the repository containing `start`
  pub fn discover(start: &Path) -> FoldResult<Self> {
    let repo = gix::discover(start).map_err(|_| {
      FoldError::Git(GitError::RepoNotFound {
        path: start.to_path_buf(),
      })
    })?;
    let root = repo
      .workdir()
      .ok_or_else(|| FoldError::message("Repository has no working directory"))?
      .to_path_buf();

    Ok(Self { repo, root })
  }

  /// Metadata for a single commit
  pub fn commit_info(&self, sha: &str) -> FoldResult<CommitInfo> {
    let commit_id = gix::ObjectId::from_hex(sha.as_bytes())
      .map_err(|e| FoldError::message(format!("Invalid commit SHA '{}': {}", sha, e)))?;
    let commit_obj = self.repo.find_object(commit_id)?.try_into_commit()?;
    let commit = commit_obj
      .decode()
      .map_err(|e| FoldError::message(format!("Failed to decode commit {}: {}", sha, e)))?;

    Ok(CommitInfo {
      sha: sha.to_string(),
      message: commit.message.to_string(),
    })
  }

  /// URL of a configured remote, if any
  pub fn remote_url(&self, name: &str) -> Option<String> {
    let output = Command::new("git")
      .current_dir(&self.root)
      .args(["remote", "get-url", name])
      .output()
      .ok()?;

    if !output.status.success() {
      return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create (or reset) a branch at HEAD and check it out
  pub fn checkout_branch_at_head(&self, branch: &str) -> FoldResult<()> {
    self.run(&["checkout", "-B", branch])?;
    Ok(())
  }

  /// Stage the whole working tree
  pub fn stage_all(&self) -> FoldResult<()> {
    self.run(&["add", "-A"])?;
    Ok(())
  }

  /// Commit staged changes with an explicit identity
  pub fn commit_with_identity(&self, message: &str, name: &str, email: &str) -> FoldResult<()> {
    self.run(&[
      "-c",
      &format!("user.name={}", name),
      "-c",
      &format!("user.email={}", email),
      "commit",
      "-m",
      message,
    ])?;
    Ok(())
  }

  /// Force-push a branch to a remote
  pub fn force_push(&self, remote: &str, branch: &str) -> FoldResult<()> {
    let refspec = format!("+refs/heads/{branch}:refs/heads/{branch}");
    self.run(&["push", remote, &refspec]).map_err(|e| {
      FoldError::Git(GitError::PushFailed {
        branch: branch.to_string(),
        reason: e.to_string(),
      })
    })?;
    Ok(())
  }

  /// Run a git command in the repository root, returning stdout
  fn run(&self, args: &[&str]) -> FoldResult<String> {
    tracing::debug!(?args, "running git");
    let output = Command::new("git")
      .current_dir(&self.root)
      .args(args)
      .output()
      .map_err(|e| FoldError::message(format!("Failed to execute git: {}", e)))?;

    if !output.status.success() {
      return Err(FoldError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }
}
