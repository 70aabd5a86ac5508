//! Version control abstraction
//!
//! Reads go through gix; history queries and all mutating operations shell
//! out to system git, which keeps authentication and hook behavior identical
//! to what the user has configured.

pub mod git;

use std::path::Path;

use crate::core::error::FoldResult;

/// Minimal commit metadata used for changelog attribution
#[derive(Debug, Clone)]
pub struct CommitInfo {
  pub sha: String,
  pub message: String,
}

impl CommitInfo {
  /// Abbreviated SHA for display and links
  pub fn short_sha(&self) -> &str {
    &self.sha[..self.sha.len().min(7)]
  }
}

/// Version control operations semifold needs
pub trait Vcs {
  fn open(path: &Path) -> FoldResult<Self>
  where
    Self: Sized;

  /// Working directory root of the repository
  fn root(&self) -> &Path;

  /// SHA of the current HEAD commit
  fn head_commit(&self) -> FoldResult<String>;

  /// Name of the currently checked out branch
  fn current_branch(&self) -> FoldResult<String>;

  /// Whether the working tree has no pending changes
  fn is_clean(&self) -> FoldResult<bool>;

  /// The earliest commit that touched `path`, if any
  fn first_commit_for_path(&self, path: &Path) -> FoldResult<Option<CommitInfo>>;
}
