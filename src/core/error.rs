//! Error types for semifold with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for semifold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Validation failure (changesets, workspace state, CI preconditions)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for semifold
#[derive(Debug)]
pub enum FoldError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Validation errors (changesets, CI environment, workspace state)
  Validation(ValidationError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl FoldError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    FoldError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    FoldError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      FoldError::Message { message, context, help } => FoldError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      FoldError::Config(_) => ExitCode::User,
      FoldError::Git(_) => ExitCode::System,
      FoldError::Validation(_) => ExitCode::Validation,
      FoldError::Io(_) => ExitCode::System,
      FoldError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      FoldError::Config(e) => e.help_message(),
      FoldError::Git(e) => e.help_message(),
      FoldError::Validation(e) => e.help_message(),
      FoldError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for FoldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FoldError::Config(e) => write!(f, "{}", e),
      FoldError::Git(e) => write!(f, "{}", e),
      FoldError::Validation(e) => write!(f, "{}", e),
      FoldError::Io(e) => write!(f, "I/O error: {}", e),
      FoldError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for FoldError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      FoldError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for FoldError {
  fn from(err: io::Error) -> Self {
    FoldError::Io(err)
  }
}

impl From<String> for FoldError {
  fn from(msg: String) -> Self {
    FoldError::message(msg)
  }
}

impl From<&str> for FoldError {
  fn from(msg: &str) -> Self {
    FoldError::message(msg)
  }
}

impl From<toml_edit::TomlError> for FoldError {
  fn from(err: toml_edit::TomlError) -> Self {
    FoldError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for FoldError {
  fn from(err: toml_edit::de::Error) -> Self {
    FoldError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for FoldError {
  fn from(err: toml_edit::ser::Error) -> Self {
    FoldError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for FoldError {
  fn from(err: serde_json::Error) -> Self {
    FoldError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for FoldError {
  fn from(err: semver::Error) -> Self {
    FoldError::message(format!("Invalid semver version: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for FoldError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    FoldError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::env::VarError> for FoldError {
  fn from(err: std::env::VarError) -> Self {
    FoldError::message(format!("Environment variable error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for FoldError {
  fn from(err: std::path::StripPrefixError) -> Self {
    FoldError::message(format!("Path strip prefix error: {}", err))
  }
}

impl From<glob::PatternError> for FoldError {
  fn from(err: glob::PatternError) -> Self {
    FoldError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for FoldError {
  fn from(err: glob::GlobError) -> Self {
    FoldError::message(format!("Glob traversal error: {}", err))
  }
}

impl From<regex::Error> for FoldError {
  fn from(err: regex::Error) -> Self {
    FoldError::message(format!("Invalid regex: {}", err))
  }
}

impl From<reqwest::Error> for FoldError {
  fn from(err: reqwest::Error) -> Self {
    FoldError::message(format!("HTTP request error: {}", err))
  }
}

impl From<gix::open::Error> for FoldError {
  fn from(err: gix::open::Error) -> Self {
    FoldError::message(format!("Git repository error: {}", err))
  }
}

impl From<gix::reference::find::existing::Error> for FoldError {
  fn from(err: gix::reference::find::existing::Error) -> Self {
    FoldError::message(format!("Git reference error: {}", err))
  }
}

impl From<gix::object::find::existing::Error> for FoldError {
  fn from(err: gix::object::find::existing::Error) -> Self {
    FoldError::message(format!("Git object error: {}", err))
  }
}

impl From<gix::object::try_into::Error> for FoldError {
  fn from(err: gix::object::try_into::Error) -> Self {
    FoldError::message(format!("Git object conversion error: {}", err))
  }
}

impl From<gix::object::commit::Error> for FoldError {
  fn from(err: gix::object::commit::Error) -> Self {
    FoldError::message(format!("Git commit error: {}", err))
  }
}

impl From<gix::head::peel::to_commit::Error> for FoldError {
  fn from(err: gix::head::peel::to_commit::Error) -> Self {
    FoldError::message(format!("Git HEAD peel error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// No changes directory / config file found
  NotFound { searched_from: PathBuf },

  /// Config file exists but could not be parsed
  Invalid { path: PathBuf, reason: String },

  /// Package not found in configuration
  PackageNotFound { name: String },

  /// No configuration block for an ecosystem
  EcosystemNotConfigured { ecosystem: String },

  /// Package manifest missing or malformed
  ManifestInvalid { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `semifold init` to set up a changes directory.".to_string()),
      ConfigError::PackageNotFound { name } => Some(format!(
        "Packages are declared under [packages] in the changes config. Did you forget to add '{}'?",
        name
      )),
      ConfigError::EcosystemNotConfigured { ecosystem } => Some(format!(
        "Add an [ecosystem.{}] section to the changes config, or re-run `semifold init`.",
        ecosystem
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { searched_from } => {
        write!(
          f,
          "No semifold configuration found.\nSearched for .changes/ or .changesets/ upward from {}",
          searched_from.display()
        )
      }
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid config at {}: {}", path.display(), reason)
      }
      ConfigError::PackageNotFound { name } => {
        write!(f, "Package '{}' not found in configuration", name)
      }
      ConfigError::EcosystemNotConfigured { ecosystem } => {
        write!(f, "No configuration for ecosystem '{}'", ecosystem)
      }
      ConfigError::ManifestInvalid { path, reason } => {
        write!(f, "Invalid manifest at {}: {}", path.display(), reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed { branch: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("permission denied") || reason.contains("403") {
          Some("Check that the workflow token has `contents: write` permission.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { branch, reason } => {
        write!(f, "Push of branch '{}' failed: {}", branch, reason)
      }
    }
  }
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Changeset file could not be parsed
  Changeset { path: PathBuf, reason: String },

  /// Command requires a CI environment
  NotCi { command: String },

  /// Workspace state prevents the operation
  WorkspaceInvalid { reason: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::Changeset { .. } => Some(
        "Changesets are markdown files with a `package: level[:tag]` front matter. Recreate with `semifold add`."
          .to_string(),
      ),
      ValidationError::NotCi { command } => Some(format!(
        "`semifold {}` is meant to run from a GitHub Actions workflow. See `semifold init --ci`.",
        command
      )),
      ValidationError::WorkspaceInvalid { .. } => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::Changeset { path, reason } => {
        write!(f, "Invalid changeset {}: {}", path.display(), reason)
      }
      ValidationError::NotCi { command } => {
        write!(f, "`semifold {}` requires a CI environment", command)
      }
      ValidationError::WorkspaceInvalid { reason } => {
        write!(f, "Workspace validation failed: {}", reason)
      }
    }
  }
}

/// Result type alias for semifold
pub type FoldResult<T> = Result<T, FoldError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> FoldResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> FoldResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<FoldError>,
{
  fn context(self, ctx: impl Into<String>) -> FoldResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> FoldResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &FoldError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for FoldError {
  fn from(err: anyhow::Error) -> Self {
    FoldError::message(err.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes() {
    assert_eq!(FoldError::message("boom").exit_code(), ExitCode::User);
    assert_eq!(
      FoldError::Git(GitError::PushFailed {
        branch: "release".into(),
        reason: "403".into(),
      })
      .exit_code(),
      ExitCode::System
    );
    assert_eq!(
      FoldError::Validation(ValidationError::NotCi { command: "ci".into() }).exit_code(),
      ExitCode::Validation
    );
  }

  #[test]
  fn test_message_context() {
    let err = FoldError::message("failed").context("while doing a thing");
    let rendered = err.to_string();
    assert!(rendered.contains("failed"));
    assert!(rendered.contains("while doing a thing"));
  }

  #[test]
  fn test_help_messages() {
    let err = FoldError::Config(ConfigError::EcosystemNotConfigured {
      ecosystem: "cargo".into(),
    });
    let help = err.help_message().unwrap();
    assert!(help.contains("[ecosystem.cargo]"));

    assert!(FoldError::message("plain").help_message().is_none());
  }
}
