//! Execution of configured lifecycle commands (prepublish, publish, post-version)

use std::path::Path;
use std::process::{Command, Stdio};

use crate::core::config::CommandSpec;
use crate::core::error::{FoldError, FoldResult};

/// Whether a hook should run given the global dry-run flag
///
/// Individual commands can opt into running under --dry-run (e.g. lockfile
/// regeneration) via their `dry-run` field.
pub fn should_run(spec: &CommandSpec, dry_run: bool) -> bool {
  !dry_run || spec.dry_run.unwrap_or(false)
}

/// Run a configured command in `cwd`
pub fn run_spec(spec: &CommandSpec, cwd: &Path) -> FoldResult<()> {
  let args = spec.args.clone().unwrap_or_default();
  println!("   ▶ {} {}", spec.command, args.join(" "));

  let mut cmd = Command::new(&spec.command);
  cmd
    .current_dir(cwd)
    .args(&args)
    .stdout(Stdio::from(spec.stdout))
    .stderr(Stdio::from(spec.stderr));
  for (key, value) in &spec.extra_env {
    cmd.env(key, value);
  }

  let status = cmd
    .status()
    .map_err(|e| FoldError::message(format!("Failed to execute '{}': {}", spec.command, e)))?;

  if !status.success() {
    return Err(FoldError::message(format!(
      "Command '{} {}' failed with {}",
      spec.command,
      args.join(" "),
      status
    )));
  }

  Ok(())
}
