pub mod add;
pub mod ci;
pub mod init;
pub mod publish;
pub mod status;
pub mod version;

use std::io::Write;

use crate::core::error::{FoldError, FoldResult};

/// Prompt for a line on stdin
///
/// Fails fast on EOF (unless a default exists) so non-interactive runs get a
/// clear error instead of hanging.
pub(crate) fn prompt_line(question: &str, default: Option<&str>) -> FoldResult<String> {
  match default {
    Some(default) => print!("{} [{}]: ", question, default),
    None => print!("{}: ", question),
  }
  std::io::stdout().flush()?;

  let mut input = String::new();
  let read = std::io::stdin().read_line(&mut input)?;
  if read == 0 {
    if let Some(default) = default {
      return Ok(default.to_string());
    }
    return Err(FoldError::with_help(
      format!("No input available for: {}", question),
      "Provide the value via a flag when running non-interactively.",
    ));
  }

  let input = input.trim();
  if input.is_empty()
    && let Some(default) = default
  {
    return Ok(default.to_string());
  }
  Ok(input.to_string())
}
