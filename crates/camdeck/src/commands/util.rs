//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::error::CliError;

/// Ask for confirmation before a destructive operation.
///
/// Returns `Ok(false)` when the user declines — the caller must then do
/// nothing, including not issuing the request. `--yes` skips the prompt;
/// a non-interactive stdin without `--yes` is an error rather than a
/// silent destructive default.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }

    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: prompt.to_owned(),
        });
    }

    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e.to_string())))?;
    Ok(confirmed)
}

/// Print a mutation confirmation to stderr, preferring the backend's own
/// message. Suppressed by `--quiet`.
pub fn mutation_note(message: Option<&str>, fallback: &str, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!("{}", message.unwrap_or(fallback));
}
