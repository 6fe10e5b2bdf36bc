//! Interactive prompts.

use console::Term;
use dialoguer::Confirm;

use crate::error::{BootstrapError, Result};

use super::Prompt;

/// Convert dialoguer errors to BootstrapError.
fn map_dialoguer_err(e: dialoguer::Error) -> BootstrapError {
    BootstrapError::Io(e.into())
}

/// Ask a yes/no question on `term`.
pub fn confirm_on(prompt: &Prompt, term: &Term) -> Result<bool> {
    Confirm::new()
        .with_prompt(&prompt.question)
        .default(prompt.default)
        .interact_on(term)
        .map_err(map_dialoguer_err)
}

/// Print `msg` and wait for enter.
pub fn pause_on(msg: &str, term: &Term) -> Result<()> {
    term.write_line(msg)?;
    term.read_line()?;
    Ok(())
}
