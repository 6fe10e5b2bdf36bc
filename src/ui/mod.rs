//! Operator interaction.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for scripted tests
//!
//! # Example
//!
//! ```
//! use print_bootstrap::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet, false);
//! ui.show_header("Canon Printer CLI");
//! ui.success("Python 3.11.9 found");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::{confirm_on, pause_on};
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, BootstrapTheme};

use crate::error::Result;

/// Prefix of environment variables that answer prompts in headless runs.
pub const PROMPT_ENV_PREFIX: &str = "PRINT_BOOTSTRAP_PROMPT_";

/// Trait for operator interactions.
///
/// The pipeline only talks to the operator through this trait, so every
/// stage can run headlessly against [`MockUI`] or [`NonInteractiveUI`].
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Display a remediation or follow-up hint.
    fn hint(&mut self, msg: &str);

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &Prompt) -> Result<bool>;

    /// Block until the operator acknowledges.
    fn pause(&mut self, msg: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);
}

/// A yes/no question for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Unique key, used for scripted and environment answers.
    pub key: String,
    /// The question to display.
    pub question: String,
    /// Answer used when the operator just presses enter.
    pub default: bool,
}

impl Prompt {
    pub fn confirm(key: &str, question: impl Into<String>, default: bool) -> Self {
        Self {
            key: key.to_string(),
            question: question.into(),
            default,
        }
    }

    /// Environment variable that answers this prompt headlessly.
    pub fn env_key(&self) -> String {
        format!("{}{}", PROMPT_ENV_PREFIX, self.key.to_uppercase())
    }
}

/// Interpret a scripted answer. Anything not affirmative is a "no".
pub fn parse_answer(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "y" | "yes" | "true" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_is_upper_cased_with_prefix() {
        let prompt = Prompt::confirm("install_runtime", "Install?", false);
        assert_eq!(prompt.env_key(), "PRINT_BOOTSTRAP_PROMPT_INSTALL_RUNTIME");
    }

    #[test]
    fn only_affirmative_answers_are_yes() {
        assert!(parse_answer("y"));
        assert!(parse_answer(" YES "));
        assert!(parse_answer("true"));
        assert!(parse_answer("1"));
        assert!(!parse_answer(""));
        assert!(!parse_answer("n"));
        assert!(!parse_answer("sure"));
    }
}
