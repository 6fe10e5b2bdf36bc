//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined prompt responses.
//!
//! # Example
//!
//! ```
//! use print_bootstrap::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("install_runtime", "yes");
//!
//! let prompt = Prompt::confirm("install_runtime", "Install Python now?", false);
//! assert!(ui.confirm(&prompt).unwrap());
//! ui.success("Python installed");
//!
//! assert_eq!(ui.prompts_shown(), ["install_runtime"]);
//! assert!(ui.has_success("installed"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;

use super::{parse_answer, OutputMode, Prompt, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    hints: Vec<String>,
    headers: Vec<String>,
    pauses: Vec<String>,
    spinners: Vec<String>,
    spinner_results: Arc<Mutex<Vec<(String, bool)>>>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            ..Default::default()
        }
    }

    /// Set a response for a prompt key.
    ///
    /// Prompts without a configured response get their default.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured hints.
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Get every pause message, in order.
    pub fn pauses(&self) -> &[String] {
        &self.pauses
    }

    /// Get all spinner messages that were started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Final spinner messages with their outcome (`true` for success).
    pub fn spinner_results(&self) -> Vec<(String, bool)> {
        self.spinner_results
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Get all prompts that were shown (by key).
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Check if a specific message was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific success was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific warning was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific error was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific hint was shown.
    pub fn has_hint(&self, msg: &str) -> bool {
        self.hints.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn hint(&mut self, msg: &str) {
        self.hints.push(msg.to_string());
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        self.prompts_shown.push(prompt.key.clone());
        Ok(self
            .prompt_responses
            .get(&prompt.key)
            .map(|r| parse_answer(r))
            .unwrap_or(prompt.default))
    }

    fn pause(&mut self, msg: &str) {
        self.pauses.push(msg.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner {
            results: Arc::clone(&self.spinner_results),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that records how it finished.
pub struct MockSpinner {
    results: Arc<Mutex<Vec<(String, bool)>>>,
}

impl MockSpinner {
    fn record(&self, msg: &str, success: bool) {
        if let Ok(mut results) = self.results.lock() {
            results.push((msg.to_string(), success));
        }
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.record(msg, true);
    }

    fn finish_error(&mut self, msg: &str) {
        self.record(msg, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_messages_by_kind() {
        let mut ui = MockUI::new();
        ui.message("info");
        ui.warning("careful");
        ui.error("broken");
        ui.hint("try again");
        ui.show_header("Header");

        assert!(ui.has_message("info"));
        assert!(ui.has_warning("careful"));
        assert!(ui.has_error("broken"));
        assert!(ui.has_hint("again"));
        assert_eq!(ui.headers(), ["Header"]);
    }

    #[test]
    fn unconfigured_prompt_uses_default() {
        let mut ui = MockUI::new();
        let prompt = Prompt::confirm("install_runtime", "Install?", false);
        assert!(!ui.confirm(&prompt).unwrap());
        assert_eq!(ui.prompts_shown(), ["install_runtime"]);
    }

    #[test]
    fn configured_prompt_response_is_used() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_runtime", "y");
        let prompt = Prompt::confirm("install_runtime", "Install?", false);
        assert!(ui.confirm(&prompt).unwrap());
    }

    #[test]
    fn records_pauses_and_spinner_outcomes() {
        let mut ui = MockUI::new();
        ui.pause("Press Enter to exit...");
        let mut spinner = ui.start_spinner("Downloading");
        spinner.finish_error("Download failed");

        assert_eq!(ui.pauses(), ["Press Enter to exit..."]);
        assert_eq!(ui.spinners(), ["Downloading"]);
        assert_eq!(
            ui.spinner_results(),
            vec![("Download failed".to_string(), false)]
        );
    }
}
