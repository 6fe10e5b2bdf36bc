//! Visual theme and styling.

use console::Style;

/// Styles used for operator-facing output.
#[derive(Debug, Clone)]
pub struct BootstrapTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (yellow).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for remediation hints (cyan).
    pub hint: Style,
}

impl Default for BootstrapTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            hint: Style::new().cyan(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            hint: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in yellow).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a remediation hint.
    pub fn format_hint(&self, msg: &str) -> String {
        format!("  {}", self.hint.apply_to(format!("→ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        let rule = "=".repeat(title.chars().count().max(40));
        format!(
            "{}\n{}\n{}",
            self.dim.apply_to(&rule),
            self.header.apply_to(title),
            self.dim.apply_to(&rule)
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check if stdout is a TTY
    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_success() {
        let msg = BootstrapTheme::plain().format_success("Complete");
        assert_eq!(msg, "✓ Complete");
    }

    #[test]
    fn theme_formats_warning() {
        let msg = BootstrapTheme::plain().format_warning("Caution");
        assert_eq!(msg, "⚠ Caution");
    }

    #[test]
    fn theme_formats_error() {
        let msg = BootstrapTheme::plain().format_error("Failed");
        assert_eq!(msg, "✗ Failed");
    }

    #[test]
    fn theme_formats_hint() {
        let msg = BootstrapTheme::plain().format_hint("Open a new terminal");
        assert_eq!(msg, "  → Open a new terminal");
    }

    #[test]
    fn header_is_framed_by_rules() {
        let msg = BootstrapTheme::plain().format_header("Canon Printer CLI");
        let lines: Vec<_> = msg.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Canon Printer CLI");
        assert_eq!(lines[0], "=".repeat(40));
    }

    #[test]
    fn default_impl_matches_new() {
        let default = BootstrapTheme::default();
        let new = BootstrapTheme::new();
        assert_eq!(default.format_success("test"), new.format_success("test"));
    }
}
