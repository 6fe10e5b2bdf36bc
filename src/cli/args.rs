//! CLI argument definitions.
//!
//! The bootstrapper has no subcommands of its own. Everything from the
//! first positional token on belongs to the downstream application.

use clap::Parser;
use std::path::PathBuf;

use crate::ui::OutputMode;

/// print-bootstrap - Prepare Python and its dependencies, then run the Canon Printer CLI.
#[derive(Debug, Parser)]
#[command(name = "print-bootstrap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Application directory containing main.py (defaults to the current directory)
    #[arg(long, env = "PRINT_BOOTSTRAP_ROOT")]
    pub root: Option<PathBuf>,

    /// Path to config file (overrides <root>/bootstrap.yml)
    #[arg(short, long, env = "PRINT_BOOTSTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Install Python without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Never prompt or pause (implied in CI)
    #[arg(long)]
    pub non_interactive: bool,

    /// Show verbose output, including installer and pip output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Command and arguments passed to the application unchanged
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub args: Vec<String>,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else if self.verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_no_args() {
        let cli = Cli::try_parse_from(["print-bootstrap"]).unwrap();
        assert!(cli.args.is_empty());
        assert!(!cli.yes);
        assert_eq!(cli.output_mode(), OutputMode::Normal);
    }

    #[test]
    fn downstream_args_pass_through_verbatim() {
        let cli = Cli::try_parse_from([
            "print-bootstrap",
            "--yes",
            "print",
            "report.pdf",
            "--copies",
            "2",
            "-q",
        ])
        .unwrap();
        assert!(cli.yes);
        assert!(!cli.quiet);
        assert_eq!(cli.args, vec!["print", "report.pdf", "--copies", "2", "-q"]);
    }

    #[test]
    fn cli_parses_root_and_config() {
        let cli = Cli::try_parse_from([
            "print-bootstrap",
            "--root",
            "/opt/canon",
            "--config",
            "/etc/bootstrap.yml",
            "discover",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/opt/canon")));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/bootstrap.yml")));
        assert_eq!(cli.args, vec!["discover"]);
    }

    #[test]
    fn cli_output_modes() {
        let quiet = Cli::try_parse_from(["print-bootstrap", "-q"]).unwrap();
        assert_eq!(quiet.output_mode(), OutputMode::Quiet);
        let verbose = Cli::try_parse_from(["print-bootstrap", "--verbose"]).unwrap();
        assert_eq!(verbose.output_mode(), OutputMode::Verbose);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["print-bootstrap", "-q", "-v"]).is_err());
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli =
            Cli::try_parse_from(["print-bootstrap", "--non-interactive", "--no-color", "--debug"])
                .unwrap();
        assert!(cli.non_interactive);
        assert!(cli.no_color);
        assert!(cli.debug);
    }
}
