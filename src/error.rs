//! Error types for bootstrap operations.
//!
//! This module defines [`BootstrapError`], the primary error type used throughout
//! the pipeline, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every terminal pipeline failure is a distinct `BootstrapError` variant with
//!   its own exit code, so calling automation can tell them apart
//! - Every terminal failure carries remediation lines shown to the operator
//! - Use `anyhow::Error` (via `BootstrapError::Other`) for unexpected errors
//! - Advisory conditions (bitness mismatch, partial dependencies) are never errors

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for an unexpected internal failure.
pub const EXIT_INTERNAL: i32 = 1;
/// Exit code for configuration errors (unsupported installer variant, bad config file).
pub const EXIT_CONFIGURATION: i32 = 70;
/// Exit code when the operator declined the runtime install.
pub const EXIT_CONSENT_DECLINED: i32 = 71;
/// Exit code when the runtime installer could not be downloaded.
pub const EXIT_DOWNLOAD_FAILED: i32 = 72;
/// Exit code when the runtime is still missing after installation.
pub const EXIT_VERIFY_FAILED: i32 = 73;
/// Exit code when the downstream entry point does not exist.
pub const EXIT_ENTRY_POINT_MISSING: i32 = 74;

/// Core error type for bootstrap operations.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Failed to parse the bootstrap configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// No installer artifact or package manager exists for this platform.
    #[error("No runtime installer available for platform variant '{variant}'")]
    UnsupportedVariant { variant: String },

    /// The operator declined the automatic runtime installation.
    #[error("Installation of {runtime} was declined")]
    ConsentDeclined { runtime: String },

    /// The runtime installer artifact could not be acquired.
    #[error("Failed to download runtime installer from {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The runtime is still not callable after installation.
    #[error("{runtime} is still not available after installation")]
    VerificationFailed { runtime: String },

    /// The downstream application entry point is missing.
    #[error("Application entry point not found: {path}")]
    EntryPointMissing { path: PathBuf },

    /// A command could not be spawned at all.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BootstrapError {
    /// The process exit code this error terminates the run with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } | Self::UnsupportedVariant { .. } => EXIT_CONFIGURATION,
            Self::ConsentDeclined { .. } => EXIT_CONSENT_DECLINED,
            Self::DownloadFailed { .. } => EXIT_DOWNLOAD_FAILED,
            Self::VerificationFailed { .. } => EXIT_VERIFY_FAILED,
            Self::EntryPointMissing { .. } => EXIT_ENTRY_POINT_MISSING,
            Self::CommandFailed { .. } | Self::Io(_) | Self::Other(_) => EXIT_INTERNAL,
        }
    }

    /// Concrete next steps shown to the operator after the diagnosis.
    pub fn remediation(&self) -> Vec<String> {
        match self {
            Self::ConfigParseError { path, .. } => vec![
                format!("Fix the YAML syntax in {}", path.display()),
                "Or delete the file to fall back to the built-in defaults".to_string(),
            ],
            Self::UnsupportedVariant { .. } => vec![
                "Install Python 3 with your system package manager".to_string(),
                "Or download it manually from https://www.python.org/downloads/".to_string(),
            ],
            Self::ConsentDeclined { .. } => vec![
                "Install Python 3 manually from https://www.python.org/downloads/".to_string(),
                "Then run this command again".to_string(),
            ],
            Self::DownloadFailed { url, .. } => vec![
                "Check your internet connection and any proxy or firewall settings".to_string(),
                format!("Download the installer manually: {}", url),
                "Then run this command again".to_string(),
            ],
            Self::VerificationFailed { .. } => vec![
                "Close this terminal, open a new one, and run this command again".to_string(),
                "If that does not help, sign out and back in (or restart) so PATH changes apply"
                    .to_string(),
                "Or install Python 3 manually from https://www.python.org/downloads/ and tick 'Add python.exe to PATH'"
                    .to_string(),
            ],
            Self::EntryPointMissing { path } => vec![
                format!(
                    "Run this command from the application directory containing {}",
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                ),
                "Or pass the application directory with --root".to_string(),
            ],
            Self::CommandFailed { .. } | Self::Io(_) | Self::Other(_) => {
                vec!["Re-run with --debug for details".to_string()]
            }
        }
    }
}

/// Result type alias for bootstrap operations.
pub type Result<T> = std::result::Result<T, BootstrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = BootstrapError::ConfigParseError {
            path: PathBuf::from("/app/bootstrap.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/app/bootstrap.yml"));
        assert!(msg.contains("invalid syntax"));
        assert_eq!(err.exit_code(), EXIT_CONFIGURATION);
    }

    #[test]
    fn unsupported_variant_is_configuration_error() {
        let err = BootstrapError::UnsupportedVariant {
            variant: "linux-armv7".into(),
        };
        assert!(err.to_string().contains("linux-armv7"));
        assert_eq!(err.exit_code(), EXIT_CONFIGURATION);
    }

    #[test]
    fn terminal_failures_have_distinct_exit_codes() {
        let codes = [
            BootstrapError::UnsupportedVariant {
                variant: "x".into(),
            }
            .exit_code(),
            BootstrapError::ConsentDeclined {
                runtime: "Python".into(),
            }
            .exit_code(),
            BootstrapError::DownloadFailed {
                url: "https://example.invalid".into(),
                reason: "timeout".into(),
            }
            .exit_code(),
            BootstrapError::VerificationFailed {
                runtime: "Python".into(),
            }
            .exit_code(),
            BootstrapError::EntryPointMissing {
                path: PathBuf::from("main.py"),
            }
            .exit_code(),
        ];
        let mut unique = codes.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn download_failure_remediation_links_manual_download() {
        let err = BootstrapError::DownloadFailed {
            url: "https://www.python.org/ftp/python/3.11.9/python-3.11.9-amd64.exe".into(),
            reason: "HTTP 404".into(),
        };
        let steps = err.remediation();
        assert!(steps.iter().any(|s| s.contains("python-3.11.9-amd64.exe")));
        assert!(steps.iter().any(|s| s.contains("internet connection")));
    }

    #[test]
    fn verification_failure_suggests_restart_and_relogin() {
        let err = BootstrapError::VerificationFailed {
            runtime: "Python".into(),
        };
        let steps = err.remediation();
        assert_eq!(steps.len(), 3);
        assert!(steps[0].contains("new one"));
        assert!(steps[1].contains("sign out"));
        assert!(steps[2].contains("manually"));
    }

    #[test]
    fn entry_point_missing_mentions_file_name() {
        let err = BootstrapError::EntryPointMissing {
            path: PathBuf::from("/opt/app/main.py"),
        };
        assert!(err.to_string().contains("/opt/app/main.py"));
        assert!(err.remediation()[0].contains("main.py"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BootstrapError = io_err.into();
        assert!(matches!(err, BootstrapError::Io(_)));
        assert_eq!(err.exit_code(), EXIT_INTERNAL);
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(BootstrapError::ConsentDeclined {
                runtime: "Python".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
