//! print-bootstrap - Environment bootstrap for the Canon Printer CLI.
//!
//! Detects the host platform, makes sure a compatible Python is installed
//! (installing one with the operator's consent), installs the application's
//! pip dependencies and finally launches `main.py`, passing its exit code
//! through.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Optional `bootstrap.yml` loading
//! - [`deps`] - Dependency manifest and resolution
//! - [`error`] - Error types, exit codes and remediation text
//! - [`launch`] - Hand-off to the downstream application
//! - [`pipeline`] - Stage orchestration
//! - [`platform`] - Host platform detection
//! - [`provision`] - Package manager and installer commands
//! - [`runtime`] - Python discovery, download and installation
//! - [`shell`] - Subprocesses, search path and environment refresh
//! - [`ui`] - Prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use print_bootstrap::platform::{OsFamily, PlatformProfile};
//!
//! let profile = PlatformProfile::new(OsFamily::Windows, "x86_64", None);
//! assert_eq!(profile.installer_variant(), "windows-amd64");
//! assert_eq!(profile.display_label(), "AMD64 (64-bit)");
//! ```

pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod launch;
pub mod pipeline;
pub mod platform;
pub mod provision;
pub mod runtime;
pub mod shell;
pub mod ui;

pub use error::{BootstrapError, Result};
