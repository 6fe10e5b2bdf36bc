//! Runtime discovery and installation.
//!
//! - [`locator`] - finding an installed runtime and its version
//! - [`installer`] - consent, download, silent install and verification
//! - [`download`] - installer artifact acquisition over HTTPS
//! - [`version`] - version parsing and comparison
//! - [`status`] - what the locator reports

pub mod download;
pub mod installer;
pub mod locator;
pub mod status;
pub mod version;

pub use download::{acquire_artifact, ArtifactFetcher, HttpFetcher};
pub use installer::{InstallerContext, RuntimeInstaller, INSTALL_PROMPT_KEY};
pub use locator::{candidate_names, RuntimeLocator};
pub use status::RuntimeStatus;
pub use version::RuntimeVersion;
