//! System provisioning capabilities.
//!
//! The runtime installer and the dependency resolver never shell out to a
//! concrete installer directly; they ask a [`SystemProvisioner`] for the
//! command to run. Adding a platform means adding one [`Provisioner`] variant.
//!
//! - [`provisioner`] - the built-in provisioners and their commands
//! - [`detect`] - choosing provisioners for a platform profile

pub mod detect;
pub mod provisioner;

pub use detect::{artifact_installer, available_package_managers, native_prerequisites_manager};
pub use provisioner::Provisioner;

use std::path::Path;

use crate::runtime::RuntimeVersion;
use crate::shell::CommandSpec;

/// Something that can install software on the host.
pub trait SystemProvisioner {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Command installing `version` of the runtime directly, if this
    /// provisioner can. Distribution managers install their packaged Python
    /// and ignore the patch level.
    fn runtime_install_command(
        &self,
        version: &RuntimeVersion,
        elevated: bool,
    ) -> Option<CommandSpec>;

    /// Command running a downloaded installer artifact silently, if this
    /// provisioner installs artifacts.
    fn artifact_install_command(&self, artifact: &Path, elevated: bool) -> Option<CommandSpec>;

    /// Command installing the headers and libraries native extensions build against.
    fn native_prerequisites_command(&self, elevated: bool) -> Option<CommandSpec>;

    /// Whether an exit code means the install went through.
    fn install_succeeded(&self, exit_code: Option<i32>) -> bool {
        exit_code == Some(0)
    }
}
