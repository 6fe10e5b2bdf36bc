//! Choosing provisioners for a platform.

use crate::platform::{OsFamily, PlatformProfile};
use crate::shell::CommandRunner;

use super::Provisioner;

/// Package managers present on the host, in preference order.
///
/// macOS prefers Homebrew over MacPorts. Linux uses the distro's manager
/// when the distro is known, otherwise whichever manager responds first.
pub fn available_package_managers(
    profile: &PlatformProfile,
    runner: &dyn CommandRunner,
) -> Vec<Provisioner> {
    let candidates: Vec<Provisioner> = match profile.os_family() {
        OsFamily::MacOS => vec![Provisioner::Homebrew, Provisioner::MacPorts],
        OsFamily::Linux => match distro_manager(profile) {
            Some(manager) => vec![manager],
            None => Provisioner::linux_package_managers().to_vec(),
        },
        OsFamily::Windows | OsFamily::Other => Vec::new(),
    };

    candidates
        .into_iter()
        .filter(|p| is_available(*p, runner))
        .collect()
}

fn is_available(provisioner: Provisioner, runner: &dyn CommandRunner) -> bool {
    let Some(probe) = provisioner.probe_command() else {
        return true;
    };
    let available = runner.run(&probe).map(|r| r.success).unwrap_or(false);
    tracing::debug!("Package manager {} available: {}", provisioner, available);
    available
}

/// The provisioner that runs downloaded installer artifacts, if the OS has one.
pub fn artifact_installer(profile: &PlatformProfile) -> Option<Provisioner> {
    match profile.os_family() {
        OsFamily::Windows => Some(Provisioner::WindowsInstaller),
        OsFamily::MacOS => Some(Provisioner::MacOsPackage),
        OsFamily::Linux | OsFamily::Other => None,
    }
}

/// The package manager that installs native build prerequisites.
///
/// Only Linux needs them; the manager is chosen by distro, falling back
/// to the distros it derives from.
pub fn native_prerequisites_manager(profile: &PlatformProfile) -> Option<Provisioner> {
    if profile.os_family() != OsFamily::Linux {
        return None;
    }
    distro_manager(profile)
}

/// The manager of the distro, or of the first `ID_LIKE` relative that has one.
fn distro_manager(profile: &PlatformProfile) -> Option<Provisioner> {
    profile.distro_family().find_map(Provisioner::for_distro)
}
