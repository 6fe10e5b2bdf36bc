//! Built-in provisioners.

use std::fmt;
use std::path::Path;

use crate::runtime::RuntimeVersion;
use crate::shell::CommandSpec;

use super::SystemProvisioner;

/// Exit code of the Windows installer when a reboot is pending.
const WINDOWS_REBOOT_REQUIRED: i32 = 3010;

/// A way of installing software on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provisioner {
    /// The python.org Windows installer executable.
    WindowsInstaller,
    /// The python.org macOS `.pkg`, run through `installer`.
    MacOsPackage,
    Homebrew,
    MacPorts,
    Apt,
    Dnf,
    Pacman,
    Zypper,
}

impl Provisioner {
    /// Package manager used by a Linux distribution, from its os-release id.
    pub fn for_distro(distro: &str) -> Option<Self> {
        let distro = distro.to_lowercase();
        match distro.as_str() {
            "debian" | "ubuntu" | "linuxmint" | "pop" | "raspbian" => Some(Self::Apt),
            "fedora" | "rhel" | "centos" | "rocky" | "almalinux" => Some(Self::Dnf),
            "arch" | "manjaro" | "endeavouros" => Some(Self::Pacman),
            "sles" | "suse" => Some(Self::Zypper),
            d if d.starts_with("opensuse") => Some(Self::Zypper),
            _ => None,
        }
    }

    /// Linux package managers, in probe order.
    pub fn linux_package_managers() -> [Self; 4] {
        [Self::Apt, Self::Dnf, Self::Pacman, Self::Zypper]
    }

    /// Command whose success shows a package manager is installed.
    ///
    /// Artifact installers ship with the OS and have no probe.
    pub fn probe_command(&self) -> Option<CommandSpec> {
        let spec = match self {
            Self::WindowsInstaller | Self::MacOsPackage => return None,
            Self::Homebrew => CommandSpec::new("brew").arg("--version"),
            Self::MacPorts => CommandSpec::new("port").arg("version"),
            Self::Apt => CommandSpec::new("apt-get").arg("--version"),
            Self::Dnf => CommandSpec::new("dnf").arg("--version"),
            Self::Pacman => CommandSpec::new("pacman").arg("--version"),
            Self::Zypper => CommandSpec::new("zypper").arg("--version"),
        };
        Some(spec)
    }

    /// Whether this is a package manager (as opposed to an artifact installer).
    pub fn is_package_manager(&self) -> bool {
        !matches!(self, Self::WindowsInstaller | Self::MacOsPackage)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::WindowsInstaller => "Windows installer",
            Self::MacOsPackage => "macOS installer",
            Self::Homebrew => "Homebrew",
            Self::MacPorts => "MacPorts",
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
        }
    }

    /// Wrap with sudo where the provisioner needs root.
    fn privileged(&self, spec: CommandSpec, elevated: bool) -> CommandSpec {
        match self {
            // Homebrew refuses to run as root.
            Self::Homebrew | Self::WindowsInstaller => spec,
            _ => spec.elevated(elevated),
        }
    }
}

impl fmt::Display for Provisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl SystemProvisioner for Provisioner {
    fn name(&self) -> &str {
        self.label()
    }

    fn runtime_install_command(
        &self,
        version: &RuntimeVersion,
        elevated: bool,
    ) -> Option<CommandSpec> {
        let spec = match self {
            Self::WindowsInstaller | Self::MacOsPackage => return None,
            Self::Homebrew => CommandSpec::new("brew").args([
                "install".to_string(),
                format!("python@{}.{}", version.major, version.minor),
            ]),
            Self::MacPorts => CommandSpec::new("port").args([
                "install".to_string(),
                format!("python{}", version.short_tag()),
            ]),
            Self::Apt => CommandSpec::new("apt-get").args([
                "install",
                "-y",
                "python3",
                "python3-pip",
                "python3-venv",
            ]),
            Self::Dnf => {
                CommandSpec::new("dnf").args(["install", "-y", "python3", "python3-pip"])
            }
            Self::Pacman => CommandSpec::new("pacman").args([
                "-S",
                "--noconfirm",
                "--needed",
                "python",
                "python-pip",
            ]),
            Self::Zypper => CommandSpec::new("zypper").args([
                "--non-interactive",
                "install",
                "python3",
                "python3-pip",
            ]),
        };
        Some(self.privileged(spec, elevated))
    }

    fn artifact_install_command(&self, artifact: &Path, elevated: bool) -> Option<CommandSpec> {
        let artifact = artifact.to_string_lossy().into_owned();
        let spec = match self {
            Self::WindowsInstaller => CommandSpec::new(artifact).args([
                "/quiet",
                "InstallAllUsers=1",
                "PrependPath=1",
                "Include_pip=1",
            ]),
            Self::MacOsPackage => {
                CommandSpec::new("installer").args(["-pkg", artifact.as_str(), "-target", "/"])
            }
            _ => return None,
        };
        Some(self.privileged(spec, elevated))
    }

    fn native_prerequisites_command(&self, elevated: bool) -> Option<CommandSpec> {
        let spec = match self {
            Self::Apt => CommandSpec::new("apt-get").args([
                "install",
                "-y",
                "python3-dev",
                "libcups2-dev",
                "build-essential",
            ]),
            Self::Dnf => CommandSpec::new("dnf").args([
                "install",
                "-y",
                "python3-devel",
                "cups-devel",
                "gcc",
            ]),
            Self::Pacman => CommandSpec::new("pacman").args([
                "-S",
                "--noconfirm",
                "--needed",
                "base-devel",
                "libcups",
            ]),
            Self::Zypper => CommandSpec::new("zypper").args([
                "--non-interactive",
                "install",
                "python3-devel",
                "cups-devel",
                "gcc",
            ]),
            _ => return None,
        };
        Some(self.privileged(spec, elevated))
    }

    fn install_succeeded(&self, exit_code: Option<i32>) -> bool {
        match self {
            Self::WindowsInstaller => matches!(exit_code, Some(0) | Some(WINDOWS_REBOOT_REQUIRED)),
            _ => exit_code == Some(0),
        }
    }
}
