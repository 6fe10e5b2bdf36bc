//! Platform profile detection.
//!
//! Produces the immutable [`PlatformProfile`] every later stage depends on.
//! Detection never fails: unknown values fall back to documented defaults.

use std::fmt;

use super::distro::{read_os_release, OsRelease};

/// Every installer variant a profile can carry.
pub const INSTALLER_VARIANTS: &[&str] = &[
    "windows-amd64",
    "windows-arm64",
    "windows-x86",
    "macos-universal2",
    "linux-amd64",
    "linux-arm64",
    "linux-armv7",
    "linux-x86",
    "other-amd64",
    "other-arm64",
    "other-armv7",
    "other-x86",
];

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    MacOS,
    Linux,
    Other,
}

impl OsFamily {
    /// The family of the running build target.
    pub fn current() -> Self {
        Self::from_target(std::env::consts::OS)
    }

    /// Map a target OS name (`std::env::consts::OS` style) to a family.
    pub fn from_target(os: &str) -> Self {
        match os {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOS,
            "linux" => OsFamily::Linux,
            _ => OsFamily::Other,
        }
    }

    /// Prefix used in installer variant keys.
    fn variant_prefix(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::MacOS => "macos",
            OsFamily::Linux => "linux",
            OsFamily::Other => "other",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsFamily::Windows => "Windows",
            OsFamily::MacOS => "macOS",
            OsFamily::Linux => "Linux",
            OsFamily::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Normalized CPU architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuArch {
    Amd64,
    Arm64,
    Armv7,
    X86,
    /// Unrecognized raw architecture string, kept verbatim.
    Other(String),
}

impl CpuArch {
    /// Normalize a raw architecture string. Matching is case-insensitive.
    pub fn normalize(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "amd64" | "x86_64" | "x64" | "em64t" => CpuArch::Amd64,
            "arm64" | "aarch64" => CpuArch::Arm64,
            "x86" | "i386" | "i486" | "i586" | "i686" => CpuArch::X86,
            "arm" | "armhf" => CpuArch::Armv7,
            s if s.starts_with("armv8") => CpuArch::Arm64,
            s if s.starts_with("armv7") => CpuArch::Armv7,
            _ => CpuArch::Other(raw.trim().to_string()),
        }
    }

    /// Whether this is a 64-bit architecture.
    pub fn is_64_bit(&self) -> bool {
        matches!(self, CpuArch::Amd64 | CpuArch::Arm64)
    }

    fn variant_suffix(&self) -> &'static str {
        match self {
            CpuArch::Amd64 | CpuArch::Other(_) => "amd64",
            CpuArch::Arm64 => "arm64",
            CpuArch::Armv7 => "armv7",
            CpuArch::X86 => "x86",
        }
    }

    fn label(&self) -> String {
        match self {
            CpuArch::Amd64 => "AMD64 (64-bit)".to_string(),
            CpuArch::Arm64 => "ARM64 (64-bit)".to_string(),
            CpuArch::Armv7 => "ARMv7 (32-bit)".to_string(),
            CpuArch::X86 => "x86 (32-bit)".to_string(),
            CpuArch::Other(raw) => raw.clone(),
        }
    }
}

/// Immutable description of the host platform.
///
/// Constructed once at startup; every later stage is a function of this
/// value plus external system state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    os_family: OsFamily,
    distro: Option<String>,
    distro_like: Vec<String>,
    cpu_arch: CpuArch,
    installer_variant: String,
    display_label: String,
}

impl PlatformProfile {
    /// Build a profile from already-known parts.
    ///
    /// The distro is only kept for Linux.
    pub fn new(os_family: OsFamily, raw_arch: &str, distro: Option<String>) -> Self {
        let cpu_arch = CpuArch::normalize(raw_arch);
        let installer_variant = installer_variant(os_family, &cpu_arch);
        let display_label = cpu_arch.label();
        let distro = if os_family == OsFamily::Linux {
            distro.map(|d| d.to_lowercase())
        } else {
            None
        };

        Self {
            os_family,
            distro,
            distro_like: Vec::new(),
            cpu_arch,
            installer_variant,
            display_label,
        }
    }

    pub fn os_family(&self) -> OsFamily {
        self.os_family
    }

    pub fn distro(&self) -> Option<&str> {
        self.distro.as_deref()
    }

    /// Record the distros this one derives from (`ID_LIKE`). Linux only.
    pub fn with_distro_like(mut self, like: Vec<String>) -> Self {
        if self.os_family == OsFamily::Linux {
            self.distro_like = like.into_iter().map(|d| d.to_lowercase()).collect();
        }
        self
    }

    /// The distro followed by its `ID_LIKE` relatives, closest first.
    pub fn distro_family(&self) -> impl Iterator<Item = &str> {
        self.distro
            .iter()
            .chain(self.distro_like.iter())
            .map(String::as_str)
    }

    pub fn cpu_arch(&self) -> &CpuArch {
        &self.cpu_arch
    }

    pub fn installer_variant(&self) -> &str {
        &self.installer_variant
    }

    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    pub fn is_windows(&self) -> bool {
        self.os_family == OsFamily::Windows
    }

    /// Warning to surface when the architecture was not recognized.
    pub fn arch_warning(&self) -> Option<String> {
        match &self.cpu_arch {
            CpuArch::Other(raw) => Some(format!(
                "Unrecognized CPU architecture '{}'; using the {} installer",
                raw, self.installer_variant
            )),
            _ => None,
        }
    }
}

fn installer_variant(os: OsFamily, arch: &CpuArch) -> String {
    match (os, arch) {
        (OsFamily::MacOS, _) => "macos-universal2".to_string(),
        (OsFamily::Windows, CpuArch::Armv7) => "windows-x86".to_string(),
        _ => format!("{}-{}", os.variant_prefix(), arch.variant_suffix()),
    }
}

/// Detect the profile of the running host.
pub fn detect() -> PlatformProfile {
    let os = OsFamily::current();
    let profile = detect_with(
        os,
        |key| std::env::var(key),
        uname_machine,
        || {
            if os == OsFamily::Linux {
                read_os_release()
            } else {
                None
            }
        },
    );

    if let Some(warning) = profile.arch_warning() {
        tracing::warn!("{}", warning);
    }
    tracing::debug!(
        os = %profile.os_family(),
        arch = profile.display_label(),
        variant = profile.installer_variant(),
        distro = ?profile.distro(),
        distro_like = ?profile.distro_family().skip(1).collect::<Vec<_>>(),
        "Detected platform"
    );
    profile
}

/// Detect with injected lookups (for testing).
///
/// On Windows the WOW64 indicator `PROCESSOR_ARCHITEW6432` wins over
/// `PROCESSOR_ARCHITECTURE`, so a 32-bit process on a 64-bit host reports the
/// host's architecture. Elsewhere the `uname` result is used. The compile
/// target architecture is the last resort.
pub fn detect_with<E, U, D>(os: OsFamily, env_fn: E, uname_fn: U, distro_fn: D) -> PlatformProfile
where
    E: Fn(&str) -> Result<String, std::env::VarError>,
    U: FnOnce() -> Option<String>,
    D: FnOnce() -> Option<OsRelease>,
{
    let reported = if os == OsFamily::Windows {
        env_fn("PROCESSOR_ARCHITEW6432")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env_fn("PROCESSOR_ARCHITECTURE").ok())
    } else {
        uname_fn()
    };
    let raw_arch = reported
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| std::env::consts::ARCH.to_string());

    let release = distro_fn().unwrap_or_default();
    let distro = release.primary().map(String::from);
    PlatformProfile::new(os, &raw_arch, distro).with_distro_like(release.id_like)
}

fn uname_machine() -> Option<String> {
    let output = std::process::Command::new("uname").arg("-m").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let machine = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if machine.is_empty() {
        None
    } else {
        Some(machine)
    }
}
