//! Host platform detection.
//!
//! - [`profile`] - OS family, CPU architecture and installer variant
//! - [`distro`] - Linux distribution identification

pub mod distro;
pub mod profile;

pub use distro::OsRelease;
pub use profile::{detect, detect_with, CpuArch, OsFamily, PlatformProfile, INSTALLER_VARIANTS};
