//! Configuration schema for `bootstrap.yml`.
//!
//! Every field has a serde default, so an empty or partial file is valid and
//! an absent file is equivalent to [`BootstrapConfig::default`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::runtime::RuntimeVersion;

/// Root configuration structure for bootstrap.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Application name (for display purposes)
    pub app_name: String,

    /// Runtime acquisition settings
    pub runtime: RuntimeConfig,

    /// Downstream entry point, relative to the installation root
    pub entry_point: PathBuf,

    /// Dependency manifest, relative to the installation root
    pub manifest: PathBuf,

    /// Downstream subcommands listed in the usage text
    pub commands: Vec<CommandHelp>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            app_name: "Canon Printer CLI".to_string(),
            runtime: RuntimeConfig::default(),
            entry_point: PathBuf::from("main.py"),
            manifest: PathBuf::from("requirements.txt"),
            commands: default_commands(),
        }
    }
}

/// Runtime version and installer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Version installed when no runtime is found
    pub version: String,

    /// Oldest version considered compatible
    pub minimum_version: String,

    /// Download URL templates keyed by installer variant; `{version}` is substituted.
    /// Entries here override the built-in templates.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub download_urls: BTreeMap<String, String>,

    /// Expected SHA-256 of the installer artifact, keyed by installer variant
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sha256: BTreeMap<String, String>,

    /// Wait after the installer returns (platform default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settle_delay_secs: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: "3.11.9".to_string(),
            minimum_version: "3.7".to_string(),
            download_urls: BTreeMap::new(),
            sha256: BTreeMap::new(),
            settle_delay_secs: None,
        }
    }
}

const BUILTIN_DOWNLOAD_URLS: &[(&str, &str)] = &[
    (
        "windows-amd64",
        "https://www.python.org/ftp/python/{version}/python-{version}-amd64.exe",
    ),
    (
        "windows-arm64",
        "https://www.python.org/ftp/python/{version}/python-{version}-arm64.exe",
    ),
    (
        "windows-x86",
        "https://www.python.org/ftp/python/{version}/python-{version}.exe",
    ),
    (
        "macos-universal2",
        "https://www.python.org/ftp/python/{version}/python-{version}-macos11.pkg",
    ),
];

impl RuntimeConfig {
    /// Oldest compatible version; 3.7 if the configured value does not parse.
    pub fn minimum(&self) -> RuntimeVersion {
        self.minimum_version
            .parse()
            .unwrap_or(RuntimeVersion::new(3, 7, 0))
    }

    /// Version to install; 3.11.9 if the configured value does not parse.
    pub fn target(&self) -> RuntimeVersion {
        self.version.parse().unwrap_or(RuntimeVersion::new(3, 11, 9))
    }

    /// Resolve the installer URL for a variant, or `None` if there is no artifact.
    pub fn download_url(&self, variant: &str) -> Option<String> {
        let template = self
            .download_urls
            .get(variant)
            .map(String::as_str)
            .or_else(|| {
                BUILTIN_DOWNLOAD_URLS
                    .iter()
                    .find(|(v, _)| *v == variant)
                    .map(|(_, t)| *t)
            })?;
        Some(template.replace("{version}", &self.version))
    }

    /// Expected artifact hash for a variant, lower-cased.
    pub fn expected_sha256(&self, variant: &str) -> Option<String> {
        self.sha256.get(variant).map(|h| h.trim().to_lowercase())
    }

    /// Delay before verifying an install.
    pub fn settle_delay(&self, windows: bool) -> Duration {
        let secs = self
            .settle_delay_secs
            .unwrap_or(if windows { 5 } else { 0 });
        Duration::from_secs(secs)
    }
}

/// A downstream subcommand shown in the usage text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHelp {
    /// Subcommand name
    pub name: String,

    /// Argument synopsis, e.g. `<file>`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,

    /// One-line description
    #[serde(default)]
    pub description: String,
}

impl CommandHelp {
    fn new(name: &str, usage: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            usage: usage.to_string(),
            description: description.to_string(),
        }
    }
}

fn default_commands() -> Vec<CommandHelp> {
    vec![
        CommandHelp::new("print", "<file>", "Print a document"),
        CommandHelp::new("discover", "", "Discover Canon printers on the network"),
        CommandHelp::new("list", "", "List all discovered Canon printers with details"),
        CommandHelp::new("test", "", "Print a test page"),
        CommandHelp::new("add", "<ip>", "Manually add a Canon printer by IP address"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_falls_back_to_default_version() {
        let mut runtime = RuntimeConfig {
            version: "3.12.4".to_string(),
            ..RuntimeConfig::default()
        };
        assert_eq!(runtime.target(), RuntimeVersion::new(3, 12, 4));
        runtime.version = "latest".to_string();
        assert_eq!(runtime.target(), RuntimeVersion::new(3, 11, 9));
    }

    #[test]
    fn builtin_url_substitutes_version() {
        let runtime = RuntimeConfig::default();
        assert_eq!(
            runtime.download_url("windows-amd64").unwrap(),
            "https://www.python.org/ftp/python/3.11.9/python-3.11.9-amd64.exe"
        );
        assert_eq!(
            runtime.download_url("windows-x86").unwrap(),
            "https://www.python.org/ftp/python/3.11.9/python-3.11.9.exe"
        );
        assert!(runtime
            .download_url("macos-universal2")
            .unwrap()
            .ends_with("python-3.11.9-macos11.pkg"));
    }

    #[test]
    fn linux_variants_have_no_artifact() {
        let runtime = RuntimeConfig::default();
        assert!(runtime.download_url("linux-amd64").is_none());
        assert!(runtime.download_url("other-arm64").is_none());
    }

    #[test]
    fn configured_url_overrides_builtin() {
        let mut runtime = RuntimeConfig {
            version: "3.12.1".to_string(),
            ..Default::default()
        };
        runtime.download_urls.insert(
            "windows-amd64".to_string(),
            "https://mirror.example.com/{version}/py.exe".to_string(),
        );
        assert_eq!(
            runtime.download_url("windows-amd64").unwrap(),
            "https://mirror.example.com/3.12.1/py.exe"
        );
    }

    #[test]
    fn settle_delay_defaults_per_platform() {
        let runtime = RuntimeConfig::default();
        assert_eq!(runtime.settle_delay(true), Duration::from_secs(5));
        assert_eq!(runtime.settle_delay(false), Duration::ZERO);

        let configured = RuntimeConfig {
            settle_delay_secs: Some(1),
            ..Default::default()
        };
        assert_eq!(configured.settle_delay(true), Duration::from_secs(1));
    }

    #[test]
    fn default_commands_cover_downstream_cli() {
        let names: Vec<_> = BootstrapConfig::default()
            .commands
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["print", "discover", "list", "test", "add"]);
    }
}
