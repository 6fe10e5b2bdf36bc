//! Configuration file discovery and loading.

use crate::config::schema::BootstrapConfig;
use crate::error::{BootstrapError, Result};
use crate::runtime::RuntimeVersion;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the installation root.
pub const CONFIG_FILE_NAME: &str = "bootstrap.yml";

/// Default config location for an installation root.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the configuration for an installation root.
///
/// `explicit` comes from `--config`; an explicit file must exist. The default
/// location is optional and falls back to built-in defaults when absent.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<BootstrapConfig> {
    match explicit {
        Some(path) => load_config_file(path),
        None => {
            let path = default_config_path(root);
            if path.exists() {
                load_config_file(&path)
            } else {
                tracing::debug!("No {} found; using defaults", CONFIG_FILE_NAME);
                Ok(BootstrapConfig::default())
            }
        }
    }
}

/// Load and parse a single config file.
pub fn load_config_file(path: &Path) -> Result<BootstrapConfig> {
    let content = fs::read_to_string(path).map_err(|e| BootstrapError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let config = parse_config(&content, path)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse YAML content into a config.
pub fn parse_config(content: &str, path: &Path) -> Result<BootstrapConfig> {
    if content.trim().is_empty() {
        return Ok(BootstrapConfig::default());
    }
    let config: BootstrapConfig =
        serde_yaml::from_str(content).map_err(|e| BootstrapError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    validate_versions(&config, path)?;
    Ok(config)
}

fn validate_versions(config: &BootstrapConfig, path: &Path) -> Result<()> {
    for (field, value) in [
        ("runtime.version", &config.runtime.version),
        ("runtime.minimum_version", &config.runtime.minimum_version),
    ] {
        value
            .parse::<RuntimeVersion>()
            .map_err(|e| BootstrapError::ConfigParseError {
                path: path.to_path_buf(),
                message: format!("{}: {}", field, e),
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config, BootstrapConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "app_name: Office Printers\nruntime:\n  version: 3.12.4\n",
        )
        .unwrap();

        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.app_name, "Office Printers");
        assert_eq!(config.runtime.version, "3.12.4");
        assert_eq!(config.runtime.minimum_version, "3.7");
        assert_eq!(config.entry_point, PathBuf::from("main.py"));
        assert_eq!(config.commands.len(), 5);
    }

    #[test]
    fn parses_commands_and_hashes() {
        let yaml = r#"
entry_point: app/cli.py
commands:
  - name: scan
    usage: "<dir>"
    description: Scan a directory
runtime:
  sha256:
    windows-amd64: ABCDEF
"#;
        let config = parse_config(yaml, Path::new("bootstrap.yml")).unwrap();
        assert_eq!(config.entry_point, PathBuf::from("app/cli.py"));
        assert_eq!(config.commands.len(), 1);
        assert_eq!(config.commands[0].usage, "<dir>");
        assert_eq!(
            config.runtime.expected_sha256("windows-amd64"),
            Some("abcdef".to_string())
        );
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let err = parse_config("runtime: [unclosed", Path::new("/app/bootstrap.yml")).unwrap_err();
        assert!(matches!(err, BootstrapError::ConfigParseError { .. }));
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIGURATION);
    }

    #[test]
    fn invalid_version_is_config_error() {
        let err = parse_config(
            "runtime:\n  minimum_version: latest\n",
            Path::new("bootstrap.yml"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("runtime.minimum_version"));
    }

    #[test]
    fn missing_explicit_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config(temp.path(), Some(&temp.path().join("nope.yml"))).unwrap_err();
        assert!(matches!(err, BootstrapError::ConfigParseError { .. }));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("\n", Path::new("bootstrap.yml")).unwrap();
        assert_eq!(config, BootstrapConfig::default());
    }
}
