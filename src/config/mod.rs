//! Bootstrap configuration.
//!
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use print_bootstrap::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("bootstrap.yml"), "app_name: test").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config.app_name, "test");
//! ```

pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config, load_config_file, parse_config, CONFIG_FILE_NAME};
pub use schema::{BootstrapConfig, CommandHelp, RuntimeConfig};
