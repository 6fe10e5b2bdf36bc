//! Downstream dependency management.
//!
//! - [`manifest`] - the `requirements.txt` model and its built-in defaults
//! - [`resolver`] - probe, batch install and re-probe

pub mod manifest;
pub mod resolver;

pub use manifest::{DependencyManifest, DependencySpec, MarkerVariable, PlatformCondition};
pub use resolver::{DependencyResolver, Resolution};
