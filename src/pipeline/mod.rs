//! Pipeline orchestration.
//!
//! - [`bootstrap`] - runs the stages in order
//! - [`outcome`] - the per-run progress record and terminal failure

pub mod bootstrap;
pub mod outcome;

pub use bootstrap::{report_failure, Pipeline};
pub use outcome::{InstallationOutcome, PipelineError, Stage};
