//! Command-line interface.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`run`] - Builds the real capabilities and runs the pipeline

pub mod args;
pub mod run;

pub use args::Cli;
pub use run::run;
