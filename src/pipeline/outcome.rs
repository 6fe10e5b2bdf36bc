//! The record threaded through a pipeline run.

use std::fmt;

use crate::error::BootstrapError;

/// How far a run has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Detected,
    RuntimeFound,
    RuntimeInstalled,
    RuntimeVerifyFailed,
    DependenciesSatisfied,
    DependenciesPartial,
    Dispatched,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Detected => "detected",
            Stage::RuntimeFound => "runtime found",
            Stage::RuntimeInstalled => "runtime installed",
            Stage::RuntimeVerifyFailed => "runtime verification failed",
            Stage::DependenciesSatisfied => "dependencies satisfied",
            Stage::DependenciesPartial => "dependencies partially installed",
            Stage::Dispatched => "dispatched",
        };
        f.write_str(name)
    }
}

/// Progress of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationOutcome {
    /// The latest stage reached.
    pub stage: Stage,
    /// Downstream exit code; set only at [`Stage::Dispatched`].
    pub exit_code: Option<i32>,
    /// Every stage reached, in order.
    pub history: Vec<Stage>,
}

impl Default for InstallationOutcome {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallationOutcome {
    pub fn new() -> Self {
        Self {
            stage: Stage::Detected,
            exit_code: None,
            history: vec![Stage::Detected],
        }
    }

    pub fn advance(&mut self, stage: Stage) {
        tracing::debug!("Stage: {}", stage);
        self.stage = stage;
        self.history.push(stage);
    }

    pub fn dispatched(&mut self, exit_code: i32) {
        self.advance(Stage::Dispatched);
        self.exit_code = Some(exit_code);
    }

    pub fn reached(&self, stage: Stage) -> bool {
        self.history.contains(&stage)
    }
}

/// A terminal failure together with how far the run got.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PipelineError {
    pub outcome: InstallationOutcome,
    #[source]
    pub error: BootstrapError,
}

impl PipelineError {
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}
