//! The provisioning pipeline.
//!
//! Detector → Locator → (Installer → Refresher) → Resolver → Dispatcher,
//! strictly in order. Every stage either advances the
//! [`InstallationOutcome`] or ends the run with a [`PipelineError`].

use std::path::Path;

use crate::config::BootstrapConfig;
use crate::deps::{DependencyResolver, Resolution};
use crate::error::BootstrapError;
use crate::launch::{LaunchDispatcher, PAUSE_MESSAGE};
use crate::platform::PlatformProfile;
use crate::runtime::{InstallerContext, RuntimeInstaller, RuntimeLocator, RuntimeStatus};
use crate::shell::SearchPath;
use crate::ui::UserInterface;

use super::outcome::{InstallationOutcome, PipelineError, Stage};

/// Runs the whole bootstrap for one invocation.
pub struct Pipeline<'a> {
    ctx: &'a InstallerContext<'a>,
    config: &'a BootstrapConfig,
    root: &'a Path,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: &'a InstallerContext<'a>, config: &'a BootstrapConfig, root: &'a Path) -> Self {
        Self { ctx, config, root }
    }

    /// Run every stage and launch the downstream application with `args`.
    ///
    /// On success the outcome is at [`Stage::Dispatched`] and carries the
    /// downstream exit code.
    pub fn run(
        &self,
        profile: &PlatformProfile,
        path: &mut SearchPath,
        args: &[String],
        ui: &mut dyn UserInterface,
    ) -> std::result::Result<InstallationOutcome, PipelineError> {
        let mut outcome = InstallationOutcome::new();
        tracing::info!(
            "Platform: {} ({})",
            profile.installer_variant(),
            profile.display_label()
        );
        if let Some(warning) = profile.arch_warning() {
            ui.warning(&warning);
        }

        let dispatcher = LaunchDispatcher::new(self.ctx.runner, self.config, self.root);
        if let Err(error) = dispatcher.check_entry_point() {
            return Err(PipelineError { outcome, error });
        }

        let runtime = match self.ensure_runtime(profile, path, ui, &mut outcome) {
            Ok(runtime) => runtime,
            Err(error) => return Err(PipelineError { outcome, error }),
        };

        let manifest = self.root.join(&self.config.manifest);
        let resolver = DependencyResolver::new(self.ctx.runner, self.ctx.elevated);
        match resolver.resolve(profile, &runtime, &manifest, path, ui) {
            Ok(Resolution::Satisfied) => outcome.advance(Stage::DependenciesSatisfied),
            Ok(Resolution::Partial { missing, .. }) => {
                tracing::warn!("Continuing with missing dependencies: {:?}", missing);
                outcome.advance(Stage::DependenciesPartial);
            }
            Err(e) => {
                ui.warning(&format!("Could not check dependencies: {}", e));
                outcome.advance(Stage::DependenciesPartial);
            }
        }

        match dispatcher.dispatch(profile, &runtime, args, path, ui) {
            Ok(code) => {
                outcome.dispatched(code);
                Ok(outcome)
            }
            Err(error) => Err(PipelineError { outcome, error }),
        }
    }

    fn ensure_runtime(
        &self,
        profile: &PlatformProfile,
        path: &mut SearchPath,
        ui: &mut dyn UserInterface,
        outcome: &mut InstallationOutcome,
    ) -> crate::error::Result<RuntimeStatus> {
        let minimum = self.config.runtime.minimum();
        let status = RuntimeLocator::new(self.ctx.runner, minimum).locate(profile, path);

        let status = if status.present {
            outcome.advance(Stage::RuntimeFound);
            status
        } else {
            let installer = RuntimeInstaller::new(self.ctx, &self.config.runtime, minimum);
            match installer.ensure_runtime(profile, &status, path, ui) {
                Ok(installed) => {
                    outcome.advance(Stage::RuntimeInstalled);
                    installed
                }
                Err(e @ BootstrapError::VerificationFailed { .. }) => {
                    outcome.advance(Stage::RuntimeVerifyFailed);
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        };

        if status.bitness_mismatch {
            ui.warning("A 32-bit Python was found on a 64-bit system; some packages may not install");
        }
        if status.is_older_than(&minimum) {
            ui.warning(&format!(
                "Python {} is older than the supported minimum {}",
                status.version_label(),
                minimum
            ));
        }
        tracing::info!(
            "Using {} (Python {})",
            status.program().unwrap_or_default(),
            status.version_label()
        );
        Ok(status)
    }
}

/// Print a terminal failure with its remediation steps.
///
/// Waits for acknowledgment in interactive sessions so a double-clicked
/// launcher window does not close before the message is read.
pub fn report_failure(err: &PipelineError, ui: &mut dyn UserInterface) {
    tracing::debug!("Run stopped after stage '{}'", err.outcome.stage);
    ui.error(&err.error.to_string());
    for step in err.error.remediation() {
        ui.hint(&step);
    }
    if ui.is_interactive() {
        ui.pause(PAUSE_MESSAGE);
    }
}
