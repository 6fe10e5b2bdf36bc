//! Automated runtime installation.
//!
//! Runs only when the locator found nothing. Asks for consent, installs
//! through a package manager (Unix) or a downloaded installer artifact,
//! refreshes the session search path and verifies with the locator. A failed
//! verification is terminal; the installer never loops.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::RuntimeConfig;
use crate::error::{BootstrapError, Result};
use crate::platform::PlatformProfile;
use crate::provision::{artifact_installer, available_package_managers, SystemProvisioner};
use crate::shell::{refresh, CommandRunner, EnvScope, EnvironmentStore, RefreshOutcome, SearchPath};
use crate::ui::{Prompt, UserInterface};

use super::download::{acquire_artifact, ArtifactFetcher};
use super::locator::RuntimeLocator;
use super::status::RuntimeStatus;
use super::version::RuntimeVersion;

/// Prompt key for the install consent question.
pub const INSTALL_PROMPT_KEY: &str = "install_runtime";

/// Mockable dependencies for the installer.
pub struct InstallerContext<'a> {
    /// Spawns installers, package managers and version probes.
    pub runner: &'a dyn CommandRunner,
    /// Downloads installer artifacts.
    pub fetcher: &'a dyn ArtifactFetcher,
    /// Persisted environment, re-read after installing.
    pub store: &'a dyn EnvironmentStore,
    /// Waits out asynchronous installer work.
    pub sleep: &'a dyn Fn(Duration),
    /// Reads process environment variables.
    pub env: &'a dyn Fn(&str) -> Option<String>,
    /// Running as root/admin.
    pub elevated: bool,
    /// `--yes` was given.
    pub assume_yes: bool,
}

/// Installs the runtime described by a [`RuntimeConfig`].
pub struct RuntimeInstaller<'a> {
    ctx: &'a InstallerContext<'a>,
    config: &'a RuntimeConfig,
    minimum: RuntimeVersion,
}

impl<'a> RuntimeInstaller<'a> {
    pub fn new(ctx: &'a InstallerContext<'a>, config: &'a RuntimeConfig, minimum: RuntimeVersion) -> Self {
        Self {
            ctx,
            config,
            minimum,
        }
    }

    fn runtime_label(&self) -> String {
        format!("Python {}", self.config.version)
    }

    /// Make sure a runtime is present, installing one if `status` says it is not.
    ///
    /// On success the returned status is from a fresh locator run and
    /// `path` has been refreshed.
    pub fn ensure_runtime(
        &self,
        profile: &PlatformProfile,
        status: &RuntimeStatus,
        path: &mut SearchPath,
        ui: &mut dyn UserInterface,
    ) -> Result<RuntimeStatus> {
        if status.present {
            return Ok(status.clone());
        }

        self.request_consent(ui)?;

        if !self.install_with_package_manager(profile, ui) {
            self.install_from_artifact(profile, ui)?;
        }

        let delay = self.config.settle_delay(profile.is_windows());
        if !delay.is_zero() {
            tracing::debug!("Waiting {:?} for the installer to settle", delay);
            (self.ctx.sleep)(delay);
        }

        self.verify(profile, path, ui)
    }

    fn request_consent(&self, ui: &mut dyn UserInterface) -> Result<()> {
        if self.ctx.assume_yes {
            tracing::info!("Installing {} (--yes)", self.runtime_label());
            return Ok(());
        }

        ui.warning(&format!(
            "Python {} or newer is required but was not found",
            self.minimum
        ));
        let prompt = Prompt::confirm(
            INSTALL_PROMPT_KEY,
            format!("Install {} now?", self.runtime_label()),
            false,
        );
        if ui.confirm(&prompt)? {
            Ok(())
        } else {
            tracing::info!("Runtime installation declined");
            Err(BootstrapError::ConsentDeclined {
                runtime: self.runtime_label(),
            })
        }
    }

    /// Try each available package manager in order. Returns whether one succeeded.
    fn install_with_package_manager(
        &self,
        profile: &PlatformProfile,
        ui: &mut dyn UserInterface,
    ) -> bool {
        let version = self.config.target();
        for manager in available_package_managers(profile, self.ctx.runner) {
            let Some(spec) = manager.runtime_install_command(&version, self.ctx.elevated) else {
                continue;
            };
            let mut spinner = ui.start_spinner(&format!("Installing Python with {}...", manager));
            match self.ctx.runner.run(&spec) {
                Ok(result) if manager.install_succeeded(result.exit_code) => {
                    spinner.finish_success(&format!("Installed Python with {}", manager));
                    return true;
                }
                Ok(result) => {
                    spinner.finish_error(&format!("{} failed", spec));
                    tracing::warn!(
                        "{} exited with {:?}: {}",
                        manager,
                        result.exit_code,
                        result.combined_output().trim()
                    );
                }
                Err(e) => {
                    spinner.finish_error(&format!("Could not run {}", manager));
                    tracing::warn!("{}", e);
                }
            }
        }
        false
    }

    fn install_from_artifact(&self, profile: &PlatformProfile, ui: &mut dyn UserInterface) -> Result<()> {
        let variant = profile.installer_variant();
        let unsupported = || BootstrapError::UnsupportedVariant {
            variant: variant.to_string(),
        };
        let installer = artifact_installer(profile).ok_or_else(unsupported)?;
        let url = self.config.download_url(variant).ok_or_else(unsupported)?;

        // Removed on drop, including every early return below.
        let scratch = tempfile::Builder::new()
            .prefix("print-bootstrap-")
            .tempdir()?;

        let mut spinner = ui.start_spinner(&format!("Downloading {}...", self.runtime_label()));
        let expected = self.config.expected_sha256(variant);
        let artifact = match acquire_artifact(self.ctx.fetcher, &url, scratch.path(), expected.as_deref()) {
            Ok(path) => {
                spinner.finish_success(&format!("Downloaded {}", self.runtime_label()));
                path
            }
            Err(e) => {
                spinner.finish_error("Download failed");
                return Err(e);
            }
        };

        let spec = installer
            .artifact_install_command(&artifact, self.ctx.elevated)
            .ok_or_else(unsupported)?;
        let mut spinner = ui.start_spinner(&format!("Installing {}...", self.runtime_label()));
        match self.ctx.runner.run(&spec) {
            Ok(result) if installer.install_succeeded(result.exit_code) => {
                spinner.finish_success(&format!("{} installer finished", installer));
            }
            Ok(result) => {
                spinner.finish_error(&format!("{} installer finished with errors", installer));
                ui.warning(&format!(
                    "Installer exited with code {:?}; checking whether Python is usable anyway",
                    result.exit_code
                ));
            }
            Err(e) => {
                spinner.finish_error(&format!("Could not start the {} installer", installer));
                tracing::warn!("{}", e);
                ui.warning("Installer could not be started; checking whether Python is usable anyway");
            }
        }

        drop(scratch);
        Ok(())
    }

    fn verify(
        &self,
        profile: &PlatformProfile,
        path: &mut SearchPath,
        ui: &mut dyn UserInterface,
    ) -> Result<RuntimeStatus> {
        let locator = RuntimeLocator::new(self.ctx.runner, self.minimum);

        let refreshed = refresh(profile, self.ctx.store, path);
        let status = locator.locate(profile, path);
        if status.present {
            ui.success(&format!("Python {} is ready", status.version_label()));
            return Ok(status);
        }

        if let RefreshOutcome::NewSessionMayBeRequired {
            reload_hint: Some(hint),
        } = refreshed
        {
            ui.hint(&format!("A new shell may be needed; try: {}", hint));
        }

        if profile.is_windows() && self.repair_registration(ui) {
            refresh(profile, self.ctx.store, path);
            let status = locator.locate(profile, path);
            if status.present {
                ui.success(&format!("Python {} is ready", status.version_label()));
                return Ok(status);
            }
        }

        tracing::warn!("Runtime still missing after installation");
        Err(BootstrapError::VerificationFailed {
            runtime: self.runtime_label(),
        })
    }

    /// Add the default install directory to the user Path if the installer
    /// put Python there but did not register it.
    fn repair_registration(&self, ui: &mut dyn UserInterface) -> bool {
        let Some(install_dir) = self.default_install_dir() else {
            return false;
        };
        if !install_dir.join("python.exe").is_file() {
            tracing::debug!("No python.exe in {}", install_dir.display());
            return false;
        }

        let scripts = install_dir.join("Scripts");
        for dir in [&install_dir, &scripts] {
            let entry = dir.to_string_lossy();
            if let Err(e) = self.ctx.store.append(EnvScope::User, "Path", &entry) {
                tracing::warn!("Could not add {} to Path: {}", entry, e);
                return false;
            }
        }
        ui.message(&format!("Added {} to your Path", install_dir.display()));
        true
    }

    fn default_install_dir(&self) -> Option<PathBuf> {
        let program_files = (self.ctx.env)("ProgramFiles")?;
        let dir = format!("Python{}", self.config.target().short_tag());
        Some(PathBuf::from(program_files).join(dir))
    }
}
