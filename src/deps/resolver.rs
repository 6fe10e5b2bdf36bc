//! Dependency resolution.
//!
//! Probes each applicable manifest entry by importing it, installs whatever
//! is missing with pip in one batch, and re-probes. Failures here never stop
//! the pipeline; they are reported as a [`Resolution::Partial`].

use std::path::Path;

use crate::error::{BootstrapError, Result};
use crate::platform::{OsFamily, PlatformProfile};
use crate::provision::{native_prerequisites_manager, SystemProvisioner};
use crate::runtime::RuntimeStatus;
use crate::shell::{CommandRunner, CommandSpec, SearchPath};
use crate::ui::UserInterface;

use super::manifest::{DependencyManifest, DependencySpec};

/// Result of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every applicable dependency imports.
    Satisfied,
    /// Something is still missing, or the batch install reported failure.
    Partial {
        /// Distribution names that still fail to import.
        missing: Vec<String>,
        /// Exit code of the batch install, if it ran and failed.
        batch_exit_code: Option<i32>,
    },
}

impl Resolution {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }
}

/// Installs missing manifest entries with the located runtime.
pub struct DependencyResolver<'a> {
    runner: &'a dyn CommandRunner,
    elevated: bool,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(runner: &'a dyn CommandRunner, elevated: bool) -> Self {
        Self { runner, elevated }
    }

    /// Make sure the dependencies in `manifest_path` are importable.
    ///
    /// Writes the default manifest when the file is absent. Returns `Err`
    /// only when the manifest cannot be read or written, or no runtime is
    /// present.
    pub fn resolve(
        &self,
        profile: &PlatformProfile,
        runtime: &RuntimeStatus,
        manifest_path: &Path,
        path: &SearchPath,
        ui: &mut dyn UserInterface,
    ) -> Result<Resolution> {
        let python = runtime
            .program()
            .ok_or_else(|| BootstrapError::Other(anyhow::anyhow!("No runtime to install dependencies with")))?;

        let (manifest, created) = DependencyManifest::load_or_synthesize(manifest_path)?;
        if created {
            ui.message(&format!(
                "Created {} with the default dependencies",
                manifest_path.display()
            ));
        }

        let applicable = manifest.applicable(profile);
        tracing::debug!(
            "{} of {} manifest entries apply to {}",
            applicable.len(),
            manifest.entries.len(),
            profile.display_label()
        );

        let missing = self.missing(&python, &applicable, path);
        if missing.is_empty() {
            ui.success("All dependencies are installed");
            return Ok(Resolution::Satisfied);
        }

        ui.message(&format!(
            "Installing missing dependencies: {}",
            missing.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ")
        ));

        if profile.os_family() == OsFamily::Linux {
            self.install_native_prerequisites(profile, ui);
        }

        let show_output = ui.output_mode().shows_command_output();
        let upgrade_args = ["install", "--upgrade", "pip"].map(String::from);
        let upgrade = self.pip(&python, &upgrade_args, path, show_output);
        match self.runner.run(&upgrade) {
            Ok(result) if result.success => {}
            Ok(result) => ui.warning(&format!(
                "Could not upgrade pip (exit code {}); continuing",
                code_label(result.exit_code)
            )),
            Err(e) => ui.warning(&format!("Could not upgrade pip: {}", e)),
        }

        let install_args = [
            "install".to_string(),
            "-r".to_string(),
            manifest_path.display().to_string(),
        ];
        let install = self.pip(&python, &install_args, path, show_output);

        let mut spinner = ui.start_spinner("Installing dependencies...");
        let batch_exit_code = match self.runner.run(&install) {
            Ok(result) if result.success => {
                spinner.finish_success("Dependencies installed");
                None
            }
            Ok(result) => {
                spinner.finish_error("Dependency installation reported errors");
                tracing::debug!("pip output:\n{}", result.combined_output());
                Some(result.exit_code.unwrap_or(-1))
            }
            Err(e) => {
                spinner.finish_error("Dependency installation failed to start");
                tracing::debug!("pip spawn failed: {}", e);
                Some(-1)
            }
        };

        let still_missing: Vec<String> = self
            .missing(&python, &applicable, path)
            .into_iter()
            .map(|d| d.name.clone())
            .collect();

        if still_missing.is_empty() && batch_exit_code.is_none() {
            return Ok(Resolution::Satisfied);
        }

        if let Some(code) = batch_exit_code {
            ui.warning(&format!(
                "Dependency installation finished with exit code {}; some packages may be missing",
                code
            ));
        }
        if !still_missing.is_empty() {
            ui.warning(&format!("Still missing: {}", still_missing.join(", ")));
            ui.hint(&format!(
                "Install manually: {} -m pip install -r {}",
                python,
                manifest_path.display()
            ));
        }

        Ok(Resolution::Partial {
            missing: still_missing,
            batch_exit_code,
        })
    }

    fn missing<'m>(
        &self,
        python: &str,
        entries: &[&'m DependencySpec],
        path: &SearchPath,
    ) -> Vec<&'m DependencySpec> {
        entries
            .iter()
            .copied()
            .filter(|entry| !self.imports(python, entry, path))
            .collect()
    }

    fn imports(&self, python: &str, entry: &DependencySpec, path: &SearchPath) -> bool {
        let probe = CommandSpec::new(python)
            .arg("-c")
            .arg(format!("import {}", entry.import_name()))
            .env("PATH", path.to_os_string());
        let ok = self.runner.run(&probe).map(|r| r.success).unwrap_or(false);
        tracing::debug!("{} importable: {}", entry.name, ok);
        ok
    }

    /// `python -m pip <args>`, adding `--user` outside an elevated Unix session.
    fn pip(&self, python: &str, args: &[String], path: &SearchPath, show_output: bool) -> CommandSpec {
        let mut spec = CommandSpec::new(python)
            .args(["-m", "pip"])
            .args(args.iter().cloned())
            .env("PATH", path.to_os_string());
        if cfg!(unix) && !self.elevated {
            spec = spec.arg("--user");
        }
        if show_output {
            spec = spec.inherit_output();
        }
        spec
    }

    fn install_native_prerequisites(&self, profile: &PlatformProfile, ui: &mut dyn UserInterface) {
        let Some(manager) = native_prerequisites_manager(profile) else {
            ui.warning("Unknown Linux distribution; skipping system packages for native dependencies");
            return;
        };
        let Some(command) = manager.native_prerequisites_command(self.elevated) else {
            return;
        };

        ui.message(&format!("Installing system packages with {}", manager.name()));
        match self.runner.run(&command) {
            Ok(result) if manager.install_succeeded(result.exit_code) => {}
            Ok(result) => ui.warning(&format!(
                "System package installation exited with code {}",
                code_label(result.exit_code)
            )),
            Err(e) => ui.warning(&format!("System package installation failed: {}", e)),
        }
    }
}

fn code_label(code: Option<i32>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string())
}
