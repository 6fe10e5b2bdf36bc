//! Hand-off to the downstream application.

use std::path::{Path, PathBuf};

use crate::config::BootstrapConfig;
use crate::error::{BootstrapError, Result};
use crate::platform::PlatformProfile;
use crate::runtime::RuntimeStatus;
use crate::shell::{CommandRunner, CommandSpec, SearchPath};
use crate::ui::UserInterface;

/// Message shown while waiting for acknowledgment.
pub const PAUSE_MESSAGE: &str = "Press Enter to continue...";

/// Launches the entry point with the located runtime.
pub struct LaunchDispatcher<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a BootstrapConfig,
    root: &'a Path,
}

impl<'a> LaunchDispatcher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a BootstrapConfig, root: &'a Path) -> Self {
        Self {
            runner,
            config,
            root,
        }
    }

    /// Absolute location of the entry point.
    pub fn entry_point(&self) -> PathBuf {
        self.root.join(&self.config.entry_point)
    }

    /// Fail with [`BootstrapError::EntryPointMissing`] unless the entry point is a file.
    pub fn check_entry_point(&self) -> Result<PathBuf> {
        let entry = self.entry_point();
        if entry.is_file() {
            Ok(entry)
        } else {
            Err(BootstrapError::EntryPointMissing { path: entry })
        }
    }

    /// Usage summary shown for a bare invocation.
    pub fn usage_lines(&self, profile: &PlatformProfile, runtime: &RuntimeStatus) -> Vec<String> {
        let width = self
            .config
            .commands
            .iter()
            .map(|c| c.usage.len())
            .max()
            .unwrap_or(0);

        let mut lines = vec!["Usage: <command> [options]".to_string(), String::new()];
        lines.push("Commands:".to_string());
        for command in &self.config.commands {
            lines.push(format!(
                "  {:<width$}  {}",
                command.usage,
                command.description,
                width = width
            ));
        }
        lines.push(String::new());
        lines.push("Run '<command> --help' for the options of a command.".to_string());
        lines.push(String::new());
        lines.push(format!(
            "System: {} | Python {}",
            profile.display_label(),
            runtime.version_label()
        ));
        lines
    }

    /// Run the entry point with `args` verbatim and return its exit code.
    ///
    /// Pauses for acknowledgment when the exit code is non-zero or `args`
    /// is empty.
    pub fn dispatch(
        &self,
        profile: &PlatformProfile,
        runtime: &RuntimeStatus,
        args: &[String],
        path: &SearchPath,
        ui: &mut dyn UserInterface,
    ) -> Result<i32> {
        let entry = self.check_entry_point()?;
        let python = runtime.program().ok_or_else(|| {
            BootstrapError::Other(anyhow::anyhow!("No runtime to launch {} with", entry.display()))
        })?;

        if args.is_empty() {
            ui.show_header(&self.config.app_name);
            for line in self.usage_lines(profile, runtime) {
                ui.message(&line);
            }
        }

        let spec = CommandSpec::new(python)
            .arg(entry.display().to_string())
            .args(args.iter().cloned())
            .cwd(self.root)
            .env("PATH", path.to_os_string())
            .inherit_output();

        tracing::info!("Launching {}", spec);
        let result = self.runner.run(&spec)?;
        let code = result.exit_code.unwrap_or(1);
        tracing::debug!("{} exited with {} after {:?}", entry.display(), code, result.duration);

        if should_pause(code, args) {
            ui.pause(PAUSE_MESSAGE);
        }
        Ok(code)
    }
}

/// Whether to wait for the operator after the downstream application exits.
pub fn should_pause(exit_code: i32, args: &[String]) -> bool {
    exit_code != 0 || args.is_empty()
}
