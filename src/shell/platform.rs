//! Host shell and privilege detection.

use std::path::Path;

/// Known shell types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    Unknown,
}

impl ShellType {
    /// Parse shell type from executable name.
    pub fn from_executable(exe: &str) -> Self {
        let name = Path::new(exe)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "bash" => ShellType::Bash,
            "zsh" => ShellType::Zsh,
            "fish" => ShellType::Fish,
            _ => ShellType::Unknown,
        }
    }
}

/// How the operator can pick up a changed PATH in their shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellReloadInfo {
    /// Command to reload the shell.
    pub reload_command: String,
}

impl ShellReloadInfo {
    /// Detect from the `SHELL` variable.
    pub fn detect() -> Option<Self> {
        Self::from_shell_path(&std::env::var("SHELL").ok()?)
    }

    /// Reload info for the shell at `shell_path`.
    pub fn from_shell_path(shell_path: &str) -> Option<Self> {
        let reload_command = match ShellType::from_executable(shell_path) {
            ShellType::Bash => "source ~/.bashrc",
            ShellType::Zsh => "source ~/.zshrc",
            ShellType::Fish => "source ~/.config/fish/config.fish",
            _ => return None,
        };
        Some(Self {
            reload_command: reload_command.to_string(),
        })
    }
}

/// Check if running in a CI environment.
///
/// Used to force non-interactive mode in `main()`.
pub fn is_ci() -> bool {
    is_ci_with(|key| std::env::var(key).ok())
}

fn is_ci_with<F>(get_env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|key| get_env(key).is_some())
}

/// Check if running as root/admin.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        // The Windows installer raises its own elevation prompt.
        false
    }
}
