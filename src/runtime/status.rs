//! Result of looking for a runtime.

use std::path::PathBuf;

use super::version::RuntimeVersion;

/// What the locator found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeStatus {
    /// Whether a runtime executable was found.
    pub present: bool,

    /// Reported version, `None` when it could not be parsed.
    pub version: Option<RuntimeVersion>,

    /// Command name the runtime answered to (`python`, `python3`, `py`).
    pub executable_name: Option<String>,

    /// Resolved executable path used for every later invocation.
    pub executable_path: Option<PathBuf>,

    /// A 32-bit runtime on a 64-bit host. Advisory only.
    pub bitness_mismatch: bool,
}

impl RuntimeStatus {
    /// No runtime found.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Whether the reported version is known to be older than `minimum`.
    ///
    /// An unknown version is never considered too old.
    pub fn is_older_than(&self, minimum: &RuntimeVersion) -> bool {
        self.version.is_some_and(|v| !v.satisfies(minimum))
    }

    /// Version for display, `unknown` when unparsed.
    pub fn version_label(&self) -> String {
        self.version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// The program to spawn.
    pub fn program(&self) -> Option<String> {
        self.executable_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| self.executable_name.clone())
    }
}
