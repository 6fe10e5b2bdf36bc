//! The session's executable search path.
//!
//! The pipeline never mutates the process-wide `PATH`. Instead it carries a
//! [`SearchPath`] value that is refreshed after installs and handed to every
//! spawned child, including the downstream application.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Ordered list of directories searched for executables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
    /// Executable extensions tried on Windows (`PATHEXT`), lower-cased with dot.
    extensions: Vec<String>,
}

impl SearchPath {
    /// Capture the search path of the current process.
    pub fn from_process() -> Self {
        let entries = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();
        let extensions = if cfg!(windows) {
            parse_pathext(&std::env::var("PATHEXT").unwrap_or_default())
        } else {
            Vec::new()
        };
        Self {
            entries,
            extensions,
        }
    }

    /// Build from explicit entries (no extension probing).
    pub fn from_entries(entries: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            extensions: Vec::new(),
        }
    }

    /// Parse a `PATH`-style string using the given separator.
    pub fn parse(value: &str, separator: char) -> Vec<PathBuf> {
        value
            .split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// Add executable extensions to try when resolving names.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// The directories, in search order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Replace every entry, keeping the extension list.
    pub fn replace(&mut self, entries: Vec<PathBuf>) {
        self.entries = entries;
    }

    /// Join the entries into a value suitable for a child's `PATH`.
    pub fn to_os_string(&self) -> OsString {
        std::env::join_paths(&self.entries).unwrap_or_else(|_| {
            // An entry contained the separator; fall back to a lossy join.
            let sep = if cfg!(windows) { ";" } else { ":" };
            let joined: Vec<String> = self
                .entries
                .iter()
                .map(|e| e.to_string_lossy().into_owned())
                .collect();
            OsString::from(joined.join(sep))
        })
    }

    /// Resolve a command name to the first executable match.
    ///
    /// Does not use the `which` command: its behavior varies across systems
    /// and it is sometimes a shell builtin. Names containing a path separator
    /// are checked directly.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.components().count() > 1 {
            return self.candidate_files(direct).into_iter().find(|c| is_executable(c));
        }

        self.entries
            .iter()
            .flat_map(|dir| self.candidate_files(&dir.join(name)))
            .find(|candidate| is_executable(candidate))
    }

    fn candidate_files(&self, base: &Path) -> Vec<PathBuf> {
        let mut candidates = vec![base.to_path_buf()];
        if base.extension().is_none() {
            for ext in &self.extensions {
                let mut with_ext = base.as_os_str().to_owned();
                with_ext.push(ext);
                candidates.push(PathBuf::from(with_ext));
            }
        }
        candidates
    }
}

fn parse_pathext(value: &str) -> Vec<String> {
    let exts: Vec<String> = value
        .split(';')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| e.starts_with('.'))
        .collect();
    if exts.is_empty() {
        vec![".exe".to_string(), ".bat".to_string(), ".cmd".to_string()]
    } else {
        exts
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && path
            .metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}
