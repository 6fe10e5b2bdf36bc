//! Environment refresh after a runtime install.
//!
//! Installers register themselves on the persisted PATH, which a running
//! process never sees. On Windows the refresher re-reads the persisted user
//! and machine `Path` values and recomposes the session [`SearchPath`] from
//! them, so a freshly installed runtime becomes callable without a new login.
//! On Unix there is no store to re-read; the operator is told how to reload
//! their shell if a new session turns out to be needed.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{BootstrapError, Result};
use crate::platform::PlatformProfile;

use super::command::{CommandRunner, CommandSpec};
use super::path::SearchPath;
use super::platform::ShellReloadInfo;

const USER_ENV_KEY: &str = r"HKCU\Environment";
const MACHINE_ENV_KEY: &str = r"HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// Which persisted environment a variable lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvScope {
    User,
    Machine,
}

/// Persisted environment variables of the host.
///
/// The pipeline only ever reads and appends; it never rewrites a value
/// destructively.
pub trait EnvironmentStore {
    /// Read a variable, with `%VAR%` references expanded.
    fn read(&self, scope: EnvScope, name: &str) -> Option<String>;

    /// Append `entry` to a `;`-separated variable, creating it if absent.
    ///
    /// Appending an entry that is already present is a no-op.
    fn append(&self, scope: EnvScope, name: &str, entry: &str) -> Result<()>;
}

/// What a refresh did.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The session path was rebuilt from the persisted store.
    Recomposed { entries: usize },
    /// Nothing could be read; the session path was left alone.
    Unchanged,
    /// No persisted store on this platform; a new shell may be needed.
    NewSessionMayBeRequired { reload_hint: Option<String> },
}

/// Re-read persisted path state into the session search path.
///
/// Best-effort: never fails the pipeline.
pub fn refresh(
    profile: &PlatformProfile,
    store: &dyn EnvironmentStore,
    path: &mut SearchPath,
) -> RefreshOutcome {
    if !profile.is_windows() {
        let reload_hint = ShellReloadInfo::detect().map(|info| info.reload_command);
        tracing::debug!("No persisted PATH store on this platform");
        return RefreshOutcome::NewSessionMayBeRequired { reload_hint };
    }

    let user = store.read(EnvScope::User, "Path");
    let machine = store.read(EnvScope::Machine, "Path");
    if user.is_none() && machine.is_none() {
        tracing::warn!("Could not read the persisted Path; keeping the current search path");
        return RefreshOutcome::Unchanged;
    }

    let mut entries = Vec::new();
    for value in [user, machine].into_iter().flatten() {
        for entry in SearchPath::parse(&value, ';') {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
    }

    tracing::debug!("Refreshed search path with {} entries", entries.len());
    let count = entries.len();
    path.replace(entries);
    RefreshOutcome::Recomposed { entries: count }
}

/// Expand `%NAME%` references using `lookup`.
///
/// Unknown references are left untouched, as Windows does.
pub fn expand_env_refs<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(expanded) => out.push_str(&expanded),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// A value parsed from `reg query` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegValue {
    pub kind: String,
    pub data: String,
}

/// Parse the output of `reg query <key> /v <name>`.
///
/// ```text
/// HKEY_CURRENT_USER\Environment
///     Path    REG_EXPAND_SZ    %USERPROFILE%\bin;C:\Tools
/// ```
pub fn parse_reg_query(output: &str, name: &str) -> Option<RegValue> {
    output.lines().find_map(|line| {
        let trimmed = line.trim_start();
        let (value_name, rest) = trimmed.split_once("    ")?;
        if !value_name.trim().eq_ignore_ascii_case(name) {
            return None;
        }
        let rest = rest.trim_start();
        let (kind, data) = match rest.split_once("    ") {
            Some((kind, data)) => (kind.trim(), data.trim()),
            None => (rest.trim(), ""),
        };
        if !kind.starts_with("REG_") {
            return None;
        }
        Some(RegValue {
            kind: kind.to_string(),
            data: data.to_string(),
        })
    })
}

/// Windows registry-backed store, driven through `reg.exe`.
pub struct RegistryStore<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> RegistryStore<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn key(scope: EnvScope) -> &'static str {
        match scope {
            EnvScope::User => USER_ENV_KEY,
            EnvScope::Machine => MACHINE_ENV_KEY,
        }
    }

    /// Query a raw value.
    ///
    /// `Ok(None)` means `reg` reported the value as absent. Any other
    /// failure is an error so callers never mistake an unreadable value
    /// for an empty one.
    fn query_raw(&self, scope: EnvScope, name: &str) -> Result<Option<RegValue>> {
        let spec = CommandSpec::new("reg").args(["query", Self::key(scope), "/v", name]);
        let failed = |code| BootstrapError::CommandFailed {
            command: format!("reg query {} /v {}", Self::key(scope), name),
            code,
        };
        let result = self.runner.run(&spec)?;
        if !result.success {
            if is_value_absent(&result.combined_output()) {
                return Ok(None);
            }
            return Err(failed(result.exit_code));
        }
        parse_reg_query(&result.stdout, name)
            .map(Some)
            .ok_or_else(|| failed(result.exit_code))
    }
}

fn is_value_absent(output: &str) -> bool {
    output.to_lowercase().contains("unable to find")
}

impl EnvironmentStore for RegistryStore<'_> {
    fn read(&self, scope: EnvScope, name: &str) -> Option<String> {
        let value = self.query_raw(scope, name).ok().flatten()?;
        if value.kind == "REG_EXPAND_SZ" {
            Some(expand_env_refs(&value.data, |var| std::env::var(var).ok()))
        } else {
            Some(value.data)
        }
    }

    fn append(&self, scope: EnvScope, name: &str, entry: &str) -> Result<()> {
        let current = self
            .query_raw(scope, name)?
            .map(|v| v.data)
            .unwrap_or_default();
        let Some(updated) = appended_value(&current, entry) else {
            return Ok(());
        };

        let spec = CommandSpec::new("reg").args([
            "add",
            Self::key(scope),
            "/v",
            name,
            "/t",
            "REG_EXPAND_SZ",
            "/d",
            updated.as_str(),
            "/f",
        ]);
        let result = self.runner.run(&spec)?;
        if result.success {
            tracing::info!("Added {} to the persisted {} {}", entry, name, scope_label(scope));
            Ok(())
        } else {
            Err(BootstrapError::CommandFailed {
                command: format!("reg add {} /v {}", Self::key(scope), name),
                code: result.exit_code,
            })
        }
    }
}

fn scope_label(scope: EnvScope) -> &'static str {
    match scope {
        EnvScope::User => "(user)",
        EnvScope::Machine => "(machine)",
    }
}

/// The value after appending `entry`, or `None` if it is already present.
fn appended_value(current: &str, entry: &str) -> Option<String> {
    let present = current
        .split(';')
        .any(|e| e.trim().trim_end_matches('\\').eq_ignore_ascii_case(entry.trim_end_matches('\\')));
    if present {
        return None;
    }
    let trimmed = current.trim_end_matches(';');
    if trimmed.is_empty() {
        Some(entry.to_string())
    } else {
        Some(format!("{};{}", trimmed, entry))
    }
}

/// In-memory store.
///
/// Used on platforms without a persisted store and for headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<(EnvScope, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value.
    pub fn with_value(self, scope: EnvScope, name: &str, value: &str) -> Self {
        self.set(scope, name, value);
        self
    }

    /// Overwrite a value (simulates an installer writing to the store).
    pub fn set(&self, scope: EnvScope, name: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert((scope, name.to_lowercase()), value.to_string());
        }
    }
}

impl EnvironmentStore for MemoryStore {
    fn read(&self, scope: EnvScope, name: &str) -> Option<String> {
        let values = self.values.lock().ok()?;
        values.get(&(scope, name.to_lowercase())).cloned()
    }

    fn append(&self, scope: EnvScope, name: &str, entry: &str) -> Result<()> {
        let current = self.read(scope, name).unwrap_or_default();
        if let Some(updated) = appended_value(&current, entry) {
            self.set(scope, name, &updated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::OsFamily;
    use crate::shell::command::CommandResult;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::time::Duration;

    fn windows() -> PlatformProfile {
        PlatformProfile::new(OsFamily::Windows, "AMD64", None)
    }

    #[test]
    fn windows_refresh_composes_user_then_machine() {
        let store = MemoryStore::new()
            .with_value(EnvScope::User, "Path", r"C:\Users\me\AppData\Local\Programs\Python\Python311")
            .with_value(EnvScope::Machine, "Path", r"C:\Windows\system32;C:\Windows");
        let mut path = SearchPath::from_entries(vec![PathBuf::from(r"C:\old")]);

        let outcome = refresh(&windows(), &store, &mut path);

        assert_eq!(outcome, RefreshOutcome::Recomposed { entries: 3 });
        assert_eq!(
            path.entries(),
            &[
                PathBuf::from(r"C:\Users\me\AppData\Local\Programs\Python\Python311"),
                PathBuf::from(r"C:\Windows\system32"),
                PathBuf::from(r"C:\Windows"),
            ]
        );
    }

    #[test]
    fn windows_refresh_deduplicates_entries() {
        let store = MemoryStore::new()
            .with_value(EnvScope::User, "Path", r"C:\Tools;C:\Windows")
            .with_value(EnvScope::Machine, "Path", r"C:\Windows");
        let mut path = SearchPath::default();
        let outcome = refresh(&windows(), &store, &mut path);
        assert_eq!(outcome, RefreshOutcome::Recomposed { entries: 2 });
    }

    #[test]
    fn windows_refresh_without_store_values_keeps_path() {
        let store = MemoryStore::new();
        let mut path = SearchPath::from_entries(vec![PathBuf::from(r"C:\keep")]);
        let outcome = refresh(&windows(), &store, &mut path);
        assert_eq!(outcome, RefreshOutcome::Unchanged);
        assert_eq!(path.entries(), &[PathBuf::from(r"C:\keep")]);
    }

    #[test]
    fn unix_refresh_is_a_no_op() {
        let profile = PlatformProfile::new(OsFamily::Linux, "x86_64", Some("ubuntu".into()));
        let store = MemoryStore::new().with_value(EnvScope::User, "Path", "/should/not/be/used");
        let mut path = SearchPath::from_entries(vec![PathBuf::from("/usr/bin")]);
        let outcome = refresh(&profile, &store, &mut path);
        assert!(matches!(
            outcome,
            RefreshOutcome::NewSessionMayBeRequired { .. }
        ));
        assert_eq!(path.entries(), &[PathBuf::from("/usr/bin")]);
    }

    #[test]
    fn expands_known_references() {
        let expanded = expand_env_refs(r"%USERPROFILE%\bin;%SystemRoot%", |name| match name {
            "USERPROFILE" => Some(r"C:\Users\me".to_string()),
            "SystemRoot" => Some(r"C:\Windows".to_string()),
            _ => None,
        });
        assert_eq!(expanded, r"C:\Users\me\bin;C:\Windows");
    }

    #[test]
    fn leaves_unknown_references_and_stray_percent() {
        let expanded = expand_env_refs(r"%NOPE%\x;50%", |_| None);
        assert_eq!(expanded, r"%NOPE%\x;50%");
    }

    #[test]
    fn parses_reg_query_output() {
        let output = "\r\nHKEY_CURRENT_USER\\Environment\r\n    Path    REG_EXPAND_SZ    %USERPROFILE%\\bin;C:\\Tools\r\n\r\n";
        let value = parse_reg_query(output, "Path").unwrap();
        assert_eq!(value.kind, "REG_EXPAND_SZ");
        assert_eq!(value.data, r"%USERPROFILE%\bin;C:\Tools");
    }

    #[test]
    fn parse_reg_query_ignores_other_values() {
        let output = "HKEY_CURRENT_USER\\Environment\n    TEMP    REG_SZ    C:\\Temp\n";
        assert!(parse_reg_query(output, "Path").is_none());
    }

    #[test]
    fn parse_reg_query_handles_empty_data() {
        let output = "HKEY_CURRENT_USER\\Environment\n    Path    REG_SZ\n";
        let value = parse_reg_query(output, "path").unwrap();
        assert_eq!(value.data, "");
    }

    #[test]
    fn appended_value_skips_existing_entries() {
        assert_eq!(appended_value(r"C:\A;C:\B\", r"c:\b"), None);
        assert_eq!(appended_value("", r"C:\A"), Some(r"C:\A".to_string()));
        assert_eq!(
            appended_value(r"C:\A;", r"C:\B"),
            Some(r"C:\A;C:\B".to_string())
        );
    }

    #[test]
    fn memory_store_append_preserves_existing() {
        let store = MemoryStore::new().with_value(EnvScope::User, "Path", r"C:\A");
        store.append(EnvScope::User, "Path", r"C:\B").unwrap();
        store.append(EnvScope::User, "Path", r"C:\B").unwrap();
        assert_eq!(
            store.read(EnvScope::User, "PATH"),
            Some(r"C:\A;C:\B".to_string())
        );
    }

    struct RecordingRunner {
        query_output: String,
        query_fails: bool,
        calls: RefCell<Vec<CommandSpec>>,
    }

    impl RecordingRunner {
        fn answering(query_output: &str) -> Self {
            Self {
                query_output: query_output.to_string(),
                query_fails: false,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing_query(stderr: &str) -> Self {
            Self {
                query_fails: true,
                ..Self::answering(stderr)
            }
        }

        fn added(&self) -> Vec<CommandSpec> {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.args[0] == "add")
                .cloned()
                .collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
            self.calls.borrow_mut().push(spec.clone());
            let is_query = spec.args.first().map(String::as_str) == Some("query");
            if is_query && self.query_fails {
                return Ok(CommandResult::failure(
                    Some(1),
                    String::new(),
                    self.query_output.clone(),
                    Duration::ZERO,
                ));
            }
            let stdout = if is_query {
                self.query_output.clone()
            } else {
                String::new()
            };
            Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
        }
    }

    #[test]
    fn registry_store_append_writes_raw_value_with_entry() {
        let runner = RecordingRunner::answering(
            "HKEY_CURRENT_USER\\Environment\n    Path    REG_EXPAND_SZ    %USERPROFILE%\\bin\n",
        );
        let store = RegistryStore::new(&runner);

        store
            .append(EnvScope::User, "Path", r"C:\Program Files\Python311")
            .unwrap();

        let calls = runner.calls.borrow();
        let add = calls.iter().find(|c| c.args[0] == "add").unwrap();
        assert_eq!(add.program, "reg");
        assert!(add
            .args
            .contains(&r"%USERPROFILE%\bin;C:\Program Files\Python311".to_string()));
        assert!(add.args.contains(&"REG_EXPAND_SZ".to_string()));
    }

    #[test]
    fn registry_store_append_is_noop_when_present() {
        let runner = RecordingRunner::answering(
            "HKEY_CURRENT_USER\\Environment\n    Path    REG_SZ    C:\\Tools\n",
        );
        let store = RegistryStore::new(&runner);
        store.append(EnvScope::User, "Path", r"C:\Tools").unwrap();
        assert!(runner.calls.borrow().iter().all(|c| c.args[0] == "query"));
    }

    #[test]
    fn registry_store_append_leaves_path_alone_when_query_fails() {
        let runner = RecordingRunner::failing_query("ERROR: Access is denied.\r\n");
        let store = RegistryStore::new(&runner);

        let err = store
            .append(EnvScope::User, "Path", r"C:\Program Files\Python311")
            .unwrap_err();

        assert!(matches!(err, BootstrapError::CommandFailed { code: Some(1), .. }));
        assert!(runner.added().is_empty());
    }

    #[test]
    fn registry_store_append_rejects_unreadable_query_output() {
        let runner = RecordingRunner::answering("HKEY_CURRENT_USER\\Environment\n");
        let store = RegistryStore::new(&runner);
        assert!(store.append(EnvScope::User, "Path", r"C:\Tools").is_err());
        assert!(runner.added().is_empty());
    }

    #[test]
    fn registry_store_append_creates_absent_value() {
        let runner = RecordingRunner::failing_query(
            "ERROR: The system was unable to find the specified registry key or value.\r\n",
        );
        let store = RegistryStore::new(&runner);

        store.append(EnvScope::User, "Path", r"C:\Tools").unwrap();

        let added = runner.added();
        assert_eq!(added.len(), 1);
        assert!(added[0].args.contains(&r"C:\Tools".to_string()));
    }

    #[test]
    fn registry_store_read_treats_failed_query_as_unset() {
        let runner = RecordingRunner::failing_query("ERROR: Access is denied.\r\n");
        let store = RegistryStore::new(&runner);
        assert_eq!(store.read(EnvScope::Machine, "Path"), None);
    }
}
