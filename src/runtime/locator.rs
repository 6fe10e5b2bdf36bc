//! Finding an installed runtime.

use crate::platform::PlatformProfile;
use crate::shell::{CommandRunner, CommandSpec, SearchPath};

use super::status::RuntimeStatus;
use super::version::RuntimeVersion;

const BITNESS_PROBE: &str = "import struct; print(struct.calcsize('P') * 8)";

/// Command names to try, canonical first.
pub fn candidate_names(profile: &PlatformProfile) -> &'static [&'static str] {
    if profile.is_windows() {
        &["python", "py"]
    } else {
        &["python", "python3"]
    }
}

/// Looks for a runtime on the session search path.
///
/// Side-effect free apart from spawning version and bitness queries.
pub struct RuntimeLocator<'a> {
    runner: &'a dyn CommandRunner,
    minimum: RuntimeVersion,
}

impl<'a> RuntimeLocator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, minimum: RuntimeVersion) -> Self {
        Self { runner, minimum }
    }

    /// Locate the runtime.
    ///
    /// The first candidate whose version meets the minimum wins. If none
    /// does, the first one found is reported so the caller can warn.
    pub fn locate(&self, profile: &PlatformProfile, path: &SearchPath) -> RuntimeStatus {
        let mut first_found: Option<RuntimeStatus> = None;

        for name in candidate_names(profile) {
            let Some(resolved) = path.resolve(name) else {
                tracing::debug!("{} not on the search path", name);
                continue;
            };

            let mut status = RuntimeStatus {
                present: true,
                version: None,
                executable_name: Some(name.to_string()),
                executable_path: Some(resolved),
                bitness_mismatch: false,
            };
            status.version = self.query_version(&status, path);
            tracing::debug!(
                "Found {} ({}) version {}",
                name,
                status
                    .executable_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                status.version_label()
            );

            if status.version.is_some_and(|v| v.satisfies(&self.minimum)) {
                return self.with_bitness(status, profile, path);
            }
            if first_found.is_none() {
                first_found = Some(status);
            }
        }

        match first_found {
            Some(status) => self.with_bitness(status, profile, path),
            None => RuntimeStatus::absent(),
        }
    }

    fn query_version(&self, status: &RuntimeStatus, path: &SearchPath) -> Option<RuntimeVersion> {
        let program = status.program()?;
        let spec = CommandSpec::new(program)
            .arg("--version")
            .env("PATH", path.to_os_string());
        let result = self.runner.run(&spec).ok()?;
        // Python 2 prints its banner on stderr.
        RuntimeVersion::extract(&result.combined_output())
    }

    fn with_bitness(
        &self,
        mut status: RuntimeStatus,
        profile: &PlatformProfile,
        path: &SearchPath,
    ) -> RuntimeStatus {
        if !profile.cpu_arch().is_64_bit() {
            return status;
        }
        let Some(program) = status.program() else {
            return status;
        };
        let spec = CommandSpec::new(program)
            .args(["-c", BITNESS_PROBE])
            .env("PATH", path.to_os_string());
        if let Ok(result) = self.runner.run(&spec) {
            status.bitness_mismatch = result.success && result.stdout.trim() == "32";
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::platform::OsFamily;
    use crate::shell::CommandResult;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Answers `--version` and the bitness probe per executable file name.
    struct FakePython {
        versions: HashMap<String, String>,
        bits: String,
    }

    impl CommandRunner for FakePython {
        fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
            let name = Path::new(&spec.program)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stdout = if spec.args.first().map(String::as_str) == Some("--version") {
                self.versions.get(&name).cloned().unwrap_or_default()
            } else {
                self.bits.clone()
            };
            Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
        }
    }

    fn fake(versions: &[(&str, &str)], bits: &str) -> FakePython {
        FakePython {
            versions: versions
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            bits: bits.to_string(),
        }
    }

    fn place(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }

    fn linux() -> PlatformProfile {
        PlatformProfile::new(OsFamily::Linux, "x86_64", Some("ubuntu".into()))
    }

    const MIN: RuntimeVersion = RuntimeVersion::new(3, 7, 0);

    #[test]
    fn absent_when_nothing_resolves() {
        let dir = TempDir::new().unwrap();
        let path = SearchPath::from_entries(vec![dir.path().to_path_buf()]);
        let runner = fake(&[], "64");
        let status = RuntimeLocator::new(&runner, MIN).locate(&linux(), &path);
        assert_eq!(status, RuntimeStatus::absent());
    }

    #[test]
    fn canonical_name_wins_when_compatible() {
        let dir = TempDir::new().unwrap();
        let python = place(dir.path(), "python");
        place(dir.path(), "python3");
        let path = SearchPath::from_entries(vec![dir.path().to_path_buf()]);
        let runner = fake(&[("python", "Python 3.11.9"), ("python3", "Python 3.12.1")], "64");

        let status = RuntimeLocator::new(&runner, MIN).locate(&linux(), &path);
        assert!(status.present);
        assert_eq!(status.version, Some(RuntimeVersion::new(3, 11, 9)));
        assert_eq!(status.executable_name.as_deref(), Some("python"));
        assert_eq!(status.executable_path, Some(python));
        assert!(!status.bitness_mismatch);
    }

    #[test]
    fn alternate_name_used_when_canonical_is_too_old() {
        let dir = TempDir::new().unwrap();
        place(dir.path(), "python");
        place(dir.path(), "python3");
        let path = SearchPath::from_entries(vec![dir.path().to_path_buf()]);
        let runner = fake(&[("python", "Python 2.7.18"), ("python3", "Python 3.10.12")], "64");

        let status = RuntimeLocator::new(&runner, MIN).locate(&linux(), &path);
        assert_eq!(status.executable_name.as_deref(), Some("python3"));
        assert_eq!(status.version, Some(RuntimeVersion::new(3, 10, 12)));
    }

    #[test]
    fn first_found_reported_when_none_compatible() {
        let dir = TempDir::new().unwrap();
        place(dir.path(), "python3");
        let path = SearchPath::from_entries(vec![dir.path().to_path_buf()]);
        let runner = fake(&[("python3", "Python 3.6.9")], "64");

        let status = RuntimeLocator::new(&runner, MIN).locate(&linux(), &path);
        assert!(status.present);
        assert!(status.is_older_than(&MIN));
    }

    #[test]
    fn unparsable_version_is_present_but_unknown() {
        let dir = TempDir::new().unwrap();
        place(dir.path(), "python");
        let path = SearchPath::from_entries(vec![dir.path().to_path_buf()]);
        let runner = fake(&[("python", "garbage")], "64");

        let status = RuntimeLocator::new(&runner, MIN).locate(&linux(), &path);
        assert!(status.present);
        assert_eq!(status.version, None);
    }

    #[test]
    fn thirty_two_bit_runtime_on_64_bit_host_is_flagged() {
        let dir = TempDir::new().unwrap();
        place(dir.path(), "python");
        let path = SearchPath::from_entries(vec![dir.path().to_path_buf()]);
        let runner = fake(&[("python", "Python 3.11.9")], "32\n");

        let status = RuntimeLocator::new(&runner, MIN).locate(&linux(), &path);
        assert!(status.bitness_mismatch);
    }

    #[test]
    fn bitness_not_probed_on_32_bit_host() {
        let dir = TempDir::new().unwrap();
        place(dir.path(), "python");
        let path = SearchPath::from_entries(vec![dir.path().to_path_buf()]);
        let runner = fake(&[("python", "Python 3.11.9")], "32");
        let profile = PlatformProfile::new(OsFamily::Linux, "i686", None);

        let status = RuntimeLocator::new(&runner, MIN).locate(&profile, &path);
        assert!(!status.bitness_mismatch);
    }

    #[test]
    fn windows_tries_py_launcher() {
        let profile = PlatformProfile::new(OsFamily::Windows, "AMD64", None);
        assert_eq!(candidate_names(&profile), &["python", "py"]);
        assert_eq!(candidate_names(&linux()), &["python", "python3"]);
    }
}
