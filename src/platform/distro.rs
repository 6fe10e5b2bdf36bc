//! Linux distribution identification from `/etc/os-release`.

use std::path::Path;

const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// The identifying fields of an os-release file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    /// `ID`, lower-cased.
    pub id: Option<String>,
    /// `ID_LIKE` entries, closest relative first.
    pub id_like: Vec<String>,
}

impl OsRelease {
    /// The identifier to record as the distro: `ID`, else the first `ID_LIKE`.
    pub fn primary(&self) -> Option<&str> {
        self.id.as_deref().or(self.id_like.first().map(String::as_str))
    }
}

/// Read the os-release of the running Linux host.
pub fn read_os_release() -> Option<OsRelease> {
    OS_RELEASE_PATHS
        .iter()
        .map(Path::new)
        .find_map(|path| std::fs::read_to_string(path).ok())
        .and_then(|content| parse_os_release(&content))
}

/// Extract `ID` and `ID_LIKE` from os-release content.
///
/// Returns `None` when neither is present.
pub fn parse_os_release(content: &str) -> Option<OsRelease> {
    let mut release = OsRelease::default();

    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'').to_lowercase();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "ID" => release.id = Some(value),
            "ID_LIKE" => release.id_like = value.split_whitespace().map(String::from).collect(),
            _ => {}
        }
    }

    if release.id.is_none() && release.id_like.is_empty() {
        None
    } else {
        Some(release)
    }
}
