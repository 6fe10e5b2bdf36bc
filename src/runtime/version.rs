//! Runtime version numbers.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// First `major.minor[.patch]` number in a version banner.
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("VERSION_REGEX must compile")
});

/// A `major.minor.patch` runtime version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RuntimeVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the version from output like `Python 3.11.9`.
    pub fn extract(output: &str) -> Option<Self> {
        let caps = VERSION_REGEX.captures(output)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = caps
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }

    /// Whether this version is at least `minimum`.
    pub fn satisfies(&self, minimum: &RuntimeVersion) -> bool {
        self >= minimum
    }

    /// Directory-style suffix, e.g. `311` for 3.11.
    pub fn short_tag(&self) -> String {
        format!("{}{}", self.major, self.minor)
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for RuntimeVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::extract(trimmed)
            .filter(|_| trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .ok_or_else(|| format!("invalid version: {}", s))
    }
}
