//! The dependency manifest (`requirements.txt`).
//!
//! Only the subset of the pip requirements format the bootstrapper needs to
//! reason about is modelled: a name, a version constraint and an optional
//! platform marker. The file itself is handed to pip unchanged.

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::Result;
use crate::platform::{OsFamily, PlatformProfile};

static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(sys_platform|platform_system|os_name)\s*(==|!=)\s*["']([^"']*)["']$"#)
        .expect("MARKER_REGEX must compile")
});

const MANIFEST_HEADER: &str = "\
# Python dependencies for the Canon Printer CLI.
# Generated by print-bootstrap; edit freely, it is only written when missing.
# Platform-specific entries use environment markers.
";

/// Built-in entries written when no manifest exists, in order.
const DEFAULT_ENTRIES: &[&str] = &[
    "requests>=2.28.0",
    "PyYAML>=6.0",
    "Pillow>=9.0.0",
    "zeroconf>=0.39.0",
    "pywin32>=227 ; sys_platform == \"win32\"",
    "wmi>=1.5.1 ; sys_platform == \"win32\"",
    "python-cups>=1.9.73 ; sys_platform != \"win32\"",
];

/// Distribution names whose import name differs from the normalized name.
const IMPORT_NAMES: &[(&str, &str)] = &[
    ("pyyaml", "yaml"),
    ("pillow", "PIL"),
    ("pywin32", "win32api"),
    ("python-cups", "cups"),
];

/// Marker variable describing the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerVariable {
    SysPlatform,
    PlatformSystem,
    OsName,
}

impl MarkerVariable {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "sys_platform" => Some(Self::SysPlatform),
            "platform_system" => Some(Self::PlatformSystem),
            "os_name" => Some(Self::OsName),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::SysPlatform => "sys_platform",
            Self::PlatformSystem => "platform_system",
            Self::OsName => "os_name",
        }
    }

    /// The value the runtime would report on `os`.
    fn host_value(&self, os: OsFamily) -> &'static str {
        match (self, os) {
            (Self::SysPlatform, OsFamily::Windows) => "win32",
            (Self::SysPlatform, OsFamily::MacOS) => "darwin",
            (Self::SysPlatform, OsFamily::Linux) => "linux",
            (Self::PlatformSystem, OsFamily::Windows) => "Windows",
            (Self::PlatformSystem, OsFamily::MacOS) => "Darwin",
            (Self::PlatformSystem, OsFamily::Linux) => "Linux",
            (Self::OsName, OsFamily::Windows) => "nt",
            (Self::OsName, _) => "posix",
            (_, OsFamily::Other) => "",
        }
    }
}

/// Predicate deciding whether an entry applies to a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCondition {
    /// `<variable> ==|!= "<value>"`
    Marker {
        variable: MarkerVariable,
        negated: bool,
        value: String,
    },
    /// A marker this parser does not evaluate; pip decides at install time.
    Unrecognized(String),
}

impl PlatformCondition {
    /// Parse the text after `;` in a requirement line.
    pub fn parse(marker: &str) -> Self {
        let marker = marker.trim();
        MARKER_REGEX
            .captures(marker)
            .and_then(|caps| {
                Some(Self::Marker {
                    variable: MarkerVariable::parse(caps.get(1)?.as_str())?,
                    negated: caps.get(2)?.as_str() == "!=",
                    value: caps.get(3)?.as_str().to_string(),
                })
            })
            .unwrap_or_else(|| Self::Unrecognized(marker.to_string()))
    }

    /// Whether the entry applies on `profile`.
    pub fn applies_to(&self, profile: &PlatformProfile) -> bool {
        match self {
            Self::Marker {
                variable,
                negated,
                value,
            } => {
                let equal = variable.host_value(profile.os_family()) == value;
                equal != *negated
            }
            Self::Unrecognized(_) => true,
        }
    }
}

impl fmt::Display for PlatformCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker {
                variable,
                negated,
                value,
            } => write!(
                f,
                "{} {} \"{}\"",
                variable.as_str(),
                if *negated { "!=" } else { "==" },
                value
            ),
            Self::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Distribution name as written.
    pub name: String,
    /// Version constraint as written, e.g. `>=2.28.0`; may be empty.
    pub constraint: String,
    /// Platform predicate, `None` when the entry applies everywhere.
    pub condition: Option<PlatformCondition>,
}

impl DependencySpec {
    /// Parse one requirement line (without comments).
    pub fn parse(line: &str) -> Option<Self> {
        let (requirement, marker) = match line.split_once(';') {
            Some((req, marker)) => (req.trim(), Some(marker)),
            None => (line.trim(), None),
        };
        if requirement.is_empty() {
            return None;
        }

        let split = requirement
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(requirement.len());
        let name = &requirement[..split];
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            constraint: requirement[split..].trim().to_string(),
            condition: marker
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(PlatformCondition::parse),
        })
    }

    /// The `>=` lower bound, if the constraint has one.
    pub fn min_version(&self) -> Option<&str> {
        self.constraint
            .split(',')
            .map(str::trim)
            .find_map(|c| c.strip_prefix(">="))
            .map(str::trim)
    }

    /// Whether the entry applies on `profile`.
    pub fn applies_to(&self, profile: &PlatformProfile) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.applies_to(profile))
    }

    /// The module to import to check the dependency is usable.
    pub fn import_name(&self) -> String {
        let normalized = self.name.to_lowercase();
        IMPORT_NAMES
            .iter()
            .find(|(dist, _)| *dist == normalized)
            .map(|(_, module)| module.to_string())
            .unwrap_or_else(|| normalized.replace(['-', '.'], "_"))
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.constraint)?;
        if let Some(condition) = &self.condition {
            write!(f, " ; {}", condition)?;
        }
        Ok(())
    }
}

/// Ordered list of dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyManifest {
    pub entries: Vec<DependencySpec>,
}

impl DependencyManifest {
    /// The built-in default set.
    pub fn defaults() -> Self {
        Self {
            entries: DEFAULT_ENTRIES
                .iter()
                .filter_map(|line| DependencySpec::parse(line))
                .collect(),
        }
    }

    /// Parse manifest content.
    ///
    /// Blank lines, comments and pip options (`-r`, `--index-url`, ...) are
    /// not entries.
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(strip_comment)
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('-'))
            .filter_map(DependencySpec::parse)
            .collect();
        Self { entries }
    }

    /// Render as requirements text with the generated header.
    pub fn render(&self) -> String {
        let mut out = String::from(MANIFEST_HEADER);
        out.push('\n');
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// Entries that apply on `profile`, in order.
    pub fn applicable<'a>(&'a self, profile: &PlatformProfile) -> Vec<&'a DependencySpec> {
        self.entries
            .iter()
            .filter(|entry| entry.applies_to(profile))
            .collect()
    }

    /// Load the manifest at `path`, writing the defaults there first if absent.
    ///
    /// Returns the manifest and whether it was created.
    pub fn load_or_synthesize(path: &Path) -> Result<(Self, bool)> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            return Ok((Self::parse(&content), false));
        }

        let manifest = Self::defaults();
        std::fs::write(path, manifest.render())?;
        tracing::info!("Wrote default manifest to {}", path.display());
        Ok((manifest, true))
    }
}

/// Drop a `#` comment: a whole-line comment, or one preceded by whitespace.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(idx) => &line[..idx],
        None => line,
    }
}
