//! Core types for package reconciliation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Observed packages on a host: name -> installed version
pub type CurrentPackages = BTreeMap<String, String>;

/// A desired package, optionally pinned to a version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Package name
    pub name: String,
    /// Pinned version, if any
    pub version: Option<String>,
}

impl PackageEntry {
    /// Create an unversioned entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Pin a version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Parse a token such as `bash=5.0`.
    ///
    /// Without a separator the whole token is the name. With one, the token
    /// is split on its first occurrence only.
    pub fn parse(token: &str, version_join: Option<&str>) -> Self {
        match version_join
            .filter(|sep| !sep.is_empty())
            .and_then(|sep| token.split_once(sep))
        {
            Some((name, version)) => Self::new(name).with_version(version),
            None => Self::new(token),
        }
    }

    /// Render back to a token, joining name and version with `version_join`.
    ///
    /// Versioned entries render as the bare name when no separator is given.
    pub fn render(&self, version_join: Option<&str>) -> String {
        match (&self.version, version_join) {
            (Some(version), Some(sep)) => format!("{}{sep}{version}", self.name),
            _ => self.name.clone(),
        }
    }

    /// Whether a version is pinned
    pub fn is_versioned(&self) -> bool {
        self.version.is_some()
    }
}

/// Desired packages as declared: a single token or a list of tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Packages {
    /// A single package token
    One(String),
    /// Several package tokens
    Many(Vec<String>),
}

impl Packages {
    /// Flatten into a list of tokens.
    pub fn into_tokens(self) -> Vec<String> {
        match self {
            Self::One(token) => vec![token],
            Self::Many(tokens) => tokens,
        }
    }
}

impl From<&str> for Packages {
    fn from(token: &str) -> Self {
        Self::One(token.to_string())
    }
}

impl From<String> for Packages {
    fn from(token: String) -> Self {
        Self::One(token)
    }
}

impl From<Vec<String>> for Packages {
    fn from(tokens: Vec<String>) -> Self {
        Self::Many(tokens)
    }
}

impl From<Vec<&str>> for Packages {
    fn from(tokens: Vec<&str>) -> Self {
        Self::Many(tokens.into_iter().map(str::to_string).collect())
    }
}

/// What an emitted command does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageAction {
    /// Install missing or mismatched packages
    Install,
    /// Remove present packages
    Uninstall,
    /// Upgrade present, unpinned packages
    Upgrade,
}

impl fmt::Display for PackageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Upgrade => "upgrade",
        };
        f.write_str(name)
    }
}

/// A ready-to-run command and the packages it names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCommand {
    /// Kind of change
    pub action: PackageAction,
    /// Package tokens, in desired order
    pub packages: Vec<String>,
    /// Full command line
    pub command: String,
}

impl PackageCommand {
    /// Build a command from a prefix and package tokens.
    pub fn new(action: PackageAction, prefix: &str, packages: Vec<String>) -> Self {
        let command = format!("{prefix} {}", packages.join(" "));
        Self {
            action,
            packages,
            command,
        }
    }
}

/// Package-manager specific settings for [`crate::ensure_packages`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureOptions {
    /// Prefix for installing, e.g. `apt-get install -y`
    pub install_command: String,
    /// Prefix for removing, e.g. `apt-get remove -y`
    pub uninstall_command: String,
    /// Upgrade present packages that have no pinned version
    #[serde(default)]
    pub latest: bool,
    /// Prefix for upgrading; required when `latest` is set
    #[serde(default)]
    pub upgrade_command: Option<String>,
    /// Separator between name and version, e.g. `=` for apt
    #[serde(default)]
    pub version_join: Option<String>,
    /// Lowercase package names before comparing
    #[serde(default = "default_lower")]
    pub lower: bool,
}

fn default_lower() -> bool {
    true
}

impl EnsureOptions {
    /// Create options with install/uninstall prefixes and defaults elsewhere.
    pub fn new(install_command: impl Into<String>, uninstall_command: impl Into<String>) -> Self {
        Self {
            install_command: install_command.into(),
            uninstall_command: uninstall_command.into(),
            latest: false,
            upgrade_command: None,
            version_join: None,
            lower: true,
        }
    }

    /// Request upgrades of present, unpinned packages.
    pub fn with_latest(mut self, latest: bool) -> Self {
        self.latest = latest;
        self
    }

    /// Set the upgrade prefix.
    pub fn with_upgrade_command(mut self, command: impl Into<String>) -> Self {
        self.upgrade_command = Some(command.into());
        self
    }

    /// The upgrade prefix, if one is set and not blank.
    pub fn upgrade_prefix(&self) -> Option<&str> {
        self.upgrade_command
            .as_deref()
            .filter(|command| !command.trim().is_empty())
    }

    /// Set the version separator.
    pub fn with_version_join(mut self, sep: impl Into<String>) -> Self {
        self.version_join = Some(sep.into());
        self
    }

    /// Enable or disable name lowercasing.
    pub fn with_lower(mut self, lower: bool) -> Self {
        self.lower = lower;
        self
    }
}
