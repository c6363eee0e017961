//! Inventory and facts file loading
//!
//! Files are TOML unless their extension is `.json`.

use anyhow::{Context, Result};
use inventory::{Data, GroupSpec, InventorySpec, NameSpec, OverrideData};
use packaging::CurrentPackages;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Observed packages per host: host -> { package -> version }
pub type Facts = BTreeMap<String, CurrentPackages>;

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))
    } else {
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
    }
}

// ============================================================================
// Inventory File
// ============================================================================

/// On-disk inventory declaration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFile {
    /// Top-level host declarations
    #[serde(default)]
    pub hosts: Vec<NameSpec>,
    /// Global data
    #[serde(default)]
    pub data: Data,
    /// Groups, in declaration order
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

impl InventoryFile {
    /// Load an inventory file
    pub fn load(path: &str) -> Result<Self> {
        let path = expand_path(path);
        let file: Self = parse_file(&path)?;
        log::debug!(
            "Loaded inventory from {} ({} hosts, {} groups)",
            path.display(),
            file.hosts.len(),
            file.groups.len()
        );
        Ok(file)
    }

    /// Convert into a build spec.
    ///
    /// Group members that are not declared at the top level are appended as
    /// bare names, so every member of every group becomes a host.
    pub fn into_spec(self, overrides: OverrideData) -> InventorySpec {
        let mut names = self.hosts;
        let mut seen: HashSet<String> = names.iter().map(|n| n.name.clone()).collect();

        for group in &self.groups {
            for member in &group.names {
                if seen.insert(member.name.clone()) {
                    names.push(NameSpec::new(member.name.clone()));
                }
            }
        }

        InventorySpec {
            names,
            data: self.data,
            groups: self.groups,
            overrides,
        }
    }
}

/// Load a facts file
pub fn load_facts(path: &str) -> Result<Facts> {
    let path = expand_path(path);
    let facts: Facts = parse_file(&path)?;
    log::debug!("Loaded facts for {} hosts from {}", facts.len(), path.display());
    Ok(facts)
}
