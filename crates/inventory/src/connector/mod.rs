//! Connector abstraction
//!
//! Connectors come in two flavours:
//!
//! - [`ExecutionConnector`]: names the backend that runs commands on a host
//!   (`ssh`, `local`, `docker`, ...). A host carries exactly one.
//! - [`InventoryConnector`]: expands a single `@name/argument` placeholder into
//!   any number of concrete hosts, each with its own data and groups.
//!
//! A [`ConnectorRegistry`] holds both kinds, keyed by name. The same name may
//! be registered in both (the built-in `docker` connector is).

pub mod builtin;

use crate::data::Data;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// Name of the execution connector used when none is selected
pub const DEFAULT_EXECUTOR: &str = "ssh";

/// Backend that runs commands on one host
///
/// Transport is out of scope here; the inventory only needs to know which
/// backend a host is bound to.
pub trait ExecutionConnector: Send + Sync + fmt::Debug {
    /// Registry name (what follows `@` in an identifier)
    fn name(&self) -> &str;
}

/// A host produced by expanding an inventory connector
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpandedHost {
    /// Host name
    pub name: String,
    /// Data specific to this host (overrides the placeholder's data)
    pub data: Data,
    /// Extra groups this host belongs to
    pub groups: Vec<String>,
}

impl ExpandedHost {
    /// Create an expanded host with no data or groups.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the host data.
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    /// Add a group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

/// Failure reported by an inventory connector during expansion
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConnectorError {
    /// Human-readable reason
    pub message: String,
}

impl ConnectorError {
    /// Create a connector error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Source of hosts for a `@name[/argument]` placeholder
pub trait InventoryConnector: Send + Sync + fmt::Debug {
    /// Registry name (what follows `@` in an identifier)
    fn name(&self) -> &str;

    /// Expand the placeholder argument into concrete hosts.
    fn expand(&self, argument: Option<&str>) -> std::result::Result<Vec<ExpandedHost>, ConnectorError>;
}

/// Execution and inventory connectors, keyed by name
#[derive(Debug, Clone, Default)]
pub struct ConnectorRegistry {
    execution: BTreeMap<String, Arc<dyn ExecutionConnector>>,
    inventory: BTreeMap<String, Arc<dyn InventoryConnector>>,
}

impl ConnectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in connectors
    /// (`ssh`, `local`, and `docker` in both roles).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_execution(builtin::Ssh);
        registry.register_execution(builtin::Local);
        registry.register_execution(builtin::DockerExecutor);
        registry.register_inventory(builtin::DockerInventory);
        registry
    }

    /// Register an execution connector, replacing any with the same name.
    pub fn register_execution<C: ExecutionConnector + 'static>(&mut self, connector: C) {
        self.execution
            .insert(connector.name().to_string(), Arc::new(connector));
    }

    /// Register an inventory connector, replacing any with the same name.
    pub fn register_inventory<C: InventoryConnector + 'static>(&mut self, connector: C) {
        self.inventory
            .insert(connector.name().to_string(), Arc::new(connector));
    }

    /// Look up an execution connector.
    pub fn execution(&self, name: &str) -> Option<Arc<dyn ExecutionConnector>> {
        self.execution.get(name).cloned()
    }

    /// Look up an inventory connector.
    pub fn inventory(&self, name: &str) -> Option<Arc<dyn InventoryConnector>> {
        self.inventory.get(name).cloned()
    }

    /// Whether `name` is registered in either role.
    pub fn contains(&self, name: &str) -> bool {
        self.execution.contains_key(name) || self.inventory.contains_key(name)
    }

    /// The default execution connector.
    pub fn default_executor(&self) -> Result<Arc<dyn ExecutionConnector>> {
        self.execution(DEFAULT_EXECUTOR)
            .ok_or_else(|| Error::ConnectorNotFound {
                name: DEFAULT_EXECUTOR.to_string(),
            })
    }

    /// All registered names, sorted and de-duplicated.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .execution
            .keys()
            .chain(self.inventory.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed;

    impl InventoryConnector for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn expand(
            &self,
            _argument: Option<&str>,
        ) -> std::result::Result<Vec<ExpandedHost>, ConnectorError> {
            Ok(vec![ExpandedHost::new("a"), ExpandedHost::new("b")])
        }
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ConnectorRegistry::builtin();
        assert_eq!(registry.names(), vec!["docker", "local", "ssh"]);
        assert!(registry.execution("docker").is_some());
        assert!(registry.inventory("docker").is_some());
        assert!(registry.inventory("ssh").is_none());
        assert_eq!(registry.default_executor().unwrap().name(), "ssh");
    }

    #[test]
    fn test_empty_registry_has_no_default() {
        let err = ConnectorRegistry::new().default_executor().unwrap_err();
        assert_eq!(
            err,
            Error::ConnectorNotFound {
                name: "ssh".into()
            }
        );
    }

    #[test]
    fn test_register_custom_inventory() {
        let mut registry = ConnectorRegistry::new();
        registry.register_inventory(Fixed);

        assert!(registry.contains("fixed"));
        let hosts = registry.inventory("fixed").unwrap().expand(None).unwrap();
        assert_eq!(hosts.len(), 2);
    }

    #[test]
    fn test_expanded_host_builder() {
        let host = ExpandedHost::new("db1").with_group("db").with_group("primary");
        assert_eq!(host.name, "db1");
        assert_eq!(host.groups, vec!["db", "primary"]);
        assert!(host.data.is_empty());
    }
}
