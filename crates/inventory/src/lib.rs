//! # Inventory
//!
//! Resolve declared hosts and groups into concrete targets.
//!
//! This crate turns static declarations into a set of [`Host`]s:
//! - Names are normalized into `(identifier, data)` pairs ([`NameSpec`])
//! - `@connector[/argument]` identifiers select an execution backend or are
//!   expanded into many hosts by an inventory connector
//! - Every host gets a [`LayeredData`] view where the first layer defining a
//!   key wins: override > host > groups > global > deploy data
//!
//! ## Example
//!
//! ```
//! use inventory::{ConnectorRegistry, Data, GroupSpec, Inventory, InventorySpec};
//! use serde_json::json;
//!
//! let mut web_data = Data::new();
//! web_data.insert("role".into(), json!("frontend"));
//!
//! let spec = InventorySpec::new(["web1", "web2", "@docker/alpine"], Data::new())
//!     .with_group(GroupSpec::new("web", ["web1", "web2"]).with_data(web_data));
//!
//! let inventory = Inventory::build(spec, &ConnectorRegistry::builtin())?;
//!
//! assert_eq!(inventory.len_all_hosts(), 3);
//! assert_eq!(inventory.get_host("web1")?.get("role"), Some(json!("frontend")));
//! assert_eq!(inventory.get_host("alpine")?.executor_name(), "docker");
//! # Ok::<(), inventory::Error>(())
//! ```
//!
//! ## Run State
//!
//! The orchestrator may attach a [`RunState`] to restrict the active hosts
//! and supply deploy-scoped data. The inventory only holds a weak reference,
//! and host data reads the deploy layer live on every lookup.

pub mod connector;
pub mod data;
pub mod error;
pub mod host;
pub mod inventory;
pub mod name;
pub mod state;

// Re-export main types at crate root
pub use connector::{
    ConnectorError, ConnectorRegistry, DEFAULT_EXECUTOR, ExecutionConnector, ExpandedHost,
    InventoryConnector,
};
pub use data::{Data, DataSource, LayeredData, OverrideData};
pub use error::{Error, Result};
pub use host::Host;
pub use inventory::{GroupSpec, Inventory, InventorySpec};
pub use name::{CONNECTOR_MARKER, ConnectorRef, NameSpec, normalize_names};
pub use state::RunState;
