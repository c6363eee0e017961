//! Run state shared with the inventory
//!
//! The orchestrator owns a [`RunState`] and may change it between phases of a
//! run. An inventory only holds a weak reference to it (see
//! [`crate::Inventory::attach_state`]), so dropping the state detaches it.

use crate::data::Data;
use std::sync::{PoisonError, RwLock};

/// Externally owned run context: active host subset and deploy-scoped data
#[derive(Debug, Default)]
pub struct RunState {
    active_hosts: RwLock<Vec<String>>,
    deploy_data: RwLock<Data>,
}

impl RunState {
    /// Create an empty run state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active host subset. An empty list means "all hosts".
    pub fn set_active_hosts<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut active = self
            .active_hosts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        active.clear();
        for name in names {
            let name = name.into();
            if !active.contains(&name) {
                active.push(name);
            }
        }
    }

    /// Current active host names, in the order they were set.
    pub fn active_hosts(&self) -> Vec<String> {
        self.active_hosts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the deploy-scoped data.
    pub fn set_deploy_data(&self, data: Data) {
        *self
            .deploy_data
            .write()
            .unwrap_or_else(PoisonError::into_inner) = data;
    }

    /// Clear the deploy-scoped data (between deploys).
    pub fn clear_deploy_data(&self) {
        self.set_deploy_data(Data::new());
    }

    /// Snapshot of the deploy-scoped data.
    pub fn deploy_data(&self) -> Data {
        self.deploy_data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_active_hosts_deduplicated_in_order() {
        let state = RunState::new();
        state.set_active_hosts(["web2", "web1", "web2"]);
        assert_eq!(state.active_hosts(), vec!["web2", "web1"]);

        state.set_active_hosts(Vec::<String>::new());
        assert!(state.active_hosts().is_empty());
    }

    #[test]
    fn test_deploy_data_rotation() {
        let state = RunState::new();
        assert!(state.deploy_data().is_empty());

        let mut data = Data::new();
        data.insert("release".into(), json!("v2"));
        state.set_deploy_data(data);
        assert_eq!(state.deploy_data()["release"], json!("v2"));

        state.clear_deploy_data();
        assert!(state.deploy_data().is_empty());
    }
}
