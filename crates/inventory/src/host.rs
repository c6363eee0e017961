//! A single target host

use crate::connector::ExecutionConnector;
use crate::data::LayeredData;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A resolved target: identity, executor and layered data
#[derive(Clone)]
pub struct Host {
    name: String,
    executor: Arc<dyn ExecutionConnector>,
    groups: Vec<String>,
    data: LayeredData,
}

impl Host {
    /// Create a host. Group names are de-duplicated, keeping first occurrence.
    pub fn new(
        name: impl Into<String>,
        executor: Arc<dyn ExecutionConnector>,
        groups: Vec<String>,
        data: LayeredData,
    ) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(groups.len());
        for group in groups {
            if !unique.contains(&group) {
                unique.push(group);
            }
        }

        Self {
            name: name.into(),
            executor,
            groups: unique,
            data,
        }
    }

    /// Host name (unique within an inventory)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The execution connector this host is bound to
    pub fn executor(&self) -> &Arc<dyn ExecutionConnector> {
        &self.executor
    }

    /// Name of the execution connector
    pub fn executor_name(&self) -> &str {
        self.executor.name()
    }

    /// Groups this host belongs to, in declaration order
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Whether the host belongs to `group`
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// Layered view over this host's data
    pub fn data(&self) -> &LayeredData {
        &self.data
    }

    /// Shorthand for `self.data().get(key)`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key)
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("name", &self.name)
            .field("executor", &self.executor.name())
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Host {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Host {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::builtin::Local;
    use crate::data::{Data, DataSource};
    use serde_json::json;

    #[test]
    fn test_groups_are_deduplicated() {
        let host = Host::new(
            "web1",
            Arc::new(Local),
            vec!["web".into(), "db".into(), "web".into()],
            LayeredData::default(),
        );

        assert_eq!(host.groups(), ["web", "db"]);
        assert!(host.in_group("db"));
        assert!(!host.in_group("cache"));
        assert_eq!(host.executor_name(), "local");
    }

    #[test]
    fn test_host_data_lookup() {
        let mut data = Data::new();
        data.insert("role".into(), json!("api"));
        let host = Host::new(
            "api1",
            Arc::new(Local),
            Vec::new(),
            LayeredData::new(vec![DataSource::Static(data)]),
        );

        assert_eq!(host.get("role"), Some(json!("api")));
        assert_eq!(host.to_string(), "api1");
    }
}
