//! Layered host data
//!
//! Every host sees its configuration through a [`LayeredData`] view: an
//! ordered list of sources where the first source that defines a key wins.
//! Sources are either static mappings, captured once when the inventory is
//! built, or live accessors that are called on every lookup.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A data mapping (host data, group data, global data, ...)
pub type Data = Map<String, Value>;

/// Overlay `overlay` onto `base`; keys in `overlay` win.
pub fn merge_into(base: &mut Data, overlay: &Data) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// Zero-argument accessor producing the current value of a live layer
pub type LiveAccessor = Arc<dyn Fn() -> Data + Send + Sync>;

/// One layer of a [`LayeredData`] view
#[derive(Clone)]
pub enum DataSource {
    /// Data captured when the view was built
    Static(Data),
    /// Data fetched on every lookup
    Live(LiveAccessor),
}

impl DataSource {
    /// Wrap a closure as a live source.
    pub fn live<F>(accessor: F) -> Self
    where
        F: Fn() -> Data + Send + Sync + 'static,
    {
        Self::Live(Arc::new(accessor))
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match self {
            Self::Static(data) => data.get(key).cloned(),
            Self::Live(accessor) => accessor().get(key).cloned(),
        }
    }

    fn snapshot(&self) -> Data {
        match self {
            Self::Static(data) => data.clone(),
            Self::Live(accessor) => accessor(),
        }
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(data) => f.debug_tuple("Static").field(data).finish(),
            Self::Live(_) => f.write_str("Live(..)"),
        }
    }
}

/// Ordered lookup over several data sources; the first defining source wins
#[derive(Debug, Clone, Default)]
pub struct LayeredData {
    sources: Vec<DataSource>,
}

impl LayeredData {
    /// Build a view from sources in priority order (highest first).
    pub fn new(sources: Vec<DataSource>) -> Self {
        Self { sources }
    }

    /// Append a lowest-priority source.
    pub fn push(&mut self, source: DataSource) {
        self.sources.push(source);
    }

    /// Number of layers in this view
    pub fn layers(&self) -> usize {
        self.sources.len()
    }

    /// Look up a key, returning the value from the highest layer defining it.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.sources.iter().find_map(|source| source.lookup(key))
    }

    /// Whether any layer defines `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Look up a string value.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.get(key).map(serde_json::from_value).transpose()
    }

    /// Collapse all layers into one mapping, higher layers winning.
    pub fn flatten(&self) -> Data {
        let mut merged = Data::new();
        for source in self.sources.iter().rev() {
            merge_into(&mut merged, &source.snapshot());
        }
        merged
    }
}

/// Connection overrides supplied by the operator (CLI flags)
///
/// Unset fields never shadow lower layers: they are dropped before the
/// override layer is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideData {
    /// Remote user
    pub ssh_user: Option<String>,
    /// Remote port
    pub ssh_port: Option<u16>,
    /// Private key file path
    pub ssh_key: Option<String>,
    /// Passphrase for the private key
    pub ssh_key_password: Option<String>,
    /// Login password
    pub ssh_password: Option<String>,
}

impl OverrideData {
    /// Convert to a data mapping, skipping unset entries.
    pub fn into_data(self) -> Data {
        let mut data = Data::new();
        let strings = [
            ("ssh_user", self.ssh_user),
            ("ssh_key", self.ssh_key),
            ("ssh_key_password", self.ssh_key_password),
            ("ssh_password", self.ssh_password),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                data.insert(key.to_string(), Value::String(value));
            }
        }
        if let Some(port) = self.ssh_port {
            data.insert("ssh_port".to_string(), Value::from(port));
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn data(value: Value) -> Data {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_first_source_wins() {
        let view = LayeredData::new(vec![
            DataSource::Static(data(json!({"x": 1}))),
            DataSource::Static(data(json!({"x": 2, "y": 2}))),
        ]);

        assert_eq!(view.get("x"), Some(json!(1)));
        assert_eq!(view.get("y"), Some(json!(2)));
        assert_eq!(view.get("z"), None);
        assert!(!view.contains_key("z"));
    }

    #[test]
    fn test_push_adds_lowest_layer() {
        let mut view = LayeredData::new(vec![DataSource::Static(data(json!({"x": 1})))]);
        assert_eq!(view.layers(), 1);

        view.push(DataSource::Static(data(json!({"x": 2, "fallback": true}))));
        assert_eq!(view.layers(), 2);
        assert_eq!(view.get("x"), Some(json!(1)));
        assert_eq!(view.get("fallback"), Some(json!(true)));
    }

    #[test]
    fn test_explicit_null_still_defines_key() {
        let view = LayeredData::new(vec![
            DataSource::Static(data(json!({"x": null}))),
            DataSource::Static(data(json!({"x": 2}))),
        ]);

        assert_eq!(view.get("x"), Some(Value::Null));
    }

    #[test]
    fn test_live_source_is_read_every_time() {
        let current = Arc::new(Mutex::new(data(json!({"phase": "one"}))));
        let handle = Arc::clone(&current);
        let view = LayeredData::new(vec![DataSource::live(move || {
            handle.lock().unwrap().clone()
        })]);

        assert_eq!(view.get_str("phase").as_deref(), Some("one"));
        *current.lock().unwrap() = data(json!({"phase": "two"}));
        assert_eq!(view.get_str("phase").as_deref(), Some("two"));
    }

    #[test]
    fn test_flatten_respects_priority() {
        let view = LayeredData::new(vec![
            DataSource::Static(data(json!({"a": "top"}))),
            DataSource::live(|| data(json!({"a": "bottom", "b": "bottom"}))),
        ]);

        let flat = view.flatten();
        assert_eq!(flat["a"], json!("top"));
        assert_eq!(flat["b"], json!("bottom"));
    }

    #[test]
    fn test_get_as() {
        let view = LayeredData::new(vec![DataSource::Static(data(
            json!({"packages": ["nginx", "vim"], "port": "x"}),
        ))]);

        let packages: Option<Vec<String>> = view.get_as("packages").unwrap();
        assert_eq!(packages, Some(vec!["nginx".into(), "vim".into()]));
        assert!(view.get_as::<u16>("port").is_err());
        assert_eq!(view.get_as::<u16>("missing").unwrap(), None);
    }

    #[test]
    fn test_override_data_drops_unset() {
        let overrides = OverrideData {
            ssh_user: Some("deploy".into()),
            ssh_port: Some(2222),
            ..Default::default()
        };

        let data = overrides.into_data();
        assert_eq!(data.len(), 2);
        assert_eq!(data["ssh_user"], json!("deploy"));
        assert_eq!(data["ssh_port"], json!(2222));
        assert!(!data.contains_key("ssh_password"));
    }
}
