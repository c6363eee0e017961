//! Name declarations
//!
//! Hosts are declared either as a bare identifier (`"web1"`) or as an
//! identifier paired with inline data (`["web1", { "ssh_port": 2222 }]`).
//! Both forms are normalized here into a [`NameSpec`], so nothing downstream
//! has to care which one was written.

use crate::data::Data;
use serde::{Deserialize, Deserializer, Serialize};

/// Marker that turns an identifier into a connector reference (`@docker/alpine`)
pub const CONNECTOR_MARKER: char = '@';

/// A normalized `(identifier, data)` pair
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NameSpec {
    /// Host identifier or `@connector[/argument]` reference
    pub name: String,
    /// Inline data attached to this declaration (often empty)
    pub data: Data,
}

impl NameSpec {
    /// Create a bare name with no inline data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Data::new(),
        }
    }

    /// Create a name carrying inline data.
    pub fn with_data(name: impl Into<String>, data: Data) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Parse this identifier as a connector reference.
    ///
    /// Returns `None` for plain host names.
    pub fn connector_ref(&self) -> Option<ConnectorRef<'_>> {
        ConnectorRef::parse(&self.name)
    }
}

impl From<&str> for NameSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for NameSpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl<S: Into<String>> From<(S, Data)> for NameSpec {
    fn from((name, data): (S, Data)) -> Self {
        Self::with_data(name, data)
    }
}

/// The two shapes a name may take on the wire
#[derive(Deserialize)]
#[serde(untagged)]
enum RawName {
    Bare(String),
    WithData(String, Data),
}

impl From<RawName> for NameSpec {
    fn from(raw: RawName) -> Self {
        match raw {
            RawName::Bare(name) => Self::new(name),
            RawName::WithData(name, data) => Self::with_data(name, data),
        }
    }
}

impl<'de> Deserialize<'de> for NameSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawName::deserialize(deserializer).map(Into::into)
    }
}

/// A parsed `@<connector>[/<argument>]` identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorRef<'a> {
    /// Connector name (between `@` and the first `/`)
    pub connector: &'a str,
    /// Everything after the first `/`, if present
    pub argument: Option<&'a str>,
}

impl<'a> ConnectorRef<'a> {
    /// Parse an identifier; `None` if it does not start with the connector marker.
    pub fn parse(identifier: &'a str) -> Option<Self> {
        let rest = identifier.strip_prefix(CONNECTOR_MARKER)?;
        Some(match rest.split_once('/') {
            Some((connector, argument)) => Self {
                connector,
                argument: Some(argument),
            },
            None => Self {
                connector: rest,
                argument: None,
            },
        })
    }
}

/// Normalize any mix of name declarations into [`NameSpec`]s.
pub fn normalize_names<I, N>(names: I) -> Vec<NameSpec>
where
    I: IntoIterator<Item = N>,
    N: Into<NameSpec>,
{
    names.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: serde_json::Value) -> Data {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_bare_and_pair_normalize_alike() {
        let names = normalize_names(vec![
            NameSpec::from("web1"),
            NameSpec::from(("web2", data(json!({"ssh_port": 2222})))),
        ]);

        assert_eq!(names[0].name, "web1");
        assert!(names[0].data.is_empty());
        assert_eq!(names[1].name, "web2");
        assert_eq!(names[1].data["ssh_port"], json!(2222));
    }

    #[test]
    fn test_deserialize_mixed_list() {
        let names: Vec<NameSpec> =
            serde_json::from_value(json!(["web1", ["web2", {"role": "api"}]])).unwrap();

        assert_eq!(names.len(), 2);
        assert_eq!(names[0], NameSpec::new("web1"));
        assert_eq!(names[1].name, "web2");
        assert_eq!(names[1].data["role"], json!("api"));
    }

    #[test]
    fn test_connector_ref_parse() {
        assert_eq!(ConnectorRef::parse("web1"), None);
        assert_eq!(
            ConnectorRef::parse("@local"),
            Some(ConnectorRef {
                connector: "local",
                argument: None,
            })
        );
        assert_eq!(
            ConnectorRef::parse("@docker/library/alpine:3"),
            Some(ConnectorRef {
                connector: "docker",
                argument: Some("library/alpine:3"),
            })
        );
    }

    #[test]
    fn test_connector_ref_empty_argument() {
        let spec = NameSpec::new("@myconn/");
        let parsed = spec.connector_ref().unwrap();
        assert_eq!(parsed.connector, "myconn");
        assert_eq!(parsed.argument, Some(""));
    }
}
