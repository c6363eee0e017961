//! Error types for inventory construction and lookup.
//!
//! Construction errors ([`Error::ConnectorNotFound`], [`Error::Expansion`])
//! are fatal: no inventory is produced. Lookup errors ([`Error::HostNotFound`],
//! [`Error::GroupNotFound`]) are recoverable through the `find_*` and `*_or`
//! accessors on [`crate::Inventory`].

use thiserror::Error;

/// Errors that can occur while building or querying an inventory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A `@connector` identifier named a connector that is not registered
    #[error("invalid connector: {name}")]
    ConnectorNotFound {
        /// Connector name as written after the `@` marker
        name: String,
    },

    /// An inventory connector refused to expand its argument
    #[error("connector {connector} failed to expand: {message}")]
    Expansion {
        /// Name of the connector that failed
        connector: String,
        /// Reason reported by the connector
        message: String,
    },

    /// No host with this name exists in the inventory
    #[error("no such host: {name}")]
    HostNotFound {
        /// Requested host name
        name: String,
    },

    /// No group with this name exists in the inventory
    #[error("no such group: {name}")]
    GroupNotFound {
        /// Requested group name
        name: String,
    },
}

impl Error {
    /// Whether this error aborts inventory construction.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectorNotFound { .. } | Self::Expansion { .. })
    }

    /// The identifier (connector, host or group name) this error is about.
    pub fn identifier(&self) -> &str {
        match self {
            Self::ConnectorNotFound { name }
            | Self::HostNotFound { name }
            | Self::GroupNotFound { name } => name,
            Self::Expansion { connector, .. } => connector,
        }
    }
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::ConnectorNotFound { name: "x".into() }.is_fatal());
        assert!(
            Error::Expansion {
                connector: "docker".into(),
                message: "no image".into(),
            }
            .is_fatal()
        );
        assert!(!Error::HostNotFound { name: "web1".into() }.is_fatal());
        assert!(!Error::GroupNotFound { name: "web".into() }.is_fatal());
    }

    #[test]
    fn test_error_carries_identifier() {
        let err = Error::ConnectorNotFound {
            name: "doesnotexist".into(),
        };
        assert_eq!(err.identifier(), "doesnotexist");
        assert_eq!(err.to_string(), "invalid connector: doesnotexist");

        let err = Error::GroupNotFound { name: "db".into() };
        assert_eq!(err.identifier(), "db");
        assert_eq!(err.to_string(), "no such group: db");
    }
}
