//! Error types for package reconciliation.

use thiserror::Error;

/// Errors that can occur while computing package commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `latest` was requested but no upgrade command is configured
    #[error("packages cannot be upgraded to latest without an upgrade command")]
    LatestWithoutUpgradeCommand,
}

/// Result type for packaging operations
pub type Result<T> = std::result::Result<T, Error>;
