//! Built-in connectors.

use super::{ConnectorError, ExecutionConnector, ExpandedHost, InventoryConnector};

/// Group every `@docker/<image>` host is placed in
pub const DOCKER_GROUP: &str = "@docker";

/// Run commands over SSH (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct Ssh;

impl ExecutionConnector for Ssh {
    fn name(&self) -> &str {
        "ssh"
    }
}

/// Run commands on the machine running the deploy
#[derive(Debug, Clone, Copy, Default)]
pub struct Local;

impl ExecutionConnector for Local {
    fn name(&self) -> &str {
        "local"
    }
}

/// Run commands inside a container started from the host's image
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerExecutor;

impl ExecutionConnector for DockerExecutor {
    fn name(&self) -> &str {
        "docker"
    }
}

/// Turn `@docker/<image>` into a single host named after the image
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerInventory;

impl InventoryConnector for DockerInventory {
    fn name(&self) -> &str {
        "docker"
    }

    fn expand(&self, argument: Option<&str>) -> Result<Vec<ExpandedHost>, ConnectorError> {
        match argument.map(str::trim) {
            Some(image) if !image.is_empty() => {
                Ok(vec![ExpandedHost::new(image).with_group(DOCKER_GROUP)])
            }
            _ => Err(ConnectorError::new("no docker base image provided")),
        }
    }
}
