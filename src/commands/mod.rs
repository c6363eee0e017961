pub mod data;
pub mod hosts;
pub mod plan;

use anyhow::{Context as AnyhowContext, Result};
use inventory::{ConnectorRegistry, Data, Inventory, RunState};
use std::sync::Arc;

use crate::cli::InventoryArgs;
use crate::config::InventoryFile;

/// A built inventory together with the run state it is attached to.
///
/// The inventory only holds a weak reference to the state, so both travel
/// together for the lifetime of a command.
pub struct Loaded {
    pub inventory: Inventory,
    pub state: Arc<RunState>,
}

/// Load the inventory file, build it, and attach a run state from the flags
pub fn load_inventory(args: &InventoryArgs) -> Result<Loaded> {
    let spec = InventoryFile::load(&args.inventory)?.into_spec(args.overrides());

    let inventory = Inventory::build(spec, &ConnectorRegistry::builtin())
        .with_context(|| format!("Could not build inventory from {}", args.inventory))?;

    let state = Arc::new(RunState::new());
    state.set_active_hosts(args.limit.iter().cloned());
    state.set_deploy_data(args.deploy_data.iter().cloned().collect::<Data>());
    inventory.attach_state(&state);

    for name in &args.limit {
        if inventory.find_host(name).is_none() {
            log::warn!("--limit names unknown host {}", name);
        }
    }

    Ok(Loaded { inventory, state })
}
