//! `hostplan data` - show a host's layered data

use anyhow::{Result, bail};

use super::load_inventory;
use crate::Context;
use crate::cli::DataArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &DataArgs) -> Result<()> {
    let loaded = load_inventory(&args.inventory)?;
    let host = loaded.inventory.get_host(&args.host)?;

    if let Some(key) = &args.key {
        let Some(value) = host.get(key) else {
            bail!("{} has no value for '{}'", host.name(), key);
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if !ctx.quiet {
        ui::info(&format!(
            "{} via {} in {}",
            host.name(),
            host.executor_name(),
            ui::plural(host.groups().len(), "group")
        ));
    }

    let data = host.data().flatten();
    if data.is_empty() {
        ui::dim("no data");
    } else {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }

    Ok(())
}
