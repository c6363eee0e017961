//! `hostplan hosts` - list resolved hosts

use anyhow::Result;
use colored::Colorize;

use super::load_inventory;
use crate::Context;
use crate::cli::HostsArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &HostsArgs) -> Result<()> {
    let loaded = load_inventory(&args.inventory)?;
    let inventory = &loaded.inventory;

    let hosts: Vec<_> = if args.all {
        inventory.iter_all_hosts().collect()
    } else {
        inventory.iter_active_hosts()
    };

    if ctx.quiet {
        for host in &hosts {
            println!("{}", host.name());
        }
        return Ok(());
    }

    ui::header(&format!(
        "Hosts ({} of {})",
        hosts.len(),
        inventory.len_all_hosts()
    ));
    if !args.all && !loaded.state.active_hosts().is_empty() {
        ui::dim("limited by --limit");
    }

    for host in &hosts {
        println!(
            "  {} {} {}",
            host.name().bold(),
            format!("[{}]", host.executor_name()).cyan(),
            ui::list_or_dash(host.groups()).dimmed()
        );
    }

    if ctx.verbose > 0 {
        ui::section("Groups");
        for group in inventory.group_names() {
            let members: Vec<String> = inventory
                .get_group(group)?
                .iter()
                .map(|h| h.name().to_string())
                .collect();
            ui::kv(group, &ui::list_or_dash(&members));
        }
    }

    Ok(())
}
