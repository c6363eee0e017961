//! `hostplan plan` - compute package commands for every active host
//!
//! Reconciliation is pure, so hosts are planned in parallel. Results are
//! reported in host order.

use anyhow::{Result, bail};
use colored::Colorize;
use inventory::Host;
use packaging::{CurrentPackages, EnsureOptions, PackageCommand, Packages, ensure_packages_plan};
use rayon::prelude::*;

use super::load_inventory;
use crate::Context;
use crate::cli::PlanArgs;
use crate::config::{Facts, load_facts};
use crate::ui;

/// Host data key holding desired packages when none are given on the command line
pub const PACKAGES_KEY: &str = "packages";

/// Commands planned for one host
#[derive(Debug)]
pub struct HostPlan {
    pub host: String,
    pub commands: Result<Vec<PackageCommand>>,
}

impl PlanArgs {
    fn ensure_options(&self) -> EnsureOptions {
        EnsureOptions {
            install_command: self.install.clone(),
            uninstall_command: self.uninstall.clone(),
            latest: self.latest,
            upgrade_command: self.upgrade.clone(),
            version_join: self.version_join.clone(),
            lower: !self.no_lower,
        }
    }
}

/// Plan one host: desired packages from `packages` or the host's data
pub fn plan_host(
    host: &Host,
    packages: &[String],
    facts: &Facts,
    present: bool,
    options: &EnsureOptions,
) -> Result<Vec<PackageCommand>> {
    let desired: Option<Packages> = if packages.is_empty() {
        host.data().get_as(PACKAGES_KEY)?
    } else {
        Some(Packages::Many(packages.to_vec()))
    };

    let current: Option<&CurrentPackages> = facts.get(host.name());
    if current.is_none() {
        log::debug!("No package facts for {}", host.name());
    }

    Ok(ensure_packages_plan(desired, current, present, options)?)
}

/// Plan every host, using up to `jobs` threads
pub fn plan_hosts(
    hosts: &[&Host],
    packages: &[String],
    facts: &Facts,
    present: bool,
    options: &EnsureOptions,
    jobs: usize,
) -> Result<Vec<HostPlan>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    Ok(pool.install(|| {
        hosts
            .par_iter()
            .map(|host| HostPlan {
                host: host.name().to_string(),
                commands: plan_host(host, packages, facts, present, options),
            })
            .collect()
    }))
}

pub fn run(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let options = args.ensure_options();
    if options.latest && options.upgrade_prefix().is_none() {
        bail!("--latest requires --upgrade");
    }

    let loaded = load_inventory(&args.inventory)?;
    let facts = match &args.facts {
        Some(path) => load_facts(path)?,
        None => Facts::new(),
    };

    let hosts = loaded.inventory.iter_active_hosts();
    let plans = plan_hosts(
        &hosts,
        &args.packages,
        &facts,
        !args.absent,
        &options,
        args.jobs,
    )?;

    let mut failed = 0;
    let mut changes = 0;

    for plan in &plans {
        match &plan.commands {
            Ok(commands) if commands.is_empty() => {
                if !ctx.quiet {
                    ui::section(&plan.host);
                    ui::dim("up to date");
                }
            }
            Ok(commands) => {
                changes += 1;
                if ctx.quiet {
                    for command in commands {
                        println!("{}\t{}", plan.host, command.command);
                    }
                } else {
                    ui::section(&plan.host);
                    for command in commands {
                        println!(
                            "  {} {}",
                            format!("{:<9}", command.action.to_string()).dimmed(),
                            command.command
                        );
                    }
                }
            }
            Err(e) => {
                failed += 1;
                ui::error(&format!("{}: {:#}", plan.host, e));
            }
        }
    }

    if !ctx.quiet {
        println!();
        if changes == 0 && failed == 0 {
            ui::success(&format!("{} up to date", ui::plural(plans.len(), "host")));
        } else {
            ui::info(&format!(
                "{} to change, {} planned",
                ui::plural(changes, "host"),
                plans.len()
            ));
        }
    }

    if failed > 0 {
        ui::warn(&format!("{} could not be planned", ui::plural(failed, "host")));
        bail!("planning failed for {} host(s)", failed);
    }

    Ok(())
}
