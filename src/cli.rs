use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use inventory::OverrideData;

#[derive(Parser)]
#[command(name = "hostplan")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Resolve host inventories and plan package convergence", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List resolved hosts with their executor and groups
    Hosts(HostsArgs),

    /// Show the layered data of one host
    Data(DataArgs),

    /// Plan package commands for every active host
    Plan(PlanArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that loads an inventory
#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    /// Inventory file (TOML, or JSON with a .json extension)
    pub inventory: String,

    /// Restrict to these hosts (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub limit: Vec<String>,

    /// Deploy-scoped data as key=value (value parsed as JSON when possible)
    #[arg(long = "deploy-data", value_parser = parse_key_value)]
    pub deploy_data: Vec<(String, serde_json::Value)>,

    /// Override SSH user
    #[arg(long)]
    pub user: Option<String>,

    /// Override SSH port
    #[arg(long)]
    pub port: Option<u16>,

    /// Override SSH key file
    #[arg(long)]
    pub key_file: Option<String>,

    /// Override SSH key passphrase
    #[arg(long, env = "HOSTPLAN_KEY_PASSWORD", hide_env_values = true)]
    pub key_password: Option<String>,

    /// Override SSH password
    #[arg(long, env = "HOSTPLAN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl InventoryArgs {
    /// Operator overrides from the command line
    pub fn overrides(&self) -> OverrideData {
        OverrideData {
            ssh_user: self.user.clone(),
            ssh_port: self.port,
            ssh_key: self.key_file.clone(),
            ssh_key_password: self.key_password.clone(),
            ssh_password: self.password.clone(),
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[derive(Args)]
pub struct HostsArgs {
    #[command(flatten)]
    pub inventory: InventoryArgs,

    /// Include hosts outside --limit
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct DataArgs {
    #[command(flatten)]
    pub inventory: InventoryArgs,

    /// Host to inspect
    pub host: String,

    /// Show a single key
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub inventory: InventoryArgs,

    /// Desired packages (defaults to each host's `packages` data)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub packages: Vec<String>,

    /// Ensure packages are absent instead of present
    #[arg(long)]
    pub absent: bool,

    /// Install command prefix
    #[arg(long)]
    pub install: String,

    /// Uninstall command prefix
    #[arg(long)]
    pub uninstall: String,

    /// Upgrade command prefix (required with --latest)
    #[arg(long)]
    pub upgrade: Option<String>,

    /// Upgrade present packages that have no pinned version
    #[arg(long)]
    pub latest: bool,

    /// Separator between package name and version (e.g. "=")
    #[arg(long)]
    pub version_join: Option<String>,

    /// Keep package name case as written
    #[arg(long)]
    pub no_lower: bool,

    /// Facts file: host -> { package -> version }
    #[arg(long)]
    pub facts: Option<String>,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}
