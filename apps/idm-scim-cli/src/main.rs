//! idm-scim - manual test tool for the SCIM client and plugin
//!
//! - `client` runs a single lookup against a SCIM service provider
//! - `plugin` configures the identity-management plugin from a YAML file and
//!   runs one resolution operation

use clap::{Parser, Subcommand};
use idm_scim_cli::commands;
use idm_scim_cli::error::CliResult;
use idm_scim_cli::logging::init_logging;

/// SCIM client and identity-management plugin test tool
#[derive(Parser)]
#[command(name = "idm-scim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call the SCIM API directly
    Client(commands::client::ClientArgs),

    /// Run a resolution operation through the plugin
    Plugin(commands::plugin::PluginArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Client(args) => commands::client::execute(args).await,
        Commands::Plugin(args) => commands::plugin::execute(args).await,
    }
}
