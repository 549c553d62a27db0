use anyhow::{Context, Result};
use clap::Parser;

use rudder_sync::cli::{Cli, Commands, ConfigCommands};
use rudder_sync::config::{self, SyncConfig};
use rudder_sync::output::print_error;
use rudder_sync::{commands, logging};

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but some API call failed.
async fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init_tracing_with_level(&cli.log_level);
    let format = cli.format.unwrap_or_default();

    let file = config::load_file(cli.config.as_deref()).context("Failed to load config")?;
    let cfg = SyncConfig::resolve(file, &cli.overrides()).context("Invalid configuration")?;

    match &cli.command {
        Commands::Sync(args) => {
            let report = commands::sync::sync(cfg, args, format).await?;
            Ok(!report.has_failures())
        }
        Commands::Diff => commands::sync::diff(cfg, format).await,
        Commands::List(args) => {
            commands::query::list(&cfg, args.profile, &args.object_type, format).await?;
            Ok(true)
        }
        Commands::GetDirective(args) => {
            commands::query::get_directive(&cfg, args.profile, &args.id).await?;
            Ok(true)
        }
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                commands::config::show(&cfg);
                Ok(true)
            }
        },
    }
}
