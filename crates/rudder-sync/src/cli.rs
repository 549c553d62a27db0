use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{ProfileName, ProfileOverrides, UpdatePolicy};

#[derive(Parser)]
#[command(name = "rudder-sync")]
#[command(about = "Synchronize directives, groups and rules between two Rudder servers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.toml (defaults to ~/.rudder-sync/config.toml)
    #[arg(short, long, global = true, env = "RUDDER_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Source API base URL (overrides config)
    #[arg(long, global = true, env = "RUDDER_SYNC_SOURCE_URL")]
    pub source_url: Option<String>,

    /// Source API token (overrides config)
    #[arg(long, global = true, env = "RUDDER_SYNC_SOURCE_TOKEN", hide_env_values = true)]
    pub source_token: Option<String>,

    /// Destination API base URL (overrides config)
    #[arg(long, global = true, env = "RUDDER_SYNC_DEST_URL")]
    pub dest_url: Option<String>,

    /// Destination API token (overrides config)
    #[arg(long, global = true, env = "RUDDER_SYNC_DEST_TOKEN", hide_env_values = true)]
    pub dest_token: Option<String>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "RUDDER_SYNC_LOG", default_value = "info")]
    pub log_level: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

impl Cli {
    pub fn overrides(&self) -> ProfileOverrides {
        ProfileOverrides {
            source_url: self.source_url.clone(),
            source_token: self.source_token.clone(),
            dest_url: self.dest_url.clone(),
            dest_token: self.dest_token.clone(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile the destination toward the source
    Sync(SyncArgs),
    /// Show what a sync would create, update and delete
    Diff,
    /// List one collection
    List(ListArgs),
    /// Show a single directive
    GetDirective(GetDirectiveArgs),
    /// Inspect the resolved configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct SyncArgs {
    /// Log the calls instead of issuing them
    #[arg(long)]
    pub dry_run: bool,
    /// How to handle objects that already exist in the destination
    #[arg(long)]
    pub update_policy: Option<UpdatePolicy>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Collection name (e.g. directives, groups, rules)
    pub object_type: String,
    /// Which server to read from
    #[arg(long, default_value = "source")]
    pub profile: ProfileName,
}

#[derive(clap::Args)]
pub struct GetDirectiveArgs {
    /// Directive id
    pub id: String,
    /// Which server to read from
    #[arg(long, default_value = "source")]
    pub profile: ProfileName,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show resolved config (tokens redacted)
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sync_flags() {
        let cli = Cli::try_parse_from([
            "rudder-sync",
            "sync",
            "--dry-run",
            "--update-policy",
            "always",
            "--dest-url",
            "https://target/rudder/api/latest",
        ])
        .unwrap();
        match cli.command {
            Commands::Sync(args) => {
                assert!(args.dry_run);
                assert_eq!(args.update_policy, Some(UpdatePolicy::Always));
            }
            _ => panic!("expected sync"),
        }
        assert_eq!(
            cli.dest_url.as_deref(),
            Some("https://target/rudder/api/latest")
        );
    }

    #[test]
    fn list_defaults_to_source_profile() {
        let cli = Cli::try_parse_from(["rudder-sync", "list", "groups"]).unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.object_type, "groups");
                assert_eq!(args.profile, ProfileName::Source);
            }
            _ => panic!("expected list"),
        }
    }
}
