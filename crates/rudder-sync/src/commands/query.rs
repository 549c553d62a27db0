use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config::{ProfileName, SyncConfig};
use crate::output::{print_collection, print_json};

fn client(config: &SyncConfig, profile: ProfileName) -> Result<ApiClient> {
    ApiClient::new(config.profile(profile).clone(), &config.settings)
        .context("Failed to build HTTP client")
}

pub async fn list(
    config: &SyncConfig,
    profile: ProfileName,
    object_type: &str,
    format: OutputFormat,
) -> Result<()> {
    let objects = client(config, profile)?
        .list_type(object_type)
        .await
        .with_context(|| format!("Cannot list {object_type} on {profile}"))?;
    print_collection(&objects, format);
    Ok(())
}

pub async fn get_directive(config: &SyncConfig, profile: ProfileName, id: &str) -> Result<()> {
    let directive = client(config, profile)?
        .get_directive(id)
        .await
        .with_context(|| format!("Cannot read directive {id} on {profile}"))?;
    print_json(&directive);
    Ok(())
}
