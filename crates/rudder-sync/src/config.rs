use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_ROOT_CATEGORY: &str = "GroupRoot";

/// Which side of the sync a profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProfileName {
    Source,
    Dest,
}

impl ProfileName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Dest => "dest",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How source objects that already exist in the destination are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Report only; never call the API.
    Skip,
    /// Re-submit every existing object in full.
    Always,
    /// Re-submit only when the prepared payloads differ.
    #[default]
    Changed,
}

impl UpdatePolicy {
    /// Name as written in the config file and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Always => "always",
            Self::Changed => "changed",
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    pub update_policy: UpdatePolicy,
    /// Create directives without `parameters` and add them with a follow-up
    /// update. Works around an API that rejects embedded parameters on create.
    pub directive_two_step_create: bool,
    pub group_root_category: String,
    pub accept_invalid_certs: bool,
    pub timeout_secs: u64,
    pub exclude_system: bool,
    #[serde(skip)]
    pub dry_run: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            update_policy: UpdatePolicy::default(),
            directive_two_step_create: true,
            group_root_category: DEFAULT_ROOT_CATEGORY.to_string(),
            accept_invalid_certs: true,
            timeout_secs: 30,
            exclude_system: false,
            dry_run: false,
        }
    }
}

impl SyncSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// On-disk layout of `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub source: ProfileConfig,
    #[serde(default)]
    pub dest: ProfileConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Values from flags or environment that win over the file.
#[derive(Debug, Default, Clone)]
pub struct ProfileOverrides {
    pub source_url: Option<String>,
    pub source_token: Option<String>,
    pub dest_url: Option<String>,
    pub dest_token: Option<String>,
}

/// An API endpoint plus the key sent with every request to it.
#[derive(Clone)]
pub struct Profile {
    pub name: ProfileName,
    pub base_url: String,
    token: String,
}

impl Profile {
    pub fn new(name: ProfileName, base_url: &str, token: impl Into<String>) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .finish()
    }
}

pub fn redact(token: &str) -> String {
    if token.chars().count() > 8 {
        format!("{}...", token.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source: Profile,
    pub dest: Profile,
    pub settings: SyncSettings,
}

impl SyncConfig {
    pub fn resolve(file: ConfigFile, overrides: &ProfileOverrides) -> Result<Self, ConfigError> {
        let source = resolve_profile(
            ProfileName::Source,
            file.source,
            overrides.source_url.as_deref(),
            overrides.source_token.as_deref(),
        )?;
        let dest = resolve_profile(
            ProfileName::Dest,
            file.dest,
            overrides.dest_url.as_deref(),
            overrides.dest_token.as_deref(),
        )?;
        if file.sync.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "timeout_secs",
                message: "must be at least 1 second".into(),
            });
        }
        Ok(Self {
            source,
            dest,
            settings: file.sync,
        })
    }

    pub fn profile(&self, name: ProfileName) -> &Profile {
        match name {
            ProfileName::Source => &self.source,
            ProfileName::Dest => &self.dest,
        }
    }
}

fn resolve_profile(
    name: ProfileName,
    file: ProfileConfig,
    url_override: Option<&str>,
    token_override: Option<&str>,
) -> Result<Profile, ConfigError> {
    let profile = name.as_str();
    let url = url_override
        .map(str::to_string)
        .or(file.url)
        .ok_or(ConfigError::MissingField {
            profile,
            field: "url",
        })?;
    let token = token_override
        .map(str::to_string)
        .or(file.token)
        .ok_or(ConfigError::MissingField {
            profile,
            field: "token",
        })?;
    url::Url::parse(&url).map_err(|source| ConfigError::InvalidUrl { profile, source })?;
    Ok(Profile::new(name, &url, token))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rudder-sync").join("config.toml"))
}

/// Load the config file. An explicit path must exist; a missing default file
/// yields an empty config so flags alone can drive a run.
pub fn load_file(explicit: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ConfigFile::default()),
        },
    };
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
