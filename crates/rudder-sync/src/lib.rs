//! Synchronize directives, groups and rules between two configuration APIs.
//!
//! A run reads every collection from a `source` and a `dest` profile, diffs
//! them by object `id`, and issues create, update and delete calls so the
//! destination matches the source.
//!
//! ```ignore
//! use rudder_sync::{Reconciler, SyncConfig, config};
//!
//! let file = config::load_file(None)?;
//! let cfg = SyncConfig::resolve(file, &Default::default())?;
//! let report = Reconciler::new(cfg)?.run().await;
//! println!("created {}", report.total_created());
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod mutate;
pub mod object;
pub mod output;
pub mod payload;
pub mod reconcile;
pub mod report;

pub use client::ApiClient;
pub use config::{Profile, ProfileName, SyncConfig, SyncSettings, UpdatePolicy};
pub use error::{ApiError, ApiResult, ConfigError, ObjectError};
pub use object::{ConfigObject, ObjectKind};
pub use reconcile::{Reconciler, find_missing, plan};
pub use report::SyncReport;
