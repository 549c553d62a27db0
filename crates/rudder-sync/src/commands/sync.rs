use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::{OutputFormat, SyncArgs};
use crate::config::SyncConfig;
use crate::output::{print_plans, print_report, print_success, print_warning};
use crate::reconcile::Reconciler;
use crate::report::SyncReport;

/// Run a full reconciliation and print the summary.
pub async fn sync(mut config: SyncConfig, args: &SyncArgs, format: OutputFormat) -> Result<SyncReport> {
    config.settings.dry_run = args.dry_run;
    if let Some(policy) = args.update_policy {
        config.settings.update_policy = policy;
    }
    println!(
        "Syncing {} -> {}",
        config.source.base_url.cyan(),
        config.dest.base_url.cyan()
    );

    let reconciler = Reconciler::new(config).context("Failed to build HTTP client")?;
    let report = reconciler.run().await;
    print_report(&report, format);
    if !report.has_failures() {
        print_success(&format!(
            "Created {}, updated {}, deleted {}",
            report.total_created(),
            report.total_updated(),
            report.total_deleted()
        ));
    }
    Ok(report)
}

/// Fetch both sides and print the plan without touching the destination.
pub async fn diff(config: SyncConfig, format: OutputFormat) -> Result<bool> {
    let reconciler = Reconciler::new(config).context("Failed to build HTTP client")?;
    let snapshot = reconciler.fetch().await;
    print_plans(&snapshot.plans(), format);
    for (kind, e) in &snapshot.unavailable {
        print_warning(&format!("{kind} skipped: {e}"));
    }
    Ok(snapshot.unavailable.is_empty())
}
