use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use crate::reconcile::KindPlan;
use crate::report::SyncReport;

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => print_error(&format!("Cannot render JSON: {e}")),
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Raw collection entries: id and display name.
pub fn print_collection(objects: &[Value], format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        print_json(objects);
        return;
    }
    if objects.is_empty() {
        println!("No objects found.");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Enabled"]);
    for obj in objects {
        let id = obj.get("id").and_then(Value::as_str).unwrap_or("-");
        let name = obj
            .get("displayName")
            .or_else(|| obj.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("-");
        let enabled = obj
            .get("enabled")
            .and_then(Value::as_bool)
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([id, name, enabled.as_str()]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    println!("Total: {}", objects.len());
}

pub fn print_plans(plans: &[KindPlan<'_>], format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        let rendered: Vec<Value> = plans
            .iter()
            .map(|p| {
                serde_json::json!({
                    "kind": p.kind,
                    "create": p.creates().map(|o| o.id()).collect::<Vec<_>>(),
                    "update": p.updates().map(|o| o.id()).collect::<Vec<_>>(),
                    "delete": p.delete.iter().map(|o| o.id()).collect::<Vec<_>>(),
                })
            })
            .collect();
        print_json(&rendered);
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Type", "Action", "ID", "Name"]);
    for plan in plans {
        let kind = plan.kind.to_string();
        let rows = plan
            .creates()
            .map(|o| ("create", o))
            .chain(plan.updates().map(|o| ("update", o)))
            .chain(plan.delete.iter().map(|o| ("delete", *o)));
        for (action, obj) in rows {
            builder.push_record([
                kind.as_str(),
                action,
                obj.id(),
                obj.display_name().unwrap_or("-"),
            ]);
        }
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub fn print_report(report: &SyncReport, format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        print_json(report);
        return;
    }

    let mut builder = Builder::default();
    builder.push_record([
        "Type",
        "Created",
        "Updated",
        "Unchanged",
        "Not updated",
        "Deleted",
        "Not deleted",
        "Failed",
    ]);
    for (kind, stats) in &report.kinds {
        if stats.unavailable {
            let mut row = vec![kind.to_string(), "unavailable".to_string()];
            row.resize(8, "-".to_string());
            builder.push_record(row);
            continue;
        }
        builder.push_record([
            kind.to_string(),
            stats.created.to_string(),
            stats.updated.to_string(),
            stats.unchanged.to_string(),
            stats.update_skipped.to_string(),
            stats.deleted.to_string(),
            stats.delete_skipped.to_string(),
            stats.failed.to_string(),
        ]);
    }
    if report.dry_run {
        print_warning("Dry run: no changes were made");
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");

    for failure in &report.failures {
        print_error(&format!(
            "{} {} {}: {}",
            failure.action,
            failure.kind,
            failure.id.as_deref().unwrap_or("(collection)"),
            failure.error
        ));
    }
}
