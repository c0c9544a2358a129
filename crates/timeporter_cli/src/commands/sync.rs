//! The sync and status commands.
//!
//! `status` is a dry run of `sync`: same fetching and matching, no creates.

use std::sync::Arc;

use console::style;
use timeporter::CancelToken;
use timeporter::sync::{SyncOptions, SyncReport, sync_all};

use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::setup_shutdown_handler;

pub async fn run(
    config: &Config,
    workspaces: Vec<String>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = config.credentials();
    credentials.validate()?;

    let cancel = CancelToken::new();
    setup_shutdown_handler(cancel.clone());

    let (toggl, clockify) = super::build_clients(&credentials, &cancel)?;

    let workspaces = if workspaces.is_empty() {
        config.sync.workspaces.clone()
    } else {
        workspaces
    };
    let options = SyncOptions {
        workspaces,
        dry_run,
    };

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let report = sync_all(
        toggl.as_ref(),
        clockify.as_ref(),
        &options,
        &cancel,
        Some(&callback),
    )
    .await?;
    reporter.clear();

    print_report(&report, dry_run);

    if report.has_failed_workspaces() {
        return Err("one or more workspaces failed to sync".into());
    }
    Ok(())
}

fn print_report(report: &SyncReport, dry_run: bool) {
    for workspace in &report.workspaces {
        println!();
        if let Some(error) = &workspace.error {
            println!(
                "{} {}: {}",
                style("✗").red(),
                style(&workspace.workspace).bold(),
                error
            );
            continue;
        }

        println!("{} {}", style("●").green(), style(&workspace.workspace).bold());
        for (group, outcome) in &workspace.groups {
            if dry_run {
                println!(
                    "    {:<14} {} matched, {} would be created",
                    group.to_string(),
                    outcome.matched,
                    outcome.pending
                );
            } else {
                let errors = if outcome.errors.is_empty() {
                    String::new()
                } else {
                    format!(", {} failed", outcome.errors.len())
                };
                println!(
                    "    {:<14} {} matched, {} created{}",
                    group.to_string(),
                    outcome.matched,
                    outcome.created,
                    errors
                );
            }
            for error in &outcome.errors {
                println!(
                    "        {} {}: {}",
                    style("✗").red(),
                    error.name,
                    error.message
                );
            }
        }
    }
}
