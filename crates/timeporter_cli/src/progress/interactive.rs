//! Animated progress bars for interactive terminals.

use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use timeporter::sync::SyncProgress;

/// Renders sync progress as indicatif bars.
///
/// One spinner tracks fetching, one bar tracks the current transfer batch.
/// Warnings and per-record errors are printed above the bars so they stay
/// visible after the bars complete.
pub struct InteractiveReporter {
    multi: MultiProgress,
    fetch: Mutex<Option<ProgressBar>>,
    transfer: Mutex<Option<ProgressBar>>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            fetch: Mutex::new(None),
            transfer: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{bar:30.cyan/dim} {pos}/{len} {msg}")
            .expect("valid template")
    }

    fn fetch_bar(&self) -> ProgressBar {
        let mut guard = self.fetch.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .get_or_insert_with(|| {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(Self::spinner_style());
                bar.enable_steady_tick(std::time::Duration::from_millis(120));
                bar
            })
            .clone()
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::FetchingRecords { tool, group, .. } => {
                self.fetch_bar().set_message(format!("fetching {group} from {tool}"));
            }
            SyncProgress::FetchedPage {
                tool,
                group,
                page,
                total_so_far,
                ..
            } => {
                self.fetch_bar().set_message(format!(
                    "fetching {group} from {tool} (page {page}, {total_so_far} so far)"
                ));
            }
            SyncProgress::FetchComplete {
                tool, group, total, ..
            } => {
                self.fetch_bar()
                    .set_message(format!("{total} {group} fetched from {tool}"));
            }
            SyncProgress::LinkComplete {
                group,
                matched,
                to_transfer,
            } => {
                self.multi.println(format!(
                    "  {group}: {matched} matched, {to_transfer} to create"
                ))
                .ok();
            }
            SyncProgress::WorkspaceEnsured { name, created } => {
                let what = if created { "created" } else { "found" };
                self.multi
                    .println(format!("workspace {name:?} {what} in Clockify"))
                    .ok();
            }
            SyncProgress::TransferringRecords { group, count, .. } => {
                let mut guard = self.transfer.lock().unwrap_or_else(|e| e.into_inner());
                let bar = self.multi.add(ProgressBar::new(count as u64));
                bar.set_style(Self::bar_style());
                bar.set_message(format!("creating {group}"));
                *guard = Some(bar);
            }
            SyncProgress::TransferringRecord { name, .. } => {
                let guard = self.transfer.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(bar) = guard.as_ref() {
                    bar.set_message(name);
                    bar.inc(1);
                }
            }
            SyncProgress::TransferFailed { name, error, .. } => {
                self.multi
                    .println(format!("  ✗ {name}: {error}"))
                    .ok();
            }
            SyncProgress::TransferComplete { group, created, errors } => {
                let mut guard = self.transfer.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(bar) = guard.take() {
                    bar.finish_and_clear();
                }
                if created > 0 || errors > 0 {
                    self.multi
                        .println(format!("  {group}: {created} created, {errors} failed"))
                        .ok();
                }
            }
            SyncProgress::RateLimitBackoff {
                label,
                retry_after_ms,
                attempt,
            } => {
                self.fetch_bar().set_message(format!(
                    "rate limited on {label}; retrying in {retry_after_ms}ms (attempt {attempt})"
                ));
            }
            SyncProgress::SyncingWorkspaces { count } => {
                self.multi
                    .println(format!("syncing {count} workspace(s)"))
                    .ok();
            }
            SyncProgress::SyncComplete {
                workspaces,
                created,
                errors,
            } => {
                self.clear();
                println!(
                    "done: {workspaces} workspace(s), {created} record(s) created, {errors} error(s)"
                );
            }
            SyncProgress::Warning { message } => {
                self.multi.println(format!("  ! {message}")).ok();
            }
            _ => {}
        }
    }

    pub fn clear(&self) {
        if let Some(bar) = self
            .fetch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            bar.finish_and_clear();
        }
        if let Some(bar) = self
            .transfer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            bar.finish_and_clear();
        }
    }
}
