use std::path::Path;

use fieldlog_core::sync::{PullReport, PushReport, SyncReport};
use fieldlog_core::util::unix_timestamp_now;

use crate::commands::common::{
    drain_errors, load_store, open_synchronizer, resolve_sync_config, save_store,
};
use crate::error::CliError;

pub async fn run_sync(
    state_path: &Path,
    host: Option<String>,
    token: Option<String>,
) -> Result<(), CliError> {
    let mut store = load_store(state_path)?;
    let config = resolve_sync_config(host, token, store.sync_date)?;
    let synchronizer = open_synchronizer(&config)?;

    let report = synchronizer.sync_store(&mut store, &config).await?;
    drain_errors(&mut store);
    save_store(state_path, &store)?;

    println!("{}", format_sync_summary(&report));
    Ok(())
}

pub async fn run_pull(
    state_path: &Path,
    host: Option<String>,
    token: Option<String>,
) -> Result<(), CliError> {
    let mut store = load_store(state_path)?;
    let config = resolve_sync_config(host, token, store.sync_date)?;
    let synchronizer = open_synchronizer(&config)?;

    let started_at = unix_timestamp_now();
    let report = synchronizer.pull(&store.logs, &config).await?;
    store.apply_all(report.intents.clone())?;
    store.sync_date = started_at;
    save_store(state_path, &store)?;

    println!("{}", format_pull_summary(&report));
    Ok(())
}

pub async fn run_push(
    state_path: &Path,
    host: Option<String>,
    token: Option<String>,
    retry_failed: bool,
) -> Result<(), CliError> {
    let mut store = load_store(state_path)?;
    let config = resolve_sync_config(host, token, store.sync_date)?;
    let synchronizer = open_synchronizer(&config)?;

    if retry_failed {
        let rearmed = store.rearm_unsynced();
        tracing::info!(rearmed, "Re-queued failed logs");
    }

    let pending = store.pending_indices();
    if pending.is_empty() {
        println!("Nothing to push");
        return Ok(());
    }

    let report = synchronizer.push(&store.logs, &pending, &config).await?;
    store.apply_all(report.intents().cloned())?;
    drain_errors(&mut store);
    save_store(state_path, &store)?;

    println!("{}", format_push_summary(&report));
    Ok(())
}

pub fn format_pull_summary(report: &PullReport) -> String {
    format!(
        "Pulled {} logs: {} updated, {} new, {} conflicts",
        report.fetched, report.updated, report.appended, report.conflicts
    )
}

pub fn format_push_summary(report: &PushReport) -> String {
    format!(
        "Pushed {} logs: {} failed, {} skipped",
        report.sent(),
        report.failed(),
        report.skipped()
    )
}

pub fn format_sync_summary(report: &SyncReport) -> String {
    let push = match (&report.push, report.auth_required) {
        (Some(push), _) => format_push_summary(push),
        (None, true) => "Push skipped: log in again to push local logs".to_string(),
        (None, false) => "Push skipped".to_string(),
    };
    format!("{}\n{push}", format_pull_summary(&report.pull))
}
