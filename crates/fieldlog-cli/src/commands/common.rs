use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fieldlog_core::config::{HOST_ENV, TOKEN_ENV};
use fieldlog_core::models::{FieldConflict, LogRecord, Timestamp};
use fieldlog_core::util::normalize_text_option;
use fieldlog_core::{HttpTransport, LogStore, SyncConfig, Synchronizer};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

const STATE_PATH_ENV: &str = "FIELDLOG_STATE_PATH";

#[derive(Debug, Serialize)]
pub struct ConflictItem {
    pub local_id: String,
    pub log_id: Option<String>,
    pub log_name: String,
    pub field: String,
    pub local: Value,
    pub server: Value,
    pub detected_at: i64,
    pub detected_at_iso: String,
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub logs: usize,
    pub pending: usize,
    pub failed: usize,
    pub conflicts: usize,
    pub errors: usize,
    pub sync_date: i64,
    pub route: Option<String>,
}

pub fn resolve_state_path(cli_state_path: Option<PathBuf>) -> PathBuf {
    cli_state_path
        .or_else(|| env::var_os(STATE_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(default_state_path)
}

pub fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fieldlog")
        .join("state.json")
}

/// Load the local store, starting empty when no state file exists yet.
pub fn load_store(path: &Path) -> Result<LogStore, CliError> {
    if !path.exists() {
        return Ok(LogStore::default());
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|error| CliError::InvalidState {
        path: path.display().to_string(),
        reason: error.to_string(),
    })
}

/// Write the store through a temporary file so a crash never truncates it.
pub fn save_store(path: &Path, store: &LogStore) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, serde_json::to_string_pretty(store)?)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

pub fn resolve_sync_config(
    host: Option<String>,
    token: Option<String>,
    sync_date: Timestamp,
) -> Result<SyncConfig, CliError> {
    resolve_sync_config_with(host, token, sync_date, |key| env::var(key).ok())
}

/// Flags win over the environment; a non-zero stored cursor wins over
/// `FIELDLOG_SYNC_DATE`.
pub fn resolve_sync_config_with(
    host: Option<String>,
    token: Option<String>,
    sync_date: Timestamp,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SyncConfig, CliError> {
    let host = normalize_text_option(host)
        .or_else(|| normalize_text_option(lookup(HOST_ENV)))
        .ok_or(CliError::SyncNotConfigured)?;
    let token = normalize_text_option(token);

    let config = SyncConfig::from_lookup(|key| match key {
        HOST_ENV => Some(host.clone()),
        TOKEN_ENV => token.clone().or_else(|| lookup(key)),
        _ => lookup(key),
    })?;

    Ok(if sync_date > 0 {
        config.with_sync_date(sync_date)
    } else {
        config
    })
}

pub fn open_synchronizer(config: &SyncConfig) -> Result<Synchronizer, CliError> {
    let transport = HttpTransport::new(config.host.as_str())?;
    Ok(Synchronizer::new(Arc::new(transport)))
}

/// Conflicts across all logs, newest first.
pub fn collect_conflicts(store: &LogStore, limit: usize) -> Vec<(&LogRecord, &FieldConflict)> {
    let mut conflicts: Vec<(&LogRecord, &FieldConflict)> = store
        .logs
        .iter()
        .flat_map(|log| log.conflicts().iter().map(move |conflict| (log, conflict)))
        .collect();
    conflicts.sort_by(|(_, a), (_, b)| b.detected_at.cmp(&a.detected_at));
    conflicts.truncate(limit);
    conflicts
}

pub fn conflict_to_item(log: &LogRecord, conflict: &FieldConflict) -> ConflictItem {
    ConflictItem {
        local_id: log.local_id().to_string(),
        log_id: log.id().map(ToString::to_string),
        log_name: log.name(),
        field: conflict.field.clone(),
        local: conflict.local.data.clone(),
        server: conflict.server.data.clone(),
        detected_at: conflict.detected_at,
        detected_at_iso: format_sync_timestamp(conflict.detected_at),
    }
}

pub fn format_conflict_lines(conflicts: &[(&LogRecord, &FieldConflict)]) -> Vec<String> {
    conflicts
        .iter()
        .map(|(log, conflict)| {
            format!(
                "{}  log={}  field={}  local={} server={}",
                format_sync_timestamp(conflict.detected_at),
                log.id().map_or_else(|| log.local_id().to_string(), ToString::to_string),
                conflict.field,
                conflict.local.data,
                conflict.server.data
            )
        })
        .collect()
}

pub fn status_summary(store: &LogStore) -> StatusSummary {
    StatusSummary {
        logs: store.logs.len(),
        pending: store.pending_indices().len(),
        failed: store
            .logs
            .iter()
            .filter(|log| !log.was_pushed_to_server() && !log.is_ready_to_sync())
            .count(),
        conflicts: store.logs.iter().map(|log| log.conflicts().len()).sum(),
        errors: store.errors.len(),
        sync_date: store.sync_date,
        route: store.route.clone(),
    }
}

pub fn format_status_lines(summary: &StatusSummary, now: Timestamp) -> Vec<String> {
    let last_sync = if summary.sync_date > 0 {
        format!(
            "{} ({})",
            format_sync_timestamp(summary.sync_date),
            format_relative_time(summary.sync_date, now)
        )
    } else {
        "never".to_string()
    };

    let mut lines = vec![
        format!("Logs:       {}", summary.logs),
        format!("Pending:    {}", summary.pending),
        format!("Failed:     {}", summary.failed),
        format!("Conflicts:  {}", summary.conflicts),
        format!("Last sync:  {last_sync}"),
    ];
    if summary.errors > 0 {
        lines.push(format!("Errors:     {}", summary.errors));
    }
    if let Some(route) = &summary.route {
        lines.push(format!("Action:     open {route}"));
    }
    lines
}

pub fn format_sync_timestamp(timestamp: Timestamp) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0).map_or_else(
        || timestamp.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp: Timestamp, now: Timestamp) -> String {
    let diff = now.saturating_sub(timestamp);
    let minute = 60;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

/// Print errors queued by the last run, then drop them from the store.
pub fn drain_errors(store: &mut LogStore) {
    for payload in store.errors.drain(..) {
        if payload.show {
            eprintln!("{}", payload.message);
        }
    }
}
