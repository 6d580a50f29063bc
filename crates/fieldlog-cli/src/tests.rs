use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use fieldlog_core::models::{FieldConflict, FieldValue, LogRecord, ReferenceKind};
use fieldlog_core::{LogId, LogStore};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{Cli, Commands, RefreshKind};
use crate::commands::common::{
    collect_conflicts, format_conflict_lines, format_relative_time, format_status_lines,
    format_sync_timestamp, load_store, resolve_state_path, resolve_sync_config_with, save_store,
    status_summary,
};
use crate::error::CliError;

fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key: &str| {
        pairs
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| (*value).to_string())
    }
}

fn log_with_conflict(local_id: &str, field: &str, detected_at: i64) -> LogRecord {
    LogRecord::builder()
        .id(LogId::from(local_id.trim_start_matches('L')))
        .local_id(local_id)
        .ready_to_sync(true)
        .field(field, FieldValue::stamped(json!("mine"), 600))
        .conflicts(vec![FieldConflict {
            field: field.to_string(),
            local: FieldValue::stamped(json!("mine"), 600),
            server: FieldValue::stamped(json!("theirs"), 550),
            detected_at,
        }])
        .build()
        .unwrap()
}

#[test]
fn resolve_state_path_prefers_explicit_flag() {
    let explicit = PathBuf::from("/tmp/fieldlog-explicit.json");
    assert_eq!(resolve_state_path(Some(explicit.clone())), explicit);
}

#[test]
fn sync_config_flags_override_environment() {
    let config = resolve_sync_config_with(
        Some("https://flag.example.com".to_string()),
        Some("flag-token".to_string()),
        0,
        lookup(&[
            ("FIELDLOG_HOST", "https://env.example.com"),
            ("FIELDLOG_TOKEN", "env-token"),
            ("FIELDLOG_SYNC_DATE", "123"),
        ]),
    )
    .unwrap();

    assert_eq!(config.host, "https://flag.example.com");
    assert_eq!(config.token(), Some("flag-token"));
    assert_eq!(config.sync_date, 123);
}

#[test]
fn sync_config_falls_back_to_environment_and_stored_cursor() {
    let config = resolve_sync_config_with(
        None,
        None,
        900,
        lookup(&[
            ("FIELDLOG_HOST", "https://env.example.com"),
            ("FIELDLOG_TOKEN", "env-token"),
            ("FIELDLOG_SYNC_DATE", "123"),
        ]),
    )
    .unwrap();

    assert_eq!(config.host, "https://env.example.com");
    assert_eq!(config.token(), Some("env-token"));
    assert_eq!(config.sync_date, 900);
}

#[test]
fn sync_config_without_host_is_not_configured() {
    let error = resolve_sync_config_with(None, None, 0, lookup(&[])).unwrap_err();
    assert!(matches!(error, CliError::SyncNotConfigured));
}

#[test]
fn sync_config_rejects_host_without_scheme() {
    let error = resolve_sync_config_with(
        Some("farm.example.com".to_string()),
        None,
        0,
        lookup(&[]),
    )
    .unwrap_err();
    assert!(matches!(error, CliError::Core(fieldlog_core::Error::Config(_))));
}

#[test]
fn load_store_missing_file_starts_empty() {
    let store = load_store(&unique_state_path()).unwrap();
    assert_eq!(store, LogStore::default());
}

#[test]
fn save_and_load_store_preserves_logs() {
    let path = unique_state_path();
    let mut store = LogStore::new(vec![log_with_conflict("L7", "title", 700)]);
    store.sync_date = 650;

    save_store(&path, &store).unwrap();
    let loaded = load_store(&path).unwrap();

    assert_eq!(loaded, store);
    let _ = std::fs::remove_file(path);
}

#[test]
fn load_store_reports_invalid_state() {
    let path = unique_state_path();
    std::fs::write(&path, "{ not json").unwrap();

    let error = load_store(&path).unwrap_err();
    assert!(matches!(error, CliError::InvalidState { .. }));
    let _ = std::fs::remove_file(path);
}

#[test]
fn collect_conflicts_orders_newest_first_and_limits() {
    let store = LogStore::new(vec![
        log_with_conflict("L1", "title", 100),
        log_with_conflict("L2", "notes", 300),
        log_with_conflict("L3", "quantity", 200),
    ]);

    let conflicts = collect_conflicts(&store, 2);
    let fields: Vec<&str> = conflicts
        .iter()
        .map(|(_, conflict)| conflict.field.as_str())
        .collect();
    assert_eq!(fields, vec!["notes", "quantity"]);
}

#[test]
fn format_conflict_lines_include_key_fields() {
    let store = LogStore::new(vec![log_with_conflict("L5", "title", 0)]);
    let rendered = format_conflict_lines(&collect_conflicts(&store, 10));

    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].starts_with("1970-01-01 00:00:00 UTC"));
    assert!(rendered[0].contains("log=5"));
    assert!(rendered[0].contains("field=title"));
    assert!(rendered[0].contains(r#"local="mine" server="theirs""#));
}

#[test]
fn status_lines_for_fresh_store() {
    let summary = status_summary(&LogStore::default());
    let lines = format_status_lines(&summary, 1_000);

    assert!(lines.contains(&"Logs:       0".to_string()));
    assert!(lines.contains(&"Last sync:  never".to_string()));
}

#[test]
fn status_summary_counts_failed_and_pending() {
    let failed = log_with_conflict("L1", "title", 1).with_ready_to_sync(false);
    let pending = log_with_conflict("L2", "title", 2);
    let summary = status_summary(&LogStore::new(vec![failed, pending]));

    assert_eq!(summary.pending, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.conflicts, 2);
}

#[test]
fn format_sync_timestamp_returns_utc_label() {
    assert_eq!(format_sync_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn format_relative_time_units() {
    let now = 1_000_000;
    assert_eq!(format_relative_time(now - 30, now), "just now");
    assert_eq!(format_relative_time(now - 120, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60, now), "2h ago");
}

#[test]
fn cli_parses_refresh_kind_and_global_flags() {
    let cli = Cli::try_parse_from([
        "fieldlog",
        "refresh",
        "equipment",
        "--host",
        "https://farm.example.com",
    ])
    .unwrap();

    assert_eq!(cli.host.as_deref(), Some("https://farm.example.com"));
    let Commands::Refresh { kind: Some(kind) } = cli.command else {
        panic!("expected refresh command");
    };
    assert_eq!(ReferenceKind::from(kind), ReferenceKind::Equipment);
    assert_eq!(kind, RefreshKind::Equipment);
}

fn unique_state_path() -> PathBuf {
    static NEXT_STATE_ID: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let sequence = NEXT_STATE_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("fieldlog-cli-test-{timestamp}-{sequence}.json"))
}
