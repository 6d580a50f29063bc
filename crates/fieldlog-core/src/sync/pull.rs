//! Pull phase: bring server changes into local state.

use crate::config::LogFilters;
use crate::error::Result;
use crate::models::{LogRecord, Timestamp};
use crate::store::{RecordUpdate, StoreIntent};
use crate::transport::SyncTransport;
use crate::util::unix_timestamp_now;

use super::conflict::{classify, merge_at, LocalIndex};

/// Outcome of one pull.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullReport {
    /// Intents in server response order
    pub intents: Vec<StoreIntent>,
    pub fetched: usize,
    pub updated: usize,
    pub appended: usize,
    /// Server logs that produced no intent
    pub unchanged: usize,
    /// Fields kept locally while the server disagreed
    pub conflicts: usize,
}

/// Fetch the server's log set and merge it against `locals`.
///
/// A failed fetch is returned as-is and produces no intents.
pub async fn pull(
    transport: &dyn SyncTransport,
    filters: &LogFilters,
    locals: &[LogRecord],
    sync_date: Timestamp,
) -> Result<PullReport> {
    let local_index = LocalIndex::build(locals)?;
    let server_logs = transport.fetch_logs(filters).await?;
    let now = unix_timestamp_now();

    let mut report = PullReport {
        fetched: server_logs.len(),
        ..PullReport::default()
    };

    for server in &server_logs {
        let status = classify(server, locals, &local_index, sync_date);
        let emitted = report.intents.len();

        if status.server_change {
            if let Some(index) = status.store_index {
                let merged = merge_at(server, &status, sync_date, now)?;
                report.conflicts += merged.conflicts().len();
                report.updated += 1;
                report.intents.push(StoreIntent::UpdateRecord {
                    index,
                    update: RecordUpdate::Replace(merged),
                });
            }
        }

        if status.local_id.is_none() {
            let merged = merge_at(server, &status, sync_date, now)?;
            report.appended += 1;
            report.intents.push(StoreIntent::AppendRecord(merged));
        }

        if report.intents.len() == emitted {
            report.unchanged += 1;
        }
    }

    tracing::info!(
        fetched = report.fetched,
        updated = report.updated,
        appended = report.appended,
        unchanged = report.unchanged,
        conflicts = report.conflicts,
        "Pulled logs from server"
    );
    Ok(report)
}
