//! Field-level conflict resolution between server logs and local logs.
//!
//! [`classify`] correlates a server log with the local collection and
//! [`merge`] decides what the local copy becomes. Both are pure; the only
//! outside input is the clock used to re-stamp `done`, which [`merge_at`]
//! takes explicitly.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{FieldConflict, FieldValue, LocalId, LogId, LogRecord, ServerLog, Timestamp};
use crate::util::unix_timestamp_now;

/// Unique `id -> position` index over the local collection.
#[derive(Debug, Clone, Default)]
pub struct LocalIndex {
    by_id: HashMap<LogId, usize>,
}

impl LocalIndex {
    /// Index every local log that has a server id.
    ///
    /// Fails with [`Error::DuplicateLogId`] when two local logs share an id.
    pub fn build(locals: &[LogRecord]) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(locals.len());
        for (position, log) in locals.iter().enumerate() {
            let Some(id) = log.id() else {
                continue;
            };
            if by_id.insert(id.clone(), position).is_some() {
                return Err(Error::DuplicateLogId(id.clone()));
            }
        }
        Ok(Self { by_id })
    }

    pub fn position(&self, id: &LogId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// How a server log relates to the local collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status<'a> {
    /// Local id of the matching local log; `None` when the log is unknown locally
    pub local_id: Option<LocalId>,
    /// Position of the matching local log
    pub store_index: Option<usize>,
    /// The matching local log still has unpushed edits
    pub local_change: bool,
    /// The server log changed after the last sync
    pub server_change: bool,
    pub matched: Option<&'a LogRecord>,
}

/// Correlate `server` with the local collection.
pub fn classify<'a>(
    server: &ServerLog,
    locals: &'a [LogRecord],
    index: &LocalIndex,
    sync_date: Timestamp,
) -> Status<'a> {
    let matched = index
        .position(&server.id)
        .and_then(|position| locals.get(position).map(|log| (position, log)));

    let Some((position, local)) = matched else {
        return Status {
            local_id: None,
            store_index: None,
            local_change: true,
            server_change: false,
            matched: None,
        };
    };

    Status {
        local_id: Some(local.local_id().clone()),
        store_index: Some(position),
        local_change: !local.was_pushed_to_server(),
        server_change: server.changed > sync_date,
        matched: Some(local),
    }
}

/// Merge `server` into local state using the current wall clock.
pub fn merge(server: &ServerLog, status: &Status<'_>, sync_date: Timestamp) -> Result<LogRecord> {
    merge_at(server, status, sync_date, unix_timestamp_now())
}

/// Merge `server` into local state.
///
/// 1. Unknown locally: the server log is adopted as-is.
/// 2. Nothing pending locally: the server log is adopted, keeping the local id.
/// 3. Pending local edits: fields edited at or after `sync_date` keep their
///    local value (and record a [`FieldConflict`] when the server disagrees);
///    every other field takes the server value. The result is queued for push
///    again and `done` is taken from the server, stamped with `now`.
pub fn merge_at(
    server: &ServerLog,
    status: &Status<'_>,
    sync_date: Timestamp,
    now: Timestamp,
) -> Result<LogRecord> {
    let Some(local_id) = status.local_id.clone() else {
        tracing::debug!(id = %server.id, "adopting log unknown locally");
        return Ok(LogRecord::from_server(server, LocalId::generate()));
    };

    let local = match status.matched {
        Some(local) if status.local_change => local,
        matched => {
            tracing::debug!(id = %server.id, %local_id, "adopting server log over clean local copy");
            let remote_uri = matched.and_then(|log| log.remote_uri().map(ToString::to_string));
            return LogRecord::from_server(server, local_id)
                .to_builder()
                .remote_uri(remote_uri)
                .build();
        }
    };

    let from_server = LogRecord::from_server(server, local_id.clone());
    let mut fields = from_server.fields().clone();
    let mut conflicts = Vec::new();

    for (name, local_value) in local.fields() {
        if local_value.edited_since(sync_date) {
            if let Some(server_value) = from_server.field(name) {
                if server_value.data != local_value.data {
                    conflicts.push(FieldConflict {
                        field: name.clone(),
                        local: local_value.clone(),
                        server: server_value.clone(),
                        detected_at: now,
                    });
                }
            }
            fields.insert(name.clone(), local_value.clone());
        } else {
            // Stale or never stamped: the server value wins when there is one.
            fields
                .entry(name.clone())
                .or_insert_with(|| local_value.clone());
        }
    }

    tracing::debug!(
        id = %server.id,
        %local_id,
        conflicts = conflicts.len(),
        "three-way merged log with pending local edits"
    );

    LogRecord::builder()
        .id(server.id.clone())
        .local_id(local_id)
        .pushed(false)
        .ready_to_sync(true)
        .done(FieldValue::stamped(server.done, now))
        .fields(fields)
        .remote_uri(local.remote_uri().map(ToString::to_string))
        .conflicts(conflicts)
        .build()
}
