//! Store mutation intents and the in-memory store that applies them.
//!
//! Sync phases never touch the collection they read. They describe each
//! change as a [`StoreIntent`] and the owner of the collection applies it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{LogId, LogRecord, ReferenceItem, ReferenceKind, Timestamp};

/// Route shown when the server rejects our credentials.
pub const LOGIN_ROUTE: &str = "/login";

/// Severity of a user-facing sync message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    Warning,
    Error,
}

/// User-facing error produced during sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    pub error_code: Option<String>,
    pub level: ErrorLevel,
    /// Whether the message should be surfaced to the user
    pub show: bool,
}

/// Change applied to one existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    /// Replace the record with a merged version from the pull phase
    Replace(LogRecord),
    /// Server accepted the record
    MarkPushed {
        id: LogId,
        remote_uri: Option<String>,
    },
    /// A send failed; the caller must re-arm the record before retrying
    ClearReadyToSync,
}

impl RecordUpdate {
    /// Apply the update to the current version of the record.
    #[must_use]
    pub fn apply(self, record: LogRecord) -> LogRecord {
        match self {
            Self::Replace(merged) => merged,
            Self::MarkPushed { id, remote_uri } => record.acknowledged(id, remote_uri),
            Self::ClearReadyToSync => record.with_ready_to_sync(false),
        }
    }
}

/// Mutation requested by a sync phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreIntent {
    /// Replace a whole reference collection
    ReplaceAll {
        kind: ReferenceKind,
        items: Vec<ReferenceItem>,
    },
    UpdateRecord {
        index: usize,
        update: RecordUpdate,
    },
    AppendRecord(LogRecord),
    ReportError(ErrorPayload),
    Navigate(String),
}

/// In-memory log collection plus the side channels intents write to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStore {
    #[serde(default)]
    pub logs: Vec<LogRecord>,
    #[serde(default)]
    pub reference: BTreeMap<ReferenceKind, Vec<ReferenceItem>>,
    #[serde(default)]
    pub errors: Vec<ErrorPayload>,
    #[serde(default)]
    pub route: Option<String>,
    /// Time of the last successful pull (Unix seconds)
    #[serde(default)]
    pub sync_date: Timestamp,
}

impl LogStore {
    pub fn new(logs: Vec<LogRecord>) -> Self {
        Self {
            logs,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, intent: StoreIntent) -> Result<()> {
        match intent {
            StoreIntent::ReplaceAll { kind, items } => {
                self.reference.insert(kind, items);
            }
            StoreIntent::UpdateRecord { index, update } => {
                let slot = self
                    .logs
                    .get_mut(index)
                    .ok_or(Error::IndexOutOfRange(index))?;
                *slot = update.apply(slot.clone());
            }
            StoreIntent::AppendRecord(record) => self.logs.push(record),
            StoreIntent::ReportError(payload) => {
                tracing::warn!("{}", payload.message);
                self.errors.push(payload);
            }
            StoreIntent::Navigate(route) => self.route = Some(route),
        }
        Ok(())
    }

    /// Apply intents in order, stopping at the first one that fails.
    pub fn apply_all(&mut self, intents: impl IntoIterator<Item = StoreIntent>) -> Result<()> {
        intents.into_iter().try_for_each(|intent| self.apply(intent))
    }

    /// Positions of records with local edits waiting for upload.
    pub fn pending_indices(&self) -> Vec<usize> {
        self.logs
            .iter()
            .enumerate()
            .filter(|(_, log)| log.is_ready_to_sync() && !log.was_pushed_to_server())
            .map(|(index, _)| index)
            .collect()
    }

    /// Re-arm records whose last send failed so the next push retries them.
    pub fn rearm_unsynced(&mut self) -> usize {
        let mut rearmed = 0;
        for log in &mut self.logs {
            if !log.was_pushed_to_server() && !log.is_ready_to_sync() {
                *log = log.clone().with_ready_to_sync(true);
                rearmed += 1;
            }
        }
        rearmed
    }
}
