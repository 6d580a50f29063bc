//! Push phase: upload locally pending logs.
//!
//! Every pending log is sent independently. Sends run concurrently and the
//! phase completes once all of them have, returning one outcome per index in
//! the order the indices were given.

use futures::future::join_all;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::models::{Image, LogRecord, IMAGES_FIELD};
use crate::store::{RecordUpdate, StoreIntent};
use crate::transport::{SendAck, SyncTransport, WireLog};

use super::classify::{classify, ClassifiedError};

/// What happened to one requested index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Already on the server; nothing was sent
    Skipped,
    /// No local log at this index
    Missing,
    Sent(SendAck),
    Failed(ClassifiedError),
}

/// Outcome and resulting intents for one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPush {
    pub index: usize,
    pub outcome: PushOutcome,
    pub intents: Vec<StoreIntent>,
}

/// Aggregate result of a push phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub records: Vec<RecordPush>,
}

impl PushReport {
    pub fn intents(&self) -> impl Iterator<Item = &StoreIntent> {
        self.records.iter().flat_map(|record| record.intents.iter())
    }

    pub fn into_intents(self) -> Vec<StoreIntent> {
        self.records
            .into_iter()
            .flat_map(|record| record.intents)
            .collect()
    }

    pub fn sent(&self) -> usize {
        self.count(|outcome| matches!(outcome, PushOutcome::Sent(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, PushOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, PushOutcome::Skipped | PushOutcome::Missing))
    }

    fn count(&self, predicate: impl Fn(&PushOutcome) -> bool) -> usize {
        self.records
            .iter()
            .filter(|record| predicate(&record.outcome))
            .count()
    }
}

/// Convert a local log into the shape the server accepts.
///
/// Field values are flattened to their data, string image entries are split
/// into inline payloads and `{"fid": ..}` references, and `done` becomes
/// `0`/`1`.
pub fn to_wire(record: &LogRecord) -> WireLog {
    let fields: Map<String, Value> = record
        .fields()
        .iter()
        .map(|(name, value)| {
            let data = if name == IMAGES_FIELD {
                wire_images(&value.data)
            } else {
                value.data.clone()
            };
            (name.clone(), data)
        })
        .collect();

    WireLog {
        id: record.id().cloned(),
        done: u8::from(record.done().data),
        fields,
    }
}

fn wire_images(images: &Value) -> Value {
    match images {
        Value::Array(entries) => Value::Array(
            entries
                .iter()
                .map(|entry| match entry {
                    Value::String(raw) => Image::parse(raw).to_wire(),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Send the logs at `indices` that are not on the server yet.
///
/// Without a usable `auth_token` nothing is sent and
/// [`Error::AuthenticationRequired`] is returned. Individual send failures
/// never fail the phase; they are classified and reported per index.
pub async fn push(
    transport: &dyn SyncTransport,
    locals: &[LogRecord],
    indices: &[usize],
    auth_token: Option<&str>,
) -> Result<PushReport> {
    let token = auth_token
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(Error::AuthenticationRequired)?;

    let sends = indices
        .iter()
        .map(|&index| push_one(transport, index, locals.get(index), token));
    let records = join_all(sends).await;
    let report = PushReport { records };

    tracing::info!(
        sent = report.sent(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Pushed logs to server"
    );
    Ok(report)
}

async fn push_one(
    transport: &dyn SyncTransport,
    index: usize,
    record: Option<&LogRecord>,
    token: &str,
) -> RecordPush {
    let Some(record) = record else {
        tracing::warn!(index, "No local log to push at index");
        return RecordPush {
            index,
            outcome: PushOutcome::Missing,
            intents: Vec::new(),
        };
    };

    if record.was_pushed_to_server() {
        return RecordPush {
            index,
            outcome: PushOutcome::Skipped,
            intents: Vec::new(),
        };
    }

    let wire = to_wire(record);
    match transport.send_log(&wire, token).await {
        Ok(ack) => {
            tracing::debug!(index, id = %ack.id, "Log accepted by server");
            let update = RecordUpdate::MarkPushed {
                id: ack.id.clone(),
                remote_uri: ack.uri.clone(),
            };
            RecordPush {
                index,
                outcome: PushOutcome::Sent(ack),
                intents: vec![StoreIntent::UpdateRecord { index, update }],
            }
        }
        Err(failure) => {
            let classified = classify(&failure, &record.name());
            tracing::warn!(
                index,
                status = ?failure.status,
                kind = ?classified.kind(),
                "Failed to send log"
            );
            RecordPush {
                index,
                intents: vec![
                    classified.to_intent(),
                    StoreIntent::UpdateRecord {
                        index,
                        update: RecordUpdate::ClearReadyToSync,
                    },
                ],
                outcome: PushOutcome::Failed(classified),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_to_wire_splits_images_and_coerces_done() {
        let record = LogRecord::builder()
            .local_id("L1")
            .id("5")
            .done(FieldValue::stamped(true, 10))
            .field("name", FieldValue::stamped(json!("Harvest"), 10))
            .field(
                IMAGES_FIELD,
                FieldValue::stamped(json!(["data:image/jpeg;base64,/9j/", "31", {"fid": "8"}]), 10),
            )
            .build()
            .unwrap();

        let wire = serde_json::to_value(to_wire(&record)).unwrap();
        assert_eq!(
            wire,
            json!({
                "id": "5",
                "done": 1,
                "name": "Harvest",
                "images": ["data:image/jpeg;base64,/9j/", { "fid": "31" }, { "fid": "8" }]
            })
        );
    }

    #[test]
    fn test_to_wire_not_done_is_zero() {
        let record = LogRecord::new_local().build().unwrap();
        let wire = to_wire(&record);
        assert_eq!(wire.done, 0);
        assert_eq!(wire.id, None);
    }

    #[test]
    fn test_report_counts() {
        let report = PushReport {
            records: vec![
                RecordPush {
                    index: 0,
                    outcome: PushOutcome::Skipped,
                    intents: Vec::new(),
                },
                RecordPush {
                    index: 1,
                    outcome: PushOutcome::Missing,
                    intents: Vec::new(),
                },
            ],
        };
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.sent(), 0);
        assert_eq!(report.intents().count(), 0);
    }
}
