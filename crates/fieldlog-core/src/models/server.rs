//! Server log model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{de, LogId, Timestamp};

/// A log as the server returns it: flat attributes plus one record-level
/// `changed` time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLog {
    /// Server identifier
    pub id: LogId,
    /// Last server-side change (Unix seconds)
    #[serde(deserialize_with = "de::timestamp")]
    pub changed: Timestamp,
    /// Completion flag, normalized from `0`/`1`/`"0"`/`"1"`
    #[serde(default, deserialize_with = "de::flag")]
    pub done: bool,
    /// Every other attribute, untouched
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl ServerLog {
    pub fn new(id: impl Into<LogId>, changed: Timestamp) -> Self {
        Self {
            id: id.into(),
            changed,
            done: false,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    #[must_use]
    pub const fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_farmos_payload() {
        let log: ServerLog = serde_json::from_value(json!({
            "id": "12",
            "name": "Till field 3",
            "type": "farm_activity",
            "done": "1",
            "changed": "1555000000",
            "notes": { "value": "deep", "format": "farm_format" }
        }))
        .unwrap();

        assert_eq!(log.id, LogId::from("12"));
        assert_eq!(log.changed, 1_555_000_000);
        assert!(log.done);
        assert_eq!(log.fields.len(), 3);
        assert_eq!(log.fields["name"], json!("Till field 3"));
    }

    #[test]
    fn test_missing_done_means_not_done() {
        let log: ServerLog =
            serde_json::from_value(json!({ "id": 1, "changed": 10 })).unwrap();
        assert!(!log.done);
        assert!(log.fields.is_empty());
    }
}
