//! Time-stamped field value

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{de, Timestamp};

/// One attribute of a log whose edit time is tracked independently of the
/// record as a whole.
///
/// `changed` only ever moves forward and is set by whoever edits the value.
/// A value that was never stamped (`changed == None`) counts as stale
/// against any sync cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldValue<T = Value> {
    /// The attribute's value
    pub data: T,
    /// When the value was last edited (Unix seconds)
    #[serde(default, deserialize_with = "de::optional_timestamp")]
    pub changed: Option<Timestamp>,
}

impl<T> FieldValue<T> {
    /// A value edited at `changed`.
    pub const fn stamped(data: T, changed: Timestamp) -> Self {
        Self {
            data,
            changed: Some(changed),
        }
    }

    /// A value that has never been individually time-stamped.
    pub const fn unstamped(data: T) -> Self {
        Self {
            data,
            changed: None,
        }
    }

    /// True when the value was edited at or after `sync_date`.
    pub fn edited_since(&self, sync_date: Timestamp) -> bool {
        self.changed.is_some_and(|changed| changed >= sync_date)
    }
}
