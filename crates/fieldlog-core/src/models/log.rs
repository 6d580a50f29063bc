//! Log record model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::conflict::FieldConflict;
use super::server::ServerLog;
use super::{de, FieldValue};

/// Leading marker of an image that is still an inline file payload.
pub const INLINE_IMAGE_MARKER: &str = "data:";

/// Field holding the log's image list.
pub const IMAGES_FIELD: &str = "images";

/// Field holding the human-readable log name.
pub const NAME_FIELD: &str = "name";

/// Names that belong to the record itself and may not be used as fields.
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    "local_id",
    "done",
    "changed",
    "wasPushedToServer",
    "isReadyToSync",
    "was_pushed_to_server",
    "is_ready_to_sync",
    "remote_uri",
    "conflicts",
];

/// Server-assigned log identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogId(#[serde(deserialize_with = "de::id_string")] String);

impl LogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LogId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for LogId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Client-assigned identifier, stable for the record's whole local lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(String);

impl LocalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a new unique local id using UUID v7 (time-sortable)
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LocalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An entry of a log's image list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Image {
    /// File payload that has not been uploaded yet (`data:...`)
    Inline(String),
    /// Reference to a file the server already stores
    Reference(String),
}

impl Image {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(INLINE_IMAGE_MARKER) {
            Self::Inline(raw.to_string())
        } else {
            Self::Reference(raw.to_string())
        }
    }

    /// Wire form: inline payloads go verbatim, references as `{"fid": ..}`.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Inline(payload) => Value::String(payload.clone()),
            Self::Reference(fid) => serde_json::json!({ "fid": fid }),
        }
    }
}

/// A log as held by the local store.
///
/// Built through [`LogRecordBuilder`]; the record itself is immutable and
/// every state change produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLogRecord")]
pub struct LogRecord {
    id: Option<LogId>,
    local_id: LocalId,
    was_pushed_to_server: bool,
    is_ready_to_sync: bool,
    done: FieldValue<bool>,
    fields: BTreeMap<String, FieldValue>,
    remote_uri: Option<String>,
    conflicts: Vec<FieldConflict>,
}

impl LogRecord {
    pub fn builder() -> LogRecordBuilder {
        LogRecordBuilder::default()
    }

    /// Start a builder for a brand new, never-synced local log.
    pub fn new_local() -> LogRecordBuilder {
        Self::builder()
            .local_id(LocalId::generate())
            .ready_to_sync(true)
    }

    /// Convert a server log into local form, stamping every attribute with
    /// the server's `changed` time.
    pub fn from_server(server: &ServerLog, local_id: LocalId) -> Self {
        let fields = server
            .fields
            .iter()
            .filter(|(name, _)| is_valid_field_name(name))
            .map(|(name, data)| {
                (
                    name.clone(),
                    FieldValue::stamped(data.clone(), server.changed),
                )
            })
            .collect();

        Self {
            id: Some(server.id.clone()),
            local_id,
            was_pushed_to_server: true,
            is_ready_to_sync: false,
            done: FieldValue::stamped(server.done, server.changed),
            fields,
            remote_uri: None,
            conflicts: Vec::new(),
        }
    }

    pub fn to_builder(&self) -> LogRecordBuilder {
        LogRecordBuilder {
            id: self.id.clone(),
            local_id: Some(self.local_id.clone()),
            was_pushed_to_server: self.was_pushed_to_server,
            is_ready_to_sync: self.is_ready_to_sync,
            done: Some(self.done.clone()),
            fields: self.fields.clone(),
            remote_uri: self.remote_uri.clone(),
            conflicts: self.conflicts.clone(),
        }
    }

    pub const fn id(&self) -> Option<&LogId> {
        self.id.as_ref()
    }

    pub const fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    pub const fn was_pushed_to_server(&self) -> bool {
        self.was_pushed_to_server
    }

    pub const fn is_ready_to_sync(&self) -> bool {
        self.is_ready_to_sync
    }

    pub const fn done(&self) -> &FieldValue<bool> {
        &self.done
    }

    pub const fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn remote_uri(&self) -> Option<&str> {
        self.remote_uri.as_deref()
    }

    /// Field-level conflicts kept from the last three-way merge.
    pub fn conflicts(&self) -> &[FieldConflict] {
        &self.conflicts
    }

    /// Display name used in user-facing messages.
    pub fn name(&self) -> String {
        self.field(NAME_FIELD)
            .and_then(|value| value.data.as_str())
            .map_or_else(|| self.local_id.to_string(), ToString::to_string)
    }

    /// Image entries of the `images` field. Non-string entries are skipped.
    pub fn images(&self) -> Vec<Image> {
        match self.field(IMAGES_FIELD).map(|value| &value.data) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(Value::as_str)
                .map(Image::parse)
                .collect(),
            Some(Value::String(single)) => vec![Image::parse(single)],
            _ => Vec::new(),
        }
    }

    /// Copy with the server acknowledgement of a successful send applied.
    #[must_use]
    pub fn acknowledged(self, id: LogId, remote_uri: Option<String>) -> Self {
        Self {
            id: Some(id),
            was_pushed_to_server: true,
            is_ready_to_sync: false,
            remote_uri: remote_uri.or(self.remote_uri),
            ..self
        }
    }

    /// Copy with the ready-to-sync flag set to `ready`.
    #[must_use]
    pub fn with_ready_to_sync(self, ready: bool) -> Self {
        Self {
            is_ready_to_sync: ready,
            ..self
        }
    }
}

/// Builder for [`LogRecord`], enforcing required fields and field shape.
#[derive(Debug, Clone, Default)]
pub struct LogRecordBuilder {
    id: Option<LogId>,
    local_id: Option<LocalId>,
    was_pushed_to_server: bool,
    is_ready_to_sync: bool,
    done: Option<FieldValue<bool>>,
    fields: BTreeMap<String, FieldValue>,
    remote_uri: Option<String>,
    conflicts: Vec<FieldConflict>,
}

impl LogRecordBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<LogId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn maybe_id(mut self, id: Option<LogId>) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn local_id(mut self, local_id: impl Into<LocalId>) -> Self {
        self.local_id = Some(local_id.into());
        self
    }

    #[must_use]
    pub const fn pushed(mut self, pushed: bool) -> Self {
        self.was_pushed_to_server = pushed;
        self
    }

    #[must_use]
    pub const fn ready_to_sync(mut self, ready: bool) -> Self {
        self.is_ready_to_sync = ready;
        self
    }

    #[must_use]
    pub const fn done(mut self, done: FieldValue<bool>) -> Self {
        self.done = Some(done);
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: BTreeMap<String, FieldValue>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn remote_uri(mut self, remote_uri: Option<String>) -> Self {
        self.remote_uri = remote_uri;
        self
    }

    #[must_use]
    pub fn conflicts(mut self, conflicts: Vec<FieldConflict>) -> Self {
        self.conflicts = conflicts;
        self
    }

    pub fn build(self) -> Result<LogRecord> {
        let local_id = self
            .local_id
            .ok_or_else(|| Error::InvalidRecord("local_id is required".to_string()))?;
        if local_id.as_str().trim().is_empty() {
            return Err(Error::InvalidRecord("local_id must not be empty".to_string()));
        }
        if let Some(name) = self.fields.keys().find(|name| !is_valid_field_name(name)) {
            return Err(Error::InvalidRecord(format!(
                "field name {name:?} is empty or reserved"
            )));
        }

        Ok(LogRecord {
            id: self.id,
            local_id,
            was_pushed_to_server: self.was_pushed_to_server,
            is_ready_to_sync: self.is_ready_to_sync,
            done: self.done.unwrap_or(FieldValue::unstamped(false)),
            fields: self.fields,
            remote_uri: self.remote_uri,
            conflicts: self.conflicts,
        })
    }
}

fn is_valid_field_name(name: &str) -> bool {
    !name.trim().is_empty() && !RESERVED_FIELDS.contains(&name)
}

#[derive(Deserialize)]
struct RawLogRecord {
    #[serde(default)]
    id: Option<LogId>,
    local_id: LocalId,
    #[serde(default)]
    was_pushed_to_server: bool,
    #[serde(default)]
    is_ready_to_sync: bool,
    #[serde(default)]
    done: Option<FieldValue<bool>>,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    remote_uri: Option<String>,
    #[serde(default)]
    conflicts: Vec<FieldConflict>,
}

impl TryFrom<RawLogRecord> for LogRecord {
    type Error = Error;

    fn try_from(raw: RawLogRecord) -> Result<Self> {
        LogRecordBuilder {
            id: raw.id,
            local_id: Some(raw.local_id),
            was_pushed_to_server: raw.was_pushed_to_server,
            is_ready_to_sync: raw.is_ready_to_sync,
            done: raw.done,
            fields: raw.fields,
            remote_uri: raw.remote_uri,
            conflicts: raw.conflicts,
        }
        .build()
    }
}
