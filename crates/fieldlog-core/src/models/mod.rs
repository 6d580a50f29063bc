//! Data models for fieldlog

pub(crate) mod de;

mod conflict;
mod field_value;
mod log;
mod reference;
mod server;

pub use conflict::FieldConflict;
pub use field_value::FieldValue;
pub use log::{
    Image, LocalId, LogId, LogRecord, LogRecordBuilder, IMAGES_FIELD, INLINE_IMAGE_MARKER,
    NAME_FIELD, RESERVED_FIELDS,
};
pub use reference::{Area, Asset, ReferenceItem, ReferenceKind, Term};
pub use server::ServerLog;

/// Unix timestamp in seconds.
pub type Timestamp = i64;
