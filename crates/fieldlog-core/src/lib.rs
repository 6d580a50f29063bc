//! fieldlog-core - Core library for fieldlog
//!
//! This crate contains the log models, the field-level conflict resolver and
//! the pull/push synchronizers shared by every fieldlog client. Store
//! mutations are never performed directly: sync phases emit
//! [`StoreIntent`]s which the owning store applies.

pub mod config;
pub mod error;
pub mod models;
pub mod refresh;
pub mod store;
pub mod sync;
pub mod transport;
pub mod util;

pub use config::{LogFilters, SyncConfig};
pub use error::{Error, Result};
pub use models::{FieldValue, LocalId, LogId, LogRecord, ServerLog};
pub use store::{LogStore, RecordUpdate, StoreIntent};
pub use sync::Synchronizer;
pub use transport::{HttpTransport, SyncTransport};
