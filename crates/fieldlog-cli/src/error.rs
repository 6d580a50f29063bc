use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] fieldlog_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid state file {path}: {reason}")]
    InvalidState { path: String, reason: String },
    #[error("Sync is not configured. Pass --host or set FIELDLOG_HOST (and FIELDLOG_TOKEN to push).")]
    SyncNotConfigured,
}
