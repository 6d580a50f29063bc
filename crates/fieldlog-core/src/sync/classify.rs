//! Classification of failed sends.

use crate::store::{ErrorLevel, ErrorPayload, StoreIntent, LOGIN_ROUTE};
use crate::transport::SendFailure;

/// Coarse failure category of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never reached the server
    Offline,
    /// Server rejected the credentials (401/403)
    AuthFailure,
    /// Any other non-success status
    ServerError,
}

/// A failed send, ready to be surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedError {
    Offline(ErrorPayload),
    /// Credentials were rejected; the user is sent to `route` instead of
    /// being shown a message
    AuthFailure { route: String },
    ServerError(ErrorPayload),
}

impl ClassifiedError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Offline(_) => ErrorKind::Offline,
            Self::AuthFailure { .. } => ErrorKind::AuthFailure,
            Self::ServerError(_) => ErrorKind::ServerError,
        }
    }

    pub const fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Offline(payload) | Self::ServerError(payload) => Some(payload),
            Self::AuthFailure { .. } => None,
        }
    }

    /// The store intent that surfaces this error.
    pub fn to_intent(&self) -> StoreIntent {
        match self {
            Self::Offline(payload) | Self::ServerError(payload) => {
                StoreIntent::ReportError(payload.clone())
            }
            Self::AuthFailure { route } => StoreIntent::Navigate(route.clone()),
        }
    }
}

/// Classify a failed send of the log called `record_name`.
pub fn classify(failure: &SendFailure, record_name: &str) -> ClassifiedError {
    match failure.status {
        None => ClassifiedError::Offline(ErrorPayload {
            message: format!(
                "Unable to sync \"{record_name}\" because the network is currently unavailable. Please try syncing again later."
            ),
            error_code: failure.status_text.clone(),
            level: ErrorLevel::Warning,
            show: true,
        }),
        Some(401 | 403) => ClassifiedError::AuthFailure {
            route: LOGIN_ROUTE.to_string(),
        },
        Some(status) => ClassifiedError::ServerError(ErrorPayload {
            message: format!(
                "{status} error while syncing \"{record_name}\": {}",
                failure.body
            ),
            error_code: failure.status_text.clone(),
            level: ErrorLevel::Warning,
            show: true,
        }),
    }
}
