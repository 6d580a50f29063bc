//! Transport boundary between the sync core and the server.
//!
//! The core only talks to [`SyncTransport`]. [`HttpTransport`] is the
//! reqwest-backed implementation for farmOS-style REST servers; tests supply
//! their own.

mod http;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::LogFilters;
use crate::models::{Area, Asset, LogId, ServerLog, Term};

pub use http::HttpTransport;

/// Network layer used by the pull, push and reference refresh flows.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Fetch the server's current log set for the given filters.
    async fn fetch_logs(&self, filters: &LogFilters) -> Result<Vec<ServerLog>, TransportError>;

    /// Create or update one log on the server.
    async fn send_log(&self, log: &WireLog, token: &str) -> Result<SendAck, SendFailure>;

    async fn fetch_areas(&self) -> Result<Vec<Area>, TransportError>;

    async fn fetch_assets(&self) -> Result<Vec<Asset>, TransportError>;

    /// Fetch the terms of one taxonomy vocabulary.
    async fn fetch_terms(&self, vocabulary: &str) -> Result<Vec<Term>, TransportError>;
}

/// Failure of a fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// HTTP status when the server answered at all
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

/// Server acknowledgement of a sent log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAck {
    pub id: LogId,
    pub uri: Option<String>,
}

/// Failed send.
///
/// `status == None` means the request never got an answer (no connectivity).
/// The transport reads the response body before handing the failure over.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendFailure {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub body: String,
}

impl SendFailure {
    pub fn offline(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            status_text: Some(reason.into()),
            body: String::new(),
        }
    }

    pub fn http(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            status_text: Some(status_text.into()),
            body: body.into(),
        }
    }
}

/// Log in the shape the server accepts on send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<LogId>,
    /// Completion flag coerced to `0`/`1`
    pub done: u8,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_log_flattens_fields_and_omits_missing_id() {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("Seeding"));
        let wire = WireLog {
            id: None,
            done: 1,
            fields,
        };
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            json!({ "done": 1, "name": "Seeding" })
        );
    }

    #[test]
    fn offline_failure_has_no_status() {
        let failure = SendFailure::offline("connection refused");
        assert_eq!(failure.status, None);
        assert_eq!(failure.status_text.as_deref(), Some("connection refused"));
    }
}
