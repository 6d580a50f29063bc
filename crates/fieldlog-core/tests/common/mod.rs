#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fieldlog_core::config::LogFilters;
use fieldlog_core::models::{Area, Asset, LogId, ServerLog, Term};
use fieldlog_core::transport::{SendAck, SendFailure, SyncTransport, TransportError, WireLog};

/// In-memory transport that records every call.
#[derive(Default)]
pub struct MockTransport {
    pub logs: Vec<ServerLog>,
    pub fetch_error: Option<TransportError>,
    /// Send failures keyed by the wire `name` attribute
    pub failures: HashMap<String, SendFailure>,
    pub areas: Vec<Area>,
    pub assets: Vec<Asset>,
    pub terms: HashMap<String, Vec<Term>>,
    pub sent: Mutex<Vec<(WireLog, String)>>,
    pub fetched_filters: Mutex<Vec<LogFilters>>,
    pub term_requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn with_logs(logs: Vec<ServerLog>) -> Self {
        Self {
            logs,
            ..Self::default()
        }
    }

    pub fn failing_fetch(message: &str) -> Self {
        Self {
            fetch_error: Some(TransportError::new(message)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fail_send(mut self, name: &str, failure: SendFailure) -> Self {
        self.failures.insert(name.to_string(), failure);
        self
    }

    pub fn sent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(wire, _)| wire.fields.get("name").and_then(|v| v.as_str()))
            .map(ToString::to_string)
            .collect();
        names.sort();
        names
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SyncTransport for MockTransport {
    async fn fetch_logs(&self, filters: &LogFilters) -> Result<Vec<ServerLog>, TransportError> {
        self.fetched_filters.lock().unwrap().push(filters.clone());
        match &self.fetch_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.logs.clone()),
        }
    }

    async fn send_log(&self, log: &WireLog, token: &str) -> Result<SendAck, SendFailure> {
        let position = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((log.clone(), token.to_string()));
            sent.len()
        };

        let name = log
            .fields
            .get("name")
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        if let Some(failure) = self.failures.get(name) {
            return Err(failure.clone());
        }

        let id = log
            .id
            .clone()
            .unwrap_or_else(|| LogId::new(format!("{}", 100 + position)));
        Ok(SendAck {
            uri: Some(format!("https://farm.example.com/log/{id}")),
            id,
        })
    }

    async fn fetch_areas(&self) -> Result<Vec<Area>, TransportError> {
        Ok(self.areas.clone())
    }

    async fn fetch_assets(&self) -> Result<Vec<Asset>, TransportError> {
        match &self.fetch_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.assets.clone()),
        }
    }

    async fn fetch_terms(&self, vocabulary: &str) -> Result<Vec<Term>, TransportError> {
        self.term_requests.lock().unwrap().push(vocabulary.to_string());
        Ok(self.terms.get(vocabulary).cloned().unwrap_or_default())
    }
}
