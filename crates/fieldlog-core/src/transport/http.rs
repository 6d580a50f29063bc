//! reqwest-backed transport for farmOS-style REST servers.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{SendAck, SendFailure, SyncTransport, TransportError, WireLog};
use crate::config::LogFilters;
use crate::error::{Error, Result};
use crate::models::{Area, Asset, LogId, ServerLog, Term};
use crate::util::{compact_text, is_http_url, normalize_text_option};

const CSRF_HEADER: &str = "X-CSRF-Token";

/// HTTP client for log and taxonomy endpoints of one farm host.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport for an explicit host URL.
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(host.into())?;
        let client = reqwest::Client::builder().build()?;
        Ok(Self { base_url, client })
    }

    /// Returns the base URL this transport was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<Vec<T>, TransportError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| TransportError::new(format!("Request to {path} failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::with_status(
                format!("{path} returned HTTP {status}: {}", compact_text(&body)),
                status,
            ));
        }

        let payload = response
            .json::<ListResponse<T>>()
            .await
            .map_err(|error| TransportError::new(format!("Invalid {path} payload: {error}")))?;
        Ok(payload.list)
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn fetch_logs(
        &self,
        filters: &LogFilters,
    ) -> std::result::Result<Vec<ServerLog>, TransportError> {
        self.get_list("/log.json", &filters.to_query()).await
    }

    async fn send_log(
        &self,
        log: &WireLog,
        token: &str,
    ) -> std::result::Result<SendAck, SendFailure> {
        let request = match &log.id {
            Some(id) => self.client.put(format!("{}/log/{id}", self.base_url)),
            None => self.client.post(format!("{}/log", self.base_url)),
        };

        let response = request
            .header(CSRF_HEADER, token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(log)
            .send()
            .await
            .map_err(|error| SendFailure::offline(error.to_string()))?;

        if !response.status().is_success() {
            return Err(failure_from_response(response).await);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let ack = serde_json::from_str::<AckResponse>(&body).unwrap_or_default();
        let id = ack.id.or_else(|| log.id.clone()).ok_or_else(|| {
            SendFailure::http(
                status.as_u16(),
                "missing id in acknowledgement",
                compact_text(&body),
            )
        })?;

        Ok(SendAck { id, uri: ack.uri })
    }

    async fn fetch_areas(&self) -> std::result::Result<Vec<Area>, TransportError> {
        self.get_list(
            "/taxonomy_term.json",
            &[("bundle".to_string(), "farm_areas".to_string())],
        )
        .await
    }

    async fn fetch_assets(&self) -> std::result::Result<Vec<Asset>, TransportError> {
        self.get_list("/farm_asset.json", &[]).await
    }

    async fn fetch_terms(&self, vocabulary: &str) -> std::result::Result<Vec<Term>, TransportError> {
        self.get_list(
            "/taxonomy_term.json",
            &[("bundle".to_string(), vocabulary.to_string())],
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    list: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct AckResponse {
    #[serde(default)]
    id: Option<LogId>,
    #[serde(default)]
    uri: Option<String>,
}

async fn failure_from_response(response: Response) -> SendFailure {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    failure_from_parts(status, body)
}

/// The full body is kept; it ends up in the user-facing message.
fn failure_from_parts(status: StatusCode, body: String) -> SendFailure {
    let status_text = status.canonical_reason().unwrap_or_default();
    SendFailure::http(status.as_u16(), status_text, body)
}

fn normalize_base_url(raw: String) -> Result<String> {
    let host = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config("host must not be empty".to_string()))?;
    if !is_http_url(&host) {
        return Err(Error::Config(
            "host must include http:// or https://".to_string(),
        ));
    }
    Ok(host.trim_end_matches('/').to_string())
}
