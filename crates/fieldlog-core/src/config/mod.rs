//! Sync configuration.
//!
//! Every input a sync run needs (host, token, cursor, filters) is passed in
//! explicitly through [`SyncConfig`]; nothing is read from global state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

use crate::error::{Error, Result};
use crate::models::Timestamp;
use crate::util::{is_http_url, normalize_text_option};

pub const HOST_ENV: &str = "FIELDLOG_HOST";
pub const TOKEN_ENV: &str = "FIELDLOG_TOKEN";
pub const SYNC_DATE_ENV: &str = "FIELDLOG_SYNC_DATE";

/// Server-side log filter criteria, passed through as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogFilters(BTreeMap<String, String>);

impl LogFilters {
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Inputs of one sync invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Farm server base URL
    pub host: String,
    /// Session token sent with every push; pushes abort without one
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Time of the last successful pull (Unix seconds)
    #[serde(default)]
    pub sync_date: Timestamp,
    #[serde(default)]
    pub log_filters: LogFilters,
}

impl SyncConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = normalize_text_option(Some(token.into()));
        self
    }

    #[must_use]
    pub const fn with_sync_date(mut self, sync_date: Timestamp) -> Self {
        self.sync_date = sync_date;
        self
    }

    #[must_use]
    pub fn with_log_filters(mut self, filters: LogFilters) -> Self {
        self.log_filters = filters;
        self
    }

    /// Build a configuration from `FIELDLOG_*` environment variables.
    ///
    /// Empty values count as unset. The host is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = normalize_text_option(lookup(HOST_ENV))
            .ok_or_else(|| Error::Config(format!("{HOST_ENV} is not set")))?;
        let auth_token = normalize_text_option(lookup(TOKEN_ENV));
        let sync_date = match normalize_text_option(lookup(SYNC_DATE_ENV)) {
            Some(raw) => raw
                .parse::<Timestamp>()
                .map_err(|_| Error::Config(format!("{SYNC_DATE_ENV} must be a unix timestamp")))?,
            None => 0,
        };

        let config = Self {
            host,
            auth_token,
            sync_date,
            log_filters: LogFilters::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the host is an http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if !is_http_url(self.host.trim()) {
            return Err(Error::Config(
                "host must include http:// or https://".to_string(),
            ));
        }
        Ok(())
    }

    /// The token to push with, if a usable one is present.
    pub fn token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn from_lookup_reads_all_values() {
        let config = SyncConfig::from_lookup(lookup(&[
            (HOST_ENV, "https://farm.example.com"),
            (TOKEN_ENV, " csrf "),
            (SYNC_DATE_ENV, "1555000000"),
        ]))
        .unwrap();

        assert_eq!(config.host, "https://farm.example.com");
        assert_eq!(config.token(), Some("csrf"));
        assert_eq!(config.sync_date, 1_555_000_000);
    }

    #[test]
    fn from_lookup_requires_host() {
        let error = SyncConfig::from_lookup(lookup(&[(TOKEN_ENV, "t")])).unwrap_err();
        assert!(error.to_string().contains(HOST_ENV));
    }

    #[test]
    fn from_lookup_rejects_bad_sync_date_and_host() {
        assert!(SyncConfig::from_lookup(lookup(&[
            (HOST_ENV, "https://farm.example.com"),
            (SYNC_DATE_ENV, "yesterday"),
        ]))
        .is_err());
        assert!(SyncConfig::from_lookup(lookup(&[(HOST_ENV, "farm.example.com")])).is_err());
    }

    #[test]
    fn blank_token_is_treated_as_missing() {
        let config = SyncConfig::new("https://farm.example.com").with_auth_token("   ");
        assert_eq!(config.token(), None);
    }

    #[test]
    fn filters_become_query_pairs() {
        let filters = LogFilters::default()
            .with("type", "farm_harvest")
            .with("done", "0");
        assert_eq!(
            filters.to_query(),
            vec![
                ("done".to_string(), "0".to_string()),
                ("type".to_string(), "farm_harvest".to_string()),
            ]
        );
    }
}
