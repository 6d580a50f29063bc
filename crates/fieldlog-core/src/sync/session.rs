//! Pull-then-push orchestration over one transport.

use std::sync::Arc;

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::models::{LogRecord, ReferenceKind, Timestamp};
use crate::refresh;
use crate::store::{LogStore, StoreIntent, LOGIN_ROUTE};
use crate::transport::SyncTransport;
use crate::util::unix_timestamp_now;

use super::pull::{pull, PullReport};
use super::push::{push, PushReport};

/// Outcome of a full sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub started_at: Timestamp,
    pub pull: PullReport,
    /// `None` when the push phase did not run
    pub push: Option<PushReport>,
    /// The push phase was skipped for lack of a session token
    pub auth_required: bool,
    /// Cursor to use for the next sync
    pub next_sync_date: Timestamp,
}

impl SyncReport {
    /// All intents of both phases, pull first.
    pub fn intents(&self) -> Vec<StoreIntent> {
        let mut intents = self.pull.intents.clone();
        if let Some(push) = &self.push {
            intents.extend(push.intents().cloned());
        }
        if self.auth_required {
            intents.push(StoreIntent::Navigate(LOGIN_ROUTE.to_string()));
        }
        intents
    }

    /// Apply every intent to `store` and advance its sync cursor.
    pub fn apply(&self, store: &mut LogStore) -> Result<()> {
        store.apply_all(self.intents())?;
        store.sync_date = self.next_sync_date;
        Ok(())
    }
}

/// Runs sync phases against a shared transport.
#[derive(Clone)]
pub struct Synchronizer {
    transport: Arc<dyn SyncTransport>,
}

impl Synchronizer {
    pub fn new(transport: Arc<dyn SyncTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &dyn SyncTransport {
        self.transport.as_ref()
    }

    pub async fn pull(&self, locals: &[LogRecord], config: &SyncConfig) -> Result<PullReport> {
        pull(
            self.transport(),
            &config.log_filters,
            locals,
            config.sync_date,
        )
        .await
    }

    pub async fn push(
        &self,
        locals: &[LogRecord],
        pending: &[usize],
        config: &SyncConfig,
    ) -> Result<PushReport> {
        push(self.transport(), locals, pending, config.token()).await
    }

    pub async fn refresh(&self, kind: ReferenceKind) -> Result<StoreIntent> {
        refresh::refresh(self.transport(), kind).await
    }

    /// Pull, then push whatever is pending once the pull has been merged.
    ///
    /// The push phase reads `locals` with the pull intents already applied,
    /// so merged logs go out in their merged form. Push intents address that
    /// post-pull collection and are valid after the pull intents.
    /// A failed pull fails the whole sync and leaves the cursor untouched.
    /// A missing token skips the push phase and asks for the login route.
    pub async fn sync(&self, locals: &[LogRecord], config: &SyncConfig) -> Result<SyncReport> {
        let started_at = unix_timestamp_now();
        let pull = self.pull(locals, config).await?;

        let mut merged = LogStore::new(locals.to_vec());
        merged.apply_all(pull.intents.iter().cloned())?;
        let pending = merged.pending_indices();

        let (push, auth_required) = match self.push(&merged.logs, &pending, config).await {
            Ok(report) => (Some(report), false),
            Err(Error::AuthenticationRequired) => {
                tracing::warn!("No session token; skipping push");
                (None, true)
            }
            Err(error) => return Err(error),
        };

        Ok(SyncReport {
            started_at,
            pull,
            push,
            auth_required,
            next_sync_date: started_at,
        })
    }

    /// Sync `store` in place.
    ///
    /// The store's own cursor wins over the configured one once it is set.
    pub async fn sync_store(&self, store: &mut LogStore, config: &SyncConfig) -> Result<SyncReport> {
        let sync_date = if store.sync_date > 0 {
            store.sync_date
        } else {
            config.sync_date
        };
        let config = config.clone().with_sync_date(sync_date);
        let report = self.sync(&store.logs, &config).await?;
        report.apply(store)?;
        Ok(report)
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer").finish_non_exhaustive()
    }
}
