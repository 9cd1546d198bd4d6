use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tracing::{debug, warn};

use crate::audit::AuditSink;
use crate::backoff::BackoffPlan;
use crate::config::{ClientConfig, RetrySettings};
use crate::errors::Error;
use crate::exchange::TokenExchange;
use crate::executor::RefreshExecutor;
use crate::signer::{AssertionConfig, AssertionSigner};
use crate::token::{GateOutcome, RefreshGate, RefreshOrigin, TokenCache, TokenRecord};

/// Explicitly owned refresh/cache/backoff engine for one client identity.
///
/// Construct one per configured identity and share it by reference (or
/// `Arc`) between request handlers and the [`ProactiveRefresher`]; its
/// lifecycle is the owner's, not the process's.
///
/// [`ProactiveRefresher`]: crate::scheduler::ProactiveRefresher
pub struct CredentialKeeper<S, X> {
    cache: TokenCache,
    gate: RefreshGate,
    executor: RefreshExecutor<S, X>,
}

impl<S, X> CredentialKeeper<S, X>
where
    S: AssertionSigner,
    X: TokenExchange,
{
    pub fn new(
        client: &ClientConfig,
        retry: &RetrySettings,
        signer: S,
        exchange: X,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, Error> {
        let plan = BackoffPlan::new(
            Duration::from_millis(retry.initial_backoff_ms),
            Duration::from_millis(retry.max_backoff_ms),
        )?;
        Ok(Self {
            cache: TokenCache::new(),
            gate: RefreshGate::new(plan, retry.max_retries, audit, client.client_id.clone()),
            executor: RefreshExecutor::new(AssertionConfig::from_client(client), signer, exchange),
        })
    }

    /// Returns a valid token, refreshing through the gate on a cache miss.
    ///
    /// Never fails: when no token can be produced (refresh failed, backoff
    /// window open, or retry budget exhausted) this returns `None` and the
    /// caller decides whether to proceed unauthenticated.
    pub async fn get_valid_token(&self) -> Option<TokenRecord> {
        if let Some(record) = self.cache.valid_at(Timestamp::now()).await {
            return Some(record);
        }
        let outcome = self
            .gate
            .refresh_through(&self.cache, RefreshOrigin::Request, || self.executor.execute())
            .await;
        match outcome {
            GateOutcome::Fresh(record) | GateOutcome::Refreshed(record) => Some(record),
            GateOutcome::BackingOff => {
                debug!("no token available: refresh backing off");
                None
            }
            GateOutcome::Exhausted => {
                warn!("no token available: retry budget exhausted");
                None
            }
            GateOutcome::Failed(err) => {
                warn!(error = %err, "no token available: refresh failed");
                None
            }
        }
    }

    /// One proactive renewal pass, as driven by the scheduler.
    ///
    /// Skips while backing off; otherwise forces a refresh even when the
    /// cached record is still valid. A failed pass leaves the cache
    /// invalidated so the next request-path lookup retries synchronously.
    pub async fn scheduled_refresh(&self) {
        if self.gate.backing_off(Timestamp::now()).await {
            debug!("scheduled refresh skipped: backoff window open");
            return;
        }
        let outcome = self
            .gate
            .refresh_through(&self.cache, RefreshOrigin::Scheduled, || {
                self.executor.execute()
            })
            .await;
        if let GateOutcome::Failed(err) = outcome {
            warn!(error = %err, "scheduled token refresh failed; cache invalidated");
        }
    }

    /// Manual operational recovery: clears the failure counter and backoff
    /// window so refresh attempts resume.
    pub async fn reset_retry_state(&self) {
        self.gate.reset().await;
    }

    pub async fn consecutive_failures(&self) -> u32 {
        self.gate.consecutive_failures().await
    }
}
