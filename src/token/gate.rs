use std::future::Future;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::audit::{AuditSink, SecurityEventKind};
use crate::backoff::BackoffPlan;
use crate::errors::Error;

use super::{TokenCache, TokenRecord};

/// Who asked for the refresh.
///
/// Request-path callers only want *a* valid token, so the gate re-checks the
/// cache after acquiring the lock and skips the exchange when another caller
/// already refreshed. The scheduler renews ahead of expiry and therefore
/// refreshes even while the cached record is still valid; its failures also
/// clear the cache so the next request-path lookup retries synchronously.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOrigin {
    Request,
    Scheduled,
}

/// Result of routing one refresh request through the gate.
#[derive(Debug)]
pub enum GateOutcome {
    /// The cache turned out to hold a valid record after all; no attempt ran.
    Fresh(TokenRecord),
    /// An attempt ran and published a new record.
    Refreshed(TokenRecord),
    /// Still inside the backoff window; no attempt ran.
    BackingOff,
    /// Consecutive failures reached the retry budget; refusing to attempt
    /// until the state is reset manually.
    Exhausted,
    /// An attempt ran and failed; backoff window extended.
    Failed(Error),
}

#[derive(Debug, Default)]
struct RetryState {
    consecutive_failures: u32,
    next_retry_at: Option<Timestamp>,
}

/// Single-flight coordinator deciding whether a refresh may run now.
///
/// At most one attempt executes at a time across all request-path callers and
/// the scheduler; everyone else either rides the backoff window or waits for
/// the in-flight attempt and re-reads the cache.
pub struct RefreshGate {
    refresh_lock: Mutex<()>,
    state: RwLock<RetryState>,
    plan: BackoffPlan,
    max_retries: u32,
    rng: Mutex<StdRng>,
    audit: Arc<dyn AuditSink>,
    subject: String,
}

impl RefreshGate {
    pub fn new(
        plan: BackoffPlan,
        max_retries: u32,
        audit: Arc<dyn AuditSink>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            refresh_lock: Mutex::new(()),
            state: RwLock::new(RetryState::default()),
            plan,
            max_retries,
            rng: Mutex::new(StdRng::from_entropy()),
            audit,
            subject: subject.into(),
        }
    }

    /// True while a previous failure's backoff window is still open.
    pub async fn backing_off(&self, now: Timestamp) -> bool {
        matches!(self.state.read().await.next_retry_at, Some(at) if now < at)
    }

    pub async fn consecutive_failures(&self) -> u32 {
        self.state.read().await.consecutive_failures
    }

    /// Clears the retry state for manual operational recovery.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.consecutive_failures = 0;
        state.next_retry_at = None;
        info!(subject = %self.subject, "token refresh retry state reset");
    }

    /// Routes one refresh request through the backoff check, the exclusive
    /// lock, and the double-check, running `refresh` at most once.
    pub async fn refresh_through<F, Fut>(
        &self,
        cache: &TokenCache,
        origin: RefreshOrigin,
        refresh: F,
    ) -> GateOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenRecord, Error>>,
    {
        if self.backing_off(Timestamp::now()).await {
            debug!(origin = ?origin, "refresh skipped: backoff window open");
            return GateOutcome::BackingOff;
        }

        let _guard = self.refresh_lock.lock().await;

        // Re-verify under the lock: another caller may have refreshed or
        // failed while this one was waiting.
        let now = Timestamp::now();
        if origin == RefreshOrigin::Request {
            if let Some(record) = cache.valid_at(now).await {
                return GateOutcome::Fresh(record);
            }
        }
        if self.backing_off(now).await {
            return GateOutcome::BackingOff;
        }
        if self.state.read().await.consecutive_failures >= self.max_retries {
            error!(
                subject = %self.subject,
                max_retries = self.max_retries,
                "refresh refused: retry budget exhausted, manual reset required"
            );
            self.audit.record(
                SecurityEventKind::RetriesExhausted,
                &self.subject,
                "token refresh retry budget exhausted",
            );
            return GateOutcome::Exhausted;
        }

        let attempt_id = Uuid::new_v4();
        debug!(attempt_id = %attempt_id, origin = ?origin, "refreshing access token");
        match refresh().await {
            Ok(record) => {
                {
                    let mut state = self.state.write().await;
                    state.consecutive_failures = 0;
                    state.next_retry_at = None;
                }
                cache.publish(record.clone()).await;
                info!(
                    attempt_id = %attempt_id,
                    expires_at = %record.expires_at(),
                    "access token refreshed"
                );
                self.audit.record(
                    SecurityEventKind::TokenRefreshSuccess,
                    &self.subject,
                    "token refreshed successfully",
                );
                GateOutcome::Refreshed(record)
            }
            Err(err) => {
                let failures;
                let delay;
                {
                    let mut state = self.state.write().await;
                    state.consecutive_failures += 1;
                    failures = state.consecutive_failures;
                    delay = {
                        let mut rng = self.rng.lock().await;
                        self.plan.delay_for(failures, &mut *rng)
                    };
                    state.next_retry_at =
                        Some(Timestamp::now() + SignedDuration::from_millis(delay.as_millis() as i64));
                }
                if origin == RefreshOrigin::Scheduled {
                    cache.invalidate().await;
                }
                warn!(
                    attempt_id = %attempt_id,
                    failures,
                    max_retries = self.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    category = err.category(),
                    error = %err,
                    "token refresh failed; backing off"
                );
                self.audit.record(
                    SecurityEventKind::TokenRefreshFailure,
                    &self.subject,
                    &format!("token refresh failed ({}): {}", err.category(), err),
                );
                GateOutcome::Failed(err)
            }
        }
    }
}
