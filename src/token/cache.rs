use jiff::Timestamp;
use tokio::sync::RwLock;

use super::TokenRecord;

/// Holds the current token record for one client identity.
///
/// Reads take the read half of a read-mostly lock; replacement happens only
/// inside the refresh gate's critical section, so readers are never blocked
/// by an in-flight refresh.
#[derive(Default)]
pub struct TokenCache {
    current: RwLock<Option<TokenRecord>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<TokenRecord> {
        self.current.read().await.clone()
    }

    /// Returns a copy of the current record iff it is still valid at `now`.
    pub async fn valid_at(&self, now: Timestamp) -> Option<TokenRecord> {
        let guard = self.current.read().await;
        guard.as_ref().filter(|record| record.is_valid_at(now)).cloned()
    }

    /// Atomically replaces the current record with a freshly issued one.
    pub async fn publish(&self, record: TokenRecord) {
        *self.current.write().await = Some(record);
    }

    /// Force-clears the record so the next lookup must attempt a refresh.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }
}
