use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::exchange::TokenExchange;
use crate::keeper::CredentialKeeper;
use crate::signer::AssertionSigner;

/// Timer-driven renewal loop keeping the token fresh independent of request
/// traffic.
///
/// Drives [`CredentialKeeper::scheduled_refresh`] on a fixed period and
/// nothing else; all coordination with request-path callers happens inside
/// the keeper's gate. Size the period relative to the token TTL issued by
/// your authorization server.
pub struct ProactiveRefresher {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ProactiveRefresher {
    pub fn spawn<S, X>(keeper: Arc<CredentialKeeper<S, X>>, period: Duration) -> Self
    where
        S: AssertionSigner + 'static,
        X: TokenExchange + 'static,
    {
        let (shutdown, mut signal) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => keeper.scheduled_refresh().await,
                    _ = signal.changed() => break,
                }
            }
            debug!("proactive refresher stopped");
        });
        Self { shutdown, handle }
    }

    /// Stops the loop and waits for the task to wind down. A refresh already
    /// in flight runs to completion first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
