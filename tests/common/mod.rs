#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use credential_keeper::{
    AssertionConfig, AssertionSigner, AuditSink, ClientConfig, CredentialKeeper, Error,
    RetrySettings, SecurityEventKind, TokenExchange, TokenResponse,
};

pub fn client_config() -> ClientConfig {
    ClientConfig {
        client_id: "orders-service".into(),
        audience_url: "https://auth.example.test".into(),
        token_endpoint: "https://auth.example.test/oauth/token".into(),
        key_alias: "outbound-2024".into(),
        private_key: None,
        private_key_path: None,
        private_key_passphrase: None,
        scope: "read write".into(),
        assertion_ttl_secs: 300,
        issued_at_offset_secs: -30,
    }
}

pub fn retry_settings(
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
) -> RetrySettings {
    RetrySettings {
        max_retries,
        initial_backoff_ms,
        max_backoff_ms,
        refresh_interval_ms: 3_000_000,
    }
}

pub fn ok_response(token: &str, expires_in: u64) -> TokenResponse {
    TokenResponse {
        access_token: token.to_string(),
        token_type: "Bearer".to_string(),
        expires_in,
        scope: Some("read write".to_string()),
    }
}

/// Signer stub returning a canned assertion without touching any key material.
#[derive(Clone, Copy)]
pub struct StaticSigner;

impl AssertionSigner for StaticSigner {
    fn sign(&self, _config: &AssertionConfig) -> Result<String, Error> {
        Ok("stub-assertion".to_string())
    }
}

/// Exchange stub driven by a per-call script; counts invocations so tests can
/// assert the single-flight and lockout properties.
#[derive(Clone)]
pub struct ScriptedExchange<F: Clone> {
    calls: Arc<AtomicUsize>,
    latency: Option<Duration>,
    script: F,
}

impl<F> ScriptedExchange<F>
where
    F: Fn(usize) -> Result<TokenResponse, Error> + Clone + Send + Sync,
{
    pub fn new(script: F) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            latency: None,
            script,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> TokenExchange for ScriptedExchange<F>
where
    F: Fn(usize) -> Result<TokenResponse, Error> + Clone + Send + Sync,
{
    async fn exchange(&self, _assertion: &str) -> Result<TokenResponse, Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        (self.script)(call)
    }
}

/// Audit sink collecting events for sequence assertions.
#[derive(Clone, Default)]
pub struct RecordingAudit {
    events: Arc<Mutex<Vec<(SecurityEventKind, String, String)>>>,
}

impl RecordingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<SecurityEventKind> {
        self.events.lock().unwrap().iter().map(|(kind, _, _)| *kind).collect()
    }

    pub fn events(&self) -> Vec<(SecurityEventKind, String, String)> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAudit {
    fn record(&self, kind: SecurityEventKind, subject: &str, detail: &str) {
        self.events
            .lock()
            .unwrap()
            .push((kind, subject.to_string(), detail.to_string()));
    }
}

pub fn keeper_with<X>(
    retry: RetrySettings,
    exchange: X,
    audit: Arc<dyn AuditSink>,
) -> CredentialKeeper<StaticSigner, X>
where
    X: TokenExchange,
{
    CredentialKeeper::new(&client_config(), &retry, StaticSigner, exchange, audit)
        .expect("keeper construction")
}
