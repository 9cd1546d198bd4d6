//! Keeps a short-lived OAuth2 client-credentials bearer token fresh for
//! outbound calls: cached reads on the hot path, single-flight refresh,
//! proactive renewal ahead of expiry, and jittered exponential backoff
//! against a flaky authorization server.

pub mod audit;
pub mod backoff;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod executor;
pub mod keeper;
pub mod scheduler;
pub mod signer;
pub mod token;

pub use audit::{AuditSink, SecurityEventKind, TracingAuditSink};
pub use backoff::BackoffPlan;
pub use config::{ClientConfig, Config, RetrySettings};
pub use errors::Error;
pub use exchange::{HttpTokenExchange, TokenExchange, TokenResponse};
pub use executor::RefreshExecutor;
pub use keeper::CredentialKeeper;
pub use scheduler::ProactiveRefresher;
pub use signer::{AssertionConfig, AssertionSigner, PemAssertionSigner};
pub use token::{GateOutcome, RefreshGate, RefreshOrigin, TokenCache, TokenRecord};
