//! Structured audit trail for credential lifecycle transitions.

use std::fmt;

use tracing::{Level, event};

/// Security event kinds recorded on every refresh transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityEventKind {
    TokenRefreshSuccess,
    TokenRefreshFailure,
    RetriesExhausted,
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityEventKind::TokenRefreshSuccess => write!(f, "token_refresh_success"),
            SecurityEventKind::TokenRefreshFailure => write!(f, "token_refresh_failure"),
            SecurityEventKind::RetriesExhausted => write!(f, "retries_exhausted"),
        }
    }
}

/// Sink for security audit events.
///
/// Recording is fire-and-forget: implementations must not panic, and a
/// misbehaving sink must never affect the refresh outcome that produced the
/// event.
pub trait AuditSink: Send + Sync {
    fn record(&self, kind: SecurityEventKind, subject: &str, detail: &str);
}

/// Default sink emitting audit events as `tracing` events, failures at warn
/// and exhaustion at error so they surface in ordinary log pipelines.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, kind: SecurityEventKind, subject: &str, detail: &str) {
        match kind {
            SecurityEventKind::TokenRefreshSuccess => event!(
                Level::INFO,
                kind = %kind,
                subject = subject,
                detail = detail,
                "security.audit"
            ),
            SecurityEventKind::TokenRefreshFailure => event!(
                Level::WARN,
                kind = %kind,
                subject = subject,
                detail = detail,
                "security.audit"
            ),
            SecurityEventKind::RetriesExhausted => event!(
                Level::ERROR,
                kind = %kind,
                subject = subject,
                detail = detail,
                "security.audit"
            ),
        }
    }
}
