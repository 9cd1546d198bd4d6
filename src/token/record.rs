use jiff::{SignedDuration, Timestamp};

use crate::exchange::TokenResponse;

/// Buffer subtracted from the nominal expiry so a token never expires
/// mid-flight of the outbound call it authorizes.
pub const SAFETY_MARGIN: SignedDuration = SignedDuration::from_secs(30);

/// Immutable snapshot of an issued access token.
///
/// A refresh never mutates a record; it produces a new one that replaces the
/// old wholesale in the cache.
#[derive(Clone, Debug)]
pub struct TokenRecord {
    access_token: String,
    token_type: String,
    expires_in_secs: u64,
    scope: Option<String>,
    received_at: Timestamp,
}

impl TokenRecord {
    pub fn new(response: TokenResponse, received_at: Timestamp) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in_secs: response.expires_in,
            scope: response.scope,
            received_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn received_at(&self) -> Timestamp {
        self.received_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.received_at + SignedDuration::from_secs(self.expires_in_secs as i64)
    }

    /// A record is usable only while `now` plus the safety margin is still
    /// strictly before its expiry.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        now + SAFETY_MARGIN < self.expires_at()
    }

    /// Value for an `Authorization` header, e.g. `Bearer eyJ...`.
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
