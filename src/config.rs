//! Configuration surface for one outbound client identity.

use std::time::Duration;

use serde::Deserialize;

use crate::errors::Error;

/// Static properties of the client identity used to sign assertions and
/// reach the token endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    pub client_id: String,
    /// Audience URL placed in the `aud` claim of the signed assertion.
    pub audience_url: String,
    /// Absolute URL of the token endpoint assertions are exchanged at.
    pub token_endpoint: String,
    /// Key identifier carried in the JWS `kid` header.
    pub key_alias: String,
    /// Inline PEM private key; takes precedence over `private_key_path`.
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub private_key_path: Option<String>,
    #[serde(default)]
    pub private_key_passphrase: Option<String>,
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Lifetime of the signed assertion in seconds.
    #[serde(default = "default_assertion_ttl_secs")]
    pub assertion_ttl_secs: u64,
    /// Offset applied to the `iat` claim to tolerate clock skew.
    #[serde(default = "default_issued_at_offset_secs")]
    pub issued_at_offset_secs: i64,
}

/// Retry and scheduling knobs for the refresh engine.
#[derive(Clone, Debug, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl RetrySettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            client: ClientConfig {
                client_id: require_env("CREDENTIAL_KEEPER_CLIENT_ID")?,
                audience_url: require_env("CREDENTIAL_KEEPER_AUDIENCE_URL")?,
                token_endpoint: require_env("CREDENTIAL_KEEPER_TOKEN_ENDPOINT")?,
                key_alias: require_env("CREDENTIAL_KEEPER_KEY_ALIAS")?,
                private_key: std::env::var("CREDENTIAL_KEEPER_PRIVATE_KEY").ok(),
                private_key_path: std::env::var("CREDENTIAL_KEEPER_PRIVATE_KEY_PATH").ok(),
                private_key_passphrase: std::env::var("CREDENTIAL_KEEPER_PRIVATE_KEY_PASSPHRASE")
                    .ok(),
                scope: std::env::var("CREDENTIAL_KEEPER_SCOPE").unwrap_or_else(|_| default_scope()),
                assertion_ttl_secs: default_assertion_ttl_secs(),
                issued_at_offset_secs: default_issued_at_offset_secs(),
            },
            retry: RetrySettings::default(),
        })
    }
}

fn require_env(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::Config(format!("missing {name} env var")))
}

fn default_scope() -> String {
    "read write".to_string()
}

fn default_assertion_ttl_secs() -> u64 {
    300
}

fn default_issued_at_offset_secs() -> i64 {
    -30
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_refresh_interval_ms() -> u64 {
    3_000_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let raw = r#"{
            "client": {
                "client_id": "orders-service",
                "audience_url": "https://auth.example.test",
                "token_endpoint": "https://auth.example.test/oauth/token",
                "key_alias": "outbound-2024"
            }
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.client.scope, "read write");
        assert_eq!(config.client.assertion_ttl_secs, 300);
        assert_eq!(config.client.issued_at_offset_secs, -30);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_backoff_ms, 1_000);
        assert_eq!(config.retry.max_backoff_ms, 60_000);
        assert_eq!(config.retry.refresh_interval_ms, 3_000_000);
    }

    #[test]
    fn from_file_reads_json() {
        let raw = r#"{
            "client": {
                "client_id": "orders-service",
                "audience_url": "https://auth.example.test",
                "token_endpoint": "https://auth.example.test/oauth/token",
                "key_alias": "outbound-2024",
                "private_key_path": "/etc/keys/outbound.pem"
            },
            "retry": { "max_retries": 3 }
        }"#;
        let path = std::env::temp_dir().join("credential-keeper-config-test.json");
        std::fs::write(&path, raw).unwrap();
        let config = Config::from_file(&path.to_string_lossy()).unwrap();
        assert_eq!(config.client.client_id, "orders-service");
        assert_eq!(
            config.client.private_key_path.as_deref(),
            Some("/etc/keys/outbound.pem")
        );
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.initial_backoff_ms, 1_000);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_file("/no/such/config.json").expect_err("should fail");
        assert!(matches!(err, Error::Io(_)));
    }
}
