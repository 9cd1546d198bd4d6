//! Token exchange: trades a signed assertion for an access token.

use std::future::Future;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::Error;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Wire shape of a successful token endpoint response.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Exchanges a signed assertion at the authorization server.
///
/// Any non-success response or transport error is a refresh failure; the
/// network timeout is owned by the implementation, not by the refresh engine.
pub trait TokenExchange: Send + Sync {
    fn exchange(
        &self,
        assertion: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send;
}

/// reqwest-backed exchange posting the JWT bearer grant as a form body.
#[derive(Clone, Debug)]
pub struct HttpTokenExchange {
    http: reqwest::Client,
    token_endpoint: String,
}

impl HttpTokenExchange {
    pub fn new(token_endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), token_endpoint)
    }

    pub fn with_client(http: reqwest::Client, token_endpoint: impl Into<String>) -> Self {
        Self {
            http,
            token_endpoint: token_endpoint.into(),
        }
    }
}

impl TokenExchange for HttpTokenExchange {
    async fn exchange(&self, assertion: &str) -> Result<TokenResponse, Error> {
        let body = format!(
            "grant_type={}&assertion={}",
            urlencoding::encode(JWT_BEARER_GRANT),
            urlencoding::encode(assertion)
        );
        let resp = self
            .http
            .post(&self.token_endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "token endpoint returned non-success");
            return Err(Error::Exchange(status, body));
        }
        let response = resp.json::<TokenResponse>().await?;
        debug!(expires_in = response.expires_in, "assertion exchanged for access token");
        Ok(response)
    }
}
