//! Minimal wiring example: build a keeper from env config, start the
//! proactive refresher, fetch one token, shut down.
//!
//! ```sh
//! export CREDENTIAL_KEEPER_CLIENT_ID=orders-service
//! export CREDENTIAL_KEEPER_AUDIENCE_URL=https://auth.example.com
//! export CREDENTIAL_KEEPER_TOKEN_ENDPOINT=https://auth.example.com/oauth/token
//! export CREDENTIAL_KEEPER_KEY_ALIAS=outbound-2024
//! export CREDENTIAL_KEEPER_PRIVATE_KEY_PATH=./signer_key.pem
//! cargo run --example client_credentials
//! ```

use std::sync::Arc;

use credential_keeper::{
    Config, CredentialKeeper, HttpTokenExchange, PemAssertionSigner, ProactiveRefresher,
    TracingAuditSink,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let config = Config::from_env()?;
    let exchange = HttpTokenExchange::new(config.client.token_endpoint.clone());
    let keeper = Arc::new(CredentialKeeper::new(
        &config.client,
        &config.retry,
        PemAssertionSigner,
        exchange,
        Arc::new(TracingAuditSink),
    )?);

    let refresher = ProactiveRefresher::spawn(keeper.clone(), config.retry.refresh_interval());

    match keeper.get_valid_token().await {
        Some(token) => println!("authorization: {}", token.authorization_value()),
        None => println!("no token available; proceeding unauthenticated"),
    }

    refresher.shutdown().await;
    Ok(())
}
