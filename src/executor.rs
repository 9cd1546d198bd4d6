use jiff::Timestamp;

use crate::errors::Error;
use crate::exchange::TokenExchange;
use crate::signer::{AssertionConfig, AssertionSigner};
use crate::token::TokenRecord;

/// Runs one refresh attempt end to end: sign an assertion, exchange it, and
/// stamp the response with its receipt time. No state of its own; the gate
/// owns all bookkeeping around an attempt.
pub struct RefreshExecutor<S, X> {
    assertion: AssertionConfig,
    signer: S,
    exchange: X,
}

impl<S, X> RefreshExecutor<S, X>
where
    S: AssertionSigner,
    X: TokenExchange,
{
    pub fn new(assertion: AssertionConfig, signer: S, exchange: X) -> Self {
        Self {
            assertion,
            signer,
            exchange,
        }
    }

    pub async fn execute(&self) -> Result<TokenRecord, Error> {
        let assertion = self.signer.sign(&self.assertion)?;
        let response = self.exchange.exchange(&assertion).await?;
        Ok(TokenRecord::new(response, Timestamp::now()))
    }
}
