//! Currency conversion client
//!
//! Single from/to/amount conversion primitive used to normalize hotel offer
//! prices before ranking. Conversions are idempotent lookups, so transient
//! failures are retried with exponential backoff.

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::debug;

use crate::Result;
use crate::config::CurrencyConfig;
use crate::error::Error;

/// Abstraction over the conversion primitive
#[async_trait]
pub trait CurrencyApi: Send + Sync {
    /// Convert `amount` from one 3-letter currency code to another
    async fn convert(&self, from: &str, to: &str, amount: f64) -> Result<f64>;
}

/// Client for an exchange-rates HTTP API
pub struct CurrencyConverter {
    client: ClientWithMiddleware,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    result: f64,
}

impl CurrencyConverter {
    pub fn new(config: &CurrencyConfig) -> Result<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .user_agent(concat!("Tripplanr/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CurrencyApi for CurrencyConverter {
    async fn convert(&self, from: &str, to: &str, amount: f64) -> Result<f64> {
        if from == to {
            return Ok(amount);
        }

        debug!("Converting {} {} to {}", amount, from, to);
        let url = format!(
            "{}/convert?from={}&to={}&amount={}",
            self.base_url,
            urlencoding::encode(from),
            urlencoding::encode(to),
            amount,
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "currency conversion failed with status {}",
                response.status()
            )));
        }

        let body: ConvertResponse = response.json().await?;
        Ok(body.result)
    }
}
