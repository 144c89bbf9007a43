//! Market data configuration parsing from environment variables.
//!
//! Credentials and endpoint of the daily bars provider (Alpaca), plus the
//! request timeout and retry budget applied to every fetch.

use anyhow::{Context, Result};
use std::env;

/// Market data provider configuration
#[derive(Debug, Clone)]
pub struct MarketDataEnvConfig {
    pub api_key: String,
    pub secret_key: String,
    pub data_url: String,
    pub feed: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for MarketDataEnvConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            data_url: "https://data.alpaca.markets".to_string(),
            feed: "iex".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl MarketDataEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            api_key: env::var("ALPACA_API_KEY").unwrap_or_default(),
            secret_key: env::var("ALPACA_SECRET_KEY").unwrap_or_default(),
            data_url: env::var("ALPACA_DATA_URL").unwrap_or(defaults.data_url),
            feed: env::var("ALPACA_FEED").unwrap_or(defaults.feed),
            timeout_secs: env::var("MARKET_DATA_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.timeout_secs.to_string())
                .parse::<u64>()
                .context("Failed to parse MARKET_DATA_TIMEOUT_SECS - must be a positive integer")?,
            max_retries: env::var("MARKET_DATA_MAX_RETRIES")
                .unwrap_or_else(|_| defaults.max_retries.to_string())
                .parse::<u32>()
                .context("Failed to parse MARKET_DATA_MAX_RETRIES - must be a positive integer")?,
        })
    }

    /// Whether API credentials were supplied.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty()
    }
}
