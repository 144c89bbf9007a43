//! Configuration module for Tradewatch.
//!
//! Settings are loaded from environment variables (optionally seeded from a
//! `.env` file), organized by concern: market data and logging. Run
//! parameters (symbol, file, dates) come from the command line instead.

mod logging_config;
mod market_data_config;

pub use logging_config::LoggingEnvConfig;
pub use market_data_config::MarketDataEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub market_data: MarketDataEnvConfig,
    pub logging: LoggingEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let market_data =
            MarketDataEnvConfig::from_env().context("Failed to load market data config")?;
        let logging = LoggingEnvConfig::from_env();

        Ok(Self {
            market_data,
            logging,
        })
    }
}
