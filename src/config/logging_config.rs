//! Logging configuration parsing from environment variables.
//!
//! Log levels themselves come from `RUST_LOG` through the subscriber's
//! `EnvFilter`; this only selects the output format.

use std::env;

/// Logging environment configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingEnvConfig {
    pub pretty: bool,
}

impl LoggingEnvConfig {
    pub fn from_env() -> Self {
        Self {
            pretty: env::var("LOG_PRETTY")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .unwrap_or(false),
        }
    }
}
