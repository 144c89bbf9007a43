use crate::config::Config;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const VARS: [&str; 7] = [
    "ALPACA_API_KEY",
    "ALPACA_SECRET_KEY",
    "ALPACA_DATA_URL",
    "ALPACA_FEED",
    "MARKET_DATA_TIMEOUT_SECS",
    "MARKET_DATA_MAX_RETRIES",
    "LOG_PRETTY",
];

fn clear_vars() {
    for var in VARS {
        // SAFETY: env mutation is serialized by ENV_LOCK
        unsafe { env::remove_var(var) };
    }
}

#[test]
fn test_config_defaults_without_env() {
    let _guard = get_env_lock().lock().unwrap_or_else(|p| p.into_inner());
    clear_vars();

    let config = Config::from_env().unwrap();

    assert_eq!(config.market_data.data_url, "https://data.alpaca.markets");
    assert_eq!(config.market_data.feed, "iex");
    assert_eq!(config.market_data.timeout_secs, 30);
    assert_eq!(config.market_data.max_retries, 3);
    assert!(!config.market_data.has_credentials());
    assert!(!config.logging.pretty);
}

#[test]
fn test_config_reads_overrides() {
    let _guard = get_env_lock().lock().unwrap_or_else(|p| p.into_inner());
    clear_vars();
    unsafe {
        env::set_var("ALPACA_API_KEY", "key");
        env::set_var("ALPACA_SECRET_KEY", "secret");
        env::set_var("ALPACA_DATA_URL", "http://localhost:8080");
        env::set_var("ALPACA_FEED", "sip");
        env::set_var("MARKET_DATA_TIMEOUT_SECS", "5");
        env::set_var("MARKET_DATA_MAX_RETRIES", "0");
        env::set_var("LOG_PRETTY", "true");
    }

    let config = Config::from_env().unwrap();

    assert!(config.market_data.has_credentials());
    assert_eq!(config.market_data.data_url, "http://localhost:8080");
    assert_eq!(config.market_data.feed, "sip");
    assert_eq!(config.market_data.timeout_secs, 5);
    assert_eq!(config.market_data.max_retries, 0);
    assert!(config.logging.pretty);

    clear_vars();
}

#[test]
fn test_config_rejects_invalid_timeout() {
    let _guard = get_env_lock().lock().unwrap_or_else(|p| p.into_inner());
    clear_vars();
    unsafe { env::set_var("MARKET_DATA_TIMEOUT_SECS", "soon") };

    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("MARKET_DATA_TIMEOUT_SECS"));

    clear_vars();
}
