use thiserror::Error;

/// Errors raised while reading the trade input file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open trade file {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Trade file {path} is missing required columns: {columns:?}")]
    MissingColumns { path: String, columns: Vec<String> },

    #[error("Malformed trade record at line {line}: {reason}")]
    Parse { line: u64, reason: String },
}

/// Errors raised while retrieving daily price bars
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No information for stock '{symbol}'")]
    NoData { symbol: String },

    #[error("Market data request timed out: {reason}")]
    Timeout { reason: String },

    #[error("Market data connection failed: {reason}")]
    Connection { reason: String },

    #[error("Market data API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid market data for {symbol}: {reason}")]
    Decode { symbol: String, reason: String },

    #[error("Failed to read price file {path}: {reason}")]
    Source { path: String, reason: String },
}

impl FetchError {
    /// Whether the source answered but had nothing for the symbol.
    pub fn is_no_data(&self) -> bool {
        matches!(self, FetchError::NoData { .. })
    }
}

/// An aggregation was requested before the processed table existed
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Data is not ready, so unable to get {view} data")]
pub struct NotReadyError {
    pub view: &'static str,
}

/// Reasons the cleaning step did not run
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("Processor has not loaded any data yet")]
    NotLoaded,

    #[error("Cannot clean data for {symbol}: {missing} unavailable")]
    DataUnavailable { symbol: String, missing: String },

    #[error("Orders for {symbol} were already processed")]
    AlreadyProcessed { symbol: String },
}
