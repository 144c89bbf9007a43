use crate::domain::errors::{FetchError, LoadError};
use crate::domain::types::{PriceBar, TradeRecord};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of raw trade rows.
pub trait TradeLoader: Send + Sync {
    fn load(&self) -> Result<Vec<TradeRecord>, LoadError>;
}

/// Source of daily price bars for one symbol.
#[async_trait]
pub trait PriceBarFetcher: Send + Sync {
    /// Returns the bars between `start` and `end`, both included.
    async fn fetch_price_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, FetchError>;
}
