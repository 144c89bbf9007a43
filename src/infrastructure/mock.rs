use crate::domain::errors::{FetchError, LoadError};
use crate::domain::ports::{PriceBarFetcher, TradeLoader};
use crate::domain::types::{PriceBar, TradeRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use tracing::info;

/// Trade loader serving rows held in memory.
pub struct InMemoryTradeLoader {
    rows: Option<Vec<TradeRecord>>,
    path: String,
}

impl InMemoryTradeLoader {
    pub fn new(rows: Vec<TradeRecord>) -> Self {
        Self {
            rows: Some(rows),
            path: "<memory>".to_string(),
        }
    }

    /// A loader that fails as if the file at `path` could not be opened.
    pub fn failing(path: &str) -> Self {
        Self {
            rows: None,
            path: path.to_string(),
        }
    }
}

impl TradeLoader for InMemoryTradeLoader {
    fn load(&self) -> Result<Vec<TradeRecord>, LoadError> {
        self.rows.clone().ok_or_else(|| LoadError::Open {
            path: self.path.clone(),
            reason: "No such file or directory".to_string(),
        })
    }
}

/// Price bar fetcher returning a canned response and recording its calls.
pub struct MockPriceBarFetcher {
    bars: Vec<PriceBar>,
    failure: Mutex<Option<FetchError>>,
    calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockPriceBarFetcher {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self {
            bars,
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A fetcher whose first call fails with `error`; later calls return no bars.
    pub fn failing(error: FetchError) -> Self {
        Self {
            bars: Vec::new(),
            failure: Mutex::new(Some(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Arguments of every call received so far.
    pub fn calls(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl PriceBarFetcher for MockPriceBarFetcher {
    async fn fetch_price_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, FetchError> {
        match self.calls.lock() {
            Ok(mut guard) => guard.push((symbol.to_string(), start, end)),
            Err(poisoned) => poisoned.into_inner().push((symbol.to_string(), start, end)),
        }

        let failure = match self.failure.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(error) = failure {
            return Err(error);
        }

        let bars: Vec<PriceBar> = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        info!(
            "MockPriceBarFetcher: serving {} bars for {} ({} to {})",
            bars.len(),
            symbol,
            start,
            end
        );
        Ok(bars)
    }
}
