//! Offline price bar source.
//!
//! Reads daily bars previously exported to CSV with the columns
//! `Date,Open,High,Low,Close,Adj Close,Volume`.

use crate::domain::errors::FetchError;
use crate::domain::ports::PriceBarFetcher;
use crate::domain::types::PriceBar;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use tracing::{debug, error};

pub struct CsvPriceBarFetcher {
    path: PathBuf,
}

impl CsvPriceBarFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_from<R: Read>(
        &self,
        reader: R,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, FetchError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut total = 0usize;
        let mut bars = Vec::new();
        for result in rdr.deserialize::<PriceBar>() {
            let bar = result.map_err(|e| FetchError::Decode {
                symbol: symbol.to_string(),
                reason: format!("{}: {}", self.path.display(), e),
            })?;
            total += 1;
            if bar.date >= start && bar.date <= end {
                bars.push(bar);
            }
        }
        bars.sort_by_key(|b| b.date);

        // An empty file means the symbol is unknown; an empty range only
        // means no trading days fell inside it.
        if total == 0 {
            error!("No information for stock '{}' in {}", symbol, self.path.display());
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
            });
        }

        debug!(
            "CsvPriceBarFetcher: {} bars for {} from {}",
            bars.len(),
            symbol,
            self.path.display()
        );
        Ok(bars)
    }
}

#[async_trait]
impl PriceBarFetcher for CsvPriceBarFetcher {
    async fn fetch_price_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, FetchError> {
        let file = File::open(&self.path).map_err(|e| FetchError::Source {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.read_from(BufReader::new(file), symbol, start, end)
    }
}
