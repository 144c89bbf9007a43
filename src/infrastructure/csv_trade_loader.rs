//! Trade file loading.
//!
//! Reads the trade CSV into [`TradeRecord`] rows. Blank cells become `None`;
//! columns beyond the expected ones are ignored.

use crate::domain::errors::LoadError;
use crate::domain::ports::TradeLoader;
use crate::domain::types::TradeRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use tracing::debug;

/// Header names every trade file must carry.
pub const TRADE_FILE_COLUMNS: [&str; 8] = [
    "tradeId",
    "traderId",
    "countryCode",
    "stockSymbol",
    "tradeDatetime",
    "price",
    "volume",
    "stockName",
];

pub struct CsvTradeLoader {
    path: PathBuf,
}

impl CsvTradeLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_from<R: Read>(&self, reader: R) -> Result<Vec<TradeRecord>, LoadError> {
        let source = self.path.display().to_string();
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers().map_err(|e| LoadError::Parse {
            line: 1,
            reason: e.to_string(),
        })?;
        let missing: Vec<String> = TRADE_FILE_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|h| h == **column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                path: source,
                columns: missing,
            });
        }

        let mut rows = Vec::new();
        for result in rdr.deserialize::<TradeRecord>() {
            let record = result.map_err(|e| LoadError::Parse {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            rows.push(record);
        }

        debug!("CsvTradeLoader: read {} rows from {}", rows.len(), source);
        Ok(rows)
    }
}

impl TradeLoader for CsvTradeLoader {
    fn load(&self) -> Result<Vec<TradeRecord>, LoadError> {
        let file = File::open(&self.path).map_err(|e| LoadError::Open {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.read_from(BufReader::new(file))
    }
}
