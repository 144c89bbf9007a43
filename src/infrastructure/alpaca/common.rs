use crate::domain::types::PriceBar;
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: String,
    #[serde(rename = "o")]
    pub open: Decimal,
    #[serde(rename = "h")]
    pub high: Decimal,
    #[serde(rename = "l")]
    pub low: Decimal,
    #[serde(rename = "c")]
    pub close: Decimal,
    #[serde(rename = "v")]
    pub volume: Decimal,
}

impl AlpacaBar {
    /// Trading day of a daily bar, read from its RFC 3339 timestamp.
    pub fn trading_day(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.date_naive())
    }

    /// Converts to a [`PriceBar`]. Alpaca reports one close, used for both
    /// close and adjusted close.
    pub fn into_price_bar(self) -> Option<PriceBar> {
        let date = self.trading_day()?;
        Some(PriceBar {
            date,
            open: Some(self.open),
            high: Some(self.high),
            low: Some(self.low),
            close: Some(self.close),
            adj_close: Some(self.close),
            volume: Some(self.volume),
        })
    }
}

/// One page of the multi-symbol bars endpoint.
#[derive(Debug, Deserialize)]
pub struct AlpacaBarsPage {
    #[serde(default)]
    pub bars: Option<HashMap<String, Vec<AlpacaBar>>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}
