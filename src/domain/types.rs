use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tabular row whose optional columns can be inspected and dropped by name.
///
/// Implemented by the loaded trade and price tables so the generic table
/// utilities in `application::table` can filter and project them.
pub trait Record: Clone {
    type Column: Copy;

    /// Whether the column holds a value in this row.
    fn is_present(&self, column: Self::Column) -> bool;

    /// Drops the column's value from this row.
    fn clear(&mut self, column: Self::Column);
}

/// Columns of the trade input file, plus the derived trade day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeColumn {
    TradeId,
    TraderId,
    CountryCode,
    StockSymbol,
    TradeDatetime,
    Price,
    Volume,
    StockName,
    TradeDay,
}

/// One row of the trade input file.
///
/// Every column is optional so that blank cells survive loading; rows missing
/// a required column are removed during cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(rename = "tradeId")]
    pub trade_id: Option<String>,
    #[serde(rename = "traderId")]
    pub trader_id: Option<String>,
    #[serde(rename = "countryCode")]
    pub country_code: Option<String>,
    #[serde(rename = "stockSymbol")]
    pub stock_symbol: Option<String>,
    #[serde(rename = "tradeDatetime")]
    pub trade_datetime: Option<String>,
    pub price: Option<Decimal>,
    pub volume: Option<Decimal>,
    #[serde(rename = "stockName")]
    pub stock_name: Option<String>,
    /// Calendar date derived from `trade_datetime` while cleaning.
    #[serde(rename = "tradeDay", default, skip_deserializing)]
    pub trade_day: Option<NaiveDate>,
}

impl Record for TradeRecord {
    type Column = TradeColumn;

    fn is_present(&self, column: TradeColumn) -> bool {
        match column {
            TradeColumn::TradeId => self.trade_id.is_some(),
            TradeColumn::TraderId => self.trader_id.is_some(),
            TradeColumn::CountryCode => self.country_code.is_some(),
            TradeColumn::StockSymbol => self.stock_symbol.is_some(),
            TradeColumn::TradeDatetime => self.trade_datetime.is_some(),
            TradeColumn::Price => self.price.is_some(),
            TradeColumn::Volume => self.volume.is_some(),
            TradeColumn::StockName => self.stock_name.is_some(),
            TradeColumn::TradeDay => self.trade_day.is_some(),
        }
    }

    fn clear(&mut self, column: TradeColumn) {
        match column {
            TradeColumn::TradeId => self.trade_id = None,
            TradeColumn::TraderId => self.trader_id = None,
            TradeColumn::CountryCode => self.country_code = None,
            TradeColumn::StockSymbol => self.stock_symbol = None,
            TradeColumn::TradeDatetime => self.trade_datetime = None,
            TradeColumn::Price => self.price = None,
            TradeColumn::Volume => self.volume = None,
            TradeColumn::StockName => self.stock_name = None,
            TradeColumn::TradeDay => self.trade_day = None,
        }
    }
}

/// Value columns of a daily price bar. The date is the key and never blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarColumn {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

/// A single day's prices for the requested symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: Option<Decimal>,
    #[serde(rename = "High")]
    pub high: Option<Decimal>,
    #[serde(rename = "Low")]
    pub low: Option<Decimal>,
    #[serde(rename = "Close")]
    pub close: Option<Decimal>,
    #[serde(rename = "Adj Close")]
    pub adj_close: Option<Decimal>,
    #[serde(rename = "Volume")]
    pub volume: Option<Decimal>,
}

impl PriceBar {
    /// A bar carrying only the day's trading range.
    pub fn with_range(date: NaiveDate, high: Decimal, low: Decimal) -> Self {
        Self {
            date,
            open: None,
            high: Some(high),
            low: Some(low),
            close: None,
            adj_close: None,
            volume: None,
        }
    }
}

impl Record for PriceBar {
    type Column = BarColumn;

    fn is_present(&self, column: BarColumn) -> bool {
        match column {
            BarColumn::Open => self.open.is_some(),
            BarColumn::High => self.high.is_some(),
            BarColumn::Low => self.low.is_some(),
            BarColumn::Close => self.close.is_some(),
            BarColumn::AdjClose => self.adj_close.is_some(),
            BarColumn::Volume => self.volume.is_some(),
        }
    }

    fn clear(&mut self, column: BarColumn) {
        match column {
            BarColumn::Open => self.open = None,
            BarColumn::High => self.high = None,
            BarColumn::Low => self.low = None,
            BarColumn::Close => self.close = None,
            BarColumn::AdjClose => self.adj_close = None,
            BarColumn::Volume => self.volume = None,
        }
    }
}

/// A trade left-joined to the price bar of its trade day.
///
/// `bar` is `None` when no bar exists for that day (a non-trading day).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRow {
    pub trade: TradeRecord,
    pub bar: Option<PriceBar>,
}

/// A joined row matched by a rule, tagged with the rule's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspiciousOrder {
    pub rule: String,
    pub row: JoinedRow,
}

/// Symbol and inclusive date range of one detection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DetectionRequest {
    pub fn new(symbol: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start_date,
            end_date,
        }
    }

    /// Whether the day falls inside the requested range, both ends included.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start_date && day <= self.end_date
    }
}
