//! Suspicious order detection for one symbol over one date range.
//!
//! The processor loads the trade file and the daily price bars, cleans and
//! joins them, runs the injected rule set and answers the two repeat-offender
//! queries (by trader and by country).

use crate::application::aggregation::{Aggregate, AggregationKey, aggregate_by};
use crate::application::table::{left_join, project_away, remove_blank};
use crate::domain::errors::{NotReadyError, ProcessingError};
use crate::domain::ports::{PriceBarFetcher, TradeLoader};
use crate::domain::rules::RuleSet;
use crate::domain::types::{
    BarColumn, DetectionRequest, JoinedRow, PriceBar, SuspiciousOrder, TradeColumn, TradeRecord,
};
use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

/// Trade columns that must be present for a row to be analysed.
pub const REQUIRED_TRADE_COLUMNS: [TradeColumn; 5] = [
    TradeColumn::TradeDatetime,
    TradeColumn::CountryCode,
    TradeColumn::TraderId,
    TradeColumn::StockSymbol,
    TradeColumn::Price,
];

const UNUSED_TRADE_COLUMNS: [TradeColumn; 4] = [
    TradeColumn::StockName,
    TradeColumn::Volume,
    TradeColumn::StockSymbol,
    TradeColumn::TradeId,
];

const UNUSED_BAR_COLUMNS: [BarColumn; 4] = [
    BarColumn::Volume,
    BarColumn::Open,
    BarColumn::Close,
    BarColumn::AdjClose,
];

/// Lifecycle of an [`OrderProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Uninitialized,
    Loaded,
    Cleaned,
    Processed,
}

/// Row counts observed at each cleaning stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningSummary {
    pub loaded_trades: usize,
    pub symbol_trades: usize,
    pub complete_trades: usize,
    pub unparseable_dates: usize,
    pub in_range_trades: usize,
    pub price_bars: usize,
    pub matched_bars: usize,
    pub suspicious_orders: usize,
}

/// Extracts the calendar date from a trade timestamp.
///
/// Accepts `YYYY-MM-DD` optionally followed by a time component, which is
/// discarded.
pub fn parse_trade_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub struct OrderProcessor {
    request: DetectionRequest,
    rules: RuleSet,
    state: ProcessingState,
    trade_data: Option<Vec<TradeRecord>>,
    stock_data: Option<Vec<PriceBar>>,
    processed: Option<Vec<SuspiciousOrder>>,
}

impl OrderProcessor {
    /// Create a processor that has not loaded anything yet.
    pub fn new(request: DetectionRequest, rules: RuleSet) -> Self {
        Self {
            request,
            rules,
            state: ProcessingState::Uninitialized,
            trade_data: None,
            stock_data: None,
            processed: None,
        }
    }

    /// Create a processor and immediately load its trade and stock data.
    pub async fn build(
        request: DetectionRequest,
        rules: RuleSet,
        loader: &dyn TradeLoader,
        fetcher: &dyn PriceBarFetcher,
    ) -> Self {
        let mut processor = Self::new(request, rules);
        processor.load(loader, fetcher).await;
        processor
    }

    /// Load the trade rows and fetch the price bars for the requested range.
    ///
    /// Failures are logged and leave the corresponding table unavailable; the
    /// processor still moves to `Loaded` so that cleaning degrades to a no-op.
    pub async fn load(&mut self, loader: &dyn TradeLoader, fetcher: &dyn PriceBarFetcher) {
        if self.state != ProcessingState::Uninitialized {
            warn!(
                "OrderProcessor: data for {} already loaded (state {:?}), ignoring reload",
                self.request.symbol, self.state
            );
            return;
        }

        self.trade_data = match loader.load() {
            Ok(rows) => {
                info!("OrderProcessor: loaded {} trade rows", rows.len());
                Some(rows)
            }
            Err(e) => {
                error!("OrderProcessor: failed to load trade data: {}", e);
                None
            }
        };

        self.stock_data = match fetcher
            .fetch_price_bars(
                &self.request.symbol,
                self.request.start_date,
                self.request.end_date,
            )
            .await
        {
            Ok(bars) => {
                info!(
                    "OrderProcessor: fetched {} price bars for {} ({} to {})",
                    bars.len(),
                    self.request.symbol,
                    self.request.start_date,
                    self.request.end_date
                );
                Some(bars)
            }
            Err(e) => {
                error!("OrderProcessor: {}", e);
                None
            }
        };

        self.transition(ProcessingState::Loaded);
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    /// Whether both the trade rows and the price bars were obtained.
    pub fn is_data_available(&self) -> bool {
        self.trade_data.is_some() && self.stock_data.is_some()
    }

    /// The processed table, once cleaning has completed.
    pub fn processed(&self) -> Option<&[SuspiciousOrder]> {
        self.processed.as_deref()
    }

    /// Clean, join and classify the loaded data.
    ///
    /// Leaves the state untouched when called before loading, when either
    /// table is unavailable, or when the data was already processed.
    pub fn clean_data(&mut self) -> Result<CleaningSummary, ProcessingError> {
        match self.state {
            ProcessingState::Uninitialized => return Err(ProcessingError::NotLoaded),
            ProcessingState::Cleaned | ProcessingState::Processed => {
                return Err(ProcessingError::AlreadyProcessed {
                    symbol: self.request.symbol.clone(),
                });
            }
            ProcessingState::Loaded => {}
        }

        let (trades, bars) = match (&self.trade_data, &self.stock_data) {
            (Some(trades), Some(bars)) => (trades, bars),
            (trades, _) => {
                let missing = if trades.is_none() {
                    "trade data"
                } else {
                    "stock data"
                };
                warn!(
                    "OrderProcessor: {} unavailable for {}, skipping cleaning",
                    missing, self.request.symbol
                );
                return Err(ProcessingError::DataUnavailable {
                    symbol: self.request.symbol.clone(),
                    missing: missing.to_string(),
                });
            }
        };

        let mut summary = CleaningSummary {
            loaded_trades: trades.len(),
            price_bars: bars.len(),
            ..Default::default()
        };

        let symbol_trades: Vec<TradeRecord> = trades
            .iter()
            .filter(|t| t.stock_symbol.as_deref() == Some(self.request.symbol.as_str()))
            .cloned()
            .collect();
        summary.symbol_trades = symbol_trades.len();

        let complete = remove_blank(&symbol_trades, &REQUIRED_TRADE_COLUMNS);
        summary.complete_trades = complete.len();

        let mut dated = Vec::with_capacity(complete.len());
        for mut trade in complete {
            match trade.trade_datetime.as_deref().and_then(parse_trade_day) {
                Some(day) => {
                    trade.trade_day = Some(day);
                    dated.push(trade);
                }
                None => {
                    warn!(
                        "OrderProcessor: dropping trade {:?} with unparseable datetime {:?}",
                        trade.trade_id, trade.trade_datetime
                    );
                    summary.unparseable_dates += 1;
                }
            }
        }

        let trades = project_away(&dated, &UNUSED_TRADE_COLUMNS);
        let bars = project_away(bars, &UNUSED_BAR_COLUMNS);

        let in_range: Vec<TradeRecord> = trades
            .into_iter()
            .filter(|t| t.trade_day.is_some_and(|day| self.request.contains(day)))
            .collect();
        summary.in_range_trades = in_range.len();

        let joined: Vec<JoinedRow> = left_join(in_range, &bars, |t| t.trade_day, |b| b.date)
            .into_iter()
            .map(|(trade, bar)| JoinedRow { trade, bar })
            .collect();
        summary.matched_bars = joined.iter().filter(|r| r.bar.is_some()).count();
        self.transition(ProcessingState::Cleaned);

        let processed = self.rules.apply(&joined);
        summary.suspicious_orders = processed.len();
        self.processed = Some(processed);
        self.transition(ProcessingState::Processed);

        info!(
            "OrderProcessor: {} -> {} trades for {}, {} complete, {} in range, {} on trading days, {} suspicious",
            summary.loaded_trades,
            summary.symbol_trades,
            self.request.symbol,
            summary.complete_trades,
            summary.in_range_trades,
            summary.matched_bars,
            summary.suspicious_orders
        );

        Ok(summary)
    }

    /// Traders with more than one suspicious order, most frequent first.
    pub fn suspicious_traders(&self) -> Result<Vec<Aggregate>, NotReadyError> {
        self.aggregate(AggregationKey::Trader)
    }

    /// Countries with more than one suspicious order, most frequent first.
    pub fn suspicious_countries(&self) -> Result<Vec<Aggregate>, NotReadyError> {
        self.aggregate(AggregationKey::Country)
    }

    fn aggregate(&self, key: AggregationKey) -> Result<Vec<Aggregate>, NotReadyError> {
        match (&self.state, &self.processed) {
            (ProcessingState::Processed, Some(processed)) => Ok(aggregate_by(processed, key)),
            _ => {
                let err = NotReadyError { view: key.view() };
                error!("{}", err);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: ProcessingState) {
        debug!(
            "OrderProcessor[{}]: {:?} -> {:?}",
            self.request.symbol, self.state, next
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FetchError;
    use crate::domain::rules::{NonTradingDayRule, PriceRangeRule};
    use crate::infrastructure::mock::{InMemoryTradeLoader, MockPriceBarFetcher};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn amzn_request() -> DetectionRequest {
        DetectionRequest::new("AMZN", date(2020, 2, 1), date(2020, 3, 31))
    }

    fn trade(id: &str, trader: &str, country: &str, datetime: &str, price: Decimal) -> TradeRecord {
        TradeRecord {
            trade_id: Some(id.to_string()),
            trader_id: Some(trader.to_string()),
            country_code: Some(country.to_string()),
            stock_symbol: Some("AMZN".to_string()),
            trade_datetime: Some(datetime.to_string()),
            price: Some(price),
            volume: Some(dec!(100)),
            stock_name: Some("Amazon.com Inc".to_string()),
            trade_day: None,
        }
    }

    fn bar(day: NaiveDate, high: Decimal, low: Decimal) -> PriceBar {
        PriceBar {
            date: day,
            open: Some(low),
            high: Some(high),
            low: Some(low),
            close: Some(high),
            adj_close: Some(high),
            volume: Some(dec!(1000000)),
        }
    }

    fn processed_with_traders(ids: &[i32]) -> OrderProcessor {
        let mut processor = OrderProcessor::new(amzn_request(), RuleSet::default());
        processor.processed = Some(
            ids.iter()
                .map(|id| SuspiciousOrder {
                    rule: PriceRangeRule::NAME.to_string(),
                    row: JoinedRow {
                        trade: TradeRecord {
                            trader_id: Some(id.to_string()),
                            ..Default::default()
                        },
                        bar: None,
                    },
                })
                .collect(),
        );
        processor.state = ProcessingState::Processed;
        processor
    }

    #[test]
    fn test_parse_trade_day_truncates_time() {
        assert_eq!(parse_trade_day("2020-02-03"), Some(date(2020, 2, 3)));
        assert_eq!(
            parse_trade_day("2020-02-03 14:31:07"),
            Some(date(2020, 2, 3))
        );
        assert_eq!(
            parse_trade_day("2020-02-03T14:31:07Z"),
            Some(date(2020, 2, 3))
        );
        assert_eq!(parse_trade_day("03/02/2020"), None);
        assert_eq!(parse_trade_day(""), None);
    }

    #[test]
    fn test_get_suspicious_traders_with_data() {
        let processor = processed_with_traders(&[1, 2, 3, 4, 5, 1, 3, 1, 4]);

        let traders = processor.suspicious_traders().unwrap();

        let ids: Vec<&str> = traders.iter().map(|a| a.key.as_str()).collect();
        let counts: Vec<usize> = traders.iter().map(|a| a.count).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
        assert_eq!(counts, vec![3, 2, 2]);
    }

    #[test]
    fn test_get_suspicious_traders_with_no_data() {
        let processor = OrderProcessor::new(amzn_request(), RuleSet::default());

        assert_eq!(processor.state(), ProcessingState::Uninitialized);
        assert_eq!(
            processor.suspicious_traders(),
            Err(NotReadyError { view: "traders" })
        );
        assert_eq!(
            processor.suspicious_countries(),
            Err(NotReadyError { view: "countries" })
        );
    }

    #[test]
    fn test_clean_before_load_is_rejected() {
        let mut processor = OrderProcessor::new(amzn_request(), RuleSet::default());
        assert_eq!(processor.clean_data(), Err(ProcessingError::NotLoaded));
        assert_eq!(processor.state(), ProcessingState::Uninitialized);
    }

    #[tokio::test]
    async fn test_no_trade_or_stock_data_is_not_ready() {
        let loader = InMemoryTradeLoader::failing("/home/test.csv");
        let fetcher = MockPriceBarFetcher::failing(FetchError::NoData {
            symbol: "AMZN".to_string(),
        });

        let mut processor =
            OrderProcessor::build(amzn_request(), RuleSet::default(), &loader, &fetcher).await;

        assert_eq!(processor.state(), ProcessingState::Loaded);
        assert!(!processor.is_data_available());
        assert!(matches!(
            processor.clean_data(),
            Err(ProcessingError::DataUnavailable { .. })
        ));
        assert_eq!(processor.state(), ProcessingState::Loaded);
        assert!(processor.processed().is_none());
        assert!(processor.suspicious_traders().is_err());
        assert!(processor.suspicious_countries().is_err());
    }

    #[tokio::test]
    async fn test_fetch_failure_alone_makes_data_unavailable() {
        let loader = InMemoryTradeLoader::new(vec![trade(
            "1",
            "7",
            "GB",
            "2020-02-03",
            dec!(105),
        )]);
        let fetcher = MockPriceBarFetcher::failing(FetchError::Timeout {
            reason: "30s elapsed".to_string(),
        });

        let mut processor =
            OrderProcessor::build(amzn_request(), RuleSet::default(), &loader, &fetcher).await;

        assert_eq!(
            processor.clean_data(),
            Err(ProcessingError::DataUnavailable {
                symbol: "AMZN".to_string(),
                missing: "stock data".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_price_outside_range_is_flagged() {
        let loader = InMemoryTradeLoader::new(vec![trade(
            "1",
            "7",
            "GB",
            "2020-02-03 10:15:00",
            dec!(105),
        )]);
        let fetcher =
            MockPriceBarFetcher::new(vec![bar(date(2020, 2, 3), dec!(100), dec!(90))]);

        let mut processor =
            OrderProcessor::build(amzn_request(), RuleSet::default(), &loader, &fetcher).await;
        let summary = processor.clean_data().unwrap();

        assert_eq!(summary.suspicious_orders, 1);
        let processed = processor.processed().unwrap();
        assert_eq!(processed[0].rule, PriceRangeRule::NAME);
        assert_eq!(processed[0].row.trade.trade_day, Some(date(2020, 2, 3)));
    }

    #[tokio::test]
    async fn test_trade_on_non_trading_day_is_flagged_once() {
        // 2020-02-08 is a Saturday: no bar
        let loader = InMemoryTradeLoader::new(vec![trade(
            "1",
            "7",
            "GB",
            "2020-02-08",
            dec!(105),
        )]);
        let fetcher =
            MockPriceBarFetcher::new(vec![bar(date(2020, 2, 7), dec!(100), dec!(90))]);

        let mut processor =
            OrderProcessor::build(amzn_request(), RuleSet::default(), &loader, &fetcher).await;
        processor.clean_data().unwrap();

        let processed = processor.processed().unwrap();
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].rule, NonTradingDayRule::NAME);
        assert!(processed[0].row.bar.is_none());
    }

    #[tokio::test]
    async fn test_cleaning_filters_symbol_blanks_and_range() {
        let mut other_symbol = trade("2", "8", "US", "2020-02-03", dec!(500));
        other_symbol.stock_symbol = Some("AAPL".to_string());
        let mut missing_country = trade("3", "9", "FR", "2020-02-03", dec!(500));
        missing_country.country_code = None;
        let mut missing_price = trade("4", "9", "FR", "2020-02-03", dec!(500));
        missing_price.price = None;

        let loader = InMemoryTradeLoader::new(vec![
            trade("1", "7", "GB", "2020-02-03", dec!(95)),
            other_symbol,
            missing_country,
            missing_price,
            trade("5", "7", "GB", "2020-01-31", dec!(500)),
            trade("6", "7", "GB", "2020-04-01", dec!(500)),
            trade("7", "7", "GB", "not a date", dec!(500)),
            trade("8", "7", "GB", "2020-03-31", dec!(500)),
        ]);
        let fetcher = MockPriceBarFetcher::new(vec![
            bar(date(2020, 2, 3), dec!(100), dec!(90)),
            bar(date(2020, 3, 31), dec!(100), dec!(90)),
        ]);

        let mut processor =
            OrderProcessor::build(amzn_request(), RuleSet::default(), &loader, &fetcher).await;
        let summary = processor.clean_data().unwrap();

        assert_eq!(
            summary,
            CleaningSummary {
                loaded_trades: 8,
                symbol_trades: 7,
                complete_trades: 5,
                unparseable_dates: 1,
                in_range_trades: 2,
                price_bars: 2,
                matched_bars: 2,
                suspicious_orders: 1,
            }
        );

        let flagged = &processor.processed().unwrap()[0];
        assert_eq!(flagged.row.trade.trade_day, Some(date(2020, 3, 31)));
        // unused columns are projected away
        assert!(flagged.row.trade.trade_id.is_none());
        assert!(flagged.row.trade.stock_symbol.is_none());
        assert!(flagged.row.trade.volume.is_none());
        let bar = flagged.row.bar.as_ref().unwrap();
        assert!(bar.open.is_none() && bar.close.is_none() && bar.adj_close.is_none());
        assert_eq!((bar.high, bar.low), (Some(dec!(100)), Some(dec!(90))));
    }

    #[tokio::test]
    async fn test_repeat_offenders_by_trader_and_country() {
        let loader = InMemoryTradeLoader::new(vec![
            trade("1", "7", "GB", "2020-02-03", dec!(105)),
            trade("2", "8", "US", "2020-02-03", dec!(95)),
            trade("3", "7", "GB", "2020-02-08", dec!(95)),
            trade("4", "9", "US", "2020-02-03", dec!(80)),
            trade("5", "9", "US", "2020-02-09", dec!(80)),
            trade("6", "7", "FR", "2020-02-03", dec!(110)),
        ]);
        let fetcher =
            MockPriceBarFetcher::new(vec![bar(date(2020, 2, 3), dec!(100), dec!(90))]);

        let mut processor =
            OrderProcessor::build(amzn_request(), RuleSet::default(), &loader, &fetcher).await;
        processor.clean_data().unwrap();

        // processed order: price rule [1, 4, 6], then non-trading-day rule [3, 5]
        let traders: Vec<(String, usize)> = processor
            .suspicious_traders()
            .unwrap()
            .into_iter()
            .map(|a| (a.key, a.count))
            .collect();
        assert_eq!(
            traders,
            vec![("7".to_string(), 3), ("9".to_string(), 2)]
        );

        let countries: Vec<(String, usize)> = processor
            .suspicious_countries()
            .unwrap()
            .into_iter()
            .map(|a| (a.key, a.count))
            .collect();
        assert_eq!(
            countries,
            vec![("GB".to_string(), 2), ("US".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_second_clean_is_rejected_and_keeps_result() {
        let loader = InMemoryTradeLoader::new(vec![
            trade("1", "7", "GB", "2020-02-03", dec!(105)),
            trade("2", "7", "GB", "2020-02-03", dec!(85)),
        ]);
        let fetcher =
            MockPriceBarFetcher::new(vec![bar(date(2020, 2, 3), dec!(100), dec!(90))]);

        let mut processor =
            OrderProcessor::build(amzn_request(), RuleSet::default(), &loader, &fetcher).await;
        processor.clean_data().unwrap();
        let first = processor.suspicious_traders().unwrap();

        assert_eq!(
            processor.clean_data(),
            Err(ProcessingError::AlreadyProcessed {
                symbol: "AMZN".to_string()
            })
        );
        assert_eq!(processor.state(), ProcessingState::Processed);
        assert_eq!(processor.suspicious_traders().unwrap(), first);
    }

    #[tokio::test]
    async fn test_empty_rule_set_yields_empty_aggregates() {
        let loader = InMemoryTradeLoader::new(vec![
            trade("1", "7", "GB", "2020-02-03", dec!(105)),
            trade("2", "7", "GB", "2020-02-08", dec!(105)),
        ]);
        let fetcher =
            MockPriceBarFetcher::new(vec![bar(date(2020, 2, 3), dec!(100), dec!(90))]);

        let mut processor =
            OrderProcessor::build(amzn_request(), RuleSet::new(Vec::new()), &loader, &fetcher)
                .await;
        processor.clean_data().unwrap();

        assert!(processor.suspicious_traders().unwrap().is_empty());
        assert!(processor.suspicious_countries().unwrap().is_empty());
    }
}
