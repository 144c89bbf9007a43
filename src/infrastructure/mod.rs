pub mod alpaca;
pub mod core;
pub mod csv_price_bars;
pub mod csv_trade_loader;
pub mod mock;

pub use csv_price_bars::CsvPriceBarFetcher;
pub use csv_trade_loader::CsvTradeLoader;
pub use mock::{InMemoryTradeLoader, MockPriceBarFetcher};
