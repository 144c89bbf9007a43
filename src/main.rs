//! Tradewatch CLI
//!
//! Flags suspicious trades for one stock by checking each trade against the
//! daily price bars of its trading day, then lists repeat offenders by trader
//! and by country.
//!
//! # Usage
//! ```sh
//! tradewatch detect-abuse AMZN trades.csv --start-date 2020-02-01 --end-date 2020-02-28
//! ```
//!
//! # Environment Variables
//! - `ALPACA_API_KEY` / `ALPACA_SECRET_KEY` - Market data credentials
//! - `LOG_PRETTY` - Multi-line log output (default: false)

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;
use tradewatch::application::aggregation::AggregationKey;
use tradewatch::application::order_processor::OrderProcessor;
use tradewatch::application::report::{ReportFormat, ReportWriter, log_aggregates};
use tradewatch::config::Config;
use tradewatch::domain::ports::PriceBarFetcher;
use tradewatch::domain::rules::RuleSet;
use tradewatch::domain::types::DetectionRequest;
use tradewatch::infrastructure::alpaca::AlpacaPriceBarFetcher;
use tradewatch::infrastructure::csv_price_bars::CsvPriceBarFetcher;
use tradewatch::infrastructure::csv_trade_loader::CsvTradeLoader;

#[derive(Parser)]
#[command(author, version, about = "Suspicious trade detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect suspicious trades for one symbol
    DetectAbuse {
        /// Stock symbol the trades refer to
        symbol: String,

        /// CSV file with the trade rows
        input_filepath: PathBuf,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Read daily bars from a CSV file instead of the market data API
        #[arg(long)]
        prices_file: Option<PathBuf>,

        /// Directory to write the aggregate reports to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Report file format (csv, json)
        #[arg(long, default_value = "csv")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_logging(config.logging.pretty);

    match cli.command {
        Commands::DetectAbuse {
            symbol,
            input_filepath,
            start_date,
            end_date,
            prices_file,
            output_dir,
            format,
        } => {
            let format: ReportFormat = format.parse()?;
            let today = Local::now().date_naive();
            let start = start_date.unwrap_or(today);
            let end = end_date.unwrap_or(today);

            check_inputs(&input_filepath, start, end)?;

            info!(
                "Tradewatch {}: detecting abuse for {} from {} to {}",
                env!("CARGO_PKG_VERSION"),
                symbol,
                start,
                end
            );

            let fetcher: Box<dyn PriceBarFetcher> = match prices_file {
                Some(path) => {
                    info!("Reading price bars from: {}", path.display());
                    Box::new(CsvPriceBarFetcher::new(path))
                }
                None => {
                    if !config.market_data.has_credentials() {
                        warn!("ALPACA_API_KEY / ALPACA_SECRET_KEY not set, requests may be rejected");
                    }
                    Box::new(AlpacaPriceBarFetcher::from_config(&config.market_data))
                }
            };
            let loader = CsvTradeLoader::new(input_filepath);

            let request = DetectionRequest::new(symbol.clone(), start, end);
            let mut processor =
                OrderProcessor::build(request, RuleSet::default(), &loader, fetcher.as_ref())
                    .await;

            match processor.clean_data() {
                Ok(summary) => info!("Cleaning summary: {:?}", summary),
                Err(e) => warn!("{}", e),
            }

            let writer = output_dir.map(|dir| ReportWriter::new(dir, format));
            for (key, aggregates) in [
                (AggregationKey::Trader, processor.suspicious_traders()),
                (AggregationKey::Country, processor.suspicious_countries()),
            ] {
                // Not-ready views are already logged by the processor.
                let Ok(aggregates) = aggregates else {
                    continue;
                };
                log_aggregates(key, &aggregates);
                if let Some(writer) = &writer {
                    writer.export(&symbol, key, &aggregates)?;
                }
            }
        }
    }

    Ok(())
}

fn init_logging(pretty: bool) {
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into());

    if pretty {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

fn check_inputs(input: &Path, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    if start > end {
        anyhow::bail!("Start date {} is after end date {}", start, end);
    }
    let is_csv = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        warn!("Input file {} does not have a .csv extension", input.display());
    }
    Ok(())
}
