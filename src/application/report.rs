//! Reporting utilities for repeat-offender aggregates.
//!
//! Provides log-formatted tables and CSV / JSON export.

use crate::application::aggregation::{Aggregate, AggregationKey};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// File format for exported reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            _ => anyhow::bail!("Invalid report format: {}. Must be 'csv' or 'json'", s),
        }
    }
}

fn key_column(key: AggregationKey) -> &'static str {
    match key {
        AggregationKey::Trader => "traderId",
        AggregationKey::Country => "countryCode",
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// One exported line: the representative row flattened, plus its count.
fn flatten(aggregate: &Aggregate) -> [String; 9] {
    let row = &aggregate.representative.row;
    let (high, low) = row
        .bar
        .as_ref()
        .map(|b| (opt(&b.high), opt(&b.low)))
        .unwrap_or_default();

    [
        opt(&row.trade.trader_id),
        opt(&row.trade.country_code),
        opt(&row.trade.trade_datetime),
        opt(&row.trade.price),
        opt(&row.trade.trade_day),
        high,
        low,
        aggregate.representative.rule.clone(),
        aggregate.count.to_string(),
    ]
}

/// Renders the aggregates as a fixed-width text table.
pub fn format_table(key: AggregationKey, aggregates: &[Aggregate]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} | {:<8} | {:>6} | {:<16} | {:<10} | {:>10} | {:>10} | {:>10}",
        key_column(key),
        "other",
        "count",
        "rule",
        "tradeDay",
        "price",
        "High",
        "Low"
    );
    let _ = writeln!(out, "{}", "-".repeat(100));

    if aggregates.is_empty() {
        let _ = writeln!(out, "(no repeat offenders)");
        return out;
    }

    for aggregate in aggregates {
        let [trader, country, _, price, day, high, low, rule, count] = flatten(aggregate);
        let other = match key {
            AggregationKey::Trader => country,
            AggregationKey::Country => trader,
        };
        let _ = writeln!(
            out,
            "{:<12} | {:<8} | {:>6} | {:<16} | {:<10} | {:>10} | {:>10} | {:>10}",
            aggregate.key, other, count, rule, day, price, high, low
        );
    }
    out
}

/// Logs one aggregate view under a banner.
pub fn log_aggregates(key: AggregationKey, aggregates: &[Aggregate]) {
    let banner = match key {
        AggregationKey::Trader => "Suspicious traders",
        AggregationKey::Country => "Suspicious Country",
    };
    info!("========== {} ===========", banner);
    info!("\n{}", format_table(key, aggregates));
}

/// Writer for aggregate report files.
pub struct ReportWriter {
    output_dir: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    /// Creates a new writer targeting the given output directory.
    pub fn new(output_dir: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    /// Path of the report file for one symbol and view.
    pub fn report_path(&self, symbol: &str, key: AggregationKey) -> PathBuf {
        self.output_dir.join(format!(
            "{}_suspicious_{}.{}",
            symbol.to_lowercase(),
            key.view(),
            self.format.extension()
        ))
    }

    /// Writes the aggregates to their report file and returns its path.
    pub fn export(
        &self,
        symbol: &str,
        key: AggregationKey,
        aggregates: &[Aggregate],
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)
            .context(format!("Failed to create directory: {:?}", self.output_dir))?;

        let path = self.report_path(symbol, key);
        match self.format {
            ReportFormat::Csv => Self::write_csv(&path, key, aggregates)?,
            ReportFormat::Json => Self::write_json(&path, aggregates)?,
        }

        info!("Results saved to: {}", path.display());
        Ok(path)
    }

    fn write_csv(path: &Path, key: AggregationKey, aggregates: &[Aggregate]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .context(format!("Failed to open report file {}", path.display()))?;

        writer.write_record([
            "traderId",
            "countryCode",
            "tradeDatetime",
            "price",
            "tradeDay",
            "High",
            "Low",
            "rule",
            key.count_column(),
        ])?;
        for aggregate in aggregates {
            writer.write_record(flatten(aggregate))?;
        }
        writer
            .flush()
            .context(format!("Failed to write report {}", path.display()))?;
        Ok(())
    }

    fn write_json(path: &Path, aggregates: &[Aggregate]) -> Result<()> {
        let json_output = serde_json::to_string_pretty(aggregates)
            .context("Failed to serialize aggregates to JSON")?;
        std::fs::write(path, json_output)
            .context(format!("Failed to write report {}", path.display()))?;
        Ok(())
    }
}
