//! Repeat-offender aggregation over the processed table.

use crate::domain::types::SuspiciousOrder;
use serde::Serialize;
use std::collections::HashMap;

/// Dimension along which suspicious orders are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationKey {
    Trader,
    Country,
}

impl AggregationKey {
    /// Label used in logs and not-ready diagnostics.
    pub fn view(self) -> &'static str {
        match self {
            AggregationKey::Trader => "traders",
            AggregationKey::Country => "countries",
        }
    }

    /// Name of the count column in exported reports.
    pub fn count_column(self) -> &'static str {
        match self {
            AggregationKey::Trader => "suspiciousOrdersCount",
            AggregationKey::Country => "suspiciousCountryCount",
        }
    }

    fn extract(self, order: &SuspiciousOrder) -> Option<&str> {
        match self {
            AggregationKey::Trader => order.row.trade.trader_id.as_deref(),
            AggregationKey::Country => order.row.trade.country_code.as_deref(),
        }
    }
}

/// One repeat offender: a trader or country with its suspicious order count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub key: String,
    pub count: usize,
    /// First processed-table row seen for this key.
    pub representative: SuspiciousOrder,
}

/// Groups suspicious orders by the key and keeps the keys seen more than once.
///
/// Results are sorted by descending count. Keys with equal counts keep the
/// order in which they first appear in `orders`. Rows without a value for the
/// key are ignored.
pub fn aggregate_by(orders: &[SuspiciousOrder], key: AggregationKey) -> Vec<Aggregate> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<(&str, &SuspiciousOrder)> = Vec::new();

    for order in orders {
        let Some(value) = key.extract(order) else {
            continue;
        };
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            first_seen.push((value, order));
        }
        *count += 1;
    }

    let mut aggregates: Vec<Aggregate> = first_seen
        .into_iter()
        .filter_map(|(value, order)| {
            let count = counts.get(value).copied().unwrap_or(0);
            (count > 1).then(|| Aggregate {
                key: value.to_string(),
                count,
                representative: order.clone(),
            })
        })
        .collect();

    // sort_by is stable: equal counts keep first-seen order
    aggregates.sort_by(|a, b| b.count.cmp(&a.count));
    aggregates
}
