use crate::domain::rules::rule_trait::SuspicionRule;
use crate::domain::types::JoinedRow;

/// Flags orders submitted above the day's high or below the day's low.
///
/// A row without a matched bar, or whose bar lacks either bound, never
/// matches: a missing range is handled by [`NonTradingDayRule`].
///
/// [`NonTradingDayRule`]: crate::domain::rules::NonTradingDayRule
#[derive(Debug, Default, Clone, Copy)]
pub struct PriceRangeRule;

impl PriceRangeRule {
    pub const NAME: &'static str = "price_range";
}

impl SuspicionRule for PriceRangeRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn matches(&self, row: &JoinedRow) -> bool {
        let Some(bar) = &row.bar else {
            return false;
        };

        match (row.trade.price, bar.high, bar.low) {
            (Some(price), Some(high), Some(low)) => price > high || price < low,
            _ => false,
        }
    }
}
