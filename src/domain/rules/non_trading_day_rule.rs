use crate::domain::rules::rule_trait::SuspicionRule;
use crate::domain::types::JoinedRow;

/// Flags orders submitted on a day for which no price bar exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonTradingDayRule;

impl NonTradingDayRule {
    pub const NAME: &'static str = "non_trading_day";
}

impl SuspicionRule for NonTradingDayRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn matches(&self, row: &JoinedRow) -> bool {
        row.bar.is_none()
    }
}
