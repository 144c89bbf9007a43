pub mod non_trading_day_rule;
pub mod price_range_rule;
pub mod rule_set;
pub mod rule_trait;

pub use non_trading_day_rule::NonTradingDayRule;
pub use price_range_rule::PriceRangeRule;
pub use rule_set::RuleSet;
pub use rule_trait::SuspicionRule;
