use tracing::debug;

use crate::domain::rules::non_trading_day_rule::NonTradingDayRule;
use crate::domain::rules::price_range_rule::PriceRangeRule;
use crate::domain::rules::rule_trait::SuspicionRule;
use crate::domain::types::{JoinedRow, SuspiciousOrder};

/// Ordered collection of rules applied to every joined row.
///
/// The set is built once and injected into the order processor. Matches are
/// concatenated rule by rule, so a row flagged by two rules appears twice;
/// deduplication happens per aggregation key.
pub struct RuleSet {
    rules: Vec<Box<dyn SuspicionRule>>,
}

impl RuleSet {
    /// Create a rule set that applies the rules in the given order.
    pub fn new(rules: Vec<Box<dyn SuspicionRule>>) -> Self {
        Self { rules }
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: Box<dyn SuspicionRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Names of the enabled rules, in application order
    pub fn list_active_rules(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| r.is_enabled())
            .map(|r| r.name())
            .collect()
    }

    /// Run every enabled rule over the rows and concatenate the matches.
    pub fn apply(&self, rows: &[JoinedRow]) -> Vec<SuspiciousOrder> {
        let mut suspicious = Vec::new();

        for rule in &self.rules {
            if !rule.is_enabled() {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let before = suspicious.len();
            suspicious.extend(
                rows.iter()
                    .filter(|row| rule.matches(row))
                    .map(|row| SuspiciousOrder {
                        rule: rule.name().to_string(),
                        row: row.clone(),
                    }),
            );
            debug!(
                "Rule {} matched {} of {} rows",
                rule.name(),
                suspicious.len() - before,
                rows.len()
            );
        }

        suspicious
    }
}

impl Default for RuleSet {
    /// The price-range rule followed by the non-trading-day rule.
    fn default() -> Self {
        Self::new(vec![Box::new(PriceRangeRule), Box::new(NonTradingDayRule)])
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.list_active_rules())
            .finish()
    }
}
