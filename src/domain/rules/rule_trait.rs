use crate::domain::types::JoinedRow;

/// Trait for all suspicious-order rules
///
/// Each rule is a pure predicate over a trade joined to its day's price bar.
/// Rules are independent: the same row may be matched by several of them.
pub trait SuspicionRule: Send + Sync {
    /// Unique name for logging and reporting
    fn name(&self) -> &str;

    /// Whether the row is suspicious under this rule
    fn matches(&self, row: &JoinedRow) -> bool;

    /// Whether this rule is currently enabled
    ///
    /// Disabled rules are skipped when the rule set is applied.
    /// Default: true (always enabled)
    fn is_enabled(&self) -> bool {
        true
    }
}
