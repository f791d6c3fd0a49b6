//! Bounded refresh-and-retry budget.
//!
//! An `Expired` token signal from the provider is the only condition that is
//! recovered locally. Each signal consumes one unit of the call's budget, and
//! the request is resent only while units remain, so a call sends at most
//! `limit` times.

/// Default number of sends allowed per logical call.
pub const DEFAULT_RETRY_BUDGET: u32 = 2;

/// Per-call counter bounding refresh-and-retry cycles.
///
/// # Examples
///
/// ```
/// use registerblast::RetryBudget;
///
/// let mut budget = RetryBudget::new(2);
/// assert!(budget.consume());  // first Expired: refresh and resend
/// assert!(!budget.consume()); // second Expired: give up
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    pub fn new(limit: u32) -> Self {
        Self { remaining: limit }
    }

    /// Records one `Expired` signal.
    ///
    /// Returns `true` if a refresh-and-resend may follow.
    pub fn consume(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_allows_one_retry() {
        let mut budget = RetryBudget::default();
        assert_eq!(budget.remaining(), 2);
        assert!(budget.consume());
        assert_eq!(budget.remaining(), 1);
        assert!(!budget.consume());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_larger_budget() {
        let mut budget = RetryBudget::new(4);
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(!budget.consume());
    }

    #[test]
    fn test_zero_and_one_disable_retries() {
        assert!(!RetryBudget::new(0).consume());
        assert!(!RetryBudget::new(1).consume());
    }

    #[test]
    fn test_exhausted_budget_stays_exhausted() {
        let mut budget = RetryBudget::new(1);
        assert!(!budget.consume());
        assert!(!budget.consume());
        assert_eq!(budget.remaining(), 0);
    }
}
