//! Call pacing and budgeting for traversals.
//!
//! The remote API is metered and rate limited. A traversal keeps a hard
//! [`CallBudget`] and hands every completed call to a [`Pacer`], which may
//! pause to keep the sustained call rate below the service ceiling. Pacing is
//! separate from retry backoff.

use std::time::Duration;

use async_trait::async_trait;

/// Decides whether to pause after a remote call.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Called after each remote call with the number of calls made so far in
    /// this traversal.
    async fn after_call(&self, calls_made: u32);
}

/// Sleeps for `pause` after every `every` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPacer {
    every: u32,
    pause: Duration,
}

impl IntervalPacer {
    #[must_use]
    pub fn new(every: u32, pause: Duration) -> Self {
        Self { every, pause }
    }

    /// True if a pause is due after `calls_made` calls.
    #[must_use]
    pub fn is_due(&self, calls_made: u32) -> bool {
        self.every > 0 && calls_made > 0 && calls_made % self.every == 0
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn after_call(&self, calls_made: u32) {
        if self.is_due(calls_made) && !self.pause.is_zero() {
            tracing::trace!(calls_made, pause_ms = self.pause.as_millis() as u64, "Pacing pause");
            tokio::time::sleep(self.pause).await;
        }
    }
}

/// Never pauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn after_call(&self, _calls_made: u32) {}
}

/// Hard cap on remote calls, checked before every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallBudget {
    limit: u32,
    used: u32,
}

impl CallBudget {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    /// Reserve one call. Returns false once the budget is spent.
    pub fn try_spend(&mut self) -> bool {
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        true
    }

    #[must_use]
    pub fn used(&self) -> u32 {
        self.used
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_spends_up_to_limit() {
        let mut budget = CallBudget::new(3);
        assert!(budget.try_spend());
        assert!(budget.try_spend());
        assert!(budget.try_spend());
        assert!(!budget.try_spend());
        assert_eq!(budget.used(), 3);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_zero_budget() {
        let mut budget = CallBudget::new(0);
        assert!(!budget.try_spend());
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_interval_pacer_due() {
        let pacer = IntervalPacer::new(5, Duration::from_millis(10));
        assert!(!pacer.is_due(0));
        assert!(!pacer.is_due(4));
        assert!(pacer.is_due(5));
        assert!(!pacer.is_due(6));
        assert!(pacer.is_due(10));
        assert!(!IntervalPacer::new(0, Duration::from_millis(10)).is_due(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_pacer_sleeps_on_interval() {
        let pacer = IntervalPacer::new(5, Duration::from_secs(1));
        let start = tokio::time::Instant::now();
        for call in 1..=10 {
            pacer.after_call(call).await;
        }
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
