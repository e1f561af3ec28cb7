//! Quiet-period debouncing for rapidly changing input.
//!
//! A [`Debouncer`] holds at most one pending value together with its deadline.
//! Every [`observe`](Debouncer::observe) replaces the pending value and pushes
//! the deadline out again, so superseded values are dropped without ever being
//! emitted. There is no background timer task: the deadline is only awaited
//! while [`settled`](Debouncer::settled) is being polled, which means dropping
//! the debouncer can never produce a late emission.

use std::time::Duration;
use tokio::time::Instant;

/// Default quiet period for search input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

struct Pending<T> {
    value: T,
    deadline: Instant,
}

pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new input value and restart the quiet period.
    pub fn observe(&mut self, value: T) {
        let deadline = Instant::now() + self.delay;
        if self.pending.is_some() {
            tracing::trace!("Debounce restarted, previous value superseded");
        }
        self.pending = Some(Pending { value, deadline });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending settle, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Wait for the pending value to settle.
    ///
    /// Pends forever while nothing is pending. Cancel-safe: if this future is
    /// dropped (e.g. another `select!` branch wins), the pending value and its
    /// deadline are kept for the next call.
    pub async fn settled(&mut self) -> T {
        let Some(deadline) = self.deadline() else {
            return std::future::pending().await;
        };
        tokio::time::sleep_until(deadline).await;
        match self.pending.take() {
            Some(p) => p.value,
            None => std::future::pending().await,
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_collapse_to_last_value() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        for text in ["c", "ca", "cat", "cats"] {
            d.observe(text.to_string());
            advance(Duration::from_millis(100)).await;
        }

        let settled = d.settled().await;
        assert_eq!(settled, "cats");

        // Nothing else is pending, so no second settle fires.
        let again = timeout(Duration::from_secs(10), d.settled()).await;
        assert!(again.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_not_before_delay() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        let start = Instant::now();
        d.observe(42);

        let value = d.settled().await;
        assert_eq!(value, 42);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observe_restarts_quiet_period() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.observe("a");
        advance(Duration::from_millis(400)).await;
        let restarted_at = Instant::now();
        d.observe("b");

        let value = d.settled().await;
        assert_eq!(value, "b");
        assert!(restarted_at.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_is_cancel_safe() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.observe("kept");

        // Lose the race against a shorter timer; pending value must survive.
        let lost = timeout(Duration::from_millis(100), d.settled()).await;
        assert!(lost.is_err());
        assert!(d.is_pending());

        assert_eq!(d.settled().await, "kept");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.observe(1);
        assert_eq!(d.cancel(), Some(1));
        assert!(!d.is_pending());

        let nothing = timeout(Duration::from_secs(2), d.settled()).await;
        assert!(nothing.is_err());
    }
}
