//! I define the cooperative cancellation [`Ticker`].
//!
//! The canonicalization state machine calls [`Ticker::tick`] at every
//! bounded step (each first-degree hash, each N-degree recursion, and each
//! permutation attempt). There is no asynchronous interruption: the
//! algorithm stays single-threaded and deterministic, and can only abort at
//! checkpoint granularity.

use std::time::{Duration, Instant};

use crate::CanonError;

/// The default time budget of [`Ticker::default`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A cooperative deadline consulted by the canonicalization algorithm.
#[derive(Clone, Copy, Debug)]
pub enum Ticker {
    /// Never expires; for trusted or small inputs.
    Unbounded,
    /// Expires once the wall clock passes the deadline.
    Deadline(Instant),
}

impl Ticker {
    /// A ticker that never expires.
    pub fn unbounded() -> Self {
        Self::Unbounded
    }

    /// A ticker expiring once `budget` has elapsed from now.
    pub fn timeout(budget: Duration) -> Self {
        Self::Deadline(Instant::now() + budget)
    }

    /// A ticker with a budget of `ms` milliseconds;
    /// a budget of 0 disables the deadline.
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Unbounded
        } else {
            Self::timeout(Duration::from_millis(ms))
        }
    }

    /// Whether the budget is exhausted.
    pub fn expired(&self) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Deadline(deadline) => Instant::now() >= *deadline,
        }
    }

    /// Checkpoint: fail with [`CanonError::Timeout`] once expired.
    pub fn tick(&self) -> Result<(), CanonError> {
        if self.expired() {
            Err(CanonError::Timeout)
        } else {
            Ok(())
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::timeout(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unbounded_never_expires() {
        let ticker = Ticker::from_millis(0);
        assert!(matches!(ticker, Ticker::Unbounded));
        assert!(ticker.tick().is_ok());
    }

    #[test]
    fn zero_budget_expires_immediately() {
        let ticker = Ticker::timeout(Duration::ZERO);
        assert!(ticker.expired());
        assert!(matches!(ticker.tick(), Err(CanonError::Timeout)));
    }

    #[test]
    fn generous_budget_does_not_expire() {
        let ticker = Ticker::from_millis(60_000);
        assert!(ticker.tick().is_ok());
    }
}
