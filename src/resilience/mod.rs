//! # Resilience Patterns
//!
//! The generic bounded-retry scheduler shared by the routing and persistence
//! failure paths. Two named policies are provided: exponential backoff for
//! transient network-scale failures and a fixed five-minute interval for
//! department-outage-scale routing failures.

pub mod retry;

pub use retry::{
    AttemptError, AttemptOutcome, AttemptRecord, RetryError, RetryOutcome, RetryScheduler,
};

use std::time::Duration;

/// Delay strategy applied between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayStrategy {
    /// `base * factor^(n-1)` after the n-th failed attempt.
    Exponential { base: Duration, factor: u32 },
    /// Constant delay between attempts.
    FixedInterval { delay: Duration },
}

impl DelayStrategy {
    /// Delay to wait after the given 1-based failed attempt number.
    pub fn delay_after_attempt(&self, attempt_number: u32) -> Duration {
        match self {
            Self::Exponential { base, factor } => {
                let exponent = attempt_number.saturating_sub(1);
                base.saturating_mul(factor.saturating_pow(exponent))
            }
            Self::FixedInterval { delay } => *delay,
        }
    }
}

/// Bounded retry policy: attempt count, inter-attempt delay, and an optional
/// per-attempt timeout. A timed-out attempt consumes an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: DelayStrategy,
    pub attempt_timeout: Option<Duration>,
}

impl RetryPolicy {
    /// Exponential backoff for transient network operations: 1s base,
    /// doubling, 3 attempts.
    pub fn exponential() -> Self {
        Self {
            max_attempts: 3,
            delay: DelayStrategy::Exponential {
                base: Duration::from_secs(1),
                factor: 2,
            },
            attempt_timeout: None,
        }
    }

    /// Fixed-interval policy for routing: 5 minutes between attempts, 3
    /// attempts. Routing failures are typically department-outage-scale, so
    /// backing off exponentially buys nothing.
    pub fn fixed_interval() -> Self {
        Self {
            max_attempts: 3,
            delay: DelayStrategy::FixedInterval {
                delay: Duration::from_secs(5 * 60),
            },
            attempt_timeout: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn with_delay(mut self, delay: DelayStrategy) -> Self {
        self.delay = delay;
        self
    }
}
