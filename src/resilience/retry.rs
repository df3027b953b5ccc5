//! Generic bounded-retry executor.
//!
//! Attempts are strictly sequential: each attempt's outcome is observed before
//! the next is scheduled, and exhaustion is reported to the caller exactly
//! once, never silently dropped.

use super::RetryPolicy;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tracing::{debug, error, warn};

/// Outcome of a single attempt, kept for audit logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum AttemptOutcome {
    Succeeded,
    Failed(String),
    TimedOut,
}

/// Audit record for one attempt of a scheduled operation.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    /// 1-based attempt number
    pub attempt_number: u32,
    pub scheduled_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
}

/// What brought down an individual attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptError<E> {
    #[error("{0}")]
    Operation(E),
    #[error("attempt timed out")]
    TimedOut,
}

/// Terminal failure of a scheduled operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetryError<E: fmt::Display> {
    #[error("operation '{operation}' exhausted after {attempts} attempts: {last_error}")]
    Exhausted {
        operation: String,
        attempts: u32,
        last_error: AttemptError<E>,
    },
}

/// Result of driving an operation through a retry policy, with the per-attempt
/// audit trail in both the success and failure cases.
#[derive(Debug)]
pub struct RetryOutcome<T, E: fmt::Display> {
    pub result: Result<T, RetryError<E>>,
    pub attempts: Vec<AttemptRecord>,
}

/// Executes operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryScheduler;

impl RetryScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Run `op` until it succeeds or the policy's attempt budget is spent.
    ///
    /// The closure receives the 1-based attempt number. Each attempt runs
    /// under the policy's per-attempt timeout when one is configured; a
    /// timeout consumes an attempt exactly like a failure.
    pub async fn execute<T, E, F, Fut>(
        &self,
        operation: &str,
        policy: &RetryPolicy,
        mut op: F,
    ) -> RetryOutcome<T, E>
    where
        E: fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempts = Vec::with_capacity(max_attempts as usize);

        for attempt_number in 1..=max_attempts {
            let scheduled_at = Utc::now();

            let attempt_result = match policy.attempt_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, op(attempt_number)).await {
                    Ok(result) => result.map_err(AttemptError::Operation),
                    Err(_) => Err(AttemptError::TimedOut),
                },
                None => op(attempt_number).await.map_err(AttemptError::Operation),
            };

            match attempt_result {
                Ok(value) => {
                    debug!(
                        operation = %operation,
                        attempt = attempt_number,
                        "Operation succeeded"
                    );
                    attempts.push(AttemptRecord {
                        attempt_number,
                        scheduled_at,
                        outcome: AttemptOutcome::Succeeded,
                    });
                    return RetryOutcome {
                        result: Ok(value),
                        attempts,
                    };
                }
                Err(attempt_error) => {
                    let outcome = match &attempt_error {
                        AttemptError::Operation(e) => AttemptOutcome::Failed(e.to_string()),
                        AttemptError::TimedOut => AttemptOutcome::TimedOut,
                    };
                    attempts.push(AttemptRecord {
                        attempt_number,
                        scheduled_at,
                        outcome,
                    });

                    if attempt_number < max_attempts {
                        let delay = policy.delay.delay_after_attempt(attempt_number);
                        warn!(
                            operation = %operation,
                            attempt = attempt_number,
                            max_attempts = max_attempts,
                            retry_delay_secs = delay.as_secs(),
                            error = %attempt_error,
                            "Attempt failed, retry scheduled"
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        error!(
                            operation = %operation,
                            attempts = max_attempts,
                            error = %attempt_error,
                            "Operation exhausted its retry budget"
                        );
                        return RetryOutcome {
                            result: Err(RetryError::Exhausted {
                                operation: operation.to_string(),
                                attempts: max_attempts,
                                last_error: attempt_error,
                            }),
                            attempts,
                        };
                    }
                }
            }
        }

        unreachable!("retry loop returns from its final attempt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{DelayStrategy, RetryPolicy};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_fixed(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::fixed_interval()
            .with_max_attempts(max_attempts)
            .with_delay(DelayStrategy::FixedInterval {
                delay: Duration::from_millis(10),
            })
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let scheduler = RetryScheduler::new();
        let outcome = scheduler
            .execute("op", &fast_fixed(3), |_| async { Ok::<_, String>(42) })
            .await;

        assert_eq!(outcome.result.unwrap(), 42);
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].outcome, AttemptOutcome::Succeeded);
    }

    #[tokio::test]
    async fn test_success_after_failures() {
        let scheduler = RetryScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let outcome = scheduler
            .execute("op", &fast_fixed(3), move |_| {
                let calls = calls_clone.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("unavailable".to_string())
                    } else {
                        Ok("created")
                    }
                }
            })
            .await;

        assert_eq!(outcome.result.unwrap(), "created");
        assert_eq!(outcome.attempts.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_reported_once_with_all_attempts() {
        let scheduler = RetryScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let outcome = scheduler
            .execute("op", &fast_fixed(3), move |_| {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("down".to_string())
                }
            })
            .await;

        // No more than max_attempts executions
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.attempts.len(), 3);
        match outcome.result {
            Err(RetryError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_are_sequential_with_policy_delay() {
        let scheduler = RetryScheduler::new();
        let policy = RetryPolicy::fixed_interval().with_max_attempts(3);

        let started = tokio::time::Instant::now();
        let outcome = scheduler
            .execute("op", &policy, |_| async { Err::<(), _>("down".to_string()) })
            .await;

        // Two 5-minute gaps between three attempts under paused time
        assert!(started.elapsed() >= Duration::from_secs(600));
        assert!(outcome.result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_consumes_an_attempt() {
        let scheduler = RetryScheduler::new();
        let policy = fast_fixed(2).with_attempt_timeout(Duration::from_secs(1));

        let outcome = scheduler
            .execute("op", &policy, |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, String>(())
            })
            .await;

        assert_eq!(outcome.attempts.len(), 2);
        assert!(outcome
            .attempts
            .iter()
            .all(|a| a.outcome == AttemptOutcome::TimedOut));
        match outcome.result {
            Err(RetryError::Exhausted { last_error, .. }) => {
                assert_eq!(last_error, AttemptError::TimedOut);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_max_attempts_clamped_to_one() {
        let scheduler = RetryScheduler::new();
        let outcome = scheduler
            .execute("op", &fast_fixed(0), |_| async { Ok::<_, String>(1) })
            .await;
        assert_eq!(outcome.attempts.len(), 1);
        assert!(outcome.result.is_ok());
    }
}
