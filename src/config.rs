use crate::error::{CoreError, Result};
use std::time::Duration;

/// Runtime configuration for the orchestration core.
///
/// Defaults match the documented retry policies: routing uses a fixed
/// five-minute interval with three attempts, persistence writes use
/// exponential backoff from a one-second base.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Maximum work-order creation attempts per routing pass.
    pub routing_max_attempts: u32,
    /// Fixed delay between routing attempts.
    pub routing_retry_delay: Duration,
    /// Timeout applied to each individual routing attempt.
    pub routing_attempt_timeout: Duration,
    /// Maximum persistence write attempts.
    pub persistence_max_attempts: u32,
    /// Base delay for exponential persistence backoff.
    pub persistence_backoff_base: Duration,
    /// Multiplier applied to the backoff delay after each failed attempt.
    pub persistence_backoff_factor: u32,
    /// Retention window for the offline-draft idempotency ledger.
    pub dedup_retention: Duration,
    /// Capacity of the lifecycle event broadcast channel.
    pub event_channel_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            routing_max_attempts: 3,
            routing_retry_delay: Duration::from_secs(5 * 60),
            routing_attempt_timeout: Duration::from_secs(30),
            persistence_max_attempts: 3,
            persistence_backoff_base: Duration::from_secs(1),
            persistence_backoff_factor: 2,
            dedup_retention: Duration::from_secs(crate::constants::DEDUP_RETENTION_HOURS as u64 * 3600),
            event_channel_capacity: 1000,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(attempts) = std::env::var("COMPLAINT_ROUTING_MAX_ATTEMPTS") {
            config.routing_max_attempts = attempts.parse().map_err(|e| {
                CoreError::Configuration(format!("Invalid routing_max_attempts: {e}"))
            })?;
        }

        if let Ok(delay_secs) = std::env::var("COMPLAINT_ROUTING_RETRY_DELAY_SECS") {
            let secs: u64 = delay_secs.parse().map_err(|e| {
                CoreError::Configuration(format!("Invalid routing_retry_delay_secs: {e}"))
            })?;
            config.routing_retry_delay = Duration::from_secs(secs);
        }

        if let Ok(timeout_secs) = std::env::var("COMPLAINT_ROUTING_ATTEMPT_TIMEOUT_SECS") {
            let secs: u64 = timeout_secs.parse().map_err(|e| {
                CoreError::Configuration(format!("Invalid routing_attempt_timeout_secs: {e}"))
            })?;
            config.routing_attempt_timeout = Duration::from_secs(secs);
        }

        if let Ok(hours) = std::env::var("COMPLAINT_DEDUP_RETENTION_HOURS") {
            let hours: u64 = hours.parse().map_err(|e| {
                CoreError::Configuration(format!("Invalid dedup_retention_hours: {e}"))
            })?;
            config.dedup_retention = Duration::from_secs(hours * 3600);
        }

        Ok(config)
    }
}
