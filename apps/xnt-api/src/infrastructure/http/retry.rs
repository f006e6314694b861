//! Constant-interval retry budget for REST requests.

use std::time::{Duration, Instant};

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub interval: Duration,
    /// No retry starts once this much time has passed since the first attempt.
    pub max_elapsed: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(1),
            max_elapsed: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Never retry.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            interval: Duration::ZERO,
            max_elapsed: Duration::ZERO,
        }
    }
}

/// Retry state of one request.
#[derive(Debug)]
pub struct ConstantBackoff {
    attempt: u32,
    max_attempts: u32,
    interval: Duration,
    max_elapsed: Duration,
    started: Instant,
}

impl ConstantBackoff {
    /// Start counting from now.
    #[must_use]
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            interval: config.interval,
            max_elapsed: config.max_elapsed,
            started: Instant::now(),
        }
    }

    /// Record a failed attempt and return the pause before the next one, or
    /// `None` when the budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }
        if self.started.elapsed() + self.interval > self.max_elapsed {
            return None;
        }
        Some(self.interval)
    }

    /// Failed attempts so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempt
    }
}
