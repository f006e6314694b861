//! Reconnection Policy
//!
//! A dropped stream is reopened either at once or after an exponential
//! backoff with jitter, bounded by an optional attempt limit.

use std::time::Duration;

use rand::Rng;

/// Backoff parameters for stream reconnection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after every attempt.
    pub multiplier: f64,
    /// Jitter as a fraction of the delay (0.1 = ±10%).
    pub jitter_factor: f64,
    /// Maximum consecutive attempts (0 = unlimited).
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter_factor: 0.1,
            max_attempts: 0,
        }
    }
}

impl ReconnectConfig {
    /// Set the attempt limit.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay bounds.
    #[must_use]
    pub const fn with_delays(mut self, initial_delay: Duration, max_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.max_delay = max_delay;
        self
    }
}

/// How a stream consumer reacts to a dropped connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ReconnectMode {
    /// Reopen at once, forever.
    #[default]
    Immediate,
    /// Reopen after a growing delay.
    Backoff(ReconnectConfig),
}

impl ReconnectMode {
    /// Fresh policy state for one consumer.
    #[must_use]
    pub fn policy(&self) -> ReconnectPolicy {
        match self {
            Self::Immediate => ReconnectPolicy::immediate(),
            Self::Backoff(config) => ReconnectPolicy::new(config.clone()),
        }
    }
}

/// Per-consumer reconnection state.
#[derive(Debug)]
pub struct ReconnectPolicy {
    config: Option<ReconnectConfig>,
    current_delay: Duration,
    attempt_count: u32,
}

impl ReconnectPolicy {
    /// Policy with exponential backoff.
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        let initial_delay = config.initial_delay;
        Self {
            config: Some(config),
            current_delay: initial_delay,
            attempt_count: 0,
        }
    }

    /// Policy that never waits and never gives up.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            config: None,
            current_delay: Duration::ZERO,
            attempt_count: 0,
        }
    }

    /// Delay before the next attempt, or `None` once attempts are exhausted.
    #[must_use]
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempt_count = self.attempt_count.saturating_add(1);
        let Some(config) = &self.config else {
            return Some(Duration::ZERO);
        };
        if config.max_attempts > 0 && self.attempt_count > config.max_attempts {
            return None;
        }

        let delay = apply_jitter(self.current_delay, config.jitter_factor);

        let scaled = (self.current_delay.as_millis() as f64 * config.multiplier).round();
        let next_millis = if scaled.is_finite() && scaled > 0.0 {
            scaled as u128
        } else {
            0
        };
        let capped = next_millis.min(config.max_delay.as_millis());
        self.current_delay = Duration::from_millis(u64::try_from(capped).unwrap_or(u64::MAX));

        Some(delay)
    }

    /// Forget past failures after a connection was established.
    pub fn reset(&mut self) {
        if let Some(config) = &self.config {
            self.current_delay = config.initial_delay;
        }
        self.attempt_count = 0;
    }

    /// Consecutive attempts since the last reset.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }
}

fn apply_jitter(duration: Duration, jitter_factor: f64) -> Duration {
    if jitter_factor <= 0.0 || duration.is_zero() {
        return duration;
    }
    let base_millis = duration.as_millis() as f64;
    let jitter_range = base_millis * jitter_factor;
    let jitter: f64 = rand::rng().random_range(-jitter_range..=jitter_range);
    Duration::from_millis((base_millis + jitter).max(1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(max_attempts: u32) -> ReconnectConfig {
        ReconnectConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            multiplier: 2.0,
            jitter_factor: 0.0,
            max_attempts,
        }
    }

    #[test]
    fn immediate_mode_never_waits_or_stops() {
        let mut policy = ReconnectMode::Immediate.policy();
        for _ in 0..1000 {
            assert_eq!(policy.next_delay(), Some(Duration::ZERO));
        }
        assert_eq!(policy.attempt_count(), 1000);
    }

    #[test]
    fn backoff_grows_and_caps() {
        let mut policy = ReconnectMode::Backoff(exact(0)).policy();
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(200)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(350)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(350)));
    }

    #[test]
    fn backoff_is_bounded_by_attempts() {
        let mut policy = ReconnectPolicy::new(exact(2));
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_none());

        policy.reset();
        assert_eq!(policy.attempt_count(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn jitter_stays_in_bounds() {
        for _ in 0..100 {
            let mut policy = ReconnectPolicy::new(ReconnectConfig {
                initial_delay: Duration::from_millis(1000),
                ..ReconnectConfig::default()
            });
            let millis = policy.next_delay().unwrap().as_millis();
            assert!((900..=1100).contains(&millis), "delay {millis}ms out of range");
        }
    }
}
