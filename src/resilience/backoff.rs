//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::fetch::BuildError;

/// Retry attempt budget and backoff schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_interval: Duration,
    multiplier: f64,
    randomization_factor: f64,
}

impl RetryPolicy {
    pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
    pub const DEFAULT_MULTIPLIER: f64 = 1.75;
    pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;

    /// Create a policy.
    ///
    /// `max_attempts` counts the first call, so `1` disables retrying.
    /// `randomization_factor` must lie in `[0, 1)` and `multiplier` must be
    /// at least `1`.
    pub fn new(
        max_attempts: u32,
        initial_interval: Duration,
        multiplier: f64,
        randomization_factor: f64,
    ) -> Result<Self, BuildError> {
        if max_attempts == 0 {
            return Err(BuildError::ZeroAttempts);
        }
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(BuildError::InvalidPolicy(format!(
                "multiplier must be a finite number >= 1, got {multiplier}"
            )));
        }
        if !(0.0..1.0).contains(&randomization_factor) {
            return Err(BuildError::InvalidPolicy(format!(
                "randomization factor must be in [0, 1), got {randomization_factor}"
            )));
        }

        Ok(Self {
            max_attempts,
            initial_interval,
            multiplier,
            randomization_factor,
        })
    }

    /// Policy with the default schedule (500ms, x1.75, +/-50%).
    pub fn with_max_attempts(max_attempts: u32) -> Result<Self, BuildError> {
        Self::new(
            max_attempts,
            Self::DEFAULT_INITIAL_INTERVAL,
            Self::DEFAULT_MULTIPLIER,
            Self::DEFAULT_RANDOMIZATION_FACTOR,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn randomization_factor(&self) -> f64 {
        self.randomization_factor
    }

    /// Inclusive bounds of the delay after failed attempt `attempt` (0-based).
    pub fn delay_bounds(&self, attempt: u32) -> (Duration, Duration) {
        let base = base_delay_secs(self.initial_interval, self.multiplier, attempt);
        (
            saturating_secs(base * (1.0 - self.randomization_factor)),
            saturating_secs(base * (1.0 + self.randomization_factor)),
        )
    }

    /// Randomized delay after failed attempt `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.initial_interval,
            self.multiplier,
            self.randomization_factor,
        )
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// `initial * multiplier^attempt`, scaled by a uniform factor drawn from
/// `[1 - randomization, 1 + randomization]`.
pub fn calculate_backoff(
    attempt: u32,
    initial: Duration,
    multiplier: f64,
    randomization: f64,
) -> Duration {
    let base = base_delay_secs(initial, multiplier, attempt);
    let factor = if randomization > 0.0 {
        rand::thread_rng().gen_range((1.0 - randomization)..=(1.0 + randomization))
    } else {
        1.0
    };

    saturating_secs(base * factor)
}

fn base_delay_secs(initial: Duration, multiplier: f64, attempt: u32) -> f64 {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    initial.as_secs_f64() * multiplier.powi(exponent)
}

fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
