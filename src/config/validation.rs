//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, rates positive, jitter in range)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FetchConfig → Result<(), Vec<ValidationError>>
//! - Checks on a disabled section are skipped

use thiserror::Error;

use crate::config::schema::FetchConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration for out-of-range values.
pub fn validate_config(config: &FetchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let retries = &config.retries;
    if retries.enabled {
        if retries.max_attempts < 2 {
            errors.push(ValidationError::new(
                "retries.max_attempts",
                format!("must be at least 2, got {}", retries.max_attempts),
            ));
        }
        if !retries.multiplier.is_finite() || retries.multiplier < 1.0 {
            errors.push(ValidationError::new(
                "retries.multiplier",
                format!("must be a finite number >= 1, got {}", retries.multiplier),
            ));
        }
        if !(0.0..1.0).contains(&retries.randomization_factor) {
            errors.push(ValidationError::new(
                "retries.randomization_factor",
                format!("must be in [0, 1), got {}", retries.randomization_factor),
            ));
        }
    }

    let rate_limit = &config.rate_limit;
    if rate_limit.enabled {
        if !rate_limit.requests_per_second.is_finite() || rate_limit.requests_per_second <= 0.0 {
            errors.push(ValidationError::new(
                "rate_limit.requests_per_second",
                format!("must be positive, got {}", rate_limit.requests_per_second),
            ));
        }
        if rate_limit.burst == 0 {
            errors.push(ValidationError::new("rate_limit.burst", "must be at least 1"));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
