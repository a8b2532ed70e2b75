//! Fetch metrics.
//!
//! # Metrics
//! - `fetch_attempts_total` (counter): transport attempts by outcome
//! - `fetch_retries_total` (counter): retries scheduled by the retry layer
//! - `fetch_throttled_total` (counter): 429 responses seen by the rate limiter
//! - `fetch_pause_seconds` (histogram): global pause cool-downs

use std::time::Duration;

pub fn record_attempt(outcome: &'static str) {
    ::metrics::counter!("fetch_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_retry() {
    ::metrics::counter!("fetch_retries_total").increment(1);
}

pub fn record_throttled() {
    ::metrics::counter!("fetch_throttled_total").increment(1);
}

pub fn record_pause(cool_down: Duration) {
    ::metrics::histogram!("fetch_pause_seconds").record(cool_down.as_secs_f64());
}
