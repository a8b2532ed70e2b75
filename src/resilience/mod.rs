//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! fetch call:
//!     → retries.rs (attempt inner fetch)
//!     → On failure: backoff.rs (initial * multiplier^n, +/- randomization)
//!     → sleep, then attempt again until the budget is spent
//! ```
//!
//! # Design Decisions
//! - Attempt budget counts the first call (`max_attempts = 1` means no retry)
//! - Jittered backoff keeps concurrent retriers from moving in lockstep
//! - Every retry re-enters the layers underneath, rate limiting included

pub mod backoff;
pub mod retries;

pub use backoff::{calculate_backoff, RetryPolicy};
pub use retries::RetryFetcher;
