//! Shared token bucket for request admission.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::fetch::BuildError;

struct BucketState {
    tokens: f64,
    last_update: Instant,
}

impl BucketState {
    fn refill(&mut self, capacity: f64, refill_rate: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;
    }
}

/// A token bucket admitting `requests_per_second` on average, with bursts of
/// up to `burst` requests.
///
/// Waiting callers hold a reservation: the balance may go negative, and each
/// caller sleeps until its own token would have been refilled. Admission is
/// therefore roughly first-come first-served and nobody polls.
pub struct TokenBucket {
    state: Mutex<BucketState>,
    capacity: f64,
    refill_rate: f64,
}

impl TokenBucket {
    /// Create a full bucket.
    pub fn new(requests_per_second: f64, burst: u32) -> Result<Self, BuildError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(BuildError::InvalidRate(requests_per_second));
        }
        if burst == 0 {
            return Err(BuildError::ZeroBurst);
        }

        let capacity = f64::from(burst);
        Ok(Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_update: Instant::now(),
            }),
            capacity,
            refill_rate: requests_per_second,
        })
    }

    pub fn requests_per_second(&self) -> f64 {
        self.refill_rate
    }

    pub fn burst(&self) -> u32 {
        self.capacity as u32
    }

    /// Take a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.refill(self.capacity, self.refill_rate);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Reserve a token and return how long the caller must wait for it.
    pub fn reserve(&self) -> Duration {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.refill(self.capacity, self.refill_rate);
        state.tokens -= 1.0;

        if state.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-state.tokens / self.refill_rate)
        }
    }

    /// Wait until a token is available and take it.
    ///
    /// A reservation is not returned if the future is dropped while waiting.
    pub async fn acquire(&self) {
        let wait = self.reserve();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

impl std::fmt::Debug for TokenBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucket")
            .field("requests_per_second", &self.refill_rate)
            .field("burst", &self.capacity)
            .finish()
    }
}
