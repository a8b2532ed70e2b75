//! Rate limiting subsystem.
//!
//! # Data Flow
//! ```text
//! fetch call:
//!     → pause.rs (wait while a 429 cool-down is in flight)
//!     → token_bucket.rs (wait for an admission token)
//!     → pause.rs (re-check; a pause may have begun during the token wait)
//!     → inner fetcher
//!     → on Throttled: pause all callers, sleep Retry-After + jitter, resume
//! ```
//!
//! # Design Decisions
//! - Bucket and pause flag are owned by one `RateLimitFetcher` and shared by
//!   every call through it, never across instances
//! - Only the caller that saw the 429 sleeps; everyone else parks on the flag
//! - Wake-up is broadcast so no waiter is left behind

pub mod limiter;
pub mod pause;
pub mod token_bucket;

pub use limiter::{RateLimit, RateLimitFetcher};
pub use pause::GlobalPause;
pub use token_bucket::TokenBucket;
