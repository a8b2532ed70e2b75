//! Resilient page fetching for web crawlers.
//!
//! A [`Fetcher`] downloads one URL. [`FetcherBuilder`] stacks optional
//! layers on top of the HTTP transport: a shared rate limiter that pauses
//! every caller when the server answers 429, and a retry layer with
//! exponential backoff.

pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod observability;
pub mod rate_limit;
pub mod resilience;

pub use config::schema::FetchConfig;
pub use fetch::{
    BuildError, FetchFailure, FetchResult, FetchedDocument, Fetcher, FetcherBuilder, HttpTransport,
};
pub use lifecycle::{Shutdown, ShutdownSignal};
pub use rate_limit::{RateLimit, RateLimitFetcher};
pub use resilience::{RetryFetcher, RetryPolicy};
