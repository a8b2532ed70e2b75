//! Fetch pipeline.
//!
//! # Data Flow
//! ```text
//! caller
//!     → RetryFetcher      (resilience/retries.rs: backoff + jitter, sole retry authority)
//!     → RateLimitFetcher  (rate_limit/limiter.rs: pause gate, token bucket, 429 cool-down)
//!     → HttpTransport     (transport.rs: one GET, classify response)
//!     → network
//! ```
//!
//! Results flow back unchanged. A `Throttled` failure additionally pauses
//! every caller sharing the same `RateLimitFetcher` before it is returned.
//!
//! # Design Decisions
//! - One capability (`fetch`), composed at runtime by wrapping an inner fetcher
//! - Failures are an explicit enum so layers can match on kind
//! - The transport timeout bounds only the network call; pause, rate-limit
//!   and backoff waits come on top of it

pub mod builder;
pub mod retry_after;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

pub use builder::{BuildError, FetcherBuilder};
pub use transport::HttpTransport;
pub use types::{BoxError, FetchFailure, FetchResult, FetchedDocument};

/// Downloads a page from a URL.
///
/// Implementations may be shared across tasks; one `fetch` call is one
/// logical request, possibly spanning several network attempts.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedDocument>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedDocument> {
        (**self).fetch(url).await
    }
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedDocument> {
        (**self).fetch(url).await
    }
}
