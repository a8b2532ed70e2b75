//! Rate limiting decorator with coordinated 429 back-off.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::fetch::{BuildError, FetchFailure, FetchResult, FetchedDocument, Fetcher};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::rate_limit::pause::GlobalPause;
use crate::rate_limit::token_bucket::TokenBucket;

/// Admission rate and cool-down settings for one [`RateLimitFetcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimit {
    pub requests_per_second: f64,
    /// Requests admitted back-to-back after an idle period.
    pub burst: u32,
    /// Upper bound of the random delay added to every 429 cool-down.
    pub pause_jitter: Duration,
}

impl RateLimit {
    pub const DEFAULT_BURST: u32 = 1;
    pub const DEFAULT_PAUSE_JITTER: Duration = Duration::from_millis(1000);

    pub fn per_second(requests_per_second: f64) -> Self {
        Self {
            requests_per_second,
            burst: Self::DEFAULT_BURST,
            pause_jitter: Self::DEFAULT_PAUSE_JITTER,
        }
    }
}

/// Wraps a fetcher with a shared request rate and a global pause.
///
/// Every call made through one instance shares its token bucket and pause
/// flag. When the inner fetcher reports `Throttled`, the discovering call
/// pauses all callers, sleeps the cool-down itself, resumes them, and then
/// returns the failure.
pub struct RateLimitFetcher<F> {
    inner: F,
    bucket: TokenBucket,
    pause: GlobalPause,
    pause_jitter: Duration,
    shutdown: ShutdownSignal,
}

impl<F: Fetcher> RateLimitFetcher<F> {
    pub fn new(inner: F, limit: &RateLimit) -> Result<Self, BuildError> {
        Ok(Self {
            inner,
            bucket: TokenBucket::new(limit.requests_per_second, limit.burst)?,
            pause: GlobalPause::new(),
            pause_jitter: limit.pause_jitter,
            shutdown: ShutdownSignal::never(),
        })
    }

    /// Abort pause, admission and cool-down waits when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    fn cool_down(&self, retry_after: Duration) -> Duration {
        let max_jitter = u64::try_from(self.pause_jitter.as_millis()).unwrap_or(u64::MAX);
        retry_after.saturating_add(Duration::from_millis(fastrand::u64(0..=max_jitter)))
    }

    async fn wait_for_gate(&self, url: &Url) -> FetchResult<()> {
        if self.shutdown.guard(url, self.pause.wait_until_resumed()).await? {
            tracing::debug!(url = %url, "Resumed after global pause");
        }
        Ok(())
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for RateLimitFetcher<F> {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedDocument> {
        self.wait_for_gate(url).await?;
        self.shutdown.guard(url, self.bucket.acquire()).await?;
        // A pause may have started while this call waited for its token.
        self.wait_for_gate(url).await?;

        let result = self.inner.fetch(url).await;

        if let Err(FetchFailure::Throttled { retry_after, .. }) = &result {
            let cool_down = self.cool_down(*retry_after);
            metrics::record_throttled();
            metrics::record_pause(cool_down);
            tracing::warn!(
                url = %url,
                retry_after = ?retry_after,
                cool_down = ?cool_down,
                "Server throttled requests, pausing all callers"
            );

            let _paused = self.pause.begin();
            self.shutdown
                .guard(url, tokio::time::sleep(cool_down))
                .await?;
            tracing::info!(url = %url, "Cool-down elapsed, resuming callers");
        }

        result
    }
}
