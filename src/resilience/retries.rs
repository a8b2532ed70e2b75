//! Retry decorator.
//!
//! # Responsibilities
//! - Re-invoke the inner fetcher on failure, up to the policy's attempt budget
//! - Sleep an exponentially growing, jittered delay between attempts
//! - Surface the failure of the last attempt once the budget is spent
//!
//! # Design Decisions
//! - Sole retry authority: no other layer re-issues a request
//! - `Throttled` is retried like any other failure; the pause side effect
//!   belongs to the rate limiter underneath
//! - Cancellation is never retried

use async_trait::async_trait;
use url::Url;

use crate::fetch::{FetchResult, FetchedDocument, Fetcher};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::backoff::RetryPolicy;

/// Wraps a fetcher with exponential-backoff retries.
pub struct RetryFetcher<F> {
    inner: F,
    policy: RetryPolicy,
    shutdown: ShutdownSignal,
}

impl<F: Fetcher> RetryFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            shutdown: ShutdownSignal::never(),
        }
    }

    /// Abort backoff sleeps when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for RetryFetcher<F> {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedDocument> {
        let max_attempts = self.policy.max_attempts();
        let mut attempts = 0u32;

        loop {
            let err = match self.inner.fetch(url).await {
                Ok(doc) => return Ok(doc),
                Err(e) => e,
            };
            attempts += 1;

            if !err.is_retryable() {
                return Err(err);
            }
            if attempts >= max_attempts {
                if max_attempts > 1 {
                    tracing::warn!(url = %url, attempts, error = %err, "Giving up after all attempts failed");
                }
                return Err(err);
            }

            let delay = self.policy.delay(attempts - 1);
            tracing::info!(
                url = %url,
                attempt = attempts,
                max_attempts,
                delay = ?delay,
                kind = err.kind(),
                "Retrying fetch"
            );
            metrics::record_retry();

            self.shutdown.guard(url, tokio::time::sleep(delay)).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::fetch::testing::{url, ScriptedFetcher, Step, CONTENT};
    use crate::fetch::FetchFailure;
    use crate::lifecycle::Shutdown;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::with_max_attempts(max_attempts).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_when_server_responds() {
        let inner = ScriptedFetcher::always(Step::Ok);
        let fetcher = RetryFetcher::new(inner.clone(), policy(3));

        let doc = fetcher.fetch(&url()).await.unwrap();
        assert_eq!(inner.calls(), 1);
        assert_eq!(doc.url, url());
        assert_eq!(doc.content, CONTENT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let inner = ScriptedFetcher::new(
            [Step::Status(500), Step::Status(500), Step::Status(500)],
            Step::Ok,
        );
        let fetcher = RetryFetcher::new(inner.clone(), policy(5));

        let doc = fetcher.fetch(&url()).await.unwrap();
        assert_eq!(inner.calls(), 4);
        assert_eq!(doc.content, CONTENT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_is_called_max_attempts_times() {
        for max_attempts in 1..=6 {
            let inner = ScriptedFetcher::always(Step::Status(503));
            let fetcher = RetryFetcher::new(inner.clone(), policy(max_attempts));

            assert!(fetcher.fetch(&url()).await.is_err());
            assert_eq!(inner.calls(), max_attempts);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_when_successes_come_too_late() {
        let inner = ScriptedFetcher::new(
            [Step::Status(500), Step::Status(500), Step::Status(500)],
            Step::Ok,
        );
        let fetcher = RetryFetcher::new(inner.clone(), policy(3));

        assert!(fetcher.fetch(&url()).await.is_err());
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_fails_immediately() {
        let inner = ScriptedFetcher::always(Step::Status(500));
        let fetcher = RetryFetcher::new(inner.clone(), policy(1));

        let start = tokio::time::Instant::now();
        let err = fetcher.fetch(&url()).await.unwrap_err();

        assert_eq!(inner.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(matches!(err, FetchFailure::UnexpectedStatus { status: 500, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_failure_is_surfaced() {
        let inner = ScriptedFetcher::new(
            [Step::Status(500), Step::Status(502)],
            Step::Status(503),
        );
        let fetcher = RetryFetcher::new(inner.clone(), policy(3));

        let err = fetcher.fetch(&url()).await.unwrap_err();
        assert!(matches!(err, FetchFailure::UnexpectedStatus { status: 503, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_is_retried_like_any_failure() {
        let inner = ScriptedFetcher::new([Step::Throttled(Duration::from_secs(1))], Step::Ok);
        let fetcher = RetryFetcher::new(inner.clone(), policy(2));

        assert!(fetcher.fetch(&url()).await.is_ok());
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_stay_within_backoff_bounds() {
        let policy = RetryPolicy::new(5, Duration::from_millis(200), 2.0, 0.3).unwrap();
        let inner = ScriptedFetcher::always(Step::Status(500));
        let fetcher = RetryFetcher::new(inner.clone(), policy.clone());

        assert!(fetcher.fetch(&url()).await.is_err());

        // The paused clock advances timers at millisecond granularity.
        let tolerance = Duration::from_millis(1);
        let stamps = inner.timestamps();
        assert_eq!(stamps.len(), 5);
        for (n, pair) in stamps.windows(2).enumerate() {
            let gap = pair[1] - pair[0];
            let (low, high) = policy.delay_bounds(n as u32);
            assert!(gap >= low, "gap {gap:?} below {low:?} at attempt {n}");
            assert!(gap <= high + tolerance, "gap {gap:?} above {high:?} at attempt {n}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_backoff() {
        let shutdown = Shutdown::new();
        let inner = ScriptedFetcher::always(Step::Status(500));
        let policy = RetryPolicy::new(3, Duration::from_secs(3600), 1.0, 0.0).unwrap();
        let fetcher = RetryFetcher::new(inner.clone(), policy).with_shutdown(shutdown.subscribe());

        let handle = tokio::spawn(async move { fetcher.fetch(&url()).await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        shutdown.trigger();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, FetchFailure::Cancelled { .. }));
        assert_eq!(inner.calls(), 1);
    }
}
