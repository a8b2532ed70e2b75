//! Fetcher assembly.
//!
//! # Responsibilities
//! - Collect and validate the recognized options
//! - Compose the layers in their fixed order: transport, then rate limit,
//!   then retry as the outermost layer

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::FetchConfig;
use crate::fetch::transport::{HttpTransport, DEFAULT_REQUEST_TIMEOUT};
use crate::fetch::Fetcher;
use crate::lifecycle::ShutdownSignal;
use crate::rate_limit::{RateLimit, RateLimitFetcher};
use crate::resilience::{RetryFetcher, RetryPolicy};

/// Invalid fetcher options.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("retries must be at least 2, got {0}")]
    InvalidRetries(u32),

    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    #[error("invalid retry policy: {0}")]
    InvalidPolicy(String),

    #[error("requests per second must be a positive finite number, got {0}")]
    InvalidRate(f64),

    #[error("burst capacity must be at least 1")]
    ZeroBurst,

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Builds the fetch pipeline.
///
/// ```no_run
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use std::time::Duration;
/// use crawl_fetch::{Fetcher, FetcherBuilder};
///
/// let fetcher = FetcherBuilder::new()
///     .with_request_timeout(Duration::from_secs(10))
///     .with_retries(3)
///     .with_rate_limit(5.0)
///     .build()?;
/// let doc = fetcher.fetch(&"https://en.wikipedia.org/wiki/Web_crawler".parse()?).await?;
/// println!("{} bytes", doc.content.len());
/// # Ok(())
/// # }
/// ```
///
/// The request timeout bounds a single network call only. Pause, rate-limit
/// and backoff waits are not covered by it, so one `fetch` can take much
/// longer than the timeout. Under sustained 429 responses the retry backoff
/// and the rate limiter's cool-down both apply to every attempt, so delays
/// compound.
#[derive(Debug, Clone)]
pub struct FetcherBuilder {
    request_timeout: Duration,
    retries: Option<u32>,
    initial_interval: Duration,
    multiplier: f64,
    randomization_factor: f64,
    rate_limit: Option<f64>,
    burst: u32,
    pause_jitter: Duration,
    user_agent: Option<String>,
    shutdown: ShutdownSignal,
}

impl FetcherBuilder {
    pub fn new() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retries: None,
            initial_interval: RetryPolicy::DEFAULT_INITIAL_INTERVAL,
            multiplier: RetryPolicy::DEFAULT_MULTIPLIER,
            randomization_factor: RetryPolicy::DEFAULT_RANDOMIZATION_FACTOR,
            rate_limit: None,
            burst: RateLimit::DEFAULT_BURST,
            pause_jitter: RateLimit::DEFAULT_PAUSE_JITTER,
            user_agent: None,
            shutdown: ShutdownSignal::never(),
        }
    }

    /// Map a configuration file onto builder options.
    pub fn from_config(config: &FetchConfig) -> Self {
        let mut builder = Self::new()
            .with_request_timeout(Duration::from_secs(config.timeouts.request_secs))
            .with_backoff(
                Duration::from_millis(config.retries.initial_interval_ms),
                config.retries.multiplier,
                config.retries.randomization_factor,
            )
            .with_burst(config.rate_limit.burst)
            .with_pause_jitter(Duration::from_millis(config.rate_limit.pause_jitter_ms));

        if config.retries.enabled {
            builder = builder.with_retries(config.retries.max_attempts);
        }
        if config.rate_limit.enabled {
            builder = builder.with_rate_limit(config.rate_limit.requests_per_second);
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.with_user_agent(agent.clone());
        }
        builder
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Total attempts per fetch, first call included. Must be at least 2.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Backoff schedule used when retries are enabled.
    pub fn with_backoff(
        mut self,
        initial_interval: Duration,
        multiplier: f64,
        randomization_factor: f64,
    ) -> Self {
        self.initial_interval = initial_interval;
        self.multiplier = multiplier;
        self.randomization_factor = randomization_factor;
        self
    }

    /// Enable retries with a prebuilt policy.
    pub fn with_retry_policy(self, policy: &RetryPolicy) -> Self {
        self.with_retries(policy.max_attempts()).with_backoff(
            policy.initial_interval(),
            policy.multiplier(),
            policy.randomization_factor(),
        )
    }

    /// Maximum sustained requests per second across all callers.
    pub fn with_rate_limit(mut self, requests_per_second: f64) -> Self {
        self.rate_limit = Some(requests_per_second);
        self
    }

    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }

    pub fn with_pause_jitter(mut self, jitter: Duration) -> Self {
        self.pause_jitter = jitter;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn build(self) -> Result<Arc<dyn Fetcher>, BuildError> {
        let retry_policy = self.retry_policy()?;
        let transport: Arc<dyn Fetcher> = Arc::new(HttpTransport::with_options(
            self.request_timeout,
            self.user_agent.as_deref(),
            self.shutdown.clone(),
        )?);

        let fetcher = self.wrap(transport, retry_policy)?;
        tracing::debug!(
            request_timeout = ?self.request_timeout,
            retries = ?self.retries,
            rate_limit = ?self.rate_limit,
            "Fetcher assembled"
        );
        Ok(fetcher)
    }

    fn retry_policy(&self) -> Result<Option<RetryPolicy>, BuildError> {
        match self.retries {
            Some(retries) if retries < 2 => Err(BuildError::InvalidRetries(retries)),
            Some(retries) => Ok(Some(RetryPolicy::new(
                retries,
                self.initial_interval,
                self.multiplier,
                self.randomization_factor,
            )?)),
            None => Ok(None),
        }
    }

    /// Stack the enabled layers on `transport`: rate limit first, retry outermost.
    fn wrap(
        &self,
        transport: Arc<dyn Fetcher>,
        retry_policy: Option<RetryPolicy>,
    ) -> Result<Arc<dyn Fetcher>, BuildError> {
        let mut fetcher = transport;

        if let Some(requests_per_second) = self.rate_limit {
            let limit = RateLimit {
                requests_per_second,
                burst: self.burst,
                pause_jitter: self.pause_jitter,
            };
            fetcher = Arc::new(
                RateLimitFetcher::new(fetcher, &limit)?.with_shutdown(self.shutdown.clone()),
            );
        }

        if let Some(policy) = retry_policy {
            fetcher = Arc::new(RetryFetcher::new(fetcher, policy).with_shutdown(self.shutdown.clone()));
        }

        Ok(fetcher)
    }
}

impl Default for FetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
