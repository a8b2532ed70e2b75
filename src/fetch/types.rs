//! Fetch result types and failure taxonomy.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Boxed error used as the cause of a network failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A downloaded page.
///
/// `id` is assigned by storage and is `0` until the document is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedDocument {
    pub id: i64,
    pub url: Url,
    pub content: String,
}

impl FetchedDocument {
    /// Create a document that has not been persisted yet.
    pub fn new(url: Url, content: impl Into<String>) -> Self {
        Self::with_id(0, url, content)
    }

    pub fn with_id(id: i64, url: Url, content: impl Into<String>) -> Self {
        Self {
            id,
            url,
            content: content.into(),
        }
    }
}

/// Classified failure of a single fetch.
///
/// Every variant carries the URL the fetch was issued for.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// I/O, DNS, TLS, or timeout failure of the transport.
    #[error("unable to fetch '{url}': {source}")]
    Network {
        url: Url,
        #[source]
        source: BoxError,
    },

    /// Server answered with a status other than 200 or 429.
    #[error("unable to fetch '{url}': expected status 200 but server returned {status}")]
    UnexpectedStatus { url: Url, status: u16 },

    /// Server answered 429 Too Many Requests.
    #[error("unable to fetch '{url}': too many requests, retry after {}s", retry_after.as_secs())]
    Throttled {
        url: Url,
        retry_after: Duration,
        headers: HeaderMap,
    },

    /// The fetch was interrupted by a shutdown signal.
    #[error("fetch of '{url}' was cancelled")]
    Cancelled { url: Url },
}

impl FetchFailure {
    pub fn network(url: &Url, source: impl Into<BoxError>) -> Self {
        FetchFailure::Network {
            url: url.clone(),
            source: source.into(),
        }
    }

    /// Build a throttled failure, deriving the cool-down from `Retry-After`.
    pub fn throttled(url: &Url, headers: HeaderMap) -> Self {
        let retry_after = crate::fetch::retry_after::retry_after(&headers);
        FetchFailure::Throttled {
            url: url.clone(),
            retry_after,
            headers,
        }
    }

    /// URL from which the download failed.
    pub fn url(&self) -> &Url {
        match self {
            FetchFailure::Network { url, .. }
            | FetchFailure::UnexpectedStatus { url, .. }
            | FetchFailure::Throttled { url, .. }
            | FetchFailure::Cancelled { url } => url,
        }
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, FetchFailure::Throttled { .. })
    }

    /// Every failure except cancellation is eligible for another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchFailure::Cancelled { .. })
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchFailure::Network { .. } => "network",
            FetchFailure::UnexpectedStatus { .. } => "unexpected_status",
            FetchFailure::Throttled { .. } => "throttled",
            FetchFailure::Cancelled { .. } => "cancelled",
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchFailure>;
