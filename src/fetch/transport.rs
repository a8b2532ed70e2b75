//! HTTP transport.
//!
//! # Responsibilities
//! - Issue exactly one GET per call, bounded by the request timeout
//! - Map the response onto a document or a classified failure
//!
//! No retries and no rate limiting happen here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use url::Url;

use crate::fetch::builder::BuildError;
use crate::fetch::types::{FetchFailure, FetchResult, FetchedDocument};
use crate::fetch::Fetcher;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const MAX_REDIRECTS: usize = 10;

/// Page downloader backed by a pooled `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    request_timeout: Duration,
    shutdown: ShutdownSignal,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout.
    pub fn new(request_timeout: Duration) -> Result<Self, BuildError> {
        Self::with_options(request_timeout, None, ShutdownSignal::never())
    }

    pub fn with_options(
        request_timeout: Duration,
        user_agent: Option<&str>,
        shutdown: ShutdownSignal,
    ) -> Result<Self, BuildError> {
        if request_timeout.is_zero() {
            return Err(BuildError::ZeroTimeout);
        }

        let mut builder = Client::builder().redirect(redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(BuildError::Client)?;

        Ok(Self {
            client,
            request_timeout,
            shutdown,
        })
    }

    async fn download(&self, url: &Url) -> FetchResult<FetchedDocument> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| FetchFailure::network(url, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchFailure::throttled(url, response.headers().clone()));
        }
        if status != StatusCode::OK {
            return Err(FetchFailure::UnexpectedStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchFailure::network(url, e))?;

        Ok(FetchedDocument::new(
            url.clone(),
            String::from_utf8_lossy(&body).into_owned(),
        ))
    }
}

#[async_trait]
impl Fetcher for HttpTransport {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedDocument> {
        let result = self.shutdown.guard(url, self.download(url)).await.and_then(|r| r);

        match &result {
            Ok(doc) => {
                tracing::debug!(url = %url, bytes = doc.content.len(), "Downloaded");
                metrics::record_attempt("ok");
            }
            Err(e) => {
                tracing::debug!(url = %url, kind = e.kind(), error = %e, "Download failed");
                metrics::record_attempt(e.kind());
            }
        }
        result
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
