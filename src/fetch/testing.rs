//! Scripted fetchers for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tokio::time::Instant;
use url::Url;

use crate::fetch::{FetchFailure, FetchResult, FetchedDocument, Fetcher};

pub const CONTENT: &str = "<html><body>hello</body></html>";

pub fn url() -> Url {
    Url::parse("http://www.google.com/").unwrap()
}

/// One scripted response.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Ok,
    Status(u16),
    Throttled(Duration),
}

impl Step {
    fn into_result(self, url: &Url) -> FetchResult<FetchedDocument> {
        match self {
            Step::Ok => Ok(FetchedDocument::new(url.clone(), CONTENT)),
            Step::Status(status) => Err(FetchFailure::UnexpectedStatus {
                url: url.clone(),
                status,
            }),
            Step::Throttled(retry_after) => Err(FetchFailure::Throttled {
                url: url.clone(),
                retry_after,
                headers: HeaderMap::new(),
            }),
        }
    }
}

/// Replays `steps` in order, then repeats `fallback` forever.
pub struct ScriptedFetcher {
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    latency: Duration,
    calls: AtomicU32,
    timestamps: Mutex<Vec<Instant>>,
}

impl ScriptedFetcher {
    pub fn new(steps: impl IntoIterator<Item = Step>, fallback: Step) -> Arc<Self> {
        Self::slow(steps, fallback, Duration::ZERO)
    }

    /// Like [`ScriptedFetcher::new`], but every call takes `latency`.
    pub fn slow(
        steps: impl IntoIterator<Item = Step>,
        fallback: Step,
        latency: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            fallback,
            latency,
            calls: AtomicU32::new(0),
            timestamps: Mutex::new(Vec::new()),
        })
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new([], step)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn timestamps(&self) -> Vec<Instant> {
        self.timestamps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.timestamps.lock().unwrap().push(Instant::now());
        let step = self.steps.lock().unwrap().pop_front().unwrap_or(self.fallback);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        step.into_result(url)
    }
}
