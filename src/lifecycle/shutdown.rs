//! Shutdown coordination for in-flight fetches.

use std::future::Future;

use tokio::sync::watch;
use url::Url;

use crate::fetch::{FetchFailure, FetchResult};

/// Coordinator for cancelling fetches.
///
/// Every [`ShutdownSignal`] handed out by [`Shutdown::subscribe`] observes the
/// trigger, including signals subscribed after it fired.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side of [`Shutdown`].
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been triggered.
    ///
    /// Pends forever if the owning [`Shutdown`] is dropped without firing.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|triggered| *triggered).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` unless shutdown fires first.
    pub async fn guard<T, F>(&self, url: &Url, fut: F) -> FetchResult<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => {
                tracing::debug!(url = %url, "Fetch cancelled by shutdown");
                Err(FetchFailure::Cancelled { url: url.clone() })
            }
            out = fut => Ok(out),
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::never()
    }
}
