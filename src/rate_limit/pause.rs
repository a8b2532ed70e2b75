//! Global pause shared by every caller of one rate limiter.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

/// Paused/unpaused flag with broadcast wake-up.
///
/// The flag stays set while at least one cool-down is in flight, so
/// overlapping throttles extend the pause to the longest of them. Waiters
/// re-check the flag after every wake-up.
pub struct GlobalPause {
    flag: watch::Sender<bool>,
    cool_downs: Mutex<usize>,
}

impl GlobalPause {
    /// Create an unpaused gate.
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag,
            cool_downs: Mutex::new(0),
        }
    }

    pub fn is_paused(&self) -> bool {
        *self.flag.borrow()
    }

    /// Set the flag until the returned guard is dropped.
    pub fn begin(&self) -> PauseGuard<'_> {
        let mut active = self.cool_downs.lock().unwrap_or_else(PoisonError::into_inner);
        *active += 1;
        self.flag.send_replace(true);
        PauseGuard { pause: self }
    }

    /// Wait until no cool-down is in flight.
    ///
    /// Returns `true` if the caller had to wait.
    pub async fn wait_until_resumed(&self) -> bool {
        let mut rx = self.flag.subscribe();
        if !*rx.borrow_and_update() {
            return false;
        }
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|paused| !*paused).await;
        true
    }

    fn end(&self) {
        let mut active = self.cool_downs.lock().unwrap_or_else(PoisonError::into_inner);
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.flag.send_replace(false);
        }
    }
}

impl Default for GlobalPause {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GlobalPause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalPause")
            .field("paused", &self.is_paused())
            .finish()
    }
}

/// One in-flight cool-down. Clears the pause on drop if it was the last.
pub struct PauseGuard<'a> {
    pause: &'a GlobalPause,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.pause.end();
    }
}
