//! Structured logging setup.
//!
//! The fetch pipeline logs through `tracing` macros. Embedding processes may
//! call [`init_logging`] to get a fmt subscriber filtered by `RUST_LOG`, or by
//! the configured level when `RUST_LOG` is unset.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crawl_fetch={default_level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
