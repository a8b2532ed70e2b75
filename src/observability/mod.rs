//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Fetch pipeline produces:
//!     → tracing events (structured fields: url, attempt, delay, status)
//!     → metrics.rs (attempt outcomes, retries, throttling, pause time)
//!
//! Consumers:
//!     → logging.rs installs a fmt subscriber for processes that want one
//!     → Metrics recorder/exporter is installed by the embedding process
//! ```
//!
//! # Design Decisions
//! - The library only emits; it never installs a global recorder on its own
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
