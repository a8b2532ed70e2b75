//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Shutdown::trigger()
//!     → every ShutdownSignal observes it
//!     → suspended fetches (pause wait, token wait, backoff, network, cool-down)
//!       return FetchFailure::Cancelled
//! ```

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};
