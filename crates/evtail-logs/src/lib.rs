//! Log retrieval for evtail
//!
//! This crate provides filtering, watermark-driven incremental retrieval,
//! bounded tail queries and the polling loop that feeds a [`Sink`].

mod engine;
mod error;
mod filter;
mod poller;
mod sink;
mod watermark;

pub use engine::RetrievalEngine;
pub use error::{PollError, RetrievalError};
pub use filter::FilterSpec;
pub use poller::{DEFAULT_POLL_INTERVAL, PollSettings, PollStats, Poller};
pub use sink::Sink;
pub use watermark::{Clock, SystemClock, Watermark};

#[cfg(any(test, feature = "test-util"))]
pub use watermark::ManualClock;

// Re-export types used in our public API
pub use evtail_store::{LogStore, StoreError};
pub use evtail_types::{LogEntry, Severity};
