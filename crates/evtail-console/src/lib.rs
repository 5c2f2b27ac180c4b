//! Console output for evtail
//!
//! This crate renders event log entries as colored text lines.

mod sink;

pub use sink::{ConsoleSink, DEFAULT_TIMESTAMP_FORMAT};

// Re-export types used in our public API
pub use evtail_logs::Sink;
pub use evtail_types::{LogEntry, Severity};
