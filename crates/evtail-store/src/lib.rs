//! Event log store adapters for evtail
//!
//! A store is a read-only view of an append-only log owned by the operating
//! system. Enumeration order is the store's natural order and carries no
//! ordering guarantee beyond what the store itself provides.

mod error;
mod jsonl;
mod memory;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use error::StoreError;
pub use jsonl::JsonLinesStore;
pub use memory::MemoryStore;

// Re-export types used in our public API
pub use evtail_types::{LogEntry, Severity};

/// Machine name meaning "this host"
pub const LOCAL_MACHINE: &str = ".";

/// Read-only access to one named log on one machine
///
/// Both methods block while the store is read and may be slow for remote
/// machines; callers that must stay responsive run them off the async
/// executor.
pub trait LogStore: Send + Sync {
    /// Enumerate every entry currently in the log
    fn entries(&self) -> Result<Vec<LogEntry>, StoreError>;

    /// Enumerate entries generated strictly after `after`
    fn entries_after(&self, after: DateTime<Utc>) -> Result<Vec<LogEntry>, StoreError> {
        let mut entries = self.entries()?;
        entries.retain(|e| e.timestamp > after);
        Ok(entries)
    }
}

impl<S: LogStore + ?Sized> LogStore for Arc<S> {
    fn entries(&self) -> Result<Vec<LogEntry>, StoreError> {
        (**self).entries()
    }

    fn entries_after(&self, after: DateTime<Utc>) -> Result<Vec<LogEntry>, StoreError> {
        (**self).entries_after(after)
    }
}

/// Open the JSON-lines log `log` of `machine` below `root`
pub fn open_store(
    root: &Path,
    log: &str,
    machine: &str,
) -> Result<Arc<dyn LogStore>, StoreError> {
    let store = JsonLinesStore::open(root, log, machine)?;
    Ok(Arc::new(store))
}

/// Whether `machine` refers to the local host
pub fn is_local_machine(machine: &str) -> bool {
    machine.is_empty() || machine == LOCAL_MACHINE || machine.eq_ignore_ascii_case("localhost")
}
