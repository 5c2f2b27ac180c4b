use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use evtail_types::LogEntry;

use crate::{LogStore, StoreError};

/// Thread-safe in-memory event log
///
/// Clones share the same underlying log, so one handle can keep appending
/// while another is queried.
#[derive(Clone)]
pub struct MemoryStore {
    /// Log name, reported in errors
    log: Arc<str>,

    /// Machine name, reported in errors
    machine: Arc<str>,

    /// Internal storage, in append order
    entries: Arc<RwLock<Vec<LogEntry>>>,

    /// Next record ID
    next_id: Arc<AtomicU64>,

    /// When false, every query fails as if the log could not be opened
    available: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty log
    pub fn new(log: &str, machine: &str) -> Self {
        Self {
            log: Arc::from(log),
            machine: Arc::from(machine),
            entries: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Append an entry, assigning its record ID
    pub fn push(&self, mut entry: LogEntry) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        entry.record_id = id;
        self.entries.write().push(entry);
        id
    }

    /// Append several entries in order
    pub fn extend<I>(&self, entries: I)
    where
        I: IntoIterator<Item = LogEntry>,
    {
        for entry in entries {
            self.push(entry);
        }
    }

    /// Make the log reachable or unreachable
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable(
                &self.log,
                &self.machine,
                "machine unreachable",
            ))
        }
    }
}

impl LogStore for MemoryStore {
    fn entries(&self) -> Result<Vec<LogEntry>, StoreError> {
        self.check_available()?;
        Ok(self.entries.read().clone())
    }

    fn entries_after(
        &self,
        after: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<LogEntry>, StoreError> {
        self.check_available()?;
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.timestamp > after)
            .cloned()
            .collect())
    }
}
