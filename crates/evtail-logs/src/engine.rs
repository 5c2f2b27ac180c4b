use std::sync::Arc;
use std::time::Duration;

use evtail_store::{LogStore, StoreError};
use evtail_types::LogEntry;

use crate::{Clock, FilterSpec, RetrievalError, SystemClock, Watermark};

/// Filtered, ordered queries against one log store
///
/// The engine itself holds no mutable state. Incremental retrieval state
/// lives in the caller's [`Watermark`]; tail queries need none and may run
/// alongside an in-flight incremental call.
#[derive(Clone)]
pub struct RetrievalEngine {
    store: Arc<dyn LogStore>,
    filter: Arc<FilterSpec>,
    clock: Arc<dyn Clock>,

    /// Upper bound on a single store query (None = wait forever)
    query_timeout: Option<Duration>,
}

impl RetrievalEngine {
    pub fn new(store: Arc<dyn LogStore>, filter: FilterSpec) -> Self {
        Self {
            store,
            filter: Arc::new(filter),
            clock: Arc::new(SystemClock),
            query_timeout: None,
        }
    }

    /// Use `clock` for watermark updates
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Fail store queries that run longer than `timeout`
    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Fetch every matching entry generated after `watermark`
    ///
    /// On success the entries come back in non-decreasing timestamp order
    /// and the watermark is overwritten with the clock's current time. On failure the
    /// watermark is left exactly as it was, so a retry covers the same
    /// window.
    pub async fn retrieve_new(
        &self,
        watermark: &mut Watermark,
    ) -> Result<Vec<LogEntry>, RetrievalError> {
        let since = watermark.timestamp();
        let store = Arc::clone(&self.store);
        let filter = Arc::clone(&self.filter);

        let mut entries = self
            .query(move || {
                let mut entries = store.entries_after(since)?;
                entries.retain(|e| e.timestamp > since && filter.matches(e));
                Ok(entries)
            })
            .await?;
        sort_chronological(&mut entries);

        watermark.complete_at(self.clock.now());

        tracing::debug!(
            since = %since,
            watermark = %watermark.timestamp(),
            count = entries.len(),
            "retrieved new entries"
        );

        Ok(entries)
    }

    /// Fetch the `limit` most recent matching entries, oldest first
    ///
    /// Independent of any watermark. A negative `limit` is rejected before
    /// the store is touched.
    pub async fn tail(&self, limit: i64) -> Result<Vec<LogEntry>, RetrievalError> {
        if limit < 0 {
            return Err(RetrievalError::InvalidArgument(format!(
                "tail limit must not be negative (got {limit})"
            )));
        }
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let store = Arc::clone(&self.store);
        let filter = Arc::clone(&self.filter);

        let entries = self
            .query(move || {
                let mut entries = store.entries()?;
                entries.retain(|e| filter.matches(e));
                Ok(entries)
            })
            .await?;
        let entries = latest(entries, limit);

        tracing::debug!(limit, count = entries.len(), "tail query finished");

        Ok(entries)
    }

    /// Run a blocking store query off the async executor
    async fn query<F>(&self, query: F) -> Result<Vec<LogEntry>, RetrievalError>
    where
        F: FnOnce() -> Result<Vec<LogEntry>, StoreError> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(query);

        let joined = match self.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, task)
                .await
                .map_err(|_| RetrievalError::StoreTimeout { timeout })?,
            None => task.await,
        };

        Ok(joined??)
    }
}

/// Sort by timestamp, ties in store enumeration order
fn sort_chronological(entries: &mut [LogEntry]) {
    entries.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.record_id.cmp(&b.record_id))
    });
}

/// The `limit` newest entries, ascending
fn latest(mut entries: Vec<LogEntry>, limit: usize) -> Vec<LogEntry> {
    sort_chronological(&mut entries);
    let start = entries.len().saturating_sub(limit);
    entries.split_off(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use evtail_types::Severity;

    fn at(secs: i64, record_id: u64) -> LogEntry {
        let mut entry = LogEntry::new(Utc.timestamp_opt(secs, 0).unwrap(), "a", Severity::Error);
        entry.record_id = record_id;
        entry
    }

    fn keys(entries: &[LogEntry]) -> Vec<(i64, u64)> {
        entries
            .iter()
            .map(|e| (e.timestamp.timestamp(), e.record_id))
            .collect()
    }

    #[test]
    fn test_sort_breaks_ties_by_record_id() {
        let mut entries = vec![at(2, 3), at(1, 5), at(2, 1), at(1, 0)];
        sort_chronological(&mut entries);
        assert_eq!(keys(&entries), vec![(1, 0), (1, 5), (2, 1), (2, 3)]);
    }

    #[test]
    fn test_latest_keeps_newest_ascending() {
        let entries = vec![at(3, 2), at(1, 0), at(2, 1), at(3, 3)];
        assert_eq!(keys(&latest(entries, 2)), vec![(3, 2), (3, 3)]);
    }

    #[test]
    fn test_latest_with_large_limit_returns_all() {
        let entries = vec![at(2, 1), at(1, 0)];
        assert_eq!(keys(&latest(entries, 10)), vec![(1, 0), (2, 1)]);
    }
}
