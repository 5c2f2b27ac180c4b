#[cfg(any(test, feature = "test-util"))]
use std::sync::Arc;
#[cfg(any(test, feature = "test-util"))]
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Boundary between delivered and not-yet-observed entries
///
/// Neither `Clone` nor `Copy`: exactly one poller owns a watermark and lends
/// it out by exclusive borrow.
#[derive(Debug, PartialEq, Eq)]
pub struct Watermark {
    at: DateTime<Utc>,
}

impl Watermark {
    /// A watermark before every possible entry
    pub fn initial() -> Self {
        Self::starting_at(DateTime::<Utc>::MIN_UTC)
    }

    /// A watermark that skips everything generated at or before `at`
    pub fn starting_at(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.at
    }

    /// Whether no retrieval has advanced this watermark yet
    pub fn is_initial(&self) -> bool {
        self.at == DateTime::<Utc>::MIN_UTC
    }

    /// Record the wall-clock time at which a retrieval completed
    ///
    /// Overwrites unconditionally, even when the clock has stepped back.
    pub(crate) fn complete_at(&mut self, now: DateTime<Utc>) {
        self.at = now;
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::initial()
    }
}

/// Source of wall-clock time for watermark updates
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system's real-time clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same time. Only built for tests and the `test-util`
/// feature.
#[cfg(any(test, feature = "test-util"))]
#[derive(Clone, Debug)]
pub struct ManualClock {
    nanos: Arc<AtomicI64>,
}

#[cfg(any(test, feature = "test-util"))]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        let clock = Self {
            nanos: Arc::new(AtomicI64::new(0)),
        };
        clock.set(start);
        clock
    }

    /// Jump to `now`, forwards or backwards
    pub fn set(&self, now: DateTime<Utc>) {
        let nanos = now.timestamp_nanos_opt().unwrap_or(if now.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        });
        self.nanos.store(nanos, Ordering::SeqCst);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.set(self.now() + by);
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
