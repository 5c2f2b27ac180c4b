use std::time::Duration;

use tokio_util::sync::CancellationToken;

use evtail_types::LogEntry;

use crate::{PollError, RetrievalEngine, RetrievalError, Sink, Watermark};

/// Delay between polling cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Longest wait between retries of a failed cycle
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// Scheduling knobs for a [`Poller`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Sleep between cycles
    pub interval: Duration,

    /// Extra attempts after a failed retrieval (0 = first failure is fatal)
    pub retry_attempts: u32,

    /// Wait before the first retry; doubles on each further attempt
    pub retry_backoff: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            retry_attempts: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Counters for a polling session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Successful retrieval cycles
    pub cycles: u64,

    /// Entries handed to the sink
    pub delivered: u64,

    /// Failed retrieval attempts, including retried ones
    pub failures: u64,
}

/// Repeatedly retrieves new entries and forwards them to a sink
///
/// A poller owns its watermark, so each poller is the single consumer of
/// its own incremental stream. Cycles run strictly one after another.
pub struct Poller {
    engine: RetrievalEngine,
    watermark: Watermark,
    settings: PollSettings,
    stats: PollStats,
}

impl Poller {
    /// Create a poller starting from the initial watermark
    pub fn new(engine: RetrievalEngine, settings: PollSettings) -> Self {
        Self::resume(engine, Watermark::initial(), settings)
    }

    /// Create a poller continuing from an existing watermark
    pub fn resume(engine: RetrievalEngine, watermark: Watermark, settings: PollSettings) -> Self {
        Self {
            engine,
            watermark,
            settings,
            stats: PollStats::default(),
        }
    }

    pub fn watermark(&self) -> &Watermark {
        &self.watermark
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    /// Run one retrieval cycle without rendering
    pub async fn poll_once(&mut self) -> Result<Vec<LogEntry>, RetrievalError> {
        match self.engine.retrieve_new(&mut self.watermark).await {
            Ok(entries) => {
                self.stats.cycles += 1;
                Ok(entries)
            }
            Err(e) => {
                self.stats.failures += 1;
                Err(e)
            }
        }
    }

    /// Poll until `cancel` fires or a cycle fails for good
    ///
    /// Cancellation is observed between cycles, never in the middle of a
    /// retrieval or a render.
    pub async fn run<S: Sink>(
        &mut self,
        mut sink: S,
        cancel: CancellationToken,
    ) -> Result<PollStats, PollError> {
        tracing::info!(
            interval_ms = self.settings.interval.as_millis() as u64,
            filter = ?self.engine.filter(),
            "polling started"
        );

        while !cancel.is_cancelled() {
            let Some(entries) = self.poll_with_retry(&cancel).await? else {
                break;
            };

            sink.render(&entries).map_err(PollError::Output)?;
            self.stats.delivered += entries.len() as u64;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        tracing::info!(
            cycles = self.stats.cycles,
            delivered = self.stats.delivered,
            "polling stopped"
        );

        Ok(self.stats)
    }

    /// One cycle, retried per the settings. `None` if cancelled while waiting.
    async fn poll_with_retry(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<LogEntry>>, PollError> {
        let mut attempt = 0;
        let mut backoff = self.settings.retry_backoff;

        loop {
            match self.poll_once().await {
                Ok(entries) => return Ok(Some(entries)),
                Err(e) if e.is_retryable() && attempt < self.settings.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_attempts = self.settings.retry_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrieval failed, retrying"
                    );

                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(None),
                        _ = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(MAX_RETRY_BACKOFF);
                }
                Err(e) => {
                    tracing::error!(error = %e, "retrieval failed");
                    return Err(PollError::Retrieval(e));
                }
            }
        }
    }
}
