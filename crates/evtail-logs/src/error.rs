use std::io;
use std::time::Duration;

use thiserror::Error;

use evtail_store::StoreError;

/// Failure of a single retrieval call
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The log could not be opened or read; the store's error is kept intact
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("store query did not finish within {timeout:?}")]
    StoreTimeout { timeout: Duration },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("store query task failed")]
    QueryTask(#[from] tokio::task::JoinError),
}

impl RetrievalError {
    /// Whether repeating the same call could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }
}

/// Reason the polling loop stopped before being cancelled
#[derive(Debug, Error)]
pub enum PollError {
    #[error("log retrieval failed")]
    Retrieval(#[source] RetrievalError),

    #[error("failed to write log entries")]
    Output(#[source] io::Error),
}
