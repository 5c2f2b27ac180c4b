use std::io;

use thiserror::Error;

/// Failure to open or read a log store
///
/// Every variant means the named log could not be queried; none of them is
/// transient from the store's point of view.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("log '{log}' on machine '{machine}' is unavailable: {reason}")]
    Unavailable {
        log: String,
        machine: String,
        reason: String,
    },

    #[error("permission denied reading log '{log}' on machine '{machine}'")]
    PermissionDenied { log: String, machine: String },

    #[error("failed to read log '{log}' on machine '{machine}'")]
    Io {
        log: String,
        machine: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn unavailable(log: &str, machine: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            log: log.to_string(),
            machine: machine.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify an I/O failure raised while reading `log`
    pub fn from_io(log: &str, machine: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::unavailable(log, machine, "log does not exist"),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                log: log.to_string(),
                machine: machine.to_string(),
            },
            _ => Self::Io {
                log: log.to_string(),
                machine: machine.to_string(),
                source: err,
            },
        }
    }
}
