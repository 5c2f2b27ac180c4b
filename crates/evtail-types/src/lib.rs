//! Shared types for evtail
//!
//! This crate contains data structures used across multiple evtail crates.

use chrono::{DateTime, Utc};
use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Severity
// ============================================================================

/// Event log entry type, as classified by the operating system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    FailureAudit,
    Error,
    Warning,
    SuccessAudit,
    Information,
}

impl Severity {
    /// Every severity, in the order the event log defines them
    pub const ALL: [Severity; 5] = [
        Self::FailureAudit,
        Self::Error,
        Self::Warning,
        Self::SuccessAudit,
        Self::Information,
    ];

    /// Get display color for this severity
    pub fn color(&self) -> Color {
        match self {
            Self::FailureAudit => Color::DarkGreen,
            Self::SuccessAudit => Color::Magenta,
            Self::Information => Color::Grey,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }

    /// Name as the event log reports it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailureAudit => "FailureAudit",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::SuccessAudit => "SuccessAudit",
            Self::Information => "Information",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known severity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}' (expected one of FailureAudit, Error, Warning, SuccessAudit, Information)")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Parse a severity name, accepting common short forms
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "failureaudit" | "failure-audit" | "failure" | "audit-failure" => Ok(Self::FailureAudit),
            "error" | "err" => Ok(Self::Error),
            "warning" | "warn" | "wrn" => Ok(Self::Warning),
            "successaudit" | "success-audit" | "success" | "audit-success" => {
                Ok(Self::SuccessAudit)
            }
            "information" | "info" | "inf" => Ok(Self::Information),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// A single event log entry
///
/// Entries are immutable once the operating system has written them; the
/// engine only ever reads them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the store's enumeration order, assigned by the store
    #[serde(skip)]
    pub record_id: u64,

    /// When the entry was generated
    pub timestamp: DateTime<Utc>,

    /// Originating component
    pub source: String,

    /// Entry type
    pub severity: Severity,

    /// Machine the entry originated from
    #[serde(default)]
    pub host: String,

    /// Free-form body
    #[serde(default)]
    pub message: String,
}

impl LogEntry {
    /// Create a new log entry with an empty host and message
    pub fn new(timestamp: DateTime<Utc>, source: impl Into<String>, severity: Severity) -> Self {
        Self {
            record_id: 0,
            timestamp,
            source: source.into(),
            severity,
            host: String::new(),
            message: String::new(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_severity_parse() {
        assert_eq!("Error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!(" INFORMATION ".parse::<Severity>(), Ok(Severity::Information));
        assert_eq!("FailureAudit".parse::<Severity>(), Ok(Severity::FailureAudit));
        assert_eq!("success".parse::<Severity>(), Ok(Severity::SuccessAudit));
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_display_round_trips() {
        for severity in Severity::ALL {
            assert_eq!(severity.to_string().parse::<Severity>(), Ok(severity));
        }
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(Severity::FailureAudit.color(), Color::DarkGreen);
        assert_eq!(Severity::SuccessAudit.color(), Color::Magenta);
        assert_eq!(Severity::Information.color(), Color::Grey);
        assert_eq!(Severity::Warning.color(), Color::Yellow);
        assert_eq!(Severity::Error.color(), Color::Red);
    }

    #[test]
    fn test_entry_deserialize_defaults() {
        let json = r#"{"timestamp":"2024-01-15T10:30:00Z","source":"Disk","severity":"Warning"}"#;
        let entry: LogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.timestamp, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
        assert_eq!(entry.source, "Disk");
        assert_eq!(entry.severity, Severity::Warning);
        assert!(entry.host.is_empty());
        assert_eq!(entry.record_id, 0);
    }
}
