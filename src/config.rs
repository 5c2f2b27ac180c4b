//! Configuration for evtail
//!
//! An optional TOML file supplies defaults; command-line flags override
//! it. [`Settings::resolve`] merges both into one immutable value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use evtail_console::DEFAULT_TIMESTAMP_FORMAT;
use evtail_logs::{FilterSpec, PollSettings, Severity};

use crate::Args;

pub const DEFAULT_LOG: &str = "Application";
pub const DEFAULT_MACHINE: &str = ".";
const DEFAULT_INTERVAL_MS: u64 = 1000;
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Contents of the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub store: StoreSection,
    pub filter: FilterSection,
    pub poll: PollSection,
    pub display: DisplaySection,
}

/// `[store]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub log: Option<String>,
    pub machine: Option<String>,
    pub root: Option<PathBuf>,
}

/// `[filter]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSection {
    pub sources: Option<Vec<String>>,
    pub severities: Option<Vec<String>>,
}

/// `[poll]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollSection {
    pub interval_ms: Option<u64>,
    pub query_timeout_ms: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
}

/// `[display]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
    pub color: Option<bool>,
    pub utc: Option<bool>,
    pub timestamp_format: Option<String>,
}

impl FileConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub log: String,
    pub machine: String,
    pub root: PathBuf,
    pub filter: FilterSpec,
    pub poll: PollSettings,
    pub query_timeout: Option<Duration>,
    pub color: bool,
    pub local_time: bool,
    pub timestamp_format: String,
}

impl Settings {
    /// Merge flags over file values over built-in defaults
    ///
    /// `is_terminal` decides coloring when neither source sets it.
    pub fn resolve(args: &Args, file: FileConfig, is_terminal: bool) -> Result<Self> {
        let sources = if args.sources.is_empty() {
            file.filter.sources
        } else {
            Some(args.sources.clone())
        };
        let severities = if args.severities.is_empty() {
            file.filter.severities
        } else {
            Some(args.severities.clone())
        };

        let mut filter = FilterSpec::all();
        if let Some(sources) = sources {
            filter = filter.with_sources(&sources)?;
        }
        if let Some(names) = severities {
            let parsed = names
                .iter()
                .map(|name| name.parse::<Severity>())
                .collect::<Result<Vec<_>, _>>()?;
            filter = filter.with_severities(parsed);
        }

        let interval_ms = args
            .interval_ms
            .or(file.poll.interval_ms)
            .unwrap_or(DEFAULT_INTERVAL_MS);
        if interval_ms == 0 {
            anyhow::bail!("Polling interval must be greater than zero");
        }

        let query_timeout_ms = args
            .query_timeout_ms
            .or(file.poll.query_timeout_ms)
            .unwrap_or(DEFAULT_QUERY_TIMEOUT_MS);

        let poll = PollSettings {
            interval: Duration::from_millis(interval_ms),
            retry_attempts: args
                .retry_attempts
                .or(file.poll.retry_attempts)
                .unwrap_or(0),
            retry_backoff: Duration::from_millis(
                file.poll
                    .retry_backoff_ms
                    .unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
            ),
        };

        let color = if args.no_color {
            false
        } else {
            file.display.color.unwrap_or(is_terminal)
        };
        let utc = args.utc || file.display.utc.unwrap_or(false);

        Ok(Self {
            log: args
                .log
                .clone()
                .or(file.store.log)
                .unwrap_or_else(|| DEFAULT_LOG.to_string()),
            machine: args
                .machine
                .clone()
                .or(file.store.machine)
                .unwrap_or_else(|| DEFAULT_MACHINE.to_string()),
            root: args
                .root
                .clone()
                .or(file.store.root)
                .unwrap_or_else(|| PathBuf::from(".")),
            filter,
            poll,
            query_timeout: (query_timeout_ms > 0).then(|| Duration::from_millis(query_timeout_ms)),
            color,
            local_time: !utc,
            timestamp_format: file
                .display
                .timestamp_format
                .unwrap_or_else(|| DEFAULT_TIMESTAMP_FORMAT.to_string()),
        })
    }
}
