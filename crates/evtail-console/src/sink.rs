use std::io::{self, Stdout, Write, stdout};

use chrono::Local;
use crossterm::queue;
use crossterm::style::{Print, ResetColor, SetForegroundColor};

use evtail_logs::Sink;
use evtail_types::LogEntry;

/// Default timestamp layout for rendered lines
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes one line per entry, colored by severity
pub struct ConsoleSink<W: Write> {
    out: W,
    color: bool,
    local_time: bool,
    timestamp_format: String,
}

impl ConsoleSink<Stdout> {
    /// Render to standard output with colors and local timestamps
    pub fn stdout() -> Self {
        Self::new(stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            color: true,
            local_time: true,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Show timestamps in the local time zone instead of UTC
    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Format an entry as `severity -- host -- timestamp -- source -- message`
    pub fn format_line(&self, entry: &LogEntry) -> String {
        let timestamp = if self.local_time {
            entry
                .timestamp
                .with_timezone(&Local)
                .format(&self.timestamp_format)
                .to_string()
        } else {
            entry.timestamp.format(&self.timestamp_format).to_string()
        };

        format!(
            "{} -- {} -- {} -- {} -- {}",
            entry.severity, entry.host, timestamp, entry.source, entry.message
        )
    }

    /// Consume the sink, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn render(&mut self, entries: &[LogEntry]) -> io::Result<()> {
        for entry in entries {
            let line = self.format_line(entry);
            if self.color {
                // Every severity maps to a color, and the default is put
                // back after each line so nothing leaks into the next one.
                queue!(
                    self.out,
                    SetForegroundColor(entry.severity.color()),
                    Print(line),
                    ResetColor,
                    Print("\n")
                )?;
            } else {
                writeln!(self.out, "{line}")?;
            }
        }
        self.out.flush()
    }
}
