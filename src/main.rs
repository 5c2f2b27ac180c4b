use std::io::{IsTerminal, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use evtail_console::ConsoleSink;
use evtail_logs::{Poller, RetrievalEngine, Sink};
use evtail_store::open_store;

mod config;

use config::{FileConfig, Settings};

/// Evtail - Follow an operating-system event log on the console
#[derive(Parser, Debug, Default)]
#[command(name = "evtail")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Event log to read [default: Application]
    #[arg(long, value_name = "NAME")]
    log: Option<String>,

    /// Machine whose log to read ("." for this host) [default: .]
    #[arg(long, value_name = "NAME")]
    machine: Option<String>,

    /// Directory holding exported logs [default: .]
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Only show entries from this source (repeatable, case-insensitive)
    #[arg(long = "source", value_name = "SOURCE")]
    sources: Vec<String>,

    /// Only show entries of this severity (repeatable)
    #[arg(long = "severity", value_name = "SEVERITY")]
    severities: Vec<String>,

    /// Milliseconds between polls [default: 1000]
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Give up on a single log query after this many milliseconds (0 = never)
    #[arg(long, value_name = "MS")]
    query_timeout_ms: Option<u64>,

    /// Retry a failed poll this many times before exiting [default: 0]
    #[arg(long, value_name = "N")]
    retry_attempts: Option<u32>,

    /// Print the last N matching entries and exit
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    tail: Option<i64>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Show timestamps in UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// TOML configuration file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Diagnostics go to stderr; stdout carries only log entries
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file_config, stdout().is_terminal())?;

    let store = open_store(&settings.root, &settings.log, &settings.machine).with_context(|| {
        format!(
            "Failed to open log '{}' on machine '{}'",
            settings.log, settings.machine
        )
    })?;

    let engine = RetrievalEngine::new(store, settings.filter.clone())
        .with_query_timeout(settings.query_timeout);

    let mut sink = ConsoleSink::stdout()
        .with_color(settings.color)
        .with_local_time(settings.local_time)
        .with_timestamp_format(settings.timestamp_format.clone());

    if let Some(limit) = args.tail {
        let entries = engine.tail(limit).await.context("Tail query failed")?;
        sink.render(&entries)
            .context("Failed to write log entries")?;
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            shutdown.cancel();
        }
    });

    let mut poller = Poller::new(engine, settings.poll.clone());
    let stats = poller
        .run(sink, cancel)
        .await
        .context("Polling stopped")?;

    tracing::info!(
        cycles = stats.cycles,
        delivered = stats.delivered,
        "finished"
    );

    Ok(())
}
