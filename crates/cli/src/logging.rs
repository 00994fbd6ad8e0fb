//! Dual-sink run logging
//!
//! One run writes three places: the console, a per-run `.log` artifact
//! (info and above) and a per-run `.err` artifact (errors only). The
//! `.err` file doubles as the failure signal: a run that leaves a
//! non-empty one behind is worth alerting on.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Handles for the current run's log sinks
pub struct Logging {
    pub err_path: PathBuf,
    guards: Vec<WorkerGuard>,
}

impl Logging {
    /// Flush and close the file writers; nothing logs to the artifact
    /// files after this.
    pub fn flush(self) {
        drop(self.guards);
    }
}

/// Install the global subscriber for this run
///
/// Artifact files are named with the run timestamp so the retention pass
/// can age them like any other entity.
pub fn init(log_dir: &Path, now: &DateTime<Local>) -> Result<Logging> {
    let log_path = log_dir.join(retention::artifact_name(now, "log"));
    let err_path = log_dir.join(retention::artifact_name(now, "err"));

    let log_file = File::create(&log_path)
        .with_context(|| format!("failed to create run log {}", log_path.display()))?;
    let err_file = File::create(&err_path)
        .with_context(|| format!("failed to create error log {}", err_path.display()))?;

    let (subscriber, guards) = sinks(log_file, err_file);
    subscriber.init();

    Ok(Logging { err_path, guards })
}

/// Build the three-layer subscriber over the given artifact files
///
/// Dropping the returned guards flushes and closes the file writers;
/// callers must do that before reading the artifacts back.
fn sinks(
    log_file: File,
    err_file: File,
) -> (impl tracing::Subscriber + Send + Sync + 'static, Vec<WorkerGuard>) {
    let (log_writer, log_guard) = tracing_appender::non_blocking(log_file);
    let (err_writer, err_guard) = tracing_appender::non_blocking(err_file);

    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().with_filter(LevelFilter::INFO))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_writer)
                .with_filter(LevelFilter::INFO),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(err_writer)
                .with_filter(LevelFilter::ERROR),
        );

    (subscriber, vec![log_guard, err_guard])
}
