//! Snapward CLI - snapshot creation and retention for ZFS datasets

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local};
use clap::{Args, Parser, Subcommand};
use retention::RetentionPolicy;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use zfs::Zfs;

mod artifacts;
mod cmd;
mod digests;
mod driver;
mod logging;
mod mail;

/// Snapward - scheduled ZFS snapshots with joint age/count retention
#[derive(Parser)]
#[command(name = "snapward")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot every dataset, then prune old snapshots and artifacts
    Create {
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Prune old snapshots and artifacts without creating new ones
    Delete {
        #[command(flatten)]
        opts: RunOpts,
    },
}

#[derive(Args, Clone)]
struct RunOpts {
    /// Path to a newline-delimited list of dataset names
    #[arg(short, long)]
    file: PathBuf,

    /// Delete entities older than 'Nd', 'Nw' or 'Nm' (N=integer)
    #[arg(long, value_name = "AGE", value_parser = parse_older_than)]
    older_than: Duration,

    /// Number of newest snapshots to retain despite being older
    #[arg(long)]
    retain_count: usize,

    /// Send a failure notification to this address
    #[arg(long, value_name = "EMAIL")]
    send_mail: Option<String>,

    /// Directory holding run artifacts (.log/.err/.digest)
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

/// Parse an age specifier: days, weeks, or 30-day months
fn parse_older_than(value: &str) -> Result<Duration, String> {
    let invalid = || {
        format!(
            "invalid age '{}': use format 'Nd', 'Nw', or 'Nm' (N=integer)",
            value
        )
    };

    if !value.is_ascii() {
        return Err(invalid());
    }
    let (num, unit) = value.split_at(value.len().checked_sub(1).ok_or_else(invalid)?);
    let num: i64 = num.parse().map_err(|_| invalid())?;
    if num < 0 {
        return Err(invalid());
    }

    // try_* instead of the panicking constructors: a huge N is a policy
    // input error, not a crash.
    match unit {
        "d" => Duration::try_days(num),
        "w" => Duration::try_weeks(num),
        "m" => num.checked_mul(30).and_then(Duration::try_days),
        _ => None,
    }
    .ok_or_else(invalid)
}

fn read_datasets(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset list {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn run(command: &Commands, opts: &RunOpts, now: DateTime<Local>) -> Result<()> {
    let datasets = read_datasets(&opts.file)?;
    let policy = RetentionPolicy {
        older_than: opts.older_than,
        retain_count: opts.retain_count,
    };
    let store = Zfs::new();

    match command {
        Commands::Create { .. } => cmd::create::run(&store, &datasets, &policy, &opts.log_dir, now),
        Commands::Delete { .. } => cmd::delete::run(&store, &datasets, &policy, &opts.log_dir, now),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let now = Local::now();

    let opts = match &cli.command {
        Commands::Create { opts } | Commands::Delete { opts } => opts.clone(),
    };

    if let Err(e) = std::fs::create_dir_all(&opts.log_dir) {
        eprintln!(
            "snapward: cannot create log directory {}: {}",
            opts.log_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let logging = match logging::init(&opts.log_dir, &now) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("snapward: cannot set up logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&cli.command, &opts, now);
    if let Err(e) = &result {
        error!(error = format!("{:#}", e), "run failed");
    }

    // Flush the file sinks before anything reads the artifacts: the
    // notification must see the error that triggered it, and the cleanup
    // must see the final size.
    let err_path = logging.err_path.clone();
    logging.flush();

    if result.is_err() {
        if let Some(recipient) = &opts.send_mail {
            mail::notify_failure(&opts.log_dir, recipient);
        }
    }

    // Drop this run's error artifact if nothing was ever written to it.
    if let Ok(meta) = std::fs::metadata(&err_path) {
        if meta.len() == 0 {
            let _ = std::fs::remove_file(&err_path);
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
