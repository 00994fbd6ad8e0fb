//! Snapshot every dataset, then prune snapshots and artifacts

use crate::{digests, driver};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use owo_colors::OwoColorize;
use retention::RetentionPolicy;
use std::path::Path;
use tracing::{error, info, warn};
use zfs::SnapshotStore;

pub fn run<S: SnapshotStore>(
    store: &S,
    datasets: &[String],
    policy: &RetentionPolicy,
    log_dir: &Path,
    now: DateTime<Local>,
) -> Result<()> {
    // 1. Capture image digests before anything changes
    match digests::write_digest_artifact(log_dir, &now) {
        Ok(path) => info!(file = %path.display(), "wrote image digest artifact"),
        Err(e) => warn!(error = format!("{:#}", e), "could not capture image digests"),
    }

    info!("starting snapshot creation");

    // 2. Snapshot each dataset, then immediately prune it. A failed
    //    creation aborts the run; a failed listing only skips that
    //    dataset's pruning.
    for dataset in datasets {
        let dataset = dataset.as_str();
        let name = retention::snapshot_name(dataset, &now);
        info!(dataset, snapshot = %name, "creating snapshot");
        store
            .create_snapshot(&name)
            .with_context(|| format!("failed to create snapshot of {}", dataset))?;

        match driver::prune_snapshots(store, dataset, policy, now) {
            Ok(summary) => print_summary(dataset, summary),
            Err(e) => error!(dataset, error = format!("{:#}", e), "snapshot pruning skipped"),
        }
    }

    info!("snapshot creation completed");

    // 3. Age out old run artifacts
    let summary = driver::prune_artifacts(log_dir, policy, now)?;
    print_summary("artifacts", summary);

    Ok(())
}

pub(crate) fn print_summary(scope: &str, summary: driver::PruneSummary) {
    println!(
        "{:<24} kept {} deleted {} failed {}",
        scope.bold(),
        summary.kept.to_string().green(),
        summary.deleted.to_string().yellow(),
        summary.failed.to_string().red(),
    );
}
