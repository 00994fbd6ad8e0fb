//! Prune old snapshots and artifacts without creating new ones

use crate::cmd::create::print_summary;
use crate::driver;
use anyhow::Result;
use chrono::{DateTime, Local};
use retention::RetentionPolicy;
use std::path::Path;
use tracing::{error, info};
use zfs::SnapshotStore;

pub fn run<S: SnapshotStore>(
    store: &S,
    datasets: &[String],
    policy: &RetentionPolicy,
    log_dir: &Path,
    now: DateTime<Local>,
) -> Result<()> {
    info!("starting snapshot deletion");

    for dataset in datasets {
        let dataset = dataset.as_str();
        match driver::prune_snapshots(store, dataset, policy, now) {
            Ok(summary) => print_summary(dataset, summary),
            Err(e) => error!(dataset, error = format!("{:#}", e), "snapshot pruning skipped"),
        }
    }

    info!("snapshot deletion completed");

    let summary = driver::prune_artifacts(log_dir, policy, now)?;
    print_summary("artifacts", summary);

    Ok(())
}
