//! Retention driver: applies the decision engine to real scopes
//!
//! One pass per scope: enumerate candidates, decode the ones that carry a
//! valid timestamp token, let the engine partition them, then destroy the
//! `delete` side. Deletions are isolated from each other; only the
//! initial enumeration can abort a pass.

use crate::artifacts;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use retention::{decide, extract_token, RetentionPolicy, TimestampedEntity};
use std::path::Path;
use tracing::{error, info, warn};
use zfs::SnapshotStore;

/// Outcome counters for one retention pass
#[derive(Debug, Default, Clone, Copy)]
pub struct PruneSummary {
    pub kept: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Decode snapshot names into entities, dropping out-of-scope names
///
/// Names without a token belong to someone else and are skipped quietly;
/// names whose token will not decode are logged and excluded, neither
/// kept nor deleted.
fn decode_snapshots(names: Vec<String>) -> Vec<TimestampedEntity> {
    let mut entities = Vec::with_capacity(names.len());

    for name in names {
        let Some(token) = extract_token(&name) else {
            continue;
        };
        match retention::decode(token) {
            Ok(created_at) => entities.push(TimestampedEntity::new(name, created_at)),
            Err(e) => warn!(snapshot = %name, error = %e, "skipping snapshot with undecodable timestamp"),
        }
    }

    entities
}

/// Prune one dataset's snapshots under `policy`
pub fn prune_snapshots<S: SnapshotStore>(
    store: &S,
    dataset: &str,
    policy: &RetentionPolicy,
    now: DateTime<Local>,
) -> Result<PruneSummary> {
    let names = store
        .list_snapshots(dataset)
        .with_context(|| format!("failed to list snapshots for {}", dataset))?;

    let entities = decode_snapshots(names);
    let decision = decide(entities, policy, now);

    let mut summary = PruneSummary {
        kept: decision.keep.len(),
        ..Default::default()
    };

    for name in &decision.delete {
        match store.destroy_snapshot(name) {
            Ok(()) => {
                info!(snapshot = %name, "deleted snapshot");
                summary.deleted += 1;
            }
            Err(e) => {
                error!(snapshot = %name, error = %e, "failed to destroy snapshot");
                summary.failed += 1;
            }
        }
    }

    info!(
        dataset,
        kept = summary.kept,
        deleted = summary.deleted,
        failed = summary.failed,
        "snapshot retention pass complete"
    );

    Ok(summary)
}

/// Prune old run artifacts in `dir` under `policy`
///
/// The engine decides per run token; a deleted token fans out over every
/// file in its group (`.log`, `.err`, `.digest`).
pub fn prune_artifacts(dir: &Path, policy: &RetentionPolicy, now: DateTime<Local>) -> Result<PruneSummary> {
    let groups = artifacts::group_by_run_token(dir)
        .with_context(|| format!("failed to list artifacts in {}", dir.display()))?;

    let mut entities = Vec::with_capacity(groups.len());
    for token in groups.keys() {
        match retention::decode(token) {
            Ok(created_at) => entities.push(TimestampedEntity::new(token.clone(), created_at)),
            Err(e) => warn!(token = %token, error = %e, "skipping artifact group with undecodable timestamp"),
        }
    }

    let decision = decide(entities, policy, now);

    let mut summary = PruneSummary {
        kept: decision.keep.len(),
        ..Default::default()
    };

    for token in &decision.delete {
        for path in &groups[token] {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    info!(file = %path.display(), "deleted artifact");
                    summary.deleted += 1;
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "failed to delete artifact");
                    summary.failed += 1;
                }
            }
        }
    }

    info!(
        dir = %dir.display(),
        kept = summary.kept,
        deleted = summary.deleted,
        failed = summary.failed,
        "artifact retention pass complete"
    );

    Ok(summary)
}
