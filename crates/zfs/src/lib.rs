//! ZFS integration: the storage-system collaborator
//!
//! This crate provides:
//! - The `SnapshotStore` trait (list / create / destroy snapshots)
//! - The `Zfs` implementation shelling out to the `zfs` binary
//!
//! Callers never parse `zfs` output themselves; failures surface as
//! `ZfsError` carrying the tool's own diagnostic text.

use std::process::Command;

/// Errors from the storage-system collaborator
#[derive(Debug, thiserror::Error)]
pub enum ZfsError {
    /// The tool ran and exited non-zero; `stderr` is its diagnostic
    #[error("zfs {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },
    /// The tool could not be started at all
    #[error("failed to run zfs {operation}: {source}")]
    Spawn {
        operation: String,
        #[source]
        source: std::io::Error,
    },
    /// The tool produced non-UTF-8 output
    #[error("zfs {operation} produced invalid UTF-8 output")]
    Utf8 { operation: String },
}

pub type Result<T> = std::result::Result<T, ZfsError>;

/// Abstract snapshot operations against one storage system
///
/// One pass of the retention driver only needs these three calls; tests
/// substitute an in-memory implementation.
pub trait SnapshotStore {
    /// List the full names of all snapshots belonging to `dataset`
    fn list_snapshots(&self, dataset: &str) -> Result<Vec<String>>;

    /// Create a snapshot; `full_name` is `dataset@snapname`
    fn create_snapshot(&self, full_name: &str) -> Result<()>;

    /// Destroy one snapshot by full name
    fn destroy_snapshot(&self, full_name: &str) -> Result<()>;
}

/// `SnapshotStore` backed by the system `zfs` binary
#[derive(Debug, Default)]
pub struct Zfs;

impl Zfs {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, operation: &str, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("zfs")
            .args(args)
            .output()
            .map_err(|source| ZfsError::Spawn {
                operation: operation.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ZfsError::CommandFailed {
                operation: operation.to_string(),
                stderr,
            });
        }

        Ok(output.stdout)
    }
}

impl SnapshotStore for Zfs {
    fn list_snapshots(&self, dataset: &str) -> Result<Vec<String>> {
        let stdout = self.run(
            "list",
            &["list", "-H", "-t", "snapshot", "-o", "name", dataset],
        )?;

        let text = String::from_utf8(stdout).map_err(|_| ZfsError::Utf8 {
            operation: "list".to_string(),
        })?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn create_snapshot(&self, full_name: &str) -> Result<()> {
        tracing::debug!(snapshot = full_name, "zfs snapshot");
        self.run("snapshot", &["snapshot", full_name]).map(|_| ())
    }

    fn destroy_snapshot(&self, full_name: &str) -> Result<()> {
        tracing::debug!(snapshot = full_name, "zfs destroy");
        self.run("destroy", &["destroy", full_name]).map(|_| ())
    }
}
