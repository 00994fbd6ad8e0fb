//! Container-image digest capture
//!
//! Before a create run touches anything, the currently installed image
//! digests are captured into the run's `.digest` artifact. Informational
//! only; the retention pass ages these like any other artifact.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Write `docker images --digests` output to this run's digest artifact
pub fn write_digest_artifact(log_dir: &Path, now: &DateTime<Local>) -> Result<PathBuf> {
    let output = Command::new("docker")
        .args(["images", "--digests"])
        .output()
        .context("failed to run docker images --digests")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("docker images --digests failed: {}", stderr.trim());
    }

    let path = log_dir.join(retention::artifact_name(now, "digest"));
    std::fs::write(&path, &output.stdout)
        .with_context(|| format!("failed to write digest artifact {}", path.display()))?;

    Ok(path)
}
