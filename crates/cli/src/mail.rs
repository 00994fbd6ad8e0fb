//! Failure notification via the system `mail` command
//!
//! Used only when a run fails and the caller opted in. The newest `.log`
//! and `.err` artifacts are attached and their contents concatenated into
//! the body, so the report is readable even where attachments are
//! stripped.

use crate::artifacts;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{error, info};

const SUBJECT: &str = "snapward: error snapshotting or pruning snapshots/logs - attaching logs";

/// Mail the most recent run artifacts to `recipient`
///
/// A send failure is itself only logged; there is nobody left to notify
/// about the notifier.
pub fn notify_failure(log_dir: &Path, recipient: &str) {
    info!(recipient, "sending failure notification");

    let newest_log = artifacts::newest_with_extension(log_dir, "log");
    let newest_err = artifacts::newest_with_extension(log_dir, "err");

    let body = build_body(newest_err.as_deref(), newest_log.as_deref());
    let attachments: Vec<PathBuf> = newest_log.into_iter().chain(newest_err).collect();

    match send(SUBJECT, &body, recipient, &attachments) {
        Ok(status) if status.success() => info!("failure notification sent"),
        Ok(status) => error!(code = ?status.code(), "mail command exited non-zero"),
        Err(e) => error!(error = %e, "failed to run mail command"),
    }
}

/// Concatenate artifact contents into the message body
fn build_body(err_file: Option<&Path>, log_file: Option<&Path>) -> String {
    let mut body = String::new();

    for (label, path) in [(".err file", err_file), (".log file", log_file)] {
        let Some(path) = path else { continue };
        if let Ok(contents) = std::fs::read_to_string(path) {
            body.push_str("----------\n\n");
            body.push_str(label);
            body.push('\n');
            body.push_str(&contents);
            body.push('\n');
        }
    }

    if body.is_empty() {
        body.push_str("No run artifacts were found to attach.\n");
    }

    body
}

/// Invoke `mail` with the body on stdin
fn send(
    subject: &str,
    body: &str,
    recipient: &str,
    attachments: &[PathBuf],
) -> std::io::Result<std::process::ExitStatus> {
    let mut command = Command::new("mail");
    command.arg("-s").arg(subject);
    for file in attachments {
        command.arg("--attach").arg(file);
    }
    command.arg(recipient);

    let mut child = command
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(body.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(stderr = %stderr.trim(), "mail command diagnostics");
    }

    Ok(output.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_contains_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("run.log");
        let err = dir.path().join("run.err");
        std::fs::write(&log, "all quiet\n").unwrap();
        std::fs::write(&err, "boom\n").unwrap();

        let body = build_body(Some(&err), Some(&log));

        assert!(body.contains(".err file\nboom"));
        assert!(body.contains(".log file\nall quiet"));
        // Error contents come first
        assert!(body.find("boom").unwrap() < body.find("all quiet").unwrap());
    }

    #[test]
    fn test_body_with_no_artifacts() {
        let body = build_body(None, None);
        assert!(body.contains("No run artifacts"));
    }

    #[test]
    fn test_body_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("run.log");
        std::fs::write(&log, "present\n").unwrap();
        let missing = dir.path().join("gone.err");

        let body = build_body(Some(&missing), Some(&log));
        assert!(body.contains("present"));
        assert!(!body.contains(".err file"));
    }
}
