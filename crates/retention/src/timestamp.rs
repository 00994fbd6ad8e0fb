//! Timestamp codec and naming convention
//!
//! Every snapshot and artifact name carries its creation instant as a
//! fixed-width token (`YYYY-MM-DD_HH_MM_SS`, local time). This module is
//! the only place that knows the spelling.

use crate::{RetentionError, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

/// Name prefix for every snapshot and artifact this tool creates
pub const TOOL_PREFIX: &str = "Snapward";

const TOKEN_FORMAT: &str = "%Y-%m-%d_%H_%M_%S";

/// Strict token shape, checked before chrono parsing so that
/// un-padded or truncated fields are rejected rather than coerced.
fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{2}_\d{2}_\d{2}$").unwrap())
}

/// Matches the token inside a snapshot name. Historical data spells the
/// separator both as `-Date-` and `-Date`, so the one before the token
/// is optional.
fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"{}[-_][Dd]ate[-_]?(\d{{4}}-\d{{2}}-\d{{2}}_\d{{2}}_\d{{2}}_\d{{2}})",
            TOOL_PREFIX
        ))
        .unwrap()
    })
}

/// Matches an artifact file name and captures its run token.
fn artifact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"{}[-_][Dd]ate[-_]?(\d{{4}}-\d{{2}}-\d{{2}}_\d{{2}}_\d{{2}}_\d{{2}})\.(log|err|digest)$",
            TOOL_PREFIX
        ))
        .unwrap()
    })
}

/// Format an instant as a name token (second precision, local time)
pub fn encode(at: &DateTime<Local>) -> String {
    at.format(TOKEN_FORMAT).to_string()
}

/// Parse a name token back into a local instant
///
/// Strict inverse of [`encode`]: the token must be exactly the fixed-width
/// shape and must name a real calendar date/time.
pub fn decode(token: &str) -> Result<DateTime<Local>> {
    if !token_re().is_match(token) {
        return Err(RetentionError::MalformedTimestamp {
            token: token.to_string(),
            reason: "does not match YYYY-MM-DD_HH_MM_SS".to_string(),
        });
    }

    let naive = NaiveDateTime::parse_from_str(token, TOKEN_FORMAT).map_err(|e| {
        RetentionError::MalformedTimestamp {
            token: token.to_string(),
            reason: e.to_string(),
        }
    })?;

    // A DST fold maps one wall-clock time to two instants; take the
    // earliest. A spring-forward gap maps to none and is malformed.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| RetentionError::MalformedTimestamp {
            token: token.to_string(),
            reason: "no such local time".to_string(),
        })
}

/// Locate the timestamp token inside a snapshot identifier
///
/// Returns `None` for names outside the tool's convention; callers must
/// exclude those identifiers rather than try to decode them.
pub fn extract_token(identifier: &str) -> Option<&str> {
    name_re()
        .captures(identifier)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Locate the run token inside an artifact file name
/// (`<prefix>-Date<token>.<log|err|digest>`)
pub fn extract_artifact_token(filename: &str) -> Option<&str> {
    artifact_re()
        .captures(filename)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Full snapshot name for a dataset at the given instant
pub fn snapshot_name(dataset: &str, at: &DateTime<Local>) -> String {
    format!("{}@{}-Date-{}", dataset, TOOL_PREFIX, encode(at))
}

/// Artifact file name for the given run instant and extension
pub fn artifact_name(at: &DateTime<Local>, ext: &str) -> String {
    format!("{}-Date-{}.{}", TOOL_PREFIX, encode(at), ext)
}
