//! Retention core: timestamp codec and the keep/delete decision engine
//!
//! This crate provides:
//! - The timestamp codec and snapshot/artifact naming convention
//! - `TimestampedEntity`, `RetentionPolicy`, `RetentionDecision`
//! - The pure `decide` function partitioning entities into keep/delete
//!
//! No I/O happens here; enumeration and destruction live with the callers.

pub mod engine;
pub mod timestamp;

// Re-exports
pub use engine::{decide, RetentionDecision, RetentionPolicy, TimestampedEntity};
pub use timestamp::{
    artifact_name, decode, encode, extract_artifact_token, extract_token, snapshot_name,
};

/// Errors raised by the retention core
#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    /// A name fragment did not decode to a valid instant
    #[error("malformed timestamp token '{token}': {reason}")]
    MalformedTimestamp { token: String, reason: String },
}

/// Result type for retention operations
pub type Result<T> = std::result::Result<T, RetentionError>;
