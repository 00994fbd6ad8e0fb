//! CLI command implementations

pub mod create;
pub mod delete;
