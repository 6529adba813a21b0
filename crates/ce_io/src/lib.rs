//! crates/ce_io/src/lib.rs
//! I/O for the campaign engine.
//!
//! - `canonical_json`: sorted-key compact JSON and atomic file writes
//! - `hasher`: SHA-256 digests and `OUT:<hex>` audit ids
//! - `snapshot`: the persisted state document
//! - `loader`: read/validate/write snapshots and parameter files
//!
//! Shared error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for ce_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON (de)serialization errors with a JSON Pointer-ish location.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Input exceeds a configured size limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Loaded document breaks a state invariant.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Parameter file failed coherence checks.
    #[error("params: {0}")]
    Params(#[from] ce_core::CoreError),
}

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json has no pointer; report line/column at the root.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod snapshot;

pub use snapshot::{AccountBalance, DebateScore, HistoryRecord, StateSnapshot};
