//! crates/ce_io/src/hasher.rs
//!
//! SHA-256 digests and audit ids over canonical bytes.
//!
//! - `sha256_canonical(..)` for values/structs (goes through canonical_json)
//! - `sha256_hex(..)` for raw bytes
//! - `OUT:<hex>` identifies an `ElectionOutcome`; a replayed resolution over
//!   the same stored state yields the same id.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON bytes of `value`.
pub fn sha256_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// `OUT:<hex>` over the canonical bytes of an outcome.
pub fn outcome_id_from_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    Ok(format!("OUT:{}", sha256_canonical(value)?))
}
