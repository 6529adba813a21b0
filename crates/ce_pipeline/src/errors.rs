//! Single error surface for engine operations.
//!
//! Every variant is recoverable by the caller (re-fetch and retry, or surface
//! to the user). The engine never retries internally.

use ce_algo::{CycleError, ValidationReport};
use thiserror::Error;

use crate::collaborators::LedgerError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-bounds input.
    #[error("validation failed: {}", .report.errors().join("; "))]
    Validation { report: ValidationReport },

    /// Operation not legal in the record's current state (phase, timer, already resolved).
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Caller does not own the record.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Concurrent mutation detected at write time.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence or ledger backend failure.
    #[error("store: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] ce_io::IoError),
}

impl EngineError {
    pub fn validation(report: ValidationReport) -> Self {
        EngineError::Validation { report }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(m) => EngineError::Conflict(m),
            StoreError::NotFound(m) => EngineError::NotFound(m),
            StoreError::Invariant(m) => EngineError::Precondition(m),
            StoreError::Backend(m) => EngineError::Store(m),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(e: LedgerError) -> Self {
        match e {
            // Budget was checked during validation; losing it since then is a race.
            LedgerError::InsufficientFunds { .. } => EngineError::Conflict(e.to_string()),
            LedgerError::InvalidAmount(_) => EngineError::Precondition(e.to_string()),
            LedgerError::Backend(m) => EngineError::Store(m),
        }
    }
}

impl From<CycleError> for EngineError {
    fn from(e: CycleError) -> Self {
        EngineError::Precondition(e.to_string())
    }
}

impl From<ce_core::CoreError> for EngineError {
    fn from(e: ce_core::CoreError) -> Self {
        EngineError::Precondition(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
