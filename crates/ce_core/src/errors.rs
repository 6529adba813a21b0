//! Minimal error set for core-domain validation & parsing.

use core::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CoreError {
    InvalidToken,
    InvalidPhase(String),
    /// `countered`/`counterEffectiveness` may be written exactly once.
    AlreadyCountered,
    /// Parameter set failed coherence checks (field name attached).
    InvalidParams(&'static str),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidToken => write!(f, "invalid token"),
            CoreError::InvalidPhase(p) => write!(f, "invalid campaign phase: {p}"),
            CoreError::AlreadyCountered => write!(f, "ad has already been countered"),
            CoreError::InvalidParams(k) => write!(f, "invalid engine params: {k}"),
        }
    }
}

impl std::error::Error for CoreError {}
