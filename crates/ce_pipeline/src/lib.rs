//! ce_pipeline: campaign engine request surface.
//!
//! Flow per request: store read → `ce_algo` computation → consequence applier
//! (the single writer) → store. Pure math lives in `ce_algo`, snapshot and
//! hashing I/O in `ce_io`; this crate owns the seams (store, ledger, clock,
//! debate/history collaborators) and the at-most-once resolution guard.

#![forbid(unsafe_code)]

pub mod collaborators;
pub mod engine;
pub mod errors;
pub mod memory;
pub mod store;

mod advertise;
mod apply;
mod evaluate;
mod resolve;

pub use advertise::{AdLaunch, LaunchReport};
pub use collaborators::{
    AccountLedger, Clock, DebatePerformance, ElectionHistory, FixedClock, InMemoryLedger,
    LedgerError, StaticScores, SystemClock,
};
pub use engine::Engine;
pub use errors::{EngineError, EngineResult};
pub use evaluate::CampaignOverview;
pub use memory::MemoryBackend;
pub use resolve::AppliedResolution;
pub use store::{AdCommit, CampaignStore, CommittedAd, InMemoryStore, PollShift, StoreError, Versioned};

// Types callers need to read results without depending on the lower crates directly.
pub use ce_algo::{AdAssessment, AdOutcome, ValidationIssue, ValidationReport};
pub use ce_core::{
    AdId, CampaignCycle, CampaignId, CampaignPhase, CandidateId, Countdown, ElectionOutcome,
    EngineParams, NegativeAdRecord, OutcomeTier, PollingSample, Research, ResearchId,
    WinProbability,
};
