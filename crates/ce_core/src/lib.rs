//! ce_core: Core types, campaign phases, parameters, and deterministic draws.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! engine (`ce_algo`, `ce_io`, `ce_pipeline`, `ce_cli`).
//!
//! - Registry tokens: `CandidateId`, `CampaignId`, `AdId`, `ResearchId`
//! - Entities: `CampaignCycle`, `PollingSample`, `NegativeAdRecord`, `ElectionOutcome`
//! - `EngineParams` with defaults for every tunable
//! - FNV-1a hash source (resolution rolls) and a seedable ChaCha20 draw source
//! - Clamping numerics so out-of-range inputs degrade to boundary values
//!
//! Serialization derives are gated behind the `serde` feature (on by default).

#![forbid(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod entities;
pub mod hash;
pub mod rng;
pub mod numeric;
pub mod variables;

pub use entities::{
    CampaignCycle, CampaignPhase, Countdown, ElectionOutcome, NegativeAdRecord, OutcomeTier,
    PollingSample, Research, ResolutionAudit, Rewards, WinFactors, WinProbability,
};
pub use errors::CoreError;
pub use ids::{AdId, CampaignId, CandidateId, ResearchId};
pub use variables::EngineParams;
