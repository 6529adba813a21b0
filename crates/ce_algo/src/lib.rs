// crates/ce_algo/src/lib.rs
#![forbid(unsafe_code)]

// Everything here is pure: inputs are snapshots of stored records, outputs are
// values. Reads, writes and clocks belong to ce_pipeline.

pub use ce_core::{
    entities::{CampaignCycle, CampaignPhase, PollingSample},
    ids::CandidateId,
};

// ----------------------------- Model & resolution ------------------------------------

pub mod probability;
pub mod resolution;

pub use probability::{average_polling, factor_scores, win_probability, ProbabilityInputs};
pub use resolution::{clears_roll, resolve_election, resolve_with_hash, tier_for};

// ----------------------------- Cycle state machine -----------------------------------

pub mod cycle;

pub use cycle::{
    advance_phase, can_resolve_election, check_resolvable, election_countdown, start_next_cycle,
    CycleError,
};

// ----------------------------- Negative campaigning ----------------------------------

pub mod attack;

pub use attack::{
    assess_ad, history_from_launches, next_ad_id, resolve_ad, AdAssessment, AdOutcome,
    AttackHistory,
};
pub use attack::validate::{
    validate_ad_request, validate_negative_ad, AdRequest, ValidationIssue,
    ValidationReport,
};
pub use attack::backfire::{BackfireRoll, HashedBackfire, SeededBackfire};
pub use attack::impact::PollingImpact;
