//! crates/ce_pipeline/src/resolve.rs
//! Election resolution requests.
//!
//! `resolve_election` is a pure read: gate → probability → seeded roll.
//! `resolve_and_apply` adds the at-most-once guard: the cycle must not be
//! resolved yet, and the write is compare-and-set on the revision the
//! resolution was computed from.

use ce_algo::{check_resolvable, resolve_election};
use ce_core::entities::{CampaignCycle, ElectionOutcome};
use ce_core::ids::{CampaignId, CandidateId};
use ce_io::hasher::outcome_id_from_canonical;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};

/// A committed resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedResolution {
    /// `OUT:<sha256>` over the outcome's canonical JSON.
    pub outcome_id: String,
    pub outcome: ElectionOutcome,
    /// Cycle as written by the applier.
    pub cycle: CampaignCycle,
}

impl Engine {
    /// Outcome for the current cycle; `Precondition` unless `can_resolve_election`.
    pub fn resolve_election(&self, candidate: &CandidateId) -> EngineResult<ElectionOutcome> {
        let cycle = self.current_cycle(candidate)?;
        check_resolvable(&cycle, self.now())?;
        let win = self.probability_for(&cycle)?;
        Ok(resolve_election(&cycle, &win, &self.params))
    }

    /// Resolve and commit exactly once per cycle.
    pub fn resolve_and_apply(
        &self,
        candidate: &CandidateId,
        campaign_id: &CampaignId,
    ) -> EngineResult<AppliedResolution> {
        let read = self.load_owned(candidate, campaign_id)?;
        if read.value.is_resolved() {
            return Err(EngineError::Precondition(format!(
                "cycle {} of {candidate} is already resolved",
                read.value.cycle_sequence
            )));
        }
        check_resolvable(&read.value, self.now())?;

        let win = self.probability_for(&read.value)?;
        let outcome = resolve_election(&read.value, &win, &self.params);
        let outcome_id = outcome_id_from_canonical(&outcome)?;
        let cycle = self.apply_outcome(read, &outcome).inspect_err(|e| {
            if let EngineError::Conflict(m) = e {
                warn!(candidate = %candidate, "resolution lost to a concurrent write: {m}");
            }
        })?;

        info!(
            candidate = %candidate,
            cycle = outcome.cycle_sequence,
            won = outcome.won,
            tier = ?outcome.outcome_tier,
            roll = outcome.audit.roll,
            probability = outcome.audit.probability,
            outcome_id = %outcome_id,
            "election resolved"
        );
        Ok(AppliedResolution { outcome_id, outcome, cycle })
    }
}
