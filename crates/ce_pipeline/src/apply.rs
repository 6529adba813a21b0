//! crates/ce_pipeline/src/apply.rs
//! Consequence applier: the only code that writes a `CampaignCycle`.
//!
//! Every write is compare-and-set on the revision the caller read, so a
//! concurrent mutation surfaces as `Conflict` instead of a double apply.

use ce_algo::{advance_phase, start_next_cycle};
use ce_core::entities::{CampaignCycle, CampaignPhase, ElectionOutcome, NegativeAdRecord, PollingSample};
use ce_core::ids::{CampaignId, CandidateId};
use ce_core::numeric::apply_reputation_delta;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};
use crate::store::{AdCommit, PollShift, Versioned};

impl Engine {
    /// `NotFound` for an unknown campaign, `Forbidden` when it belongs to someone else.
    pub(crate) fn load_owned(
        &self,
        candidate: &CandidateId,
        campaign_id: &CampaignId,
    ) -> EngineResult<Versioned<CampaignCycle>> {
        let read = self
            .store
            .campaign_by_id(campaign_id)?
            .ok_or_else(|| EngineError::NotFound(format!("campaign {campaign_id}")))?;
        if &read.value.candidate_id != candidate {
            return Err(EngineError::Forbidden(format!(
                "campaign {campaign_id} does not belong to {candidate}"
            )));
        }
        Ok(read)
    }

    /// Write an outcome's consequences. Does not dedupe; `resolve_and_apply` does.
    pub fn apply_election_results(
        &self,
        candidate: &CandidateId,
        campaign_id: &CampaignId,
        outcome: &ElectionOutcome,
    ) -> EngineResult<CampaignCycle> {
        let read = self.load_owned(candidate, campaign_id)?;
        self.apply_outcome(read, outcome)
    }

    /// Reputation delta, phase timer reset, resolution marker; then ledger payout.
    pub(crate) fn apply_outcome(
        &self,
        read: Versioned<CampaignCycle>,
        outcome: &ElectionOutcome,
    ) -> EngineResult<CampaignCycle> {
        let Versioned { value: mut cycle, revision } = read;
        if outcome.candidate_id != cycle.candidate_id {
            return Err(EngineError::Forbidden(format!(
                "outcome for {} cannot be applied to {}",
                outcome.candidate_id, cycle.candidate_id
            )));
        }
        if cycle.active_phase != CampaignPhase::Election || cycle.cycle_sequence != outcome.cycle_sequence {
            return Err(EngineError::Conflict(format!(
                "outcome for cycle {} no longer matches {} (cycle {}, {})",
                outcome.cycle_sequence, cycle.candidate_id, cycle.cycle_sequence, cycle.active_phase
            )));
        }

        cycle.reputation_score =
            apply_reputation_delta(cycle.reputation_score, i64::from(outcome.rewards.reputation));
        cycle.phase_ends_epoch = self.now();
        cycle.last_resolved_sequence = Some(outcome.cycle_sequence);

        self.store.write_campaign(cycle.clone(), revision)?;

        let r = outcome.rewards;
        if r.funds > 0 || r.influence_points > 0 {
            if let Err(e) = self.ledger.credit(&cycle.candidate_id, r.funds as f64, u64::from(r.influence_points)) {
                warn!(candidate = %cycle.candidate_id, error = %e, "reward payout failed after commit");
                return Err(e.into());
            }
        }
        info!(
            candidate = %cycle.candidate_id,
            reputation = cycle.reputation_score,
            funds = r.funds,
            influence = r.influence_points,
            "election results applied"
        );
        Ok(cycle)
    }

    /// Persist a launched ad: attacker reputation cost, the record, the countered
    /// mark on the answered ad, and one polling sample per shift. Returns the
    /// written cycle and the appended samples.
    pub(crate) fn commit_ad_consequences(
        &self,
        attacker: Versioned<CampaignCycle>,
        reputation_cost: u8,
        ad: NegativeAdRecord,
        shifts: Vec<PollShift>,
    ) -> EngineResult<(CampaignCycle, Vec<PollingSample>)> {
        let Versioned { value: mut cycle, revision } = attacker;
        cycle.reputation_score =
            apply_reputation_delta(cycle.reputation_score, -i64::from(reputation_cost));
        let committed = self.store.commit_ad(AdCommit {
            attacker: cycle.clone(),
            expected_revision: revision,
            ad,
            shifts,
            default_support: self.params.model.default_polling,
        })?;
        Ok((cycle, committed.samples))
    }

    /// Move the candidate's cycle to its next phase once the timer has run out.
    pub fn advance_phase(&self, candidate: &CandidateId) -> EngineResult<CampaignCycle> {
        let read = self.load_campaign(candidate)?;
        let next = advance_phase(&read.value, self.now(), &self.params.phases)?;
        self.store.write_campaign(next.clone(), read.revision)?;
        info!(candidate = %candidate, phase = %next.active_phase, ends = next.phase_ends_epoch, "phase advanced");
        Ok(next)
    }

    /// Open the next cycle after a resolved election.
    pub fn start_next_cycle(
        &self,
        candidate: &CandidateId,
        campaign_id: Option<CampaignId>,
    ) -> EngineResult<CampaignCycle> {
        let read = self.load_campaign(candidate)?;
        if let Some(id) = &campaign_id {
            if let Some(other) = self.store.campaign_by_id(id)? {
                if &other.value.candidate_id != candidate {
                    return Err(EngineError::Conflict(format!("campaign id {id} is already in use")));
                }
            }
        }
        let next = start_next_cycle(&read.value, self.now(), &self.params.phases, campaign_id)?;
        self.store.write_campaign(next.clone(), read.revision)?;
        info!(candidate = %candidate, cycle = next.cycle_sequence, "new cycle started");
        Ok(next)
    }
}
