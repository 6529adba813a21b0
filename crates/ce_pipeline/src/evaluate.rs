//! Read-only evaluations: win probability, resolvability, countdown, overview.

use ce_algo::{can_resolve_election, election_countdown, win_probability, ProbabilityInputs};
use ce_core::entities::{CampaignCycle, CampaignPhase, Countdown, WinProbability};
use ce_core::ids::{CampaignId, CandidateId};
use ce_core::numeric::clamp_pct;
use serde::Serialize;
use tracing::debug;

use crate::engine::Engine;
use crate::errors::EngineResult;

/// Dashboard view of one candidate's cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignOverview {
    pub candidate_id: CandidateId,
    pub campaign_id: CampaignId,
    pub cycle_sequence: u32,
    pub active_phase: CampaignPhase,
    pub reputation_score: u8,
    pub win: WinProbability,
    pub countdown: Countdown,
    pub historical_win_rate: f64,
    pub scandals_active: u32,
}

impl Engine {
    /// Win probability for the candidate's current cycle.
    pub fn compute_win_probability(&self, candidate: &CandidateId) -> EngineResult<WinProbability> {
        let cycle = self.current_cycle(candidate)?;
        self.probability_for(&cycle)
    }

    pub(crate) fn probability_for(&self, cycle: &CampaignCycle) -> EngineResult<WinProbability> {
        let polls = self
            .store
            .recent_polls(&cycle.candidate_id, self.params.model.polling_window)?;
        let inputs = ProbabilityInputs {
            cycle,
            polls: &polls,
            debate_score: self.debates.debate_score(&cycle.candidate_id),
        };
        let wp = win_probability(&inputs, &self.params);
        debug!(
            candidate = %cycle.candidate_id,
            samples = polls.len(),
            probability = wp.probability,
            "win probability"
        );
        Ok(wp)
    }

    pub fn can_resolve_election(&self, candidate: &CandidateId) -> EngineResult<bool> {
        let cycle = self.current_cycle(candidate)?;
        Ok(can_resolve_election(&cycle, self.now()))
    }

    pub fn election_countdown(&self, candidate: &CandidateId) -> EngineResult<Countdown> {
        let cycle = self.current_cycle(candidate)?;
        Ok(election_countdown(&cycle, self.now()))
    }

    pub fn campaign_overview(&self, candidate: &CandidateId) -> EngineResult<CampaignOverview> {
        let cycle = self.current_cycle(candidate)?;
        let win = self.probability_for(&cycle)?;
        let historical_win_rate = clamp_pct(
            self.history
                .win_rate(candidate)
                .unwrap_or(self.params.model.default_win_rate),
        );
        Ok(CampaignOverview {
            candidate_id: cycle.candidate_id.clone(),
            campaign_id: cycle.campaign_id.clone(),
            cycle_sequence: cycle.cycle_sequence,
            active_phase: cycle.active_phase,
            reputation_score: cycle.reputation_score,
            win,
            countdown: election_countdown(&cycle, self.now()),
            historical_win_rate,
            scandals_active: cycle.scandals_active,
        })
    }
}
