//! Persisted state document.
//!
//! One JSON file holds every record the engine reads or writes, plus the
//! collaborator data (ledger balances, debate scores, win-rate history) the
//! in-memory collaborators are seeded from. Arrays are kept in a canonical
//! order so a save → load → save cycle is byte-stable.

use serde::{Deserialize, Serialize};

use ce_core::entities::{CampaignCycle, NegativeAdRecord, PollingSample, Research};
use ce_core::ids::CandidateId;

/// Ledger balance for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub candidate_id: CandidateId,
    pub funds: f64,
    #[serde(default)]
    pub influence_points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateScore {
    pub candidate_id: CandidateId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub candidate_id: CandidateId,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateSnapshot {
    pub campaigns: Vec<CampaignCycle>,
    pub polls: Vec<PollingSample>,
    pub ads: Vec<NegativeAdRecord>,
    pub research: Vec<Research>,
    pub accounts: Vec<AccountBalance>,
    pub debates: Vec<DebateScore>,
    pub history: Vec<HistoryRecord>,
}

impl StateSnapshot {
    /// Sort every collection into its canonical order.
    ///
    /// campaigns ↑ candidateId; polls ↑ (candidateId, timestampEpoch), stable;
    /// ads ↑ (attackerId, launchedEpoch, id); the rest ↑ their key.
    pub fn normalize(&mut self) {
        self.campaigns.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
        self.polls.sort_by(|a, b| {
            (&a.candidate_id, a.timestamp_epoch).cmp(&(&b.candidate_id, b.timestamp_epoch))
        });
        self.ads.sort_by(|a, b| {
            (&a.attacker_id, a.launched_epoch, &a.id).cmp(&(&b.attacker_id, b.launched_epoch, &b.id))
        });
        self.research.sort_by(|a, b| a.id.cmp(&b.id));
        self.accounts.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
        self.debates.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
        self.history.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
    }
}
