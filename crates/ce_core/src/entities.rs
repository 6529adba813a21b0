//! Domain entities: campaign cycles, polling samples, negative ads, outcomes.
//!
//! Field names serialize in camelCase; enum tokens in SCREAMING_SNAKE_CASE
//! (`ANNOUNCEMENT`, `LANDSLIDE`, ...).

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{AdId, CampaignId, CandidateId, ResearchId};

/* -------------------------------------------------------------------------- */
/*                                   Phases                                   */
/* -------------------------------------------------------------------------- */

/// Campaign phases in their canonical (forward-only) order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CampaignPhase {
    Announcement,
    Fundraising,
    Active,
    Resolution,
    Election,
}

impl CampaignPhase {
    pub const ALL: [CampaignPhase; 5] = [
        CampaignPhase::Announcement,
        CampaignPhase::Fundraising,
        CampaignPhase::Active,
        CampaignPhase::Resolution,
        CampaignPhase::Election,
    ];

    /// Following phase, or `None` from `Election` (terminal until the cycle restarts).
    pub fn next(self) -> Option<CampaignPhase> {
        match self {
            CampaignPhase::Announcement => Some(CampaignPhase::Fundraising),
            CampaignPhase::Fundraising => Some(CampaignPhase::Active),
            CampaignPhase::Active => Some(CampaignPhase::Resolution),
            CampaignPhase::Resolution => Some(CampaignPhase::Election),
            CampaignPhase::Election => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CampaignPhase::Announcement => "ANNOUNCEMENT",
            CampaignPhase::Fundraising => "FUNDRAISING",
            CampaignPhase::Active => "ACTIVE",
            CampaignPhase::Resolution => "RESOLUTION",
            CampaignPhase::Election => "ELECTION",
        }
    }
}

impl fmt::Display for CampaignPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignPhase {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CampaignPhase::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidPhase(s.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/*                               Campaign cycle                               */
/* -------------------------------------------------------------------------- */

/// One candidate's state for one election cycle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CampaignCycle {
    pub campaign_id: CampaignId,
    pub candidate_id: CandidateId,
    /// Source of all determinism for this candidate+cycle.
    pub seed: String,
    pub cycle_sequence: u32,
    pub active_phase: CampaignPhase,
    /// Seconds since epoch; the current phase may end at or after this instant.
    pub phase_ends_epoch: i64,
    /// 0..=100
    pub reputation_score: u8,
    pub funds_raised_this_cycle: f64,
    pub endorsements_acquired: u32,
    pub scandals_active: u32,
    /// Set by the consequence applier when this cycle's election was applied.
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_resolved_sequence: Option<u32>,
}

impl CampaignCycle {
    /// True once results for the current `cycle_sequence` were applied.
    pub fn is_resolved(&self) -> bool {
        self.last_resolved_sequence == Some(self.cycle_sequence)
    }
}

/* -------------------------------------------------------------------------- */
/*                                  Polling                                   */
/* -------------------------------------------------------------------------- */

/// One timestamped public-support reading. Immutable once archived.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PollingSample {
    pub candidate_id: CandidateId,
    pub timestamp_epoch: i64,
    /// 0..=100
    pub final_support_percent: f64,
}

/* -------------------------------------------------------------------------- */
/*                              Negative campaign                             */
/* -------------------------------------------------------------------------- */

/// Opposition research an attacker may cite.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Research {
    pub id: ResearchId,
    pub owner_id: CandidateId,
    pub target_id: CandidateId,
    /// 0..=100
    pub credibility: u8,
}

/// One launched attack ad. Derived fields are computed at launch and never hand-set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NegativeAdRecord {
    pub id: AdId,
    pub attacker_id: CandidateId,
    pub target_id: CandidateId,
    /// `None` means the ad is not research-backed.
    pub research_id: Option<ResearchId>,
    pub amount_spent: f64,
    /// Attacker's phase at launch.
    pub campaign_phase: CampaignPhase,
    pub launched_epoch: i64,
    /// Set when this ad answers an earlier attack.
    #[cfg_attr(feature = "serde", serde(default))]
    pub in_response_to: Option<AdId>,
    pub effectiveness: f64,
    pub backfire_occurred: bool,
    pub ethics_penalty_applied: f64,
    pub voter_fatigue_impact: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub countered: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub counter_effectiveness: Option<f64>,
}

impl NegativeAdRecord {
    /// The only mutation a record admits, and only once.
    pub fn mark_countered(&mut self, counter_effectiveness: f64) -> Result<(), CoreError> {
        if self.countered {
            return Err(CoreError::AlreadyCountered);
        }
        self.countered = true;
        self.counter_effectiveness = Some(crate::numeric::clamp_pct(counter_effectiveness));
        Ok(())
    }
}

/* -------------------------------------------------------------------------- */
/*                                Model outputs                               */
/* -------------------------------------------------------------------------- */

/// The five factor scores, each in [0, 100].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WinFactors {
    pub polling: f64,
    pub reputation: f64,
    pub funds: f64,
    pub endorsements: f64,
    pub debates: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WinProbability {
    /// 0..=100
    pub probability: f64,
    pub factors: WinFactors,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Countdown {
    pub hours_remaining: i64,
    pub minutes_remaining: i64,
    pub can_resolve: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OutcomeTier {
    Landslide,
    Comfortable,
    Narrow,
    Loss,
}

impl OutcomeTier {
    pub fn is_win(self) -> bool {
        !matches!(self, OutcomeTier::Loss)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Rewards {
    pub funds: u64,
    /// Signed reputation delta.
    pub reputation: i32,
    pub influence_points: u32,
}

/// Inputs to the roll, echoed so a resolution can be replayed and audited.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResolutionAudit {
    pub seed: String,
    pub hash: u32,
    pub roll: u32,
    pub variance: f64,
    pub probability: f64,
    pub scandals_active: u32,
}

/// Derived resolution result; never persisted as its own entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ElectionOutcome {
    pub candidate_id: CandidateId,
    pub cycle_sequence: u32,
    pub won: bool,
    pub outcome_tier: OutcomeTier,
    pub final_vote_percent: f64,
    pub rewards: Rewards,
    pub audit: ResolutionAudit,
}
