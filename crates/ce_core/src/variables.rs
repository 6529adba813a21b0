//! variables.rs: engine parameters with safe defaults.
//!
//! Every tunable of the model lives here. All structs default field-by-field,
//! so `{}` is a complete parameter file; `EngineParams::validate` rejects
//! incoherent combinations before the engine uses them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entities::{CampaignPhase, OutcomeTier, Rewards};
use crate::errors::CoreError;

/// ------------ Macros ------------

/// Define an enum with explicit wire tokens.
macro_rules! wire_enum {
    ($name:ident => { $($variant:ident = $token:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self { $( $name::$variant => $token, )+ }
            }
        }
    };
}

wire_enum!(BackfireMode => {
    Hashed = "hashed",
    Seeded = "seeded"
});

impl Default for BackfireMode {
    fn default() -> Self {
        BackfireMode::Hashed
    }
}

/// ------------ Win-probability model ------------

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelWeights {
    pub polling: f64,
    pub reputation: f64,
    pub funds: f64,
    pub endorsements: f64,
    pub debates: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self { polling: 0.50, reputation: 0.20, funds: 0.15, endorsements: 0.10, debates: 0.05 }
    }
}

impl ModelWeights {
    pub fn sum(&self) -> f64 {
        self.polling + self.reputation + self.funds + self.endorsements + self.debates
    }

    fn as_array(&self) -> [f64; 5] {
        [self.polling, self.reputation, self.funds, self.endorsements, self.debates]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelParams {
    pub weights: ModelWeights,
    /// Number of most recent polling samples averaged.
    pub polling_window: usize,
    /// Used when a candidate has no polling history.
    pub default_polling: f64,
    /// Used when no debate aggregator score is available.
    pub default_debate: f64,
    /// Funds that map to a full funds score of 100.
    pub funds_full_scale: f64,
    /// Score points per endorsement.
    pub endorsement_points: f64,
    /// Historical win rate reported when no history is available.
    pub default_win_rate: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            weights: ModelWeights::default(),
            polling_window: 5,
            default_polling: 50.0,
            default_debate: 50.0,
            funds_full_scale: 10_000.0,
            endorsement_points: 10.0,
            default_win_rate: 60.0,
        }
    }
}

/// ------------ Resolution ------------

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TierThresholds {
    /// `final_vote_percent >= landslide_min` → LANDSLIDE
    pub landslide_min: f64,
    /// `final_vote_percent >= comfortable_min` → COMFORTABLE, else NARROW
    pub comfortable_min: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self { landslide_min: 60.0, comfortable_min: 55.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardTable {
    pub landslide: Rewards,
    pub comfortable: Rewards,
    pub narrow: Rewards,
    pub loss: Rewards,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            landslide: Rewards { funds: 10_000, reputation: 15, influence_points: 500 },
            comfortable: Rewards { funds: 7_500, reputation: 10, influence_points: 350 },
            narrow: Rewards { funds: 5_000, reputation: 5, influence_points: 200 },
            loss: Rewards { funds: 0, reputation: -10, influence_points: 0 },
        }
    }
}

impl RewardTable {
    pub fn for_tier(&self, tier: OutcomeTier) -> Rewards {
        match tier {
            OutcomeTier::Landslide => self.landslide,
            OutcomeTier::Comfortable => self.comfortable,
            OutcomeTier::Narrow => self.narrow,
            OutcomeTier::Loss => self.loss,
        }
    }
}

/// ------------ Negative campaigning ------------

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdParams {
    pub min_spend: f64,
    pub max_spend: f64,
    /// Credibility assumed for ads without research.
    pub default_credibility: f64,
    /// Trailing window for prior-attack counts.
    pub fatigue_window_days: u32,
    /// Polling points moved per effectiveness point.
    pub polling_scale: f64,
    /// Attacker's own shift as a fraction of the target's (going negative costs a little).
    pub attacker_self_harm: f64,
    /// On backfire, the target gains this fraction of the would-be damage.
    pub backfire_target_rebound: f64,
    /// On backfire, the attacker loses this multiple of the would-be damage.
    pub backfire_attacker_multiplier: f64,
    /// Reputation points lost per ethics-penalty point.
    pub reputation_per_ethics_point: f64,
    /// Extra reputation points lost when an ad backfires.
    pub backfire_reputation_cost: u8,
    pub backfire_mode: BackfireMode,
    /// ChaCha20 seed for `BackfireMode::Seeded`; ignored when hashed.
    pub backfire_seed: u64,
}

impl Default for AdParams {
    fn default() -> Self {
        Self {
            min_spend: 25_000.0,
            max_spend: 250_000.0,
            default_credibility: 50.0,
            fatigue_window_days: 14,
            polling_scale: 0.1,
            attacker_self_harm: 0.1,
            backfire_target_rebound: 0.5,
            backfire_attacker_multiplier: 1.5,
            reputation_per_ethics_point: 0.1,
            backfire_reputation_cost: 5,
            backfire_mode: BackfireMode::Hashed,
            backfire_seed: 0,
        }
    }
}

/// ------------ Cycle timing ------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhaseDurations {
    pub announcement_hours: u32,
    pub fundraising_hours: u32,
    pub active_hours: u32,
    pub resolution_hours: u32,
    pub election_hours: u32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            announcement_hours: 24,
            fundraising_hours: 72,
            active_hours: 120,
            resolution_hours: 24,
            election_hours: 24,
        }
    }
}

impl PhaseDurations {
    /// Length of `phase` in seconds.
    pub fn seconds(&self, phase: CampaignPhase) -> i64 {
        let h = match phase {
            CampaignPhase::Announcement => self.announcement_hours,
            CampaignPhase::Fundraising => self.fundraising_hours,
            CampaignPhase::Active => self.active_hours,
            CampaignPhase::Resolution => self.resolution_hours,
            CampaignPhase::Election => self.election_hours,
        };
        i64::from(h) * 3_600
    }
}

/// ------------ Top-level ------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineParams {
    pub model: ModelParams,
    pub tiers: TierThresholds,
    pub rewards: RewardTable,
    pub ads: AdParams,
    pub phases: PhaseDurations,
}

impl EngineParams {
    /// Coherence checks; the first failing field is reported.
    pub fn validate(&self) -> Result<(), CoreError> {
        let m = &self.model;
        if m.weights.as_array().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CoreError::InvalidParams("model.weights"));
        }
        if (m.weights.sum() - 1.0).abs() > 1e-6 {
            return Err(CoreError::InvalidParams("model.weights (must sum to 1)"));
        }
        if m.polling_window == 0 {
            return Err(CoreError::InvalidParams("model.polling_window"));
        }
        if !(m.funds_full_scale > 0.0) {
            return Err(CoreError::InvalidParams("model.funds_full_scale"));
        }
        if !(m.endorsement_points >= 0.0) {
            return Err(CoreError::InvalidParams("model.endorsement_points"));
        }
        for (v, k) in [
            (m.default_polling, "model.default_polling"),
            (m.default_debate, "model.default_debate"),
            (m.default_win_rate, "model.default_win_rate"),
            (self.tiers.landslide_min, "tiers.landslide_min"),
            (self.tiers.comfortable_min, "tiers.comfortable_min"),
            (self.ads.default_credibility, "ads.default_credibility"),
        ] {
            if !(0.0..=100.0).contains(&v) {
                return Err(CoreError::InvalidParams(k));
            }
        }
        if self.tiers.landslide_min < self.tiers.comfortable_min {
            return Err(CoreError::InvalidParams("tiers (landslide_min < comfortable_min)"));
        }
        let a = &self.ads;
        if !(a.min_spend > 0.0) || !(a.max_spend >= a.min_spend) {
            return Err(CoreError::InvalidParams("ads.min_spend/max_spend"));
        }
        if a.fatigue_window_days == 0 {
            return Err(CoreError::InvalidParams("ads.fatigue_window_days"));
        }
        for (v, k) in [
            (a.polling_scale, "ads.polling_scale"),
            (a.attacker_self_harm, "ads.attacker_self_harm"),
            (a.backfire_target_rebound, "ads.backfire_target_rebound"),
            (a.backfire_attacker_multiplier, "ads.backfire_attacker_multiplier"),
            (a.reputation_per_ethics_point, "ads.reputation_per_ethics_point"),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CoreError::InvalidParams(k));
            }
        }
        if CampaignPhase::ALL.iter().any(|p| self.phases.seconds(*p) <= 0) {
            return Err(CoreError::InvalidParams("phases (durations must be positive)"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_match_model_constants() {
        let p = EngineParams::default();
        assert!(p.validate().is_ok());
        assert!((p.model.weights.sum() - 1.0).abs() < 1e-12);
        assert_eq!(p.rewards.for_tier(OutcomeTier::Landslide).funds, 10_000);
        assert_eq!(p.rewards.for_tier(OutcomeTier::Loss).reputation, -10);
        assert_eq!(p.phases.seconds(CampaignPhase::Election), 86_400);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let mut p = EngineParams::default();
        p.model.weights.debates = 0.5;
        assert_eq!(p.validate(), Err(CoreError::InvalidParams("model.weights (must sum to 1)")));
    }

    #[test]
    fn rejects_inverted_tiers_and_spend_bounds() {
        let mut p = EngineParams::default();
        p.tiers.landslide_min = 50.0;
        assert!(p.validate().is_err());

        let mut p = EngineParams::default();
        p.ads.max_spend = 1.0;
        assert!(p.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn empty_json_object_is_defaults() {
        let p: EngineParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p, EngineParams::default());
        let p: EngineParams =
            serde_json::from_str(r#"{"ads":{"backfire_mode":"seeded"},"tiers":{"landslide_min":65}}"#).unwrap();
        assert_eq!(p.ads.backfire_mode, BackfireMode::Seeded);
        assert_eq!(p.ads.min_spend, 25_000.0);
        assert_eq!(p.tiers.landslide_min, 65.0);
        assert_eq!(p.tiers.comfortable_min, 55.0);
    }
}
