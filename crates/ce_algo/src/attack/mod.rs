//! crates/ce_algo/src/attack/mod.rs
//! Negative-campaign sub-model.
//!
//! Chain per launch: validate → credibility → ethics → fatigue →
//! effectiveness → backfire probability → roll → polling impact. Only the
//! roll has a source outside the inputs, and it is a `BackfireRoll` the
//! caller chooses.

pub mod backfire;
pub mod effectiveness;
pub mod impact;
pub mod penalties;
pub mod validate;

use ce_core::hash::{derive_seed, fnv1a_32};
use ce_core::ids::AdId;
use ce_core::numeric::clamp_pct;
use ce_core::variables::AdParams;
use ce_core::{CampaignPhase, CoreError};

#[cfg(feature = "serde")]
use serde::Serialize;

use self::backfire::{backfire_occurs, backfire_probability, BackfireRoll};
use self::impact::{polling_impact, reputation_cost, PollingImpact};
use self::validate::AdRequest;

const SECS_PER_DAY: f64 = 86_400.0;

/// Attacker's recent record, as seen from `now`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AttackHistory {
    /// Ads launched within the trailing window (and not after `now`).
    pub previous_negative_ad_count: u32,
    /// Days since the most recent earlier ad; `None` if there is none.
    pub days_since_last_ad: Option<f64>,
}

/// Build the history from the launch times of the attacker's stored ads.
pub fn history_from_launches(
    launched: impl IntoIterator<Item = i64>,
    now: i64,
    window_days: u32,
) -> AttackHistory {
    let window_secs = i64::from(window_days) * 86_400;
    let mut count = 0u32;
    let mut last: Option<i64> = None;
    for t in launched.into_iter().filter(|&t| t <= now) {
        if now.saturating_sub(t) <= window_secs {
            count = count.saturating_add(1);
        }
        last = Some(last.map_or(t, |l| l.max(t)));
    }
    AttackHistory {
        previous_negative_ad_count: count,
        days_since_last_ad: last.map(|t| now.saturating_sub(t) as f64 / SECS_PER_DAY),
    }
}

/// Id for the attacker's `ordinal`-th ad: `AD-<8 hex>` of a seed-derived hash.
pub fn next_ad_id(attacker_seed: &str, ordinal: u64) -> Result<AdId, CoreError> {
    let h = fnv1a_32(&derive_seed(attacker_seed, "ad", ordinal));
    AdId::try_from(format!("AD-{h:08x}"))
}

/// Everything derived before the roll.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AdAssessment {
    pub credibility: f64,
    pub researched: bool,
    pub is_counter: bool,
    pub phase: CampaignPhase,
    pub history: AttackHistory,
    pub ethics_penalty: f64,
    pub voter_fatigue: f64,
    pub effectiveness: f64,
    pub backfire_probability: f64,
}

/// Pure part of the chain. Assumes `validate_ad_request` passed.
pub fn assess_ad(req: &AdRequest<'_>, history: AttackHistory, params: &AdParams) -> AdAssessment {
    let researched = req.research.is_some();
    let credibility = req
        .research
        .map(|r| clamp_pct(f64::from(r.credibility)))
        .unwrap_or(params.default_credibility);
    let is_counter = req.answering.is_some();
    let phase = req.attacker.active_phase;

    let ethics_penalty =
        penalties::ethics_penalty(credibility, history.previous_negative_ad_count, is_counter);
    let voter_fatigue = penalties::voter_fatigue(
        history.previous_negative_ad_count,
        history.days_since_last_ad,
        params.fatigue_window_days,
    );
    let effectiveness = effectiveness::effectiveness(
        researched.then_some(credibility),
        req.amount_spent,
        phase,
        ethics_penalty,
        voter_fatigue,
        params,
    );

    AdAssessment {
        credibility,
        researched,
        is_counter,
        phase,
        history,
        ethics_penalty,
        voter_fatigue,
        effectiveness,
        backfire_probability: backfire_probability(credibility, ethics_penalty, is_counter),
    }
}

/// Result of drawing the backfire roll against an assessment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AdOutcome {
    pub backfire_roll: u32,
    pub backfire_occurred: bool,
    pub impact: PollingImpact,
    /// Reputation points the attacker loses.
    pub reputation_cost: u8,
}

pub fn resolve_ad(
    assessment: &AdAssessment,
    roll: &mut dyn BackfireRoll,
    params: &AdParams,
) -> AdOutcome {
    let backfire_roll = roll.roll_percent();
    let backfire_occurred = backfire_occurs(assessment.backfire_probability, backfire_roll);
    AdOutcome {
        backfire_roll,
        backfire_occurred,
        impact: polling_impact(assessment.effectiveness, backfire_occurred, params),
        reputation_cost: reputation_cost(assessment.ethics_penalty, backfire_occurred, params),
    }
}
