//! crates/ce_algo/src/attack/impact.rs
//! Polling shifts and reputation cost of a launched ad.

use ce_core::entities::PollingSample;
use ce_core::ids::CandidateId;
use ce_core::numeric::{clamp_f64, clamp_pct};
use ce_core::variables::AdParams;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Signed percentage-point shifts to append for each side.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PollingImpact {
    pub target_polling_shift: f64,
    pub attacker_polling_shift: f64,
}

/// No backfire: target loses `eff * scale`, attacker pays a small share of it.
/// Backfire: target rebounds by a fraction, attacker's loss is amplified.
pub fn polling_impact(effectiveness: f64, backfire: bool, params: &AdParams) -> PollingImpact {
    let damage = clamp_pct(effectiveness) * params.polling_scale;
    if backfire {
        PollingImpact {
            target_polling_shift: damage * params.backfire_target_rebound,
            attacker_polling_shift: -damage * params.backfire_attacker_multiplier,
        }
    } else {
        PollingImpact {
            target_polling_shift: -damage,
            attacker_polling_shift: -damage * params.attacker_self_harm,
        }
    }
}

/// New sample = latest support (or `default`) + shift, clamped.
pub fn shifted_sample(
    candidate_id: &CandidateId,
    latest_support: Option<f64>,
    shift: f64,
    now: i64,
    default: f64,
) -> PollingSample {
    PollingSample {
        candidate_id: candidate_id.clone(),
        timestamp_epoch: now,
        final_support_percent: clamp_pct(latest_support.unwrap_or(default) + shift),
    }
}

/// `round(ethics * rate)` plus the backfire surcharge, saturating at 100.
pub fn reputation_cost(ethics_penalty: f64, backfire: bool, params: &AdParams) -> u8 {
    let base = clamp_f64((clamp_pct(ethics_penalty) * params.reputation_per_ethics_point).round(), 0.0, 100.0) as u8;
    let extra = if backfire { params.backfire_reputation_cost } else { 0 };
    base.saturating_add(extra).min(100)
}
