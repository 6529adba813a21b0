//! crates/ce_algo/src/probability.rs
//! Win-probability model: five clamped factor scores and their weighted sum.
//!
//! Pure read over a cycle snapshot and the candidate's polling samples. The
//! debate score is supplied by the caller (`None` falls back to the
//! configured default).

use ce_core::entities::{CampaignCycle, PollingSample, WinFactors, WinProbability};
use ce_core::numeric::{clamp_pct, mean};
use ce_core::variables::{EngineParams, ModelParams, ModelWeights};

/// Snapshot consumed by the model.
#[derive(Clone, Copy, Debug)]
pub struct ProbabilityInputs<'a> {
    pub cycle: &'a CampaignCycle,
    /// Any subset of the candidate's samples; only the most recent `window` are used.
    pub polls: &'a [PollingSample],
    pub debate_score: Option<f64>,
}

/// Average of the `window` most recent samples (by `timestamp_epoch`), or `default`.
///
/// Samples sharing a timestamp keep their input order.
pub fn average_polling(samples: &[PollingSample], window: usize, default: f64) -> f64 {
    let mut recent: Vec<&PollingSample> = samples.iter().collect();
    recent.sort_by(|a, b| b.timestamp_epoch.cmp(&a.timestamp_epoch));
    let avg = mean(
        recent
            .into_iter()
            .take(window)
            .map(|s| clamp_pct(s.final_support_percent)),
    );
    clamp_pct(avg.unwrap_or(default))
}

/// Factor scores, each in [0, 100].
pub fn factor_scores(inputs: &ProbabilityInputs<'_>, model: &ModelParams) -> WinFactors {
    let c = inputs.cycle;
    WinFactors {
        polling: average_polling(inputs.polls, model.polling_window, model.default_polling),
        reputation: clamp_pct(f64::from(c.reputation_score)),
        funds: clamp_pct(c.funds_raised_this_cycle / model.funds_full_scale * 100.0),
        endorsements: clamp_pct(f64::from(c.endorsements_acquired) * model.endorsement_points),
        debates: clamp_pct(inputs.debate_score.unwrap_or(model.default_debate)),
    }
}

/// Weighted sum in fixed factor order, clamped.
pub fn weighted_sum(f: &WinFactors, w: &ModelWeights) -> f64 {
    clamp_pct(
        f.polling * w.polling
            + f.reputation * w.reputation
            + f.funds * w.funds
            + f.endorsements * w.endorsements
            + f.debates * w.debates,
    )
}

pub fn win_probability(inputs: &ProbabilityInputs<'_>, params: &EngineParams) -> WinProbability {
    let factors = factor_scores(inputs, &params.model);
    WinProbability {
        probability: weighted_sum(&factors, &params.model.weights),
        factors,
    }
}
