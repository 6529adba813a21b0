//! crates/ce_algo/src/resolution.rs
//! Seeded election resolution.
//!
//! `h = fnv1a_32("{seed}-election-{cycleSequence}")`, `roll = h % 100`,
//! `won = probability > roll`. A tie goes to the house: a candidate at exactly
//! the roll loses. The vote share is `probability + variance(h)`, clamped,
//! and only tiers a win.

use ce_core::entities::{
    CampaignCycle, ElectionOutcome, OutcomeTier, ResolutionAudit, WinProbability,
};
use ce_core::hash::{election_seed, fnv1a_32, roll_percent, variance_pp};
use ce_core::ids::CandidateId;
use ce_core::numeric::clamp_pct;
use ce_core::variables::{EngineParams, TierThresholds};

/// House-wins-ties: strictly greater than the roll.
#[inline]
pub fn clears_roll(probability: f64, roll: u32) -> bool {
    probability > f64::from(roll)
}

/// Tier for a (won, vote share) pair. A loss is `Loss` at any vote share.
pub fn tier_for(won: bool, final_vote_percent: f64, t: &TierThresholds) -> OutcomeTier {
    if !won {
        OutcomeTier::Loss
    } else if final_vote_percent >= t.landslide_min {
        OutcomeTier::Landslide
    } else if final_vote_percent >= t.comfortable_min {
        OutcomeTier::Comfortable
    } else {
        OutcomeTier::Narrow
    }
}

/// Resolution given an already-computed hash; used by `resolve_election` and by tests
/// that pin a particular roll.
pub fn resolve_with_hash(
    candidate_id: &CandidateId,
    cycle_sequence: u32,
    seed: String,
    h: u32,
    probability: f64,
    scandals_active: u32,
    params: &EngineParams,
) -> ElectionOutcome {
    let probability = clamp_pct(probability);
    let roll = roll_percent(h);
    let variance = variance_pp(h);
    let won = clears_roll(probability, roll);
    let final_vote_percent = clamp_pct(probability + variance);
    let outcome_tier = tier_for(won, final_vote_percent, &params.tiers);

    ElectionOutcome {
        candidate_id: candidate_id.clone(),
        cycle_sequence,
        won,
        outcome_tier,
        final_vote_percent,
        rewards: params.rewards.for_tier(outcome_tier),
        audit: ResolutionAudit { seed, hash: h, roll, variance, probability, scandals_active },
    }
}

/// Resolve a cycle against a computed win probability.
///
/// Callers gate on `cycle::check_resolvable` first; this function only computes.
pub fn resolve_election(
    cycle: &CampaignCycle,
    win: &WinProbability,
    params: &EngineParams,
) -> ElectionOutcome {
    let seed = election_seed(&cycle.seed, cycle.cycle_sequence);
    let h = fnv1a_32(&seed);
    resolve_with_hash(
        &cycle.candidate_id,
        cycle.cycle_sequence,
        seed,
        h,
        win.probability,
        cycle.scandals_active,
        params,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ce_core::entities::{CampaignPhase, WinFactors};

    fn cand() -> CandidateId {
        "alpha".parse().unwrap()
    }

    fn wp(p: f64) -> WinProbability {
        let f = WinFactors { polling: p, reputation: p, funds: p, endorsements: p, debates: p };
        WinProbability { probability: p, factors: f }
    }

    #[test]
    fn landslide_example() {
        // roll 0, variance -2.0
        let o = resolve_with_hash(&cand(), 1, "s".into(), 300, 72.5, 0, &EngineParams::default());
        assert!(o.won);
        assert!((o.final_vote_percent - 70.5).abs() < 1e-9);
        assert_eq!(o.outcome_tier, OutcomeTier::Landslide);
        assert_eq!(o.rewards.funds, 10_000);
        assert_eq!(o.rewards.reputation, 15);
        assert_eq!(o.rewards.influence_points, 500);
        assert_eq!(o.audit.roll, 0);
    }

    #[test]
    fn roll_90_is_a_loss_regardless_of_vote_share() {
        let o = resolve_with_hash(&cand(), 1, "s".into(), 90, 72.5, 2, &EngineParams::default());
        assert!(!o.won);
        assert_eq!(o.outcome_tier, OutcomeTier::Loss);
        assert_eq!(o.rewards.funds, 0);
        assert_eq!(o.rewards.reputation, -10);
        assert_eq!(o.rewards.influence_points, 0);
        assert_eq!(o.audit.scandals_active, 2);
    }

    #[test]
    fn tie_goes_to_the_house() {
        assert!(!clears_roll(40.0, 40));
        assert!(clears_roll(40.000001, 40));
        let o = resolve_with_hash(&cand(), 1, "s".into(), 1_040, 40.0, 0, &EngineParams::default());
        assert!(!o.won);
    }

    #[test]
    fn tier_thresholds_are_inclusive() {
        let t = TierThresholds::default();
        assert_eq!(tier_for(true, 60.0, &t), OutcomeTier::Landslide);
        assert_eq!(tier_for(true, 59.999, &t), OutcomeTier::Comfortable);
        assert_eq!(tier_for(true, 55.0, &t), OutcomeTier::Comfortable);
        assert_eq!(tier_for(true, 54.999, &t), OutcomeTier::Narrow);
        assert_eq!(tier_for(false, 99.0, &t), OutcomeTier::Loss);
    }

    #[test]
    fn resolve_election_uses_stored_seed_and_sequence() {
        let cycle = CampaignCycle {
            campaign_id: "camp-a".parse().unwrap(),
            candidate_id: cand(),
            seed: "alpha".into(),
            cycle_sequence: 2,
            active_phase: CampaignPhase::Election,
            phase_ends_epoch: 0,
            reputation_score: 50,
            funds_raised_this_cycle: 0.0,
            endorsements_acquired: 0,
            scandals_active: 0,
            last_resolved_sequence: None,
        };
        let params = EngineParams::default();
        let o = resolve_election(&cycle, &wp(50.0), &params);
        // fnv1a("alpha-election-2") = 4192844126 → roll 26, variance -3.74
        assert_eq!(o.audit.seed, "alpha-election-2");
        assert_eq!(o.audit.hash, 4_192_844_126);
        assert_eq!(o.audit.roll, 26);
        assert!(o.won);
        assert!((o.final_vote_percent - 46.26).abs() < 1e-9);
        assert_eq!(o.outcome_tier, OutcomeTier::Narrow);
        assert_eq!(o, resolve_election(&cycle, &wp(50.0), &params));
    }
}
