use ce_algo::attack::{backfire, effectiveness, penalties};
use ce_algo::{resolve_with_hash, win_probability, ProbabilityInputs};
use ce_core::ids::CandidateId;
use ce_core::entities::{CampaignCycle, CampaignPhase, OutcomeTier, PollingSample};
use ce_core::variables::{AdParams, EngineParams};
use proptest::prelude::*;

fn cycle(rep: u8, funds: f64, endorsements: u32) -> CampaignCycle {
    CampaignCycle {
        campaign_id: "camp-p".parse().unwrap(),
        candidate_id: "prop".parse().unwrap(),
        seed: "prop".into(),
        cycle_sequence: 1,
        active_phase: CampaignPhase::Election,
        phase_ends_epoch: 0,
        reputation_score: rep,
        funds_raised_this_cycle: funds,
        endorsements_acquired: endorsements,
        scandals_active: 0,
        last_resolved_sequence: None,
    }
}

fn polls(values: &[f64]) -> Vec<PollingSample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| PollingSample {
            candidate_id: "prop".parse().unwrap(),
            timestamp_epoch: i as i64,
            final_support_percent: *v,
        })
        .collect()
}

fn probability(c: &CampaignCycle, samples: &[PollingSample], debate: Option<f64>) -> f64 {
    let inputs = ProbabilityInputs { cycle: c, polls: samples, debate_score: debate };
    win_probability(&inputs, &EngineParams::default()).probability
}

fn any_phase() -> impl Strategy<Value = CampaignPhase> {
    prop::sample::select(CampaignPhase::ALL.to_vec())
}

proptest! {
    #[test]
    fn more_funds_never_lowers_probability(
        rep in 0u8..=100, funds in 0.0f64..50_000.0, extra in 0.0f64..50_000.0,
        end in 0u32..20, ps in prop::collection::vec(0.0f64..=100.0, 0..8),
    ) {
        let s = polls(&ps);
        let lo = probability(&cycle(rep, funds, end), &s, None);
        let hi = probability(&cycle(rep, funds + extra, end), &s, None);
        prop_assert!(hi >= lo);
    }

    #[test]
    fn more_reputation_never_lowers_probability(
        rep in 0u8..=100, bump in 0u8..=100, funds in 0.0f64..20_000.0, end in 0u32..20,
    ) {
        let hi_rep = rep.saturating_add(bump).min(100);
        let lo = probability(&cycle(rep, funds, end), &[], None);
        let hi = probability(&cycle(hi_rep, funds, end), &[], None);
        prop_assert!(hi >= lo);
    }

    #[test]
    fn more_endorsements_never_lowers_probability(
        rep in 0u8..=100, funds in 0.0f64..20_000.0, end in 0u32..50, extra in 0u32..50,
    ) {
        let lo = probability(&cycle(rep, funds, end), &[], Some(40.0));
        let hi = probability(&cycle(rep, funds, end + extra), &[], Some(40.0));
        prop_assert!(hi >= lo);
    }

    #[test]
    fn probability_stays_in_bounds_for_wild_inputs(
        rep in any::<u8>(), funds in prop::num::f64::ANY, end in any::<u32>(),
        ps in prop::collection::vec(prop::num::f64::ANY, 0..8), debate in prop::option::of(prop::num::f64::ANY),
    ) {
        let p = probability(&cycle(rep, funds, end), &polls(&ps), debate);
        prop_assert!((0.0..=100.0).contains(&p));
    }

    #[test]
    fn outcome_is_deterministic_bounded_and_consistently_tiered(
        p in -50.0f64..150.0, h in any::<u32>(),
    ) {
        let params = EngineParams::default();
        let cand: CandidateId = "prop".parse().unwrap();
        let a = resolve_with_hash(&cand, 1, "s".into(), h, p, 0, &params);
        let b = resolve_with_hash(&cand, 1, "s".into(), h, p, 0, &params);
        prop_assert_eq!(&a, &b);
        prop_assert!((0.0..=100.0).contains(&a.final_vote_percent));
        if a.won {
            prop_assert!(a.outcome_tier.is_win());
            let expected = if a.final_vote_percent >= 60.0 {
                OutcomeTier::Landslide
            } else if a.final_vote_percent >= 55.0 {
                OutcomeTier::Comfortable
            } else {
                OutcomeTier::Narrow
            };
            prop_assert_eq!(a.outcome_tier, expected);
        } else {
            prop_assert_eq!(a.outcome_tier, OutcomeTier::Loss);
            prop_assert_eq!(a.rewards.funds, 0);
            prop_assert_eq!(a.rewards.influence_points, 0);
        }
    }

    #[test]
    fn ad_figures_stay_in_bounds(
        cred in prop::option::of(0.0f64..=100.0), amount in 25_000.0f64..=250_000.0,
        prev in 0u32..30, days in prop::option::of(0.0f64..60.0), phase in any_phase(),
        counter in any::<bool>(),
    ) {
        let params = AdParams::default();
        let c = cred.unwrap_or(params.default_credibility);
        let ethics = penalties::ethics_penalty(c, prev, counter);
        let fatigue = penalties::voter_fatigue(prev, days, params.fatigue_window_days);
        let eff = effectiveness::effectiveness(cred, amount, phase, ethics, fatigue, &params);
        let bp = backfire::backfire_probability(c, ethics, counter);
        for v in [ethics, fatigue, eff, bp] {
            prop_assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn counters_pay_less(cred in 0.0f64..=100.0, prev in 0u32..30) {
        let first = penalties::ethics_penalty(cred, prev, false);
        let counter = penalties::ethics_penalty(cred, prev, true);
        prop_assert!(counter <= first);
        let e = first;
        prop_assert!(
            backfire::backfire_probability(cred, e, true) <= backfire::backfire_probability(cred, e, false)
        );
    }
}
