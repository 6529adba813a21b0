//! crates/ce_algo/src/attack/effectiveness.rs

use ce_core::entities::CampaignPhase;
use ce_core::numeric::{clamp_f64, clamp_pct};
use ce_core::variables::AdParams;

/// Ceiling for ads without research.
const UNRESEARCHED_CEILING: f64 = 60.0;
/// Research lifts the ceiling by this much per credibility point.
const CEILING_PER_CREDIBILITY: f64 = 0.4;

const ETHICS_DRAG: f64 = 0.3;
const FATIGUE_DRAG: f64 = 0.4;

/// ACTIVE is the peak; ads are closed in ELECTION.
pub fn phase_multiplier(phase: CampaignPhase) -> f64 {
    match phase {
        CampaignPhase::Announcement => 0.6,
        CampaignPhase::Fundraising => 0.8,
        CampaignPhase::Active => 1.0,
        CampaignPhase::Resolution => 0.7,
        CampaignPhase::Election => 0.0,
    }
}

/// Diminishing returns on spend: `ln(1 + a/min) / ln(1 + max/min)`, 1.0 at the cap.
pub fn spend_factor(amount_spent: f64, params: &AdParams) -> f64 {
    let a = clamp_f64(amount_spent, 0.0, params.max_spend);
    let full = (params.max_spend / params.min_spend).ln_1p();
    if !(full > 0.0) {
        return 1.0;
    }
    clamp_f64((a / params.min_spend).ln_1p() / full, 0.0, 1.0)
}

/// `research_credibility == None` means unresearched.
pub fn effectiveness(
    research_credibility: Option<f64>,
    amount_spent: f64,
    phase: CampaignPhase,
    ethics_penalty: f64,
    voter_fatigue: f64,
    params: &AdParams,
) -> f64 {
    let ceiling = match research_credibility {
        Some(c) => UNRESEARCHED_CEILING + clamp_pct(c) * CEILING_PER_CREDIBILITY,
        None => UNRESEARCHED_CEILING,
    };
    let gross = ceiling * spend_factor(amount_spent, params) * phase_multiplier(phase);
    clamp_pct(gross - ETHICS_DRAG * clamp_pct(ethics_penalty) - FATIGUE_DRAG * clamp_pct(voter_fatigue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_has_diminishing_returns() {
        let p = AdParams::default();
        let f1 = spend_factor(25_000.0, &p);
        let f2 = spend_factor(50_000.0, &p);
        let f3 = spend_factor(75_000.0, &p);
        assert!(f1 < f2 && f2 < f3);
        assert!(f2 - f1 > f3 - f2);
        assert!((spend_factor(250_000.0, &p) - 1.0).abs() < 1e-12);
        assert!((spend_factor(1e12, &p) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn research_and_phase_matter() {
        let p = AdParams::default();
        let researched = effectiveness(Some(80.0), 100_000.0, CampaignPhase::Active, 8.0, 0.0, &p);
        let bare = effectiveness(None, 100_000.0, CampaignPhase::Active, 8.0, 0.0, &p);
        let early = effectiveness(Some(80.0), 100_000.0, CampaignPhase::Announcement, 8.0, 0.0, &p);
        assert!(researched > bare);
        assert!(researched > early);
        // 92 * ln(5)/ln(11) - 2.4
        assert!((researched - (92.0 * 5f64.ln() / 11f64.ln() - 2.4)).abs() < 1e-9);
    }

    #[test]
    fn penalties_drag_to_zero() {
        let p = AdParams::default();
        assert_eq!(effectiveness(None, 25_000.0, CampaignPhase::Announcement, 100.0, 100.0, &p), 0.0);
        assert_eq!(effectiveness(Some(100.0), 250_000.0, CampaignPhase::Election, 0.0, 0.0, &p), 0.0);
    }
}
