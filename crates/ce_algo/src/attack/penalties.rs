//! crates/ce_algo/src/attack/penalties.rs
//! Ethics penalty and voter fatigue, both in [0, 100].

use ce_core::numeric::clamp_pct;

/// Ethics penalty per point of missing credibility.
const ETHICS_PER_CREDIBILITY_GAP: f64 = 0.4;
/// Ethics penalty per prior ad in the window, and its cap.
const ETHICS_PER_PRIOR_AD: f64 = 8.0;
const ETHICS_PRIOR_CAP: f64 = 40.0;

/// Fatigue per prior ad in the window, and its cap.
const FATIGUE_PER_PRIOR_AD: f64 = 10.0;
const FATIGUE_PRIOR_CAP: f64 = 60.0;
/// Fatigue from an ad launched "just now", decaying linearly to 0 over the window.
const FATIGUE_RECENCY_MAX: f64 = 40.0;

/// Lower credibility and more prior attacks raise the penalty; counters pay half.
pub fn ethics_penalty(credibility: f64, previous_ads: u32, is_counter: bool) -> f64 {
    let gap = 100.0 - clamp_pct(credibility);
    let prior = (f64::from(previous_ads) * ETHICS_PER_PRIOR_AD).min(ETHICS_PRIOR_CAP);
    let raw = gap * ETHICS_PER_CREDIBILITY_GAP + prior;
    clamp_pct(if is_counter { raw / 2.0 } else { raw })
}

/// Frequency plus recency. `days_since_last_ad == None` means no earlier ad.
pub fn voter_fatigue(previous_ads: u32, days_since_last_ad: Option<f64>, window_days: u32) -> f64 {
    let frequency = (f64::from(previous_ads) * FATIGUE_PER_PRIOR_AD).min(FATIGUE_PRIOR_CAP);
    let recency = match days_since_last_ad {
        Some(d) if window_days > 0 => {
            let elapsed = d.max(0.0) / f64::from(window_days);
            (FATIGUE_RECENCY_MAX * (1.0 - elapsed)).max(0.0)
        }
        _ => 0.0,
    };
    clamp_pct(frequency + recency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethics_examples() {
        assert_eq!(ethics_penalty(100.0, 0, false), 0.0);
        assert!((ethics_penalty(50.0, 0, false) - 20.0).abs() < 1e-9);
        assert!((ethics_penalty(50.0, 2, false) - 36.0).abs() < 1e-9);
        assert!((ethics_penalty(50.0, 2, true) - 18.0).abs() < 1e-9);
        // prior-ad contribution caps at 40
        assert!((ethics_penalty(0.0, 50, false) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn fatigue_decays_with_time() {
        assert_eq!(voter_fatigue(0, None, 14), 0.0);
        assert!((voter_fatigue(1, Some(0.0), 14) - 50.0).abs() < 1e-9);
        assert!((voter_fatigue(1, Some(7.0), 14) - 30.0).abs() < 1e-9);
        assert!((voter_fatigue(0, Some(30.0), 14) - 0.0).abs() < 1e-9);
        assert_eq!(voter_fatigue(20, Some(0.0), 14), 100.0);
    }
}
