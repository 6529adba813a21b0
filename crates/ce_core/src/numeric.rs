//! Clamping helpers.
//!
//! Every score, probability and percentage in the engine passes through one of
//! these before it reaches a reward table or a persisted record. NaN degrades
//! to the lower bound.

/// Clamp into `[lo, hi]`; NaN → `lo`.
#[inline]
pub fn clamp_f64(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() {
        return lo;
    }
    x.clamp(lo, hi)
}

/// Clamp a percentage into `[0, 100]`.
#[inline]
pub fn clamp_pct(x: f64) -> f64 {
    clamp_f64(x, 0.0, 100.0)
}

/// Apply a signed delta to a reputation score, saturating at `[0, 100]`.
#[inline]
pub fn apply_reputation_delta(score: u8, delta: i64) -> u8 {
    let next = i64::from(score).saturating_add(delta);
    next.clamp(0, 100) as u8
}

/// Arithmetic mean, or `None` for an empty input.
pub fn mean(xs: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = xs.into_iter().fold((0.0f64, 0u32), |(s, n), x| (s + x, n + 1));
    if n == 0 { None } else { Some(sum / f64::from(n)) }
}
