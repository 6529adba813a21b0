//! Deterministic hash source (FNV-1a, 32-bit).
//!
//! Resolution never touches a live RNG: every "random" decision is derived
//! from `f(stable_seed, purpose_tag, sequence)` through this hash, so the same
//! persisted state always replays the same roll.
//!
//! - `roll_percent(h)` = `h % 100`
//! - `variance_pp(h)`  = `(h % 1000) / 1000 * 10 - 5`, i.e. ±5 percentage points

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// FNV-1a over the UTF-8 bytes of `seed`.
#[inline]
pub fn fnv1a_32(seed: &str) -> u32 {
    seed.bytes().fold(FNV_OFFSET_BASIS, |h, b| (h ^ u32::from(b)).wrapping_mul(FNV_PRIME))
}

/// Roll in `[0, 100)`.
#[inline]
pub fn roll_percent(h: u32) -> u32 {
    h % 100
}

/// Signed variance in `[-5.0, +5.0)` percentage points.
#[inline]
pub fn variance_pp(h: u32) -> f64 {
    (f64::from(h % 1000) / 1000.0) * 10.0 - 5.0
}

/// Compose a purpose-tagged seed: `"{base}-{purpose}-{discriminator}"`.
#[inline]
pub fn derive_seed(base: &str, purpose: &str, discriminator: impl core::fmt::Display) -> String {
    format!("{base}-{purpose}-{discriminator}")
}

/// Seed used for the election roll of a given cycle.
#[inline]
pub fn election_seed(cycle_seed: &str, cycle_sequence: u32) -> String {
    derive_seed(cycle_seed, "election", cycle_sequence)
}
