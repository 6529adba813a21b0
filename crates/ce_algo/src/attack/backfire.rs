//! crates/ce_algo/src/attack/backfire.rs
//! Backfire probability and the roll drawn against it.
//!
//! Two roll sources, both replayable: `HashedBackfire` derives the roll from
//! the attacker's seed and the ad id (same stored state → same roll), and
//! `SeededBackfire` draws from a ChaCha20 stream for batch simulations.

use ce_core::hash::{derive_seed, fnv1a_32, roll_percent};
use ce_core::ids::AdId;
use ce_core::numeric::clamp_pct;
use ce_core::rng::DrawRng;

const BACKFIRE_PER_CREDIBILITY_GAP: f64 = 0.3;
const BACKFIRE_PER_ETHICS_POINT: f64 = 0.4;

/// Rises as credibility falls and as the ethics penalty grows; halved for counter-attacks.
pub fn backfire_probability(credibility: f64, ethics_penalty: f64, is_counter: bool) -> f64 {
    let raw = (100.0 - clamp_pct(credibility)) * BACKFIRE_PER_CREDIBILITY_GAP
        + clamp_pct(ethics_penalty) * BACKFIRE_PER_ETHICS_POINT;
    clamp_pct(if is_counter { raw / 2.0 } else { raw })
}

/// Source of a percent roll in `[0, 100)`.
pub trait BackfireRoll {
    fn roll_percent(&mut self) -> u32;
}

/// Roll = `fnv1a_32("{attackerSeed}-backfire-{adId}") % 100`.
#[derive(Debug, Clone)]
pub struct HashedBackfire {
    seed: String,
}

impl HashedBackfire {
    pub fn for_ad(attacker_seed: &str, ad_id: &AdId) -> Self {
        Self { seed: derive_seed(attacker_seed, "backfire", ad_id) }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl BackfireRoll for HashedBackfire {
    fn roll_percent(&mut self) -> u32 {
        roll_percent(fnv1a_32(&self.seed))
    }
}

/// Draws from a seeded ChaCha20 stream; successive ads consume successive draws.
#[derive(Debug, Clone)]
pub struct SeededBackfire(pub DrawRng);

impl SeededBackfire {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(DrawRng::from_seed_u64(seed))
    }
}

impl BackfireRoll for SeededBackfire {
    fn roll_percent(&mut self) -> u32 {
        self.0.roll_percent()
    }
}

/// Backfire occurs when `roll < probability`.
#[inline]
pub fn backfire_occurs(probability: f64, roll: u32) -> bool {
    f64::from(roll) < probability
}
