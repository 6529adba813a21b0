// crates/ce_core/src/rng.rs
//
// Seeded ChaCha20 draw source for fresh (non-replayed) events such as ad
// backfire checks in batch simulations. Resolution rolls never use this; they
// come from `hash::fnv1a_32`.
//
// Integer-only draws: unbiased ranges via rejection sampling and explicit seeding.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Deterministic draw source seeded from a single `u64`.
///
/// The mapping from `u64` to the ChaCha20 32-byte seed is explicit:
/// `seed.to_le_bytes()` into the first 8 bytes, the remaining 24 bytes zero.
#[derive(Debug, Clone)]
pub struct DrawRng {
    rng: ChaCha20Rng,
}

impl DrawRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self { rng: ChaCha20Rng::from_seed(seed32) }
    }

    /// Unbiased integer in `[0, n)`; `None` if `n == 0`.
    ///
    /// `threshold = 2^64 mod n`; accept `x >= threshold`, then `x % n` is uniform.
    #[inline]
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.rng.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Percent roll in `[0, 100)`.
    #[inline]
    pub fn roll_percent(&mut self) -> u32 {
        self.gen_range(100).map_or(0, |v| v as u32)
    }
}
