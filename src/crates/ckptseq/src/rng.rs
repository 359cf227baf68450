//! Deterministic, re-derivable randomness (§4.13 of the design).
//!
//! Every stage that needs randomness re-seeds a fresh generator from `(base_seed,
//! structural_index)` rather than carrying a running generator forward. That keeps checkpoint
//! tokens to a couple of integers instead of serialized generator internals, and makes
//! restoration exact regardless of how many times the generator was previously stepped.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Mix two integers into a single `u64` seed using a SplitMix64-style finalizer.
///
/// `base` identifies the stage (its construction-time seed); `structural_index` identifies the
/// position in the stage's structure that needs its own independent stream (a pass number, a
/// block index, an item index). The mixing is a pure function, so the same pair always yields the
/// same derived seed, on any machine, across any number of prior calls.
pub fn derive_seed(base: u64, structural_index: u64) -> u64 {
    let mut z = base
        .wrapping_add(structural_index.wrapping_mul(0x9E3779B97F4A7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Build the generator a stage should use for a given structural index, given its own seed.
pub fn rng_for(base_seed: u64, structural_index: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(base_seed, structural_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_seed_is_deterministic() {
        assert_eq!(derive_seed(42, 7), derive_seed(42, 7));
    }

    #[test]
    fn derive_seed_distinguishes_indices() {
        assert_ne!(derive_seed(42, 7), derive_seed(42, 8));
    }

    #[test]
    fn derive_seed_distinguishes_bases() {
        assert_ne!(derive_seed(42, 7), derive_seed(43, 7));
    }
}
