//! Sampling helpers shared by the generators and the shooting-star pool.
//!
//! Everything takes an explicit RNG so a seeded [`ChaCha8Rng`] reproduces a
//! scene exactly; unseeded engines draw their seed from the thread RNG.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// RNG used throughout the scene engine.
pub type SceneRng = ChaCha8Rng;

/// Deterministic RNG for reproducible scenes and tests.
pub fn seeded_rng(seed: u64) -> SceneRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// RNG seeded from the thread RNG, for visual variety between sessions.
pub fn entropy_rng() -> SceneRng {
    ChaCha8Rng::from_rng(&mut rand::rng())
}

/// Uniform `f32` in `[min, max)`. Returns `min` when the range is empty.
pub fn uniform(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    min + rng.random::<f32>() * (max - min)
}

/// Uniform value in `(-1, 1)`.
pub fn signed_unit(rng: &mut impl Rng) -> f32 {
    rng.random::<f32>() * 2.0 - 1.0
}

/// Triangular value in `(-1, 1)` peaking at 0.
pub fn centered_unit(rng: &mut impl Rng) -> f32 {
    rng.random::<f32>() + rng.random::<f32>() - 1.0
}

/// Uniform integer in `lo..=hi`.
pub fn count_in(rng: &mut impl Rng, lo: usize, hi: usize) -> usize {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..=hi)
}

/// Cumulative-weight sampling: returns the index of the chosen bucket.
///
/// Weights need not sum to 1. Falls back to the last bucket on rounding.
pub fn pick_bucket(rng: &mut impl Rng, weights: &[f32]) -> usize {
    let total: f32 = weights.iter().sum();
    let mut roll = rng.random::<f32>() * total;
    for (i, weight) in weights.iter().enumerate() {
        if roll < *weight {
            return i;
        }
        roll -= weight;
    }
    weights.len().saturating_sub(1)
}

/// Stable pseudo-random value in `[0, 1)` derived from a 2-D coordinate.
///
/// Used to seed per-entity phases from static properties, so the same entity
/// always starts its cycle at the same point.
pub fn hash_unit(x: f32, y: f32) -> f32 {
    let bits = ((x.to_bits() as u64) << 32) | y.to_bits() as u64;
    let h = splitmix64(bits);
    (h >> 40) as f32 / (1u64 << 24) as f32
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
