//! Entity generators: immutable structural descriptions of every celestial
//! object class, produced from a canvas size and a density configuration.
//!
//! Nothing here reads the clock or drift state. Point sets (arm dots, blobs,
//! filaments, cluster members) are generated once at construction and reused
//! for the entity's lifetime, which is what lets the motion model animate
//! static shapes without flicker.

mod cluster;
mod galaxy;
mod nebula;
mod star;

pub use cluster::{ClusterKind, ClusterStar, StarCluster, generate_star_clusters};
pub use galaxy::{
    ArmPoint, Galaxy, GalaxyKind, GalaxyStructure, ScatterPoint, generate_galaxies,
};
pub use nebula::{
    DustParticle, EmbeddedStar, Filament, Nebula, NebulaBlob, NebulaKind, NebulaLayer,
    generate_nebulas,
};
pub use star::{MAX_STAR_SIZE, STAR_SIZE_BUCKETS, Star, generate_stars, star_count};

use deepspace_config::CountRange;
use glam::Vec2;
use rand::Rng;

use crate::random::{count_in, pick_bucket, uniform};

/// One bucket of a discrete size distribution: `(weight, min, max)`.
pub type SizeBucket = (f32, f32, f32);

/// Pick a bucket by weight, then a uniform size inside it.
pub(crate) fn sample_size(rng: &mut impl Rng, buckets: &[SizeBucket]) -> f32 {
    let weights: Vec<f32> = buckets.iter().map(|b| b.0).collect();
    let (_, min, max) = buckets[pick_bucket(rng, &weights)];
    uniform(rng, min, max)
}

/// Count drawn from `range` scaled by `multiplier`; always inside `scaled_bounds`.
pub(crate) fn sample_count(rng: &mut impl Rng, range: &CountRange, multiplier: f32) -> usize {
    let (lo, hi) = range.scaled_bounds(multiplier);
    count_in(rng, lo, hi)
}

/// Independent-uniform position over the canvas.
pub(crate) fn random_origin(rng: &mut impl Rng, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        uniform(rng, 0.0, width.max(0.0)),
        uniform(rng, 0.0, height.max(0.0)),
    )
}

/// Map `size` within `[min_size, max_size]` onto `[lo, hi]`, clamped.
///
/// Parallax must grow with apparent size, so every generator derives it here.
pub(crate) fn parallax_for_size(size: f32, min_size: f32, max_size: f32, lo: f32, hi: f32) -> f32 {
    let t = ((size - min_size) / (max_size - min_size).max(f32::EPSILON)).clamp(0.0, 1.0);
    (lo + (hi - lo) * t).clamp(0.0, 1.0)
}

/// Unit vector at `angle` radians.
pub(crate) fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
