//! Star clusters: loose open clusters and dense globular ones.

use std::f32::consts::TAU;

use deepspace_config::{DensityConfig, SceneConfig};
use glam::Vec2;
use rand::Rng;

use super::{SizeBucket, direction, parallax_for_size, random_origin, sample_count, sample_size};
use crate::color::{Color, STAR_COLOR_VARIANCE, vary_color};
use crate::random::uniform;

/// Open cluster radii, far (small, common) to near (large, rare).
pub const OPEN_CLUSTER_SIZE_BUCKETS: [SizeBucket; 3] =
    [(0.6, 25.0, 35.0), (0.3, 35.0, 48.0), (0.1, 48.0, 60.0)];

/// Globular cluster radii; globulars are more compact than open clusters.
pub const GLOBULAR_CLUSTER_SIZE_BUCKETS: [SizeBucket; 3] =
    [(0.6, 20.0, 28.0), (0.3, 28.0, 36.0), (0.1, 36.0, 45.0)];

const MIN_CLUSTER_SIZE: f32 = 20.0;
const MAX_CLUSTER_SIZE: f32 = 60.0;

/// Probability that a generated cluster is open rather than globular.
pub const OPEN_CLUSTER_CHANCE: f32 = 0.65;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClusterKind {
    /// Young, loose, blue-white.
    Open,
    /// Old, dense, warm.
    Globular,
}

impl ClusterKind {
    /// Member-count range, inclusive.
    pub fn member_range(self) -> (usize, usize) {
        match self {
            ClusterKind::Open => (15, 40),
            ClusterKind::Globular => (60, 150),
        }
    }

    /// Radius distribution in pixels.
    pub fn size_buckets(self) -> &'static [SizeBucket] {
        match self {
            ClusterKind::Open => &OPEN_CLUSTER_SIZE_BUCKETS,
            ClusterKind::Globular => &GLOBULAR_CLUSTER_SIZE_BUCKETS,
        }
    }

    pub fn base_color(self) -> Color {
        match self {
            ClusterKind::Open => Color::new(170, 191, 255),
            ClusterKind::Globular => Color::new(255, 220, 170),
        }
    }
}

/// One member star, relative to the cluster center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterStar {
    pub offset: Vec2,
    pub size: f32,
    pub brightness: f32,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StarCluster {
    pub origin: Vec2,
    pub size: f32,
    pub brightness: f32,
    pub kind: ClusterKind,
    pub color: Color,
    pub stars: Vec<ClusterStar>,
    pub parallax_factor: f32,
}

/// Generate the star clusters for a canvas.
pub fn generate_star_clusters(
    width: f32,
    height: f32,
    density: &DensityConfig,
    scene: &SceneConfig,
    rng: &mut impl Rng,
) -> Vec<StarCluster> {
    let count = sample_count(rng, &scene.cluster_count, density.cluster_count_multiplier);
    (0..count)
        .map(|_| generate_cluster(width, height, rng))
        .collect()
}

fn generate_cluster(width: f32, height: f32, rng: &mut impl Rng) -> StarCluster {
    let kind = if rng.random::<f32>() < OPEN_CLUSTER_CHANCE {
        ClusterKind::Open
    } else {
        ClusterKind::Globular
    };

    let origin = random_origin(rng, width, height);
    let size = sample_size(rng, kind.size_buckets());
    let brightness = uniform(rng, 0.5, 0.9);
    let color = kind.base_color();
    let parallax_factor = parallax_for_size(size, MIN_CLUSTER_SIZE, MAX_CLUSTER_SIZE, 0.1, 0.4);

    let (lo, hi) = kind.member_range();
    let members = rng.random_range(lo..=hi);
    let stars = (0..members)
        .map(|_| {
            let r_t = match kind {
                // Uniform over the disk area.
                ClusterKind::Open => rng.random::<f32>().sqrt(),
                // Strongly concentrated toward the core.
                ClusterKind::Globular => rng.random::<f32>().powf(2.5),
            };
            let offset = direction(uniform(rng, 0.0, TAU)) * size * r_t;
            ClusterStar {
                offset,
                size: uniform(rng, 0.4, 1.4) * (1.0 - 0.3 * r_t),
                brightness: (uniform(rng, 0.5, 1.0) * (1.0 - 0.4 * r_t)).clamp(0.0, 1.0),
                color: vary_color(color, STAR_COLOR_VARIANCE, rng),
            }
        })
        .collect();

    StarCluster {
        origin,
        size,
        brightness,
        kind,
        color,
        stars,
        parallax_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;

    fn clusters(seed: u64, n: usize) -> Vec<StarCluster> {
        let mut rng = seeded_rng(seed);
        (0..n).map(|_| generate_cluster(800.0, 600.0, &mut rng)).collect()
    }

    fn mean_radius(cluster: &StarCluster) -> f32 {
        cluster.stars.iter().map(|s| s.offset.length()).sum::<f32>()
            / cluster.stars.len() as f32
            / cluster.size
    }

    #[test]
    fn test_cluster_count_within_scaled_bounds() {
        let scene = SceneConfig::default();
        let density = DensityConfig::default();
        let (lo, hi) = scene
            .cluster_count
            .scaled_bounds(density.cluster_count_multiplier);
        for seed in 0..20 {
            let mut rng = seeded_rng(seed);
            let n = generate_star_clusters(800.0, 600.0, &density, &scene, &mut rng).len();
            assert!((lo..=hi).contains(&n), "{n} clusters outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn test_member_counts_and_extent() {
        for cluster in clusters(5, 40) {
            let (lo, hi) = cluster.kind.member_range();
            assert!((lo..=hi).contains(&cluster.stars.len()));
            for star in &cluster.stars {
                assert!(
                    star.offset.length() <= cluster.size + 1e-3,
                    "member escapes cluster radius"
                );
                assert!((0.0..=1.0).contains(&star.brightness));
            }
        }
    }

    #[test]
    fn test_globular_is_denser_at_center() {
        let all = clusters(11, 60);
        let open: Vec<f32> = all
            .iter()
            .filter(|c| c.kind == ClusterKind::Open)
            .map(mean_radius)
            .collect();
        let globular: Vec<f32> = all
            .iter()
            .filter(|c| c.kind == ClusterKind::Globular)
            .map(mean_radius)
            .collect();
        assert!(!open.is_empty() && !globular.is_empty());
        let open_mean = open.iter().sum::<f32>() / open.len() as f32;
        let globular_mean = globular.iter().sum::<f32>() / globular.len() as f32;
        assert!(
            globular_mean < open_mean,
            "globular {globular_mean} should be more concentrated than open {open_mean}"
        );
    }

    #[test]
    fn test_small_distant_clusters_are_most_common() {
        let all = clusters(21, 400);
        for kind in [ClusterKind::Open, ClusterKind::Globular] {
            let buckets = kind.size_buckets();
            let mut counts = vec![0usize; buckets.len()];
            for cluster in all.iter().filter(|c| c.kind == kind) {
                let bucket = buckets
                    .iter()
                    .position(|&(_, lo, hi)| cluster.size >= lo && cluster.size < hi)
                    .unwrap_or(buckets.len() - 1);
                counts[bucket] += 1;
            }
            assert!(
                counts[0] > counts[1] && counts[1] > counts[2],
                "{kind:?} size buckets should shrink toward the near end: {counts:?}"
            );
        }
    }

    #[test]
    fn test_same_seed_produces_same_clusters() {
        assert_eq!(clusters(8, 5), clusters(8, 5));
    }
}
