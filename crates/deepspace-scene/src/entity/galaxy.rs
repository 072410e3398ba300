//! Distant galaxies: spiral, barred-spiral, elliptical, irregular and
//! lenticular shapes with their dot sets baked at construction.

use std::f32::consts::{PI, TAU};

use deepspace_config::{DensityConfig, SceneConfig};
use glam::Vec2;
use rand::Rng;

use super::{SizeBucket, direction, parallax_for_size, random_origin, sample_count, sample_size};
use crate::color::{GalaxyPalette, random_galaxy_palette};
use crate::random::{centered_unit, pick_bucket, uniform};

/// Distance distribution: far (small, common) to near (large, rare).
pub const GALAXY_SIZE_BUCKETS: [SizeBucket; 3] =
    [(0.6, 15.0, 35.0), (0.3, 35.0, 70.0), (0.1, 70.0, 130.0)];

const MIN_GALAXY_SIZE: f32 = 15.0;
const MAX_GALAXY_SIZE: f32 = 130.0;

/// Galaxy morphology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GalaxyKind {
    Spiral,
    BarredSpiral,
    Elliptical,
    Irregular,
    Lenticular,
}

impl GalaxyKind {
    pub const ALL: [GalaxyKind; 5] = [
        GalaxyKind::Spiral,
        GalaxyKind::BarredSpiral,
        GalaxyKind::Elliptical,
        GalaxyKind::Irregular,
        GalaxyKind::Lenticular,
    ];

    fn weight(self) -> f32 {
        match self {
            GalaxyKind::Spiral => 0.4,
            GalaxyKind::BarredSpiral => 0.2,
            GalaxyKind::Elliptical => 0.2,
            GalaxyKind::Irregular => 0.1,
            GalaxyKind::Lenticular => 0.1,
        }
    }

    /// Whether this kind is drawn from arm points rather than scattered points.
    pub fn has_arms(self) -> bool {
        matches!(self, GalaxyKind::Spiral | GalaxyKind::BarredSpiral)
    }
}

/// One dot along a spiral arm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmPoint {
    /// Position along the arm in `[0, 1]`, core to tip.
    pub t: f32,
    /// Signed perpendicular offset from the arm centerline, in pixels.
    pub offset: f32,
    pub dot_size: f32,
}

/// One dot of a non-spiral galaxy, in local (unrotated, uninclined) space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPoint {
    pub offset: Vec2,
    pub dot_size: f32,
    pub brightness: f32,
}

/// Pre-generated dot set of a galaxy.
#[derive(Clone, Debug, PartialEq)]
pub enum GalaxyStructure {
    /// `arms[arm][i]` for spiral kinds.
    Arms(Vec<Vec<ArmPoint>>),
    /// Scattered points for elliptical, irregular and lenticular kinds.
    Scatter(Vec<ScatterPoint>),
}

/// A distant galaxy.
#[derive(Clone, Debug, PartialEq)]
pub struct Galaxy {
    pub origin: Vec2,
    /// Outer radius in pixels.
    pub size: f32,
    /// In-plane rotation in radians.
    pub rotation: f32,
    pub brightness: f32,
    pub kind: GalaxyKind,
    /// Disk tilt in `[0, 0.85]`; 0 is face-on.
    pub inclination: f32,
    pub arms: u32,
    /// Half-turns an arm makes from core to tip.
    pub arm_tightness: f32,
    /// Arm width as a fraction of `size`.
    pub arm_spread: f32,
    pub core_size: f32,
    /// Half-length of the central bar; 0 unless barred.
    pub bar_length: f32,
    pub palette: GalaxyPalette,
    pub parallax_factor: f32,
    pub structure: GalaxyStructure,
}

impl Galaxy {
    /// Local position of an arm point, before rotation and inclination.
    ///
    /// Distance is `inner + t * (size - inner)` with `inner = core_size * 0.5`
    /// (or the bar half-length for barred spirals); angle is
    /// `arm_rotation + t * π * arm_tightness`.
    pub fn arm_point_local(&self, arm: usize, point: &ArmPoint) -> Vec2 {
        let inner = if self.bar_length > 0.0 {
            self.bar_length
        } else {
            self.core_size * 0.5
        };
        let distance = inner + point.t * (self.size - inner);
        let arm_rotation = arm as f32 * TAU / self.arms.max(1) as f32;
        let angle = arm_rotation + point.t * PI * self.arm_tightness;
        let along = direction(angle);
        let perpendicular = Vec2::new(-along.y, along.x);
        along * distance + perpendicular * point.offset
    }

    /// Apply the inclination squash and in-plane rotation to a local offset.
    pub fn local_to_view(&self, local: Vec2) -> Vec2 {
        let squashed = Vec2::new(local.x, local.y * (1.0 - self.inclination));
        Vec2::from_angle(self.rotation).rotate(squashed)
    }

    /// Total number of pre-generated dots.
    pub fn point_count(&self) -> usize {
        match &self.structure {
            GalaxyStructure::Arms(arms) => arms.iter().map(Vec::len).sum(),
            GalaxyStructure::Scatter(points) => points.len(),
        }
    }
}

/// Generate the galaxies for a canvas.
pub fn generate_galaxies(
    width: f32,
    height: f32,
    density: &DensityConfig,
    scene: &SceneConfig,
    rng: &mut impl Rng,
) -> Vec<Galaxy> {
    let count = sample_count(rng, &scene.galaxy_count, density.galaxy_count_multiplier);
    (0..count)
        .map(|_| generate_galaxy(width, height, rng))
        .collect()
}

fn generate_galaxy(width: f32, height: f32, rng: &mut impl Rng) -> Galaxy {
    let weights = GalaxyKind::ALL.map(GalaxyKind::weight);
    let kind = GalaxyKind::ALL[pick_bucket(rng, &weights)];

    let origin = random_origin(rng, width, height);
    let size = sample_size(rng, &GALAXY_SIZE_BUCKETS);
    let rotation = uniform(rng, 0.0, TAU);
    let brightness = uniform(rng, 0.35, 0.75);
    let inclination = uniform(rng, 0.0, 0.85);
    let core_size = size * uniform(rng, 0.15, 0.3);
    let palette = random_galaxy_palette(rng);
    let parallax_factor = parallax_for_size(size, MIN_GALAXY_SIZE, MAX_GALAXY_SIZE, 0.05, 0.4);

    let arms = match kind {
        GalaxyKind::Spiral => rng.random_range(2..=4),
        GalaxyKind::BarredSpiral => 2,
        _ => 0,
    };
    let arm_tightness = uniform(rng, 1.5, 3.5);
    let arm_spread = uniform(rng, 0.08, 0.25);
    let bar_length = if kind == GalaxyKind::BarredSpiral {
        core_size * uniform(rng, 1.2, 1.8)
    } else {
        0.0
    };

    let structure = match kind {
        GalaxyKind::Spiral | GalaxyKind::BarredSpiral => {
            GalaxyStructure::Arms(arm_points(rng, size, arms, arm_spread))
        }
        GalaxyKind::Elliptical => GalaxyStructure::Scatter(elliptical_points(rng, size)),
        GalaxyKind::Lenticular => GalaxyStructure::Scatter(lenticular_points(rng, size)),
        GalaxyKind::Irregular => GalaxyStructure::Scatter(irregular_points(rng, size)),
    };

    Galaxy {
        origin,
        size,
        rotation,
        brightness,
        kind,
        inclination,
        arms,
        arm_tightness,
        arm_spread,
        core_size,
        bar_length,
        palette,
        parallax_factor,
        structure,
    }
}

fn arm_points(rng: &mut impl Rng, size: f32, arms: u32, arm_spread: f32) -> Vec<Vec<ArmPoint>> {
    let per_arm = ((size * 1.5) as usize).clamp(20, 180);
    (0..arms)
        .map(|_| {
            (0..per_arm)
                .map(|i| {
                    let t = (i as f32 + rng.random::<f32>()) / per_arm as f32;
                    // Arms thin out toward the tips.
                    let taper = 1.0 - 0.5 * t;
                    ArmPoint {
                        t,
                        offset: centered_unit(rng) * arm_spread * size * taper,
                        dot_size: uniform(rng, 0.4, 1.2) * taper,
                    }
                })
                .collect()
        })
        .collect()
}

fn elliptical_points(rng: &mut impl Rng, size: f32) -> Vec<ScatterPoint> {
    let count = ((size * 2.0) as usize).clamp(30, 250);
    let elongation = uniform(rng, 0.5, 0.9);
    (0..count)
        .map(|_| {
            // Squaring the radius concentrates points toward the center.
            let r_t = rng.random::<f32>().powi(2);
            let angle = uniform(rng, 0.0, TAU);
            let d = direction(angle) * r_t * size;
            ScatterPoint {
                offset: Vec2::new(d.x, d.y * elongation),
                dot_size: uniform(rng, 0.3, 1.0) * (1.0 - 0.4 * r_t),
                brightness: (1.0 - 0.7 * r_t).clamp(0.0, 1.0),
            }
        })
        .collect()
}

fn lenticular_points(rng: &mut impl Rng, size: f32) -> Vec<ScatterPoint> {
    let count = ((size * 2.0) as usize).clamp(30, 250);
    (0..count)
        .map(|i| {
            let angle = uniform(rng, 0.0, TAU);
            if i % 5 < 2 {
                // Bulge.
                let r_t = rng.random::<f32>().powi(2) * 0.4;
                let d = direction(angle) * r_t * size;
                ScatterPoint {
                    offset: d,
                    dot_size: uniform(rng, 0.5, 1.1),
                    brightness: (1.0 - r_t).clamp(0.0, 1.0),
                }
            } else {
                // Thin disk.
                let r_t = rng.random::<f32>().sqrt();
                let d = direction(angle) * r_t * size;
                ScatterPoint {
                    offset: Vec2::new(d.x, d.y * 0.15),
                    dot_size: uniform(rng, 0.3, 0.8),
                    brightness: (0.8 - 0.6 * r_t).clamp(0.0, 1.0),
                }
            }
        })
        .collect()
}

fn irregular_points(rng: &mut impl Rng, size: f32) -> Vec<ScatterPoint> {
    let clumps: Vec<Vec2> = (0..rng.random_range(2..=4))
        .map(|_| direction(uniform(rng, 0.0, TAU)) * size * uniform(rng, 0.0, 0.6))
        .collect();
    let count = ((size * 1.6) as usize).clamp(25, 200);
    (0..count)
        .map(|i| {
            let clump = clumps[i % clumps.len()];
            let r_t = rng.random::<f32>();
            let d = direction(uniform(rng, 0.0, TAU)) * r_t * size * 0.35;
            ScatterPoint {
                offset: clump + d,
                dot_size: uniform(rng, 0.3, 1.1),
                brightness: uniform(rng, 0.3, 0.9),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;

    fn generate(seed: u64, density: &DensityConfig) -> Vec<Galaxy> {
        let mut rng = seeded_rng(seed);
        generate_galaxies(800.0, 600.0, density, &SceneConfig::default(), &mut rng)
    }

    /// Generate a galaxy of a specific kind by sampling until one appears.
    fn galaxy_of_kind(kind: GalaxyKind) -> Galaxy {
        let mut rng = seeded_rng(1234);
        loop {
            let galaxy = generate_galaxy(800.0, 600.0, &mut rng);
            if galaxy.kind == kind {
                return galaxy;
            }
        }
    }

    #[test]
    fn test_galaxy_count_within_scaled_bounds() {
        let scene = SceneConfig::default();
        for multiplier in [0.0, 0.5, 1.0, 1.5, 3.0] {
            let density = DensityConfig {
                galaxy_count_multiplier: multiplier,
                ..DensityConfig::default()
            };
            let (lo, hi) = scene.galaxy_count.scaled_bounds(multiplier);
            for seed in 0..20 {
                let n = generate(seed, &density).len();
                assert!(
                    (lo..=hi).contains(&n),
                    "{n} galaxies outside [{lo}, {hi}] at multiplier {multiplier}"
                );
            }
        }
    }

    #[test]
    fn test_galaxy_fields_in_range() {
        for seed in 0..20 {
            for galaxy in generate(seed, &DensityConfig::default()) {
                assert!((0.0..=1.0).contains(&galaxy.brightness));
                assert!((0.0..=0.85).contains(&galaxy.inclination));
                assert!((0.0..=1.0).contains(&galaxy.parallax_factor));
                assert!(galaxy.size >= MIN_GALAXY_SIZE && galaxy.size <= MAX_GALAXY_SIZE);
                assert!(galaxy.point_count() > 0, "{:?} has no dots", galaxy.kind);
            }
        }
    }

    #[test]
    fn test_spiral_kinds_get_arm_points() {
        for kind in GalaxyKind::ALL {
            let galaxy = galaxy_of_kind(kind);
            match (&galaxy.structure, kind.has_arms()) {
                (GalaxyStructure::Arms(arms), true) => {
                    assert_eq!(arms.len(), galaxy.arms as usize);
                    for arm in arms {
                        for p in arm {
                            assert!((0.0..=1.0).contains(&p.t), "t {} outside [0, 1]", p.t);
                        }
                    }
                }
                (GalaxyStructure::Scatter(_), false) => {}
                (structure, _) => panic!("{kind:?} got unexpected structure {structure:?}"),
            }
        }
    }

    #[test]
    fn test_arm_point_follows_spiral_rule() {
        let galaxy = galaxy_of_kind(GalaxyKind::Spiral);
        let start = ArmPoint {
            t: 0.0,
            offset: 0.0,
            dot_size: 1.0,
        };
        let tip = ArmPoint { t: 1.0, ..start };
        let near = galaxy.arm_point_local(0, &start).length();
        let far = galaxy.arm_point_local(0, &tip).length();
        assert!((near - galaxy.core_size * 0.5).abs() < 1e-3);
        assert!((far - galaxy.size).abs() < 1e-3);
    }

    #[test]
    fn test_barred_arms_start_at_bar_end() {
        let galaxy = galaxy_of_kind(GalaxyKind::BarredSpiral);
        assert!(galaxy.bar_length > 0.0);
        let start = ArmPoint {
            t: 0.0,
            offset: 0.0,
            dot_size: 1.0,
        };
        let near = galaxy.arm_point_local(1, &start).length();
        assert!((near - galaxy.bar_length).abs() < 1e-3);
    }

    #[test]
    fn test_inclination_squashes_minor_axis() {
        let mut galaxy = galaxy_of_kind(GalaxyKind::Elliptical);
        galaxy.rotation = 0.0;
        galaxy.inclination = 0.5;
        let v = galaxy.local_to_view(Vec2::new(10.0, 10.0));
        assert!((v.x - 10.0).abs() < 1e-4);
        assert!((v.y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_same_seed_produces_same_galaxies() {
        let a = generate(77, &DensityConfig::default());
        let b = generate(77, &DensityConfig::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_larger_galaxies_have_more_parallax() {
        let mut galaxies: Vec<Galaxy> = (0..30)
            .flat_map(|seed| generate(seed, &DensityConfig::default()))
            .collect();
        galaxies.sort_by(|a, b| a.size.total_cmp(&b.size));
        for pair in galaxies.windows(2) {
            assert!(pair[0].parallax_factor <= pair[1].parallax_factor);
        }
    }
}
