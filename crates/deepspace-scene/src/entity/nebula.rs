//! Nebulas: layered glow clouds with filaments, dust and embedded stars.
//!
//! Every sub-element lives in local space around the nebula origin and is
//! mapped to view space by [`Nebula::local_to_view`] at draw time.

use std::f32::consts::TAU;

use deepspace_config::{DensityConfig, SceneConfig};
use glam::Vec2;
use noise::{NoiseFn, Simplex};
use rand::Rng;

use super::{SizeBucket, direction, parallax_for_size, random_origin, sample_count, sample_size};
use crate::color::{Color, NebulaPalette, random_nebula_palette, random_star_color};
use crate::random::{centered_unit, pick_bucket, signed_unit, uniform};

/// Distance distribution for nebula radii.
pub const NEBULA_SIZE_BUCKETS: [SizeBucket; 3] =
    [(0.5, 60.0, 120.0), (0.35, 120.0, 220.0), (0.15, 220.0, 360.0)];

const MIN_NEBULA_SIZE: f32 = 60.0;
const MAX_NEBULA_SIZE: f32 = 360.0;

/// Blob radius deviation driven by the simplex field, as a fraction of radius.
const BLOB_NOISE_AMPLITUDE: f32 = 0.35;

/// Nebula morphology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NebulaKind {
    Diffuse,
    Emission,
    Reflection,
    Ring,
    Butterfly,
    Hourglass,
    TwinJet,
}

impl NebulaKind {
    pub const ALL: [NebulaKind; 7] = [
        NebulaKind::Diffuse,
        NebulaKind::Emission,
        NebulaKind::Reflection,
        NebulaKind::Ring,
        NebulaKind::Butterfly,
        NebulaKind::Hourglass,
        NebulaKind::TwinJet,
    ];

    pub fn weight(self) -> f32 {
        match self {
            NebulaKind::Diffuse => 0.30,
            NebulaKind::Emission => 0.25,
            NebulaKind::Reflection => 0.15,
            NebulaKind::Ring => 0.10,
            NebulaKind::Butterfly => 0.08,
            NebulaKind::Hourglass => 0.06,
            NebulaKind::TwinJet => 0.06,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NebulaKind::Diffuse => "diffuse",
            NebulaKind::Emission => "emission",
            NebulaKind::Reflection => "reflection",
            NebulaKind::Ring => "ring",
            NebulaKind::Butterfly => "butterfly",
            NebulaKind::Hourglass => "hourglass",
            NebulaKind::TwinJet => "twinjet",
        }
    }

    /// Case-insensitive lookup by [`NebulaKind::name`].
    pub fn from_name(name: &str) -> Option<NebulaKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Two-lobed planetary shapes.
    pub fn is_bipolar(self) -> bool {
        matches!(
            self,
            NebulaKind::Butterfly | NebulaKind::Hourglass | NebulaKind::TwinJet
        )
    }

    /// Kinds with a visible central star.
    pub fn has_central_star(self) -> bool {
        self == NebulaKind::Ring || self.is_bipolar()
    }
}

/// One soft radial glow inside a layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NebulaBlob {
    pub offset: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

/// A set of blobs sharing one palette color.
#[derive(Clone, Debug, PartialEq)]
pub struct NebulaLayer {
    pub color: Color,
    pub blobs: Vec<NebulaBlob>,
}

/// A thin quadratic-curve wisp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Filament {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
    pub width: f32,
    pub alpha: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DustParticle {
    pub offset: Vec2,
    pub size: f32,
    pub alpha: f32,
}

/// A star visible through the cloud.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmbeddedStar {
    pub offset: Vec2,
    pub size: f32,
    pub brightness: f32,
    pub color: Color,
}

/// A nebula and its pre-generated structure.
#[derive(Clone, Debug, PartialEq)]
pub struct Nebula {
    pub origin: Vec2,
    /// Outer radius in pixels.
    pub size: f32,
    pub brightness: f32,
    pub palette: NebulaPalette,
    pub rotation: f32,
    pub kind: NebulaKind,
    pub layers: Vec<NebulaLayer>,
    pub filaments: Vec<Filament>,
    pub dust: Vec<DustParticle>,
    pub embedded_stars: Vec<EmbeddedStar>,
    pub parallax_factor: f32,
}

impl Nebula {
    /// Rotate a local offset into view orientation.
    pub fn local_to_view(&self, local: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation).rotate(local)
    }
}

/// Generate the nebulas for a canvas.
pub fn generate_nebulas(
    width: f32,
    height: f32,
    density: &DensityConfig,
    scene: &SceneConfig,
    rng: &mut impl Rng,
) -> Vec<Nebula> {
    let count = sample_count(rng, &scene.nebula_count, density.nebula_count_multiplier);
    (0..count)
        .map(|_| generate_nebula(width, height, rng))
        .collect()
}

fn generate_nebula(width: f32, height: f32, rng: &mut impl Rng) -> Nebula {
    let weights = NebulaKind::ALL.map(NebulaKind::weight);
    let kind = NebulaKind::ALL[pick_bucket(rng, &weights)];

    let origin = random_origin(rng, width, height);
    let size = sample_size(rng, &NEBULA_SIZE_BUCKETS);
    let brightness = uniform(rng, 0.4, 0.8);
    let rotation = uniform(rng, 0.0, TAU);
    let palette = random_nebula_palette(kind, rng);
    let parallax_factor = parallax_for_size(size, MIN_NEBULA_SIZE, MAX_NEBULA_SIZE, 0.05, 0.35);

    let noise = Simplex::new(rng.random::<u32>());
    let layers = palette
        .as_array()
        .into_iter()
        .map(|color| NebulaLayer {
            color,
            blobs: generate_blobs(rng, &noise, kind, size),
        })
        .collect();

    let filaments = generate_filaments(rng, size);
    let dust = generate_dust(rng, size);
    let embedded_stars = generate_embedded_stars(rng, kind, size);

    Nebula {
        origin,
        size,
        brightness,
        palette,
        rotation,
        kind,
        layers,
        filaments,
        dust,
        embedded_stars,
        parallax_factor,
    }
}

/// Local blob center for one kind.
fn blob_offset(rng: &mut impl Rng, kind: NebulaKind, size: f32) -> Vec2 {
    match kind {
        NebulaKind::Diffuse | NebulaKind::Emission => {
            direction(uniform(rng, 0.0, TAU)) * size * 0.6 * rng.random::<f32>().sqrt()
        }
        NebulaKind::Reflection => {
            direction(uniform(rng, 0.0, TAU)) * size * 0.45 * rng.random::<f32>().sqrt()
        }
        NebulaKind::Ring => direction(uniform(rng, 0.0, TAU)) * size * 0.6 * uniform(rng, 0.85, 1.15),
        NebulaKind::Butterfly | NebulaKind::Hourglass => {
            let flare = if kind == NebulaKind::Butterfly { 0.6 } else { 0.35 };
            let side = if rng.random::<bool>() { 1.0 } else { -1.0 };
            let along = size * uniform(rng, 0.2, 0.7);
            Vec2::new(side * along, signed_unit(rng) * along * flare)
        }
        NebulaKind::TwinJet => {
            let side = if rng.random::<bool>() { 1.0 } else { -1.0 };
            Vec2::new(
                side * size * uniform(rng, 0.1, 0.9),
                centered_unit(rng) * size * 0.1,
            )
        }
    }
}

fn generate_blobs(
    rng: &mut impl Rng,
    noise: &Simplex,
    kind: NebulaKind,
    size: f32,
) -> Vec<NebulaBlob> {
    let count = ((size / 12.0) as usize).clamp(6, 30);
    let base_scale = if kind == NebulaKind::TwinJet { 0.5 } else { 1.0 };
    (0..count)
        .map(|_| {
            let offset = blob_offset(rng, kind, size);
            let sample = noise.get([
                (offset.x / size * 2.0) as f64,
                (offset.y / size * 2.0) as f64,
            ]) as f32;
            let radius = size * uniform(rng, 0.15, 0.35) * base_scale;
            NebulaBlob {
                offset,
                radius: (radius * (1.0 + BLOB_NOISE_AMPLITUDE * sample)).max(1.0),
                alpha: uniform(rng, 0.03, 0.09),
            }
        })
        .collect()
}

fn generate_filaments(rng: &mut impl Rng, size: f32) -> Vec<Filament> {
    (0..rng.random_range(3..=8))
        .map(|_| {
            let start = direction(uniform(rng, 0.0, TAU)) * size * uniform(rng, 0.0, 0.5);
            let heading = direction(uniform(rng, 0.0, TAU));
            let end = start + heading * size * uniform(rng, 0.3, 0.7);
            let bend = Vec2::new(-heading.y, heading.x) * size * signed_unit(rng) * 0.25;
            Filament {
                start,
                control: (start + end) * 0.5 + bend,
                end,
                width: uniform(rng, 0.5, 2.0),
                alpha: uniform(rng, 0.05, 0.15),
            }
        })
        .collect()
}

fn generate_dust(rng: &mut impl Rng, size: f32) -> Vec<DustParticle> {
    let count = ((size / 4.0) as usize).clamp(20, 120);
    (0..count)
        .map(|_| DustParticle {
            offset: direction(uniform(rng, 0.0, TAU)) * size * 0.8 * rng.random::<f32>().sqrt(),
            size: uniform(rng, 0.3, 1.2),
            alpha: uniform(rng, 0.1, 0.5),
        })
        .collect()
}

fn generate_embedded_stars(rng: &mut impl Rng, kind: NebulaKind, size: f32) -> Vec<EmbeddedStar> {
    let mut stars: Vec<EmbeddedStar> = (0..rng.random_range(3..=12))
        .map(|_| EmbeddedStar {
            offset: direction(uniform(rng, 0.0, TAU)) * size * 0.6 * rng.random::<f32>(),
            size: uniform(rng, 0.6, 1.8),
            brightness: uniform(rng, 0.5, 1.0),
            color: random_star_color(rng),
        })
        .collect();

    if kind.has_central_star() {
        stars.push(EmbeddedStar {
            offset: Vec2::ZERO,
            size: 2.2,
            brightness: 1.0,
            color: Color::new(220, 230, 255),
        });
    }
    stars
}
