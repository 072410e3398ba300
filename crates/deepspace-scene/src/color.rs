//! Palette engine: weighted stellar colors, galaxy and nebula palettes, and
//! the variance/blend helpers used to keep neighboring objects distinct.
//!
//! All functions are pure given the RNG. Alpha is never stored in a
//! [`Color`]; it is computed at draw time from brightness and effects.

use rand::Rng;

use crate::entity::NebulaKind;
use crate::random::pick_bucket;

/// Per-channel offset applied to every star color.
pub const STAR_COLOR_VARIANCE: i16 = 15;

/// Per-channel offset applied to galaxy and nebula palette entries.
pub const PALETTE_VARIANCE: i16 = 20;

/// An 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Add signed offsets to each channel, saturating at `[0, 255]`.
    pub fn offset(self, dr: i16, dg: i16, db: i16) -> Self {
        Self {
            r: (self.r as i16 + dr).clamp(0, 255) as u8,
            g: (self.g as i16 + dg).clamp(0, 255) as u8,
            b: (self.b as i16 + db).clamp(0, 255) as u8,
        }
    }

    /// Linear `[0, 1]` channels with the given alpha appended.
    pub fn to_rgba_f32(self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha.clamp(0.0, 1.0),
        ]
    }
}

/// Spectral classification of a star, determining its apparent color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpectralClass {
    /// Blue, very hot. Rare.
    O,
    /// Blue-white.
    B,
    /// White.
    A,
    /// Yellow-white.
    F,
    /// Yellow, Sol-like. The most common visible class.
    G,
    /// Orange.
    K,
    /// Red.
    M,
}

impl SpectralClass {
    pub const ALL: [SpectralClass; 7] = [
        SpectralClass::O,
        SpectralClass::B,
        SpectralClass::A,
        SpectralClass::F,
        SpectralClass::G,
        SpectralClass::K,
        SpectralClass::M,
    ];

    /// Characteristic display color.
    pub fn color(self) -> Color {
        match self {
            SpectralClass::O => Color::new(155, 176, 255),
            SpectralClass::B => Color::new(170, 191, 255),
            SpectralClass::A => Color::new(202, 215, 255),
            SpectralClass::F => Color::new(248, 247, 255),
            SpectralClass::G => Color::new(255, 244, 234),
            SpectralClass::K => Color::new(255, 210, 161),
            SpectralClass::M => Color::new(255, 204, 111),
        }
    }

    /// Share of visible stars in this class. The weights of [`Self::ALL`] sum to 1.
    pub fn weight(self) -> f32 {
        match self {
            SpectralClass::O => 0.03,
            SpectralClass::B => 0.07,
            SpectralClass::A => 0.15,
            SpectralClass::F => 0.20,
            SpectralClass::G => 0.25,
            SpectralClass::K => 0.20,
            SpectralClass::M => 0.10,
        }
    }
}

/// Core, arm and outer-halo colors of a galaxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GalaxyPalette {
    pub core: Color,
    pub arm: Color,
    pub outer: Color,
}

/// The three cloud colors of a nebula.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NebulaPalette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
}

impl NebulaPalette {
    pub fn as_array(&self) -> [Color; 3] {
        [self.primary, self.secondary, self.accent]
    }
}

const GALAXY_PALETTES: [(Color, Color, Color); 5] = [
    // Old yellow core, blue star-forming arms.
    (
        Color::new(255, 236, 200),
        Color::new(150, 180, 255),
        Color::new(90, 110, 200),
    ),
    // Warm throughout.
    (
        Color::new(255, 220, 170),
        Color::new(230, 190, 150),
        Color::new(160, 120, 100),
    ),
    // Pale white-blue.
    (
        Color::new(240, 240, 255),
        Color::new(190, 210, 255),
        Color::new(120, 140, 210),
    ),
    // Pinkish HII-rich arms.
    (
        Color::new(255, 230, 210),
        Color::new(255, 170, 200),
        Color::new(150, 100, 170),
    ),
    // Faint violet.
    (
        Color::new(230, 220, 255),
        Color::new(180, 160, 240),
        Color::new(110, 90, 180),
    ),
];

const DIFFUSE_PALETTES: [(Color, Color, Color); 3] = [
    (
        Color::new(120, 80, 200),
        Color::new(60, 90, 200),
        Color::new(200, 120, 220),
    ),
    (
        Color::new(80, 110, 190),
        Color::new(140, 80, 170),
        Color::new(90, 160, 200),
    ),
    (
        Color::new(150, 90, 160),
        Color::new(90, 70, 150),
        Color::new(210, 150, 200),
    ),
];

const EMISSION_PALETTES: [(Color, Color, Color); 3] = [
    (
        Color::new(220, 60, 90),
        Color::new(255, 120, 140),
        Color::new(255, 190, 120),
    ),
    (
        Color::new(200, 50, 120),
        Color::new(240, 100, 100),
        Color::new(255, 160, 200),
    ),
    (
        Color::new(230, 90, 60),
        Color::new(200, 60, 110),
        Color::new(255, 210, 150),
    ),
];

const REFLECTION_PALETTES: [(Color, Color, Color); 2] = [
    (
        Color::new(70, 120, 230),
        Color::new(120, 170, 255),
        Color::new(200, 220, 255),
    ),
    (
        Color::new(50, 90, 200),
        Color::new(100, 140, 240),
        Color::new(170, 200, 255),
    ),
];

const RING_PALETTES: [(Color, Color, Color); 2] = [
    (
        Color::new(60, 200, 190),
        Color::new(90, 140, 230),
        Color::new(255, 140, 90),
    ),
    (
        Color::new(80, 220, 160),
        Color::new(60, 160, 220),
        Color::new(240, 100, 120),
    ),
];

const BIPOLAR_PALETTES: [(Color, Color, Color); 3] = [
    (
        Color::new(255, 120, 80),
        Color::new(90, 170, 255),
        Color::new(255, 230, 200),
    ),
    (
        Color::new(200, 90, 230),
        Color::new(90, 220, 200),
        Color::new(255, 200, 240),
    ),
    (
        Color::new(240, 80, 120),
        Color::new(255, 190, 90),
        Color::new(180, 220, 255),
    ),
];

/// Draw a star color: weighted spectral class, then per-channel variance.
pub fn random_star_color(rng: &mut impl Rng) -> Color {
    let weights = SpectralClass::ALL.map(SpectralClass::weight);
    let class = SpectralClass::ALL[pick_bucket(rng, &weights)];
    vary_color(class.color(), STAR_COLOR_VARIANCE, rng)
}

/// Draw a galaxy palette with variance injected into each entry.
pub fn random_galaxy_palette(rng: &mut impl Rng) -> GalaxyPalette {
    let (core, arm, outer) = GALAXY_PALETTES[rng.random_range(0..GALAXY_PALETTES.len())];
    GalaxyPalette {
        core: vary_color(core, PALETTE_VARIANCE, rng),
        arm: vary_color(arm, PALETTE_VARIANCE, rng),
        outer: vary_color(outer, PALETTE_VARIANCE, rng),
    }
}

/// Draw a nebula palette from the table matching `kind`.
pub fn random_nebula_palette(kind: NebulaKind, rng: &mut impl Rng) -> NebulaPalette {
    let table: &[(Color, Color, Color)] = match kind {
        NebulaKind::Emission => &EMISSION_PALETTES,
        NebulaKind::Reflection => &REFLECTION_PALETTES,
        NebulaKind::Ring => &RING_PALETTES,
        NebulaKind::Butterfly | NebulaKind::Hourglass | NebulaKind::TwinJet => &BIPOLAR_PALETTES,
        NebulaKind::Diffuse => &DIFFUSE_PALETTES,
    };
    let (primary, secondary, accent) = table[rng.random_range(0..table.len())];
    NebulaPalette {
        primary: vary_color(primary, PALETTE_VARIANCE, rng),
        secondary: vary_color(secondary, PALETTE_VARIANCE, rng),
        accent: vary_color(accent, PALETTE_VARIANCE, rng),
    }
}

/// Nebula palette looked up by kind name. Unknown names use the diffuse table.
pub fn nebula_palette_by_name(name: &str, rng: &mut impl Rng) -> NebulaPalette {
    let kind = NebulaKind::from_name(name).unwrap_or(NebulaKind::Diffuse);
    random_nebula_palette(kind, rng)
}

/// Offset each channel of `base` by an independent value in `[-variance, variance]`.
pub fn vary_color(base: Color, variance: i16, rng: &mut impl Rng) -> Color {
    let variance = variance.abs();
    if variance == 0 {
        return base;
    }
    base.offset(
        rng.random_range(-variance..=variance),
        rng.random_range(-variance..=variance),
        rng.random_range(-variance..=variance),
    )
}

/// Linear blend from `a` (ratio 0) to `b` (ratio 1). `ratio` is clamped.
pub fn blend_colors(a: Color, b: Color, ratio: f32) -> Color {
    let t = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;

    #[test]
    fn test_spectral_weights_sum_to_one() {
        let total: f32 = SpectralClass::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-5, "weights sum to {total}");
    }

    #[test]
    fn test_star_color_stays_near_a_spectral_class() {
        let mut rng = seeded_rng(11);
        for _ in 0..2000 {
            let color = random_star_color(&mut rng);
            let near = SpectralClass::ALL.iter().any(|class| {
                let base = class.color();
                (color.r as i16 - base.r as i16).abs() <= STAR_COLOR_VARIANCE
                    && (color.g as i16 - base.g as i16).abs() <= STAR_COLOR_VARIANCE
                    && (color.b as i16 - base.b as i16).abs() <= STAR_COLOR_VARIANCE
            });
            assert!(near, "{color:?} is not within variance of any class");
        }
    }

    #[test]
    fn test_star_colors_vary() {
        let mut rng = seeded_rng(11);
        let colors: Vec<Color> = (0..200).map(|_| random_star_color(&mut rng)).collect();
        let mut unique = colors.clone();
        unique.sort_by_key(|c| (c.r, c.g, c.b));
        unique.dedup();
        assert!(
            unique.len() > 150,
            "expected mostly distinct colors, got {} unique of 200",
            unique.len()
        );
    }

    #[test]
    fn test_common_classes_dominate() {
        let mut rng = seeded_rng(5);
        let weights = SpectralClass::ALL.map(SpectralClass::weight);
        let mut counts = [0u32; 7];
        for _ in 0..10_000 {
            counts[pick_bucket(&mut rng, &weights)] += 1;
        }
        // G beats O by a wide margin.
        assert!(counts[4] > counts[0] * 4, "counts: {counts:?}");
    }

    #[test]
    fn test_offset_saturates() {
        let c = Color::new(250, 5, 128).offset(20, -20, 0);
        assert_eq!(c, Color::new(255, 0, 128));
    }

    #[test]
    fn test_blend_endpoints_and_midpoint() {
        let a = Color::new(0, 100, 200);
        let b = Color::new(200, 100, 0);
        assert_eq!(blend_colors(a, b, 0.0), a);
        assert_eq!(blend_colors(a, b, 1.0), b);
        assert_eq!(blend_colors(a, b, 0.5), Color::new(100, 100, 100));
        assert_eq!(blend_colors(a, b, 7.0), b);
        assert_eq!(blend_colors(a, b, f32::NAN), a);
    }

    #[test]
    fn test_vary_color_zero_variance_is_identity() {
        let mut rng = seeded_rng(2);
        let base = Color::new(10, 20, 30);
        assert_eq!(vary_color(base, 0, &mut rng), base);
    }

    #[test]
    fn test_unknown_nebula_name_falls_back_to_diffuse() {
        let mut a = seeded_rng(9);
        let mut b = seeded_rng(9);
        let fallback = nebula_palette_by_name("quasar-soup", &mut a);
        let diffuse = random_nebula_palette(NebulaKind::Diffuse, &mut b);
        assert_eq!(fallback, diffuse);
    }

    #[test]
    fn test_rgba_conversion() {
        let rgba = Color::WHITE.to_rgba_f32(2.0);
        assert_eq!(rgba, [1.0, 1.0, 1.0, 1.0]);
    }
}
