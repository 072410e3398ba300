//! Drift/warp motion model.
//!
//! Static entities are never moved by mutating them. Each frame their draw
//! position, scale and fade are derived from three inputs: the entity's
//! generated origin and parallax, the global `drift_offset` accumulator, and
//! the smoothed `drift_amount`. At `drift_amount = 0` every entity sits at its
//! origin; at 1 it streams outward from the viewport center along its radial
//! direction, wrapping back to the center once its depth phase passes 1.

use deepspace_config::{DriftConfig, PerspectiveCurve, PhaseSeed};
use glam::Vec2;

use crate::entity::{Galaxy, Nebula, Star, StarCluster};
use crate::random::hash_unit;

/// `drift_offset` wraps here to keep `f64` phase arithmetic precise.
pub const DRIFT_OFFSET_WRAP: f64 = 1.0e6;

/// Below this distance from the center an entity has no radial direction.
const CENTER_EPSILON: f32 = 1e-4;

/// Canvas dimensions in logical pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    /// Zero, negative or non-finite sizes are clamped to 1×1; a bad pixel
    /// ratio becomes 1.
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let clamp_dim = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width: clamp_dim(width),
            height: clamp_dim(height),
            device_pixel_ratio: dpr,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Distance from the center to a corner.
    pub fn corner_distance(&self) -> f32 {
        self.center().length()
    }

    /// Whether `position` lies inside the viewport grown by `margin` on every side.
    pub fn contains(&self, position: Vec2, margin: f32) -> bool {
        position.x >= -margin
            && position.x <= self.width + margin
            && position.y >= -margin
            && position.y <= self.height + margin
    }
}

/// Anything the motion model can place: a fixed origin and a nearness factor.
pub trait DriftBody {
    fn origin(&self) -> Vec2;
    fn parallax_factor(&self) -> f32;
}

macro_rules! impl_drift_body {
    ($($ty:ty),*) => {
        $(impl DriftBody for $ty {
            fn origin(&self) -> Vec2 {
                self.origin
            }

            fn parallax_factor(&self) -> f32 {
                self.parallax_factor
            }
        })*
    };
}

impl_drift_body!(Star, Galaxy, Nebula, StarCluster);

/// Per-frame inputs shared by every projection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriftState {
    pub drift_amount: f32,
    pub drift_offset: f64,
    /// Smoothed pointer in `[-1, 1]²`.
    pub pointer: Vec2,
}

/// Where and how an entity is drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub position: Vec2,
    /// Multiplier on the entity's own size.
    pub scale: f32,
    /// Multiplier on the entity's own alpha, in `[0, 1]`.
    pub fade: f32,
    pub phase: f32,
}

/// Hermite smooth step on `[0, 1]`.
pub fn smooth_step(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fraction of `max_radius` travelled at `phase`.
pub fn travel_fraction(curve: PerspectiveCurve, phase: f32) -> f32 {
    let phase = phase.clamp(0.0, 1.0);
    match curve {
        PerspectiveCurve::Linear => phase,
        PerspectiveCurve::Quadratic => phase * phase,
    }
}

/// Inverse of [`travel_fraction`].
pub fn phase_for_fraction(curve: PerspectiveCurve, fraction: f32) -> f32 {
    let fraction = fraction.clamp(0.0, 1.0);
    match curve {
        PerspectiveCurve::Linear => fraction,
        PerspectiveCurve::Quadratic => fraction.sqrt(),
    }
}

/// Phase in `[0, 1)` an entity starts its cycle at.
pub fn initial_phase(config: &DriftConfig, viewport: &Viewport, origin: Vec2) -> f32 {
    match config.phase_seed {
        PhaseSeed::Hashed => hash_unit(origin.x, origin.y),
        PhaseSeed::Radial => {
            let max_radius = max_radius(config, viewport);
            let fraction = (origin - viewport.center()).length() / max_radius;
            let phase = phase_for_fraction(config.curve, fraction);
            if phase >= 1.0 { 0.0 } else { phase }
        }
    }
}

/// Phase advance per unit of `drift_offset`. Nearer entities travel faster.
pub fn body_speed(config: &DriftConfig, parallax_factor: f32) -> f32 {
    config.base_speed + parallax_factor * config.speed_scale
}

/// `(initial + drift_offset * speed) mod 1`, evaluated in `f64`.
pub fn depth_phase(initial: f32, drift_offset: f64, speed: f32) -> f32 {
    let phase = (initial as f64 + drift_offset * speed as f64).rem_euclid(1.0) as f32;
    // Rounding can land exactly on 1.0 after narrowing.
    if phase >= 1.0 { 0.0 } else { phase }
}

/// Alpha envelope over a cycle: fade in over `[0, fade_in_end]`, hold, fade
/// out over `[fade_out_start, 1]`.
pub fn fade_envelope(phase: f32, fade_in_end: f32, fade_out_start: f32) -> f32 {
    let fade_in = if fade_in_end > 0.0 {
        (phase / fade_in_end).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let fade_out = if fade_out_start < 1.0 {
        ((1.0 - phase) / (1.0 - fade_out_start)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    fade_in.min(fade_out)
}

/// Size multiplier at full drift: small near the center, large at the edge.
pub fn size_curve(config: &DriftConfig, phase: f32) -> f32 {
    lerp(config.center_scale, config.edge_scale, phase.clamp(0.0, 1.0))
}

/// Largest travel distance, slightly past the corners so entities exit
/// before they wrap.
pub fn max_radius(config: &DriftConfig, viewport: &Viewport) -> f32 {
    viewport.corner_distance() * config.travel_overshoot.max(1.0)
}

/// Advance the global drift accumulator by one tick.
pub fn advance_drift_offset(offset: f64, rate_per_second: f32, dt: f32, drift_amount: f32) -> f64 {
    (offset + rate_per_second as f64 * dt as f64 * drift_amount as f64).rem_euclid(DRIFT_OFFSET_WRAP)
}

/// Compute this frame's placement of `body`.
pub fn project(
    body: &impl DriftBody,
    config: &DriftConfig,
    viewport: &Viewport,
    state: &DriftState,
) -> Projection {
    let origin = body.origin();
    let parallax = body.parallax_factor();
    let drift = state.drift_amount.clamp(0.0, 1.0);

    let initial = initial_phase(config, viewport, origin);
    let phase = depth_phase(initial, state.drift_offset, body_speed(config, parallax));

    let center = viewport.center();
    let radial = origin - center;
    let distance = radial.length();
    let warp = if distance < CENTER_EPSILON {
        center
    } else {
        let travel = travel_fraction(config.curve, phase) * max_radius(config, viewport);
        center + radial / distance * travel
    };

    let pointer_shift = state.pointer * config.parallax_strength * parallax;
    let position = origin.lerp(warp, drift) + pointer_shift;

    let scale = lerp(1.0, size_curve(config, phase), drift);
    let envelope = fade_envelope(phase, config.fade_in_end, config.fade_out_start);
    let fade = lerp(1.0, envelope, drift).clamp(0.0, 1.0);

    Projection {
        position,
        scale,
        fade,
        phase,
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Smoothed drift amount driven by user activity.
///
/// A single progress value moves toward 0 at `1 / release_secs` while the
/// user is active and toward 1 at `1 / engage_secs` once they have been idle
/// for `idle_threshold_secs`. The reported amount is `smooth_step(progress)`.
#[derive(Clone, Debug)]
pub struct DriftController {
    progress: f32,
    idle_time: f32,
    idle_threshold: f32,
    engage_secs: f32,
    release_secs: f32,
    locked: Option<f32>,
}

impl DriftController {
    pub fn new(config: &DriftConfig) -> Self {
        Self {
            progress: 0.0,
            idle_time: 0.0,
            idle_threshold: config.idle_threshold_secs.max(0.0),
            engage_secs: config.engage_secs.max(f32::EPSILON),
            release_secs: config.release_secs.max(f32::EPSILON),
            locked: None,
        }
    }

    /// Advance by `dt` seconds. `active` means the user did something this tick.
    pub fn update(&mut self, dt: f32, active: bool) {
        if active {
            self.idle_time = 0.0;
            self.progress -= dt / self.release_secs;
        } else {
            self.idle_time += dt;
            if self.idle_time >= self.idle_threshold {
                self.progress += dt / self.engage_secs;
            }
        }
        self.progress = self.progress.clamp(0.0, 1.0);
    }

    /// Current drift amount in `[0, 1]`.
    pub fn amount(&self) -> f32 {
        self.locked.unwrap_or_else(|| smooth_step(self.progress))
    }

    /// Pin the amount, e.g. 0 for a reduced-motion preference.
    pub fn lock(&mut self, amount: f32) {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        self.locked = Some(amount.clamp(0.0, 1.0));
    }

    pub fn unlock(&mut self) {
        self.locked = None;
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    pub fn idle_time(&self) -> f32 {
        self.idle_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::generate_stars;
    use crate::random::seeded_rng;
    use deepspace_config::{DensityConfig, SceneConfig};

    struct Point {
        origin: Vec2,
        parallax: f32,
    }

    impl DriftBody for Point {
        fn origin(&self) -> Vec2 {
            self.origin
        }

        fn parallax_factor(&self) -> f32 {
            self.parallax
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, 1.0)
    }

    fn stars() -> Vec<Star> {
        let mut rng = seeded_rng(42);
        generate_stars(
            800.0,
            600.0,
            &DensityConfig::default(),
            &SceneConfig::default(),
            &mut rng,
        )
    }

    fn circular_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).abs();
        d.min(1.0 - d)
    }

    #[test]
    fn test_zero_drift_is_identity() {
        let config = DriftConfig::default();
        for offset in [0.0, 0.37, 12.5, 9_999.9] {
            let state = DriftState {
                drift_amount: 0.0,
                drift_offset: offset,
                pointer: Vec2::ZERO,
            };
            for star in stars() {
                let p = project(&star, &config, &viewport(), &state);
                assert_eq!(p.position, star.origin, "star moved at zero drift");
                assert_eq!(p.scale, 1.0);
                assert_eq!(p.fade, 1.0);
            }
        }
    }

    #[test]
    fn test_center_entity_has_no_displacement() {
        let config = DriftConfig::default();
        let body = Point {
            origin: viewport().center(),
            parallax: 0.5,
        };
        let state = DriftState {
            drift_amount: 1.0,
            drift_offset: 3.3,
            pointer: Vec2::ZERO,
        };
        let p = project(&body, &config, &viewport(), &state);
        assert!(p.position.is_finite(), "center entity produced NaN");
        assert_eq!(p.position, viewport().center());
    }

    #[test]
    fn test_phase_wraps_after_one_cycle() {
        for speed in [0.6_f32, 1.0, 1.37, 2.0] {
            for k in [0.0_f64, 0.25, 5.0, 123.456] {
                let a = depth_phase(0.3, k, speed);
                let b = depth_phase(0.3, k + 1.0 / speed as f64, speed);
                assert!(
                    circular_distance(a, b) < 1e-4,
                    "phase {a} vs {b} at k={k} speed={speed}"
                );
            }
        }
    }

    #[test]
    fn test_depth_phase_in_unit_range() {
        for i in 0..1000 {
            let phase = depth_phase(0.999, i as f64 * 0.123, 1.7);
            assert!((0.0..1.0).contains(&phase), "phase {phase} escaped [0, 1)");
        }
    }

    #[test]
    fn test_full_drift_moves_along_radial_direction() {
        let config = DriftConfig::default();
        let body = Point {
            origin: Vec2::new(600.0, 300.0),
            parallax: 0.2,
        };
        let state = DriftState {
            drift_amount: 1.0,
            drift_offset: 0.1,
            pointer: Vec2::ZERO,
        };
        let p = project(&body, &config, &viewport(), &state);
        // Origin is due right of center, so the warp stays on the horizontal axis.
        assert!((p.position.y - 300.0).abs() < 1e-3);
        assert!(p.position.x >= 400.0);
    }

    #[test]
    fn test_radial_seed_starts_at_origin() {
        let config = DriftConfig {
            phase_seed: PhaseSeed::Radial,
            ..DriftConfig::default()
        };
        let state = DriftState {
            drift_amount: 1.0,
            drift_offset: 0.0,
            pointer: Vec2::ZERO,
        };
        for star in stars().iter().take(50) {
            let p = project(star, &config, &viewport(), &state);
            assert!(
                (p.position - star.origin).length() < 0.05,
                "radial seed should place {:?} at its origin, got {:?}",
                star.origin,
                p.position
            );
        }
    }

    #[test]
    fn test_quadratic_curve_inverse() {
        for i in 0..=10 {
            let f = i as f32 / 10.0;
            let phase = phase_for_fraction(PerspectiveCurve::Quadratic, f);
            let back = travel_fraction(PerspectiveCurve::Quadratic, phase);
            assert!((back - f).abs() < 1e-5);
        }
        assert!(
            travel_fraction(PerspectiveCurve::Quadratic, 0.5)
                < travel_fraction(PerspectiveCurve::Linear, 0.5),
            "quadratic should lag linear mid-cycle"
        );
    }

    #[test]
    fn test_fade_envelope_shape() {
        assert_eq!(fade_envelope(0.0, 0.25, 0.9), 0.0);
        assert_eq!(fade_envelope(0.5, 0.25, 0.9), 1.0);
        assert!((fade_envelope(0.125, 0.25, 0.9) - 0.5).abs() < 1e-6);
        assert!(fade_envelope(0.999, 0.25, 0.9) < 0.02);
    }

    #[test]
    fn test_pointer_parallax_scales_with_nearness() {
        let config = DriftConfig::default();
        let state = DriftState {
            drift_amount: 0.0,
            drift_offset: 0.0,
            pointer: Vec2::new(1.0, 0.0),
        };
        let far = Point {
            origin: Vec2::new(100.0, 100.0),
            parallax: 0.1,
        };
        let near = Point {
            origin: Vec2::new(100.0, 100.0),
            parallax: 0.9,
        };
        let far_shift = project(&far, &config, &viewport(), &state).position.x - 100.0;
        let near_shift = project(&near, &config, &viewport(), &state).position.x - 100.0;
        assert!(near_shift > far_shift);
        assert!((near_shift - config.parallax_strength * 0.9).abs() < 1e-3);
    }

    #[test]
    fn test_advance_drift_offset_wraps() {
        let near_wrap = DRIFT_OFFSET_WRAP - 0.01;
        let next = advance_drift_offset(near_wrap, 1.0, 0.02, 1.0);
        assert!(next < 1.0, "offset {next} should have wrapped");
        assert_eq!(advance_drift_offset(5.0, 0.05, 1.0, 0.0), 5.0);
    }

    #[test]
    fn test_viewport_clamps_degenerate_sizes() {
        let v = Viewport::new(0.0, f32::NAN, -2.0);
        assert_eq!((v.width, v.height, v.device_pixel_ratio), (1.0, 1.0, 1.0));
        assert!(v.contains(Vec2::new(-5.0, 0.5), 10.0));
        assert!(!v.contains(Vec2::new(-20.0, 0.5), 10.0));
    }

    #[test]
    fn test_smooth_step_endpoints() {
        assert_eq!(smooth_step(0.0), 0.0);
        assert_eq!(smooth_step(1.0), 1.0);
        assert!((smooth_step(0.5) - 0.5).abs() < f32::EPSILON);
        assert_eq!(smooth_step(-3.0), 0.0);
    }

    #[test]
    fn test_drift_controller_engages_after_idle() {
        let mut drift = DriftController::new(&DriftConfig::default());
        for _ in 0..20 {
            drift.update(0.1, false);
        }
        assert_eq!(drift.amount(), 0.0, "should wait for the idle threshold");
        for _ in 0..80 {
            drift.update(0.1, false);
        }
        assert_eq!(drift.amount(), 1.0, "should be fully engaged");
    }

    #[test]
    fn test_drift_controller_releases_on_activity() {
        let mut drift = DriftController::new(&DriftConfig::default());
        for _ in 0..100 {
            drift.update(0.1, false);
        }
        drift.update(0.1, true);
        let mid = drift.amount();
        assert!(mid < 1.0 && mid > 0.0, "release should be smooth, got {mid}");
        for _ in 0..5 {
            drift.update(0.1, true);
        }
        assert_eq!(drift.amount(), 0.0);
        assert_eq!(drift.idle_time(), 0.0);
    }

    #[test]
    fn test_drift_controller_lock() {
        let mut drift = DriftController::new(&DriftConfig::default());
        drift.lock(1.0);
        drift.update(0.1, true);
        assert_eq!(drift.amount(), 1.0);
        drift.lock(7.0);
        assert_eq!(drift.amount(), 1.0, "lock clamps to [0, 1]");
        drift.unlock();
        assert!(!drift.is_locked());
        assert_eq!(drift.amount(), 0.0);
    }
}
