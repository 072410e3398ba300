//! The scene engine: owns every collection and accumulator, advances them in
//! `update`, and turns them into an ordered primitive list in `frame`.

use deepspace_config::{
    Config, DensityConfig, DriftConfig, PerformanceTier, QualityConfig, SceneConfig,
    ShootingStarConfig,
};
use glam::Vec2;
use rand::Rng;

use crate::color::{Color, blend_colors};
use crate::entity::{
    Galaxy, GalaxyStructure, Nebula, Star, StarCluster, generate_galaxies, generate_nebulas,
    generate_star_clusters, generate_stars,
};
use crate::motion::{
    DriftBody, DriftController, DriftState, Projection, Viewport, advance_drift_offset, project,
};
use crate::primitive::{DrawPrimitive, Frame, FrameUniforms};
use crate::quality::{QualityController, QualityGates};
use crate::random::{SceneRng, entropy_rng, seeded_rng};
use crate::shooting_star::{ShootingStar, ShootingStarPool};

/// Longest step `update` will integrate. Longer gaps (tab switches, debugger
/// pauses) are clamped so nothing jumps.
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Pointer movement smaller than this does not count as activity.
const POINTER_ACTIVITY_EPSILON: f32 = 1e-3;

/// Stars larger than this get a soft halo.
const STAR_HALO_SIZE: f32 = 1.5;

const BACKGROUND_TOP: Color = Color::new(3, 4, 14);
const BACKGROUND_BOTTOM: Color = Color::new(12, 8, 30);

/// Everything the engine needs to build and animate a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    /// Fixed generation seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    pub tier: PerformanceTier,
    pub density: DensityConfig,
    pub scene: SceneConfig,
    pub drift: DriftConfig,
    pub quality: QualityConfig,
    pub shooting_stars: ShootingStarConfig,
}

impl EngineSettings {
    /// Build settings from a loaded config and a detected tier. An explicit
    /// density in the config wins over the tier table.
    pub fn from_config(config: &Config, tier: PerformanceTier) -> Self {
        let density = config
            .scene
            .density
            .unwrap_or_else(|| DensityConfig::for_tier(tier))
            .sanitized();
        Self {
            seed: config.scene.seed,
            tier,
            density,
            scene: config.scene.clone(),
            drift: config.drift.clone(),
            quality: config.quality.clone(),
            shooting_stars: config.shooting_stars.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default(), PerformanceTier::Medium)
    }
}

/// Static collections produced by one generation pass.
struct Generated {
    stars: Vec<Star>,
    galaxies: Vec<Galaxy>,
    nebulas: Vec<Nebula>,
    clusters: Vec<StarCluster>,
}

fn generate_scene(settings: &EngineSettings, viewport: &Viewport, rng: &mut SceneRng) -> Generated {
    let (w, h) = (viewport.width, viewport.height);
    let density = &settings.density;
    let scene = &settings.scene;
    let generated = Generated {
        stars: generate_stars(w, h, density, scene, rng),
        galaxies: generate_galaxies(w, h, density, scene, rng),
        nebulas: generate_nebulas(w, h, density, scene, rng),
        clusters: generate_star_clusters(w, h, density, scene, rng),
    };
    log::info!(
        "Generated scene for {w}x{h}: {} stars, {} galaxies, {} nebulas, {} clusters",
        generated.stars.len(),
        generated.galaxies.len(),
        generated.nebulas.len(),
        generated.clusters.len()
    );
    generated
}

/// Animated deep-space background.
pub struct SceneEngine {
    settings: EngineSettings,
    viewport: Viewport,
    stars: Vec<Star>,
    galaxies: Vec<Galaxy>,
    nebulas: Vec<Nebula>,
    clusters: Vec<StarCluster>,
    shooting_stars: ShootingStarPool,
    drift: DriftController,
    drift_offset: f64,
    quality: QualityController,
    time: f64,
    /// Last raw pointer reported by the host.
    raw_pointer: Option<Vec2>,
    /// Smoothed pointer used for parallax.
    pointer: Vec2,
    pending_activity: bool,
    rng: SceneRng,
    disposed: bool,
}

impl SceneEngine {
    pub fn new(settings: EngineSettings, viewport: Viewport) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => seeded_rng(seed.wrapping_add(1)),
            None => entropy_rng(),
        };
        let mut generation_rng = Self::generation_rng(&settings, &mut rng);
        let generated = generate_scene(&settings, &viewport, &mut generation_rng);
        let shooting_stars = ShootingStarPool::new(
            &settings.shooting_stars,
            settings.density.max_shooting_stars,
            &mut rng,
        );

        log::debug!(
            "Scene engine created (tier {:?}, seed {:?})",
            settings.tier,
            settings.seed
        );

        Self {
            drift: DriftController::new(&settings.drift),
            quality: QualityController::new(&settings.quality),
            viewport,
            stars: generated.stars,
            galaxies: generated.galaxies,
            nebulas: generated.nebulas,
            clusters: generated.clusters,
            shooting_stars,
            drift_offset: 0.0,
            time: 0.0,
            raw_pointer: None,
            pointer: Vec2::ZERO,
            pending_activity: false,
            rng,
            disposed: false,
            settings,
        }
    }

    /// Seeded engines always regenerate from the same seed; unseeded ones
    /// draw a fresh one.
    fn generation_rng(settings: &EngineSettings, runtime: &mut SceneRng) -> SceneRng {
        match settings.seed {
            Some(seed) => seeded_rng(seed),
            None => seeded_rng(runtime.random()),
        }
    }

    /// Regenerate static content for a new canvas size.
    ///
    /// Live shooting stars are dropped. Drift and quality carry over since
    /// they do not depend on coordinates.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        if self.disposed {
            return;
        }
        self.viewport = Viewport::new(width, height, device_pixel_ratio);
        let mut generation_rng = Self::generation_rng(&self.settings, &mut self.rng);
        let generated = generate_scene(&self.settings, &self.viewport, &mut generation_rng);
        self.stars = generated.stars;
        self.galaxies = generated.galaxies;
        self.nebulas = generated.nebulas;
        self.clusters = generated.clusters;
        self.shooting_stars.clear(&mut self.rng);
        self.quality.reset_window(self.time);
    }

    /// Report user activity that is not pointer movement (keys, scroll, touch).
    pub fn notify_activity(&mut self) {
        self.pending_activity = true;
    }

    /// Advance every accumulator by `dt` seconds.
    ///
    /// `pointer` is the host pointer normalized to `[-1, 1]²`, or `None` when
    /// it is outside the canvas.
    pub fn update(&mut self, dt: f32, pointer: Option<Vec2>) {
        if self.disposed {
            return;
        }
        let dt = sanitize_dt(dt);
        self.time += dt as f64;

        let pointer = pointer
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(Vec2::NEG_ONE, Vec2::ONE));
        let moved = match (pointer, self.raw_pointer) {
            (Some(now), Some(before)) => (now - before).length() > POINTER_ACTIVITY_EPSILON,
            (Some(_), None) => true,
            (None, _) => false,
        };
        self.raw_pointer = pointer;
        let active = moved || std::mem::take(&mut self.pending_activity);
        self.drift.update(dt, active);

        let target = pointer.unwrap_or(Vec2::ZERO);
        let follow = 1.0 - (-self.settings.drift.pointer_smoothing.max(0.0) * dt).exp();
        self.pointer += (target - self.pointer) * follow;

        self.drift_offset = advance_drift_offset(
            self.drift_offset,
            self.settings.drift.drift_rate_per_second,
            dt,
            self.drift.amount(),
        );

        self.quality.record_frame(self.time);

        let spawning = self.quality.gates().shooting_star_spawning;
        self.shooting_stars
            .update(dt, &self.viewport, spawning, &mut self.rng);
    }

    /// Inputs shared by every projection this frame.
    pub fn drift_state(&self) -> DriftState {
        DriftState {
            drift_amount: self.drift.amount(),
            drift_offset: self.drift_offset,
            pointer: self.pointer,
        }
    }

    /// Where `body` is drawn this frame.
    pub fn project(&self, body: &impl DriftBody) -> Projection {
        project(body, &self.settings.drift, &self.viewport, &self.drift_state())
    }

    /// Whether a projected entity of base radius `size` survives culling.
    pub fn is_visible(&self, projection: &Projection, size: f32) -> bool {
        self.viewport.contains(
            projection.position,
            self.settings.drift.cull_margin + size * projection.scale,
        )
    }

    /// Build this frame's primitives: background, nebulas, galaxies,
    /// clusters, stars, then shooting stars.
    pub fn frame(&self) -> Frame {
        if self.disposed {
            return Frame::default();
        }
        let gates = self.quality.gates();
        let mut primitives = Vec::with_capacity(self.stars.len() * 2 + 256);

        primitives.push(DrawPrimitive::Background {
            size: Vec2::new(self.viewport.width, self.viewport.height),
            top: BACKGROUND_TOP,
            bottom: BACKGROUND_BOTTOM,
        });
        if gates.nebulas {
            for nebula in &self.nebulas {
                self.draw_nebula(nebula, &mut primitives);
            }
        }
        if gates.galaxies {
            for galaxy in &self.galaxies {
                self.draw_galaxy(galaxy, &mut primitives);
            }
        }
        if gates.clusters {
            for cluster in &self.clusters {
                self.draw_cluster(cluster, &mut primitives);
            }
        }
        self.draw_stars(&gates, &mut primitives);
        for star in self.shooting_stars.stars() {
            self.draw_shooting_star(star, &mut primitives);
        }

        Frame {
            primitives,
            uniforms: self.uniforms(),
        }
    }

    pub fn uniforms(&self) -> FrameUniforms {
        FrameUniforms {
            viewport: [self.viewport.width, self.viewport.height],
            device_pixel_ratio: self.viewport.device_pixel_ratio,
            time: self.time as f32,
            drift_amount: self.drift.amount(),
            quality: self.quality.quality(),
            pointer: self.pointer.to_array(),
        }
    }

    fn draw_nebula(&self, nebula: &Nebula, out: &mut Vec<DrawPrimitive>) {
        let p = self.project(nebula);
        if !self.is_visible(&p, nebula.size) {
            return;
        }
        let alpha = nebula.brightness * p.fade;
        let place = |local: Vec2| p.position + nebula.local_to_view(local) * p.scale;

        for layer in &nebula.layers {
            for blob in &layer.blobs {
                out.push(DrawPrimitive::Glow {
                    center: place(blob.offset),
                    radius: blob.radius * p.scale,
                    color: layer.color,
                    alpha: blob.alpha * alpha,
                });
            }
        }
        for filament in &nebula.filaments {
            out.push(DrawPrimitive::Curve {
                start: place(filament.start),
                control: place(filament.control),
                end: place(filament.end),
                width: filament.width * p.scale,
                color: nebula.palette.accent,
                alpha: filament.alpha * alpha,
            });
        }
        for dust in &nebula.dust {
            out.push(DrawPrimitive::Dot {
                center: place(dust.offset),
                radius: dust.size * p.scale,
                color: nebula.palette.secondary,
                alpha: dust.alpha * alpha,
            });
        }
        for star in &nebula.embedded_stars {
            let center = place(star.offset);
            out.push(DrawPrimitive::Glow {
                center,
                radius: star.size * 3.0 * p.scale,
                color: star.color,
                alpha: star.brightness * 0.3 * p.fade,
            });
            out.push(DrawPrimitive::Dot {
                center,
                radius: star.size * p.scale,
                color: star.color,
                alpha: star.brightness * p.fade,
            });
        }
    }

    fn draw_galaxy(&self, galaxy: &Galaxy, out: &mut Vec<DrawPrimitive>) {
        let p = self.project(galaxy);
        if !self.is_visible(&p, galaxy.size) {
            return;
        }
        let alpha = galaxy.brightness * p.fade;
        let place = |local: Vec2| p.position + galaxy.local_to_view(local) * p.scale;

        out.push(DrawPrimitive::Glow {
            center: p.position,
            radius: galaxy.size * p.scale,
            color: galaxy.palette.outer,
            alpha: alpha * 0.08,
        });
        match &galaxy.structure {
            GalaxyStructure::Arms(arms) => {
                for (arm_index, arm) in arms.iter().enumerate() {
                    for point in arm {
                        out.push(DrawPrimitive::Dot {
                            center: place(galaxy.arm_point_local(arm_index, point)),
                            radius: point.dot_size * p.scale,
                            color: blend_colors(galaxy.palette.arm, galaxy.palette.outer, point.t),
                            alpha: alpha * (1.0 - 0.6 * point.t) * 0.8,
                        });
                    }
                }
            }
            GalaxyStructure::Scatter(points) => {
                for point in points {
                    let ratio = point.offset.length() / galaxy.size.max(f32::EPSILON);
                    out.push(DrawPrimitive::Dot {
                        center: place(point.offset),
                        radius: point.dot_size * p.scale,
                        color: blend_colors(galaxy.palette.core, galaxy.palette.outer, ratio),
                        alpha: alpha * point.brightness,
                    });
                }
            }
        }
        out.push(DrawPrimitive::Glow {
            center: p.position,
            radius: galaxy.core_size * 1.5 * p.scale,
            color: galaxy.palette.core,
            alpha: alpha * 0.6,
        });
    }

    fn draw_cluster(&self, cluster: &StarCluster, out: &mut Vec<DrawPrimitive>) {
        let p = self.project(cluster);
        if !self.is_visible(&p, cluster.size) {
            return;
        }
        let alpha = cluster.brightness * p.fade;
        out.push(DrawPrimitive::Glow {
            center: p.position,
            radius: cluster.size * 1.2 * p.scale,
            color: cluster.color,
            alpha: alpha * 0.05,
        });
        for star in &cluster.stars {
            out.push(DrawPrimitive::Dot {
                center: p.position + star.offset * p.scale,
                radius: star.size * p.scale,
                color: star.color,
                alpha: alpha * star.brightness,
            });
        }
    }

    fn draw_stars(&self, gates: &QualityGates, out: &mut Vec<DrawPrimitive>) {
        let time = self.time;
        let active = gates.active_stars(self.stars.len());
        for star in &self.stars[..active] {
            let p = self.project(star);
            if !self.is_visible(&p, star.size) {
                continue;
            }
            let alpha = (star.brightness * star.twinkle(time) * p.fade).clamp(0.0, 1.0);
            let radius = star.size * p.scale;
            if star.size > STAR_HALO_SIZE {
                out.push(DrawPrimitive::Glow {
                    center: p.position,
                    radius: radius * 3.0,
                    color: star.color,
                    alpha: alpha * 0.25,
                });
            }
            out.push(DrawPrimitive::Dot {
                center: p.position,
                radius,
                color: star.color,
                alpha,
            });
        }
    }

    fn draw_shooting_star(&self, star: &ShootingStar, out: &mut Vec<DrawPrimitive>) {
        let shift = self.pointer * self.settings.drift.parallax_strength * star.parallax_factor;
        let head = star.position + shift;
        let alpha = (star.brightness * star.life).clamp(0.0, 1.0);
        out.push(DrawPrimitive::Streak {
            head,
            tail: star.tail() + shift,
            width: star.size,
            color: star.color,
            alpha,
        });
        out.push(DrawPrimitive::Dot {
            center: head,
            radius: star.size,
            color: Color::WHITE,
            alpha,
        });
    }

    /// Release every collection. Afterwards `update` does nothing and `frame`
    /// is empty.
    pub fn dispose(&mut self) {
        self.stars = Vec::new();
        self.galaxies = Vec::new();
        self.nebulas = Vec::new();
        self.clusters = Vec::new();
        self.shooting_stars.clear(&mut self.rng);
        self.disposed = true;
        log::debug!("Scene engine disposed");
    }

    /// Pin the drift amount, e.g. to 0 for reduced motion.
    pub fn lock_drift(&mut self, amount: f32) {
        self.drift.lock(amount);
    }

    pub fn unlock_drift(&mut self) {
        self.drift.unlock();
    }

    pub fn drift_amount(&self) -> f32 {
        self.drift.amount()
    }

    pub fn drift_offset(&self) -> f64 {
        self.drift_offset
    }

    pub fn quality(&self) -> f32 {
        self.quality.quality()
    }

    /// Frame rate of the last completed quality window.
    pub fn measured_fps(&self) -> Option<f32> {
        self.quality.last_fps()
    }

    pub fn quality_gates(&self) -> QualityGates {
        self.quality.gates()
    }

    /// Seconds of engine time elapsed.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn galaxies(&self) -> &[Galaxy] {
        &self.galaxies
    }

    pub fn nebulas(&self) -> &[Nebula] {
        &self.nebulas
    }

    pub fn clusters(&self) -> &[StarCluster] {
        &self.clusters
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        self.shooting_stars.stars()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Non-finite or negative steps become 0; long steps are clamped.
pub fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt < 0.0 {
        return 0.0;
    }
    if dt > MAX_FRAME_TIME {
        log::debug!("Frame time {dt:.3}s clamped to {MAX_FRAME_TIME}s");
        return MAX_FRAME_TIME;
    }
    dt
}
