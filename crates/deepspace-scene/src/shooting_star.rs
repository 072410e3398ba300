//! Shooting stars: short-lived streaks spawned from the viewport edges on a
//! randomized timer.

use std::f32::consts::PI;

use deepspace_config::ShootingStarConfig;
use glam::Vec2;
use rand::Rng;

use crate::color::{Color, STAR_COLOR_VARIANCE, vary_color};
use crate::entity::{SizeBucket, sample_size};
use crate::motion::Viewport;
use crate::random::uniform;

/// Motion is authored in 60 Hz steps; `dt` is converted to step counts.
pub const TICKS_PER_SECOND: f32 = 60.0;

/// Slow 60%, medium 30%, fast 10%, in pixels per tick.
pub const SPEED_BUCKETS: [SizeBucket; 3] = [(0.6, 4.0, 7.0), (0.3, 7.0, 11.0), (0.1, 11.0, 16.0)];

/// Head radius distribution.
pub const SIZE_BUCKETS: [SizeBucket; 3] = [(0.6, 0.8, 1.2), (0.3, 1.2, 1.8), (0.1, 1.8, 2.6)];

const STREAK_TINT: Color = Color::new(230, 240, 255);

/// Viewport edge a shooting star enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    /// Heading range in radians that points into the viewport (y grows downward).
    pub fn inward_angles(self) -> (f32, f32) {
        match self {
            Edge::Top => (PI / 6.0, 5.0 * PI / 6.0),
            Edge::Right => (2.0 * PI / 3.0, 4.0 * PI / 3.0),
            Edge::Bottom => (7.0 * PI / 6.0, 11.0 * PI / 6.0),
            Edge::Left => (-PI / 3.0, PI / 3.0),
        }
    }

    /// Spawn point `margin` pixels outside this edge.
    fn spawn_point(self, rng: &mut impl Rng, viewport: &Viewport, margin: f32) -> Vec2 {
        match self {
            Edge::Top => Vec2::new(uniform(rng, 0.0, viewport.width), -margin),
            Edge::Right => Vec2::new(viewport.width + margin, uniform(rng, 0.0, viewport.height)),
            Edge::Bottom => Vec2::new(uniform(rng, 0.0, viewport.width), viewport.height + margin),
            Edge::Left => Vec2::new(-margin, uniform(rng, 0.0, viewport.height)),
        }
    }
}

/// A live shooting star.
#[derive(Clone, Debug, PartialEq)]
pub struct ShootingStar {
    /// Head position in pixels.
    pub position: Vec2,
    /// Heading in radians.
    pub angle: f32,
    /// Pixels per 60 Hz tick.
    pub speed: f32,
    /// Tail length in pixels.
    pub length: f32,
    pub brightness: f32,
    /// Remaining life in `[0, 1]`.
    pub life: f32,
    /// Life lost per tick.
    pub decay: f32,
    pub size: f32,
    pub color: Color,
    pub parallax_factor: f32,
}

impl ShootingStar {
    fn spawn(rng: &mut impl Rng, viewport: &Viewport, margin: f32) -> Self {
        let edge = Edge::ALL[rng.random_range(0..Edge::ALL.len())];
        let position = edge.spawn_point(rng, viewport, margin);
        let (lo, hi) = edge.inward_angles();
        let angle = uniform(rng, lo, hi);

        let speed = sample_size(rng, &SPEED_BUCKETS);
        let size = sample_size(rng, &SIZE_BUCKETS);

        Self {
            position,
            angle,
            speed,
            length: speed * (8.0 + size * 6.0),
            brightness: uniform(rng, 0.6, 1.0),
            life: 1.0,
            decay: uniform(rng, 0.008, 0.016),
            size,
            color: vary_color(STREAK_TINT, STAR_COLOR_VARIANCE, rng),
            parallax_factor: uniform(rng, 0.5, 1.0),
        }
    }

    /// Unit heading vector.
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// End of the streak opposite the head.
    pub fn tail(&self) -> Vec2 {
        self.position - self.direction() * self.length
    }

    /// Advance by a (possibly fractional) number of 60 Hz ticks.
    pub fn tick(&mut self, ticks: f32) {
        self.position += self.direction() * self.speed * ticks;
        self.life = (self.life - self.decay * ticks).max(0.0);
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Bounded pool of live shooting stars with a randomized spawn timer.
#[derive(Clone, Debug)]
pub struct ShootingStarPool {
    config: ShootingStarConfig,
    capacity: usize,
    stars: Vec<ShootingStar>,
    /// Seconds; `f64` so small steps still register after long uptimes.
    time: f64,
    next_spawn: f64,
}

impl ShootingStarPool {
    pub fn new(config: &ShootingStarConfig, capacity: usize, rng: &mut impl Rng) -> Self {
        let mut pool = Self {
            config: config.clone(),
            capacity,
            stars: Vec::with_capacity(capacity),
            time: 0.0,
            next_spawn: 0.0,
        };
        pool.schedule(rng);
        pool
    }

    fn schedule(&mut self, rng: &mut impl Rng) {
        let delay = uniform(
            rng,
            self.config.min_spawn_delay_secs,
            self.config.max_spawn_delay_secs,
        );
        self.next_spawn = self.time + f64::from(delay.max(0.0));
    }

    /// Advance the timer and every live star by `dt` seconds.
    ///
    /// A due spawn is attempted only when `spawning` is allowed and the pool
    /// is below capacity; either way the timer is re-rolled.
    pub fn update(&mut self, dt: f32, viewport: &Viewport, spawning: bool, rng: &mut impl Rng) {
        self.time += f64::from(dt);
        if self.time >= self.next_spawn {
            if spawning && self.stars.len() < self.capacity {
                let star = ShootingStar::spawn(rng, viewport, self.config.spawn_margin);
                log::trace!("Shooting star spawned at {:?}", star.position);
                self.stars.push(star);
            }
            self.schedule(rng);
        }

        let ticks = dt * TICKS_PER_SECOND;
        let margin = self.config.spawn_margin;
        self.stars.retain_mut(|star| {
            star.tick(ticks);
            star.is_alive() && viewport.contains(star.position, margin + star.length)
        });
    }

    pub fn stars(&self) -> &[ShootingStar] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every live star and restart the timer.
    pub fn clear(&mut self, rng: &mut impl Rng) {
        self.stars.clear();
        self.schedule(rng);
    }

    /// Seconds until the next spawn attempt.
    pub fn time_until_spawn(&self) -> f32 {
        (self.next_spawn - self.time).max(0.0) as f32
    }
}
