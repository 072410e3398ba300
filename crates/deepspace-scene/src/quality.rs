//! Adaptive quality: measures frame rate over fixed windows and nudges a
//! single quality scalar down fast and up slowly.

use deepspace_config::QualityConfig;

/// Absolute lower bound of the quality domain.
pub const QUALITY_FLOOR: f32 = 0.1;

/// Which entity classes render at a given quality.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityGates {
    pub quality: f32,
    pub nebulas: bool,
    pub galaxies: bool,
    pub clusters: bool,
    /// New shooting stars may spawn. Live ones always finish.
    pub shooting_star_spawning: bool,
}

impl QualityGates {
    pub fn from_quality(quality: f32, config: &QualityConfig) -> Self {
        Self {
            quality,
            nebulas: quality >= config.nebula_threshold,
            galaxies: quality >= config.galaxy_threshold,
            clusters: quality >= config.cluster_threshold,
            shooting_star_spawning: quality >= config.shooting_star_threshold,
        }
    }

    /// `floor(total * quality)` stars are drawn.
    pub fn active_stars(&self, total: usize) -> usize {
        ((total as f32 * self.quality).floor() as usize).min(total)
    }
}

/// A quality adjustment made at the end of a measurement window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QualityStep {
    Decreased { from: f32, to: f32, fps: f32 },
    Increased { from: f32, to: f32, fps: f32 },
}

/// Frame-rate driven quality controller.
#[derive(Clone, Debug)]
pub struct QualityController {
    config: QualityConfig,
    quality: f32,
    frame_count: u32,
    window_start: f64,
    last_fps: Option<f32>,
}

impl QualityController {
    pub fn new(config: &QualityConfig) -> Self {
        let quality = if config.initial.is_finite() {
            config.initial.clamp(QUALITY_FLOOR, 1.0)
        } else {
            1.0
        };
        Self {
            config: config.clone(),
            quality,
            frame_count: 0,
            window_start: 0.0,
            last_fps: None,
        }
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Frame rate measured over the last completed window.
    pub fn last_fps(&self) -> Option<f32> {
        self.last_fps
    }

    pub fn gates(&self) -> QualityGates {
        QualityGates::from_quality(self.quality, &self.config)
    }

    /// Count one frame ending at `now` seconds.
    ///
    /// When a window has elapsed this evaluates it and makes at most one step,
    /// no matter how long the window actually was.
    pub fn record_frame(&mut self, now: f64) -> Option<QualityStep> {
        self.frame_count += 1;
        let elapsed = now - self.window_start;
        let window = self.config.window_secs.max(f32::EPSILON) as f64;
        if elapsed < window {
            return None;
        }

        let fps = (self.frame_count as f64 / elapsed) as f32;
        self.frame_count = 0;
        self.window_start = now;
        self.last_fps = Some(fps);

        let from = self.quality;
        let floor = self.config.min_quality.max(QUALITY_FLOOR);
        if fps < self.config.low_fps as f32 && from > floor {
            self.quality = (from - self.config.decrease_step).max(floor);
            log::info!("Quality lowered {from:.2} -> {:.2} at {fps:.1} fps", self.quality);
            Some(QualityStep::Decreased {
                from,
                to: self.quality,
                fps,
            })
        } else if fps > self.config.high_fps as f32 && from < 1.0 {
            self.quality = (from + self.config.increase_step).min(1.0);
            log::debug!("Quality raised {from:.2} -> {:.2} at {fps:.1} fps", self.quality);
            Some(QualityStep::Increased {
                from,
                to: self.quality,
                fps,
            })
        } else {
            None
        }
    }

    /// Restart the current window at `now` without touching quality.
    pub fn reset_window(&mut self, now: f64) {
        self.frame_count = 0;
        self.window_start = now;
    }
}
