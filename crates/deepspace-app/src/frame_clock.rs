//! Frame timing for the headless host.
//!
//! In fixed mode every frame advances by the same step, so a seeded run is
//! reproducible. In realtime mode the clock measures wall time between frames
//! and sleeps to hold the target rate.

use std::time::{Duration, Instant};

use deepspace_scene::MAX_FRAME_TIME;
use tracing::warn;

/// Target rate for both modes.
pub const TARGET_FPS: f64 = 60.0;

/// Fixed step: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / TARGET_FPS;

/// How frame time is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockMode {
    /// Each tick advances by this many seconds.
    Fixed(f64),
    /// Each tick advances by measured wall time.
    Realtime,
}

/// Produces one clamped frame time per tick.
pub struct FrameClock {
    mode: ClockMode,
    previous: Instant,
    total_time: f64,
    frame_count: u64,
}

impl FrameClock {
    pub fn fixed() -> Self {
        Self::with_mode(ClockMode::Fixed(FIXED_DT))
    }

    pub fn realtime() -> Self {
        Self::with_mode(ClockMode::Realtime)
    }

    pub fn with_mode(mode: ClockMode) -> Self {
        Self {
            mode,
            previous: Instant::now(),
            total_time: 0.0,
            frame_count: 0,
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Frame time for the next frame, in seconds.
    pub fn tick(&mut self) -> f64 {
        let frame_time = match self.mode {
            ClockMode::Fixed(step) => step,
            ClockMode::Realtime => {
                let now = Instant::now();
                let elapsed = now.duration_since(self.previous).as_secs_f64();
                self.previous = now;
                elapsed
            }
        };
        self.advance(frame_time)
    }

    /// Account for `frame_time` seconds, clamped to `[0, MAX_FRAME_TIME]`.
    /// Non-finite and negative values count as zero.
    pub fn advance(&mut self, frame_time: f64) -> f64 {
        let max = f64::from(MAX_FRAME_TIME);
        let clamped = if !frame_time.is_finite() || frame_time < 0.0 {
            0.0
        } else if frame_time > max {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                max * 1000.0
            );
            max
        } else {
            frame_time
        };
        self.total_time += clamped;
        self.frame_count += 1;
        clamped
    }

    /// Sleep out the rest of the current frame in realtime mode.
    pub fn pace(&self) {
        if self.mode != ClockMode::Realtime {
            return;
        }
        let budget = Duration::from_secs_f64(FIXED_DT);
        let spent = self.previous.elapsed();
        if let Some(remaining) = budget.checked_sub(spent) {
            std::thread::sleep(remaining);
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of all clamped frame times.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_steps_evenly() {
        let mut clock = FrameClock::fixed();
        for _ in 0..60 {
            assert_eq!(clock.tick(), FIXED_DT);
        }
        assert_eq!(clock.frame_count(), 60);
        assert!(
            (clock.total_time() - 1.0).abs() < 1e-9,
            "60 fixed steps should sum to one second, got {}",
            clock.total_time()
        );
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = FrameClock::fixed();
        let dt = clock.advance(2.0);
        assert_eq!(dt, f64::from(MAX_FRAME_TIME));
    }

    #[test]
    fn test_invalid_frame_time_counts_as_zero() {
        let mut clock = FrameClock::fixed();
        assert_eq!(clock.advance(f64::NAN), 0.0);
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f64::INFINITY), 0.0);
        assert_eq!(clock.frame_count(), 3, "invalid frames still count");
        assert_eq!(clock.total_time(), 0.0);
    }

    #[test]
    fn test_realtime_tick_is_bounded() {
        let mut clock = FrameClock::realtime();
        let dt = clock.tick();
        assert!((0.0..=f64::from(MAX_FRAME_TIME)).contains(&dt));
        assert_eq!(clock.mode(), ClockMode::Realtime);
    }

    #[test]
    fn test_pace_is_noop_in_fixed_mode() {
        let clock = FrameClock::fixed();
        let start = Instant::now();
        clock.pace();
        assert!(start.elapsed() < Duration::from_millis(10));
    }
}
