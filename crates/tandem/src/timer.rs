//! Frame timer for the simulation loop.

use std::time::{Duration, Instant};

use tandem_shared::MAX_DELTA_TIME;

/// Measures time between ticks.
#[derive(Debug, Clone)]
pub struct GameTimer {
    start: Instant,
    last_tick: Instant,
    delta: Duration,
}

impl Default for GameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTimer {
    /// Creates a timer starting now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            delta: Duration::ZERO,
        }
    }

    /// Restarts the clock. The next tick measures from here.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Marks the start of a new tick.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
    }

    /// Seconds since the previous tick, clamped to [`MAX_DELTA_TIME`].
    #[must_use]
    pub fn delta_time(&self) -> f32 {
        self.delta.as_secs_f32().min(MAX_DELTA_TIME)
    }

    /// Seconds since the last reset, up to the latest tick.
    #[must_use]
    pub fn total_time(&self) -> f32 {
        self.last_tick.saturating_duration_since(self.start).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_measured_between_ticks() {
        let mut timer = GameTimer::new();
        let base = timer.last_tick;

        timer.tick_at(base + Duration::from_millis(16));
        assert!((timer.delta_time() - 0.016).abs() < 1e-6);

        timer.tick_at(base + Duration::from_millis(40));
        assert!((timer.delta_time() - 0.024).abs() < 1e-6);
        assert!((timer.total_time() - 0.040).abs() < 1e-6);
    }

    #[test]
    fn test_delta_clamped() {
        let mut timer = GameTimer::new();
        let base = timer.last_tick;
        timer.tick_at(base + Duration::from_secs(5));
        assert_eq!(timer.delta_time(), MAX_DELTA_TIME);
        assert!((timer.total_time() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut timer = GameTimer::new();
        let base = timer.last_tick;
        timer.tick_at(base + Duration::from_secs(1));
        timer.reset();
        assert_eq!(timer.delta_time(), 0.0);
        assert_eq!(timer.total_time(), 0.0);
    }
}
