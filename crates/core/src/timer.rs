//! High-resolution timer for frame timing.

use std::time::{Duration, Instant};

/// Timing snapshot for a single frame.
///
/// Produced once per tick by [`Timer::frame`] and threaded through the frame
/// loop, so no component needs to keep its own clock state.
#[derive(Debug, Clone, Copy)]
pub struct FrameTick {
    /// Seconds since the previous tick.
    pub delta_seconds: f32,
    /// Seconds since the timer was created.
    pub elapsed_seconds: f32,
}

/// High-resolution timer for measuring elapsed time.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
}

impl Timer {
    /// Create a new timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Get the total elapsed time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the elapsed time in seconds since the timer was created.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Get the time elapsed since the last call to `tick()`.
    /// This is useful for calculating delta time in a game loop.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta
    }

    /// Advance the timer and return the timing snapshot for this frame.
    pub fn frame(&mut self) -> FrameTick {
        let delta = self.tick();
        FrameTick {
            delta_seconds: delta.as_secs_f32(),
            elapsed_seconds: self.elapsed_secs(),
        }
    }

    /// Reset the timer to the current time.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last_tick = now;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_tick_is_monotonic() {
        let mut timer = Timer::new();
        let first = timer.frame();
        let second = timer.frame();

        assert!(first.delta_seconds >= 0.0);
        assert!(second.elapsed_seconds >= first.elapsed_seconds);
    }

    #[test]
    fn test_reset_restarts_elapsed() {
        let mut timer = Timer::new();
        std::thread::sleep(Duration::from_millis(5));
        let before = timer.elapsed_secs();
        timer.reset();
        let after = timer.elapsed_secs();

        assert!(before > after);
    }
}
