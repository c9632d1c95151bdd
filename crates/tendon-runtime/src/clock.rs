//! Frame clock

use std::time::Instant;

/// Longest frame the clock will report, in seconds
const MAX_FRAME_TIME: f64 = 0.25;

/// Tracks elapsed time and the delta for the current frame.
///
/// Interactive loops call `tick()` once per frame to measure wall-clock time.
/// Headless runs call `advance(dt)` instead so every frame is reproducible.
pub struct GameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Frames seen so far
    pub frame_count: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock from wall-clock time. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            self.frame_count += 1;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance the clock by a caller-supplied delta.
    ///
    /// Negative deltas are treated as zero; large ones are clamped to 250ms
    /// so a stalled frame does not fast-forward every animation.
    pub fn advance(&mut self, dt: f64) {
        self.first_tick = false;
        self.delta_time = dt.clamp(0.0, MAX_FRAME_TIME);
        self.total_time += self.delta_time;
        self.frame_count += 1;
    }
}
