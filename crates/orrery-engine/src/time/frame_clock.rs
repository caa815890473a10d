use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame (or since the clock was reset), in seconds.
    pub dt: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Frames produced since the clock was last reset.
    pub frame_index: u64,
}

/// Monotonic clock producing per-frame delta times.
///
/// One clock belongs to one render control, so several surfaces never share
/// delta-time state. The clock is reset whenever frame production (re)starts,
/// making the first delta of a run the time since the start rather than the
/// time since the last frame of a previous run.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_max: Option<Duration>,
}

impl FrameClock {
    /// Creates an unclamped clock.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_max: None,
        }
    }

    /// Creates a clock whose deltas never exceed `dt_max`.
    ///
    /// Useful when a debugger pause or a long stall would otherwise feed a huge
    /// delta into animations.
    pub fn with_max_delta(dt_max: Duration) -> Self {
        Self {
            dt_max: Some(dt_max),
            ..Self::new()
        }
    }

    /// Resets the baseline to `now` and restarts frame numbering.
    pub fn reset_at(&mut self, now: Instant) {
        self.last = now;
        self.frame_index = 0;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, now: Instant) -> FrameTime {
        let mut dt = now.saturating_duration_since(self.last);
        if let Some(max) = self.dt_max {
            dt = dt.min(max);
        }

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f64(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_measures_since_reset() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.reset_at(start);

        let ft = clock.tick_at(start + Duration::from_millis(20));
        assert!((ft.dt - 0.020).abs() < 1e-9);
        assert_eq!(ft.frame_index, 0);

        let ft = clock.tick_at(start + Duration::from_millis(50));
        assert!((ft.dt - 0.030).abs() < 1e-9);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn reset_restarts_numbering() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.reset_at(start);
        clock.tick_at(start + Duration::from_millis(1));
        clock.tick_at(start + Duration::from_millis(2));

        let later = start + Duration::from_secs(5);
        clock.reset_at(later);
        let ft = clock.tick_at(later + Duration::from_millis(10));
        assert_eq!(ft.frame_index, 0);
        assert!((ft.dt - 0.010).abs() < 1e-9);
    }

    #[test]
    fn max_delta_clamps_stalls() {
        let start = Instant::now();
        let mut clock = FrameClock::with_max_delta(Duration::from_millis(100));
        clock.reset_at(start);
        let ft = clock.tick_at(start + Duration::from_secs(3));
        assert!((ft.dt - 0.100).abs() < 1e-9);
    }
}
