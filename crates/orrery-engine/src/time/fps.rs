use std::time::Instant;

/// Coarse windowed frames-per-second estimator.
///
/// Every `window` frames, the average frame time over that window is turned
/// into an FPS value and the window restarts. There is no smoothing across
/// windows; the value is meant for diagnostics.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    frame_count: u32,
    window_start: Instant,
    last_fps: Option<f64>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            window_start: Instant::now(),
            last_fps: None,
        }
    }

    /// Restarts the counting window at `now`. The last measurement is kept.
    pub fn reset_at(&mut self, now: Instant) {
        self.frame_count = 0;
        self.window_start = now;
    }

    /// Counts one frame ending at `now`.
    ///
    /// Returns the new measurement when this frame closes a window of `window`
    /// frames. A zero `window` is treated as one.
    pub fn record_frame(&mut self, now: Instant, window: u32) -> Option<f64> {
        self.frame_count += 1;
        if self.frame_count < window.max(1) {
            return None;
        }

        let elapsed_s = now.saturating_duration_since(self.window_start).as_secs_f64();
        let ms_per_frame = 1000.0 * elapsed_s / f64::from(self.frame_count);
        let fps = if ms_per_frame > 0.0 { 1000.0 / ms_per_frame } else { f64::INFINITY };

        self.frame_count = 0;
        self.window_start = now;
        self.last_fps = Some(fps);

        log::trace!("fps window closed: {fps:.1} fps ({ms_per_frame:.2} ms/frame)");
        Some(fps)
    }

    pub fn last_fps(&self) -> Option<f64> {
        self.last_fps
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn reports_once_per_window() {
        let start = Instant::now();
        let mut meter = FpsMeter::new();
        meter.reset_at(start);

        for i in 1..10u64 {
            assert_eq!(meter.record_frame(start + Duration::from_millis(20 * i), 10), None);
        }
        let fps = meter.record_frame(start + Duration::from_millis(200), 10).unwrap();
        assert!((fps - 50.0).abs() < 1e-6);
        assert_eq!(meter.last_fps(), Some(fps));
    }

    #[test]
    fn window_restarts_after_report() {
        let start = Instant::now();
        let mut meter = FpsMeter::new();
        meter.reset_at(start);

        meter.record_frame(start + Duration::from_millis(100), 1);
        let fps = meter.record_frame(start + Duration::from_millis(110), 1).unwrap();
        assert!((fps - 100.0).abs() < 1e-6);
    }

    #[test]
    fn zero_window_counts_every_frame() {
        let start = Instant::now();
        let mut meter = FpsMeter::new();
        meter.reset_at(start);
        assert!(meter.record_frame(start + Duration::from_millis(10), 0).is_some());
    }
}
