use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::config::USE_CONTINUOUS_RENDERING;
use crate::surface::RenderSurface;

/// Longest wait between timer requests; slower rates are clamped to it.
pub(crate) const MAX_FRAME_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// How frame requests reach the surface at a given frame rate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum FrameMode {
    /// The platform requests one frame per display refresh.
    DisplaySync,
    /// The platform draws back-to-back; nobody requests.
    Continuous,
    /// A timer thread requests a frame every period.
    Fixed(Duration),
}

impl FrameMode {
    pub(crate) fn for_rate(rate: f64) -> Self {
        if rate.is_nan() {
            FrameMode::DisplaySync
        } else if rate == USE_CONTINUOUS_RENDERING {
            FrameMode::Continuous
        } else {
            let period = Duration::try_from_secs_f64(1.0 / rate).unwrap_or(MAX_FRAME_PERIOD);
            FrameMode::Fixed(period.min(MAX_FRAME_PERIOD))
        }
    }
}

/// Frame-production state of one render control.
///
/// Frames are active between a successful [`start`](Self::start) and the next
/// [`stop`](Self::stop). All mutation happens under the owner's lock, so a
/// rate change is one stop-then-start with no window for a concurrent start.
pub(crate) struct FrameScheduler {
    frame_rate: f64,
    started_at: Option<Instant>,
    timer: Option<FrameTimer>,
}

impl FrameScheduler {
    /// The caller validates `frame_rate`.
    pub(crate) fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            started_at: None,
            timer: None,
        }
    }

    pub(crate) fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub(crate) fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub(crate) fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Returns the start instant, or `None` if frames were already active.
    pub(crate) fn start(&mut self, surface: &Arc<dyn RenderSurface>) -> Option<Instant> {
        if self.is_active() {
            return None;
        }
        let now = Instant::now();
        self.started_at = Some(now);

        match FrameMode::for_rate(self.frame_rate) {
            FrameMode::DisplaySync => surface.set_display_sync_frames(true),
            FrameMode::Continuous => {}
            FrameMode::Fixed(period) => {
                self.timer = FrameTimer::spawn(period, surface.clone());
            }
        }
        log::debug!("frames started at rate {}", describe_rate(self.frame_rate));
        Some(now)
    }

    /// Returns `false` if frames were not active.
    pub(crate) fn stop(&mut self, surface: &Arc<dyn RenderSurface>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.started_at = None;

        match FrameMode::for_rate(self.frame_rate) {
            FrameMode::DisplaySync => surface.set_display_sync_frames(false),
            FrameMode::Continuous => {}
            FrameMode::Fixed(_) => self.timer = None,
        }
        log::debug!("frames stopped");
        true
    }

    /// Switches to `rate`, restarting active frames under the new mode.
    ///
    /// Returns the restart instant when frames were restarted. The old timer
    /// thread has exited before the new one starts.
    pub(crate) fn set_frame_rate(&mut self, rate: f64, surface: &Arc<dyn RenderSurface>) -> Option<Instant> {
        let was_active = self.stop(surface);
        self.frame_rate = rate;
        surface.set_render_frames_on_request(rate != USE_CONTINUOUS_RENDERING);
        log::debug!("frame rate set to {}", describe_rate(rate));
        if was_active { self.start(surface) } else { None }
    }
}

fn describe_rate(rate: f64) -> String {
    match FrameMode::for_rate(rate) {
        FrameMode::DisplaySync => "display refresh".to_owned(),
        FrameMode::Continuous => "continuous".to_owned(),
        FrameMode::Fixed(_) => format!("{rate} fps"),
    }
}

/// Thread requesting a frame at a fixed rate until dropped.
///
/// The first request is issued immediately; later ones keep a fixed schedule
/// rather than drifting with request latency.
struct FrameTimer {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FrameTimer {
    fn spawn(period: Duration, surface: Arc<dyn RenderSurface>) -> Option<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let spawned = thread::Builder::new()
            .name("orrery-frame-timer".into())
            .spawn(move || {
                let mut next = Instant::now();
                loop {
                    surface.request_frame_render();
                    next += period;
                    match stop_rx.recv_timeout(next.saturating_duration_since(Instant::now())) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(handle) => Some(Self { stop: Some(stop_tx), handle: Some(handle) }),
            Err(e) => {
                log::error!("failed to spawn frame timer: {e}");
                None
            }
        }
    }
}

impl Drop for FrameTimer {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("frame timer thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualSurface;

    fn surface() -> (Arc<ManualSurface>, Arc<dyn RenderSurface>) {
        let manual = ManualSurface::new();
        let dynamic: Arc<dyn RenderSurface> = manual.clone();
        (manual, dynamic)
    }

    // ── modes ─────────────────────────────────────────────────────────────

    #[test]
    fn mode_for_rate() {
        assert_eq!(FrameMode::for_rate(f64::NAN), FrameMode::DisplaySync);
        assert_eq!(FrameMode::for_rate(0.0), FrameMode::Continuous);
        assert_eq!(FrameMode::for_rate(50.0), FrameMode::Fixed(Duration::from_millis(20)));
    }

    #[test]
    fn tiny_rates_clamp_to_max_period() {
        assert_eq!(FrameMode::for_rate(1e-300), FrameMode::Fixed(MAX_FRAME_PERIOD));
        assert_eq!(FrameMode::for_rate(5e-324), FrameMode::Fixed(MAX_FRAME_PERIOD));
        assert_eq!(FrameMode::for_rate(1e-6), FrameMode::Fixed(MAX_FRAME_PERIOD));
        assert_eq!(FrameMode::for_rate(0.5), FrameMode::Fixed(Duration::from_secs(2)));
    }

    #[test]
    fn tiny_rate_restart_requests_first_frame() {
        let (manual, surface) = surface();
        let mut sched = FrameScheduler::new(1000.0);
        sched.start(&surface);
        assert!(sched.set_frame_rate(1e-300, &surface).is_some());
        assert!(sched.is_active());

        let deadline = Instant::now() + Duration::from_secs(5);
        let before = manual.frame_requests();
        while manual.frame_requests() == before && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(manual.frame_requests() > before);
        assert!(sched.stop(&surface));
    }

    // ── start / stop ──────────────────────────────────────────────────────

    #[test]
    fn display_sync_toggles_platform_vsync() {
        let (manual, surface) = surface();
        let mut sched = FrameScheduler::new(f64::NAN);
        assert!(sched.start(&surface).is_some());
        assert!(manual.display_sync());
        assert!(sched.start(&surface).is_none());

        assert!(sched.stop(&surface));
        assert!(!manual.display_sync());
        assert!(!sched.stop(&surface));
        assert!(sched.started_at().is_none());
    }

    #[test]
    fn fixed_rate_timer_requests_frames() {
        let (manual, surface) = surface();
        let mut sched = FrameScheduler::new(200.0);
        sched.start(&surface);

        let deadline = Instant::now() + Duration::from_secs(5);
        while manual.frame_requests() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(manual.frame_requests() >= 3);

        sched.stop(&surface);
        let after_stop = manual.frame_requests();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(manual.frame_requests(), after_stop);
    }

    #[test]
    fn continuous_issues_no_requests() {
        let (manual, surface) = surface();
        let mut sched = FrameScheduler::new(0.0);
        sched.start(&surface);
        assert!(sched.is_active());
        assert_eq!(manual.frame_requests(), 0);
        assert!(!manual.display_sync());
    }

    // ── rate changes ──────────────────────────────────────────────────────

    #[test]
    fn rate_change_restarts_active_frames() {
        let (manual, surface) = surface();
        let mut sched = FrameScheduler::new(1000.0);
        sched.start(&surface);

        assert!(sched.set_frame_rate(f64::NAN, &surface).is_some());
        assert!(sched.is_active());
        assert!(manual.display_sync());
        assert_eq!(manual.on_request(), Some(true));

        // the timer was joined: no more requests trickle in
        let settled = manual.frame_requests();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(manual.frame_requests(), settled);

        sched.set_frame_rate(0.0, &surface);
        assert!(!manual.display_sync());
        assert_eq!(manual.on_request(), Some(false));
    }

    #[test]
    fn rate_change_while_stopped_stays_stopped() {
        let (manual, surface) = surface();
        let mut sched = FrameScheduler::new(30.0);
        assert!(sched.set_frame_rate(60.0, &surface).is_none());
        assert!(!sched.is_active());
        assert_eq!(sched.frame_rate(), 60.0);
        assert_eq!(manual.frame_requests(), 0);
    }
}
