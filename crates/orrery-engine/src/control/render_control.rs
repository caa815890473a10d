use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::config::{is_valid_frame_rate, CONTINUOUS_FPS_WINDOW};
use super::scheduler::{FrameMode, FrameScheduler};
use super::{FrameCtx, RenderControlClient, RenderControlConfig};
use crate::context::{ContextHandle, RenderContext, RenderContextType};
use crate::delegate::same_instance;
use crate::error::{ControlError, Result};
use crate::scene::{Scene, SceneView};
use crate::surface::{Color, RenderSurface, SurfaceRenderer, SurfaceSize};
use crate::task::{run_guarded, run_guarded_unit, Job, RenderTask};
use crate::time::{FpsMeter, FrameClock, FrameTime};

type FpsListener = Arc<dyn Fn(f64) + Send + Sync>;

/// Render-thread-only frame bookkeeping.
struct FrameState {
    clock: FrameClock,
    fps: FpsMeter,
    /// Set until the first size report after construction or context acquisition.
    awaiting_first_size: bool,
}

struct Shared {
    surface: Arc<dyn RenderSurface>,
    client: Arc<dyn RenderControlClient>,
    context: ContextHandle,

    render_thread: Mutex<Option<ThreadId>>,
    surface_size: Mutex<SurfaceSize>,
    scheduler: Mutex<FrameScheduler>,
    frame_state: Mutex<FrameState>,

    scenes: Mutex<Vec<Arc<dyn Scene>>>,
    scene_views: Mutex<Vec<Arc<dyn SceneView>>>,

    surface_prep_enabled: AtomicBool,
    background_color: Mutex<Color>,
    fps_listener: Mutex<Option<FpsListener>>,
}

/// Owner of one render surface's frame lifecycle.
///
/// Bridges a platform [`RenderSurface`] and its render thread with the
/// application: publishes the render context, schedules frames at the
/// configured rate, serializes scene and scene-view registration with frame
/// drawing, and fans each frame out to the registered delegates.
///
/// `RenderControl` is a cheap handle; clones share state. Register a clone
/// with the platform as its [`SurfaceRenderer`].
///
/// Frame order:
/// 1. frame start of every scene, then of every enabled scene view
/// 2. background paint (when enabled and the surface is opaque)
/// 3. `render_frame` of every enabled scene view, back-most first
/// 4. frame end of every scene, then of every enabled scene view
/// 5. FPS bookkeeping
#[derive(Clone)]
pub struct RenderControl {
    inner: Arc<Shared>,
}

impl RenderControl {
    pub fn new(
        surface: Arc<dyn RenderSurface>,
        client: Arc<dyn RenderControlClient>,
        config: RenderControlConfig,
    ) -> Result<Self> {
        if !is_valid_frame_rate(config.frame_rate) {
            return Err(ControlError::InvalidFrameRate(config.frame_rate));
        }

        let clock = match config.max_frame_delta {
            Some(max) => FrameClock::with_max_delta(max),
            None => FrameClock::new(),
        };

        log::info!("render control created");
        surface.set_render_frames_on_request(FrameMode::for_rate(config.frame_rate) != FrameMode::Continuous);

        Ok(Self {
            inner: Arc::new(Shared {
                surface,
                client,
                context: ContextHandle::new(),
                render_thread: Mutex::new(None),
                surface_size: Mutex::new(SurfaceSize::default()),
                scheduler: Mutex::new(FrameScheduler::new(config.frame_rate)),
                frame_state: Mutex::new(FrameState {
                    clock,
                    fps: FpsMeter::new(),
                    awaiting_first_size: true,
                }),
                scenes: Mutex::new(Vec::new()),
                scene_views: Mutex::new(Vec::new()),
                surface_prep_enabled: AtomicBool::new(config.surface_prep_enabled),
                background_color: Mutex::new(config.background_color),
                fps_listener: Mutex::new(None),
            }),
        })
    }

    // ── queries ───────────────────────────────────────────────────────────

    /// `true` when called on the thread that acquired the current render context.
    pub fn is_render_thread(&self) -> bool {
        *self.inner.render_thread.lock() == Some(thread::current().id())
    }

    /// Cloneable view of the published render context.
    pub fn context_handle(&self) -> ContextHandle {
        self.inner.context.clone()
    }

    pub fn current_render_context(&self) -> Result<RenderContext> {
        self.inner.context.current()
    }

    /// Last reported surface size; zero before the first report.
    pub fn surface_size(&self) -> SurfaceSize {
        *self.inner.surface_size.lock()
    }

    pub fn display_refresh_rate(&self) -> f64 {
        self.inner.surface.display_refresh_rate()
    }

    pub fn frame_rate(&self) -> f64 {
        self.inner.scheduler.lock().frame_rate()
    }

    pub fn are_frames_active(&self) -> bool {
        self.inner.scheduler.lock().is_active()
    }

    /// When the current run of frames started, if frames are active.
    pub fn frames_start_time(&self) -> Option<Instant> {
        self.inner.scheduler.lock().started_at()
    }

    /// Time since frames started; zero when inactive.
    pub fn frames_elapsed_time(&self) -> Duration {
        self.frames_start_time().map_or(Duration::ZERO, |t| t.elapsed())
    }

    pub fn last_measured_fps(&self) -> Option<f64> {
        self.inner.frame_state.lock().fps.last_fps()
    }

    pub fn scene_count(&self) -> usize {
        self.inner.scenes.lock().len()
    }

    pub fn scene_view_count(&self) -> usize {
        self.inner.scene_views.lock().len()
    }

    // ── settings ──────────────────────────────────────────────────────────

    /// Sets the target frame rate, restarting active frames under it.
    ///
    /// Accepts [`USE_DISPLAY_REFRESH_RATE`](super::USE_DISPLAY_REFRESH_RATE),
    /// [`USE_CONTINUOUS_RENDERING`](super::USE_CONTINUOUS_RENDERING) or a
    /// positive finite rate. May be called from any thread.
    pub fn set_frame_rate(&self, rate: f64) -> Result<()> {
        if !is_valid_frame_rate(rate) {
            return Err(ControlError::InvalidFrameRate(rate));
        }
        let restarted = self.inner.scheduler.lock().set_frame_rate(rate, &self.inner.surface);
        if let Some(at) = restarted {
            self.reset_frame_state(at);
        }
        Ok(())
    }

    pub fn set_surface_prep_enabled(&self, enabled: bool) {
        self.inner.surface_prep_enabled.store(enabled, Ordering::Release);
    }

    pub fn is_surface_prep_enabled(&self) -> bool {
        self.inner.surface_prep_enabled.load(Ordering::Acquire)
    }

    pub fn set_background_color(&self, color: Color) {
        *self.inner.background_color.lock() = color;
    }

    pub fn background_color(&self) -> Color {
        *self.inner.background_color.lock()
    }

    /// Called on the render thread with each new FPS measurement.
    pub fn set_fps_listener<F>(&self, listener: F)
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        *self.inner.fps_listener.lock() = Some(Arc::new(listener));
    }

    pub fn clear_fps_listener(&self) {
        *self.inner.fps_listener.lock() = None;
    }

    // ── thread marshaling ─────────────────────────────────────────────────

    pub fn queue_to_render_thread(&self, job: Job) {
        self.inner.surface.queue_to_render_thread(job);
    }

    pub fn queue_to_main_thread(&self, job: Job) {
        self.inner.surface.queue_to_main_thread(job);
    }

    /// Queues `task` behind everything already queued to the render thread.
    pub fn queue_render_task(&self, task: RenderTask) {
        let surface = self.inner.surface.clone();
        self.inner.surface.queue_to_render_thread(Box::new(move || {
            task.execute(&|job| surface.queue_to_main_thread(job));
        }));
    }

    // ── scene registry ────────────────────────────────────────────────────

    /// Registers `scene` on the render thread. Adding a member again is a no-op.
    pub fn add_scene(&self, scene: Arc<dyn Scene>) {
        let this = self.clone();
        self.queue_render_task(RenderTask::new(move || this.attach_scene(scene)));
    }

    /// Unregisters `scene` on the render thread. Unknown scenes are ignored.
    pub fn remove_scene(&self, scene: Arc<dyn Scene>) {
        let this = self.clone();
        self.queue_render_task(RenderTask::new(move || this.detach_scene(scene)));
    }

    /// Registers `view` in front of every existing view.
    pub fn add_scene_view(&self, view: Arc<dyn SceneView>) {
        let this = self.clone();
        self.queue_render_task(RenderTask::new(move || this.attach_scene_view(view, None)));
    }

    /// Registers `view` at `depth_order`, pushing views at or above it one step
    /// towards the front. A depth order past the end fails the task.
    pub fn insert_scene_view(&self, view: Arc<dyn SceneView>, depth_order: usize) {
        let this = self.clone();
        self.queue_render_task(RenderTask::new(move || this.attach_scene_view(view, Some(depth_order))));
    }

    pub fn remove_scene_view(&self, view: Arc<dyn SceneView>) {
        let this = self.clone();
        self.queue_render_task(RenderTask::new(move || this.detach_scene_view(view)));
    }

    /// Paint position of `view` (0 is back-most), or `None` if unregistered.
    pub fn get_scene_view_depth_order(&self, view: &Arc<dyn SceneView>) -> Option<usize> {
        self.inner.scene_views.lock().iter().position(|v| same_instance(v, view))
    }

    fn attach_scene(&self, scene: Arc<dyn Scene>) -> anyhow::Result<()> {
        {
            let mut scenes = self.inner.scenes.lock();
            if scenes.iter().any(|s| same_instance(s, &scene)) {
                log::debug!("scene '{}' already registered", scene.label());
                return Ok(());
            }
            scenes.push(scene.clone());
        }
        log::debug!("scene '{}' added", scene.label());
        scene.render_delegate().attach(scene.as_ref())
    }

    fn detach_scene(&self, scene: Arc<dyn Scene>) -> anyhow::Result<()> {
        let removed = {
            let mut scenes = self.inner.scenes.lock();
            match scenes.iter().position(|s| same_instance(s, &scene)) {
                Some(pos) => {
                    scenes.remove(pos);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return Ok(());
        }
        log::debug!("scene '{}' removed", scene.label());
        scene.render_delegate().detach(scene.as_ref())
    }

    fn attach_scene_view(&self, view: Arc<dyn SceneView>, depth_order: Option<usize>) -> anyhow::Result<()> {
        {
            let mut views = self.inner.scene_views.lock();
            if views.iter().any(|v| same_instance(v, &view)) {
                log::debug!("scene view '{}' already registered", view.label());
                return Ok(());
            }
            let depth = depth_order.unwrap_or(views.len());
            if depth > views.len() {
                return Err(ControlError::DepthOrderOutOfRange { depth, len: views.len() }.into());
            }
            views.insert(depth, view.clone());
        }
        log::debug!("scene view '{}' added", view.label());
        view.render_delegate().attach(view.as_ref())
    }

    fn detach_scene_view(&self, view: Arc<dyn SceneView>) -> anyhow::Result<()> {
        let removed = {
            let mut views = self.inner.scene_views.lock();
            match views.iter().position(|v| same_instance(v, &view)) {
                Some(pos) => {
                    views.remove(pos);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return Ok(());
        }
        log::debug!("scene view '{}' removed", view.label());
        view.render_delegate().detach(view.as_ref())
    }

    // ── frames ────────────────────────────────────────────────────────────

    fn start_frames(&self) {
        let started = self.inner.scheduler.lock().start(&self.inner.surface);
        if let Some(at) = started {
            self.reset_frame_state(at);
        }
    }

    fn stop_frames(&self) {
        self.inner.scheduler.lock().stop(&self.inner.surface);
    }

    fn reset_frame_state(&self, at: Instant) {
        let mut state = self.inner.frame_state.lock();
        state.clock.reset_at(at);
        state.fps.reset_at(at);
    }

    fn fps_window(&self) -> u32 {
        match FrameMode::for_rate(self.frame_rate()) {
            FrameMode::Continuous => CONTINUOUS_FPS_WINDOW,
            FrameMode::DisplaySync => self.display_refresh_rate().round() as u32,
            FrameMode::Fixed(_) => self.frame_rate() as u32,
        }
    }

    fn draw_frame(&self, time: FrameTime) {
        let dt = time.dt;
        let scenes = self.inner.scenes.lock().clone();
        let views = self.inner.scene_views.lock().clone();

        for scene in &scenes {
            scene.render_delegate().frame_start(dt);
        }
        for view in &views {
            view.render_delegate().frame_start(dt);
        }

        if self.is_surface_prep_enabled() && !self.inner.surface.is_transparent() {
            let color = self.background_color();
            run_guarded_unit("background paint", || self.inner.surface.paint_background(color));
        }

        let surface_size = self.surface_size();
        for (depth_order, view) in views.iter().enumerate() {
            if !view.render_delegate().is_enabled() {
                continue;
            }
            let ctx = FrameCtx {
                time,
                surface_size,
                depth_order,
                context: &self.inner.context,
                control: self,
            };
            let _ = run_guarded(view.label(), || view.render_frame(&ctx));
        }

        for scene in &scenes {
            scene.render_delegate().frame_end(dt);
        }
        for view in &views {
            view.render_delegate().frame_end(dt);
        }
    }

    fn update_fps(&self, now: Instant) {
        let window = self.fps_window();
        let measured = self.inner.frame_state.lock().fps.record_frame(now, window);
        let Some(fps) = measured else { return };

        let listener = self.inner.fps_listener.lock().clone();
        if let Some(listener) = listener {
            run_guarded_unit("fps listener", || listener(fps));
        }
    }

    /// Restores every registered delegate whose resources went with a lost context.
    fn restore_delegates(&self) {
        let scenes = self.inner.scenes.lock().clone();
        for scene in &scenes {
            let _ = run_guarded(scene.label(), || scene.render_delegate().restore_if_needed(scene.as_ref()));
        }
        let views = self.inner.scene_views.lock().clone();
        for view in &views {
            let _ = run_guarded(view.label(), || view.render_delegate().restore_if_needed(view.as_ref()));
        }
    }

    fn mark_delegates_lost(&self) {
        for scene in self.inner.scenes.lock().iter() {
            scene.render_delegate().mark_context_lost();
        }
        for view in self.inner.scene_views.lock().iter() {
            view.render_delegate().mark_context_lost();
        }
    }

    fn debug_assert_render_thread(&self, entry: &str) {
        debug_assert!(self.is_render_thread(), "{entry} called off the render thread");
    }
}

impl SurfaceRenderer for RenderControl {
    fn on_render_context_acquired(&self, api: RenderContextType, major: u32, minor: u32) {
        let current = thread::current().id();
        {
            let mut render_thread = self.inner.render_thread.lock();
            if let Some(known) = *render_thread {
                log::warn!("render context acquired again without a loss (render thread {known:?}); ignoring");
                return;
            }
            *render_thread = Some(current);
        }

        if !self.inner.context.set_current(api, major, minor) {
            log::error!("render context {api:?} {major}.{minor} is not supported");
        }

        let rate = self.frame_rate();
        let restarted = self.inner.scheduler.lock().set_frame_rate(rate, &self.inner.surface);
        if let Some(at) = restarted {
            self.reset_frame_state(at);
        }

        self.restore_delegates();
    }

    fn on_surface_size_changed(&self, width: u32, height: u32) -> Result<()> {
        let size = SurfaceSize::new(width, height);
        if size.is_empty() {
            return Err(ControlError::InvalidSurfaceSize { width, height });
        }
        self.debug_assert_render_thread("on_surface_size_changed");

        *self.inner.surface_size.lock() = size;
        log::debug!("surface size {size}");

        let first = std::mem::replace(&mut self.inner.frame_state.lock().awaiting_first_size, false);
        let client = self.inner.client.clone();
        if first {
            self.start_frames();
            run_guarded_unit("client availability", || client.on_render_control_available(self, size));
        } else {
            run_guarded_unit("client resize", || client.on_surface_size_changed(size));
        }
        Ok(())
    }

    fn on_render_frame(&self) {
        if !self.are_frames_active() {
            return;
        }
        self.debug_assert_render_thread("on_render_frame");

        let time = self.inner.frame_state.lock().clock.tick();
        self.draw_frame(time);
        self.update_fps(Instant::now());
    }

    fn on_render_context_lost(&self) {
        self.debug_assert_render_thread("on_render_context_lost");

        self.inner.context.unset_current();
        *self.inner.render_thread.lock() = None;
        self.stop_frames();
        self.inner.frame_state.lock().awaiting_first_size = true;
        self.mark_delegates_lost();

        let client = self.inner.client.clone();
        run_guarded_unit("client unavailability", || client.on_render_control_unavailable());
    }

    fn on_render_thread_pause(&self) {
        log::debug!("render thread paused");
        self.stop_frames();
    }

    /// Frames resume only once the surface has been sized.
    fn on_render_thread_resume(&self) {
        log::debug!("render thread resumed");
        if !self.inner.frame_state.lock().awaiting_first_size {
            self.start_frames();
        }
    }
}
