//! Deterministic doubles for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::control::{FrameCtx, RenderControl, RenderControlClient};
use crate::delegate::{FnFrameCallback, Lifecycle, RenderDelegate};
use crate::scene::{Scene, SceneView};
use crate::surface::{Color, RenderSurface, SurfaceSize};
use crate::task::Job;

/// Shared, ordered event log.
pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

// ── surface ───────────────────────────────────────────────────────────────

/// Surface whose queues are drained explicitly by the test thread.
pub(crate) struct ManualSurface {
    transparent: bool,
    render_jobs: Mutex<VecDeque<Job>>,
    main_jobs: Mutex<VecDeque<Job>>,
    frame_requests: AtomicUsize,
    on_request: Mutex<Option<bool>>,
    display_sync: AtomicBool,
    backgrounds: AtomicUsize,
    last_background: Mutex<Option<Color>>,
}

impl ManualSurface {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::with_transparency(false))
    }

    pub(crate) fn transparent() -> Arc<Self> {
        Arc::new(Self::with_transparency(true))
    }

    fn with_transparency(transparent: bool) -> Self {
        Self {
            transparent,
            render_jobs: Mutex::new(VecDeque::new()),
            main_jobs: Mutex::new(VecDeque::new()),
            frame_requests: AtomicUsize::new(0),
            on_request: Mutex::new(None),
            display_sync: AtomicBool::new(false),
            backgrounds: AtomicUsize::new(0),
            last_background: Mutex::new(None),
        }
    }

    /// Runs render jobs until the queue stays empty, including jobs queued by jobs.
    pub(crate) fn run_render_jobs(&self) -> usize {
        drain(&self.render_jobs)
    }

    pub(crate) fn run_main_jobs(&self) -> usize {
        drain(&self.main_jobs)
    }

    pub(crate) fn frame_requests(&self) -> usize {
        self.frame_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn on_request(&self) -> Option<bool> {
        *self.on_request.lock()
    }

    pub(crate) fn display_sync(&self) -> bool {
        self.display_sync.load(Ordering::SeqCst)
    }

    pub(crate) fn backgrounds(&self) -> usize {
        self.backgrounds.load(Ordering::SeqCst)
    }

    pub(crate) fn last_background(&self) -> Option<Color> {
        *self.last_background.lock()
    }
}

fn drain(queue: &Mutex<VecDeque<Job>>) -> usize {
    let mut ran = 0;
    loop {
        let next = queue.lock().pop_front();
        let Some(job) = next else { return ran };
        job();
        ran += 1;
    }
}

impl RenderSurface for ManualSurface {
    fn is_transparent(&self) -> bool {
        self.transparent
    }

    fn set_render_frames_on_request(&self, on_request: bool) {
        *self.on_request.lock() = Some(on_request);
    }

    fn set_display_sync_frames(&self, enabled: bool) {
        self.display_sync.store(enabled, Ordering::SeqCst);
    }

    fn request_frame_render(&self) {
        self.frame_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn queue_to_render_thread(&self, job: Job) {
        self.render_jobs.lock().push_back(job);
    }

    fn queue_to_main_thread(&self, job: Job) {
        self.main_jobs.lock().push_back(job);
    }

    fn display_refresh_rate(&self) -> f64 {
        60.0
    }

    fn paint_background(&self, color: Color) {
        self.backgrounds.fetch_add(1, Ordering::SeqCst);
        *self.last_background.lock() = Some(color);
    }
}

// ── scenes ────────────────────────────────────────────────────────────────

fn log_frames(delegate: &RenderDelegate, name: &str, journal: &Journal) {
    let (start_name, start_journal) = (name.to_owned(), journal.clone());
    let (end_name, end_journal) = (name.to_owned(), journal.clone());
    delegate.add_frame_callback(Arc::new(
        FnFrameCallback::new()
            .on_start(move |_| start_journal.lock().push(format!("{start_name}:start")))
            .on_end(move |_| end_journal.lock().push(format!("{end_name}:end"))),
    ));
}

/// Scene logging `name:event` for its lifecycle hooks and frame phases.
pub(crate) struct RecordingScene {
    name: String,
    delegate: RenderDelegate,
    journal: Journal,
}

impl RecordingScene {
    pub(crate) fn new(name: &str, journal: &Journal) -> Arc<Self> {
        let delegate = RenderDelegate::new();
        log_frames(&delegate, name, journal);
        Arc::new(Self {
            name: name.to_owned(),
            delegate,
            journal: journal.clone(),
        })
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        count(&self.journal, &self.name, event)
    }

    fn record(&self, event: &str) {
        self.journal.lock().push(format!("{}:{event}", self.name));
    }
}

impl Lifecycle for RecordingScene {
    fn render_delegate(&self) -> &RenderDelegate {
        &self.delegate
    }

    fn initialize(&self) -> anyhow::Result<()> {
        self.record("initialize");
        Ok(())
    }

    fn restore(&self) -> anyhow::Result<()> {
        self.record("restore");
        Ok(())
    }

    fn destroy(&self) -> anyhow::Result<()> {
        self.record("destroy");
        Ok(())
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Scene for RecordingScene {}

/// Scene view logging like [`RecordingScene`] plus `name:render@depth`.
pub(crate) struct RecordingView {
    name: String,
    delegate: RenderDelegate,
    journal: Journal,
    fail_render: AtomicBool,
    last_dt: Mutex<f64>,
}

impl RecordingView {
    pub(crate) fn new(name: &str, journal: &Journal) -> Arc<Self> {
        let delegate = RenderDelegate::new();
        log_frames(&delegate, name, journal);
        Arc::new(Self {
            name: name.to_owned(),
            delegate,
            journal: journal.clone(),
            fail_render: AtomicBool::new(false),
            last_dt: Mutex::new(f64::NAN),
        })
    }

    pub(crate) fn fail_render(&self, fail: bool) {
        self.fail_render.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn last_dt(&self) -> f64 {
        *self.last_dt.lock()
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        count(&self.journal, &self.name, event)
    }

    fn record(&self, event: &str) {
        self.journal.lock().push(format!("{}:{event}", self.name));
    }
}

impl Lifecycle for RecordingView {
    fn render_delegate(&self) -> &RenderDelegate {
        &self.delegate
    }

    fn initialize(&self) -> anyhow::Result<()> {
        self.record("initialize");
        Ok(())
    }

    fn restore(&self) -> anyhow::Result<()> {
        self.record("restore");
        Ok(())
    }

    fn destroy(&self) -> anyhow::Result<()> {
        self.record("destroy");
        Ok(())
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl SceneView for RecordingView {
    fn render_frame(&self, ctx: &FrameCtx<'_>) -> anyhow::Result<()> {
        *self.last_dt.lock() = ctx.dt();
        if self.fail_render.load(Ordering::SeqCst) {
            anyhow::bail!("{} refused to render", self.name);
        }
        self.record(&format!("render@{}", ctx.depth_order));
        Ok(())
    }
}

fn count(journal: &Journal, name: &str, event: &str) -> usize {
    let wanted = format!("{name}:{event}");
    journal.lock().iter().filter(|e| **e == wanted).count()
}

// ── client ────────────────────────────────────────────────────────────────

/// Client logging `client:available WxH`, `client:resized WxH` and `client:unavailable`.
pub(crate) struct RecordingClient {
    journal: Journal,
}

impl RecordingClient {
    pub(crate) fn new(journal: &Journal) -> Arc<Self> {
        Arc::new(Self { journal: journal.clone() })
    }
}

impl RenderControlClient for RecordingClient {
    fn on_render_control_available(&self, _control: &RenderControl, initial_size: SurfaceSize) {
        self.journal.lock().push(format!("client:available {initial_size}"));
    }

    fn on_surface_size_changed(&self, size: SurfaceSize) {
        self.journal.lock().push(format!("client:resized {size}"));
    }

    fn on_render_control_unavailable(&self) {
        self.journal.lock().push("client:unavailable".into());
    }
}
