use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{Color, RenderSurface, SurfaceConfig, SurfaceRenderer, SurfaceSize};
use crate::context::RenderContext;
use crate::task::{run_guarded_unit, Job};

/// Pacing of continuous mode; the headless surface has no swap to block on.
const CONTINUOUS_PACING: Duration = Duration::from_millis(1);

enum Message {
    Job(Job),
    Frame,
    Resize(SurfaceSize),
    LoseContext,
    RestoreContext(RenderContext),
    Pause,
    Resume,
    Sync(Sender<()>),
    Wake,
    Shutdown,
}

/// Render surface without a display.
///
/// Owns a real render thread running a message loop: queued jobs, frame
/// requests, resizes and context events are handled there in arrival order.
/// Display sync is emulated with a timer at the configured refresh rate.
/// Main-thread jobs are collected and run by whichever thread calls
/// [`run_main_thread_jobs`](Self::run_main_thread_jobs).
///
/// The render thread keeps its renderer alive until [`shutdown`](Self::shutdown).
pub struct HeadlessSurface {
    config: SurfaceConfig,

    tx: Sender<Message>,
    rx: Mutex<Option<Receiver<Message>>>,
    main_tx: Sender<Job>,
    main_rx: Mutex<Receiver<Job>>,
    thread: Mutex<Option<JoinHandle<()>>>,

    on_request: Arc<AtomicBool>,
    display_sync: Arc<AtomicBool>,
    frame_pending: Arc<AtomicBool>,
    frames_drawn: Arc<AtomicU64>,
    backgrounds_painted: AtomicU64,
    last_background: Mutex<Option<Color>>,
}

impl HeadlessSurface {
    pub fn new(config: SurfaceConfig) -> Arc<Self> {
        let (tx, rx) = mpsc::channel();
        let (main_tx, main_rx) = mpsc::channel();
        Arc::new(Self {
            config,
            tx,
            rx: Mutex::new(Some(rx)),
            main_tx,
            main_rx: Mutex::new(main_rx),
            thread: Mutex::new(None),
            on_request: Arc::new(AtomicBool::new(false)),
            display_sync: Arc::new(AtomicBool::new(false)),
            frame_pending: Arc::new(AtomicBool::new(false)),
            frames_drawn: Arc::new(AtomicU64::new(0)),
            backgrounds_painted: AtomicU64::new(0),
            last_background: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Spawns the render thread, which acquires `context` and reports `size`
    /// before entering its loop. Returns `false` if already started.
    pub fn start(
        &self,
        renderer: Arc<dyn SurfaceRenderer>,
        size: SurfaceSize,
        context: RenderContext,
    ) -> std::io::Result<bool> {
        let Some(rx) = self.rx.lock().take() else {
            log::warn!("headless surface already started");
            return Ok(false);
        };

        let lp = RenderLoop {
            renderer,
            rx,
            on_request: self.on_request.clone(),
            display_sync: self.display_sync.clone(),
            frame_pending: self.frame_pending.clone(),
            frames_drawn: self.frames_drawn.clone(),
            vsync_period: Duration::from_secs_f64(1.0 / self.config.display_refresh_rate.max(1.0)),
            size,
            context,
        };

        let handle = thread::Builder::new()
            .name("orrery-render".into())
            .spawn(move || lp.run())?;
        *self.thread.lock() = Some(handle);
        Ok(true)
    }

    pub fn is_running(&self) -> bool {
        self.thread.lock().as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn resize(&self, size: SurfaceSize) {
        self.send(Message::Resize(size));
    }

    /// Simulates the platform destroying the render context.
    pub fn lose_context(&self) {
        self.send(Message::LoseContext);
    }

    /// Simulates the platform re-creating the render context; the current
    /// surface size is reported again afterwards.
    pub fn restore_context(&self, context: RenderContext) {
        self.send(Message::RestoreContext(context));
    }

    pub fn pause(&self) {
        self.send(Message::Pause);
    }

    pub fn resume(&self) {
        self.send(Message::Resume);
    }

    /// Blocks until the render thread has handled everything queued before
    /// this call. Returns `false` if the render thread is not running.
    pub fn sync(&self) -> bool {
        if self.thread.lock().is_none() {
            return false;
        }
        let (tx, rx) = mpsc::channel();
        self.send(Message::Sync(tx));
        rx.recv().is_ok()
    }

    /// Runs all pending main-thread jobs on the calling thread.
    pub fn run_main_thread_jobs(&self) -> usize {
        let rx = self.main_rx.lock();
        let mut ran = 0;
        while let Ok(job) = rx.try_recv() {
            run_guarded_unit("main thread job", job);
            ran += 1;
        }
        ran
    }

    /// Waits up to `timeout` for one main-thread job and runs it.
    pub fn run_next_main_thread_job(&self, timeout: Duration) -> bool {
        let job = self.main_rx.lock().recv_timeout(timeout);
        match job {
            Ok(job) => {
                run_guarded_unit("main thread job", job);
                true
            }
            Err(_) => false,
        }
    }

    /// Frames the render thread has asked its renderer to draw.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn.load(Ordering::Acquire)
    }

    pub fn backgrounds_painted(&self) -> u64 {
        self.backgrounds_painted.load(Ordering::Acquire)
    }

    pub fn last_background(&self) -> Option<Color> {
        *self.last_background.lock()
    }

    pub fn is_render_on_request(&self) -> bool {
        self.on_request.load(Ordering::Acquire)
    }

    pub fn is_display_sync(&self) -> bool {
        self.display_sync.load(Ordering::Acquire)
    }

    /// Stops the render thread and waits for it. Idempotent.
    pub fn shutdown(&self) {
        self.send(Message::Shutdown);
        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("render thread panicked");
            }
        }
    }

    fn send(&self, msg: Message) {
        if self.tx.send(msg).is_err() {
            log::trace!("headless render thread is gone; message dropped");
        }
    }
}

impl RenderSurface for HeadlessSurface {
    fn is_transparent(&self) -> bool {
        self.config.transparent
    }

    fn set_render_frames_on_request(&self, on_request: bool) {
        self.on_request.store(on_request, Ordering::Release);
        // the loop re-reads its mode on every message
        self.send(Message::Wake);
    }

    fn set_display_sync_frames(&self, enabled: bool) {
        self.display_sync.store(enabled, Ordering::Release);
        self.send(Message::Wake);
    }

    fn request_frame_render(&self) {
        if !self.frame_pending.swap(true, Ordering::AcqRel) {
            self.send(Message::Frame);
        }
    }

    fn queue_to_render_thread(&self, job: Job) {
        self.send(Message::Job(job));
    }

    fn queue_to_main_thread(&self, job: Job) {
        if self.main_tx.send(job).is_err() {
            log::trace!("main thread queue closed; job dropped");
        }
    }

    fn display_refresh_rate(&self) -> f64 {
        self.config.display_refresh_rate
    }

    fn paint_background(&self, color: Color) {
        log::trace!("clear to {:#010x}", color.to_argb());
        self.backgrounds_painted.fetch_add(1, Ordering::AcqRel);
        *self.last_background.lock() = Some(color);
    }
}

struct RenderLoop {
    renderer: Arc<dyn SurfaceRenderer>,
    rx: Receiver<Message>,
    on_request: Arc<AtomicBool>,
    display_sync: Arc<AtomicBool>,
    frame_pending: Arc<AtomicBool>,
    frames_drawn: Arc<AtomicU64>,
    vsync_period: Duration,
    size: SurfaceSize,
    context: RenderContext,
}

impl RenderLoop {
    fn run(mut self) {
        log::debug!("render thread started");
        let mut has_context = true;
        let mut paused = false;
        let mut next_vsync = Instant::now();

        self.acquire();

        loop {
            let continuous = !self.on_request.load(Ordering::Acquire);
            let vsync = self.display_sync.load(Ordering::Acquire);
            let drawing = has_context && !paused;

            let wait = if drawing && continuous {
                Some(CONTINUOUS_PACING)
            } else if drawing && vsync {
                Some(next_vsync.saturating_duration_since(Instant::now()))
            } else {
                None
            };

            let msg = match wait {
                None => match self.rx.recv() {
                    Ok(m) => Some(m),
                    Err(_) => break,
                },
                Some(t) => match self.rx.recv_timeout(t) {
                    Ok(m) => Some(m),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
            };

            match msg {
                None => {
                    if vsync && !continuous {
                        next_vsync = Instant::now() + self.vsync_period;
                    }
                    self.draw();
                }
                Some(Message::Job(job)) => {
                    run_guarded_unit("render thread job", job);
                }
                Some(Message::Frame) => {
                    self.frame_pending.store(false, Ordering::Release);
                    if drawing {
                        self.draw();
                    }
                }
                Some(Message::Resize(size)) => {
                    self.size = size;
                    if has_context {
                        self.report_size();
                    }
                }
                Some(Message::LoseContext) => {
                    if has_context {
                        has_context = false;
                        self.renderer.on_render_context_lost();
                    }
                }
                Some(Message::RestoreContext(context)) => {
                    self.context = context;
                    has_context = true;
                    self.acquire();
                }
                Some(Message::Pause) => {
                    paused = true;
                    self.renderer.on_render_thread_pause();
                }
                Some(Message::Resume) => {
                    paused = false;
                    next_vsync = Instant::now();
                    self.renderer.on_render_thread_resume();
                }
                Some(Message::Sync(done)) => {
                    let _ = done.send(());
                }
                Some(Message::Wake) => {}
                Some(Message::Shutdown) => break,
            }
        }

        if has_context {
            self.renderer.on_render_context_lost();
        }
        log::debug!("render thread stopped");
    }

    fn acquire(&self) {
        let ctx = self.context;
        self.renderer
            .on_render_context_acquired(ctx.api(), ctx.major_version(), ctx.minor_version());
        self.report_size();
    }

    fn report_size(&self) {
        let SurfaceSize { width, height } = self.size;
        if let Err(e) = self.renderer.on_surface_size_changed(width, height) {
            log::error!("surface size rejected: {e}");
        }
    }

    fn draw(&self) {
        self.frames_drawn.fetch_add(1, Ordering::AcqRel);
        self.renderer.on_render_frame();
    }
}
