/// Client hook invoked once per frame, at frame start and/or frame end.
///
/// The `wants_*` flags are read when the callback is registered and decide
/// which of the delegate's lists it joins.
pub trait FrameCallback: Send + Sync {
    fn on_frame_start(&self, dt: f64) {
        let _ = dt;
    }

    fn on_frame_end(&self, dt: f64) {
        let _ = dt;
    }

    fn wants_frame_start(&self) -> bool;

    fn wants_frame_end(&self) -> bool;

    /// Single-frame callbacks are dropped from their delegate after the frame
    /// in which they fired.
    fn is_single_frame(&self) -> bool {
        false
    }
}

type Hook = Box<dyn Fn(f64) + Send + Sync>;

/// [`FrameCallback`] assembled from closures.
///
/// ```rust,ignore
/// let cb: Arc<dyn FrameCallback> = Arc::new(
///     FnFrameCallback::new()
///         .on_start(|dt| log::trace!("frame start, dt = {dt}"))
///         .single_frame(),
/// );
/// scene.render_delegate().add_frame_callback(cb);
/// ```
#[derive(Default)]
pub struct FnFrameCallback {
    start: Option<Hook>,
    end: Option<Hook>,
    single_frame: bool,
}

impl FnFrameCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.start = Some(Box::new(f));
        self
    }

    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.end = Some(Box::new(f));
        self
    }

    pub fn single_frame(mut self) -> Self {
        self.single_frame = true;
        self
    }
}

impl FrameCallback for FnFrameCallback {
    fn on_frame_start(&self, dt: f64) {
        if let Some(f) = &self.start {
            f(dt);
        }
    }

    fn on_frame_end(&self, dt: f64) {
        if let Some(f) = &self.end {
            f(dt);
        }
    }

    fn wants_frame_start(&self) -> bool {
        self.start.is_some()
    }

    fn wants_frame_end(&self) -> bool {
        self.end.is_some()
    }

    fn is_single_frame(&self) -> bool {
        self.single_frame
    }
}
