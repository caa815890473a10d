use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{same_instance, Animation, FrameCallback, Lifecycle};
use crate::error::{ControlError, Result};
use crate::task::run_guarded_unit;

/// Frame-callback and animation registries plus attach/detach state shared by
/// every scene and scene view.
///
/// Registration methods may be called from any thread. The lists are guarded
/// individually and frame fan-out iterates over a snapshot, so a callback may
/// add or remove callbacks (including itself) without deadlocking; such changes
/// take effect from the next frame.
pub struct RenderDelegate {
    frame_start_callbacks: Mutex<Vec<Arc<dyn FrameCallback>>>,
    frame_end_callbacks: Mutex<Vec<Arc<dyn FrameCallback>>>,
    animations: Mutex<Vec<Arc<dyn Animation>>>,
    /// Single-frame start callbacks that fired this frame, pruned at frame end.
    fired_single_frame: Mutex<Vec<Arc<dyn FrameCallback>>>,

    is_initialized: AtomicBool,
    needs_restore: AtomicBool,
    is_enabled: AtomicBool,
    is_attached: AtomicBool,
}

impl RenderDelegate {
    /// Creates a detached, enabled delegate.
    pub fn new() -> Self {
        Self {
            frame_start_callbacks: Mutex::new(Vec::new()),
            frame_end_callbacks: Mutex::new(Vec::new()),
            animations: Mutex::new(Vec::new()),
            fired_single_frame: Mutex::new(Vec::new()),
            is_initialized: AtomicBool::new(false),
            needs_restore: AtomicBool::new(false),
            is_enabled: AtomicBool::new(true),
            is_attached: AtomicBool::new(false),
        }
    }

    // ── enable flag ───────────────────────────────────────────────────────

    /// A disabled delegate stays registered but receives no frame events.
    pub fn set_enabled(&self, enabled: bool) {
        self.is_enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled.load(Ordering::Acquire)
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized.load(Ordering::Acquire)
    }

    pub fn needs_restore(&self) -> bool {
        self.needs_restore.load(Ordering::Acquire)
    }

    pub fn is_attached(&self) -> bool {
        self.is_attached.load(Ordering::Acquire)
    }

    // ── frame callbacks ───────────────────────────────────────────────────

    /// Registers `callback` for the phases it wants.
    ///
    /// Duplicates are not filtered: registering the same callback twice makes
    /// it fire twice per frame.
    pub fn add_frame_callback(&self, callback: Arc<dyn FrameCallback>) {
        if callback.wants_frame_start() {
            self.frame_start_callbacks.lock().push(callback.clone());
        }
        if callback.wants_frame_end() {
            self.frame_end_callbacks.lock().push(callback);
        }
    }

    /// Removes the first occurrence of `callback` from each list holding it.
    /// Unknown callbacks are ignored.
    pub fn remove_frame_callback(&self, callback: &Arc<dyn FrameCallback>) {
        remove_first(&mut self.frame_start_callbacks.lock(), callback);
        remove_first(&mut self.frame_end_callbacks.lock(), callback);
    }

    pub fn clear_frame_callbacks(&self) {
        self.frame_start_callbacks.lock().clear();
        self.frame_end_callbacks.lock().clear();
        self.fired_single_frame.lock().clear();
    }

    pub fn frame_start_callback_count(&self) -> usize {
        self.frame_start_callbacks.lock().len()
    }

    pub fn frame_end_callback_count(&self) -> usize {
        self.frame_end_callbacks.lock().len()
    }

    // ── animations ────────────────────────────────────────────────────────

    pub fn add_animation(&self, animation: Arc<dyn Animation>) {
        self.animations.lock().push(animation);
    }

    pub fn add_animations<I>(&self, animations: I)
    where
        I: IntoIterator<Item = Arc<dyn Animation>>,
    {
        self.animations.lock().extend(animations);
    }

    /// Removes the first occurrence of `animation`; unknown animations are ignored.
    pub fn remove_animation(&self, animation: &Arc<dyn Animation>) {
        remove_first(&mut self.animations.lock(), animation);
    }

    /// Puts `new` in the list position held by `old`.
    pub fn replace_animation(&self, old: &Arc<dyn Animation>, new: Arc<dyn Animation>) -> Result<()> {
        let mut animations = self.animations.lock();
        let slot = animations
            .iter_mut()
            .find(|a| same_instance(a, old))
            .ok_or(ControlError::AnimationNotFound)?;
        *slot = new;
        Ok(())
    }

    pub fn clear_animations(&self) {
        self.animations.lock().clear();
    }

    pub fn animation_count(&self) -> usize {
        self.animations.lock().len()
    }

    // ── render-control side ───────────────────────────────────────────────

    /// Runs the attach sequence: `initialize` once ever, then `restore` if the
    /// delegate's GPU resources are presumed lost.
    pub(crate) fn attach<L: Lifecycle + ?Sized>(&self, hooks: &L) -> anyhow::Result<()> {
        self.is_attached.store(true, Ordering::Release);

        if !self.is_initialized() {
            hooks.initialize()?;
            self.is_initialized.store(true, Ordering::Release);
        }
        self.restore_if_needed(hooks)
    }

    /// Runs the detach sequence: drops all registrations, flags a restore for
    /// the next attach, then calls `destroy`.
    pub(crate) fn detach<L: Lifecycle + ?Sized>(&self, hooks: &L) -> anyhow::Result<()> {
        self.is_attached.store(false, Ordering::Release);
        self.clear_frame_callbacks();
        self.clear_animations();
        self.needs_restore.store(true, Ordering::Release);
        hooks.destroy()
    }

    /// Flags an initialized delegate for restore; its GPU resources went away
    /// with the render context.
    pub(crate) fn mark_context_lost(&self) {
        if self.is_initialized() {
            self.needs_restore.store(true, Ordering::Release);
        }
    }

    pub(crate) fn restore_if_needed<L: Lifecycle + ?Sized>(&self, hooks: &L) -> anyhow::Result<()> {
        if self.needs_restore() {
            hooks.restore()?;
            self.needs_restore.store(false, Ordering::Release);
        }
        Ok(())
    }

    /// Frame-start fan-out: callbacks in registration order, then playing animations.
    pub(crate) fn frame_start(&self, dt: f64) {
        if !self.is_enabled() {
            return;
        }

        let callbacks = self.frame_start_callbacks.lock().clone();
        *self.fired_single_frame.lock() = single_frame(&callbacks);
        for cb in &callbacks {
            run_guarded_unit("frame start callback", || cb.on_frame_start(dt));
        }

        let animations = self.animations.lock().clone();
        for anim in animations.iter().filter(|a| a.is_playing()) {
            run_guarded_unit("animation update", || anim.update(dt));
        }
    }

    /// Frame-end fan-out, after which single-frame callbacks are dropped from
    /// each phase they fired in this frame. Ones registered mid-frame wait for
    /// their phase in the next frame.
    pub(crate) fn frame_end(&self, dt: f64) {
        let fired = std::mem::take(&mut *self.fired_single_frame.lock());
        prune(&self.frame_start_callbacks, &fired);

        if !self.is_enabled() {
            return;
        }

        let callbacks = self.frame_end_callbacks.lock().clone();
        for cb in &callbacks {
            run_guarded_unit("frame end callback", || cb.on_frame_end(dt));
        }
        prune(&self.frame_end_callbacks, &single_frame(&callbacks));
    }
}

impl std::fmt::Debug for RenderDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderDelegate")
            .field("frame_start_callbacks", &self.frame_start_callback_count())
            .field("frame_end_callbacks", &self.frame_end_callback_count())
            .field("animations", &self.animation_count())
            .field("is_initialized", &self.is_initialized())
            .field("needs_restore", &self.needs_restore())
            .field("is_enabled", &self.is_enabled())
            .field("is_attached", &self.is_attached())
            .finish()
    }
}

impl Default for RenderDelegate {
    fn default() -> Self {
        Self::new()
    }
}

fn single_frame(callbacks: &[Arc<dyn FrameCallback>]) -> Vec<Arc<dyn FrameCallback>> {
    callbacks.iter().filter(|cb| cb.is_single_frame()).cloned().collect()
}

fn prune(list: &Mutex<Vec<Arc<dyn FrameCallback>>>, fired: &[Arc<dyn FrameCallback>]) {
    if fired.is_empty() {
        return;
    }
    let mut list = list.lock();
    for cb in fired {
        remove_first(&mut list, cb);
    }
}

fn remove_first<T: ?Sized>(list: &mut Vec<Arc<T>>, item: &Arc<T>) {
    if let Some(pos) = list.iter().position(|x| same_instance(x, item)) {
        list.remove(pos);
    }
}
