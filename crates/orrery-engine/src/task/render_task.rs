use core::fmt;

use super::boundary::{run_guarded, run_guarded_unit};

/// Boxed job handed to a thread-marshaling primitive.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

type TaskAction = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;
type TaskCallback = Box<dyn FnOnce(TaskOutcome) + Send + 'static>;

/// How a task finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    /// The action returned an error or panicked; carries the logged message.
    Failed(String),
}

impl TaskOutcome {
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed)
    }
}

/// Where a task's completion callback runs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CallbackDispatch {
    /// Marshaled to the main/UI thread.
    #[default]
    MainThread,
    /// Invoked directly on the render thread right after the action.
    /// The callback is then responsible for its own thread-safety.
    InPlace,
}

/// A unit of work executed exclusively on the render thread.
///
/// Consumed exactly once. Duplicated submissions of equivalent closures are
/// independent tasks.
///
/// ```rust,ignore
/// control.queue_render_task(
///     RenderTask::new(move || {
///         scene.rebuild_geometry()?;
///         Ok(())
///     })
///     .on_complete(|outcome| log::info!("rebuild: {outcome:?}")),
/// );
/// ```
pub struct RenderTask {
    action: TaskAction,
    callback: Option<TaskCallback>,
    dispatch: CallbackDispatch,
}

impl RenderTask {
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            action: Box::new(action),
            callback: None,
            dispatch: CallbackDispatch::default(),
        }
    }

    /// Sets the completion callback. It runs after success and after a caught failure.
    pub fn on_complete<C>(mut self, callback: C) -> Self
    where
        C: FnOnce(TaskOutcome) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn with_dispatch(mut self, dispatch: CallbackDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    #[inline]
    pub fn dispatch(&self) -> CallbackDispatch {
        self.dispatch
    }

    #[inline]
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Runs the action on the calling (render) thread and dispatches the
    /// completion callback. Failures of the action never propagate.
    ///
    /// `to_main_thread` marshals a job to the main thread.
    pub(crate) fn execute(self, to_main_thread: &dyn Fn(Job)) -> TaskOutcome {
        let RenderTask { action, callback, dispatch } = self;

        let outcome = match run_guarded("render task", action) {
            Ok(()) => TaskOutcome::Completed,
            Err(msg) => TaskOutcome::Failed(msg),
        };

        if let Some(callback) = callback {
            let reported = outcome.clone();
            match dispatch {
                CallbackDispatch::InPlace => {
                    run_guarded_unit("render task callback", move || callback(reported));
                }
                CallbackDispatch::MainThread => to_main_thread(Box::new(move || callback(reported))),
            }
        }

        outcome
    }
}

impl fmt::Debug for RenderTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTask")
            .field("has_callback", &self.callback.is_some())
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}
