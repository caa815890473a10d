use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Runs `f`, absorbing both returned errors and panics.
///
/// Failures are logged under `what` and returned as a message. Nothing that
/// happens inside `f` unwinds past this call, so the render thread survives a
/// faulty task or client hook.
pub(crate) fn run_guarded<F>(what: &str, f: F) -> Result<(), String>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            let msg = format!("{e:#}");
            log::error!("{what} failed: {msg}");
            Err(msg)
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            log::error!("{what} panicked: {msg}");
            Err(msg)
        }
    }
}

/// Infallible variant of [`run_guarded`] for hooks that return nothing.
pub(crate) fn run_guarded_unit<F>(what: &str, f: F) -> bool
where
    F: FnOnce(),
{
    run_guarded(what, || {
        f();
        Ok(())
    })
    .is_ok()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_passes_through() {
        assert_eq!(run_guarded("noop", || Ok(())), Ok(()));
    }

    #[test]
    fn error_is_reported_with_context() {
        let res = run_guarded("load", || Err(anyhow::anyhow!("inner").context("outer")));
        assert_eq!(res, Err("outer: inner".to_string()));
    }

    #[test]
    fn panic_is_absorbed() {
        let res = run_guarded("boom", || panic!("kaboom {}", 7));
        assert_eq!(res, Err("kaboom 7".to_string()));
        assert!(!run_guarded_unit("static", || panic!("static str")));
    }
}
