//! Panic containment for semantic actions and entry points.
//!
//! A panic hook records the backtrace on the panicking thread while a guarded
//! call is running, so the trace shows where the panic happened rather than
//! where it was caught. Panics outside a guard go to the previous hook.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if DEPTH.with(Cell::get) > 0 {
                let trace = Backtrace::force_capture().to_string();
                TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

/// A panic caught by [`contain`].
#[derive(Debug)]
pub(super) struct Caught {
    pub message: String,
    /// Backtrace taken at the panic site.
    pub trace: String,
}

/// Runs `f`, turning a panic into [`Caught`].
pub(super) fn contain<T>(f: impl FnOnce() -> T) -> Result<T, Caught> {
    install_hook();
    DEPTH.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    result.map_err(|payload| Caught {
        message: panic_message(payload.as_ref()),
        trace: TRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| Backtrace::force_capture().to_string()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    fn fail_deep_inside() -> u32 {
        panic!("boom")
    }

    #[test]
    fn test_value_passes_through() {
        assert_eq!(contain(|| 7).unwrap(), 7);
    }

    #[test]
    fn test_trace_is_taken_at_the_panic_site() {
        let caught = contain(fail_deep_inside).unwrap_err();
        assert_eq!(caught.message, "boom");
        assert!(caught.trace.contains("fail_deep_inside"), "{}", caught.trace);
    }

    #[test]
    fn test_nested_guards() {
        let outer = contain(|| contain(|| panic!("inner")).unwrap_err().message).unwrap();
        assert_eq!(outer, "inner");
        let caught = contain(|| panic!("{}", String::from("owned"))).unwrap_err();
        assert_eq!(caught.message, "owned");
    }
}
