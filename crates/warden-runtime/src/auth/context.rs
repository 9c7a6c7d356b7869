//! Per-thread static-context stack.
//!
//! A static method has no receiver to recover its identity from, so the
//! trampoline pushes a [`StaticContext`] while the body runs. The checker
//! reads the innermost entry when a caller carries no type.
//!
//! Each thread owns its own stack; one thread's context never appears in
//! another thread's check.

use std::cell::RefCell;
use warden_auth::StaticContext;

thread_local! {
    static STACK: RefCell<Vec<StaticContext>> = const { RefCell::new(Vec::new()) };
}

/// Scoped entry on the static-context stack.
///
/// Pushed by [`StaticContextGuard::enter`] and popped on drop, including
/// during unwinding.
///
/// # Example
///
/// ```
/// use warden_auth::StaticContext;
/// use warden_runtime::auth::context::{current, StaticContextGuard};
/// use warden_types::TypeId;
///
/// let factory = TypeId::new("Factory");
/// {
///     let _guard = StaticContextGuard::enter(StaticContext::new(factory.clone(), "build"));
///     assert_eq!(current().map(|c| c.method_name), Some("build".to_string()));
/// }
/// assert!(current().is_none());
/// ```
#[derive(Debug)]
#[must_use = "the context is popped as soon as the guard is dropped"]
pub struct StaticContextGuard {
    depth: usize,
}

impl StaticContextGuard {
    /// Pushes `context` for the current thread.
    pub fn enter(context: StaticContext) -> Self {
        let depth = STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(context);
            stack.len()
        });
        Self { depth }
    }
}

impl Drop for StaticContextGuard {
    fn drop(&mut self) {
        STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.len() != self.depth {
                tracing::error!(
                    expected = self.depth,
                    actual = stack.len(),
                    "static context stack out of order"
                );
            }
            stack.truncate(self.depth.saturating_sub(1));
        });
    }
}

/// Innermost static context on this thread.
#[must_use]
pub fn current() -> Option<StaticContext> {
    STACK.with(|stack| stack.borrow().last().cloned())
}

/// Number of static contexts on this thread.
#[must_use]
pub fn depth() -> usize {
    STACK.with(|stack| stack.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::TypeId;

    #[test]
    fn nested_guards_pop_in_order() {
        let outer = TypeId::new("Outer");
        let inner = TypeId::new("Inner");

        let _a = StaticContextGuard::enter(StaticContext::new(outer.clone(), "make"));
        {
            let _b = StaticContextGuard::enter(StaticContext::new(inner.clone(), "make"));
            assert_eq!(depth(), 2);
            assert_eq!(current().map(|c| c.declaring_type), Some(inner));
        }
        assert_eq!(depth(), 1);
        assert_eq!(current().map(|c| c.declaring_type), Some(outer));
    }

    #[test]
    fn popped_on_panic() {
        let ty = TypeId::new("Factory");

        let result = std::panic::catch_unwind(|| {
            let _g = StaticContextGuard::enter(StaticContext::new(ty, "explode"));
            panic!("boom");
        });

        assert!(result.is_err());
        assert_eq!(depth(), 0);
        assert!(current().is_none());
    }

    #[test]
    fn isolated_per_thread() {
        let ty = TypeId::new("Factory");
        let _g = StaticContextGuard::enter(StaticContext::new(ty, "build"));

        let seen = std::thread::spawn(current).join().expect("thread panicked");
        assert!(seen.is_none());
        assert!(current().is_some());
    }
}
