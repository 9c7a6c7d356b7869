//! Caller identity resolution.
//!
//! Identity comes from an explicit per-thread frame stack rather than from
//! stack unwinding: the trampoline pushes a [`CallFrame`] for every guarded
//! body it runs, and a [`CallerResolver`] reads the stack to find out who is
//! calling.
//!
//! ```text
//! thread frame stack (innermost last)
//!   Account.deposit         Method        → caller_type = Account
//!   harness::run_case       module "test" → skipped (denylisted module)
//!   Ledger.open             StaticMethod  → caller_type = None
//! ```
//!
//! Code that knows its own identity can skip the stack entirely with
//! [`FixedResolver`].

use crate::config::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use warden_types::{CallerInfo, MemberKind, TypeId, CONSTRUCTOR};

thread_local! {
    static FRAMES: RefCell<Vec<CallFrame>> = const { RefCell::new(Vec::new()) };
}

/// One executing body on the frame stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFrame {
    /// Type whose body is executing, if any.
    pub owner: Option<TypeId>,
    /// Member or function name.
    pub function: String,
    /// Shape of the executing member.
    pub kind: MemberKind,
    /// Module path of the code, used by the denylist.
    pub module: Option<String>,
}

impl CallFrame {
    /// A member body of `owner`.
    #[must_use]
    pub fn member(owner: TypeId, function: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            owner: Some(owner),
            function: function.into(),
            kind,
            module: None,
        }
    }

    /// A free function.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            owner: None,
            function: name.into(),
            kind: MemberKind::StaticMethod,
            module: None,
        }
    }

    /// Sets the module path.
    #[must_use]
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Identity this frame reports.
    ///
    /// Static methods and free functions carry no type; constructors report
    /// the well-known constructor name.
    #[must_use]
    pub fn caller_info(&self) -> CallerInfo {
        match self.kind {
            MemberKind::StaticMethod => CallerInfo::function(self.function.clone()),
            MemberKind::Constructor => match &self.owner {
                Some(owner) => CallerInfo::of(owner.clone(), CONSTRUCTOR),
                None => CallerInfo::function(CONSTRUCTOR),
            },
            MemberKind::Method | MemberKind::ClassMethod | MemberKind::Property => {
                match &self.owner {
                    Some(owner) => CallerInfo::of(owner.clone(), self.function.clone()),
                    None => CallerInfo::function(self.function.clone()),
                }
            }
        }
    }
}

/// Scoped entry on the current thread's frame stack.
///
/// # Example
///
/// ```
/// use warden_runtime::identity::{frame_depth, CallFrame, FrameGuard};
///
/// {
///     let _frame = FrameGuard::push(CallFrame::function("main_loop"));
///     assert_eq!(frame_depth(), 1);
/// }
/// assert_eq!(frame_depth(), 0);
/// ```
#[derive(Debug)]
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    depth: usize,
}

impl FrameGuard {
    /// Pushes `frame` for the current thread.
    pub fn push(frame: CallFrame) -> Self {
        let depth = FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            frames.push(frame);
            frames.len()
        });
        Self { depth }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            if frames.len() != self.depth {
                tracing::error!(
                    expected = self.depth,
                    actual = frames.len(),
                    "call frame stack out of order"
                );
            }
            frames.truncate(self.depth.saturating_sub(1));
        });
    }
}

/// Number of frames on this thread.
#[must_use]
pub fn frame_depth() -> usize {
    FRAMES.with(|frames| frames.borrow().len())
}

/// Copy of this thread's frames, innermost last.
#[must_use]
pub fn frames() -> Vec<CallFrame> {
    FRAMES.with(|frames| frames.borrow().clone())
}

/// Supplies the identity of the code making a call.
pub trait CallerResolver: Send + Sync + std::fmt::Debug {
    /// Identity of the current caller, or [`CallerInfo::unresolved`].
    fn resolve(&self) -> CallerInfo;
}

/// Resolves the nearest frame not excluded by the denylist.
///
/// A free (ownerless) frame is skipped when its function name is listed.
/// Any frame is skipped when its module equals or lives under a listed
/// module prefix. Member frames pushed by the trampoline are never skipped
/// by name, so a member called `dispatch` still reports itself.
#[derive(Debug, Clone, Default)]
pub struct FrameStackResolver {
    skip_functions: HashSet<String>,
    skip_modules: Vec<String>,
}

impl FrameStackResolver {
    /// Creates a resolver with an empty denylist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver from configuration.
    #[must_use]
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            skip_functions: config.skip_functions.iter().cloned().collect(),
            skip_modules: config.skip_modules.clone(),
        }
    }

    /// Adds a function name to the denylist.
    #[must_use]
    pub fn skip_function(mut self, name: impl Into<String>) -> Self {
        self.skip_functions.insert(name.into());
        self
    }

    /// Adds a module prefix to the denylist.
    #[must_use]
    pub fn skip_module(mut self, prefix: impl Into<String>) -> Self {
        self.skip_modules.push(prefix.into());
        self
    }

    /// Returns `true` if `frame` is excluded.
    #[must_use]
    pub fn is_skipped(&self, frame: &CallFrame) -> bool {
        // member frames are guarded user code; only free frames match by name
        if frame.owner.is_none() && self.skip_functions.contains(&frame.function) {
            return true;
        }
        frame.module.as_deref().is_some_and(|module| {
            self.skip_modules.iter().any(|prefix| {
                module == prefix
                    || module
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with("::"))
            })
        })
    }
}

impl CallerResolver for FrameStackResolver {
    fn resolve(&self) -> CallerInfo {
        FRAMES.with(|frames| {
            frames
                .borrow()
                .iter()
                .rev()
                .find(|frame| !self.is_skipped(frame))
                .map(CallFrame::caller_info)
                .unwrap_or_default()
        })
    }
}

/// Always reports the same caller.
#[derive(Debug, Clone, Default)]
pub struct FixedResolver(pub CallerInfo);

impl CallerResolver for FixedResolver {
    fn resolve(&self) -> CallerInfo {
        self.0.clone()
    }
}
