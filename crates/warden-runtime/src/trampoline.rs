//! Guarded member invocation.
//!
//! The [`Trampoline`] stands between a call site and a guarded member body:
//!
//! ```text
//! call site ──► Trampoline::invoke
//!                 │ 1. look the member up in the MemberTable
//!                 │ 2. AccessChecker::can_access (unless enforcement is off)
//!                 │ 3. denied  → Err(WardenError::Denied)
//!                 │ 4. allowed → push CallFrame (+ StaticContext for static
//!                 │              methods), run body, pop on every exit path
//!                 ▼
//!               body()
//! ```
//!
//! Because the frame is pushed while the body runs, guarded members that
//! call other guarded members through [`Trampoline::invoke_resolved`] are
//! identified automatically.

use crate::auth::{AccessChecker, InheritanceRegistry, MemberTable, StaticContextGuard};
use crate::error::WardenError;
use crate::events::{AccessEvent, EventSink};
use crate::identity::{CallFrame, CallerResolver, FrameGuard};
use std::sync::Arc;
use warden_auth::{AccessDenied, ConfigurationError, Member, StaticContext};
use warden_types::{CallerInfo, MemberKind, TypeId};

/// Runs guarded member bodies after an access check.
///
/// Cloning shares the underlying registries.
#[derive(Debug, Clone)]
pub struct Trampoline {
    members: Arc<MemberTable>,
    hierarchy: Arc<InheritanceRegistry>,
    checker: AccessChecker,
    resolver: Arc<dyn CallerResolver>,
    sink: Option<Arc<dyn EventSink>>,
    enforce: bool,
}

impl Trampoline {
    /// Creates an enforcing trampoline that emits no events.
    #[must_use]
    pub fn new(
        members: Arc<MemberTable>,
        hierarchy: Arc<InheritanceRegistry>,
        checker: AccessChecker,
        resolver: Arc<dyn CallerResolver>,
    ) -> Self {
        Self {
            members,
            hierarchy,
            checker,
            resolver,
            sink: None,
            enforce: true,
        }
    }

    /// Sends access events to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Turns the access check on or off.
    #[must_use]
    pub fn with_enforcement(mut self, enabled: bool) -> Self {
        self.enforce = enabled;
        self
    }

    /// Returns `true` if calls are checked.
    #[must_use]
    pub fn is_enforcing(&self) -> bool {
        self.enforce
    }

    /// Checks access to `owner.member` for `caller`, then runs `body`.
    ///
    /// `instance` is the runtime type of the receiver. It is ignored for
    /// static methods.
    ///
    /// # Errors
    ///
    /// - [`WardenError::Denied`] if the caller may not reach the member
    /// - [`WardenError::Configuration`] if the member is not registered or
    ///   `owner` is not reachable from `instance`
    pub fn invoke<R>(
        &self,
        caller: &CallerInfo,
        owner: &TypeId,
        member: &str,
        instance: Option<&TypeId>,
        body: impl FnOnce() -> R,
    ) -> Result<R, WardenError> {
        let declared = self
            .members
            .get(owner, member)
            .ok_or_else(|| ConfigurationError::UnknownMember {
                ty: owner.name().to_string(),
                member: member.to_string(),
            })?;
        self.run(caller, &declared, instance, body)
    }

    /// Like [`invoke`](Self::invoke), with the caller supplied by the
    /// configured [`CallerResolver`].
    ///
    /// # Errors
    ///
    /// See [`invoke`](Self::invoke).
    pub fn invoke_resolved<R>(
        &self,
        owner: &TypeId,
        member: &str,
        instance: Option<&TypeId>,
        body: impl FnOnce() -> R,
    ) -> Result<R, WardenError> {
        let caller = self.resolver.resolve();
        self.invoke(&caller, owner, member, instance, body)
    }

    /// Calls `name` on an object of type `instance`, finding the declaring
    /// type through the method-resolution order first.
    ///
    /// # Errors
    ///
    /// See [`invoke`](Self::invoke); also
    /// [`ConfigurationError::InconsistentHierarchy`] when `instance` has no
    /// linearization.
    pub fn dispatch<R>(
        &self,
        caller: &CallerInfo,
        instance: &TypeId,
        name: &str,
        body: impl FnOnce() -> R,
    ) -> Result<R, WardenError> {
        let declared = self.members.resolve(instance, name, &self.hierarchy)?;
        self.run(caller, &declared, Some(instance), body)
    }

    fn run<R>(
        &self,
        caller: &CallerInfo,
        member: &Member,
        instance: Option<&TypeId>,
        body: impl FnOnce() -> R,
    ) -> Result<R, WardenError> {
        let instance = if member.kind.is_receiverless() {
            None
        } else {
            instance
        };

        if self.enforce {
            let allowed = self.checker.can_access(
                &member.owner,
                &member.name,
                member.level,
                caller,
                instance,
            )?;

            if !allowed {
                self.emit(|| AccessEvent::AccessDenied {
                    owner: member.owner.name().to_string(),
                    member: member.name.clone(),
                    level: member.level,
                    kind: member.kind,
                    caller: caller.to_string(),
                });
                return Err(AccessDenied::new(
                    member.level,
                    member.kind,
                    member.owner.name(),
                    member.name.clone(),
                )
                .with_caller(caller.to_string())
                .into());
            }
        }

        self.emit(|| AccessEvent::AccessAllowed {
            owner: member.owner.name().to_string(),
            member: member.name.clone(),
            level: member.level,
            kind: member.kind,
            caller: caller.to_string(),
        });

        let _frame = FrameGuard::push(CallFrame::member(
            member.owner.clone(),
            member.name.clone(),
            member.kind,
        ));
        let _static = (member.kind == MemberKind::StaticMethod).then(|| {
            StaticContextGuard::enter(StaticContext::new(member.owner.clone(), member.name.clone()))
        });

        Ok(body())
    }

    fn emit(&self, event: impl FnOnce() -> AccessEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(&event());
        }
    }
}
