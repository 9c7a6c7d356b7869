//! The access-control facade.
//!
//! [`AccessControl`] owns the three registries, the checker, and the
//! trampoline, and exposes the registration contract:
//!
//! | Time | Call |
//! |------|------|
//! | type definition | [`declare_member`](AccessControl::declare_member), [`TypeBuilder`] |
//! | type composition | [`record_edge`](AccessControl::record_edge) |
//! | friend declaration | `grant_*_friend` |
//! | call | [`can_access`](AccessControl::can_access), [`invoke`](AccessControl::invoke) |
//!
//! # Example
//!
//! ```
//! use warden_runtime::AccessControl;
//! use warden_types::{AccessLevel, CallerInfo, InheritanceType};
//!
//! let ac = AccessControl::new();
//!
//! let base = ac
//!     .define("Base")
//!     .member("_step", AccessLevel::Protected)
//!     .member("__state", AccessLevel::Private)
//!     .commit()
//!     .unwrap();
//! let derived = ac
//!     .define("Derived")
//!     .base(&base, InheritanceType::Public)
//!     .member("run", AccessLevel::Public)
//!     .commit()
//!     .unwrap();
//!
//! let caller = CallerInfo::of(derived.clone(), "run");
//! assert!(ac.invoke(&caller, &base, "_step", Some(&derived), || ()).is_ok());
//! assert!(ac.invoke(&caller, &base, "__state", Some(&derived), || ()).is_err());
//! ```

use crate::auth::{
    AccessChecker, Decision, Declared, FriendshipRegistry, InheritanceEdge, InheritanceRegistry,
    MemberTable,
};
use crate::config::{ConfigLoader, WardenConfig};
use crate::error::WardenError;
use crate::events::{AccessEvent, EventSink, TracingSink};
use crate::identity::{CallerResolver, FrameStackResolver};
use crate::trampoline::Trampoline;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use warden_auth::{ConfigurationError, FriendGrant, FriendPolicy, Member};
use warden_types::{AccessLevel, CallerInfo, InheritanceType, MemberKind, TypeId};

/// Registry sizes, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessStats {
    /// Declared members.
    pub members: usize,
    /// Inheritance edges.
    pub edges: usize,
    /// Distinct friend grants.
    pub friend_grants: usize,
    /// Target types with at least one grant.
    pub friend_targets: usize,
}

/// Registries, checker, and trampoline for one process or test.
///
/// `Send + Sync`; share it through `Arc` or use [`AccessControl::global`].
#[derive(Debug)]
pub struct AccessControl {
    config: WardenConfig,
    friendship: Arc<FriendshipRegistry>,
    hierarchy: Arc<InheritanceRegistry>,
    members: Arc<MemberTable>,
    checker: AccessChecker,
    trampoline: Trampoline,
    sink: Option<Arc<dyn EventSink>>,
}

impl AccessControl {
    /// Creates an instance with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates an instance from `config`.
    #[must_use]
    pub fn with_config(config: WardenConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> AccessControlBuilder {
        AccessControlBuilder::default()
    }

    /// The process-wide instance.
    ///
    /// Configured on first use from [`ConfigLoader`] (global file plus
    /// `WARDEN_*` variables); falls back to defaults if loading fails.
    pub fn global() -> &'static AccessControl {
        static GLOBAL: OnceLock<AccessControl> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let config = ConfigLoader::new().load().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to load warden config; using defaults");
                WardenConfig::default()
            });
            tracing::info!(
                enforce = config.enforcement.enabled,
                events = config.events.enabled,
                "global access control initialized"
            );
            Self::with_config(config)
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// Friend grants.
    #[must_use]
    pub fn friendship(&self) -> &FriendshipRegistry {
        &self.friendship
    }

    /// Inheritance edges.
    #[must_use]
    pub fn hierarchy(&self) -> &InheritanceRegistry {
        &self.hierarchy
    }

    /// Declared members.
    #[must_use]
    pub fn members(&self) -> &MemberTable {
        &self.members
    }

    /// The decision function.
    #[must_use]
    pub fn checker(&self) -> &AccessChecker {
        &self.checker
    }

    /// The guarded-call runner.
    #[must_use]
    pub fn trampoline(&self) -> &Trampoline {
        &self.trampoline
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Declares an explicit instance method.
    ///
    /// # Errors
    ///
    /// See [`MemberTable::declare`].
    pub fn register_member(
        &self,
        owner: &TypeId,
        name: &str,
        level: AccessLevel,
    ) -> Result<Declared, ConfigurationError> {
        self.declare_member(Member::new(owner.clone(), name, level))
    }

    /// Declares a member.
    ///
    /// # Errors
    ///
    /// See [`MemberTable::declare`].
    pub fn declare_member(&self, member: Member) -> Result<Declared, ConfigurationError> {
        let outcome = self.members.declare(member.clone())?;
        if outcome != Declared::Unchanged {
            self.emit(|| AccessEvent::MemberDeclared { member });
        }
        Ok(outcome)
    }

    /// Records `derived : kind base`.
    ///
    /// # Errors
    ///
    /// See [`InheritanceRegistry::record_edge`].
    pub fn record_edge(
        &self,
        derived: &TypeId,
        base: &TypeId,
        kind: InheritanceType,
    ) -> Result<(), ConfigurationError> {
        self.hierarchy.record_edge(derived, base, kind)?;
        self.emit(|| AccessEvent::EdgeRecorded {
            edge: InheritanceEdge {
                derived: derived.clone(),
                base: base.clone(),
                kind,
            },
        });
        Ok(())
    }

    /// Makes every method of `friend` trusted by `target`.
    pub fn grant_type_friend(&self, target: &TypeId, friend: &TypeId) {
        self.grant(FriendGrant::Type {
            target: target.clone(),
            friend: friend.clone(),
        });
    }

    /// Makes `friend.method` trusted by `target`.
    ///
    /// The friend method itself is implicitly declared Public unless a
    /// level is declared for it explicitly.
    pub fn grant_method_friend(&self, target: &TypeId, friend: &TypeId, method: &str) {
        let implicit = Member::new(friend.clone(), method, AccessLevel::Public).implicit();
        if let Err(e) = self.declare_member(implicit) {
            // implicit declarations never conflict
            tracing::error!(error = %e, "implicit friend-method declaration failed");
        }
        self.grant(FriendGrant::Method {
            target: target.clone(),
            friend: friend.clone(),
            method: method.to_string(),
        });
    }

    /// Makes a free function trusted by `target`.
    pub fn grant_function_friend(&self, target: &TypeId, function: &str) {
        self.grant(FriendGrant::Function {
            target: target.clone(),
            function: function.to_string(),
        });
    }

    /// Makes the static method `owner.method` trusted by `target`.
    pub fn grant_static_friend(&self, target: &TypeId, owner: &TypeId, method: &str) {
        self.grant(FriendGrant::StaticContext {
            target: target.clone(),
            owner: owner.clone(),
            method: method.to_string(),
        });
    }

    fn grant(&self, grant: FriendGrant) {
        if self.friendship.grant(&grant) {
            tracing::info!(target_type = %grant.target(), kind = grant.kind_label(), "friendship established");
            self.emit(|| AccessEvent::FriendshipEstablished { grant });
        }
    }

    /// Starts declaring a new type named `name`.
    #[must_use]
    pub fn define(&self, name: &str) -> TypeBuilder<'_> {
        self.define_type(TypeId::new(name))
    }

    /// Starts declaring members, bases, and friends for an existing id.
    #[must_use]
    pub fn define_type(&self, ty: TypeId) -> TypeBuilder<'_> {
        TypeBuilder {
            control: self,
            ty,
            bases: Vec::new(),
            members: Vec::new(),
            grants: Vec::new(),
        }
    }

    // =========================================================================
    // Checks and calls
    // =========================================================================

    /// See [`AccessChecker::can_access`].
    ///
    /// # Errors
    ///
    /// See [`AccessChecker::can_access`].
    pub fn can_access(
        &self,
        declaring_type: &TypeId,
        member_name: &str,
        declared_level: AccessLevel,
        caller: &CallerInfo,
        instance_type: Option<&TypeId>,
    ) -> Result<bool, ConfigurationError> {
        self.checker
            .can_access(declaring_type, member_name, declared_level, caller, instance_type)
    }

    /// See [`AccessChecker::evaluate`].
    ///
    /// # Errors
    ///
    /// See [`AccessChecker::can_access`].
    pub fn evaluate(
        &self,
        declaring_type: &TypeId,
        member_name: &str,
        declared_level: AccessLevel,
        caller: &CallerInfo,
        instance_type: Option<&TypeId>,
    ) -> Result<Decision, ConfigurationError> {
        self.checker
            .evaluate(declaring_type, member_name, declared_level, caller, instance_type)
    }

    /// See [`Trampoline::invoke`].
    ///
    /// # Errors
    ///
    /// See [`Trampoline::invoke`].
    pub fn invoke<R>(
        &self,
        caller: &CallerInfo,
        owner: &TypeId,
        member: &str,
        instance: Option<&TypeId>,
        body: impl FnOnce() -> R,
    ) -> Result<R, WardenError> {
        self.trampoline.invoke(caller, owner, member, instance, body)
    }

    /// See [`Trampoline::invoke_resolved`].
    ///
    /// # Errors
    ///
    /// See [`Trampoline::invoke`].
    pub fn invoke_resolved<R>(
        &self,
        owner: &TypeId,
        member: &str,
        instance: Option<&TypeId>,
        body: impl FnOnce() -> R,
    ) -> Result<R, WardenError> {
        self.trampoline.invoke_resolved(owner, member, instance, body)
    }

    /// See [`Trampoline::dispatch`].
    ///
    /// # Errors
    ///
    /// See [`Trampoline::dispatch`].
    pub fn dispatch<R>(
        &self,
        caller: &CallerInfo,
        instance: &TypeId,
        name: &str,
        body: impl FnOnce() -> R,
    ) -> Result<R, WardenError> {
        self.trampoline.dispatch(caller, instance, name, body)
    }

    /// Registry sizes.
    #[must_use]
    pub fn stats(&self) -> AccessStats {
        AccessStats {
            members: self.members.len(),
            edges: self.hierarchy.edge_count(),
            friend_grants: self.friendship.grant_count(),
            friend_targets: self.friendship.target_count(),
        }
    }

    fn emit(&self, event: impl FnOnce() -> AccessEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(&event());
        }
    }
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`AccessControl`].
#[derive(Debug, Default)]
pub struct AccessControlBuilder {
    config: Option<WardenConfig>,
    sink: Option<Arc<dyn EventSink>>,
    resolver: Option<Arc<dyn CallerResolver>>,
}

impl AccessControlBuilder {
    /// Uses `config` instead of the defaults.
    #[must_use]
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sends events to `sink` regardless of `events.enabled`.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Uses `resolver` for [`AccessControl::invoke_resolved`].
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn CallerResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Builds the instance.
    #[must_use]
    pub fn build(self) -> AccessControl {
        let config = self.config.unwrap_or_default();

        let sink = self.sink.or_else(|| {
            config
                .events
                .enabled
                .then(|| Arc::new(TracingSink) as Arc<dyn EventSink>)
        });
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(FrameStackResolver::from_config(&config.resolver)));

        let friendship = Arc::new(FriendshipRegistry::new());
        let hierarchy = Arc::new(InheritanceRegistry::new());
        let members = Arc::new(MemberTable::new());

        let checker = AccessChecker::new(
            Arc::clone(&friendship) as Arc<dyn FriendPolicy>,
            Arc::clone(&hierarchy),
        )
        .with_permissive_identity(config.enforcement.permissive_unresolved_identity);

        let mut trampoline = Trampoline::new(
            Arc::clone(&members),
            Arc::clone(&hierarchy),
            checker.clone(),
            resolver,
        )
        .with_enforcement(config.enforcement.enabled);
        if let Some(sink) = &sink {
            trampoline = trampoline.with_sink(Arc::clone(sink));
        }

        AccessControl {
            config,
            friendship,
            hierarchy,
            members,
            checker,
            trampoline,
            sink,
        }
    }
}

/// Collects one type's bases, members, and friends, then registers them.
///
/// Replaces in-place decoration of type definitions: everything is stated
/// up front and committed in one call.
#[derive(Debug)]
#[must_use = "nothing is registered until commit() is called"]
pub struct TypeBuilder<'a> {
    control: &'a AccessControl,
    ty: TypeId,
    bases: Vec<(TypeId, InheritanceType)>,
    members: Vec<Member>,
    grants: Vec<FriendGrant>,
}

impl TypeBuilder<'_> {
    /// The id being defined.
    pub fn id(&self) -> &TypeId {
        &self.ty
    }

    /// Adds a direct base. Bases are recorded in the order added.
    pub fn base(mut self, base: &TypeId, kind: InheritanceType) -> Self {
        self.bases.push((base.clone(), kind));
        self
    }

    /// Adds an explicit instance method.
    pub fn member(self, name: &str, level: AccessLevel) -> Self {
        self.member_of_kind(name, level, MemberKind::Method)
    }

    /// Adds an explicit member of any kind.
    pub fn member_of_kind(mut self, name: &str, level: AccessLevel, kind: MemberKind) -> Self {
        self.members
            .push(Member::new(self.ty.clone(), name, level).with_kind(kind));
        self
    }

    /// Adds a static method.
    pub fn static_method(self, name: &str, level: AccessLevel) -> Self {
        self.member_of_kind(name, level, MemberKind::StaticMethod)
    }

    /// Adds a constructor.
    pub fn constructor(self, name: &str) -> Self {
        self.member_of_kind(name, AccessLevel::Public, MemberKind::Constructor)
    }

    /// Adds a member whose level follows its name (`__x`, `_x`, `x`).
    pub fn by_convention(mut self, name: &str) -> Self {
        self.members.push(Member::by_convention(self.ty.clone(), name));
        self
    }

    /// Trusts every method of `friend`.
    pub fn friend_type(mut self, friend: &TypeId) -> Self {
        self.grants.push(FriendGrant::Type {
            target: self.ty.clone(),
            friend: friend.clone(),
        });
        self
    }

    /// Trusts `friend.method`.
    pub fn friend_method(mut self, friend: &TypeId, method: &str) -> Self {
        self.grants.push(FriendGrant::Method {
            target: self.ty.clone(),
            friend: friend.clone(),
            method: method.to_string(),
        });
        self
    }

    /// Trusts a free function.
    pub fn friend_function(mut self, function: &str) -> Self {
        self.grants.push(FriendGrant::Function {
            target: self.ty.clone(),
            function: function.to_string(),
        });
        self
    }

    /// Trusts the static method `owner.method`.
    pub fn friend_static(mut self, owner: &TypeId, method: &str) -> Self {
        self.grants.push(FriendGrant::StaticContext {
            target: self.ty.clone(),
            owner: owner.clone(),
            method: method.to_string(),
        });
        self
    }

    /// Registers bases, then members, then friend grants.
    ///
    /// Stops at the first error; anything registered before it stays
    /// registered.
    ///
    /// # Errors
    ///
    /// The first [`ConfigurationError`] raised by an edge or a member.
    pub fn commit(self) -> Result<TypeId, ConfigurationError> {
        for (base, kind) in &self.bases {
            self.control.record_edge(&self.ty, base, *kind)?;
        }
        for member in self.members {
            self.control.declare_member(member)?;
        }
        for grant in self.grants {
            match grant {
                FriendGrant::Method {
                    target,
                    friend,
                    method,
                } => self.control.grant_method_friend(&target, &friend, &method),
                other => self.control.grant(other),
            }
        }

        tracing::debug!(ty = %self.ty, "type committed");
        Ok(self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;

    fn recording() -> (AccessControl, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let ac = AccessControl::builder()
            .sink(Arc::clone(&sink) as Arc<dyn EventSink>)
            .build();
        (ac, sink)
    }

    #[test]
    fn builder_commits_everything() {
        let (ac, sink) = recording();
        let auditor = TypeId::new("Auditor");

        let base = ac.define("Base").member("run", AccessLevel::Public).commit().expect("base");
        let derived = ac
            .define("Derived")
            .base(&base, InheritanceType::Protected)
            .member("__secret", AccessLevel::Private)
            .by_convention("_helper")
            .static_method("create", AccessLevel::Public)
            .friend_type(&auditor)
            .friend_function("dump")
            .commit()
            .expect("derived");

        assert_eq!(
            ac.stats(),
            AccessStats {
                members: 4,
                edges: 1,
                friend_grants: 2,
                friend_targets: 1,
            }
        );
        assert_eq!(
            ac.members().get(&derived, "_helper").map(|m| m.level),
            Some(AccessLevel::Protected)
        );
        assert_eq!(
            ac.hierarchy().direct_kind(&derived, &base),
            Some(InheritanceType::Protected)
        );

        let names: Vec<&str> = sink.events().iter().map(AccessEvent::name).collect();
        let count = |name: &str| names.iter().filter(|n| **n == name).count();
        assert_eq!(count("member_declared"), 4);
        assert_eq!(count("edge_recorded"), 1);
        assert_eq!(count("friendship_established"), 2);
    }

    #[test]
    fn repeated_grants_emit_once() {
        let (ac, sink) = recording();
        let (a, b) = (TypeId::new("A"), TypeId::new("B"));

        ac.grant_type_friend(&a, &b);
        ac.grant_type_friend(&a, &b);

        assert_eq!(ac.stats().friend_grants, 1);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn racing_grants_emit_once() {
        let (ac, sink) = recording();
        let ac = Arc::new(ac);
        let (vault, auditor) = (TypeId::new("Vault"), TypeId::new("Auditor"));
        let start = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (ac, start) = (Arc::clone(&ac), Arc::clone(&start));
                let (vault, auditor) = (vault.clone(), auditor.clone());
                std::thread::spawn(move || {
                    start.wait();
                    ac.grant_type_friend(&vault, &auditor);
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(ac.stats().friend_grants, 1);
        let established = sink
            .events()
            .iter()
            .filter(|e| matches!(e, AccessEvent::FriendshipEstablished { .. }))
            .count();
        assert_eq!(established, 1);
    }

    #[test]
    fn friend_method_is_implicitly_public_until_declared() {
        let ac = AccessControl::new();
        let (vault, auditor) = (TypeId::new("Vault"), TypeId::new("Auditor"));

        ac.grant_method_friend(&vault, &auditor, "inspect");
        assert_eq!(
            ac.members().get(&auditor, "inspect").map(|m| m.level),
            Some(AccessLevel::Public)
        );

        // one explicit override is allowed
        ac.register_member(&auditor, "inspect", AccessLevel::Protected)
            .expect("override");
        // a second explicit declaration conflicts
        let err = ac
            .register_member(&auditor, "inspect", AccessLevel::Private)
            .expect_err("conflict");
        assert!(matches!(err, ConfigurationError::ConflictingDeclaration { .. }));
    }

    #[test]
    fn builder_friend_method_declares_implicitly() {
        let ac = AccessControl::new();
        let auditor = ac
            .define("Auditor")
            .member("inspect", AccessLevel::Protected)
            .commit()
            .expect("auditor");
        let vault = ac
            .define("Vault")
            .friend_method(&auditor, "inspect")
            .commit()
            .expect("vault");

        // explicit level declared first is kept
        assert_eq!(
            ac.members().get(&auditor, "inspect").map(|m| m.level),
            Some(AccessLevel::Protected)
        );
        assert!(ac.friendship().is_friend_method(&vault, &auditor, "inspect"));
    }

    #[test]
    fn builder_rejects_cycle() {
        let ac = AccessControl::new();
        let a = ac.define("A").commit().expect("a");
        let b = ac.define("B").base(&a, InheritanceType::Public).commit().expect("b");

        let err = ac
            .define_type(a.clone())
            .base(&b, InheritanceType::Public)
            .commit()
            .expect_err("cycle");
        assert!(matches!(err, ConfigurationError::InheritanceCycle { .. }));
    }

    #[test]
    fn config_disables_enforcement() {
        let mut config = WardenConfig::default();
        config.enforcement.enabled = false;
        let ac = AccessControl::with_config(config);

        let vault = ac.define("Vault").member("__open", AccessLevel::Private).commit().expect("vault");
        let thief = CallerInfo::of(TypeId::new("Thief"), "steal");

        assert!(!ac.trampoline().is_enforcing());
        assert_eq!(ac.invoke(&thief, &vault, "__open", Some(&vault), || 1).expect("unchecked"), 1);
        // the decision function itself still answers
        assert!(!ac.can_access(&vault, "__open", AccessLevel::Private, &thief, Some(&vault)).expect("check"));
    }

    #[test]
    fn config_strict_identity() {
        let mut config = WardenConfig::default();
        config.enforcement.permissive_unresolved_identity = false;
        let ac = AccessControl::with_config(config);

        let vault = ac.define("Vault").member("_peek", AccessLevel::Protected).commit().expect("vault");
        let err = ac
            .invoke(&CallerInfo::unresolved(), &vault, "_peek", Some(&vault), || ())
            .expect_err("strict");
        assert!(err.is_denied());
    }

    #[test]
    fn events_disabled_by_default() {
        let ac = AccessControl::new();
        assert!(!ac.config().events.enabled);
        ac.define("Quiet").member("m", AccessLevel::Public).commit().expect("quiet");
        assert_eq!(ac.stats().members, 1);
    }

    #[test]
    fn shared_across_threads() {
        let ac = Arc::new(AccessControl::new());
        let ty = ac.define("Shared").member("__x", AccessLevel::Private).commit().expect("shared");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ac = Arc::clone(&ac);
                let ty = ty.clone();
                std::thread::spawn(move || {
                    let caller = CallerInfo::of(ty.clone(), "work");
                    ac.invoke(&caller, &ty, "__x", Some(&ty), || 1).expect("same type")
                })
            })
            .collect();

        let total: i32 = handles.into_iter().map(|h| h.join().expect("thread panicked")).sum();
        assert_eq!(total, 4);
    }
}
