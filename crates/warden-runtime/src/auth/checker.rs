//! Access decisions.
//!
//! [`AccessChecker`] combines the friendship policy, the inheritance
//! registry, and a [`CallerInfo`] into an allow/deny verdict for one member
//! access. Rules run in a fixed order and the first one that decides wins:
//!
//! | Step | Rule | Applies to |
//! |------|------|------------|
//! | 1 | Friend grant (type, method, function, static context) | Protected, Private |
//! | 2 | Constructor chain, then exact same type; otherwise deny | Private |
//! | 3 | Caller is the declaring type | Protected, Public |
//! | 4 | Caller descends from the declaring type | Protected, Public |
//! | 5 | Effective visibility through the instance type | Protected, Public |
//!
//! # Caller Identity
//!
//! Before the rules run, the caller is normalized:
//!
//! - a caller with no type whose method matches the innermost
//!   [`StaticContext`](warden_auth::StaticContext) on this thread takes the
//!   identity of that static method
//! - a fully unresolved caller with a receiver object is treated as the
//!   receiver's own type when permissive identity is enabled
//!
//! # Audit Logging
//!
//! Every decision is logged:
//! - Allowed accesses: debug level
//! - Denied accesses: warn level

use super::context;
use super::inheritance::InheritanceRegistry;
use std::sync::Arc;
use warden_auth::{ConfigurationError, FriendPolicy, StaticContext};
use warden_types::{AccessLevel, CallerInfo, TypeId, SAME_TYPE_ACCESS};

/// The rule that settled a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// The caller's type is a friend of the declaring type.
    FriendType,
    /// The caller's method is a friend of the declaring type.
    FriendMethod,
    /// The calling free function is a friend of the declaring type.
    FriendFunction,
    /// The executing static method is a friend of the declaring type.
    StaticFriend,
    /// Base constructor running during construction of a related object.
    ConstructorChain,
    /// Caller is the declaring type.
    SameType,
    /// Caller descends from the declaring type.
    Descendant,
    /// Effectively public through the instance type.
    EffectivelyPublic,
    /// Caller is a base of the declaring type.
    BaseOfDeclaring,
    /// Private member outside its exact declaring type.
    PrivateStrict,
    /// Protected member reached by unrelated or hidden code.
    NotInHierarchy,
    /// Member is effectively private through the instance type.
    EffectivelyPrivate,
}

impl Rule {
    /// Short identifier for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FriendType => "friend_type",
            Self::FriendMethod => "friend_method",
            Self::FriendFunction => "friend_function",
            Self::StaticFriend => "static_friend",
            Self::ConstructorChain => "constructor_chain",
            Self::SameType => "same_type",
            Self::Descendant => "descendant",
            Self::EffectivelyPublic => "effectively_public",
            Self::BaseOfDeclaring => "base_of_declaring",
            Self::PrivateStrict => "private_strict",
            Self::NotInHierarchy => "not_in_hierarchy",
            Self::EffectivelyPrivate => "effectively_private",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the access may proceed.
    pub allowed: bool,
    /// Rule that settled it.
    pub rule: Rule,
}

impl Decision {
    fn allow(rule: Rule) -> Self {
        Self {
            allowed: true,
            rule,
        }
    }

    fn deny(rule: Rule) -> Self {
        Self {
            allowed: false,
            rule,
        }
    }
}

/// The access decision function.
///
/// Holds shared handles to the registries; cloning is cheap.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_runtime::{AccessChecker, FriendshipRegistry, InheritanceRegistry};
/// use warden_types::{AccessLevel, CallerInfo, InheritanceType, TypeId};
///
/// let friends = Arc::new(FriendshipRegistry::new());
/// let hierarchy = Arc::new(InheritanceRegistry::new());
/// let checker = AccessChecker::new(friends, Arc::clone(&hierarchy));
///
/// let base = TypeId::new("Base");
/// let derived = TypeId::new("Derived");
/// hierarchy.record_edge(&derived, &base, InheritanceType::Public).unwrap();
///
/// let caller = CallerInfo::of(derived.clone(), "work");
/// assert!(checker
///     .can_access(&base, "_helper", AccessLevel::Protected, &caller, Some(&derived))
///     .unwrap());
/// assert!(!checker
///     .can_access(&base, "__secret", AccessLevel::Private, &caller, Some(&derived))
///     .unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct AccessChecker {
    friendship: Arc<dyn FriendPolicy>,
    hierarchy: Arc<InheritanceRegistry>,
    permissive_identity: bool,
}

impl AccessChecker {
    /// Creates a checker with permissive identity enabled.
    #[must_use]
    pub fn new(friendship: Arc<dyn FriendPolicy>, hierarchy: Arc<InheritanceRegistry>) -> Self {
        Self {
            friendship,
            hierarchy,
            permissive_identity: true,
        }
    }

    /// Sets whether an unresolved caller with a receiver is treated as the
    /// receiver's own type.
    #[must_use]
    pub fn with_permissive_identity(mut self, enabled: bool) -> Self {
        self.permissive_identity = enabled;
        self
    }

    /// Returns `true` if unresolved callers degrade to same-type access.
    #[must_use]
    pub fn permissive_identity(&self) -> bool {
        self.permissive_identity
    }

    /// Returns `true` if `caller` may access the member.
    ///
    /// `instance_type` is the runtime type of the receiver, or `None` for
    /// receiverless members.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnreachableDeclaringType`] if `declaring_type`
    /// is neither `instance_type` nor one of its ancestors.
    pub fn can_access(
        &self,
        declaring_type: &TypeId,
        member_name: &str,
        declared_level: AccessLevel,
        caller: &CallerInfo,
        instance_type: Option<&TypeId>,
    ) -> Result<bool, ConfigurationError> {
        self.evaluate(declaring_type, member_name, declared_level, caller, instance_type)
            .map(|d| d.allowed)
    }

    /// Like [`can_access`](Self::can_access), also reporting the deciding
    /// rule.
    ///
    /// # Errors
    ///
    /// See [`can_access`](Self::can_access).
    pub fn evaluate(
        &self,
        declaring_type: &TypeId,
        member_name: &str,
        declared_level: AccessLevel,
        caller: &CallerInfo,
        instance_type: Option<&TypeId>,
    ) -> Result<Decision, ConfigurationError> {
        if let Some(instance) = instance_type {
            if instance != declaring_type && !self.hierarchy.is_descendant(instance, declaring_type)
            {
                return Err(ConfigurationError::UnreachableDeclaringType {
                    declaring: declaring_type.name().to_string(),
                    instance: instance.name().to_string(),
                });
            }
        }

        let static_ctx = context::current().filter(|ctx| {
            caller.caller_type.is_none()
                && caller
                    .caller_method
                    .as_deref()
                    .map_or(true, |m| m == ctx.method_name)
        });
        let effective = self.effective_caller(caller, static_ctx.as_ref(), instance_type);

        let decision = self.decide(
            declaring_type,
            member_name,
            declared_level,
            caller,
            &effective,
            static_ctx.as_ref(),
            instance_type,
        )?;

        if decision.allowed {
            tracing::debug!(
                owner = %declaring_type,
                member = member_name,
                level = %declared_level,
                caller = %effective,
                rule = %decision.rule,
                "access allowed"
            );
        } else {
            tracing::warn!(
                owner = %declaring_type,
                member = member_name,
                level = %declared_level,
                caller = %effective,
                instance = ?instance_type.map(TypeId::name),
                rule = %decision.rule,
                "access denied"
            );
        }

        Ok(decision)
    }

    fn effective_caller(
        &self,
        caller: &CallerInfo,
        static_ctx: Option<&StaticContext>,
        instance_type: Option<&TypeId>,
    ) -> CallerInfo {
        if let Some(ctx) = static_ctx {
            return CallerInfo::of(ctx.declaring_type.clone(), ctx.method_name.clone());
        }
        match instance_type {
            Some(instance) if caller.is_unresolved() && self.permissive_identity => {
                tracing::debug!(
                    instance = %instance,
                    "caller unresolved; assuming same-type access"
                );
                CallerInfo::of(instance.clone(), SAME_TYPE_ACCESS)
            }
            _ => caller.clone(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn decide(
        &self,
        declaring_type: &TypeId,
        member_name: &str,
        declared_level: AccessLevel,
        original: &CallerInfo,
        caller: &CallerInfo,
        static_ctx: Option<&StaticContext>,
        instance_type: Option<&TypeId>,
    ) -> Result<Decision, ConfigurationError> {
        // Step 1: friend grants override structural rules
        if declared_level != AccessLevel::Public {
            if let Some(rule) = self.friend_rule(declaring_type, original, caller, static_ctx) {
                return Ok(Decision::allow(rule));
            }
        }

        let caller_type = caller.caller_type.as_ref();

        // Step 2: private members never fall through
        if declared_level == AccessLevel::Private {
            if caller.is_constructor() {
                let related = instance_type.map_or(true, |instance| {
                    instance == declaring_type
                        || self.hierarchy.are_related(instance, declaring_type)
                });
                if related {
                    return Ok(Decision::allow(Rule::ConstructorChain));
                }
            }

            let own_code = caller_type == Some(declaring_type);
            if own_code && instance_type.map_or(true, |instance| instance == declaring_type) {
                return Ok(Decision::allow(Rule::SameType));
            }

            return Ok(Decision::deny(Rule::PrivateStrict));
        }

        // Step 3
        if caller_type == Some(declaring_type) {
            return Ok(Decision::allow(Rule::SameType));
        }

        // Step 4: every inheritance kind passes protected and public to the
        // derived type's own code
        if let Some(ct) = caller_type {
            if self.hierarchy.is_descendant(ct, declaring_type) {
                return Ok(Decision::allow(Rule::Descendant));
            }
        }

        // Step 5
        let instance = instance_type.unwrap_or(declaring_type);
        let effective =
            self.hierarchy
                .effective_visibility(instance, member_name, declared_level, declaring_type)?;

        Ok(match effective {
            AccessLevel::Public => Decision::allow(Rule::EffectivelyPublic),
            AccessLevel::Protected => match caller_type {
                Some(ct) if self.hierarchy.is_descendant(declaring_type, ct) => {
                    Decision::allow(Rule::BaseOfDeclaring)
                }
                _ => Decision::deny(Rule::NotInHierarchy),
            },
            AccessLevel::Private => Decision::deny(Rule::EffectivelyPrivate),
        })
    }

    fn friend_rule(
        &self,
        declaring_type: &TypeId,
        original: &CallerInfo,
        caller: &CallerInfo,
        static_ctx: Option<&StaticContext>,
    ) -> Option<Rule> {
        if let Some(ct) = caller.caller_type.as_ref() {
            if self.friendship.is_friend_type(declaring_type, ct) {
                return Some(Rule::FriendType);
            }
            if let Some(m) = caller.caller_method.as_deref() {
                if self.friendship.is_friend_method(declaring_type, ct, m) {
                    return Some(Rule::FriendMethod);
                }
            }
        }

        if let Some(ctx) = static_ctx {
            if self.friendship.is_static_friend(declaring_type, ctx) {
                return Some(Rule::StaticFriend);
            }
        }

        if original.caller_type.is_none() {
            if let Some(function) = original.caller_method.as_deref() {
                if self.friendship.is_friend_function(declaring_type, function) {
                    return Some(Rule::FriendFunction);
                }
            }
        }

        None
    }
}
