//! Default implementation of [`FriendPolicy`].
//!
//! Provides [`FriendshipRegistry`], a thread-safe, in-memory store of
//! friend grants keyed by target [`TypeId`].
//!
//! # Architecture
//!
//! ```text
//! FriendPolicy trait (warden-auth)        ← abstract definition
//!          │
//!          └── FriendshipRegistry (THIS MODULE)  ← concrete impl
//! ```

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use warden_auth::{FriendGrant, FriendPolicy, StaticContext};
use warden_types::TypeId;

/// Grants extended by one target type.
#[derive(Debug, Default)]
struct TargetGrants {
    types: HashSet<TypeId>,
    methods: HashSet<(TypeId, String)>,
    functions: HashSet<String>,
    statics: HashSet<(TypeId, String)>,
}

impl TargetGrants {
    fn len(&self) -> usize {
        self.types.len() + self.methods.len() + self.functions.len() + self.statics.len()
    }
}

/// Thread-safe, in-memory friend grant store.
///
/// Writes take the lock exclusively; checks take it shared, so concurrent
/// access checks never block each other.
///
/// # Example
///
/// ```
/// use warden_auth::FriendPolicy;
/// use warden_runtime::FriendshipRegistry;
/// use warden_types::TypeId;
///
/// let registry = FriendshipRegistry::new();
/// let vault = TypeId::new("Vault");
/// let auditor = TypeId::new("Auditor");
///
/// registry.grant_type_friend(&vault, &auditor);
/// registry.grant_type_friend(&vault, &auditor); // idempotent
///
/// assert!(registry.is_friend_type(&vault, &auditor));
/// assert_eq!(registry.grant_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FriendshipRegistry {
    grants: RwLock<HashMap<TypeId, TargetGrants>>,
}

impl FriendshipRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every grant in `grants` (additive merge).
    pub fn extend(&self, grants: &[FriendGrant]) {
        for grant in grants {
            self.grant(grant);
        }
    }

    fn insert_with<F>(&self, target: &TypeId, label: &'static str, insert: F) -> bool
    where
        F: FnOnce(&mut TargetGrants) -> bool,
    {
        let mut map = self.grants.write();
        let entry = map.entry(target.clone()).or_default();
        let inserted = insert(entry);
        if inserted {
            tracing::debug!(target = %target, kind = label, "friend grant recorded");
        }
        inserted
    }
}

impl FriendPolicy for FriendshipRegistry {
    fn grant_type_friend(&self, target: &TypeId, friend: &TypeId) -> bool {
        self.insert_with(target, "type", |g| g.types.insert(friend.clone()))
    }

    fn grant_method_friend(&self, target: &TypeId, friend: &TypeId, method: &str) -> bool {
        self.insert_with(target, "method", |g| {
            g.methods.insert((friend.clone(), method.to_string()))
        })
    }

    fn grant_function_friend(&self, target: &TypeId, function: &str) -> bool {
        self.insert_with(target, "function", |g| g.functions.insert(function.to_string()))
    }

    fn grant_static_friend(&self, target: &TypeId, owner: &TypeId, method: &str) -> bool {
        self.insert_with(target, "static", |g| {
            g.statics.insert((owner.clone(), method.to_string()))
        })
    }

    fn is_friend_type(&self, target: &TypeId, caller: &TypeId) -> bool {
        self.grants
            .read()
            .get(target)
            .is_some_and(|g| g.types.contains(caller))
    }

    fn is_friend_method(&self, target: &TypeId, caller_type: &TypeId, caller_method: &str) -> bool {
        self.grants.read().get(target).is_some_and(|g| {
            g.methods
                .iter()
                .any(|(ty, m)| ty == caller_type && m == caller_method)
        })
    }

    fn is_friend_function(&self, target: &TypeId, function: &str) -> bool {
        self.grants
            .read()
            .get(target)
            .is_some_and(|g| g.functions.contains(function))
    }

    fn is_static_friend(&self, target: &TypeId, context: &StaticContext) -> bool {
        self.grants.read().get(target).is_some_and(|g| {
            g.statics
                .iter()
                .any(|(ty, m)| *ty == context.declaring_type && *m == context.method_name)
        })
    }

    fn grant_count(&self) -> usize {
        self.grants.read().values().map(TargetGrants::len).sum()
    }

    fn target_count(&self) -> usize {
        self.grants
            .read()
            .values()
            .filter(|g| g.len() > 0)
            .count()
    }

    fn list_grants(&self) -> Vec<FriendGrant> {
        let map = self.grants.read();
        let mut out = Vec::new();
        for (target, g) in map.iter() {
            out.extend(g.types.iter().map(|friend| FriendGrant::Type {
                target: target.clone(),
                friend: friend.clone(),
            }));
            out.extend(g.methods.iter().map(|(friend, method)| FriendGrant::Method {
                target: target.clone(),
                friend: friend.clone(),
                method: method.clone(),
            }));
            out.extend(g.functions.iter().map(|function| FriendGrant::Function {
                target: target.clone(),
                function: function.clone(),
            }));
            out.extend(g.statics.iter().map(|(owner, method)| FriendGrant::StaticContext {
                target: target.clone(),
                owner: owner.clone(),
                method: method.clone(),
            }));
        }
        out
    }
}
