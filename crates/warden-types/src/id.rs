//! Identifier types for warden.
//!
//! Every declared type gets a UUID-based identity. Display names are
//! carried along for diagnostics only and never participate in equality.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a declared type.
///
/// A `TypeId` is minted once, when the host declares the type, and is
/// then used as the key in every registry. Two types that happen to share
/// a display name (for example two `Node` classes declared in different
/// scopes) receive different UUIDs and never compare equal.
///
/// # Equality Semantics
///
/// `PartialEq` and `Hash` use the UUID only. For display-name comparison,
/// use [`name_eq`](Self::name_eq).
///
/// # Example
///
/// ```
/// use warden_types::TypeId;
///
/// let a = TypeId::new("Node");
/// let b = TypeId::new("Node");
///
/// assert_ne!(a, b);        // Distinct identities
/// assert!(a.name_eq(&b));  // Same display name
/// assert_eq!(a, a.clone());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeId {
    uuid: Uuid,
    name: String,
}

impl TypeId {
    /// Creates a new [`TypeId`] with a random UUID v4.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Reconstructs a [`TypeId`] from a known UUID.
    ///
    /// Hosts that persist their own type tables use this to rebuild the
    /// identity they minted earlier.
    #[must_use]
    pub fn from_parts(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compares two [`TypeId`]s by display name only, ignoring identity.
    #[must_use]
    pub fn name_eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl PartialEq for TypeId {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for TypeId {}

impl std::hash::Hash for TypeId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn same_name_distinct_identity() {
        let a = TypeId::new("Widget");
        let b = TypeId::new("Widget");

        assert_ne!(a, b);
        assert!(a.name_eq(&b));
        assert_ne!(a.uuid(), b.uuid());
    }

    #[test]
    fn clone_preserves_identity() {
        let a = TypeId::new("Widget");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn hash_uses_identity_only() {
        let a = TypeId::new("Widget");
        let b = TypeId::new("Widget");

        let mut set = HashSet::new();
        set.insert(a.clone());
        set.insert(b);
        set.insert(a);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn from_parts_roundtrip() {
        let a = TypeId::new("Widget");
        let rebuilt = TypeId::from_parts(a.uuid(), "Renamed");

        assert_eq!(a, rebuilt);
        assert!(!a.name_eq(&rebuilt));
    }

    #[test]
    fn display_is_name() {
        let a = TypeId::new("Widget");
        assert_eq!(a.to_string(), "Widget");
    }

    #[test]
    fn serde_roundtrip() {
        let a = TypeId::new("Widget");
        let json = serde_json::to_string(&a).expect("serialize");
        let parsed: TypeId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, a);
        assert_eq!(parsed.name(), "Widget");
    }
}
