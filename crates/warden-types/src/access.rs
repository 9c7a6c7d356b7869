//! Visibility vocabulary: access levels, inheritance kinds, member kinds.
//!
//! # Composition
//!
//! A member declared at some [`AccessLevel`] and inherited across an edge
//! of some [`InheritanceType`] is seen from outside the hierarchy at the
//! more restrictive of the two:
//!
//! ```text
//!                   edge: Public    Protected   Private
//! declared Public   ->    Public    Protected   Private
//! declared Protected->    Protected Protected   Private
//! declared Private  ->    Private   Private     Private
//! ```

use serde::{Deserialize, Serialize};

/// Declared visibility of a member.
///
/// Ordered by restrictiveness: `Public < Protected < Private`.
///
/// # Example
///
/// ```
/// use warden_types::{AccessLevel, InheritanceType};
///
/// assert!(AccessLevel::Private > AccessLevel::Protected);
/// assert_eq!(
///     AccessLevel::Public.through(InheritanceType::Protected),
///     AccessLevel::Protected
/// );
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Reachable from anywhere.
    #[default]
    Public,
    /// Reachable from the declaring type, its descendants, and friends.
    Protected,
    /// Reachable from the declaring type and friends only.
    Private,
}

impl AccessLevel {
    /// Returns the more restrictive of two levels.
    #[must_use]
    pub fn max_restrictiveness(self, other: Self) -> Self {
        self.max(other)
    }

    /// Composes this level with one inheritance edge.
    #[must_use]
    pub fn through(self, kind: InheritanceType) -> Self {
        self.max_restrictiveness(kind.as_access_level())
    }

    /// Detects a level from naming conventions.
    ///
    /// | Name | Level |
    /// |------|-------|
    /// | `__name__` (dunder) | Public |
    /// | `__name` | Private |
    /// | `_name` | Protected |
    /// | `name` | Public |
    ///
    /// # Example
    ///
    /// ```
    /// use warden_types::AccessLevel;
    ///
    /// assert_eq!(AccessLevel::from_naming_convention("__secret"), AccessLevel::Private);
    /// assert_eq!(AccessLevel::from_naming_convention("_helper"), AccessLevel::Protected);
    /// assert_eq!(AccessLevel::from_naming_convention("__init__"), AccessLevel::Public);
    /// assert_eq!(AccessLevel::from_naming_convention("run"), AccessLevel::Public);
    /// ```
    #[must_use]
    pub fn from_naming_convention(name: &str) -> Self {
        let dunder = name.len() > 4 && name.starts_with("__") && name.ends_with("__");
        if dunder {
            Self::Public
        } else if name.starts_with("__") {
            Self::Private
        } else if name.starts_with('_') {
            Self::Protected
        } else {
            Self::Public
        }
    }

    /// Returns the lower-case keyword.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }

    /// Returns `true` for [`AccessLevel::Private`].
    #[must_use]
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private)
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility keyword on one inheritance edge, mirroring C++
/// `class D : public B`, `: protected B`, `: private B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InheritanceType {
    /// Inherited members keep their declared level.
    #[default]
    Public,
    /// Inherited members are capped at Protected.
    Protected,
    /// Inherited members become Private to the derived type.
    Private,
}

impl InheritanceType {
    /// Returns the access level this edge caps inherited members at.
    #[must_use]
    pub fn as_access_level(self) -> AccessLevel {
        match self {
            Self::Public => AccessLevel::Public,
            Self::Protected => AccessLevel::Protected,
            Self::Private => AccessLevel::Private,
        }
    }

    /// Returns the more restrictive of two edge kinds.
    #[must_use]
    pub fn compose(self, other: Self) -> Self {
        if self.as_access_level() >= other.as_access_level() {
            self
        } else {
            other
        }
    }

    /// Returns the lower-case keyword.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.as_access_level().as_str()
    }
}

impl From<AccessLevel> for InheritanceType {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::Public => Self::Public,
            AccessLevel::Protected => Self::Protected,
            AccessLevel::Private => Self::Private,
        }
    }
}

impl std::fmt::Display for InheritanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a guarded member, reported in denial diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Instance method (has a receiver).
    #[default]
    Method,
    /// Static method (no receiver).
    StaticMethod,
    /// Class-bound method.
    ClassMethod,
    /// Property accessor.
    Property,
    /// Constructor / initializer.
    Constructor,
}

impl MemberKind {
    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::StaticMethod => "static method",
            Self::ClassMethod => "class method",
            Self::Property => "property",
            Self::Constructor => "constructor",
        }
    }

    /// Returns `true` if calls of this kind carry no receiver object.
    #[must_use]
    pub fn is_receiverless(&self) -> bool {
        matches!(self, Self::StaticMethod)
    }
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_by_restrictiveness() {
        assert!(AccessLevel::Public < AccessLevel::Protected);
        assert!(AccessLevel::Protected < AccessLevel::Private);
        assert_eq!(
            AccessLevel::Public.max_restrictiveness(AccessLevel::Private),
            AccessLevel::Private
        );
    }

    #[test]
    fn composition_table() {
        use AccessLevel as L;
        use InheritanceType as K;

        assert_eq!(L::Public.through(K::Public), L::Public);
        assert_eq!(L::Public.through(K::Protected), L::Protected);
        assert_eq!(L::Public.through(K::Private), L::Private);
        assert_eq!(L::Protected.through(K::Public), L::Protected);
        assert_eq!(L::Protected.through(K::Private), L::Private);
        assert_eq!(L::Private.through(K::Public), L::Private);
    }

    #[test]
    fn public_edge_never_loosens() {
        for level in [AccessLevel::Public, AccessLevel::Protected, AccessLevel::Private] {
            assert_eq!(level.through(InheritanceType::Public), level);
        }
    }

    #[test]
    fn inheritance_compose() {
        use InheritanceType as K;
        assert_eq!(K::Public.compose(K::Protected), K::Protected);
        assert_eq!(K::Private.compose(K::Protected), K::Private);
        assert_eq!(K::Public.compose(K::Public), K::Public);
    }

    #[test]
    fn naming_convention() {
        assert_eq!(AccessLevel::from_naming_convention("__a"), AccessLevel::Private);
        assert_eq!(AccessLevel::from_naming_convention("_a"), AccessLevel::Protected);
        assert_eq!(AccessLevel::from_naming_convention("a"), AccessLevel::Public);
        assert_eq!(AccessLevel::from_naming_convention("__str__"), AccessLevel::Public);
        // "____" is not a dunder name; it starts with a double underscore
        assert_eq!(AccessLevel::from_naming_convention("____"), AccessLevel::Private);
    }

    #[test]
    fn display_keywords() {
        assert_eq!(AccessLevel::Protected.to_string(), "protected");
        assert_eq!(InheritanceType::Private.to_string(), "private");
        assert_eq!(MemberKind::StaticMethod.to_string(), "static method");
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&AccessLevel::Private).expect("serialize");
        assert_eq!(json, "\"private\"");
        let kind: MemberKind = serde_json::from_str("\"class_method\"").expect("deserialize");
        assert_eq!(kind, MemberKind::ClassMethod);
    }
}
