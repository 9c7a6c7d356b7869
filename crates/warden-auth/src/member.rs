//! Guarded members.

use serde::{Deserialize, Serialize};
use warden_types::{AccessLevel, MemberKind, TypeId};

/// How a member's level came to be recorded.
///
/// An `Implicit` level (naming convention, or the Public default attached
/// by a friend-method declaration) may be confirmed or overridden once by
/// an `Explicit` declaration. Two explicit declarations conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationOrigin {
    /// Pre-assigned as a byproduct of another declaration.
    Implicit,
    /// Stated explicitly by the type author.
    #[default]
    Explicit,
}

/// A member registered with its declared visibility.
///
/// # Example
///
/// ```
/// use warden_auth::Member;
/// use warden_types::{AccessLevel, MemberKind, TypeId};
///
/// let account = TypeId::new("Account");
/// let m = Member::new(account.clone(), "audit_log", AccessLevel::Private);
/// assert_eq!(m.kind, MemberKind::Method);
/// assert_eq!(m.qualified_name(), "Account.audit_log");
///
/// let implicit = Member::by_convention(account, "_rebalance");
/// assert_eq!(implicit.level, AccessLevel::Protected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Declaring type.
    pub owner: TypeId,
    /// Member name.
    pub name: String,
    /// Declared visibility.
    pub level: AccessLevel,
    /// Member shape.
    pub kind: MemberKind,
    /// Whether the level was stated or inferred.
    pub origin: DeclarationOrigin,
}

impl Member {
    /// An explicitly declared instance method.
    #[must_use]
    pub fn new(owner: TypeId, name: impl Into<String>, level: AccessLevel) -> Self {
        Self {
            owner,
            name: name.into(),
            level,
            kind: MemberKind::Method,
            origin: DeclarationOrigin::Explicit,
        }
    }

    /// An implicit member whose level follows naming conventions.
    #[must_use]
    pub fn by_convention(owner: TypeId, name: impl Into<String>) -> Self {
        let name = name.into();
        let level = AccessLevel::from_naming_convention(&name);
        Self {
            owner,
            name,
            level,
            kind: MemberKind::Method,
            origin: DeclarationOrigin::Implicit,
        }
    }

    /// Sets the member kind.
    #[must_use]
    pub fn with_kind(mut self, kind: MemberKind) -> Self {
        self.kind = kind;
        self
    }

    /// Marks the level as implicit.
    #[must_use]
    pub fn implicit(mut self) -> Self {
        self.origin = DeclarationOrigin::Implicit;
        self
    }

    /// `Owner.name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }

    /// Returns `true` if the level was stated explicitly.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.origin == DeclarationOrigin::Explicit
    }
}
