//! Friend grants.
//!
//! A friend grant is an explicit trust relationship that lets specific
//! code bypass the Private/Protected rules of one target type.
//!
//! # Grant Kinds
//!
//! | Kind | Trusted code |
//! |------|--------------|
//! | `Type` | every method of `friend` |
//! | `Method` | method `method` of `friend` |
//! | `Function` | free function `function` |
//! | `StaticContext` | static method `method` of `owner` |
//!
//! Grants are additive and idempotent. There is no revocation.

use serde::{Deserialize, Serialize};
use warden_types::TypeId;

/// One trust grant against a target type.
///
/// # Example
///
/// ```
/// use warden_auth::FriendGrant;
/// use warden_types::TypeId;
///
/// let vault = TypeId::new("Vault");
/// let auditor = TypeId::new("Auditor");
///
/// let grant = FriendGrant::Type { target: vault.clone(), friend: auditor };
/// assert_eq!(grant.target(), &vault);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FriendGrant {
    /// All methods of `friend` are trusted by `target`.
    Type {
        /// Type whose members become reachable.
        target: TypeId,
        /// Trusted type.
        friend: TypeId,
    },
    /// One method of `friend` is trusted by `target`.
    Method {
        /// Type whose members become reachable.
        target: TypeId,
        /// Type declaring the trusted method.
        friend: TypeId,
        /// Trusted method name.
        method: String,
    },
    /// A free function is trusted by `target`.
    Function {
        /// Type whose members become reachable.
        target: TypeId,
        /// Trusted function name.
        function: String,
    },
    /// A static method (no receiver) is trusted by `target`.
    StaticContext {
        /// Type whose members become reachable.
        target: TypeId,
        /// Type declaring the static method.
        owner: TypeId,
        /// Static method name.
        method: String,
    },
}

impl FriendGrant {
    /// Returns the type that extends trust.
    #[must_use]
    pub fn target(&self) -> &TypeId {
        match self {
            Self::Type { target, .. }
            | Self::Method { target, .. }
            | Self::Function { target, .. }
            | Self::StaticContext { target, .. } => target,
        }
    }

    /// Short label for the grant kind.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Type { .. } => "type",
            Self::Method { .. } => "method",
            Self::Function { .. } => "function",
            Self::StaticContext { .. } => "static",
        }
    }
}

impl std::fmt::Display for FriendGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type { target, friend } => write!(f, "{target} trusts {friend}"),
            Self::Method {
                target,
                friend,
                method,
            } => write!(f, "{target} trusts {friend}.{method}"),
            Self::Function { target, function } => write!(f, "{target} trusts fn {function}"),
            Self::StaticContext {
                target,
                owner,
                method,
            } => write!(f, "{target} trusts static {owner}.{method}"),
        }
    }
}

/// The executing static method, recorded because it has no receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaticContext {
    /// Type declaring the static method.
    pub declaring_type: TypeId,
    /// Static method name.
    pub method_name: String,
}

impl StaticContext {
    /// Creates a new context record.
    #[must_use]
    pub fn new(declaring_type: TypeId, method_name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            method_name: method_name.into(),
        }
    }
}
