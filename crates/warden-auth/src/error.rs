//! Access and configuration errors.
//!
//! ```text
//! registration time                 call time
//!       │                               │
//! ConfigurationError             AccessDenied (raised by the trampoline
//!  - duplicate / conflicting      when the checker says no)
//!    declarations
//!  - inheritance cycles
//!  - unreachable declaring type
//! ```
//!
//! Both are non-recoverable: access decisions are deterministic, so a
//! retry changes nothing.

use thiserror::Error;
use warden_types::{AccessLevel, ErrorCode, MemberKind};

/// A guarded member was invoked by code that may not reach it.
///
/// Carries the declared level, member kind, and member name for
/// diagnostics, plus the owner and caller descriptions.
///
/// # Example
///
/// ```
/// use warden_auth::AccessDenied;
/// use warden_types::{AccessLevel, MemberKind};
///
/// let err = AccessDenied::new(AccessLevel::Private, MemberKind::Method, "Vault", "open")
///     .with_caller("Thief.steal");
///
/// assert_eq!(
///     err.to_string(),
///     "access denied to private method 'Vault.open' from Thief.steal"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access denied to {level} {kind} '{owner}.{member}' from {caller}")]
pub struct AccessDenied {
    /// Declared access level of the member.
    pub level: AccessLevel,
    /// Member kind.
    pub kind: MemberKind,
    /// Display name of the declaring type.
    pub owner: String,
    /// Member name.
    pub member: String,
    /// Description of the calling code.
    pub caller: String,
}

impl AccessDenied {
    /// Creates a denial with an unresolved caller.
    #[must_use]
    pub fn new(
        level: AccessLevel,
        kind: MemberKind,
        owner: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            level,
            kind,
            owner: owner.into(),
            member: member.into(),
            caller: "<unresolved>".to_string(),
        }
    }

    /// Sets the caller description.
    #[must_use]
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = caller.into();
        self
    }
}

impl ErrorCode for AccessDenied {
    fn code(&self) -> &'static str {
        match self.level {
            AccessLevel::Private => "ACCESS_DENIED_PRIVATE",
            AccessLevel::Protected => "ACCESS_DENIED_PROTECTED",
            AccessLevel::Public => "ACCESS_DENIED_PUBLIC",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// The registered model is inconsistent.
///
/// Raised at registration time, or at check time when the registration
/// phase left the registries unable to answer a question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The member already carries the same explicit level.
    #[error("duplicate access level: '{owner}.{member}' is already declared {level}")]
    DuplicateDeclaration {
        /// Declaring type name.
        owner: String,
        /// Member name.
        member: String,
        /// Level declared twice.
        level: AccessLevel,
    },

    /// The member already carries a different explicit level.
    #[error(
        "conflicting access levels: '{owner}.{member}' is declared {existing}, cannot redeclare {requested}"
    )]
    ConflictingDeclaration {
        /// Declaring type name.
        owner: String,
        /// Member name.
        member: String,
        /// Level already recorded.
        existing: AccessLevel,
        /// Level that was rejected.
        requested: AccessLevel,
    },

    /// The edge would make a type its own ancestor.
    #[error("inheritance cycle: '{derived}' cannot derive from '{base}'")]
    InheritanceCycle {
        /// Derived type name.
        derived: String,
        /// Base type name.
        base: String,
    },

    /// The direct edge was already recorded.
    #[error("duplicate inheritance edge: '{derived}' already derives from '{base}'")]
    DuplicateEdge {
        /// Derived type name.
        derived: String,
        /// Base type name.
        base: String,
    },

    /// No chain of edges leads from the instance type to the declaring type.
    #[error("'{declaring}' is not reachable from '{instance}' through registered inheritance")]
    UnreachableDeclaringType {
        /// Declaring type name.
        declaring: String,
        /// Instance type name.
        instance: String,
    },

    /// The bases admit no consistent method-resolution order.
    #[error("inconsistent hierarchy: no linearization exists for '{ty}'")]
    InconsistentHierarchy {
        /// Type whose linearization failed.
        ty: String,
    },

    /// The member is not registered on the type or any of its ancestors.
    #[error("unknown member '{member}' on '{ty}'")]
    UnknownMember {
        /// Type that was searched.
        ty: String,
        /// Member name.
        member: String,
    },
}

impl ErrorCode for ConfigurationError {
    fn code(&self) -> &'static str {
        match self {
            Self::DuplicateDeclaration { .. } => "CONFIG_DUPLICATE_DECLARATION",
            Self::ConflictingDeclaration { .. } => "CONFIG_CONFLICTING_DECLARATION",
            Self::InheritanceCycle { .. } => "CONFIG_INHERITANCE_CYCLE",
            Self::DuplicateEdge { .. } => "CONFIG_DUPLICATE_EDGE",
            Self::UnreachableDeclaringType { .. } => "CONFIG_UNREACHABLE_DECLARING_TYPE",
            Self::InconsistentHierarchy { .. } => "CONFIG_INCONSISTENT_HIERARCHY",
            Self::UnknownMember { .. } => "CONFIG_UNKNOWN_MEMBER",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
