//! Runtime errors.
//!
//! [`WardenError`] is what a guarded call returns when it does not run its
//! body. Each variant forwards its [`ErrorCode`] from the wrapped error.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`WardenError::Denied`] | `ACCESS_DENIED_*` | No |
//! | [`WardenError::Configuration`] | `CONFIG_*` | No |

use thiserror::Error;
use warden_auth::{AccessDenied, ConfigurationError};
use warden_types::ErrorCode;

/// Failure of a guarded call.
///
/// # Example
///
/// ```
/// use warden_auth::AccessDenied;
/// use warden_runtime::WardenError;
/// use warden_types::{AccessLevel, ErrorCode, MemberKind};
///
/// let err: WardenError =
///     AccessDenied::new(AccessLevel::Private, MemberKind::Method, "Vault", "open").into();
/// assert_eq!(err.code(), "ACCESS_DENIED_PRIVATE");
/// assert!(err.is_denied());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WardenError {
    /// The caller may not reach the member.
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// The registered model cannot answer the question.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl WardenError {
    /// Returns `true` for an access denial.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    /// The denial, if this is one.
    #[must_use]
    pub fn as_denied(&self) -> Option<&AccessDenied> {
        match self {
            Self::Denied(d) => Some(d),
            Self::Configuration(_) => None,
        }
    }
}

impl ErrorCode for WardenError {
    fn code(&self) -> &'static str {
        match self {
            Self::Denied(e) => e.code(),
            Self::Configuration(e) => e.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Denied(e) => e.is_recoverable(),
            Self::Configuration(e) => e.is_recoverable(),
        }
    }
}
