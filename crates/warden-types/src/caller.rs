//! Caller identity.
//!
//! A [`CallerInfo`] says which code is making a call: the type whose body
//! the calling code belongs to, and the name of the member or function it
//! is executing. It is produced fresh for every call by a resolver and is
//! never stored by the registries.

use crate::TypeId;
use serde::{Deserialize, Serialize};

/// Method name reported while a constructor body is executing.
pub const CONSTRUCTOR: &str = "<constructor>";

/// Method name used when identity is inferred from the receiver object.
pub const SAME_TYPE_ACCESS: &str = "<same_type_access>";

/// The code performing a call.
///
/// | `caller_type` | `caller_method` | Meaning |
/// |---------------|-----------------|---------|
/// | `Some(T)` | `Some(m)` | Method `m` of type `T` |
/// | `None` | `Some(f)` | Free function `f` (or a static method) |
/// | `None` | `None` | Unresolved |
///
/// # Example
///
/// ```
/// use warden_types::{CallerInfo, TypeId};
///
/// let account = TypeId::new("Account");
/// let caller = CallerInfo::of(account.clone(), "deposit");
/// assert_eq!(caller.caller_type.as_ref(), Some(&account));
/// assert!(!caller.is_constructor());
///
/// assert!(CallerInfo::unresolved().is_unresolved());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerInfo {
    /// Type whose code is calling.
    pub caller_type: Option<TypeId>,
    /// Method or function name of the calling code.
    pub caller_method: Option<String>,
}

impl CallerInfo {
    /// No attributable caller.
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// A method of a type.
    #[must_use]
    pub fn of(caller_type: TypeId, method: impl Into<String>) -> Self {
        Self {
            caller_type: Some(caller_type),
            caller_method: Some(method.into()),
        }
    }

    /// A constructor body of a type.
    #[must_use]
    pub fn constructor(caller_type: TypeId) -> Self {
        Self::of(caller_type, CONSTRUCTOR)
    }

    /// A free function with no owning type.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            caller_type: None,
            caller_method: Some(name.into()),
        }
    }

    /// Returns `true` when neither type nor method is known.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.caller_type.is_none() && self.caller_method.is_none()
    }

    /// Returns `true` when the caller is a constructor body.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.caller_method.as_deref() == Some(CONSTRUCTOR)
    }

    /// Returns `true` if the caller belongs to `ty`.
    #[must_use]
    pub fn is_type(&self, ty: &TypeId) -> bool {
        self.caller_type.as_ref() == Some(ty)
    }
}

impl std::fmt::Display for CallerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.caller_type, &self.caller_method) {
            (Some(ty), Some(m)) => write!(f, "{ty}.{m}"),
            (Some(ty), None) => write!(f, "{ty}"),
            (None, Some(m)) => write!(f, "function {m}"),
            (None, None) => f.write_str("<unresolved>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_caller() {
        let caller = CallerInfo::unresolved();
        assert!(caller.is_unresolved());
        assert!(!caller.is_constructor());
        assert_eq!(caller.to_string(), "<unresolved>");
    }

    #[test]
    fn method_caller() {
        let ty = TypeId::new("Account");
        let caller = CallerInfo::of(ty.clone(), "deposit");

        assert!(caller.is_type(&ty));
        assert!(!caller.is_type(&TypeId::new("Account")));
        assert_eq!(caller.to_string(), "Account.deposit");
    }

    #[test]
    fn constructor_caller() {
        let caller = CallerInfo::constructor(TypeId::new("Account"));
        assert!(caller.is_constructor());
        assert_eq!(caller.caller_method.as_deref(), Some(CONSTRUCTOR));
    }

    #[test]
    fn function_caller() {
        let caller = CallerInfo::function("audit");
        assert!(caller.caller_type.is_none());
        assert!(!caller.is_unresolved());
        assert_eq!(caller.to_string(), "function audit");
    }
}
