//! Visibility registries and the access checker.
//!
//! Primitive types ([`Member`](warden_auth::Member),
//! [`FriendGrant`](warden_auth::FriendGrant)) and the [`FriendPolicy`] trait
//! are defined in `warden-auth`. This module provides the runtime
//! implementations:
//!
//! - [`FriendshipRegistry`]: in-memory [`FriendPolicy`]
//! - [`InheritanceRegistry`]: edges, paths, effective visibility, C3 order
//! - [`MemberTable`]: declared member levels
//! - [`AccessChecker`]: the decision function
//! - [`context`]: per-thread static-method context
//!
//! # Architecture
//!
//! ```text
//! warden-auth (traits + data types)
//!     Member, FriendGrant, StaticContext, FriendPolicy, errors
//!         ↓
//! warden-runtime/auth (implementations)
//!     FriendshipRegistry, InheritanceRegistry, MemberTable, AccessChecker
//! ```

mod checker;
pub mod context;
mod friendship;
mod inheritance;
mod members;

pub use checker::{AccessChecker, Decision, Rule};
pub use context::StaticContextGuard;
pub use friendship::FriendshipRegistry;
pub use inheritance::{InheritanceEdge, InheritanceRegistry};
pub use members::{Declared, MemberTable};

// Re-export from warden-auth for convenience
pub use warden_auth::{AccessDenied, ConfigurationError, FriendPolicy};
