//! Friendship policy trait.
//!
//! Defines [`FriendPolicy`], the abstract store of friend grants. The trait
//! lives here so the checker in `warden-runtime` and any host-side store can
//! both refer to it without depending on each other.
//!
//! # Architecture
//!
//! ```text
//! FriendPolicy trait (warden-auth)        <- abstract, no runtime deps
//!          │
//!          └── FriendshipRegistry (warden-runtime) <- in-memory impl
//! ```

use crate::{FriendGrant, StaticContext};
use warden_types::TypeId;

/// Records and answers friend grants.
///
/// Grants are additive and idempotent; inserting a grant twice is a no-op.
/// Every `grant_*` method returns `true` only for the call that actually
/// inserted the grant, decided under the store's own lock. Queries are pure.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: grants are written during type
/// registration and read on every access check, possibly from different
/// threads.
///
/// # Example
///
/// ```
/// use warden_auth::FriendPolicy;
/// use warden_types::TypeId;
///
/// fn trusted(policy: &dyn FriendPolicy, target: &TypeId, caller: &TypeId) -> bool {
///     policy.is_friend_type(target, caller)
/// }
/// ```
pub trait FriendPolicy: Send + Sync + std::fmt::Debug {
    /// Grants every method of `friend` access to `target`.
    fn grant_type_friend(&self, target: &TypeId, friend: &TypeId) -> bool;

    /// Grants one method of `friend` access to `target`.
    fn grant_method_friend(&self, target: &TypeId, friend: &TypeId, method: &str) -> bool;

    /// Grants a free function access to `target`.
    fn grant_function_friend(&self, target: &TypeId, function: &str) -> bool;

    /// Grants a static method of `owner` access to `target`.
    fn grant_static_friend(&self, target: &TypeId, owner: &TypeId, method: &str) -> bool;

    /// Returns `true` if every method of `caller` is trusted by `target`.
    fn is_friend_type(&self, target: &TypeId, caller: &TypeId) -> bool;

    /// Returns `true` if `caller_type.caller_method` is trusted by `target`.
    fn is_friend_method(&self, target: &TypeId, caller_type: &TypeId, caller_method: &str) -> bool;

    /// Returns `true` if the free function is trusted by `target`.
    fn is_friend_function(&self, target: &TypeId, function: &str) -> bool;

    /// Returns `true` if the executing static method is trusted by `target`.
    fn is_static_friend(&self, target: &TypeId, context: &StaticContext) -> bool;

    /// Total number of distinct grants.
    fn grant_count(&self) -> usize;

    /// Number of distinct target types with at least one grant.
    fn target_count(&self) -> usize;

    /// All grants, in unspecified order.
    fn list_grants(&self) -> Vec<FriendGrant>;

    /// Inserts a grant of any kind; `true` if it was new.
    fn grant(&self, grant: &FriendGrant) -> bool {
        match grant {
            FriendGrant::Type { target, friend } => self.grant_type_friend(target, friend),
            FriendGrant::Method {
                target,
                friend,
                method,
            } => self.grant_method_friend(target, friend, method),
            FriendGrant::Function { target, function } => self.grant_function_friend(target, function),
            FriendGrant::StaticContext {
                target,
                owner,
                method,
            } => self.grant_static_friend(target, owner, method),
        }
    }
}
