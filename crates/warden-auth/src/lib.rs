//! Visibility primitives for warden.
//!
//! This crate holds the data types and traits the decision engine is built
//! from, without any registry or checker implementation.
//!
//! # Crate Architecture
//!
//! ```text
//! warden-types  (TypeId, AccessLevel, CallerInfo)
//!       ↑
//! warden-auth   ◄── THIS CRATE
//! (Member, FriendGrant, StaticContext, FriendPolicy, errors)
//!       ↑
//! warden-runtime (FriendshipRegistry, InheritanceRegistry, AccessChecker)
//! ```
//!
//! # Design Principles
//!
//! - **Traits here, implementations in the runtime**: the runtime supplies
//!   the in-memory `FriendshipRegistry` behind [`FriendPolicy`]
//! - **Identity, not names**: every key is a [`warden_types::TypeId`]
//! - **Grants only grow**: there is no revocation

pub mod error;
pub mod grant;
pub mod member;
pub mod policy;

pub use error::{AccessDenied, ConfigurationError};
pub use grant::{FriendGrant, StaticContext};
pub use member::{DeclarationOrigin, Member};
pub use policy::FriendPolicy;

pub use warden_types::{AccessLevel, CallerInfo, InheritanceType, MemberKind, TypeId};
