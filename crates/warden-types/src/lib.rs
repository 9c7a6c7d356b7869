//! Core vocabulary for warden.
//!
//! warden enforces C++-style member visibility (public / protected /
//! private, inheritance visibility, friend grants) at call time for host
//! object models that have no native notion of it. This crate holds the
//! leaf types every other layer speaks in.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  warden-types   : TypeId, AccessLevel, CallerInfo  ◄── HERE  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  warden-auth    : Member, FriendGrant, errors, FriendPolicy │
//! ├─────────────────────────────────────────────────────────────┤
//! │  warden-runtime : registries, AccessChecker, trampoline     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identity
//!
//! Types are keyed by [`TypeId`], a UUID minted when the host declares the
//! type. Display names are diagnostics only.
//!
//! # Example
//!
//! ```
//! use warden_types::{AccessLevel, CallerInfo, InheritanceType, TypeId};
//!
//! let base = TypeId::new("Base");
//! let caller = CallerInfo::of(base.clone(), "run");
//!
//! // A public member inherited privately is private from outside
//! let seen = AccessLevel::Public.through(InheritanceType::Private);
//! assert_eq!(seen, AccessLevel::Private);
//! assert!(caller.is_type(&base));
//! ```

mod access;
mod caller;
mod error;
mod id;

pub use access::{AccessLevel, InheritanceType, MemberKind};
pub use caller::{CallerInfo, CONSTRUCTOR, SAME_TYPE_ACCESS};
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::TypeId;
