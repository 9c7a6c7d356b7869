//! warden Runtime - registries, decision function, and guarded calls.
//!
//! This crate implements the access model declared by `warden-types` and
//! `warden-auth`: it records friend grants, inheritance edges, and member
//! declarations, answers "may this caller reach this member?", and runs
//! member bodies behind that check.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Vocabulary Layer                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  warden-types : TypeId, AccessLevel, CallerInfo, ErrorCode  │
//! │  warden-auth  : Member, FriendGrant, FriendPolicy, errors   │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  auth/       : registries, AccessChecker, static context    │
//! │  identity    : call frames, CallerResolver                  │
//! │  trampoline  : check-then-run for guarded members           │
//! │  system      : AccessControl facade, TypeBuilder            │
//! │  events      : AccessEvent, EventSink                       │
//! │  config/     : WardenConfig, ConfigLoader                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! ## [`auth`] - Access Model
//!
//! - [`FriendshipRegistry`]: friend grants per target type
//! - [`InheritanceRegistry`]: edges, paths, effective visibility, C3
//! - [`MemberTable`]: declared members and their levels
//! - [`AccessChecker`]: the decision function
//!
//! ## [`trampoline`] - Guarded Calls
//!
//! [`Trampoline`] looks a member up, checks the caller, and runs the body
//! with a call frame pushed so nested calls see the right identity.
//!
//! ## [`system`] - Facade
//!
//! [`AccessControl`] wires everything together from a [`WardenConfig`] and
//! offers [`TypeBuilder`] for declaring a type in one call.
//!
//! ## [`config`] - Configuration Management
//!
//! Configuration priority: Environment > Project > Global > Default
//!
//! # Example
//!
//! ```
//! use warden_runtime::AccessControl;
//! use warden_types::{AccessLevel, CallerInfo};
//!
//! let ac = AccessControl::new();
//! let auditor = ac.define("Auditor").member("inspect", AccessLevel::Public).commit().unwrap();
//! let vault = ac
//!     .define("Vault")
//!     .member("__open", AccessLevel::Private)
//!     .friend_type(&auditor)
//!     .commit()
//!     .unwrap();
//!
//! let friend = CallerInfo::of(auditor.clone(), "inspect");
//! let stranger = CallerInfo::function("main");
//!
//! assert_eq!(ac.invoke(&friend, &vault, "__open", Some(&vault), || 42).unwrap(), 42);
//! assert!(ac.invoke(&stranger, &vault, "__open", Some(&vault), || 42).is_err());
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod system;
pub mod trampoline;

pub use auth::{
    AccessChecker, AccessDenied, ConfigurationError, Decision, Declared, FriendPolicy,
    FriendshipRegistry, InheritanceEdge, InheritanceRegistry, MemberTable, Rule,
    StaticContextGuard,
};
pub use config::{
    default_config_dir, default_config_path, save_config, ConfigError, ConfigLayer, ConfigLoader,
    EnforcementConfig, EventsConfig, ResolverConfig, WardenConfig,
};
pub use error::WardenError;
pub use events::{AccessEvent, EventSink, NullSink, RecordingSink, TracingSink};
pub use identity::{CallFrame, CallerResolver, FixedResolver, FrameGuard, FrameStackResolver};
pub use system::{AccessControl, AccessControlBuilder, AccessStats, TypeBuilder};
pub use trampoline::Trampoline;
