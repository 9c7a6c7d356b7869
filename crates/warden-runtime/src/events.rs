//! Observability events.
//!
//! The trampoline and the registration facade describe what they did as
//! [`AccessEvent`]s and hand them to an [`EventSink`]. Sinks never influence
//! decisions.

use crate::auth::InheritanceEdge;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use warden_auth::{FriendGrant, Member};
use warden_types::{AccessLevel, MemberKind};

/// Something the access-control system did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AccessEvent {
    /// A guarded member ran.
    AccessAllowed {
        /// Declaring type name.
        owner: String,
        /// Member name.
        member: String,
        /// Declared level.
        level: AccessLevel,
        /// Member kind.
        kind: MemberKind,
        /// Caller description.
        caller: String,
    },
    /// A guarded member was refused.
    AccessDenied {
        /// Declaring type name.
        owner: String,
        /// Member name.
        member: String,
        /// Declared level.
        level: AccessLevel,
        /// Member kind.
        kind: MemberKind,
        /// Caller description.
        caller: String,
    },
    /// A friend grant was registered.
    FriendshipEstablished {
        /// The grant.
        grant: FriendGrant,
    },
    /// An inheritance edge was recorded.
    EdgeRecorded {
        /// The edge.
        edge: InheritanceEdge,
    },
    /// A member level was declared.
    MemberDeclared {
        /// The member.
        member: Member,
    },
}

impl AccessEvent {
    /// Snake-case name of the event variant.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccessAllowed { .. } => "access_allowed",
            Self::AccessDenied { .. } => "access_denied",
            Self::FriendshipEstablished { .. } => "friendship_established",
            Self::EdgeRecorded { .. } => "edge_recorded",
            Self::MemberDeclared { .. } => "member_declared",
        }
    }
}

/// Receives events.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Handles one event.
    fn emit(&self, event: &AccessEvent);
}

/// Writes every event to `tracing` as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &AccessEvent) {
        match serde_json::to_string(event) {
            Ok(json) => tracing::info!(target: "warden::events", event = event.name(), payload = %json),
            Err(e) => tracing::error!(target: "warden::events", event = event.name(), error = %e, "event serialization failed"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &AccessEvent) {}
}

/// Keeps every event in memory.
///
/// # Example
///
/// ```
/// use warden_runtime::events::{AccessEvent, EventSink, RecordingSink};
/// use warden_types::{AccessLevel, MemberKind};
///
/// let sink = RecordingSink::new();
/// sink.emit(&AccessEvent::AccessAllowed {
///     owner: "Account".into(),
///     member: "deposit".into(),
///     level: AccessLevel::Public,
///     kind: MemberKind::Method,
///     caller: "<unresolved>".into(),
/// });
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AccessEvent>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AccessEvent> {
        self.events.lock().clone()
    }

    /// Removes and returns the recorded events.
    pub fn take(&self) -> Vec<AccessEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AccessEvent) {
        self.events.lock().push(event.clone());
    }
}
