//! Member visibility table.
//!
//! One entry per `(owner, name)`. A level recorded implicitly may be
//! replaced once by an explicit declaration; after that the entry is fixed.
//!
//! | Existing | Incoming | Result |
//! |----------|----------|--------|
//! | none | any | recorded |
//! | Implicit | Explicit | overridden |
//! | Explicit | Explicit, same level | `DuplicateDeclaration` |
//! | Explicit | Explicit, other level | `ConflictingDeclaration` |
//! | any | Implicit | unchanged |

use super::inheritance::InheritanceRegistry;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use warden_auth::{ConfigurationError, DeclarationOrigin, Member};
use warden_types::TypeId;

/// Result of [`MemberTable::declare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    /// First declaration for this member.
    Recorded,
    /// An implicit level was replaced by an explicit one.
    Overridden,
    /// An implicit declaration arrived after an existing entry.
    Unchanged,
}

/// Thread-safe table of declared members, keyed by owner identity.
#[derive(Debug, Default)]
pub struct MemberTable {
    members: RwLock<HashMap<TypeId, BTreeMap<String, Member>>>,
}

impl MemberTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a member declaration.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateDeclaration`] or
    /// [`ConfigurationError::ConflictingDeclaration`] when an explicit
    /// declaration meets an existing explicit one.
    pub fn declare(&self, member: Member) -> Result<Declared, ConfigurationError> {
        let mut map = self.members.write();
        let owned = map.entry(member.owner.clone()).or_default();

        let Some(existing) = owned.get_mut(&member.name) else {
            tracing::debug!(
                member = %member.qualified_name(),
                level = %member.level,
                kind = %member.kind,
                "member declared"
            );
            owned.insert(member.name.clone(), member);
            return Ok(Declared::Recorded);
        };

        match (existing.origin, member.origin) {
            (_, DeclarationOrigin::Implicit) => Ok(Declared::Unchanged),
            (DeclarationOrigin::Implicit, DeclarationOrigin::Explicit) => {
                tracing::debug!(
                    member = %member.qualified_name(),
                    from = %existing.level,
                    to = %member.level,
                    "implicit level overridden"
                );
                *existing = member;
                Ok(Declared::Overridden)
            }
            (DeclarationOrigin::Explicit, DeclarationOrigin::Explicit) => {
                if existing.level == member.level {
                    Err(ConfigurationError::DuplicateDeclaration {
                        owner: member.owner.name().to_string(),
                        member: member.name,
                        level: member.level,
                    })
                } else {
                    Err(ConfigurationError::ConflictingDeclaration {
                        owner: member.owner.name().to_string(),
                        member: member.name,
                        existing: existing.level,
                        requested: member.level,
                    })
                }
            }
        }
    }

    /// Member declared directly on `owner`.
    #[must_use]
    pub fn get(&self, owner: &TypeId, name: &str) -> Option<Member> {
        self.members
            .read()
            .get(owner)
            .and_then(|owned| owned.get(name).cloned())
    }

    /// Members declared directly on `owner`, ordered by name.
    #[must_use]
    pub fn members_of(&self, owner: &TypeId) -> Vec<Member> {
        self.members
            .read()
            .get(owner)
            .map(|owned| owned.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of declared members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.read().values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the member `name` as seen on an object of `instance_type`.
    ///
    /// Walks the C3 linearization of `instance_type` and returns the first
    /// type that declares `name`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::InconsistentHierarchy`] if no linearization
    ///   exists
    /// - [`ConfigurationError::UnknownMember`] if no type in it declares
    ///   `name`
    pub fn resolve(
        &self,
        instance_type: &TypeId,
        name: &str,
        hierarchy: &InheritanceRegistry,
    ) -> Result<Member, ConfigurationError> {
        let order = hierarchy.linearize(instance_type)?;
        let map = self.members.read();
        order
            .iter()
            .find_map(|ty| map.get(ty).and_then(|owned| owned.get(name)).cloned())
            .ok_or_else(|| ConfigurationError::UnknownMember {
                ty: instance_type.name().to_string(),
                member: name.to_string(),
            })
    }
}
