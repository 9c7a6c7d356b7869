//! Inheritance registry.
//!
//! Records one [`InheritanceEdge`] per direct base and answers questions
//! about the resulting hierarchy: direct edge kinds, ancestry, the
//! first-declared path between two types, effective visibility of an
//! inherited member, and the method-resolution order.
//!
//! # Path Selection
//!
//! When several paths lead from a type to one of its ancestors (diamond
//! inheritance), the registry walks bases depth-first in declaration order
//! and uses the first path found. If another path composes to a different
//! inheritance kind, [`InheritanceRegistry::effective_visibility`] still
//! answers from the first path and logs the disagreement at `warn` level.
//!
//! ```text
//!        A            D(B, C): D→B declared before D→C
//!       / \
//!  pub B   C priv     path(D, A) = [D→B, B→A]
//!       \ /
//!        D
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use warden_auth::ConfigurationError;
use warden_types::{AccessLevel, InheritanceType, TypeId};

/// One direct inheritance edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InheritanceEdge {
    /// Derived type.
    pub derived: TypeId,
    /// Direct base.
    pub base: TypeId,
    /// Inheritance visibility keyword.
    pub kind: InheritanceType,
}

type BaseMap = HashMap<TypeId, Vec<(TypeId, InheritanceType)>>;

/// Append-only store of inheritance edges.
///
/// # Example
///
/// ```
/// use warden_runtime::InheritanceRegistry;
/// use warden_types::{AccessLevel, InheritanceType, TypeId};
///
/// let registry = InheritanceRegistry::new();
/// let base = TypeId::new("Base");
/// let derived = TypeId::new("Derived");
///
/// registry.record_edge(&derived, &base, InheritanceType::Private).unwrap();
///
/// let seen = registry
///     .effective_visibility(&derived, "run", AccessLevel::Public, &base)
///     .unwrap();
/// assert_eq!(seen, AccessLevel::Private);
/// ```
#[derive(Debug, Default)]
pub struct InheritanceRegistry {
    bases: RwLock<BaseMap>,
}

impl InheritanceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the edge `derived : kind base`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::InheritanceCycle`] if `base` is `derived` or
    ///   already descends from it
    /// - [`ConfigurationError::DuplicateEdge`] if the direct edge exists
    pub fn record_edge(
        &self,
        derived: &TypeId,
        base: &TypeId,
        kind: InheritanceType,
    ) -> Result<(), ConfigurationError> {
        let mut map = self.bases.write();

        if derived == base || find_path(&map, base, derived).is_some() {
            return Err(ConfigurationError::InheritanceCycle {
                derived: derived.name().to_string(),
                base: base.name().to_string(),
            });
        }

        let bases = map.entry(derived.clone()).or_default();
        if bases.iter().any(|(b, _)| b == base) {
            return Err(ConfigurationError::DuplicateEdge {
                derived: derived.name().to_string(),
                base: base.name().to_string(),
            });
        }
        bases.push((base.clone(), kind));

        tracing::debug!(derived = %derived, base = %base, kind = %kind, "inheritance edge recorded");
        Ok(())
    }

    /// Kind of the direct edge `derived → base`, if one was recorded.
    #[must_use]
    pub fn direct_kind(&self, derived: &TypeId, base: &TypeId) -> Option<InheritanceType> {
        self.bases
            .read()
            .get(derived)
            .and_then(|bases| bases.iter().find(|(b, _)| b == base).map(|(_, k)| *k))
    }

    /// Direct bases of `derived` in declaration order.
    #[must_use]
    pub fn bases_of(&self, derived: &TypeId) -> Vec<InheritanceEdge> {
        self.bases
            .read()
            .get(derived)
            .map(|bases| {
                bases
                    .iter()
                    .map(|(base, kind)| InheritanceEdge {
                        derived: derived.clone(),
                        base: base.clone(),
                        kind: *kind,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `true` if `derived` strictly descends from `base`.
    #[must_use]
    pub fn is_descendant(&self, derived: &TypeId, base: &TypeId) -> bool {
        derived != base && find_path(&self.bases.read(), derived, base).is_some()
    }

    /// Returns `true` if either type descends from the other.
    #[must_use]
    pub fn are_related(&self, a: &TypeId, b: &TypeId) -> bool {
        let map = self.bases.read();
        a != b && (find_path(&map, a, b).is_some() || find_path(&map, b, a).is_some())
    }

    /// First-declared chain of edges from `from` up to `to`.
    ///
    /// Returns `Some(vec![])` when `from == to` and `None` when `to` is not
    /// an ancestor of `from`.
    #[must_use]
    pub fn path(&self, from: &TypeId, to: &TypeId) -> Option<Vec<InheritanceEdge>> {
        find_path(&self.bases.read(), from, to)
    }

    /// Effective visibility of a member viewed through `instance_type`.
    ///
    /// Starts from `declared_level` and composes it with every edge on the
    /// first-declared path from `instance_type` to `declaring_type`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnreachableDeclaringType`] if `declaring_type`
    /// is neither `instance_type` nor one of its ancestors.
    pub fn effective_visibility(
        &self,
        instance_type: &TypeId,
        member_name: &str,
        declared_level: AccessLevel,
        declaring_type: &TypeId,
    ) -> Result<AccessLevel, ConfigurationError> {
        let map = self.bases.read();
        let path = find_path(&map, instance_type, declaring_type).ok_or_else(|| {
            ConfigurationError::UnreachableDeclaringType {
                declaring: declaring_type.name().to_string(),
                instance: instance_type.name().to_string(),
            }
        })?;

        let level = path
            .iter()
            .fold(declared_level, |level, edge| level.through(edge.kind));

        let kinds = path_kinds(&map, instance_type, declaring_type);
        if kinds.len() > 1 {
            let alternatives: Vec<AccessLevel> = kinds
                .iter()
                .map(|k| declared_level.through(*k))
                .filter(|l| *l != level)
                .collect();
            if !alternatives.is_empty() {
                tracing::warn!(
                    instance = %instance_type,
                    declaring = %declaring_type,
                    member = member_name,
                    chosen = %level,
                    alternatives = ?alternatives,
                    "diamond paths disagree on effective visibility; using first-declared path"
                );
            }
        }

        Ok(level)
    }

    /// Distinct composed inheritance kinds over every path from
    /// `instance_type` to `declaring_type`, if there is more than one.
    #[must_use]
    pub fn conflicting_paths(
        &self,
        instance_type: &TypeId,
        declaring_type: &TypeId,
    ) -> Option<Vec<InheritanceType>> {
        let kinds = path_kinds(&self.bases.read(), instance_type, declaring_type);
        (kinds.len() > 1).then_some(kinds)
    }

    /// C3 method-resolution order of `ty`, starting with `ty` itself.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InconsistentHierarchy`] if the bases admit no
    /// consistent order.
    pub fn linearize(&self, ty: &TypeId) -> Result<Vec<TypeId>, ConfigurationError> {
        let map = self.bases.read();
        let mut memo = HashMap::new();
        c3(&map, ty, &mut memo)
    }

    /// Total number of recorded edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.bases.read().values().map(Vec::len).sum()
    }
}

/// Depth-first search in declaration order; the first path wins.
fn find_path(map: &BaseMap, from: &TypeId, to: &TypeId) -> Option<Vec<InheritanceEdge>> {
    let mut dead_ends = HashSet::new();
    let mut path = Vec::new();
    if walk(map, from, to, &mut dead_ends, &mut path) {
        path.reverse();
        Some(path)
    } else {
        None
    }
}

/// Depth-first in declaration order. A type whose bases were fully explored
/// without reaching `to` is never entered again, so shared ancestors in
/// stacked diamonds cost one visit each.
fn walk(
    map: &BaseMap,
    from: &TypeId,
    to: &TypeId,
    dead_ends: &mut HashSet<TypeId>,
    path: &mut Vec<InheritanceEdge>,
) -> bool {
    if from == to {
        return true;
    }
    if dead_ends.contains(from) {
        return false;
    }
    for (base, kind) in map.get(from).into_iter().flatten() {
        if walk(map, base, to, dead_ends, path) {
            path.push(InheritanceEdge {
                derived: from.clone(),
                base: base.clone(),
                kind: *kind,
            });
            return true;
        }
    }
    dead_ends.insert(from.clone());
    false
}

/// Every composed kind reachable over any path, in discovery order.
///
/// At most three values exist, so each node's answer is memoized and the
/// walk stays linear in the number of edges.
fn path_kinds(map: &BaseMap, from: &TypeId, to: &TypeId) -> Vec<InheritanceType> {
    let mut memo: HashMap<TypeId, Vec<InheritanceType>> = HashMap::new();
    kinds_from(map, from, to, &mut memo)
}

fn kinds_from(
    map: &BaseMap,
    from: &TypeId,
    to: &TypeId,
    memo: &mut HashMap<TypeId, Vec<InheritanceType>>,
) -> Vec<InheritanceType> {
    if from == to {
        return vec![InheritanceType::Public];
    }
    if let Some(cached) = memo.get(from) {
        return cached.clone();
    }

    let mut out: Vec<InheritanceType> = Vec::new();
    if let Some(bases) = map.get(from) {
        for (base, kind) in bases {
            for above in kinds_from(map, base, to, memo) {
                let composed = kind.compose(above);
                if !out.contains(&composed) {
                    out.push(composed);
                }
            }
        }
    }
    memo.insert(from.clone(), out.clone());
    out
}

fn c3(
    map: &BaseMap,
    ty: &TypeId,
    memo: &mut HashMap<TypeId, Vec<TypeId>>,
) -> Result<Vec<TypeId>, ConfigurationError> {
    if let Some(done) = memo.get(ty) {
        return Ok(done.clone());
    }

    let bases: Vec<TypeId> = map
        .get(ty)
        .map(|b| b.iter().map(|(base, _)| base.clone()).collect())
        .unwrap_or_default();

    let mut seqs: Vec<VecDeque<TypeId>> = Vec::with_capacity(bases.len() + 1);
    for base in &bases {
        seqs.push(c3(map, base, memo)?.into());
    }
    seqs.push(bases.into());

    let mut order = vec![ty.clone()];
    order.extend(merge(seqs).ok_or_else(|| ConfigurationError::InconsistentHierarchy {
        ty: ty.name().to_string(),
    })?);

    memo.insert(ty.clone(), order.clone());
    Ok(order)
}

fn merge(mut seqs: Vec<VecDeque<TypeId>>) -> Option<Vec<TypeId>> {
    let mut out = Vec::new();
    loop {
        seqs.retain(|s| !s.is_empty());
        if seqs.is_empty() {
            return Some(out);
        }

        let head = seqs
            .iter()
            .filter_map(|s| s.front())
            .find(|candidate| {
                !seqs
                    .iter()
                    .any(|s| s.iter().skip(1).any(|x| x == *candidate))
            })?
            .clone();

        for s in &mut seqs {
            if s.front() == Some(&head) {
                s.pop_front();
            }
        }
        out.push(head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(name: &str) -> TypeId {
        TypeId::new(name)
    }

    #[test]
    fn record_and_direct_kind() {
        let registry = InheritanceRegistry::new();
        let (a, b) = (ty("A"), ty("B"));

        registry
            .record_edge(&b, &a, InheritanceType::Protected)
            .expect("edge");

        assert_eq!(registry.direct_kind(&b, &a), Some(InheritanceType::Protected));
        assert_eq!(registry.direct_kind(&a, &b), None);
        assert_eq!(registry.edge_count(), 1);
    }

    #[test]
    fn direct_kind_is_not_transitive() {
        let registry = InheritanceRegistry::new();
        let (a, b, c) = (ty("A"), ty("B"), ty("C"));
        registry.record_edge(&b, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&c, &b, InheritanceType::Public).expect("edge");

        assert_eq!(registry.direct_kind(&c, &a), None);
        assert!(registry.is_descendant(&c, &a));
    }

    #[test]
    fn self_edge_is_cycle() {
        let registry = InheritanceRegistry::new();
        let a = ty("A");

        let err = registry
            .record_edge(&a, &a, InheritanceType::Public)
            .expect_err("self edge");
        assert!(matches!(err, ConfigurationError::InheritanceCycle { .. }));
    }

    #[test]
    fn transitive_cycle_rejected() {
        let registry = InheritanceRegistry::new();
        let (a, b, c) = (ty("A"), ty("B"), ty("C"));
        registry.record_edge(&b, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&c, &b, InheritanceType::Public).expect("edge");

        let err = registry
            .record_edge(&a, &c, InheritanceType::Public)
            .expect_err("cycle");
        assert!(matches!(err, ConfigurationError::InheritanceCycle { .. }));
        assert_eq!(registry.edge_count(), 2);
    }

    #[test]
    fn duplicate_edge_rejected() {
        let registry = InheritanceRegistry::new();
        let (a, b) = (ty("A"), ty("B"));
        registry.record_edge(&b, &a, InheritanceType::Public).expect("edge");

        let err = registry
            .record_edge(&b, &a, InheritanceType::Private)
            .expect_err("duplicate");
        assert!(matches!(err, ConfigurationError::DuplicateEdge { .. }));
        assert_eq!(registry.direct_kind(&b, &a), Some(InheritanceType::Public));
    }

    #[test]
    fn effective_visibility_composes_every_edge() {
        let registry = InheritanceRegistry::new();
        let (a, b, c) = (ty("A"), ty("B"), ty("C"));
        registry.record_edge(&b, &a, InheritanceType::Protected).expect("edge");
        registry.record_edge(&c, &b, InheritanceType::Public).expect("edge");

        let level = registry
            .effective_visibility(&c, "m", AccessLevel::Public, &a)
            .expect("reachable");
        assert_eq!(level, AccessLevel::Protected);

        let own = registry
            .effective_visibility(&a, "m", AccessLevel::Public, &a)
            .expect("reachable");
        assert_eq!(own, AccessLevel::Public);
    }

    #[test]
    fn effective_visibility_unreachable() {
        let registry = InheritanceRegistry::new();
        let (a, b) = (ty("A"), ty("B"));

        let err = registry
            .effective_visibility(&a, "m", AccessLevel::Public, &b)
            .expect_err("unreachable");
        assert!(matches!(
            err,
            ConfigurationError::UnreachableDeclaringType { .. }
        ));
    }

    #[test]
    fn diamond_uses_first_declared_path() {
        let registry = InheritanceRegistry::new();
        let (a, b, c, d) = (ty("A"), ty("B"), ty("C"), ty("D"));
        registry.record_edge(&b, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&c, &a, InheritanceType::Private).expect("edge");
        registry.record_edge(&d, &b, InheritanceType::Public).expect("edge");
        registry.record_edge(&d, &c, InheritanceType::Public).expect("edge");

        let level = registry
            .effective_visibility(&d, "m", AccessLevel::Public, &a)
            .expect("reachable");
        assert_eq!(level, AccessLevel::Public);

        let path = registry.path(&d, &a).expect("path");
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].base, b);

        let conflict = registry.conflicting_paths(&d, &a).expect("conflict");
        assert_eq!(
            conflict,
            vec![InheritanceType::Public, InheritanceType::Private]
        );
    }

    #[test]
    fn stacked_diamonds_stay_linear() {
        let registry = InheritanceRegistry::new();
        let root = ty("Top0");
        let mut top = root.clone();
        for i in 0..40 {
            let (left, right, next) = (
                ty(&format!("Left{i}")),
                ty(&format!("Right{i}")),
                ty(&format!("Top{}", i + 1)),
            );
            registry.record_edge(&left, &top, InheritanceType::Public).expect("edge");
            registry.record_edge(&right, &top, InheritanceType::Public).expect("edge");
            registry.record_edge(&next, &left, InheritanceType::Public).expect("edge");
            registry.record_edge(&next, &right, InheritanceType::Public).expect("edge");
            top = next;
        }

        let stranger = ty("Stranger");
        assert!(!registry.is_descendant(&top, &stranger));
        assert!(!registry.are_related(&top, &stranger));
        assert!(registry.is_descendant(&top, &root));

        let path = registry.path(&top, &root).expect("path");
        assert_eq!(path.len(), 80);
        assert_eq!(path[0].derived, top);
        assert!(path[0].base.name().starts_with("Left"));
        assert_eq!(path[79].base, root);

        // closing the stack into a loop is still seen as a cycle
        assert!(matches!(
            registry.record_edge(&root, &top, InheritanceType::Public),
            Err(ConfigurationError::InheritanceCycle { .. })
        ));
    }

    #[test]
    fn diamond_order_swapped_changes_answer() {
        let registry = InheritanceRegistry::new();
        let (a, b, c, d) = (ty("A"), ty("B"), ty("C"), ty("D"));
        registry.record_edge(&b, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&c, &a, InheritanceType::Private).expect("edge");
        registry.record_edge(&d, &c, InheritanceType::Public).expect("edge");
        registry.record_edge(&d, &b, InheritanceType::Public).expect("edge");

        let level = registry
            .effective_visibility(&d, "m", AccessLevel::Public, &a)
            .expect("reachable");
        assert_eq!(level, AccessLevel::Private);
    }

    #[test]
    fn agreeing_diamond_is_not_conflicting() {
        let registry = InheritanceRegistry::new();
        let (a, b, c, d) = (ty("A"), ty("B"), ty("C"), ty("D"));
        registry.record_edge(&b, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&c, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&d, &b, InheritanceType::Public).expect("edge");
        registry.record_edge(&d, &c, InheritanceType::Public).expect("edge");

        assert!(registry.conflicting_paths(&d, &a).is_none());
    }

    #[test]
    fn related_in_either_direction() {
        let registry = InheritanceRegistry::new();
        let (a, b, x) = (ty("A"), ty("B"), ty("X"));
        registry.record_edge(&b, &a, InheritanceType::Public).expect("edge");

        assert!(registry.are_related(&a, &b));
        assert!(registry.are_related(&b, &a));
        assert!(!registry.are_related(&a, &x));
        assert!(!registry.are_related(&a, &a));
    }

    #[test]
    fn c3_linearization_of_diamond() {
        let registry = InheritanceRegistry::new();
        let (a, b, c, d) = (ty("A"), ty("B"), ty("C"), ty("D"));
        registry.record_edge(&b, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&c, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&d, &b, InheritanceType::Public).expect("edge");
        registry.record_edge(&d, &c, InheritanceType::Public).expect("edge");

        let order = registry.linearize(&d).expect("linearization");
        assert_eq!(order, vec![d, b, c, a]);
    }

    #[test]
    fn c3_inconsistent_order() {
        // X(A, B) and Y(B, A), then Z(X, Y) has no consistent order
        let registry = InheritanceRegistry::new();
        let (a, b, x, y, z) = (ty("A"), ty("B"), ty("X"), ty("Y"), ty("Z"));
        registry.record_edge(&x, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&x, &b, InheritanceType::Public).expect("edge");
        registry.record_edge(&y, &b, InheritanceType::Public).expect("edge");
        registry.record_edge(&y, &a, InheritanceType::Public).expect("edge");
        registry.record_edge(&z, &x, InheritanceType::Public).expect("edge");
        registry.record_edge(&z, &y, InheritanceType::Public).expect("edge");

        let err = registry.linearize(&z).expect_err("inconsistent");
        assert!(matches!(
            err,
            ConfigurationError::InconsistentHierarchy { .. }
        ));
    }

    #[test]
    fn bases_in_declaration_order() {
        let registry = InheritanceRegistry::new();
        let (a, b, d) = (ty("A"), ty("B"), ty("D"));
        registry.record_edge(&d, &b, InheritanceType::Private).expect("edge");
        registry.record_edge(&d, &a, InheritanceType::Public).expect("edge");

        let bases = registry.bases_of(&d);
        assert_eq!(bases.len(), 2);
        assert_eq!(bases[0].base, b);
        assert_eq!(bases[0].kind, InheritanceType::Private);
        assert_eq!(bases[1].base, a);
        assert!(registry.bases_of(&a).is_empty());
    }
}
