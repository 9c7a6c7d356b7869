//! Benchmark: access decision cost
//!
//! `can_access` runs on every guarded call, so it is the hot path. This
//! measures it against inheritance depth, for the cheapest rule (same type)
//! and for the rule that walks the whole chain (effective visibility from
//! outside the hierarchy).
//!
//! # When to revisit
//!
//! - If path lookups start allocating more than one Vec per call
//! - If registries move from `RwLock` to snapshot swapping

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use warden_runtime::{AccessChecker, FriendPolicy, FriendshipRegistry, InheritanceRegistry};
use warden_types::{AccessLevel, CallerInfo, InheritanceType, TypeId};

fn chain(hierarchy: &InheritanceRegistry, depth: usize) -> Vec<TypeId> {
    let mut types = vec![TypeId::new("Root")];
    for i in 0..depth {
        let derived = TypeId::new(format!("Level{i}"));
        if hierarchy
            .record_edge(&derived, &types[i], InheritanceType::Public)
            .is_err()
        {
            break;
        }
        types.push(derived);
    }
    types
}

fn bench_can_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("can_access");

    for depth in [1usize, 4, 16] {
        let friends = Arc::new(FriendshipRegistry::new());
        let hierarchy = Arc::new(InheritanceRegistry::new());
        let checker = AccessChecker::new(
            Arc::clone(&friends) as Arc<dyn FriendPolicy>,
            Arc::clone(&hierarchy),
        );
        let types = chain(&hierarchy, depth);
        let root = types[0].clone();
        let leaf = types[types.len() - 1].clone();

        let same_type = CallerInfo::of(root.clone(), "work");
        group.bench_with_input(BenchmarkId::new("same_type", depth), &depth, |b, _| {
            b.iter(|| {
                checker.can_access(
                    black_box(&root),
                    "__state",
                    AccessLevel::Private,
                    &same_type,
                    Some(&root),
                )
            });
        });

        let outside = CallerInfo::function("main");
        group.bench_with_input(BenchmarkId::new("outside_via_leaf", depth), &depth, |b, _| {
            b.iter(|| {
                checker.can_access(
                    black_box(&root),
                    "run",
                    AccessLevel::Public,
                    &outside,
                    Some(&leaf),
                )
            });
        });

        let descendant = CallerInfo::of(leaf.clone(), "work");
        group.bench_with_input(BenchmarkId::new("descendant", depth), &depth, |b, _| {
            b.iter(|| {
                checker.can_access(
                    black_box(&root),
                    "_hook",
                    AccessLevel::Protected,
                    &descendant,
                    Some(&leaf),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_can_access);
criterion_main!(benches);
