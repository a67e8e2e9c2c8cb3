/// Property-based tests for matching and singleton arbitration
///
/// These tests verify that resolution behavior follows expected patterns
/// regardless of how many producers are registered, their priorities or
/// the shape of the request.

use autowire::{compat, Injectable, Registry, Ty, TypeDesc};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug)]
struct Slot(usize);

fn register_slots(registry: &Registry, priorities: &[i32], singleton: bool) {
    for (index, &priority) in priorities.iter().enumerate() {
        Injectable::new(Ty::class::<Slot>().constructor(move |_| Ok(Slot(index))))
            .name(format!("slot-{}", index))
            .priority(priority)
            .singleton(singleton)
            .register_in(registry);
    }
}

fn expected_winner(priorities: &[i32]) -> usize {
    let mut best = 0;
    for (index, &priority) in priorities.iter().enumerate() {
        if priority > priorities[best] {
            best = index;
        }
    }
    best
}

// Property: the highest priority singleton supplies the instance, first registered on ties
proptest! {
    #[test]
    fn singleton_arbitration_picks_highest_priority(priorities in prop::collection::vec(-5i32..5, 1..8)) {
        let registry = Registry::new();
        register_slots(&registry, &priorities, true);

        let winner = expected_winner(&priorities);
        let resolved = registry.get::<Slot>().unwrap();
        prop_assert_eq!(resolved.0, winner);
        prop_assert_eq!(registry.cached_priority(&TypeDesc::plain::<Slot>()), Some(priorities[winner]));

        let all = registry.get_all::<Slot>().unwrap();
        prop_assert_eq!(all.len(), priorities.len());
        prop_assert!(all.iter().all(|slot| Arc::ptr_eq(slot, &resolved)));
    }
}

// Property: transient lists follow registration order, one element per producer
proptest! {
    #[test]
    fn transient_lists_follow_registration_order(priorities in prop::collection::vec(any::<i32>(), 0..8)) {
        let registry = Registry::new();
        register_slots(&registry, &priorities, false);

        let all = registry.get_all::<Slot>().unwrap();
        let order: Vec<usize> = all.iter().map(|slot| slot.0).collect();
        prop_assert_eq!(order, (0..priorities.len()).collect::<Vec<_>>());
    }
}

// Property: registering the same name twice never adds a second producer
proptest! {
    #[test]
    fn duplicate_names_are_ignored(names in prop::collection::vec("[a-c]", 1..10)) {
        let registry = Registry::new();
        for name in &names {
            Injectable::new(Ty::class::<Slot>().constructor(|_| Ok(Slot(0))))
                .name(name.clone())
                .register_in(&registry);
        }

        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(registry.len(), unique.len());
    }
}

fn descriptor() -> impl Strategy<Value = TypeDesc> {
    let leaf = prop_oneof![
        Just(TypeDesc::Any),
        Just(TypeDesc::plain::<u8>()),
        Just(TypeDesc::plain::<String>()),
        Just(TypeDesc::plain::<Slot>()),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeDesc::list_of),
            inner.clone().prop_map(TypeDesc::type_of),
            inner.clone().prop_map(TypeDesc::eventually),
            (prop::collection::vec(inner.clone(), 0..3), inner)
                .prop_map(|(params, ret)| TypeDesc::callable(params, ret)),
        ]
    })
}

// Property: every descriptor satisfies itself and the wildcard
proptest! {
    #[test]
    fn compatibility_is_reflexive(desc in descriptor()) {
        prop_assert!(compat::is_compatible(&desc, &desc));
        prop_assert!(compat::is_compatible(&desc, &TypeDesc::Any));
    }
}

// Property: a plain request is only ever satisfied by plain candidates
proptest! {
    #[test]
    fn plain_requests_need_plain_candidates(desc in descriptor()) {
        let requested = TypeDesc::plain::<Slot>();
        let compatible = compat::is_compatible(&desc, &requested);
        prop_assert_eq!(compatible, desc == requested);
    }
}
