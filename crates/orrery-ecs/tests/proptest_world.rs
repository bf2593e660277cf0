//! Property tests for the entity world.
//!
//! Random sequences of add / mark / commit operations are run against both
//! the real [`EntityWorld`] and a plain `Vec` model; the two must agree after
//! every step.

use orrery_ecs::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum WorldOp {
    Add(u32),
    Mark(usize),
    MarkTwice(usize),
    Commit,
    MarkStale(usize),
}

fn world_op_strategy() -> impl Strategy<Value = WorldOp> {
    prop_oneof![
        3 => any::<u32>().prop_map(WorldOp::Add),
        2 => (0..32usize).prop_map(WorldOp::Mark),
        1 => (0..32usize).prop_map(WorldOp::MarkTwice),
        2 => Just(WorldOp::Commit),
        1 => (0..32usize).prop_map(WorldOp::MarkStale),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    /// The world behaves like an ordered list with a deferred delete set.
    ///
    /// Invariants checked:
    /// - Live ids are unique and in insertion order.
    /// - Nothing disappears before a commit.
    /// - Marking the same id twice, or a stale id, changes nothing.
    #[test]
    fn world_matches_ordered_model(ops in prop::collection::vec(world_op_strategy(), 1..60)) {
        let mut world: EntityWorld<u32> = EntityWorld::new();
        let mut model: Vec<(EntityId, u32)> = Vec::new();
        let mut pending: Vec<EntityId> = Vec::new();
        let mut retired: Vec<EntityId> = Vec::new();

        for op in ops {
            match op {
                WorldOp::Add(v) => {
                    let id = world.add(v);
                    prop_assert!(!model.iter().any(|(m, _)| *m == id));
                    model.push((id, v));
                }
                WorldOp::Mark(i) | WorldOp::MarkTwice(i) if !model.is_empty() => {
                    let id = model[i % model.len()].0;
                    let first = world.mark_for_removal(id);
                    prop_assert_eq!(first, !pending.contains(&id));
                    if first {
                        pending.push(id);
                    }
                    if matches!(op, WorldOp::MarkTwice(_)) {
                        prop_assert!(!world.mark_for_removal(id));
                    }
                }
                WorldOp::Mark(_) | WorldOp::MarkTwice(_) => {}
                WorldOp::MarkStale(i) if !retired.is_empty() => {
                    let id = retired[i % retired.len()];
                    prop_assert!(!world.mark_for_removal(id));
                }
                WorldOp::MarkStale(_) => {}
                WorldOp::Commit => {
                    let removed = world.commit_removals();
                    let removed_ids: Vec<EntityId> = removed.iter().map(|(id, _)| *id).collect();
                    prop_assert_eq!(&removed_ids, &pending);
                    model.retain(|(id, _)| !pending.contains(id));
                    retired.append(&mut pending);
                }
            }

            let live: Vec<(EntityId, u32)> = world.iter().map(|(id, v)| (id, *v)).collect();
            prop_assert_eq!(&live, &model);
            prop_assert_eq!(world.pending_removals(), pending.as_slice());
        }
    }

    /// Pair traversal visits n * (n - 1) / 2 pairs, each once.
    #[test]
    fn pair_traversal_is_half_square(n in 0usize..40) {
        let mut world: EntityWorld<usize> = EntityWorld::new();
        for i in 0..n {
            world.add(i);
        }
        let mut seen = std::collections::HashSet::new();
        world.for_each_pair_mut(|(a, va), (b, vb)| {
            assert!(*va < *vb);
            assert!(seen.insert((a, b)));
        });
        prop_assert_eq!(seen.len(), n * n.saturating_sub(1) / 2);
    }
}

#[test]
fn entity_id_serializes_index_and_generation() {
    let id = EntityId::new(3, 1);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, r#"{"index":3,"generation":1}"#);
    let back: EntityId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
