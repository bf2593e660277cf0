//! Entity handles and their allocation.
//!
//! An [`EntityId`] names a slot *index* together with the slot's
//! *generation*. Removing an entity bumps the generation of its slot, so any
//! handle still held by a collaborator (an observer, a queued command) stops
//! resolving instead of silently pointing at whatever entity reuses the slot
//! next.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A generational handle to a live entity.
///
/// Handles order by slot first, then generation, and display as
/// `<index>v<generation>`:
///
/// ```
/// use orrery_ecs::entity::EntityId;
///
/// let id = EntityId::new(7, 3);
/// assert_eq!((id.index(), id.generation()), (7, 3));
/// assert_eq!(id.to_string(), "7v3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot in the allocator.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// How many times the slot had been retired when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({self})")
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Hands out [`EntityId`]s and retires them.
///
/// Retired slots wait in a FIFO queue before reuse, which spreads generation
/// bumps across slots instead of cycling one hot index.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: VecDeque<u32>,
    live_count: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle, reusing a retired slot when one is queued.
    pub fn allocate(&mut self) -> EntityId {
        self.live_count += 1;
        if let Some(index) = self.free.pop_front() {
            let slot = index as usize;
            self.live[slot] = true;
            return EntityId::new(index, self.generations[slot]);
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        EntityId::new(index, 0)
    }

    /// Retire a handle. Returns `false` (and changes nothing) when the handle
    /// is already stale, so retiring twice is harmless.
    pub fn retire(&mut self, id: EntityId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        let slot = id.index() as usize;
        self.live[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push_back(id.index());
        self.live_count -= 1;
        true
    }

    /// Whether `id` names a live entity of the current generation.
    pub fn is_live(&self, id: EntityId) -> bool {
        let slot = id.index() as usize;
        slot < self.generations.len()
            && self.live[slot]
            && self.generations[slot] == id.generation()
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Retire every live handle at once (world reset).
    pub fn retire_all(&mut self) {
        for slot in 0..self.generations.len() {
            if self.live[slot] {
                self.live[slot] = false;
                self.generations[slot] = self.generations[slot].wrapping_add(1);
                self.free.push_back(slot as u32);
            }
        }
        self.live_count = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_have_distinct_indices() {
        let mut alloc = EntityAllocator::new();
        let mut indices: Vec<u32> = (0..64).map(|_| alloc.allocate().index()).collect();
        indices.dedup();
        assert_eq!(indices.len(), 64);
        assert_eq!(alloc.live_count(), 64);
    }

    #[test]
    fn reused_slot_gets_next_generation() {
        let mut alloc = EntityAllocator::new();
        let first = alloc.allocate();
        assert!(alloc.retire(first));

        let second = alloc.allocate();
        assert_eq!(second.index(), first.index());
        assert_eq!(second.generation(), first.generation() + 1);
        assert!(!alloc.is_live(first), "old handle must stay stale");
        assert!(alloc.is_live(second));
    }

    #[test]
    fn retiring_twice_is_a_no_op() {
        let mut alloc = EntityAllocator::new();
        let id = alloc.allocate();
        assert!(alloc.retire(id));
        assert!(!alloc.retire(id));
        assert_eq!(alloc.live_count(), 0);
    }

    #[test]
    fn retire_all_invalidates_every_handle() {
        let mut alloc = EntityAllocator::new();
        let ids: Vec<EntityId> = (0..5).map(|_| alloc.allocate()).collect();
        alloc.retire_all();

        assert_eq!(alloc.live_count(), 0);
        assert!(ids.iter().all(|id| !alloc.is_live(*id)));

        // Slots are recycled in FIFO order after a reset.
        let reused = alloc.allocate();
        assert_eq!(reused.index(), 0);
        assert_eq!(reused.generation(), 1);
    }

    #[test]
    fn display_and_debug_forms() {
        let id = EntityId::new(7, 3);
        assert_eq!(id.to_string(), "7v3");
        assert_eq!(format!("{id:?}"), "EntityId(7v3)");
    }

    #[test]
    fn handles_order_by_slot_then_generation() {
        let mut ids = vec![
            EntityId::new(2, 0),
            EntityId::new(1, 5),
            EntityId::new(1, 2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![EntityId::new(1, 2), EntityId::new(1, 5), EntityId::new(2, 0)]
        );
    }
}
