//! Insertion-ordered entity storage with deferred removal.
//!
//! [`EntityWorld`] owns the live entities of a simulation. Traversals (the
//! move pass, the collision pass, the draw pass) always see entities in the
//! order they were added, so anything layered on top of that order (collision
//! resolution, draw layering) is deterministic.
//!
//! The live collection never changes while a frame is being processed.
//! Anything that wants an entity gone calls
//! [`mark_for_removal`](EntityWorld::mark_for_removal) during the frame; the
//! driver applies all marks at once with
//! [`commit_removals`](EntityWorld::commit_removals) after every traversal of
//! that frame has finished.
//!
//! # Example
//!
//! ```
//! use orrery_ecs::prelude::*;
//!
//! let mut world = EntityWorld::new();
//! let a = world.add("ship");
//! let b = world.add("shot");
//!
//! assert!(world.mark_for_removal(b));
//! assert!(!world.mark_for_removal(b)); // already pending
//! assert_eq!(world.len(), 2); // nothing removed until commit
//!
//! let removed = world.commit_removals();
//! assert_eq!(removed, vec![(b, "shot")]);
//! assert_eq!(world.ids(), vec![a]);
//! ```

use std::collections::HashSet;

use tracing::debug;

use crate::entity::{EntityAllocator, EntityId};
use crate::EcsError;

// ---------------------------------------------------------------------------
// EntityWorld
// ---------------------------------------------------------------------------

/// The live entity collection plus the removals pending for this frame.
///
/// `T` is whatever the engine stores per entity, typically a boxed trait
/// object. The world itself knows nothing about movement or collisions.
#[derive(Debug)]
pub struct EntityWorld<T> {
    allocator: EntityAllocator,
    /// Live entities in insertion order. Each id appears at most once.
    entries: Vec<(EntityId, T)>,
    /// Ids marked during the current frame, in marking order.
    pending: Vec<EntityId>,
}

impl<T> Default for EntityWorld<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityWorld<T> {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            entries: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Add an entity at the end of the traversal order and return its handle.
    pub fn add(&mut self, entity: T) -> EntityId {
        let id = self.allocator.allocate();
        self.entries.push((id, entity));
        id
    }

    /// Queue `id` for removal at the next [`commit_removals`](Self::commit_removals).
    ///
    /// Returns `true` if the mark was recorded. Marking an entity that is
    /// already pending, already removed, or never existed returns `false` and
    /// changes nothing.
    pub fn mark_for_removal(&mut self, id: EntityId) -> bool {
        if !self.allocator.is_live(id) || self.pending.contains(&id) {
            return false;
        }
        self.pending.push(id);
        true
    }

    /// Whether `id` is live but queued for removal this frame.
    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.pending.contains(&id)
    }

    /// Ids queued for removal, in the order they were marked.
    pub fn pending_removals(&self) -> &[EntityId] {
        &self.pending
    }

    /// Apply every pending removal at once.
    ///
    /// Returns the removed entities in marking order so the caller can
    /// notify collaborators. Surviving entities keep their relative order.
    pub fn commit_removals(&mut self) -> Vec<(EntityId, T)> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        let doomed: HashSet<EntityId> = self.pending.iter().copied().collect();
        let mut taken: Vec<(EntityId, T)> = Vec::with_capacity(doomed.len());
        let mut kept: Vec<(EntityId, T)> = Vec::with_capacity(self.entries.len());
        for (id, entity) in self.entries.drain(..) {
            if doomed.contains(&id) {
                taken.push((id, entity));
            } else {
                kept.push((id, entity));
            }
        }
        self.entries = kept;

        // Re-sort removed entities into the order they were marked.
        let mut removed = Vec::with_capacity(taken.len());
        for id in self.pending.drain(..) {
            if let Some(pos) = taken.iter().position(|(t, _)| *t == id) {
                let entry = taken.swap_remove(pos);
                self.allocator.retire(entry.0);
                removed.push(entry);
            }
        }

        debug!(
            removed = removed.len(),
            remaining = self.entries.len(),
            "committed removals"
        );
        removed
    }

    /// Drop every entity and every pending mark (world reset).
    ///
    /// Returns the entities that were live, in insertion order. All handles
    /// handed out before the reset become stale.
    pub fn clear(&mut self) -> Vec<(EntityId, T)> {
        self.pending.clear();
        self.allocator.retire_all();
        std::mem::take(&mut self.entries)
    }

    // -- lookup -------------------------------------------------------------

    pub fn contains(&self, id: EntityId) -> bool {
        self.allocator.is_live(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        if !self.allocator.is_live(id) {
            return None;
        }
        self.entries.iter().find(|(e, _)| *e == id).map(|(_, t)| t)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.allocator.is_live(id) {
            return None;
        }
        self.entries
            .iter_mut()
            .find(|(e, _)| *e == id)
            .map(|(_, t)| t)
    }

    /// Like [`get`](Self::get), but reports a stale handle as an error.
    pub fn get_or_err(&self, id: EntityId) -> Result<&T, EcsError> {
        self.get(id).ok_or(EcsError::StaleEntity { entity: id })
    }

    /// Number of live entities, including those pending removal.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live ids in insertion order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    // -- traversal ----------------------------------------------------------

    /// Iterate live entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entries.iter().map(|(id, t)| (*id, t))
    }

    /// Iterate live entities mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entries.iter_mut().map(|(id, t)| (*id, t))
    }

    /// Visit every live entity in insertion order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(EntityId, &T),
    {
        for (id, entity) in &self.entries {
            f(*id, entity);
        }
    }

    /// Visit every unordered pair `(i, j)`, `i < j` in insertion order, with
    /// mutable access to both sides. Each pair is visited exactly once.
    pub fn for_each_pair_mut<F>(&mut self, mut f: F)
    where
        F: FnMut((EntityId, &mut T), (EntityId, &mut T)),
    {
        let n = self.entries.len();
        for i in 0..n {
            let (head, tail) = self.entries.split_at_mut(i + 1);
            let (id_a, a) = &mut head[i];
            for (id_b, b) in tail.iter_mut() {
                f((*id_a, &mut *a), (*id_b, b));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
