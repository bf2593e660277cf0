//! Orrery ECS -- entity identity and storage for the Orrery engine.
//!
//! This crate owns the part of the simulation that has no physics in it:
//! generational [`EntityId`](entity::EntityId) handles, and the
//! insertion-ordered [`EntityWorld`](world::EntityWorld) that holds live
//! entities and defers their removal to the end of a frame.
//!
//! # Quick Start
//!
//! ```
//! use orrery_ecs::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Rock { x: f64 }
//!
//! let mut world = EntityWorld::new();
//! let rock = world.add(Rock { x: 1.0 });
//!
//! for (_, r) in world.iter_mut() {
//!     r.x += 1.0;
//! }
//! assert_eq!(world.get(rock), Some(&Rock { x: 2.0 }));
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by world operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity does not exist (removed, reset away, or never allocated).
    #[error("entity {entity:?} does not exist (stale or never allocated)")]
    StaleEntity { entity: entity::EntityId },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::world::EntityWorld;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
