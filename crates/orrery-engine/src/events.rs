//! Notifications the game loop sends to the outside world.
//!
//! A [`GameObserver`] is told about entity additions and removals, the end of
//! a round, and mode changes. Every method has a no-op default, so an
//! observer only implements what it cares about. `()` is the observer that
//! ignores everything.
//!
//! [`EventLog`] records every notification as a [`GameEvent`], which is what
//! tests and the headless demo use.

use orrery_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Role};
use crate::game_loop::Mode;

/// Receives game notifications. All methods default to doing nothing.
pub trait GameObserver {
    fn on_entity_spawned(&mut self, _id: EntityId, _entity: &dyn Entity) {}

    fn on_entity_removed(&mut self, _id: EntityId, _entity: &dyn Entity) {}

    /// Every hostile has been eliminated.
    fn on_win(&mut self) {}

    /// The player has been eliminated.
    fn on_loss(&mut self) {}

    /// A hostile was destroyed; `remaining` is the count still alive.
    fn on_hostile_eliminated(&mut self, _remaining: usize) {}

    fn on_mode_changed(&mut self, _from: Mode, _to: Mode) {}
}

impl GameObserver for () {}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Spawned {
        id: EntityId,
        role: Role,
        label: String,
    },
    Removed {
        id: EntityId,
        role: Role,
        label: String,
    },
    Win,
    Loss,
    HostileEliminated {
        remaining: usize,
    },
    ModeChanged {
        from: Mode,
        to: Mode,
    },
}

/// Observer that keeps every notification in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of `Spawned` events for entities with `role`.
    pub fn spawned(&self, role: Role) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::Spawned { role: r, .. } if *r == role))
            .count()
    }

    /// Number of `Removed` events for entities with `role`.
    pub fn removed(&self, role: Role) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::Removed { role: r, .. } if *r == role))
            .count()
    }

    pub fn contains(&self, event: &GameEvent) -> bool {
        self.events.contains(event)
    }
}

impl GameObserver for EventLog {
    fn on_entity_spawned(&mut self, id: EntityId, entity: &dyn Entity) {
        self.events.push(GameEvent::Spawned {
            id,
            role: entity.role(),
            label: entity.label().to_owned(),
        });
    }

    fn on_entity_removed(&mut self, id: EntityId, entity: &dyn Entity) {
        self.events.push(GameEvent::Removed {
            id,
            role: entity.role(),
            label: entity.label().to_owned(),
        });
    }

    fn on_win(&mut self) {
        self.events.push(GameEvent::Win);
    }

    fn on_loss(&mut self) {
        self.events.push(GameEvent::Loss);
    }

    fn on_hostile_eliminated(&mut self, remaining: usize) {
        self.events.push(GameEvent::HostileEliminated { remaining });
    }

    fn on_mode_changed(&mut self, from: Mode, to: Mode) {
        self.events.push(GameEvent::ModeChanged { from, to });
    }
}
