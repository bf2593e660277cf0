//! Deferred effects queued by entities during a frame.
//!
//! Entities react to collisions, edges and logic passes while the world is
//! being traversed, so they cannot remove, spawn, or change game state on the
//! spot. They queue a [`Command`] on the frame's [`CommandBuffer`] instead,
//! tagged with who issued it and a [`CausalReason`]. The game loop drains the
//! buffer in FIFO order once the traversal is done.
//!
//! # Example
//!
//! ```
//! use orrery_ecs::entity::EntityId;
//! use orrery_engine::command::{CausalReason, CommandBuffer, CommandKind, GameSignal};
//!
//! let shot = EntityId::new(4, 0);
//! let hostile = EntityId::new(9, 0);
//!
//! let mut cmds = CommandBuffer::new();
//! cmds.remove(shot, shot, CausalReason::Collision(shot, hostile));
//! cmds.remove(hostile, shot, CausalReason::Collision(shot, hostile));
//! cmds.signal(GameSignal::HostileEliminated, shot, CausalReason::Collision(shot, hostile));
//!
//! let drained = cmds.drain();
//! assert_eq!(drained.len(), 3);
//! assert!(matches!(drained[2].kind, CommandKind::Signal(GameSignal::HostileEliminated)));
//! assert!(cmds.is_empty());
//! ```

use orrery_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};

use crate::entity::EntityBox;

// ---------------------------------------------------------------------------
// CausalReason
// ---------------------------------------------------------------------------

/// Why a command was issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CausalReason {
    /// Overlap between the two entities, issuer first.
    Collision(EntityId, EntityId),
    /// The entity moved outside the region where it is meaningful.
    LeftPlayfield,
    /// Named game rule (e.g. `"hostile_reached_edge"`).
    GameRule(String),
    /// Direct result of player input.
    PlayerInput(String),
}

// ---------------------------------------------------------------------------
// GameSignal
// ---------------------------------------------------------------------------

/// Game-level events an entity can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameSignal {
    /// The player's ship was destroyed or overrun.
    PlayerEliminated,
    /// A hostile was destroyed by the player.
    HostileEliminated,
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// What a command asks for.
#[derive(Debug)]
pub enum CommandKind {
    /// Mark the entity for removal at the end of the frame.
    Remove(EntityId),
    /// Add a new entity at the end of the frame.
    Spawn(EntityBox),
    /// Raise a game-level event.
    Signal(GameSignal),
    /// Run [`do_logic`](crate::entity::Entity::do_logic) on every entity
    /// this frame.
    RequestLogic,
}

/// A queued effect with its provenance.
#[derive(Debug)]
pub struct Command {
    pub kind: CommandKind,
    /// The entity that queued it.
    pub issued_by: EntityId,
    pub reason: CausalReason,
    /// Position in the buffer since the last drain.
    pub command_index: u32,
}

// ---------------------------------------------------------------------------
// CommandBuffer
// ---------------------------------------------------------------------------

/// FIFO queue of commands for one frame.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    next_index: u32,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: CommandKind, issued_by: EntityId, reason: CausalReason) {
        let command_index = self.next_index;
        self.next_index += 1;
        self.commands.push(Command {
            kind,
            issued_by,
            reason,
            command_index,
        });
    }

    pub fn remove(&mut self, target: EntityId, issued_by: EntityId, reason: CausalReason) {
        self.push(CommandKind::Remove(target), issued_by, reason);
    }

    pub fn spawn(&mut self, entity: EntityBox, issued_by: EntityId, reason: CausalReason) {
        self.push(CommandKind::Spawn(entity), issued_by, reason);
    }

    pub fn signal(&mut self, signal: GameSignal, issued_by: EntityId, reason: CausalReason) {
        self.push(CommandKind::Signal(signal), issued_by, reason);
    }

    pub fn request_logic(&mut self, issued_by: EntityId, reason: CausalReason) {
        self.push(CommandKind::RequestLogic, issued_by, reason);
    }

    /// Queued commands in insertion order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Targets of every queued removal.
    pub fn removal_targets(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.commands.iter().filter_map(|c| match c.kind {
            CommandKind::Remove(target) => Some(target),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take every queued command, oldest first, and reset the index counter.
    pub fn drain(&mut self) -> Vec<Command> {
        self.next_index = 0;
        std::mem::take(&mut self.commands)
    }

    /// Discard everything queued.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.next_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> EntityId {
        EntityId::new(n, 0)
    }

    #[test]
    fn commands_keep_fifo_order_and_indices() {
        let mut cmds = CommandBuffer::new();
        cmds.request_logic(id(1), CausalReason::GameRule("edge".into()));
        cmds.remove(id(2), id(2), CausalReason::LeftPlayfield);
        cmds.signal(
            GameSignal::PlayerEliminated,
            id(3),
            CausalReason::GameRule("overrun".into()),
        );

        let indices: Vec<u32> = cmds.commands().iter().map(|c| c.command_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(matches!(cmds.commands()[0].kind, CommandKind::RequestLogic));
        assert_eq!(cmds.commands()[1].reason, CausalReason::LeftPlayfield);
    }

    #[test]
    fn drain_resets_index() {
        let mut cmds = CommandBuffer::new();
        cmds.remove(id(1), id(1), CausalReason::LeftPlayfield);
        assert_eq!(cmds.drain().len(), 1);

        cmds.remove(id(2), id(2), CausalReason::LeftPlayfield);
        assert_eq!(cmds.commands()[0].command_index, 0);
    }

    #[test]
    fn removal_targets_skip_other_kinds() {
        let mut cmds = CommandBuffer::new();
        cmds.remove(id(1), id(5), CausalReason::Collision(id(5), id(1)));
        cmds.signal(
            GameSignal::HostileEliminated,
            id(5),
            CausalReason::Collision(id(5), id(1)),
        );
        cmds.remove(id(5), id(5), CausalReason::Collision(id(5), id(1)));

        let targets: Vec<EntityId> = cmds.removal_targets().collect();
        assert_eq!(targets, vec![id(1), id(5)]);
    }
}
