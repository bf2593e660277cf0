use orrery_ecs::entity::EntityId;
use tracing::debug;

use crate::assets::Sprite;
use crate::bounded::{self, Extent};
use crate::command::{CausalReason, CommandBuffer, GameSignal};
use crate::config::Playfield;
use crate::entity::{Entity, Kinematics, Role, Steering};

/// The ship will not move left of this x.
const LEFT_LIMIT: f64 = 10.0;
/// Distance from the right edge the ship will not move past.
const RIGHT_MARGIN: f64 = 50.0;

/// The player's ship. Steered horizontally; destroyed by touching a hostile.
#[derive(Debug)]
pub struct ShipEntity {
    kin: Kinematics,
    sprite: Sprite,
    playfield: Playfield,
}

impl ShipEntity {
    pub fn new(sprite: Sprite, x: f64, y: f64, playfield: Playfield) -> Self {
        Self {
            kin: Kinematics::at(x, y),
            sprite,
            playfield,
        }
    }
}

impl Entity for ShipEntity {
    fn role(&self) -> Role {
        Role::Player
    }

    fn label(&self) -> &str {
        "ship"
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kin
    }

    fn steering(&mut self) -> Steering<'_> {
        Steering::new(&mut self.kin)
    }

    /// Moves like any bounded entity, except that a step toward a side is
    /// refused once the ship is already past that side's limit.
    fn advance(&mut self, elapsed_ms: u64) {
        let right_limit = f64::from(self.playfield.width) - RIGHT_MARGIN;
        if self.kin.dx() < 0.0 && self.kin.x() < LEFT_LIMIT {
            return;
        }
        if self.kin.dx() > 0.0 && self.kin.x() > right_limit {
            return;
        }
        self.kin.advance(elapsed_ms);
    }

    fn extent(&self) -> Extent {
        self.sprite.extent()
    }

    fn is_bounded(&self) -> bool {
        true
    }

    fn collides_with(&self, other: &dyn Entity) -> bool {
        bounded::overlaps(self, other)
    }

    fn collided_with(
        &mut self,
        this: EntityId,
        other_id: EntityId,
        other: &dyn Entity,
        commands: &mut CommandBuffer,
    ) {
        if other.role() == Role::Hostile {
            debug!(ship = %this, hostile = %other_id, "ship hit by hostile");
            commands.signal(
                GameSignal::PlayerEliminated,
                this,
                CausalReason::Collision(this, other_id),
            );
        }
    }

    fn sprite(&self) -> Option<&Sprite> {
        Some(&self.sprite)
    }
}
