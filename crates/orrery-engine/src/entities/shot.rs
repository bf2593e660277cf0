use orrery_ecs::entity::EntityId;
use tracing::trace;

use crate::assets::Sprite;
use crate::bounded::{self, Extent};
use crate::command::{CausalReason, CommandBuffer, GameSignal};
use crate::entity::{Entity, Kinematics, Role, Steering};

/// Shots above this y have left the playfield.
const VANISH_Y: f64 = -100.0;

/// A shot fired by the player, travelling vertically.
#[derive(Debug)]
pub struct ShotEntity {
    kin: Kinematics,
    sprite: Sprite,
    /// Set on the first hit so one shot never eliminates two hostiles.
    used: bool,
}

impl ShotEntity {
    pub fn new(sprite: Sprite, x: f64, y: f64, speed: f64) -> Self {
        Self {
            kin: Kinematics::at(x, y).with_velocity(0.0, speed),
            sprite,
            used: false,
        }
    }

    pub fn is_used(&self) -> bool {
        self.used
    }
}

impl Entity for ShotEntity {
    fn role(&self) -> Role {
        Role::Projectile
    }

    fn label(&self) -> &str {
        "shot"
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kin
    }

    fn steering(&mut self) -> Steering<'_> {
        Steering::new(&mut self.kin)
    }

    fn advance(&mut self, elapsed_ms: u64) {
        self.kin.advance(elapsed_ms);
    }

    fn after_move(&self, this: EntityId, commands: &mut CommandBuffer) {
        if self.kin.y() < VANISH_Y {
            commands.remove(this, this, CausalReason::LeftPlayfield);
        }
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
        if self.used || other.role() != Role::Hostile {
            return;
        }
        self.used = true;
        trace!(shot = %this, hostile = %other_id, "shot hit hostile");

        let reason = CausalReason::Collision(this, other_id);
        commands.remove(this, this, reason.clone());
        commands.remove(other_id, this, reason.clone());
        commands.signal(GameSignal::HostileEliminated, this, reason);
    }

    fn sprite(&self) -> Option<&Sprite> {
        Some(&self.sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Playfield;
    use crate::entities::test_support::{signals, sprite};
    use crate::entities::HostileEntity;

    fn hostile() -> HostileEntity {
        HostileEntity::new(sprite(28, 20), 100.0, 100.0, 75.0, Playfield::default())
    }

    #[test]
    fn moves_up_at_its_speed() {
        let mut shot = ShotEntity::new(sprite(6, 16), 50.0, 500.0, -300.0);
        shot.advance(500);
        assert_eq!(shot.kinematics().position(), (50.0, 350.0));
    }

    #[test]
    fn removes_itself_above_vanish_line() {
        let this = EntityId::new(3, 0);
        let mut cmds = CommandBuffer::new();

        let shot = ShotEntity::new(sprite(6, 16), 50.0, -99.0, -300.0);
        shot.after_move(this, &mut cmds);
        assert!(cmds.is_empty());

        let shot = ShotEntity::new(sprite(6, 16), 50.0, -101.0, -300.0);
        shot.after_move(this, &mut cmds);
        assert_eq!(cmds.removal_targets().collect::<Vec<_>>(), vec![this]);
    }

    #[test]
    fn hit_removes_both_and_signals_once() {
        let (this, target) = (EntityId::new(0, 0), EntityId::new(1, 0));
        let mut shot = ShotEntity::new(sprite(6, 16), 100.0, 100.0, -300.0);
        let mut cmds = CommandBuffer::new();

        shot.collided_with(this, target, &hostile(), &mut cmds);
        shot.collided_with(this, EntityId::new(2, 0), &hostile(), &mut cmds);

        assert!(shot.is_used());
        assert_eq!(
            cmds.removal_targets().collect::<Vec<_>>(),
            vec![this, target]
        );
        assert_eq!(signals(&cmds), vec![GameSignal::HostileEliminated]);
    }

    #[test]
    fn ignores_non_hostiles() {
        let mut shot = ShotEntity::new(sprite(6, 16), 100.0, 100.0, -300.0);
        let other = ShotEntity::new(sprite(6, 16), 100.0, 100.0, -300.0);
        let mut cmds = CommandBuffer::new();
        shot.collided_with(EntityId::new(0, 0), EntityId::new(1, 0), &other, &mut cmds);
        assert!(cmds.is_empty());
        assert!(!shot.is_used());
    }
}
