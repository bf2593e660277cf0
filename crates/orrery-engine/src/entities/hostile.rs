use orrery_ecs::entity::EntityId;
use tracing::debug;

use crate::assets::Sprite;
use crate::bounded::{self, Extent};
use crate::command::{CausalReason, CommandBuffer, GameSignal};
use crate::config::Playfield;
use crate::entity::{Entity, Kinematics, Role, Steering};

const LEFT_EDGE: f64 = 10.0;
const RIGHT_MARGIN: f64 = 50.0;
/// How far the formation drops each time it reverses.
const DESCENT_STEP: f64 = 10.0;
/// Hostiles lower than `height - GROUND_MARGIN` have overrun the player.
const GROUND_MARGIN: f64 = 30.0;

/// A hostile sweeping side to side and stepping down at each edge.
///
/// Reaching an edge only requests a logic pass. The logic pass reverses the
/// direction of every hostile at once and schedules the descent, which is
/// applied in the hostile's next movement step.
#[derive(Debug)]
pub struct HostileEntity {
    kin: Kinematics,
    sprite: Sprite,
    playfield: Playfield,
    pending_descent: f64,
}

impl HostileEntity {
    /// `speed` is the initial horizontal velocity; negative moves left.
    pub fn new(sprite: Sprite, x: f64, y: f64, speed: f64, playfield: Playfield) -> Self {
        Self {
            kin: Kinematics::at(x, y).with_velocity(speed, 0.0),
            sprite,
            playfield,
            pending_descent: 0.0,
        }
    }

    fn at_edge(&self) -> bool {
        let right_edge = f64::from(self.playfield.width) - RIGHT_MARGIN;
        (self.kin.dx() < 0.0 && self.kin.x() < LEFT_EDGE)
            || (self.kin.dx() > 0.0 && self.kin.x() > right_edge)
    }
}

impl Entity for HostileEntity {
    fn role(&self) -> Role {
        Role::Hostile
    }

    fn label(&self) -> &str {
        "hostile"
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kin
    }

    fn steering(&mut self) -> Steering<'_> {
        Steering::new(&mut self.kin)
    }

    fn advance(&mut self, elapsed_ms: u64) {
        if self.pending_descent != 0.0 {
            self.kin.offset(0.0, self.pending_descent);
            self.pending_descent = 0.0;
        }
        self.kin.advance(elapsed_ms);
    }

    fn after_move(&self, this: EntityId, commands: &mut CommandBuffer) {
        if self.at_edge() {
            commands.request_logic(this, CausalReason::GameRule("hostile_reached_edge".into()));
        }
    }

    fn do_logic(&mut self, this: EntityId, commands: &mut CommandBuffer) {
        let dx = self.kin.dx();
        self.kin.set_horizontal_velocity(-dx);
        self.pending_descent += DESCENT_STEP;

        let ground = f64::from(self.playfield.height) - GROUND_MARGIN;
        if self.kin.y() + self.pending_descent > ground {
            debug!(hostile = %this, y = self.kin.y(), "hostiles reached the ground");
            commands.signal(
                GameSignal::PlayerEliminated,
                this,
                CausalReason::GameRule("hostile_reached_ground".into()),
            );
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

    fn sprite(&self) -> Option<&Sprite> {
        Some(&self.sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::test_support::{logic_requests, signals, sprite};

    fn hostile_at(x: f64, y: f64, speed: f64) -> HostileEntity {
        HostileEntity::new(sprite(28, 20), x, y, speed, Playfield::default())
    }

    #[test]
    fn requests_logic_only_at_edge_in_direction_of_travel() {
        let this = EntityId::new(0, 0);
        let mut cmds = CommandBuffer::new();

        hostile_at(5.0, 50.0, -75.0).after_move(this, &mut cmds);
        assert_eq!(logic_requests(&cmds), 1);

        // Already turned around: no second request.
        hostile_at(5.0, 50.0, 75.0).after_move(this, &mut cmds);
        hostile_at(400.0, 50.0, 75.0).after_move(this, &mut cmds);
        assert_eq!(logic_requests(&cmds), 1);

        hostile_at(751.0, 50.0, 75.0).after_move(this, &mut cmds);
        assert_eq!(logic_requests(&cmds), 2);
    }

    #[test]
    fn logic_reverses_and_descends_on_next_move() {
        let mut h = hostile_at(751.0, 50.0, 75.0);
        let mut cmds = CommandBuffer::new();
        h.do_logic(EntityId::new(0, 0), &mut cmds);

        assert_eq!(h.kinematics().dx(), -75.0);
        assert_eq!(h.kinematics().y(), 50.0);
        assert!(cmds.is_empty());

        h.advance(0);
        assert_eq!(h.kinematics().y(), 60.0);
        h.advance(0);
        assert_eq!(h.kinematics().y(), 60.0);
    }

    #[test]
    fn descending_past_ground_signals_player_eliminated() {
        let mut h = hostile_at(5.0, 565.0, -75.0);
        let mut cmds = CommandBuffer::new();
        h.do_logic(EntityId::new(0, 0), &mut cmds);
        assert_eq!(signals(&cmds), vec![GameSignal::PlayerEliminated]);
    }
}
