//! Serializable view of a running game.
//!
//! A [`WorldSnapshot`] is a read-only copy of the loop state plus one
//! [`EntitySnapshot`] per live entity, in insertion order. It is what the
//! headless demo prints and what tests compare against.

use orrery_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Role};
use crate::game_loop::{GameLoop, Mode};

/// State of a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub role: Role,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mass: Option<f64>,
    /// Net force from the latest gravity pass.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub force: Option<(f64, f64)>,
}

impl EntitySnapshot {
    pub fn capture(id: EntityId, entity: &dyn Entity) -> Self {
        let kin = entity.kinematics();
        let gravity = entity.gravity();
        Self {
            id,
            role: entity.role(),
            label: entity.label().to_owned(),
            x: kin.x(),
            y: kin.y(),
            dx: kin.dx(),
            dy: kin.dy(),
            mass: gravity.map(|g| g.mass()),
            force: gravity.map(|g| g.force()),
        }
    }
}

/// State of the whole loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub mode: Mode,
    pub paused: bool,
    pub message: Option<String>,
    pub frame: u64,
    pub active_frames: u64,
    pub hostiles_remaining: usize,
    pub entities: Vec<EntitySnapshot>,
}

impl WorldSnapshot {
    pub fn capture(game: &GameLoop) -> Self {
        Self {
            mode: game.mode(),
            paused: game.is_paused(),
            message: game.message().map(str::to_owned),
            frame: game.frame_count(),
            active_frames: game.active_frames(),
            hostiles_remaining: game.hostiles_remaining(),
            entities: game
                .world()
                .iter()
                .map(|(id, e)| EntitySnapshot::capture(id, e.as_ref()))
                .collect(),
        }
    }

    /// Entities with the given role.
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &EntitySnapshot> {
        self.entities.iter().filter(move |e| e.role == role)
    }

    pub fn find(&self, label: &str) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.label == label)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl GameLoop {
    /// Capture the current state.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SpriteCatalog;
    use crate::config::EngineConfig;
    use crate::input::InputSnapshot;

    #[test]
    fn snapshot_lists_entities_in_order_with_gravity_state() {
        let mut game =
            GameLoop::new(EngineConfig::default(), &SpriteCatalog::with_defaults()).unwrap();
        game.frame(0, &InputSnapshot::any_key(), &mut (), &mut ());
        game.frame(16, &InputSnapshot::IDLE, &mut (), &mut ());

        let snap = game.snapshot();
        assert_eq!(snap.mode, Mode::Running);
        assert_eq!(snap.frame, 2);
        let labels: Vec<&str> = snap.entities.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["sun", "mercury", "terra", "jupiter"]);

        let sun = snap.find("sun").unwrap();
        assert_eq!(sun.mass, Some(10_000.0));
        // The planets all sit to the right of the sun and pull it that way.
        assert!(sun.force.unwrap().0 > 0.0);
    }

    #[test]
    fn non_gravity_fields_are_omitted_from_json() {
        let mut game = {
            let mut cfg = EngineConfig::default();
            cfg.scenario.kind = crate::scenario::ScenarioKind::Invaders;
            GameLoop::new(cfg, &SpriteCatalog::with_defaults()).unwrap()
        };
        game.frame(0, &InputSnapshot::any_key(), &mut (), &mut ());

        let snap = game.snapshot();
        assert_eq!(snap.with_role(Role::Hostile).count(), 60);
        let json = serde_json::to_string(&snap.entities[0]).unwrap();
        assert!(!json.contains("mass"));
        assert!(json.contains("\"role\":\"player\""));
    }
}
