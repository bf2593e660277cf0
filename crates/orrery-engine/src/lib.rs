//! Orrery Engine -- entities, N-body gravity and the frame loop that drives them.
//!
//! This crate builds on [`orrery_ecs`] to provide the simulation itself: the
//! [`Entity`](entity::Entity) contract, bounded (AABB) collision, pairwise
//! gravity, the deferred [`CommandBuffer`](command::CommandBuffer) that
//! collision responses write into, and the [`GameLoop`](game_loop::GameLoop)
//! state machine. Windowing, image decoding and raw input capture live
//! outside; the loop talks to them through the [`Clock`](clock::Clock),
//! [`InputSource`](input::InputSource), [`DrawSurface`](render::DrawSurface),
//! [`SpriteStore`](assets::SpriteStore) and
//! [`GameObserver`](events::GameObserver) traits.
//!
//! # Quick Start
//!
//! ```
//! use orrery_engine::prelude::*;
//!
//! let mut config = EngineConfig::default();
//! config.frame_sleep_ms = 0;
//! config.max_active_frames = Some(100);
//!
//! let mut game = GameLoop::new(config, &SpriteCatalog::with_defaults()).unwrap();
//! let clock = SteppingClock::new(0, 16);
//! let mut input = ScriptedInput::new([InputSnapshot::any_key()]).then(InputSnapshot::IDLE);
//!
//! let summary = game.run(&clock, &mut input, &mut DrawList::new(), &mut EventLog::new());
//! assert_eq!(summary.simulated_frames, 99);
//! assert_eq!(game.mode(), Mode::Over);
//! ```

#![deny(unsafe_code)]

pub mod assets;
pub mod bounded;
pub mod clock;
pub mod command;
pub mod config;
pub mod cooldown;
pub mod entities;
pub mod entity;
pub mod error;
pub mod events;
pub mod game_loop;
pub mod gravity;
pub mod input;
pub mod render;
pub mod scenario;
pub mod snapshot;

/// Re-export the ECS crate for convenience.
pub use orrery_ecs;

pub use error::EngineError;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use orrery_ecs::prelude::*;

    pub use crate::assets::{AssetError, Sprite, SpriteCatalog, SpriteStore};
    pub use crate::bounded::{Aabb, Extent};
    pub use crate::clock::{Clock, ManualClock, SteppingClock, SystemClock};
    pub use crate::command::{CausalReason, CommandBuffer, CommandKind, GameSignal};
    pub use crate::config::{EngineConfig, Playfield};
    pub use crate::cooldown::Cooldown;
    pub use crate::entities::{HostileEntity, PlanetEntity, ShipEntity, ShotEntity};
    pub use crate::entity::{Entity, EntityBox, Kinematics, Role, Steering, World};
    pub use crate::error::EngineError;
    pub use crate::events::{EventLog, GameEvent, GameObserver};
    pub use crate::game_loop::{FrameReport, GameLoop, Mode, RoundOutcome, RunSummary};
    pub use crate::gravity::{GravityBody, GravityConfig, GravitySystem, PassStats};
    pub use crate::input::{InputSnapshot, InputSource, ScriptedInput};
    pub use crate::render::{DrawCommand, DrawList, DrawSurface};
    pub use crate::scenario::{BeltSpec, PlanetSpec, Scenario, ScenarioConfig, ScenarioKind};
    pub use crate::snapshot::{EntitySnapshot, WorldSnapshot};
}
