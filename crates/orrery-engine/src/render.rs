//! Drawing seam between the game loop and whatever puts pixels on screen.
//!
//! The loop calls [`DrawSurface::begin_frame`], then
//! [`draw`](DrawSurface::draw) once per entity in insertion order (so later
//! entities layer over earlier ones), then [`end_frame`](DrawSurface::end_frame).
//! Between rounds the frozen world is drawn the same way, followed by one or
//! more [`show_message`](DrawSurface::show_message) calls.
//!
//! [`DrawList`] is the headless surface: it records each frame as a list of
//! [`DrawCommand`] rectangles with a debug color per [`Role`].

use orrery_ecs::entity::EntityId;
use serde::Serialize;

use crate::entity::{Entity, Role};

/// Something the game loop can draw onto.
pub trait DrawSurface {
    fn begin_frame(&mut self) {}

    /// Draw `entity` with its top-left corner at pixel `position`.
    fn draw(&mut self, id: EntityId, entity: &dyn Entity, position: (i32, i32));

    /// Show a centered status line (between rounds).
    fn show_message(&mut self, _message: &str) {}

    fn end_frame(&mut self) {}
}

/// Surface that draws nothing.
impl DrawSurface for () {
    fn draw(&mut self, _id: EntityId, _entity: &dyn Entity, _position: (i32, i32)) {}
}

// ---------------------------------------------------------------------------
// DrawCommand
// ---------------------------------------------------------------------------

/// One rectangle to draw, in pixel coordinates (top-left origin).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCommand {
    pub id: EntityId,
    pub role: Role,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Sprite reference, when the entity has one.
    pub sprite: Option<String>,
    /// RGBA color (each channel 0.0..1.0) for sprite-less rendering.
    pub color: [f32; 4],
}

/// Green for the player ship: #44FF66.
const COLOR_PLAYER: [f32; 4] = [0.267, 1.0, 0.4, 1.0];

/// Red for hostiles: #FF4444.
const COLOR_HOSTILE: [f32; 4] = [1.0, 0.267, 0.267, 1.0];

/// White for shots.
const COLOR_PROJECTILE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Yellow for gravity bodies: #FFDD44.
const COLOR_BODY: [f32; 4] = [1.0, 0.867, 0.267, 1.0];

/// Gray for everything else.
const COLOR_SCENERY: [f32; 4] = [0.533, 0.533, 0.533, 1.0];

pub fn color_for_role(role: Role) -> [f32; 4] {
    match role {
        Role::Player => COLOR_PLAYER,
        Role::Hostile => COLOR_HOSTILE,
        Role::Projectile => COLOR_PROJECTILE,
        Role::Body => COLOR_BODY,
        Role::Scenery => COLOR_SCENERY,
    }
}

impl DrawCommand {
    pub fn for_entity(id: EntityId, entity: &dyn Entity, (x, y): (i32, i32)) -> Self {
        let extent = entity.extent();
        Self {
            id,
            role: entity.role(),
            x,
            y,
            width: extent.width,
            height: extent.height,
            sprite: entity.sprite().map(|s| s.reference().to_owned()),
            color: color_for_role(entity.role()),
        }
    }
}

// ---------------------------------------------------------------------------
// DrawList
// ---------------------------------------------------------------------------

/// Recording surface. Holds the most recent frame only.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    frames: u64,
    in_frame: bool,
    commands: Vec<DrawCommand>,
    messages: Vec<String>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Commands of the last frame, in draw order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Messages shown in the last frame, in order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl DrawSurface for DrawList {
    fn begin_frame(&mut self) {
        self.commands.clear();
        self.messages.clear();
        self.in_frame = true;
    }

    fn draw(&mut self, id: EntityId, entity: &dyn Entity, position: (i32, i32)) {
        self.commands.push(DrawCommand::for_entity(id, entity, position));
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }

    fn end_frame(&mut self) {
        if self.in_frame {
            self.frames += 1;
            self.in_frame = false;
        }
    }
}
