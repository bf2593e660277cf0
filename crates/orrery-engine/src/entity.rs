//! The entity contract shared by every simulated object.
//!
//! An [`Entity`] owns its [`Kinematics`] and decides how to move, whether it
//! overlaps another entity, and how to react when it does. Capabilities are
//! independent: an entity is *bounded* when [`Entity::is_bounded`] returns
//! `true` (it takes part in AABB collision testing) and is a *gravity body*
//! when [`Entity::gravity_parts_mut`] returns `Some` (it takes part in the
//! gravity pass). Either, both, or neither may hold.
//!
//! Reactions never touch the world directly. `collided_with`, `after_move`
//! and `do_logic` queue their effects on a [`CommandBuffer`], which the game
//! loop drains once the traversal that produced them is finished.

use std::fmt;

use orrery_ecs::entity::EntityId;
use orrery_ecs::world::EntityWorld;
use serde::{Deserialize, Serialize};

use crate::assets::Sprite;
use crate::bounded::Extent;
use crate::command::CommandBuffer;
use crate::gravity::GravityBody;

/// Boxed entity as stored in the world.
pub type EntityBox = Box<dyn Entity>;

/// The world type the engine drives.
pub type World = EntityWorld<EntityBox>;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What part an entity plays in the game rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The player-controlled ship.
    Player,
    /// Something the player has to eliminate to win.
    Hostile,
    /// A shot fired by the player.
    Projectile,
    /// A gravitating body (star, planet, asteroid).
    Body,
    /// Anything else.
    Scenery,
}

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// Position and velocity of an entity.
///
/// Positions are continuous so that sub-pixel motion accumulates across
/// frames; [`pixel`](Self::pixel) is the truncated view used for drawing and
/// bounding boxes. Velocity is in position units per second.
///
/// Code outside an entity may steer it through [`Steering`]. The position
/// only changes inside the entity's own movement step, so stepping a
/// `Kinematics` is not part of the public API:
///
/// ```compile_fail
/// use orrery_engine::entity::Kinematics;
///
/// let mut kin = Kinematics::at(0.0, 0.0).with_velocity(10.0, 0.0);
/// kin.advance(1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
}

impl Kinematics {
    /// At rest at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            dx: 0.0,
            dy: 0.0,
        }
    }

    /// Builder form of [`set_velocity`](Self::set_velocity).
    pub fn with_velocity(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    /// Horizontal position.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical position, growing downward.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Horizontal velocity, px/s.
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Vertical velocity, px/s.
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// `(x, y)`.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// `(dx, dy)`.
    pub fn velocity(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    /// Integer pixel position, truncated toward zero.
    pub fn pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    pub fn set_velocity(&mut self, dx: f64, dy: f64) {
        self.dx = dx;
        self.dy = dy;
    }

    /// Change `dx` and keep `dy`.
    pub fn set_horizontal_velocity(&mut self, dx: f64) {
        self.dx = dx;
    }

    pub fn set_vertical_velocity(&mut self, dy: f64) {
        self.dy = dy;
    }

    /// First-order step: `x += dx * elapsed_ms / 1000`, likewise for `y`.
    ///
    /// Velocity is taken as constant over the step.
    pub(crate) fn advance(&mut self, elapsed_ms: u64) {
        let secs = elapsed_ms as f64 / 1000.0;
        self.x += self.dx * secs;
        self.y += self.dy * secs;
    }

    /// Shift the position by a fixed amount. Only used from an entity's own
    /// movement step.
    pub(crate) fn offset(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

// ---------------------------------------------------------------------------
// Steering
// ---------------------------------------------------------------------------

/// Velocity-only handle on an entity's [`Kinematics`].
///
/// This is what [`Entity::steering`] hands out, so callers holding an entity
/// can change where it is heading but not where it is.
#[derive(Debug)]
pub struct Steering<'a> {
    kin: &'a mut Kinematics,
}

impl<'a> Steering<'a> {
    pub fn new(kin: &'a mut Kinematics) -> Self {
        Self { kin }
    }

    pub fn set_velocity(&mut self, dx: f64, dy: f64) {
        self.kin.set_velocity(dx, dy);
    }

    pub fn set_horizontal_velocity(&mut self, dx: f64) {
        self.kin.set_horizontal_velocity(dx);
    }

    pub fn set_vertical_velocity(&mut self, dy: f64) {
        self.kin.set_vertical_velocity(dy);
    }

    /// Current velocity, for relative changes.
    pub fn velocity(&self) -> (f64, f64) {
        self.kin.velocity()
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Behaviour every simulated object provides.
///
/// Only [`role`](Self::role), [`label`](Self::label),
/// [`kinematics`](Self::kinematics), [`steering`](Self::steering) and
/// [`advance`](Self::advance) are required. The defaults
/// describe an entity with a 1x1 footprint that never collides, never
/// gravitates and never reacts.
pub trait Entity: fmt::Debug {
    fn role(&self) -> Role;

    /// Short human-readable name used in logs and snapshots.
    fn label(&self) -> &str;

    fn kinematics(&self) -> &Kinematics;

    /// Velocity access for code outside the entity.
    fn steering(&mut self) -> Steering<'_>;

    /// Advance the position by `elapsed_ms` of simulated time.
    ///
    /// Must be a pure function of the entity's own state and `elapsed_ms`.
    fn advance(&mut self, elapsed_ms: u64);

    /// Called once per frame after every entity has moved. Entities use it to
    /// react to where they ended up (leaving the playfield, reaching an edge).
    fn after_move(&self, _this: EntityId, _commands: &mut CommandBuffer) {}

    /// Collision / visual footprint in pixels.
    fn extent(&self) -> Extent {
        Extent::POINT
    }

    /// Whether this entity takes part in AABB collision testing.
    fn is_bounded(&self) -> bool {
        false
    }

    /// Overlap test. Must be symmetric for bounded pairs.
    fn collides_with(&self, _other: &dyn Entity) -> bool {
        false
    }

    /// Reaction to a detected overlap with `other`.
    fn collided_with(
        &mut self,
        _this: EntityId,
        _other_id: EntityId,
        _other: &dyn Entity,
        _commands: &mut CommandBuffer,
    ) {
    }

    /// Game logic pass, run on every entity in a frame where some entity
    /// queued [`CommandBuffer::request_logic`].
    fn do_logic(&mut self, _this: EntityId, _commands: &mut CommandBuffer) {}

    /// Gravity state, for entities that gravitate.
    fn gravity(&self) -> Option<&GravityBody> {
        None
    }

    /// Split borrow used by the gravity pass: current position plus the
    /// force accumulator to write into.
    fn gravity_parts_mut(&mut self) -> Option<(&Kinematics, &mut GravityBody)> {
        None
    }

    /// Sprite to draw, if any.
    fn sprite(&self) -> Option<&Sprite> {
        None
    }

    fn set_velocity(&mut self, dx: f64, dy: f64) {
        self.steering().set_velocity(dx, dy);
    }

    fn set_horizontal_velocity(&mut self, dx: f64) {
        self.steering().set_horizontal_velocity(dx);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
