//! Pairwise Newtonian gravity.
//!
//! Every frame the [`GravitySystem`] recomputes the net force on each gravity
//! body from scratch:
//!
//! 1. every accumulator is zeroed,
//! 2. each unordered pair `(i, j)` with `j < i` is visited once, the force on
//!    `i` is added to `i` and the same vector, negated, is added to `j`.
//!
//! The magnitude is `G * m_i * m_j / r^2`, directed from `i` toward `j`. The
//! resulting accumulators always sum to zero. Pairs closer than
//! `sqrt(min_distance_sq)` have no finite force. With
//! [`GravityConfig::strict`] set (the default in debug builds) such a pair
//! aborts the pass; otherwise it is logged and skipped.
//!
//! Integration happens later in each body's own movement step: the force
//! divided by mass is added to the velocity (per frame, not scaled by elapsed
//! time) and the position then advances linearly.
//!
//! # Example
//!
//! ```
//! use orrery_engine::entity::Kinematics;
//! use orrery_engine::gravity::{GravityBody, GravityConfig, GravitySystem};
//!
//! let mut sun = (Kinematics::at(0.0, 0.0), GravityBody::new(1000.0).unwrap());
//! let mut rock = (Kinematics::at(10.0, 0.0), GravityBody::new(1.0).unwrap());
//!
//! let gravity = GravitySystem::new(GravityConfig { g: 1.0, ..Default::default() });
//! gravity.apply([(&sun.0, &mut sun.1), (&rock.0, &mut rock.1)]);
//!
//! // The rock is pulled toward the sun, the sun toward the rock.
//! assert!(rock.1.force().0 < 0.0);
//! assert_eq!(sun.1.force().0, -rock.1.force().0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::entity::{Kinematics, World};
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Tuning for the gravity pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    /// Gravitational constant, in engine units.
    pub g: f64,
    /// Pairs whose squared separation is at or below this have no force.
    pub min_distance_sq: f64,
    /// Panic on a coincident pair instead of skipping it.
    pub strict: bool,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            g: 0.02,
            min_distance_sq: f64::EPSILON,
            strict: cfg!(debug_assertions),
        }
    }
}

// ---------------------------------------------------------------------------
// GravityBody
// ---------------------------------------------------------------------------

/// Mass and force accumulator of a gravitating entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityBody {
    mass: f64,
    fx: f64,
    fy: f64,
}

impl GravityBody {
    /// Returns [`EngineError::InvalidMass`] unless `mass` is positive and
    /// finite.
    pub fn new(mass: f64) -> Result<Self, EngineError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(EngineError::InvalidMass { mass });
        }
        Ok(Self {
            mass,
            fx: 0.0,
            fy: 0.0,
        })
    }

    /// Mass in engine units, always positive.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Net force accumulated since the last [`clear_force`](Self::clear_force).
    pub fn force(&self) -> (f64, f64) {
        (self.fx, self.fy)
    }

    pub fn clear_force(&mut self) {
        self.fx = 0.0;
        self.fy = 0.0;
    }

    pub fn accumulate(&mut self, fx: f64, fy: f64) {
        self.fx += fx;
        self.fy += fy;
    }

    /// Apply the accumulated force to `kin` and advance it. Part of a gravity
    /// body's own movement step.
    ///
    /// Velocity first (`dx += fx / mass`), then position with the new
    /// velocity over `elapsed_ms`.
    pub(crate) fn integrate(&self, kin: &mut Kinematics, elapsed_ms: u64) {
        let (dx, dy) = kin.velocity();
        kin.set_velocity(dx + self.fx / self.mass, dy + self.fy / self.mass);
        kin.advance(elapsed_ms);
    }
}

/// Force exerted on body `i` by body `j`, or `None` when the pair is too
/// close to evaluate.
pub fn pair_force(
    g: f64,
    (xi, yi, mi): (f64, f64, f64),
    (xj, yj, mj): (f64, f64, f64),
    min_distance_sq: f64,
) -> Option<(f64, f64)> {
    let (ddx, ddy) = (xj - xi, yj - yi);
    let r2 = ddx * ddx + ddy * ddy;
    if r2 <= min_distance_sq {
        return None;
    }
    let magnitude = g * mi * mj / r2;
    let angle = ddy.atan2(ddx);
    Some((magnitude * angle.cos(), magnitude * angle.sin()))
}

// ---------------------------------------------------------------------------
// GravitySystem
// ---------------------------------------------------------------------------

/// Counters from one gravity pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    pub bodies: usize,
    pub pairs_evaluated: usize,
    pub pairs_skipped: usize,
}

/// Computes net gravitational forces for all gravity bodies.
#[derive(Debug, Clone, Default)]
pub struct GravitySystem {
    config: GravityConfig,
}

impl GravitySystem {
    pub fn new(config: GravityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GravityConfig {
        &self.config
    }

    /// Recompute forces for the given bodies. Positions are read, only the
    /// accumulators are written.
    pub fn apply<'a, I>(&self, bodies: I) -> PassStats
    where
        I: IntoIterator<Item = (&'a Kinematics, &'a mut GravityBody)>,
    {
        let mut bodies: Vec<(&Kinematics, &mut GravityBody)> = bodies.into_iter().collect();
        for (_, body) in bodies.iter_mut() {
            body.clear_force();
        }

        let mut stats = PassStats {
            bodies: bodies.len(),
            ..PassStats::default()
        };
        let GravityConfig {
            g,
            min_distance_sq,
            strict,
        } = self.config;

        for i in 0..bodies.len() {
            for j in 0..i {
                let (xi, yi) = bodies[i].0.position();
                let (xj, yj) = bodies[j].0.position();
                let mi = bodies[i].1.mass();
                let mj = bodies[j].1.mass();

                match pair_force(g, (xi, yi, mi), (xj, yj, mj), min_distance_sq) {
                    Some((fx, fy)) => {
                        bodies[i].1.accumulate(fx, fy);
                        bodies[j].1.accumulate(-fx, -fy);
                        stats.pairs_evaluated += 1;
                    }
                    None => {
                        assert!(
                            !strict,
                            "coincident gravity bodies {j} and {i} at ({xi}, {yi})"
                        );
                        warn!(
                            i,
                            j,
                            x = xi,
                            y = yi,
                            "coincident gravity bodies, skipping pair"
                        );
                        stats.pairs_skipped += 1;
                    }
                }
            }
        }

        trace!(
            bodies = stats.bodies,
            pairs = stats.pairs_evaluated,
            skipped = stats.pairs_skipped,
            "gravity pass"
        );
        stats
    }

    /// Run [`apply`](Self::apply) over every gravity body in `world`, in
    /// insertion order.
    pub fn apply_to_world(&self, world: &mut World) -> PassStats {
        self.apply(world.iter_mut().filter_map(|(_, e)| e.gravity_parts_mut()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
