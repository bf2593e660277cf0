//! Starting sets of entities.
//!
//! A [`ScenarioConfig`] describes what a round starts with. [`Scenario::prepare`]
//! resolves every sprite and validates every mass once, up front, so that
//! restarting a round ([`Scenario::instantiate`]) cannot fail. Asteroid belts
//! are generated at prepare time from a seeded PCG generator; the same seed
//! always yields the same belt.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assets::{
    Sprite, SpriteStore, HOSTILE_SPRITE, PLANET_SPRITE, SHIP_SPRITE, SHOT_SPRITE, STAR_SPRITE,
};
use crate::config::{invalid, EngineConfig, Playfield};
use crate::entities::{HostileEntity, PlanetEntity, ShipEntity, ShotEntity};
use crate::entity::{EntityBox, Kinematics};
use crate::error::EngineError;
use crate::gravity::GravityBody;

/// Where the ship starts.
pub const SHIP_START: (f64, f64) = (370.0, 550.0);

/// Offset of a freshly fired shot from the ship's position.
pub const SHOT_OFFSET: (f64, f64) = (10.0, -30.0);

const GRID_ORIGIN: (f64, f64) = (100.0, 50.0);
const GRID_SPACING: (f64, f64) = (50.0, 30.0);

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Which sets of entities a round starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Gravity bodies only.
    #[default]
    Orbits,
    /// Ship and hostile grid only.
    Invaders,
    /// Both.
    Mixed,
}

impl ScenarioKind {
    pub fn has_bodies(self) -> bool {
        matches!(self, ScenarioKind::Orbits | ScenarioKind::Mixed)
    }

    pub fn has_invaders(self) -> bool {
        matches!(self, ScenarioKind::Invaders | ScenarioKind::Mixed)
    }
}

/// One gravity body of the starting set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
    pub mass: f64,
    #[serde(default)]
    pub sprite: Option<String>,
}

impl PlanetSpec {
    fn new(name: &str, (x, y): (f64, f64), (dx, dy): (f64, f64), mass: f64, sprite: &str) -> Self {
        Self {
            name: name.to_owned(),
            x,
            y,
            dx,
            dy,
            mass,
            sprite: Some(sprite.to_owned()),
        }
    }
}

/// A ring of small bodies placed at random around the heaviest planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltSpec {
    pub count: u32,
    pub seed: u64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub mass: f64,
}

impl Default for BeltSpec {
    fn default() -> Self {
        Self {
            count: 24,
            seed: 7,
            inner_radius: 250.0,
            outer_radius: 280.0,
            mass: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub kind: ScenarioKind,
    pub planets: Vec<PlanetSpec>,
    pub belt: Option<BeltSpec>,
    pub hostile_rows: u32,
    pub hostile_columns: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            kind: ScenarioKind::Orbits,
            planets: default_planets(),
            belt: None,
            hostile_rows: 5,
            hostile_columns: 12,
        }
    }
}

/// A star with three planets on roughly circular orbits at the default
/// gravity constant and frame rate. The star's drift cancels the planets'
/// momentum.
fn default_planets() -> Vec<PlanetSpec> {
    vec![
        PlanetSpec::new("sun", (400.0, 300.0), (0.0, -0.0544), 10_000.0, STAR_SPRITE),
        PlanetSpec::new("mercury", (470.0, 300.0), (0.0, 17.0), 2.0, PLANET_SPRITE),
        PlanetSpec::new("terra", (500.0, 300.0), (0.0, 15.0), 10.0, PLANET_SPRITE),
        PlanetSpec::new("jupiter", (630.0, 300.0), (0.0, 9.0), 40.0, PLANET_SPRITE),
    ]
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if let Some(belt) = &self.belt {
            if !(belt.inner_radius.is_finite() && belt.inner_radius > 0.0) {
                return Err(invalid("scenario.belt.inner_radius", "must be positive"));
            }
            if !(belt.outer_radius.is_finite() && belt.outer_radius >= belt.inner_radius) {
                return Err(invalid(
                    "scenario.belt.outer_radius",
                    "must be at least inner_radius",
                ));
            }
        }
        if self.kind.has_invaders() && (self.hostile_rows == 0 || self.hostile_columns == 0) {
            return Err(invalid(
                "scenario.hostile_rows",
                "an invaders round needs at least one hostile",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PreparedPlanet {
    name: String,
    kin: Kinematics,
    body: GravityBody,
    sprite: Option<Sprite>,
}

#[derive(Debug, Clone)]
struct InvaderSprites {
    ship: Sprite,
    shot: Sprite,
    hostile: Sprite,
}

/// A validated starting set that can be instantiated any number of times.
#[derive(Debug, Clone)]
pub struct Scenario {
    kind: ScenarioKind,
    playfield: Playfield,
    planets: Vec<PreparedPlanet>,
    invaders: Option<InvaderSprites>,
    hostile_rows: u32,
    hostile_columns: u32,
    hostile_speed: f64,
}

impl Scenario {
    /// Resolve sprites, validate masses and generate the belt.
    pub fn prepare(config: &EngineConfig, sprites: &dyn SpriteStore) -> Result<Self, EngineError> {
        let spec = &config.scenario;

        let mut planets = Vec::new();
        if spec.kind.has_bodies() {
            for p in &spec.planets {
                planets.push(prepare_planet(p, sprites)?);
            }
            if let Some(belt) = &spec.belt {
                let anchor = planets
                    .iter()
                    .max_by(|a, b| a.body.mass().total_cmp(&b.body.mass()))
                    .map(|p| (p.kin, p.body.mass()));
                for p in generate_belt(belt, anchor, config)? {
                    planets.push(p);
                }
            }
        }

        let invaders = if spec.kind.has_invaders() {
            Some(InvaderSprites {
                ship: sprites.sprite_for(SHIP_SPRITE)?,
                shot: sprites.sprite_for(SHOT_SPRITE)?,
                hostile: sprites.sprite_for(HOSTILE_SPRITE)?,
            })
        } else {
            None
        };

        debug!(
            kind = ?spec.kind,
            bodies = planets.len(),
            hostiles = invaders.as_ref().map_or(0, |_| spec.hostile_rows * spec.hostile_columns),
            "scenario prepared"
        );

        Ok(Self {
            kind: spec.kind,
            playfield: config.playfield,
            planets,
            invaders,
            hostile_rows: spec.hostile_rows,
            hostile_columns: spec.hostile_columns,
            hostile_speed: config.hostile_speed,
        })
    }

    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    /// Fresh entities for a new round: bodies first, then the ship, then the
    /// hostile grid row by row.
    pub fn instantiate(&self) -> Vec<EntityBox> {
        let mut out: Vec<EntityBox> = Vec::new();
        for p in &self.planets {
            out.push(Box::new(PlanetEntity::from_parts(
                p.name.clone(),
                p.kin,
                p.body,
                p.sprite.clone(),
            )));
        }

        if let Some(sprites) = &self.invaders {
            out.push(Box::new(ShipEntity::new(
                sprites.ship.clone(),
                SHIP_START.0,
                SHIP_START.1,
                self.playfield,
            )));
            for row in 0..self.hostile_rows {
                for col in 0..self.hostile_columns {
                    let x = GRID_ORIGIN.0 + f64::from(col) * GRID_SPACING.0;
                    let y = GRID_ORIGIN.1 + f64::from(row) * GRID_SPACING.1;
                    out.push(Box::new(HostileEntity::new(
                        sprites.hostile.clone(),
                        x,
                        y,
                        -self.hostile_speed,
                        self.playfield,
                    )));
                }
            }
        }
        out
    }

    /// A shot fired from a ship at pixel position `(x, y)`, if this scenario
    /// has a ship to fire from.
    pub fn shot_from(&self, (x, y): (i32, i32), speed: f64) -> Option<EntityBox> {
        let sprites = self.invaders.as_ref()?;
        Some(Box::new(ShotEntity::new(
            sprites.shot.clone(),
            f64::from(x) + SHOT_OFFSET.0,
            f64::from(y) + SHOT_OFFSET.1,
            speed,
        )))
    }
}

fn prepare_planet(
    spec: &PlanetSpec,
    sprites: &dyn SpriteStore,
) -> Result<PreparedPlanet, EngineError> {
    let sprite = spec
        .sprite
        .as_deref()
        .map(|reference| sprites.sprite_for(reference))
        .transpose()?;
    Ok(PreparedPlanet {
        name: spec.name.clone(),
        kin: Kinematics::at(spec.x, spec.y).with_velocity(spec.dx, spec.dy),
        body: GravityBody::new(spec.mass)?,
        sprite,
    })
}

/// Place `belt.count` bodies uniformly in the annulus around `anchor`, each
/// moving at the approximate circular speed for its radius at the nominal
/// frame rate. Without an anchor the belt circles the playfield center at
/// rest.
fn generate_belt(
    belt: &BeltSpec,
    anchor: Option<(Kinematics, f64)>,
    config: &EngineConfig,
) -> Result<Vec<PreparedPlanet>, EngineError> {
    let mut rng = Pcg64::seed_from_u64(belt.seed);
    let (center, central_mass) = anchor.unwrap_or_else(|| {
        let field = config.playfield;
        (
            Kinematics::at(f64::from(field.width) / 2.0, f64::from(field.height) / 2.0),
            0.0,
        )
    });
    // Velocity kicks are per frame, so the effective pull scales with frame rate.
    let frames_per_sec = 1000.0 / config.frame_sleep_ms.max(1) as f64;

    let mut out = Vec::with_capacity(belt.count as usize);
    for n in 0..belt.count {
        let angle: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let radius: f64 = if belt.outer_radius > belt.inner_radius {
            rng.gen_range(belt.inner_radius..belt.outer_radius)
        } else {
            belt.inner_radius
        };
        let speed = (config.gravity.g * central_mass * frames_per_sec / radius).sqrt();
        let (sin, cos) = angle.sin_cos();
        let (cdx, cdy) = center.velocity();

        out.push(PreparedPlanet {
            name: format!("asteroid-{n}"),
            kin: Kinematics::at(center.x() + radius * cos, center.y() + radius * sin)
                .with_velocity(cdx - speed * sin, cdy + speed * cos),
            body: GravityBody::new(belt.mass)?,
            sprite: None,
        });
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
