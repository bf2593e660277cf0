use crate::assets::Sprite;
use crate::bounded::Extent;
use crate::entity::{Entity, Kinematics, Role, Steering};
use crate::error::EngineError;
use crate::gravity::GravityBody;

/// A named gravitating body: star, planet, or asteroid.
///
/// Planets never collide. They may carry a sprite for drawing; without one
/// they draw as a single point.
#[derive(Debug)]
pub struct PlanetEntity {
    name: String,
    kin: Kinematics,
    body: GravityBody,
    sprite: Option<Sprite>,
}

impl PlanetEntity {
    /// Fails with [`EngineError::InvalidMass`] for a non-positive mass.
    pub fn new(
        name: impl Into<String>,
        kin: Kinematics,
        mass: f64,
        sprite: Option<Sprite>,
    ) -> Result<Self, EngineError> {
        Ok(Self::from_parts(name, kin, GravityBody::new(mass)?, sprite))
    }

    pub fn from_parts(
        name: impl Into<String>,
        kin: Kinematics,
        body: GravityBody,
        sprite: Option<Sprite>,
    ) -> Self {
        Self {
            name: name.into(),
            kin,
            body,
            sprite,
        }
    }

    pub fn body(&self) -> &GravityBody {
        &self.body
    }
}

impl Entity for PlanetEntity {
    fn role(&self) -> Role {
        Role::Body
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kin
    }

    fn steering(&mut self) -> Steering<'_> {
        Steering::new(&mut self.kin)
    }

    fn advance(&mut self, elapsed_ms: u64) {
        self.body.integrate(&mut self.kin, elapsed_ms);
    }

    fn extent(&self) -> Extent {
        self.sprite.as_ref().map_or(Extent::POINT, Sprite::extent)
    }

    fn gravity(&self) -> Option<&GravityBody> {
        Some(&self.body)
    }

    fn gravity_parts_mut(&mut self) -> Option<(&Kinematics, &mut GravityBody)> {
        Some((&self.kin, &mut self.body))
    }

    fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_mass() {
        let err = PlanetEntity::new("void", Kinematics::at(0.0, 0.0), 0.0, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMass { mass } if mass == 0.0));
    }

    #[test]
    fn never_collides_and_defaults_to_point_extent() {
        let a = PlanetEntity::new("a", Kinematics::at(0.0, 0.0), 1.0, None).unwrap();
        let b = PlanetEntity::new("b", Kinematics::at(0.0, 0.0), 1.0, None).unwrap();
        assert!(!a.is_bounded());
        assert!(!a.collides_with(&b));
        assert_eq!(a.extent(), Extent::POINT);
        assert_eq!(a.label(), "a");
    }

    #[test]
    fn advance_applies_accumulated_force() {
        let mut p = PlanetEntity::new("p", Kinematics::at(0.0, 0.0), 10.0, None).unwrap();
        if let Some((_, body)) = p.gravity_parts_mut() {
            body.accumulate(10.0, 0.0);
        }
        p.advance(1000);
        assert!((p.kinematics().dx() - 1.0).abs() < 1e-12);
        assert!((p.kinematics().x() - 1.0).abs() < 1e-12);
    }
}
