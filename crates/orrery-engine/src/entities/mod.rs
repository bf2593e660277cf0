//! The concrete entity roster.
//!
//! | Entity            | Role       | Bounded | Gravity body |
//! |-------------------|------------|---------|--------------|
//! | [`ShipEntity`]    | Player     | yes     | no           |
//! | [`ShotEntity`]    | Projectile | yes     | no           |
//! | [`HostileEntity`] | Hostile    | yes     | no           |
//! | [`PlanetEntity`]  | Body       | no      | yes          |

mod hostile;
mod planet;
mod ship;
mod shot;

pub use hostile::HostileEntity;
pub use planet::PlanetEntity;
pub use ship::ShipEntity;
pub use shot::ShotEntity;
