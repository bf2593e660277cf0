//! Engine error type.

use orrery_ecs::EcsError;

use crate::assets::AssetError;

/// Errors produced while configuring or building a simulation.
///
/// Nothing in the per-frame path returns these: collision absence, cooldown
/// drops and duplicate removals are ordinary outcomes, not failures.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A gravity body was given a mass that is zero, negative, or not finite.
    #[error("gravity body mass must be positive and finite, got {mass}")]
    InvalidMass { mass: f64 },

    /// A configuration value is out of range.
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The configuration document could not be parsed.
    #[error("failed to parse engine config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A sprite the scenario needs could not be resolved.
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Ecs(#[from] EcsError),
}
