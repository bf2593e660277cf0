//! Engine configuration.
//!
//! [`EngineConfig`] is plain serde data. Every field has a default, so a JSON
//! document only needs the values it changes:
//!
//! ```
//! use orrery_engine::config::EngineConfig;
//!
//! let cfg = EngineConfig::from_json_str(r#"{ "fire_interval_ms": 250 }"#).unwrap();
//! assert_eq!(cfg.fire_interval_ms, 250);
//! assert_eq!(cfg.playfield.width, 800);
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::gravity::GravityConfig;
use crate::scenario::ScenarioConfig;

/// Size of the visible area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: u32,
    pub height: u32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Everything tunable about a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub playfield: Playfield,
    /// Best-effort pause between frames in [`GameLoop::run`](crate::game_loop::GameLoop::run).
    pub frame_sleep_ms: u64,
    /// Minimum time between two honored fire requests.
    pub fire_interval_ms: u64,
    /// Ship speed while steering, px/s.
    pub ship_speed: f64,
    /// Vertical shot velocity, px/s. Negative is up.
    pub shot_speed: f64,
    /// Initial horizontal hostile speed, px/s.
    pub hostile_speed: f64,
    /// Factor applied to every remaining hostile's speed per elimination.
    pub hostile_speedup: f64,
    /// End the run after this many frames spent running. `None` runs until
    /// quit.
    pub max_active_frames: Option<u64>,
    pub gravity: GravityConfig,
    pub scenario: ScenarioConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),
            frame_sleep_ms: 10,
            fire_interval_ms: 500,
            ship_speed: 300.0,
            shot_speed: -300.0,
            hostile_speed: 75.0,
            hostile_speedup: 1.02,
            max_active_frames: None,
            gravity: GravityConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.playfield.width == 0 || self.playfield.height == 0 {
            return Err(invalid("playfield", "width and height must be non-zero"));
        }
        non_negative("ship_speed", self.ship_speed)?;
        non_negative("hostile_speed", self.hostile_speed)?;
        if !(self.shot_speed.is_finite() && self.shot_speed < 0.0) {
            return Err(invalid(
                "shot_speed",
                format!("must be negative (shots travel up), got {}", self.shot_speed),
            ));
        }
        if !(self.hostile_speedup.is_finite() && self.hostile_speedup > 0.0) {
            return Err(invalid(
                "hostile_speedup",
                format!("must be positive, got {}", self.hostile_speedup),
            ));
        }
        if self.max_active_frames == Some(0) {
            return Err(invalid("max_active_frames", "must be at least 1 when set"));
        }
        non_negative("gravity.g", self.gravity.g)?;
        non_negative("gravity.min_distance_sq", self.gravity.min_distance_sq)?;
        self.scenario.validate()
    }
}

pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let cfg = EngineConfig::from_json_str(
            r#"{ "playfield": { "width": 640, "height": 480 }, "max_active_frames": 300 }"#,
        )
        .unwrap();
        assert_eq!(cfg.playfield, Playfield { width: 640, height: 480 });
        assert_eq!(cfg.max_active_frames, Some(300));
        assert_eq!(cfg.fire_interval_ms, 500);
        assert_eq!(cfg.hostile_speedup, 1.02);
    }

    #[test]
    fn zero_fuse_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "max_active_frames": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidConfig {
                field: "max_active_frames",
                ..
            }
        ));
    }

    #[test]
    fn downward_shots_are_rejected() {
        let cfg = EngineConfig {
            shot_speed: 300.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidConfig {
                field: "shot_speed",
                ..
            })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ nope"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }
}
