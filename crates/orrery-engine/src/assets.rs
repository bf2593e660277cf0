//! Sprite lookup.
//!
//! Entities refer to sprites by a string reference such as
//! `"sprites/ship.gif"`. A [`SpriteStore`] resolves the reference to a
//! [`Sprite`], whose dimensions become the entity's collision extent. The
//! engine never decodes images; [`SpriteCatalog`] is an in-memory table of
//! known references and their sizes, loadable from a JSON manifest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bounded::Extent;

/// Sprite reference for the player's ship.
pub const SHIP_SPRITE: &str = "sprites/ship.gif";
/// Sprite reference for player shots.
pub const SHOT_SPRITE: &str = "sprites/shot.gif";
/// Sprite reference for hostiles.
pub const HOSTILE_SPRITE: &str = "sprites/alien.gif";
pub const STAR_SPRITE: &str = "sprites/star.gif";
pub const PLANET_SPRITE: &str = "sprites/planet.gif";

/// Errors from sprite resolution.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("sprite '{reference}' not found")]
    NotFound { reference: String },

    #[error("sprite '{reference}' has invalid dimensions {width}x{height}")]
    InvalidDimensions {
        reference: String,
        width: u32,
        height: u32,
    },

    #[error("failed to parse sprite manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// A resolved, drawable image handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sprite {
    reference: String,
    width: u32,
    height: u32,
}

impl Sprite {
    /// Build a sprite directly, bypassing any store.
    pub fn new(
        reference: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<Self, AssetError> {
        let reference = reference.into();
        if width == 0 || height == 0 {
            return Err(AssetError::InvalidDimensions {
                reference,
                width,
                height,
            });
        }
        Ok(Self {
            reference,
            width,
            height,
        })
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }
}

/// Resolves sprite references.
pub trait SpriteStore {
    fn sprite_for(&self, reference: &str) -> Result<Sprite, AssetError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct SpriteSize {
    width: u32,
    height: u32,
}

/// In-memory sprite table.
///
/// The JSON manifest maps each reference to its size:
///
/// ```
/// use orrery_engine::assets::{SpriteCatalog, SpriteStore};
///
/// let catalog = SpriteCatalog::from_json(r#"{
///     "sprites/ship.gif": { "width": 32, "height": 24 }
/// }"#).unwrap();
///
/// assert_eq!(catalog.sprite_for("sprites/ship.gif").unwrap().width(), 32);
/// assert!(catalog.sprite_for("sprites/missing.gif").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpriteCatalog {
    sprites: BTreeMap<String, SpriteSize>,
}

impl SpriteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in sprite references and their sizes.
    pub fn with_defaults() -> Self {
        let mut sprites = BTreeMap::new();
        for (reference, width, height) in [
            (SHIP_SPRITE, 32, 24),
            (SHOT_SPRITE, 6, 16),
            (HOSTILE_SPRITE, 28, 20),
            (STAR_SPRITE, 32, 32),
            (PLANET_SPRITE, 12, 12),
        ] {
            sprites.insert(reference.to_owned(), SpriteSize { width, height });
        }
        Self { sprites }
    }

    /// Parse a manifest. Every entry must have non-zero dimensions.
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let sprites: BTreeMap<String, SpriteSize> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (reference, size) in sprites {
            catalog.insert(reference, size.width, size.height)?;
        }
        Ok(catalog)
    }

    /// Register (or replace) a sprite.
    pub fn insert(
        &mut self,
        reference: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<(), AssetError> {
        let sprite = Sprite::new(reference, width, height)?;
        self.sprites.insert(
            sprite.reference,
            SpriteSize {
                width: sprite.width,
                height: sprite.height,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl SpriteStore for SpriteCatalog {
    fn sprite_for(&self, reference: &str) -> Result<Sprite, AssetError> {
        let size = self
            .sprites
            .get(reference)
            .ok_or_else(|| AssetError::NotFound {
                reference: reference.to_owned(),
            })?;
        Ok(Sprite {
            reference: reference.to_owned(),
            width: size.width,
            height: size.height,
        })
    }
}
