//! Shared configuration for dzyn
//!
//! This crate provides the single source of truth for texture dimensions,
//! blend strength, brush defaults and text settings used by the decorating
//! engine and its scene host.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default edge length of the decoration texture in pixels
pub const DEFAULT_TEXTURE_SIZE: u32 = 2048;

/// Default edge length of textures produced by the one-shot generator
pub const DEFAULT_GENERATOR_SIZE: u32 = 512;

/// Default dirty-tracking tile size
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Default blend strength of the painted layer over the base color
pub const DEFAULT_BLEND_STRENGTH: f32 = 0.9;

/// Hardness used when replaying control points into the painter
pub const DEFAULT_SPOT_HARDNESS: f32 = 0.6;

/// Text is never rasterized below one pixel
pub const MIN_FONT_SIZE_PX: f32 = 1.0;

/// Smallest and largest accepted texture edge
pub const MIN_TEXTURE_SIZE: u32 = 64;
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid texture size {0}: must be a power of two in {min}..={max}", min = MIN_TEXTURE_SIZE, max = MAX_TEXTURE_SIZE)]
    InvalidTextureSize(u32),

    #[error("Invalid tile size {0}")]
    InvalidTileSize(u32),

    #[error("{field} must be at least {min}px, got {value}")]
    InvalidFontSize {
        field: &'static str,
        value: f32,
        min: f32,
    },

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },
}

/// Default brush used by the interaction router when the host sends none
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushDefaults {
    /// Straight sRGB color
    pub color: [f32; 3],
    /// Radius as a fraction of the texture edge
    pub radius: f32,
    /// 0.0 = soft falloff, 1.0 = hard disk
    pub hardness: f32,
}

impl Default for BrushDefaults {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0],
            radius: 0.02,
            hardness: DEFAULT_SPOT_HARDNESS,
        }
    }
}

/// Text rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    /// Font file loaded at session start; text draws are skipped without one
    pub font_path: Option<PathBuf>,
    /// Font size for newly added text elements
    pub font_size_px: f32,
    /// Text is never rendered smaller than this
    pub min_font_size_px: f32,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size_px: 64.0,
            min_font_size_px: 8.0,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct EngineConfig {
    /// Edge length of the painter's square texture
    pub texture_size: u32,
    /// Tile size for dirty tracking
    pub tile_size: u32,
    /// Edge length used by the one-shot generator
    pub generator_size: u32,
    /// Strength of the painted layer when blended into patched materials
    pub blend_strength: f32,
    /// Hardness applied to control point spots on repaint
    pub spot_hardness: f32,
    pub brush: BrushDefaults,
    pub text: TextDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            texture_size: DEFAULT_TEXTURE_SIZE,
            tile_size: DEFAULT_TILE_SIZE,
            generator_size: DEFAULT_GENERATOR_SIZE,
            blend_strength: DEFAULT_BLEND_STRENGTH,
            spot_hardness: DEFAULT_SPOT_HARDNESS,
            brush: BrushDefaults::default(),
            text: TextDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Create a config with the given texture size and defaults elsewhere
    pub fn with_texture_size(texture_size: u32) -> Self {
        Self {
            texture_size,
            ..Default::default()
        }
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for size in [self.texture_size, self.generator_size] {
            if !is_valid_texture_size(size) {
                return Err(ConfigError::InvalidTextureSize(size));
            }
        }
        if self.tile_size == 0 || self.tile_size > self.texture_size {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        unit_range("blend_strength", self.blend_strength)?;
        unit_range("spot_hardness", self.spot_hardness)?;
        unit_range("brush.hardness", self.brush.hardness)?;
        unit_range("brush.radius", self.brush.radius)?;

        let min_font = self.text.min_font_size_px;
        if !min_font.is_finite() || min_font < MIN_FONT_SIZE_PX {
            return Err(ConfigError::InvalidFontSize {
                field: "text.min_font_size_px",
                value: min_font,
                min: MIN_FONT_SIZE_PX,
            });
        }
        if !self.text.font_size_px.is_finite() || self.text.font_size_px < min_font {
            return Err(ConfigError::InvalidFontSize {
                field: "text.font_size_px",
                value: self.text.font_size_px,
                min: min_font,
            });
        }
        Ok(())
    }
}

/// Whether `size` is an accepted texture edge length
pub fn is_valid_texture_size(size: u32) -> bool {
    size.is_power_of_two() && (MIN_TEXTURE_SIZE..=MAX_TEXTURE_SIZE).contains(&size)
}

fn unit_range(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.texture_size, DEFAULT_TEXTURE_SIZE);
        assert_eq!(config.generator_size, DEFAULT_GENERATOR_SIZE);
        assert_eq!(config.blend_strength, DEFAULT_BLEND_STRENGTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            texture_size = 1024
            blend_strength = 0.5

            [brush]
            radius = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.texture_size, 1024);
        assert_eq!(config.blend_strength, 0.5);
        assert_eq!(config.brush.radius, 0.1);
        assert_eq!(config.brush.hardness, DEFAULT_SPOT_HARDNESS);
        assert_eq!(config.text.min_font_size_px, 8.0);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let err = EngineConfig::from_toml_str("texture_size = 1000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTextureSize(1000)));
    }

    #[test]
    fn test_rejects_strength_out_of_range() {
        let mut config = EngineConfig::default();
        config.blend_strength = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange { field: "blend_strength", .. })
        ));
    }

    #[test]
    fn test_tile_larger_than_texture() {
        let mut config = EngineConfig::with_texture_size(64);
        config.tile_size = 128;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTileSize(128))));
    }

    #[test]
    fn test_font_sizes_are_validated() {
        let small = EngineConfig::from_toml_str("[text]\nmin_font_size_px = 4.0").unwrap();
        assert_eq!(small.text.min_font_size_px, 4.0);

        let err = EngineConfig::from_toml_str("[text]\nmin_font_size_px = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFontSize { field: "text.min_font_size_px", .. }
        ));

        let err = EngineConfig::from_toml_str("[text]\nfont_size_px = 6.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFontSize { field: "text.font_size_px", .. }
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/dzyn.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
