use serde::{Deserialize, Serialize};

use crate::emit::EmitOptions;
use crate::error::TileError;
use crate::packing::BitDepth;
use crate::partition::TileOptions;

/// Serde-driven tiling configuration matching the TOML format.
///
/// ```toml
/// bit_depth = 1
/// mask = true
/// width = 8
/// height = 16
/// keep_fragments = true
/// ```
///
/// A size of 0 means the same as leaving the key out: derive it from the
/// enclosing size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilingConfig {
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u8,
    #[serde(default)]
    pub mask: bool,
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub height: Option<usize>,
    #[serde(default)]
    pub big_width: Option<usize>,
    #[serde(default)]
    pub big_height: Option<usize>,
    #[serde(default)]
    pub keep_fragments: bool,
}

fn default_bit_depth() -> u8 {
    BitDepth::default().bits()
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            bit_depth: default_bit_depth(),
            mask: false,
            width: None,
            height: None,
            big_width: None,
            big_height: None,
            keep_fragments: false,
        }
    }
}

impl TilingConfig {
    /// Parse a TOML config string.
    pub fn from_toml_str(toml_str: &str) -> Result<TilingConfig, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the bit depth and build emission options.
    pub fn emit_options(&self) -> Result<EmitOptions, ConfigError> {
        Ok(EmitOptions {
            depth: BitDepth::new(self.bit_depth)?,
            mask: self.mask,
            tiles: TileOptions {
                width: unset_if_zero(self.width),
                height: unset_if_zero(self.height),
                big_width: unset_if_zero(self.big_width),
                big_height: unset_if_zero(self.big_height),
                keep_fragments: self.keep_fragments,
            },
        })
    }
}

fn unset_if_zero(size: Option<usize>) -> Option<usize> {
    size.filter(|&v| v != 0)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Tile(#[from] TileError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;

    #[test]
    fn empty_config_uses_defaults() {
        let config = TilingConfig::from_toml_str("").unwrap();
        assert_eq!(config, TilingConfig::default());
        let options = config.emit_options().unwrap();
        assert_eq!(options.depth, BitDepth::TWO);
        assert!(!options.mask);
        assert_eq!(options.tiles, TileOptions::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = TilingConfig::from_toml_str(
            "bit_depth = 1\nmask = true\nwidth = 8\nheight = 16\n\
             big_width = 32\nbig_height = 32\nkeep_fragments = true\n",
        )
        .unwrap();
        let options = config.emit_options().unwrap();
        assert_eq!(options.depth, BitDepth::ONE);
        assert!(options.mask);
        assert_eq!(
            options.tiles,
            TileOptions {
                width: Some(8),
                height: Some(16),
                big_width: Some(32),
                big_height: Some(32),
                keep_fragments: true,
            }
        );
    }

    #[test]
    fn zero_sizes_are_derived() {
        let config = TilingConfig::from_toml_str("width = 0\nheight = 4\nbig_width = 0\n").unwrap();
        let options = config.emit_options().unwrap();
        assert_eq!(options.tiles.width, None);
        assert_eq!(options.tiles.height, Some(4));
        assert_eq!(options.tiles.big_width, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = TilingConfig::from_toml_str("colour = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_bad_depth() {
        let config = TilingConfig::from_toml_str("bit_depth = 3").unwrap();
        let err = config.emit_options().unwrap_err();
        assert!(matches!(err, ConfigError::Tile(TileError::InvalidGeometry(GeometryError::BitDepth(3)))));
    }

    #[test]
    fn toml_roundtrip() {
        let config = TilingConfig {
            width: Some(4),
            keep_fragments: true,
            ..TilingConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(TilingConfig::from_toml_str(&text).unwrap(), config);
    }
}
