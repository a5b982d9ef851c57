use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::editor::BrushColor;

/// Struct to hold the configuration for an editing session.
///
/// Contains fields for:
///
/// - `canvas`: Buffer and display geometry, frame count and onion skin.
/// - `brush`: Initial brush size and color.
/// - `playback`: Animation preview parameters.
/// - `export`: GIF export parameters.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Config {
    pub canvas: Canvas,
    pub brush: Brush,
    pub playback: Playback,
    pub export: Export,
}

impl Default for Config {
    #[must_use]
    #[tracing::instrument(level = "info")]
    fn default() -> Self {
        info!("Creating default config");
        Self {
            canvas: Canvas::default(),
            brush: Brush::default(),
            playback: Playback::default(),
            export: Export::default(),
        }
    }
}

impl Config {
    /// Loads a config from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[tracing::instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file '{}'", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("Could not parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Saves the config as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    #[tracing::instrument(level = "debug")]
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string(self).context("Could not serialize config")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Could not create config directory '{}'", parent.display())
            })?;
        }
        fs::write(path, toml)
            .with_context(|| format!("Could not write config file '{}'", path.display()))?;
        Ok(())
    }
}

/// Geometry of the editing session.
///
/// The storage buffer is deliberately smaller than the display surface;
/// input coordinates are mapped down and the preview is scaled back up.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Canvas {
    pub buffer_width: usize,
    pub buffer_height: usize,
    pub display_width: u32,
    pub display_height: u32,
    pub frame_count: usize,
    pub onion_skin: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            buffer_width: 256,
            buffer_height: 192,
            display_width: 512,
            display_height: 384,
            frame_count: 3,
            onion_skin: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Brush {
    pub size: usize,
    pub color: BrushColor,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            size: 2,
            color: BrushColor::Black,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Playback {
    pub frame_rate: u32,
}

impl Default for Playback {
    fn default() -> Self {
        Self { frame_rate: 12 }
    }
}

/// GIF export parameters.
///
/// `speed` is the quantization speed handed to the encoder, between 1
/// (best quality) and 30 (fastest).
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Export {
    pub file_stem: String,
    pub speed: i32,
}

impl Default for Export {
    fn default() -> Self {
        Self {
            file_stem: "pixel-animation".to_string(),
            speed: 10,
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::tests::{clean_files, setup_folder};

    use super::*;

    const COMMON_PATH: &str = "tests/core/config";

    #[test]
    fn test_default_config_matches_reference_session() {
        let config = Config::default();

        assert_eq!(config.canvas.buffer_width, 256);
        assert_eq!(config.canvas.buffer_height, 192);
        assert_eq!(config.canvas.display_width, 512);
        assert_eq!(config.canvas.display_height, 384);
        assert_eq!(config.canvas.frame_count, 3);
        assert!(config.canvas.onion_skin);
        assert_eq!(config.brush.size, 2);
        assert_eq!(config.brush.color, BrushColor::Black);
        assert_eq!(config.playback.frame_rate, 12);
        assert_eq!(config.export.file_stem, "pixel-animation");
        assert_eq!(config.export.speed, 10);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let path = Path::new(COMMON_PATH);
        setup_folder(path.to_path_buf()).unwrap();
        let files = vec![path.join("flipbook.toml")];
        clean_files(&files).unwrap();

        let mut config = Config::default();
        config.playback.frame_rate = 24;
        config.brush.color = BrushColor::Blue;
        config.save(&files[0]).unwrap();

        let loaded = Config::load(&files[0]).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load(Path::new("tests/core/config/does-not-exist.toml"));
        assert!(result.is_err());
    }
}
