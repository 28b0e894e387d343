// Editor configuration - Grid, pane and history settings
// Stored as RON next to the other per-user configuration files

use crate::composition::Instrument;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading, saving or validating the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

/// Settings shared by the composition, the editor and the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Horizontal snap distance in ticks
    pub snap_x: i32,
    /// Height of a pitch row
    pub row_height: i32,
    /// Notes must stay strictly longer than this
    pub min_note_length: i32,
    /// Length of a note placed with a click
    pub default_note_length: i32,
    /// Width of the grab zone at a note's right edge that resizes instead of moving
    pub edit_handle_width: i32,
    pub pane_width: i32,
    pub pane_height: i32,
    /// Maximum number of compound lists kept on the undo stack
    pub history_limit: usize,
    /// Instrument used for newly placed notes
    pub default_instrument: Instrument,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_x: 20,
            row_height: 10,
            min_note_length: 5,
            default_note_length: 100,
            edit_handle_width: 5,
            pane_width: 2000,
            pane_height: 1280,
            history_limit: 100,
            default_instrument: Instrument::Piano,
        }
    }
}

impl EditorConfig {
    /// Default location: `<config dir>/tune_composer/editor.ron`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join("tune_composer")
            .join("editor.ron")
    }

    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: EditorConfig = ron::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded editor configuration from {}", path.display());
        Ok(config)
    }

    /// Load from [`EditorConfig::default_path`], falling back to defaults
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Ignoring editor configuration at {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Validate and write the configuration, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snap_x <= 0 {
            return Err(ConfigError::InvalidValue(
                "Snap distance must be positive".to_string(),
            ));
        }

        if self.row_height <= 0 {
            return Err(ConfigError::InvalidValue(
                "Row height must be positive".to_string(),
            ));
        }

        if self.min_note_length < 0 {
            return Err(ConfigError::InvalidValue(
                "Minimum note length cannot be negative".to_string(),
            ));
        }

        if self.default_note_length <= self.min_note_length {
            return Err(ConfigError::InvalidValue(format!(
                "Default note length must exceed the minimum of {}",
                self.min_note_length
            )));
        }

        if self.edit_handle_width < 0 || self.edit_handle_width >= self.default_note_length {
            return Err(ConfigError::InvalidValue(
                "Edit handle must be narrower than a default note".to_string(),
            ));
        }

        if self.pane_width <= 0 || self.pane_height <= 0 {
            return Err(ConfigError::InvalidValue(
                "Pane dimensions must be positive".to_string(),
            ));
        }

        // 128 pitch rows must fit on the pane
        if self.pane_height < self.row_height * 128 {
            return Err(ConfigError::InvalidValue(format!(
                "Pane height {} cannot hold 128 rows of {}",
                self.pane_height, self.row_height
            )));
        }

        if self.history_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "History limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
