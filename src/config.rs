//! Session configuration.
//!
//! Everything here has a default matching the classic 80x43 layout, so an
//! absent or partial JSON file is fine: missing keys fall back field by field.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    pub max_rooms: u32,
    pub room_min_size: i32,
    pub room_max_size: i32,
    pub fov_radius: i32,
    /// Oldest messages are dropped past this many entries.
    pub message_history: usize,
    /// Fixed seed for reproducible runs; a clock-derived one is used if absent.
    pub seed: Option<u64>,
    /// Where the session tries to save itself after a fatal error.
    pub autosave_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 80,
            map_height: 43,
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
            fov_radius: 8,
            message_history: 256,
            seed: None,
            autosave_path: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room_min_size < 3 {
            return Err(ConfigError::Invalid(format!(
                "room_min_size must be at least 3, got {}",
                self.room_min_size
            )));
        }
        if self.room_max_size < self.room_min_size {
            return Err(ConfigError::Invalid(format!(
                "room_max_size {} is smaller than room_min_size {}",
                self.room_max_size, self.room_min_size
            )));
        }
        if self.map_width < self.room_max_size + 2 || self.map_height < self.room_max_size + 2 {
            return Err(ConfigError::Invalid(format!(
                "a {}x{} map cannot hold rooms of size {}",
                self.map_width, self.map_height, self.room_max_size
            )));
        }
        if self.fov_radius < 1 {
            return Err(ConfigError::Invalid("fov_radius must be positive".into()));
        }
        Ok(())
    }
}
