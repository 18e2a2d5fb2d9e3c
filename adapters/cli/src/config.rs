//! Optional TOML configuration for the window, display scale and movement.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tile_quest_core::{DEFAULT_MOVE_LENGTH, DEFAULT_MOVE_SPEED};
use tile_quest_system_viewport::ScalePolicy;

/// Settings read from `--config`; every section and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) display: ScalePolicy,
    pub(crate) movement: MovementConfig,
    pub(crate) window: WindowConfig,
}

impl GameConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MovementConfig {
    /// Sub-steps per cell.
    pub(crate) length: u8,
    /// Milliseconds taken to cross one cell.
    pub(crate) speed_ms: u64,
}

impl MovementConfig {
    pub(crate) fn speed(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_MOVE_LENGTH,
            speed_ms: DEFAULT_MOVE_SPEED.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Tile Quest".to_owned(),
        }
    }
}
