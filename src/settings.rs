//! Session settings
//!
//! Gameplay numbers are fixed in `consts`; these only shape how a session is
//! presented and paced. Loaded from a JSON file, any missing key falls back to
//! its default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{FPS, GAME_OVER_HOLD};

/// Errors from loading a settings file
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("target_fps must be at least 1")]
    ZeroFps,
}

/// Session settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Frames per second the session loop is paced to
    pub target_fps: u32,
    /// How long the end-of-round message stays up (milliseconds)
    pub game_over_hold_ms: u64,
    /// Log a HUD line every N frames (0 = never)
    pub hud_interval: u32,
    /// Flag bombs whose timer is about to run out
    pub timer_warning: bool,
    /// Stop after this many frames (headless runs)
    pub max_frames: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_fps: FPS,
            game_over_hold_ms: GAME_OVER_HOLD.as_millis() as u64,
            hud_interval: FPS,
            timer_warning: true,
            max_frames: None,
        }
    }
}

impl Settings {
    /// Frame budget at the target rate
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    pub fn game_over_hold(&self) -> Duration {
        Duration::from_millis(self.game_over_hold_ms)
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        if settings.target_fps == 0 {
            return Err(SettingsError::ZeroFps);
        }
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
