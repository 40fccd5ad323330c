use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gesture::domain::eviction_policy::EvictionPolicy;
use crate::gesture::domain::gesture_thresholds::GestureThresholds;
use crate::shared::constants::{FPS_WINDOW_MS, SETTINGS_DIR_NAME, SETTINGS_FILE_NAME};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to access settings at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// User-tunable pipeline and gesture settings, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// When the camera preview is rendered live by the host, no still image
    /// of each frame is decoded for the result overlay.
    pub camera_live_viewport: bool,
    /// Attach the FPS sample to every result, even before the first window closes.
    pub always_show_fps: bool,
    pub fps_window_ms: u64,
    pub thresholds: GestureThresholds,
    pub eviction: EvictionPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_live_viewport: false,
            always_show_fps: false,
            fps_window_ms: FPS_WINDOW_MS,
            thresholds: GestureThresholds::default(),
            eviction: EvictionPolicy::Never,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| match Self::load_from(&path) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::debug!("Using default settings: {e}");
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_error = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.camera_live_viewport);
        assert!(!settings.always_show_fps);
        assert_eq!(settings.fps_window_ms, 1000);
        assert_eq!(settings.eviction, EvictionPolicy::Never);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            always_show_fps: true,
            eviction: EvictionPolicy::IdleFrames(90),
            ..Settings::default()
        };

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"camera_live_viewport": true}"#).unwrap();

        let loaded = Settings::load_from(&path).unwrap();

        assert!(loaded.camera_live_viewport);
        assert_eq!(loaded.fps_window_ms, FPS_WINDOW_MS);
        assert_eq!(loaded.thresholds, GestureThresholds::default());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::load_from(&dir.path().join("absent.json")),
            Err(SettingsError::Io { .. })
        ));
    }
}
