//! Configuration management for auto-replay.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{DEFAULT_ACTIVE_PROFILE, ProfilesConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use auto_replay_core::{HotkeyBindings, LoopOptions, RecordOptions};
use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Role hotkeys.
    pub hotkeys: HotkeyBindings,
    /// Recording filters and delay mode.
    pub recording: RecordOptions,
    /// Loop count and interval.
    pub replay: LoopOptions,
    /// Profile store settings.
    pub profiles: ProfilesConfig,
}

impl Config {
    /// Load configuration from `config_path`, writing the default there if
    /// the file does not exist.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!(config_path = ?config_path, "No config found, creating default");
            let config = Config::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        write_atomic(config_path, contents.as_bytes()).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to write config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Name of the profile loaded at startup and saved on exit.
    pub fn active_profile(&self) -> &str {
        self.profiles
            .active
            .as_deref()
            .unwrap_or(DEFAULT_ACTIVE_PROFILE)
    }

    /// Directory holding the profile files.
    #[track_caller]
    pub fn profiles_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = &self.profiles.dir {
            return Ok(dir.clone());
        }
        Ok(Self::project_dirs()?.data_dir().join("profiles"))
    }

    /// Path of `config.toml` in the platform config directory, created if
    /// missing.
    #[track_caller]
    #[instrument]
    pub fn default_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "auto-replay", "Auto-Replay").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}

/// Write `contents` to a sibling temp file, sync it, then rename over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    let mut temp_file = fs::File::create(&temp_path)?;
    temp_file.write_all(contents)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)
}
