//! One JSON file per profile.

use crate::{AppError, AppResult, config::write_atomic};

use std::{
    collections::HashMap,
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use auto_replay_core::Profile;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

const PROFILE_EXTENSION: &str = "json";

/// Reads and writes profiles as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the profile files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the profile called `name`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn load(&self, name: &str) -> AppResult<Profile> {
        let caller = Location::caller();
        let path = self.path(name)?;

        let contents = fs::read_to_string(&path).map_err(|e| AppError::ProfileError {
            name: name.to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
            location: ErrorLocation::from(caller),
        })?;

        let profile: Profile =
            serde_json::from_str(&contents).map_err(|e| AppError::ProfileError {
                name: name.to_string(),
                reason: format!("Failed to parse {}: {}", path.display(), e),
                location: ErrorLocation::from(caller),
            })?;

        info!(
            profile = name,
            actions = profile.actions.len(),
            "Profile loaded"
        );

        Ok(profile)
    }

    /// Whether a profile called `name` is stored.
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_ok_and(|path| path.exists())
    }

    /// Load `name`, or an empty profile if it does not exist yet.
    #[track_caller]
    pub fn load_or_default(&self, name: &str) -> AppResult<Profile> {
        if self.exists(name) {
            self.load(name)
        } else {
            debug!(profile = name, "Profile not found, starting empty");
            Ok(Profile::default())
        }
    }

    /// Save `profile` as `name`, replacing any previous version atomically.
    #[track_caller]
    #[instrument(skip(self, profile), fields(actions = profile.actions.len()))]
    pub fn save(&self, name: &str, profile: &Profile) -> AppResult<()> {
        let caller = Location::caller();
        let path = self.path(name)?;

        fs::create_dir_all(&self.dir)?;

        let contents =
            serde_json::to_string_pretty(profile).map_err(|e| AppError::ProfileError {
                name: name.to_string(),
                reason: format!("Failed to serialize: {}", e),
                location: ErrorLocation::from(caller),
            })?;

        write_atomic(&path, contents.as_bytes()).map_err(|e| AppError::ProfileError {
            name: name.to_string(),
            reason: format!("Failed to write {}: {}", path.display(), e),
            location: ErrorLocation::from(caller),
        })?;

        info!(profile = name, path = ?path, "Profile saved");

        Ok(())
    }

    /// Names of all stored profiles, sorted.
    pub fn names(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = ?self.dir, error = ?e, "Profile directory not readable");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == PROFILE_EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        names
    }

    /// Profile name to hotkey, for every stored profile that has one.
    ///
    /// Unreadable profiles are skipped with a warning.
    #[instrument(skip(self))]
    pub fn hotkeys(&self) -> HashMap<String, String> {
        self.names()
            .into_iter()
            .filter_map(|name| match self.load(&name) {
                Ok(profile) => profile.hotkey.map(|hotkey| (name, hotkey)),
                Err(e) => {
                    warn!(profile = %name, error = ?e, "Skipping unreadable profile");
                    None
                }
            })
            .collect()
    }

    #[track_caller]
    fn path(&self, name: &str) -> AppResult<PathBuf> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\', ':'])
            && !name.contains("..");
        if !valid {
            return Err(AppError::ProfileError {
                name: name.to_string(),
                reason: "Profile names must be plain file names".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(self.dir.join(format!("{name}.{PROFILE_EXTENSION}")))
    }
}
