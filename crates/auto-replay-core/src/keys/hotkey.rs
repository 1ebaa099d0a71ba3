//! Hotkey composition and matching.
//!
//! A composed hotkey is `(Ctrl+)?(Alt+)?(Shift+)?<MainKey>`. Matching is
//! exact and case-insensitive. Collision checks belong to whoever assigns a
//! hotkey; [`HotkeyMatcher::find_collision`] is provided for them.

use crate::{CoreError, CoreResult};

use std::{
    collections::HashMap,
    fmt,
    panic::Location,
    sync::{PoisonError, RwLock},
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Modifier tokens, in the order they appear in a composed hotkey.
pub const MODIFIERS: [&str; 3] = ["Ctrl", "Alt", "Shift"];

/// Prefix used when a profile hotkey is reported as a string.
pub const PROFILE_PREFIX: &str = "PROFILE::";

/// Whether `token` is one of the modifier names.
pub fn is_modifier(token: &str) -> bool {
    MODIFIERS.iter().any(|m| m.eq_ignore_ascii_case(token))
}

/// Compose a hotkey string from the main key and the live modifier state.
///
/// If `main_key` is itself a modifier it is omitted, so the result may be
/// modifiers only. Such strings are only useful for live preview and are
/// rejected by [`is_valid`].
pub fn compose(main_key: &str, ctrl: bool, alt: bool, shift: bool) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(4);
    if ctrl {
        parts.push("Ctrl");
    }
    if alt {
        parts.push("Alt");
    }
    if shift {
        parts.push("Shift");
    }
    if !main_key.is_empty() && !is_modifier(main_key) {
        parts.push(main_key);
    }
    parts.join("+")
}

/// Whether `hotkey` can be stored as a binding.
///
/// Modifiers come first, in [`MODIFIERS`] order and at most once each,
/// followed by exactly one non-modifier key. Anything else could never equal
/// a string produced by [`compose`].
pub fn is_valid(hotkey: &str) -> bool {
    let tokens: Vec<&str> = hotkey.trim().split('+').collect();
    let Some((main, modifiers)) = tokens.split_last() else {
        return false;
    };
    if main.is_empty() || is_modifier(main) {
        return false;
    }

    let mut next = 0;
    for token in modifiers {
        let Some(position) = MODIFIERS.iter().position(|m| m.eq_ignore_ascii_case(token)) else {
            return false;
        };
        if position < next {
            return false;
        }
        next = position + 1;
    }
    true
}

/// Built-in hotkey roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HotkeyRole {
    /// Start/stop recording.
    Recording,
    /// Start/stop replay.
    Replay,
    /// Enable/disable profile hotkeys.
    ProfileToggle,
}

impl fmt::Display for HotkeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recording => write!(f, "recording"),
            Self::Replay => write!(f, "replay"),
            Self::ProfileToggle => write!(f, "profile-toggle"),
        }
    }
}

/// Result of matching a composed hotkey against the registered bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HotkeyMatch {
    /// A built-in role hotkey.
    Role(HotkeyRole),
    /// A per-profile hotkey, carrying the profile name.
    Profile(String),
}

impl fmt::Display for HotkeyMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(role) => write!(f, "{role}"),
            Self::Profile(name) => write!(f, "{PROFILE_PREFIX}{name}"),
        }
    }
}

/// Hotkeys bound to the built-in roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBindings {
    /// Toggles recording.
    #[serde(default = "default_recording_hotkey")]
    pub recording: String,
    /// Toggles replay.
    #[serde(default = "default_replay_hotkey")]
    pub replay: String,
    /// Toggles the profile-hotkey feature.
    #[serde(default = "default_profile_toggle_hotkey")]
    pub profile_toggle: String,
}

fn default_recording_hotkey() -> String {
    "F9".to_string()
}

fn default_replay_hotkey() -> String {
    "F10".to_string()
}

fn default_profile_toggle_hotkey() -> String {
    "Ctrl+Shift+K".to_string()
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            recording: default_recording_hotkey(),
            replay: default_replay_hotkey(),
            profile_toggle: default_profile_toggle_hotkey(),
        }
    }
}

impl HotkeyBindings {
    /// Hotkey bound to `role`.
    pub fn get(&self, role: HotkeyRole) -> &str {
        match role {
            HotkeyRole::Recording => &self.recording,
            HotkeyRole::Replay => &self.replay,
            HotkeyRole::ProfileToggle => &self.profile_toggle,
        }
    }

    fn slot_mut(&mut self, role: HotkeyRole) -> &mut String {
        match role {
            HotkeyRole::Recording => &mut self.recording,
            HotkeyRole::Replay => &mut self.replay,
            HotkeyRole::ProfileToggle => &mut self.profile_toggle,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (HotkeyRole, &str)> {
        [
            HotkeyRole::Recording,
            HotkeyRole::Replay,
            HotkeyRole::ProfileToggle,
        ]
        .into_iter()
        .map(|role| (role, self.get(role)))
    }
}

/// Registered role and profile hotkeys.
///
/// Read on the hook thread for every key-down and written rarely from the
/// session; both tables sit behind `RwLock`s so profile hotkeys can be
/// swapped while the hook is live.
#[derive(Debug, Default)]
pub struct HotkeyMatcher {
    roles: RwLock<HotkeyBindings>,
    profiles: RwLock<HashMap<String, String>>,
}

impl HotkeyMatcher {
    /// Create a matcher with the given role bindings and no profile hotkeys.
    pub fn new(roles: HotkeyBindings) -> Self {
        Self {
            roles: RwLock::new(roles),
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Current role bindings.
    pub fn roles(&self) -> HotkeyBindings {
        self.roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current profile-name → hotkey bindings.
    pub fn profile_hotkeys(&self) -> HashMap<String, String> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebind a role. Invalid hotkeys are rejected and the old binding kept.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn set_role(&self, role: HotkeyRole, hotkey: &str) -> CoreResult<()> {
        if !is_valid(hotkey) {
            return Err(CoreError::InvalidHotkey {
                hotkey: hotkey.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut roles = self.roles.write().unwrap_or_else(PoisonError::into_inner);
        *roles.slot_mut(role) = hotkey.trim().to_string();

        info!(role = %role, hotkey = hotkey, "Role hotkey bound");

        Ok(())
    }

    /// Replace the whole set of profile hotkeys.
    ///
    /// Entries with invalid hotkeys are dropped.
    #[instrument(skip(self, hotkeys), fields(count = hotkeys.len()))]
    pub fn register_profile_hotkeys(&self, hotkeys: HashMap<String, String>) {
        let valid: HashMap<String, String> = hotkeys
            .into_iter()
            .filter(|(name, hotkey)| {
                let ok = is_valid(hotkey);
                if !ok {
                    warn!(profile = %name, hotkey = %hotkey, "Ignoring invalid profile hotkey");
                }
                ok
            })
            .map(|(name, hotkey)| (name, hotkey.trim().to_string()))
            .collect();

        debug!(registered = valid.len(), "Profile hotkeys replaced");

        *self
            .profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner) = valid;
    }

    /// Match a composed hotkey. Role hotkeys win over profile hotkeys.
    pub fn match_hotkey(&self, composed: &str) -> Option<HotkeyMatch> {
        if composed.is_empty() {
            return None;
        }
        self.match_role(composed)
            .map(HotkeyMatch::Role)
            .or_else(|| self.match_profile(composed).map(HotkeyMatch::Profile))
    }

    /// Role bound to `composed`, if any.
    pub fn match_role(&self, composed: &str) -> Option<HotkeyRole> {
        let roles = self.roles.read().unwrap_or_else(PoisonError::into_inner);
        roles
            .iter()
            .find(|(_, hotkey)| hotkey.eq_ignore_ascii_case(composed))
            .map(|(role, _)| role)
    }

    /// Profile bound to `composed`, if any.
    pub fn match_profile(&self, composed: &str) -> Option<String> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        profiles
            .iter()
            .find(|(_, hotkey)| hotkey.eq_ignore_ascii_case(composed))
            .map(|(name, _)| name.clone())
    }

    /// Binding that already owns `hotkey`, skipping `ignore`.
    pub fn find_collision(&self, hotkey: &str, ignore: Option<&HotkeyMatch>) -> Option<HotkeyMatch> {
        let roles = self.roles.read().unwrap_or_else(PoisonError::into_inner);
        let role_hit = roles
            .iter()
            .filter(|(role, _)| ignore != Some(&HotkeyMatch::Role(*role)))
            .find(|(_, bound)| bound.eq_ignore_ascii_case(hotkey))
            .map(|(role, _)| HotkeyMatch::Role(role));
        drop(roles);

        role_hit.or_else(|| {
            let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
            profiles
                .iter()
                .filter(|(name, _)| ignore != Some(&HotkeyMatch::Profile((*name).clone())))
                .find(|(_, bound)| bound.eq_ignore_ascii_case(hotkey))
                .map(|(name, _)| HotkeyMatch::Profile(name.clone()))
        })
    }
}
