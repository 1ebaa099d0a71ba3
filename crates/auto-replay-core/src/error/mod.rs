use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Input capture and replay errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A key name has no raw code mapping.
    #[error("Unknown key: {name:?} {location}")]
    UnknownKey {
        /// The key name that failed to resolve.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A hotkey string is empty or consists only of modifiers.
    #[error("Invalid hotkey: {hotkey:?} {location}")]
    InvalidHotkey {
        /// The rejected hotkey string.
        hotkey: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A hotkey is already bound to another role or profile.
    #[error("Hotkey {hotkey:?} is already used by {owner} {location}")]
    HotkeyCollision {
        /// The requested hotkey string.
        hotkey: String,
        /// Display form of the binding that already owns it.
        owner: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The OS-level input hooks could not be installed.
    #[error("Hook installation failed: {reason} {location}")]
    HookInstallFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Synthesizing an input event failed.
    #[error("Input synthesis failed: {reason} {location}")]
    SynthesisFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A replay was started while another one is still running.
    #[error("Replay already running {location}")]
    ReplayAlreadyRunning {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An edit was attempted while recording or replaying.
    #[error("Session busy: {reason} {location}")]
    SessionBusy {
        /// Description of the rejected operation.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Action data could not be (de)serialized.
    #[error("Action format error: {source} {location}")]
    ActionFormat {
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<serde_json::Error> for CoreError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        CoreError::ActionFormat {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
