use std::sync::atomic::{AtomicBool, Ordering};

/// Booleans shared between the hook thread, the session and the replayer.
///
/// Reads on the hook thread may see a value one event stale.
#[derive(Debug, Default)]
pub struct HookFlags {
    ignore_hotkeys: AtomicBool,
    synthetic_echo: AtomicBool,
    profile_keys_enabled: AtomicBool,
    recording: AtomicBool,
    replay_active: AtomicBool,
}

impl HookFlags {
    /// Create flags with the profile-hotkey feature on or off.
    pub fn new(profile_keys_enabled: bool) -> Self {
        let flags = Self::default();
        flags.set_profile_keys_enabled(profile_keys_enabled);
        flags
    }

    /// Whether keyboard events pass through without classification.
    pub fn ignore_hotkeys(&self) -> bool {
        self.ignore_hotkeys.load(Ordering::Acquire)
    }

    /// Set while a text field has focus in the host UI.
    pub fn set_ignore_hotkeys(&self, value: bool) {
        self.ignore_hotkeys.store(value, Ordering::Release);
    }

    /// Whether the replayer is currently injecting an event.
    pub fn synthetic_echo(&self) -> bool {
        self.synthetic_echo.load(Ordering::Acquire)
    }

    /// Set by the replayer around each synthesis call.
    pub fn set_synthetic_echo(&self, value: bool) {
        self.synthetic_echo.store(value, Ordering::Release);
    }

    /// Whether profile hotkeys may fire.
    pub fn profile_keys_enabled(&self) -> bool {
        self.profile_keys_enabled.load(Ordering::Acquire)
    }

    /// Enable or disable profile hotkeys.
    pub fn set_profile_keys_enabled(&self, value: bool) {
        self.profile_keys_enabled.store(value, Ordering::Release);
    }

    /// Flip profile hotkeys and return the new value.
    pub fn toggle_profile_keys(&self) -> bool {
        !self.profile_keys_enabled.fetch_xor(true, Ordering::AcqRel)
    }

    /// Whether a recording session is open.
    pub fn recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Mirror of the session's recording state.
    pub fn set_recording(&self, value: bool) {
        self.recording.store(value, Ordering::Release);
    }

    /// Whether a replay run is active.
    pub fn replay_active(&self) -> bool {
        self.replay_active.load(Ordering::Acquire)
    }

    /// Mirror of the session's replaying state.
    pub fn set_replay_active(&self, value: bool) {
        self.replay_active.store(value, Ordering::Release);
    }
}
