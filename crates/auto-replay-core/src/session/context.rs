use crate::{
    hook::{HookDispatcher, HookFlags, KeyboardState},
    keys::{HotkeyBindings, HotkeyMatcher},
    replay::SharedSynthesizer,
};

use std::sync::Arc;

/// Shared state wired once at startup and handed to the hook dispatcher,
/// the session and the replayer.
#[derive(Clone)]
pub struct InputContext {
    /// Flags read on the hook thread.
    pub flags: Arc<HookFlags>,
    /// Physical key state tracked by the hook.
    pub keyboard: Arc<KeyboardState>,
    /// Role and profile hotkey tables.
    pub matcher: Arc<HotkeyMatcher>,
    /// Input injection.
    pub synthesizer: SharedSynthesizer,
}

impl InputContext {
    /// Build a context with fresh flags and key state.
    pub fn new(
        bindings: HotkeyBindings,
        profile_keys_enabled: bool,
        synthesizer: SharedSynthesizer,
    ) -> Self {
        Self {
            flags: Arc::new(HookFlags::new(profile_keys_enabled)),
            keyboard: Arc::new(KeyboardState::new()),
            matcher: Arc::new(HotkeyMatcher::new(bindings)),
            synthesizer,
        }
    }

    /// Dispatcher sharing this context's flags, key state and hotkeys.
    pub fn dispatcher(&self) -> HookDispatcher {
        HookDispatcher::new(
            Arc::clone(&self.flags),
            Arc::clone(&self.keyboard),
            Arc::clone(&self.matcher),
        )
    }
}
