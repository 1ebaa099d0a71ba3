use crate::{action::MouseButton, hook::HookFlags, replay::SharedSynthesizer};

use std::sync::{Arc, PoisonError};

use tracing::{debug, warn};

/// Holds the synthetic-echo flag for as long as it lives.
///
/// The hook sees every event we inject; while this guard exists those events
/// are tagged as ours.
pub struct EchoGuard<'a> {
    flags: &'a HookFlags,
}

impl<'a> EchoGuard<'a> {
    /// Raise the echo flag.
    pub fn new(flags: &'a HookFlags) -> Self {
        flags.set_synthetic_echo(true);
        Self { flags }
    }
}

impl Drop for EchoGuard<'_> {
    fn drop(&mut self) {
        self.flags.set_synthetic_echo(false);
    }
}

/// Releases every mouse button when a replay run ends abnormally.
///
/// Armed for the whole run. Normal completion disarms it; cancellation,
/// abort or panic drops it armed, which synthesizes left/right/middle
/// button-up at the current cursor position. Release is best effort.
pub struct ButtonReleaseGuard {
    synthesizer: SharedSynthesizer,
    flags: Arc<HookFlags>,
    armed: bool,
}

impl ButtonReleaseGuard {
    /// Arm a guard for one run.
    pub fn new(synthesizer: SharedSynthesizer, flags: Arc<HookFlags>) -> Self {
        Self {
            synthesizer,
            flags,
            armed: true,
        }
    }

    /// Run finished normally; nothing to release.
    pub fn disarm(mut self) {
        self.armed = false;
    }

    /// Release all buttons now.
    pub fn release_all(synthesizer: &SharedSynthesizer, flags: &HookFlags) {
        let mut synth = synthesizer.lock().unwrap_or_else(PoisonError::into_inner);
        let _echo = EchoGuard::new(flags);

        match synth.cursor_position() {
            Ok((x, y)) => {
                if let Err(e) = synth.move_to(x, y) {
                    warn!(error = ?e, "Failed to pin cursor before button reset");
                }
                debug!(x, y, "Releasing mouse buttons");
            }
            Err(e) => warn!(error = ?e, "Cursor position unavailable, releasing in place"),
        }

        for button in MouseButton::ALL {
            if let Err(e) = synth.button(button, false) {
                warn!(button = ?button, error = ?e, "Failed to release mouse button");
            }
        }
    }
}

impl Drop for ButtonReleaseGuard {
    fn drop(&mut self) {
        if self.armed {
            Self::release_all(&self.synthesizer, &self.flags);
        }
    }
}
