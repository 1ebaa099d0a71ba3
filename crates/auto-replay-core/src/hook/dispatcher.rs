//! Classification of raw hook events.
//!
//! [`HookDispatcher::on_keyboard`] and [`HookDispatcher::on_mouse`] run on
//! the OS input thread. They only update key state, match hotkeys and push
//! events into bounded channels with `try_send`; they never block.

use crate::{
    hook::{
        HookFlags, HookVerdict, InputEvent, KeyboardState, MouseEventKind, RawKeyEvent,
        RawMouseEvent,
        event::{HotkeyEvent, KeyEvent, MouseEvent},
    },
    keys::{
        HotkeyMatch, HotkeyMatcher, RawKeyCode, compose, normalize,
        translator::{VK_LCONTROL, VK_RMENU},
    },
};

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{trace, warn};

/// Window after an Alt-Right down in which a Ctrl-Left down is AltGr noise.
///
/// Layouts with AltGr report Alt-Right as a Ctrl-Left down followed almost
/// immediately by the Alt-Right down, or the reverse. The two arrive within
/// a few milliseconds of each other; a real Ctrl press that close to Alt-Right
/// is not something a person does, so 100ms leaves room for a busy hook
/// thread without swallowing deliberate presses.
pub const ALTGR_WINDOW: Duration = Duration::from_millis(100);

/// Window after a consumed hotkey in which its key-up is not published.
///
/// The key-down was suppressed, so subscribers never saw it. Publishing the
/// matching key-up would leave the recorder with an unpaired `KeyUp`. A
/// hotkey tap is released well inside 300ms; a key held longer than that
/// is published as usual.
pub const HOTKEY_KEYUP_WINDOW: Duration = Duration::from_millis(300);

/// Timing memory used by the suppression rules.
#[derive(Debug, Default)]
struct SuppressionState {
    last_alt_right_down: Option<Instant>,
    altgr_ctrl_down: bool,
    last_hotkey: Option<(RawKeyCode, Instant)>,
}

/// Turns raw hook messages into [`InputEvent`]s for subscribers.
#[derive(Debug)]
pub struct HookDispatcher {
    flags: Arc<HookFlags>,
    keyboard: Arc<KeyboardState>,
    matcher: Arc<HotkeyMatcher>,
    subscribers: Mutex<Vec<mpsc::Sender<InputEvent>>>,
    suppression: Mutex<SuppressionState>,
}

impl HookDispatcher {
    /// Create a dispatcher sharing flags, key state and hotkey tables with
    /// the session.
    pub fn new(
        flags: Arc<HookFlags>,
        keyboard: Arc<KeyboardState>,
        matcher: Arc<HotkeyMatcher>,
    ) -> Self {
        Self {
            flags,
            keyboard,
            matcher,
            subscribers: Mutex::new(Vec::new()),
            suppression: Mutex::new(SuppressionState::default()),
        }
    }

    /// Register a subscriber channel with room for `capacity` events.
    pub fn subscribe(&self, capacity: usize) -> mpsc::Receiver<InputEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Shared flags.
    pub fn flags(&self) -> &Arc<HookFlags> {
        &self.flags
    }

    /// Shared key state.
    pub fn keyboard(&self) -> &Arc<KeyboardState> {
        &self.keyboard
    }

    /// Handle one keyboard message.
    pub fn on_keyboard(&self, event: RawKeyEvent) -> HookVerdict {
        self.keyboard.set(event.code, event.pressed);

        if self.flags.ignore_hotkeys() {
            return HookVerdict::Pass;
        }

        let synthetic = self.flags.synthetic_echo();
        let mut suppression = self
            .suppression
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if event.code.0 == VK_RMENU && event.pressed {
            suppression.last_alt_right_down = Some(event.at);
        }

        if event.code.0 == VK_LCONTROL {
            if event.pressed {
                let altgr = suppression
                    .last_alt_right_down
                    .is_some_and(|t| event.at.saturating_duration_since(t) < ALTGR_WINDOW);
                if altgr {
                    suppression.altgr_ctrl_down = true;
                    trace!("AltGr Ctrl-Left dropped");
                    return HookVerdict::Pass;
                }
            } else if suppression.altgr_ctrl_down {
                suppression.altgr_ctrl_down = false;
                return HookVerdict::Pass;
            }
        }

        let name = normalize(event.code);

        if event.pressed && !synthetic {
            let composed = compose(
                &name,
                self.keyboard.ctrl(),
                self.keyboard.alt(),
                self.keyboard.shift(),
            );
            if let Some(hotkey) = self.consumable_hotkey(&composed) {
                suppression.last_hotkey = Some((event.code, event.at));
                drop(suppression);
                trace!(hotkey = %hotkey, "Hotkey consumed");
                self.publish(InputEvent::Hotkey(HotkeyEvent {
                    hotkey,
                    composed,
                    at: event.at,
                }));
                return HookVerdict::Suppress;
            }
        }

        if !event.pressed
            && let Some((code, fired_at)) = suppression.last_hotkey
            && code == event.code
        {
            suppression.last_hotkey = None;
            if event.at.saturating_duration_since(fired_at) < HOTKEY_KEYUP_WINDOW {
                return HookVerdict::Pass;
            }
        }
        drop(suppression);

        self.publish(InputEvent::Key(KeyEvent {
            name,
            code: event.code,
            pressed: event.pressed,
            synthetic,
            at: event.at,
        }));
        HookVerdict::Pass
    }

    /// Handle one mouse message. Mouse input is never suppressed.
    pub fn on_mouse(&self, event: RawMouseEvent) -> HookVerdict {
        if matches!(event.kind, MouseEventKind::Move) {
            return HookVerdict::Pass;
        }

        self.publish(InputEvent::Mouse(MouseEvent {
            kind: event.kind,
            x: event.x,
            y: event.y,
            synthetic: self.flags.synthetic_echo(),
            at: event.at,
        }));
        HookVerdict::Pass
    }

    fn consumable_hotkey(&self, composed: &str) -> Option<HotkeyMatch> {
        match self.matcher.match_hotkey(composed)? {
            HotkeyMatch::Role(role) => Some(HotkeyMatch::Role(role)),
            HotkeyMatch::Profile(name) => {
                let allowed = self.flags.profile_keys_enabled()
                    && !self.flags.recording()
                    && !self.flags.replay_active();
                allowed.then_some(HotkeyMatch::Profile(name))
            }
        }
    }

    fn publish(&self, event: InputEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Subscriber queue full, event dropped");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        });
    }
}
