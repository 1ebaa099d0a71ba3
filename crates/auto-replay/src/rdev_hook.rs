//! OS hook backend built on `rdev::grab`.
//!
//! `rdev::grab` blocks its thread for the life of the process and cannot be
//! cancelled. The grab thread is therefore spawned once and reused:
//! uninstalling detaches the dispatcher so every event passes through
//! untouched, and a later install attaches a new one.

use auto_replay_core::{
    CoreError, CoreResult, HookBackend, HookDispatcher, HookVerdict, MouseButton,
    MouseEventKind, RawKeyCode, RawKeyEvent, RawMouseEvent,
};

use std::{
    panic::Location,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicI32, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use rdev::{Button, EventType, Key};
use tracing::{info, instrument, trace, warn};

/// How long install waits for the grab to report an early failure.
const GRAB_STARTUP_WAIT: Duration = Duration::from_millis(250);

/// Wheel units per notch, as reported by the Windows hook.
const WHEEL_DELTA: i32 = 120;

/// State shared with the grab thread.
#[derive(Default)]
pub(crate) struct GrabState {
    dispatcher: RwLock<Option<Arc<HookDispatcher>>>,
    cursor_x: AtomicI32,
    cursor_y: AtomicI32,
}

impl GrabState {
    pub(crate) fn attach(&self, dispatcher: Arc<HookDispatcher>) {
        *self
            .dispatcher
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(dispatcher);
    }

    pub(crate) fn detach(&self) {
        *self
            .dispatcher
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Classify one rdev event. Runs on the grab thread.
    pub(crate) fn handle(&self, event_type: &EventType) -> HookVerdict {
        if let EventType::MouseMove { x, y } = event_type {
            self.cursor_x.store(x.round() as i32, Ordering::Relaxed);
            self.cursor_y.store(y.round() as i32, Ordering::Relaxed);
        }

        let dispatcher = self
            .dispatcher
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(dispatcher) = dispatcher.as_ref() else {
            return HookVerdict::Pass;
        };
        let at = Instant::now();

        match *event_type {
            EventType::KeyPress(key) | EventType::KeyRelease(key) => {
                let Some(code) = vk_code(key) else {
                    trace!(key = ?key, "Key without virtual-key code");
                    return HookVerdict::Pass;
                };
                dispatcher.on_keyboard(RawKeyEvent {
                    code,
                    pressed: matches!(event_type, EventType::KeyPress(_)),
                    at,
                })
            }
            EventType::ButtonPress(button) | EventType::ButtonRelease(button) => {
                let Some(button) = mouse_button(button) else {
                    return HookVerdict::Pass;
                };
                dispatcher.on_mouse(self.mouse_event(
                    MouseEventKind::Button {
                        button,
                        pressed: matches!(event_type, EventType::ButtonPress(_)),
                    },
                    at,
                ))
            }
            EventType::Wheel { delta_y, .. } => {
                if delta_y == 0 {
                    return HookVerdict::Pass;
                }
                let notches = i32::try_from(delta_y).unwrap_or(delta_y.signum() as i32);
                dispatcher.on_mouse(self.mouse_event(
                    MouseEventKind::Wheel {
                        delta: notches.saturating_mul(WHEEL_DELTA),
                    },
                    at,
                ))
            }
            EventType::MouseMove { .. } => {
                dispatcher.on_mouse(self.mouse_event(MouseEventKind::Move, at))
            }
        }
    }

    pub(crate) fn cursor(&self) -> (i32, i32) {
        (
            self.cursor_x.load(Ordering::Relaxed),
            self.cursor_y.load(Ordering::Relaxed),
        )
    }

    fn mouse_event(&self, kind: MouseEventKind, at: Instant) -> RawMouseEvent {
        let (x, y) = self.cursor();
        RawMouseEvent { kind, x, y, at }
    }
}

/// [`HookBackend`] that feeds a [`HookDispatcher`] from `rdev::grab`.
#[derive(Default)]
pub struct RdevHookBackend {
    state: Arc<GrabState>,
    grab_running: bool,
}

impl RdevHookBackend {
    /// Backend with no grab thread yet.
    pub fn new() -> Self {
        Self::default()
    }

    #[track_caller]
    fn spawn_grab(&mut self) -> CoreResult<()> {
        let caller = Location::caller();
        let state = Arc::clone(&self.state);
        let (startup_tx, startup_rx) = mpsc::channel::<String>();

        thread::Builder::new()
            .name("auto-replay-hook".to_string())
            .spawn(move || {
                let result = rdev::grab(move |event| {
                    match state.handle(&event.event_type) {
                        HookVerdict::Pass => Some(event),
                        HookVerdict::Suppress => None,
                    }
                });

                let reason = match result {
                    Ok(()) => "grab loop exited".to_string(),
                    Err(e) => format!("{e:?}"),
                };
                warn!(reason = %reason, "Input grab stopped");
                let _ = startup_tx.send(reason);
            })
            .map_err(|e| CoreError::HookInstallFailed {
                reason: format!("Failed to spawn hook thread: {}", e),
                location: ErrorLocation::from(caller),
            })?;

        match startup_rx.recv_timeout(GRAB_STARTUP_WAIT) {
            Err(RecvTimeoutError::Timeout) => {
                self.grab_running = true;
                Ok(())
            }
            Ok(reason) => Err(CoreError::HookInstallFailed {
                reason,
                location: ErrorLocation::from(caller),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(CoreError::HookInstallFailed {
                reason: "hook thread exited during startup".to_string(),
                location: ErrorLocation::from(caller),
            }),
        }
    }
}

impl HookBackend for RdevHookBackend {
    #[instrument(skip_all)]
    fn install(&mut self, dispatcher: Arc<HookDispatcher>) -> CoreResult<()> {
        self.state.attach(dispatcher);

        if !self.grab_running
            && let Err(e) = self.spawn_grab()
        {
            self.state.detach();
            return Err(e);
        }

        info!("Input grab attached");
        Ok(())
    }

    #[instrument(skip_all)]
    fn uninstall(&mut self) {
        self.state.detach();
        info!("Input grab detached, events pass through");
    }
}

fn mouse_button(button: Button) -> Option<MouseButton> {
    match button {
        Button::Left => Some(MouseButton::Left),
        Button::Right => Some(MouseButton::Right),
        Button::Middle => Some(MouseButton::Middle),
        Button::Unknown(_) => None,
    }
}

/// Windows virtual-key code for an rdev key.
pub(crate) fn vk_code(key: Key) -> Option<RawKeyCode> {
    let code = match key {
        Key::Backspace => 0x08,
        Key::Tab => 0x09,
        Key::Return | Key::KpReturn => 0x0D,
        Key::Pause => 0x13,
        Key::CapsLock => 0x14,
        Key::Escape => 0x1B,
        Key::Space => 0x20,
        Key::PageUp => 0x21,
        Key::PageDown => 0x22,
        Key::End => 0x23,
        Key::Home => 0x24,
        Key::LeftArrow => 0x25,
        Key::UpArrow => 0x26,
        Key::RightArrow => 0x27,
        Key::DownArrow => 0x28,
        Key::PrintScreen => 0x2C,
        Key::Insert => 0x2D,
        Key::Delete => 0x2E,
        Key::Num0 => 0x30,
        Key::Num1 => 0x31,
        Key::Num2 => 0x32,
        Key::Num3 => 0x33,
        Key::Num4 => 0x34,
        Key::Num5 => 0x35,
        Key::Num6 => 0x36,
        Key::Num7 => 0x37,
        Key::Num8 => 0x38,
        Key::Num9 => 0x39,
        Key::KeyA => 0x41,
        Key::KeyB => 0x42,
        Key::KeyC => 0x43,
        Key::KeyD => 0x44,
        Key::KeyE => 0x45,
        Key::KeyF => 0x46,
        Key::KeyG => 0x47,
        Key::KeyH => 0x48,
        Key::KeyI => 0x49,
        Key::KeyJ => 0x4A,
        Key::KeyK => 0x4B,
        Key::KeyL => 0x4C,
        Key::KeyM => 0x4D,
        Key::KeyN => 0x4E,
        Key::KeyO => 0x4F,
        Key::KeyP => 0x50,
        Key::KeyQ => 0x51,
        Key::KeyR => 0x52,
        Key::KeyS => 0x53,
        Key::KeyT => 0x54,
        Key::KeyU => 0x55,
        Key::KeyV => 0x56,
        Key::KeyW => 0x57,
        Key::KeyX => 0x58,
        Key::KeyY => 0x59,
        Key::KeyZ => 0x5A,
        Key::MetaLeft => 0x5B,
        Key::MetaRight => 0x5C,
        Key::Kp0 => 0x60,
        Key::Kp1 => 0x61,
        Key::Kp2 => 0x62,
        Key::Kp3 => 0x63,
        Key::Kp4 => 0x64,
        Key::Kp5 => 0x65,
        Key::Kp6 => 0x66,
        Key::Kp7 => 0x67,
        Key::Kp8 => 0x68,
        Key::Kp9 => 0x69,
        Key::KpMultiply => 0x6A,
        Key::KpPlus => 0x6B,
        Key::KpMinus => 0x6D,
        Key::KpDelete => 0x6E,
        Key::KpDivide => 0x6F,
        Key::F1 => 0x70,
        Key::F2 => 0x71,
        Key::F3 => 0x72,
        Key::F4 => 0x73,
        Key::F5 => 0x74,
        Key::F6 => 0x75,
        Key::F7 => 0x76,
        Key::F8 => 0x77,
        Key::F9 => 0x78,
        Key::F10 => 0x79,
        Key::F11 => 0x7A,
        Key::F12 => 0x7B,
        Key::NumLock => 0x90,
        Key::ScrollLock => 0x91,
        Key::ShiftLeft => 0xA0,
        Key::ShiftRight => 0xA1,
        Key::ControlLeft => 0xA2,
        Key::ControlRight => 0xA3,
        Key::Alt => 0xA4,
        Key::AltGr => 0xA5,
        Key::SemiColon => 0xBA,
        Key::Equal => 0xBB,
        Key::Comma => 0xBC,
        Key::Minus => 0xBD,
        Key::Dot => 0xBE,
        Key::Slash => 0xBF,
        Key::BackQuote => 0xC0,
        Key::LeftBracket => 0xDB,
        Key::BackSlash => 0xDC,
        Key::RightBracket => 0xDD,
        Key::Quote => 0xDE,
        Key::IntlBackslash => 0xE2,
        Key::Unknown(code) => {
            return u16::try_from(code)
                .ok()
                .filter(|c| *c <= 0xFF)
                .map(RawKeyCode);
        }
        _ => return None,
    };
    Some(RawKeyCode(code))
}
