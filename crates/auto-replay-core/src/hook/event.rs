use crate::{
    action::MouseButton,
    keys::{HotkeyMatch, RawKeyCode},
};

use std::{borrow::Cow, time::Instant};

/// A keyboard transition as reported by the OS hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// Virtual-key code.
    pub code: RawKeyCode,
    /// `true` for key-down (including auto-repeat), `false` for key-up.
    pub pressed: bool,
    /// When the hook saw the event.
    pub at: Instant,
}

/// What happened to the mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    /// Cursor moved.
    Move,
    /// Button pressed or released.
    Button {
        /// Which button.
        button: MouseButton,
        /// `true` on press.
        pressed: bool,
    },
    /// Wheel turned. Positive is away from the user.
    Wheel {
        /// Signed wheel delta.
        delta: i32,
    },
}

/// A mouse event as reported by the OS hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMouseEvent {
    /// Event kind.
    pub kind: MouseEventKind,
    /// Cursor X in screen coordinates.
    pub x: i32,
    /// Cursor Y in screen coordinates.
    pub y: i32,
    /// When the hook saw the event.
    pub at: Instant,
}

/// Whether the OS should deliver the event to other applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookVerdict {
    /// Forward to the rest of the system.
    Pass,
    /// Swallow the event.
    Suppress,
}

/// Normalized key event published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Canonical key name.
    pub name: Cow<'static, str>,
    /// Virtual-key code the name came from.
    pub code: RawKeyCode,
    /// `true` for key-down.
    pub pressed: bool,
    /// Set when the event is echo of our own synthesized input.
    pub synthetic: bool,
    /// Capture time.
    pub at: Instant,
}

/// Mouse button or wheel event published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Button or wheel details. Never [`MouseEventKind::Move`].
    pub kind: MouseEventKind,
    /// Cursor X.
    pub x: i32,
    /// Cursor Y.
    pub y: i32,
    /// Set when the event is echo of our own synthesized input.
    pub synthetic: bool,
    /// Capture time.
    pub at: Instant,
}

/// A consumed hotkey press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyEvent {
    /// The binding that matched.
    pub hotkey: HotkeyMatch,
    /// Composed hotkey string as typed.
    pub composed: String,
    /// Capture time.
    pub at: Instant,
}

/// Everything the dispatcher publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Ordinary key transition.
    Key(KeyEvent),
    /// Mouse button or wheel.
    Mouse(MouseEvent),
    /// Role or profile hotkey.
    Hotkey(HotkeyEvent),
}
