use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

/// Physical mouse buttons that can be recorded and replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
}

impl MouseButton {
    /// All buttons, in release order used when resetting mouse state.
    pub const ALL: [MouseButton; 3] = [Self::Left, Self::Right, Self::Middle];
}

/// Kind of a recorded input event. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
    /// Left button pressed.
    LeftClickDown,
    /// Left button released.
    LeftClickUp,
    /// Right button pressed.
    RightClickDown,
    /// Right button released.
    RightClickUp,
    /// Middle button pressed.
    MiddleClickDown,
    /// Middle button released.
    MiddleClickUp,
    /// One wheel notch away from the user.
    ScrollUp,
    /// One wheel notch toward the user.
    ScrollDown,
}

impl ActionType {
    /// Whether this is a keyboard action.
    pub fn is_key(self) -> bool {
        matches!(self, Self::KeyDown | Self::KeyUp)
    }

    /// Whether this is a mouse button or wheel action.
    pub fn is_mouse(self) -> bool {
        !self.is_key()
    }

    /// Key action for a press or release.
    pub fn for_key(pressed: bool) -> Self {
        if pressed { Self::KeyDown } else { Self::KeyUp }
    }

    /// Button action for a press or release of `button`.
    pub fn for_button(button: MouseButton, pressed: bool) -> Self {
        match (button, pressed) {
            (MouseButton::Left, true) => Self::LeftClickDown,
            (MouseButton::Left, false) => Self::LeftClickUp,
            (MouseButton::Right, true) => Self::RightClickDown,
            (MouseButton::Right, false) => Self::RightClickUp,
            (MouseButton::Middle, true) => Self::MiddleClickDown,
            (MouseButton::Middle, false) => Self::MiddleClickUp,
        }
    }

    /// Scroll action for a wheel delta. Zero has no direction.
    pub fn for_scroll(delta: i32) -> Option<Self> {
        match delta {
            d if d > 0 => Some(Self::ScrollUp),
            d if d < 0 => Some(Self::ScrollDown),
            _ => None,
        }
    }

    /// Button and press state, for button actions.
    pub fn button(self) -> Option<(MouseButton, bool)> {
        match self {
            Self::LeftClickDown => Some((MouseButton::Left, true)),
            Self::LeftClickUp => Some((MouseButton::Left, false)),
            Self::RightClickDown => Some((MouseButton::Right, true)),
            Self::RightClickUp => Some((MouseButton::Right, false)),
            Self::MiddleClickDown => Some((MouseButton::Middle, true)),
            Self::MiddleClickUp => Some((MouseButton::Middle, false)),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Clamp a millisecond value to a valid delay.
pub fn clamp_delay(ms: i64) -> u64 {
    u64::try_from(ms).unwrap_or(0)
}

/// One recorded, replayable input event.
///
/// `delay` is the wait in milliseconds after the previous action completes.
/// The insertion-marker fields are presentation state and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// What kind of input this is.
    pub action_type: ActionType,
    /// Canonical key name, for key actions.
    #[serde(default)]
    pub key: Option<String>,
    /// Screen X, for mouse actions.
    #[serde(default)]
    pub x: i32,
    /// Screen Y, for mouse actions.
    #[serde(default)]
    pub y: i32,
    /// Milliseconds to wait before executing.
    #[serde(default, deserialize_with = "deserialize_delay")]
    pub delay: u64,
    /// Free-form user annotation.
    #[serde(default)]
    pub comment: Option<String>,
    /// Marks where new recorded actions are being inserted.
    #[serde(skip)]
    pub is_insertion_point: bool,
    /// Set when the user dismissed insert mode with Escape.
    #[serde(skip)]
    pub is_visually_deselected: bool,
}

impl Action {
    /// Create an action with no key, no coordinates and the given delay.
    pub fn new(action_type: ActionType, delay_ms: i64) -> Self {
        Self {
            action_type,
            key: None,
            x: 0,
            y: 0,
            delay: clamp_delay(delay_ms),
            comment: None,
            is_insertion_point: false,
            is_visually_deselected: false,
        }
    }

    /// Key press or release of `key`.
    pub fn key(key: impl Into<String>, pressed: bool, delay_ms: i64) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(ActionType::for_key(pressed), delay_ms)
        }
    }

    /// Mouse action at `(x, y)`.
    pub fn mouse(action_type: ActionType, x: i32, y: i32, delay_ms: i64) -> Self {
        Self {
            x,
            y,
            ..Self::new(action_type, delay_ms)
        }
    }

    /// Attach a comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether the row should be highlighted as the insertion point.
    pub fn should_highlight(&self) -> bool {
        self.is_insertion_point && !self.is_visually_deselected
    }
}

/// Any delay shape a hand-edited or foreign profile might contain.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDelay {
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

fn deserialize_delay<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let delay = match RawDelay::deserialize(deserializer)? {
        RawDelay::Int(ms) => clamp_delay(ms),
        RawDelay::Float(ms) if ms.is_finite() && ms > 0.0 => ms as u64,
        RawDelay::Float(_) | RawDelay::Other(_) => 0,
    };
    Ok(delay)
}
