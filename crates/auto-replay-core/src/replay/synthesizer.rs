use crate::{CoreResult, action::MouseButton, keys::KeyStroke};

use std::sync::{Arc, Mutex};

/// OS input injection used by the replayer.
///
/// Calls are short and synchronous. Implementations must not call back into
/// the hook dispatcher.
pub trait InputSynthesizer: Send {
    /// Press or release a key.
    fn key(&mut self, stroke: KeyStroke, pressed: bool) -> CoreResult<()>;

    /// Move the cursor to absolute screen coordinates.
    fn move_to(&mut self, x: i32, y: i32) -> CoreResult<()>;

    /// Press or release a mouse button at the current cursor position.
    fn button(&mut self, button: MouseButton, pressed: bool) -> CoreResult<()>;

    /// Turn the wheel. Positive notches scroll up.
    fn scroll(&mut self, notches: i32) -> CoreResult<()>;

    /// Current cursor position.
    fn cursor_position(&mut self) -> CoreResult<(i32, i32)>;
}

/// A synthesizer shared between the replayer and its running task.
pub type SharedSynthesizer = Arc<Mutex<dyn InputSynthesizer>>;
