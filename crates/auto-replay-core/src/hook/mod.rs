pub mod dispatcher;
/// Raw and published hook events.
pub mod event;
/// Atomic flags shared with the hook thread.
pub mod flags;
/// Hook install/uninstall lifecycle.
pub mod global_hook;
/// Lock-free record of held keys.
pub mod keyboard_state;

pub use {
    dispatcher::HookDispatcher,
    event::{
        HookVerdict, HotkeyEvent, InputEvent, KeyEvent, MouseEvent, MouseEventKind, RawKeyEvent,
        RawMouseEvent,
    },
    flags::HookFlags,
    global_hook::{GlobalHook, HookBackend},
    keyboard_state::KeyboardState,
};
