pub mod hotkey;
pub mod translator;

pub use {
    hotkey::{HotkeyBindings, HotkeyMatch, HotkeyMatcher, HotkeyRole, compose, is_valid},
    translator::{KeyStroke, RawKeyCode, key_stroke, normalize, resolve},
};
