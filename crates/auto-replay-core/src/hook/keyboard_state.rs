use crate::keys::{
    RawKeyCode,
    translator::{
        VK_CONTROL, VK_LCONTROL, VK_LMENU, VK_LSHIFT, VK_MENU, VK_RCONTROL, VK_RMENU, VK_RSHIFT,
        VK_SHIFT,
    },
};

use std::sync::atomic::{AtomicBool, Ordering};

const CTRL_FAMILY: [u16; 3] = [VK_CONTROL, VK_LCONTROL, VK_RCONTROL];
const ALT_FAMILY: [u16; 3] = [VK_MENU, VK_LMENU, VK_RMENU];
const SHIFT_FAMILY: [u16; 3] = [VK_SHIFT, VK_LSHIFT, VK_RSHIFT];

/// Which keys are physically down, as last reported by the hook.
///
/// This is the only source of modifier state used for hotkey composition.
#[derive(Debug)]
pub struct KeyboardState {
    keys: [AtomicBool; 256],
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self {
            keys: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }
}

impl KeyboardState {
    /// Create a state with every key up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition. Codes above 255 are ignored.
    pub fn set(&self, code: RawKeyCode, down: bool) {
        if let Some(slot) = self.keys.get(usize::from(code.0)) {
            slot.store(down, Ordering::Release);
        }
    }

    /// Whether `code` is down. Modifier codes match either side.
    pub fn is_down(&self, code: RawKeyCode) -> bool {
        match family(code.0) {
            Some(codes) => codes.iter().any(|c| self.raw_down(*c)),
            None => self.raw_down(code.0),
        }
    }

    /// Whether any Ctrl key is down.
    pub fn ctrl(&self) -> bool {
        self.is_down(RawKeyCode(VK_CONTROL))
    }

    /// Whether any Alt key is down.
    pub fn alt(&self) -> bool {
        self.is_down(RawKeyCode(VK_MENU))
    }

    /// Whether any Shift key is down.
    pub fn shift(&self) -> bool {
        self.is_down(RawKeyCode(VK_SHIFT))
    }

    /// Whether every code in `codes` is up.
    pub fn all_released(&self, codes: &[RawKeyCode]) -> bool {
        codes.iter().all(|code| !self.is_down(*code))
    }

    /// Mark every key up.
    pub fn reset(&self) {
        for key in &self.keys {
            key.store(false, Ordering::Release);
        }
    }

    fn raw_down(&self, code: u16) -> bool {
        self.keys
            .get(usize::from(code))
            .is_some_and(|k| k.load(Ordering::Acquire))
    }
}

fn family(code: u16) -> Option<&'static [u16; 3]> {
    if CTRL_FAMILY.contains(&code) {
        Some(&CTRL_FAMILY)
    } else if ALT_FAMILY.contains(&code) {
        Some(&ALT_FAMILY)
    } else if SHIFT_FAMILY.contains(&code) {
        Some(&SHIFT_FAMILY)
    } else {
        None
    }
}
