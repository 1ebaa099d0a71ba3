//! Bidirectional mapping between raw key codes and canonical key names.
//!
//! Raw codes use the Windows virtual-key numbering on every platform; OS
//! glue maps its native key identifiers into this space before calling
//! [`normalize`]. Both directions are pure lookups and safe to call from the
//! hook thread.

use crate::{CoreError, CoreResult};

use std::{borrow::Cow, fmt, panic::Location};

use error_location::ErrorLocation;

/// A raw virtual-key code as delivered by the input hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawKeyCode(pub u16);

impl fmt::Display for RawKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Generic Shift.
pub const VK_SHIFT: u16 = 0x10;
/// Generic Ctrl.
pub const VK_CONTROL: u16 = 0x11;
/// Generic Alt.
pub const VK_MENU: u16 = 0x12;
/// Escape.
pub const VK_ESCAPE: u16 = 0x1B;
/// Left Shift.
pub const VK_LSHIFT: u16 = 0xA0;
/// Right Shift.
pub const VK_RSHIFT: u16 = 0xA1;
/// Left Ctrl.
pub const VK_LCONTROL: u16 = 0xA2;
/// Right Ctrl.
pub const VK_RCONTROL: u16 = 0xA3;
/// Left Alt.
pub const VK_LMENU: u16 = 0xA4;
/// Right Alt (AltGr on many layouts).
pub const VK_RMENU: u16 = 0xA5;

/// Prefix of the fallback name given to codes outside the table.
const FALLBACK_PREFIX: &str = "VK_";

/// Canonical name for every code in the table. One preferred code per name;
/// left/right modifier variants are collapsed in [`normalize`].
const KEY_NAMES: &[(u16, &str)] = &[
    (VK_LSHIFT, "Shift"),
    (VK_LCONTROL, "Ctrl"),
    (VK_LMENU, "Alt"),
    (0x70, "F1"),
    (0x71, "F2"),
    (0x72, "F3"),
    (0x73, "F4"),
    (0x74, "F5"),
    (0x75, "F6"),
    (0x76, "F7"),
    (0x77, "F8"),
    (0x78, "F9"),
    (0x79, "F10"),
    (0x7A, "F11"),
    (0x7B, "F12"),
    (0x30, "0"),
    (0x31, "1"),
    (0x32, "2"),
    (0x33, "3"),
    (0x34, "4"),
    (0x35, "5"),
    (0x36, "6"),
    (0x37, "7"),
    (0x38, "8"),
    (0x39, "9"),
    (0x41, "A"),
    (0x42, "B"),
    (0x43, "C"),
    (0x44, "D"),
    (0x45, "E"),
    (0x46, "F"),
    (0x47, "G"),
    (0x48, "H"),
    (0x49, "I"),
    (0x4A, "J"),
    (0x4B, "K"),
    (0x4C, "L"),
    (0x4D, "M"),
    (0x4E, "N"),
    (0x4F, "O"),
    (0x50, "P"),
    (0x51, "Q"),
    (0x52, "R"),
    (0x53, "S"),
    (0x54, "T"),
    (0x55, "U"),
    (0x56, "V"),
    (0x57, "W"),
    (0x58, "X"),
    (0x59, "Y"),
    (0x5A, "Z"),
    (0x60, "Num0"),
    (0x61, "Num1"),
    (0x62, "Num2"),
    (0x63, "Num3"),
    (0x64, "Num4"),
    (0x65, "Num5"),
    (0x66, "Num6"),
    (0x67, "Num7"),
    (0x68, "Num8"),
    (0x69, "Num9"),
    (0x6A, "NumMultiply"),
    (0x6B, "NumAdd"),
    (0x6D, "NumSubtract"),
    (0x6E, "NumDecimal"),
    (0x6F, "NumDivide"),
    (0xC0, "`"),
    (0xBD, "-"),
    (0xBB, "="),
    (0xDB, "["),
    (0xDD, "]"),
    (0xDC, "\\"),
    (0xBA, ";"),
    (0xDE, "'"),
    (0xBC, ","),
    (0xBE, "."),
    (0xBF, "/"),
    (0x14, "CapsLock"),
    (0x90, "NumLock"),
    (0x91, "ScrollLock"),
    (0x21, "PageUp"),
    (0x22, "PageDown"),
    (0x24, "Home"),
    (0x23, "End"),
    (0x2D, "Insert"),
    (0x2E, "Delete"),
    (0x09, "Tab"),
    (0x13, "Pause"),
    (0x2C, "PrintScreen"),
    (0x25, "Left"),
    (0x26, "Up"),
    (0x27, "Right"),
    (0x28, "Down"),
    (VK_ESCAPE, "Escape"),
    (0x08, "Backspace"),
    (0x0D, "Enter"),
    (0x20, "Space"),
    (0x5B, "Win"),
];

/// Extra spellings accepted by [`resolve`].
const ALIASES: &[(&str, u16)] = &[
    ("Esc", VK_ESCAPE),
    ("Return", 0x0D),
    ("Control", VK_LCONTROL),
    ("LeftCtrl", VK_LCONTROL),
    ("RightCtrl", VK_RCONTROL),
    ("LeftAlt", VK_LMENU),
    ("RightAlt", VK_RMENU),
    ("LeftShift", VK_LSHIFT),
    ("RightShift", VK_RSHIFT),
];

/// Map a raw code to its canonical key name.
///
/// Left/right modifier variants collapse to `Ctrl`, `Alt` and `Shift`.
/// Codes outside the table get the non-empty fallback `VK_<code>`; this
/// never fails.
pub fn normalize(code: RawKeyCode) -> Cow<'static, str> {
    let collapsed = match code.0 {
        VK_SHIFT | VK_LSHIFT | VK_RSHIFT => VK_LSHIFT,
        VK_CONTROL | VK_LCONTROL | VK_RCONTROL => VK_LCONTROL,
        VK_MENU | VK_LMENU | VK_RMENU => VK_LMENU,
        other => other,
    };

    KEY_NAMES
        .iter()
        .find(|(c, _)| *c == collapsed)
        .map(|(_, name)| Cow::Borrowed(*name))
        .unwrap_or_else(|| Cow::Owned(format!("{FALLBACK_PREFIX}{}", code.0)))
}

/// Map a key name back to a raw code.
///
/// Matching is case-insensitive. Falls back to parsing the `VK_<code>`
/// form produced by [`normalize`] for codes outside the table.
#[track_caller]
pub fn resolve(name: &str) -> CoreResult<RawKeyCode> {
    KEY_NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, code)| *code)
        })
        .or_else(|| parse_fallback(name))
        .map(RawKeyCode)
        .ok_or_else(|| CoreError::UnknownKey {
            name: name.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Whether `code` has an explicit entry (as opposed to the fallback name).
pub fn is_known(code: RawKeyCode) -> bool {
    !normalize(code).starts_with(FALLBACK_PREFIX)
}

/// Every code with an explicit table entry, including modifier variants.
pub fn known_codes() -> impl Iterator<Item = RawKeyCode> {
    (0..=u8::MAX)
        .map(|c| RawKeyCode(u16::from(c)))
        .filter(|c| is_known(*c))
}

fn parse_fallback(name: &str) -> Option<u16> {
    let prefix = name.get(..FALLBACK_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(FALLBACK_PREFIX) {
        return None;
    }
    name[FALLBACK_PREFIX.len()..].parse::<u16>().ok()
}

/// Everything a synthesizer needs to emit one key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    /// Virtual-key code.
    pub code: RawKeyCode,
    /// Set-1 hardware scan code (0 when the key has none).
    pub scan: u16,
    /// Whether the extended-key flag must be set.
    pub extended: bool,
}

impl KeyStroke {
    /// Canonical name of the stroke's key.
    pub fn name(&self) -> Cow<'static, str> {
        normalize(self.code)
    }
}

/// Resolve a key name into a [`KeyStroke`] for scan-code synthesis.
///
/// Arrow keys carry the extended flag so they are not delivered as numpad
/// keys.
#[track_caller]
pub fn key_stroke(name: &str) -> CoreResult<KeyStroke> {
    let code = resolve(name)?;
    Ok(KeyStroke {
        code,
        scan: scan_code(code),
        extended: matches!(code.0, 0x25..=0x28),
    })
}

/// Set-1 scan code for a virtual key, as `MapVirtualKey(vk, 0)` reports it
/// on a US layout.
fn scan_code(code: RawKeyCode) -> u16 {
    match code.0 {
        VK_ESCAPE => 0x01,
        0x31..=0x39 => code.0 - 0x31 + 0x02,
        0x30 => 0x0B,
        0xBD => 0x0C,
        0xBB => 0x0D,
        0x08 => 0x0E,
        0x09 => 0x0F,
        0x51 => 0x10,
        0x57 => 0x11,
        0x45 => 0x12,
        0x52 => 0x13,
        0x54 => 0x14,
        0x59 => 0x15,
        0x55 => 0x16,
        0x49 => 0x17,
        0x4F => 0x18,
        0x50 => 0x19,
        0xDB => 0x1A,
        0xDD => 0x1B,
        0x0D => 0x1C,
        VK_CONTROL | VK_LCONTROL | VK_RCONTROL => 0x1D,
        0x41 => 0x1E,
        0x53 => 0x1F,
        0x44 => 0x20,
        0x46 => 0x21,
        0x47 => 0x22,
        0x48 => 0x23,
        0x4A => 0x24,
        0x4B => 0x25,
        0x4C => 0x26,
        0xBA => 0x27,
        0xDE => 0x28,
        0xC0 => 0x29,
        VK_SHIFT | VK_LSHIFT => 0x2A,
        0xDC => 0x2B,
        0x5A => 0x2C,
        0x58 => 0x2D,
        0x43 => 0x2E,
        0x56 => 0x2F,
        0x42 => 0x30,
        0x4E => 0x31,
        0x4D => 0x32,
        0xBC => 0x33,
        0xBE => 0x34,
        0xBF | 0x6F => 0x35,
        VK_RSHIFT => 0x36,
        0x6A | 0x2C => 0x37,
        VK_MENU | VK_LMENU | VK_RMENU => 0x38,
        0x20 => 0x39,
        0x14 => 0x3A,
        0x70..=0x79 => code.0 - 0x70 + 0x3B,
        0x90 | 0x13 => 0x45,
        0x91 => 0x46,
        0x67 | 0x24 => 0x47,
        0x68 | 0x26 => 0x48,
        0x69 | 0x21 => 0x49,
        0x6D => 0x4A,
        0x64 | 0x25 => 0x4B,
        0x65 => 0x4C,
        0x66 | 0x27 => 0x4D,
        0x6B => 0x4E,
        0x61 | 0x23 => 0x4F,
        0x62 | 0x28 => 0x50,
        0x63 | 0x22 => 0x51,
        0x60 | 0x2D => 0x52,
        0x6E | 0x2E => 0x53,
        0x7A => 0x57,
        0x7B => 0x58,
        0x5B => 0x5B,
        _ => 0,
    }
}
