use crate::{
    CoreError,
    keys::{
        RawKeyCode, key_stroke, normalize, resolve,
        translator::{VK_LCONTROL, VK_RCONTROL, VK_RMENU, VK_RSHIFT, known_codes},
    },
};

/// WHAT: Every table code survives normalize then resolve
/// WHY: Recorded names must map back to the same physical key at replay time
#[test]
#[allow(clippy::unwrap_used)]
fn given_table_codes_when_round_tripping_then_names_are_stable() {
    // Given: Every code with an explicit table entry
    let codes: Vec<RawKeyCode> = known_codes().collect();
    assert!(codes.len() > 90);

    for code in codes {
        // When: Normalizing and resolving back
        let name = normalize(code);
        let resolved = resolve(&name).unwrap();

        // Then: The resolved code normalizes to the same name
        assert_eq!(normalize(resolved), name, "code {}", code);
    }
}

/// WHAT: Left and right modifier variants collapse to one name
/// WHY: Hotkey strings and recorded actions use side-less modifier names
#[test]
fn given_modifier_variants_when_normalizing_then_sides_collapse() {
    // Given/When/Then: Each side and the generic code share a name
    assert_eq!(normalize(RawKeyCode(VK_LCONTROL)), "Ctrl");
    assert_eq!(normalize(RawKeyCode(VK_RCONTROL)), "Ctrl");
    assert_eq!(normalize(RawKeyCode(0x11)), "Ctrl");
    assert_eq!(normalize(RawKeyCode(VK_RMENU)), "Alt");
    assert_eq!(normalize(RawKeyCode(VK_RSHIFT)), "Shift");
}

/// WHAT: Codes outside the table get a non-empty fallback that resolves
/// WHY: Recording must never lose an event because a key is unnamed
#[test]
#[allow(clippy::unwrap_used)]
fn given_unmapped_code_when_normalizing_then_fallback_name_round_trips() {
    // Given: A code with no table entry (VK_F24)
    let code = RawKeyCode(0x87);

    // When: Normalizing
    let name = normalize(code);

    // Then: Fallback is non-empty and parses back
    assert_eq!(name, "VK_135");
    assert_eq!(resolve(&name).unwrap(), code);
}

/// WHAT: Unknown names fail with UnknownKey
/// WHY: Replay skips such actions instead of crashing
#[test]
fn given_unknown_name_when_resolving_then_unknown_key_error() {
    // Given: Names that are not keys
    for name in ["NotAKey", "", "VK_", "VK_abc"] {
        // When: Resolving
        let result = resolve(name);

        // Then: UnknownKey error
        assert!(matches!(result, Err(CoreError::UnknownKey { .. })), "{name:?}");
    }
}

/// WHAT: Resolution is case-insensitive and accepts aliases
/// WHY: Hand-edited profiles use varied spellings
#[test]
#[allow(clippy::unwrap_used)]
fn given_alias_or_other_case_when_resolving_then_same_code() {
    // Given/When/Then
    assert_eq!(resolve("f9").unwrap(), resolve("F9").unwrap());
    assert_eq!(resolve("esc").unwrap(), resolve("Escape").unwrap());
    assert_eq!(resolve("Return").unwrap(), resolve("Enter").unwrap());
    assert_eq!(normalize(resolve("RightCtrl").unwrap()), "Ctrl");
}

/// WHAT: Arrow keys carry the extended flag and letters carry scan codes
/// WHY: Without the flag arrows arrive as numpad keys
#[test]
#[allow(clippy::unwrap_used)]
fn given_key_names_when_building_strokes_then_scan_and_extended_are_set() {
    // Given/When: Strokes for an arrow, a letter and a numpad digit
    let left = key_stroke("Left").unwrap();
    let a = key_stroke("A").unwrap();
    let num4 = key_stroke("Num4").unwrap();

    // Then: Only the arrow is extended; arrow and Num4 share a scan code
    assert!(left.extended);
    assert!(!a.extended);
    assert!(!num4.extended);
    assert_eq!(a.scan, 0x1E);
    assert_eq!(left.scan, num4.scan);
}
