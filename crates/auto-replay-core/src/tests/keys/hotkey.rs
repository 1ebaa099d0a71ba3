use crate::{
    CoreError,
    keys::{HotkeyBindings, HotkeyMatch, HotkeyMatcher, HotkeyRole, compose, is_valid},
};

use std::collections::HashMap;

/// WHAT: Modifiers come out in Ctrl, Alt, Shift order before the main key
/// WHY: Matching is exact-string, so composition order must be fixed
#[test]
fn given_modifiers_when_composing_then_fixed_order() {
    // Given/When/Then
    assert_eq!(compose("K", true, false, true), "Ctrl+Shift+K");
    assert_eq!(compose("F", true, true, false), "Ctrl+Alt+F");
    assert_eq!(compose("F9", false, false, false), "F9");
}

/// WHAT: A modifier main key is omitted from the composed string
/// WHY: Live preview shows held modifiers without duplicating them
#[test]
fn given_modifier_main_key_when_composing_then_modifiers_only() {
    // Given/When
    let composed = compose("Shift", true, false, true);

    // Then: Preview only, never a valid binding
    assert_eq!(composed, "Ctrl+Shift");
    assert!(!is_valid(&composed));
}

/// WHAT: Validity requires one non-modifier key
/// WHY: Modifier-only bindings would fire on every Ctrl press
#[test]
fn given_hotkey_strings_when_validating_then_modifier_only_rejected() {
    // Given/When/Then
    assert!(!is_valid("Ctrl+Shift"));
    assert!(!is_valid(""));
    assert!(!is_valid("   "));
    assert!(is_valid("Ctrl+Shift+K"));
    assert!(is_valid("F10"));
}

/// WHAT: Out-of-order, repeated and multi-key strings are rejected
/// WHY: Composed strings always follow Ctrl, Alt, Shift then one key, so
/// anything else would be stored but never fire
#[test]
fn given_malformed_hotkey_strings_when_validating_then_rejected() {
    // Given/When/Then
    assert!(!is_valid("Shift+Ctrl+K"));
    assert!(!is_valid("Alt+Ctrl+K"));
    assert!(!is_valid("A+B"));
    assert!(!is_valid("Ctrl+Ctrl+K"));
    assert!(!is_valid("Ctrl++K"));
    assert!(!is_valid("Ctrl+K+"));
    assert!(!is_valid("Ctrl + K"));
    assert!(is_valid("ctrl+alt+shift+k"));
    assert!(is_valid("Alt+G"));
}

/// WHAT: A role cannot be rebound to an out-of-order hotkey
/// WHY: The binding would be dead while the old one is lost
#[test]
fn given_out_of_order_hotkey_when_setting_role_then_error_and_binding_kept() {
    // Given
    let matcher = HotkeyMatcher::new(HotkeyBindings::default());

    // When
    let result = matcher.set_role(HotkeyRole::Recording, "Shift+Ctrl+K");

    // Then
    assert!(matches!(result, Err(CoreError::InvalidHotkey { .. })));
    assert_eq!(matcher.roles().recording, "F9");
    assert_eq!(
        matcher.match_hotkey(&compose("K", true, false, true)),
        Some(HotkeyMatch::Role(HotkeyRole::ProfileToggle))
    );
}

/// WHAT: Matching ignores case and prefers roles over profiles
/// WHY: A profile must never shadow a built-in role
#[test]
fn given_role_and_profile_on_same_key_when_matching_then_role_wins() {
    // Given: A profile bound to the recording hotkey and one to Ctrl+1
    let matcher = HotkeyMatcher::new(HotkeyBindings::default());
    matcher.register_profile_hotkeys(HashMap::from([
        ("shadow".to_string(), "F9".to_string()),
        ("farm".to_string(), "Ctrl+1".to_string()),
    ]));

    // When/Then
    assert_eq!(
        matcher.match_hotkey("f9"),
        Some(HotkeyMatch::Role(HotkeyRole::Recording))
    );
    assert_eq!(
        matcher.match_hotkey("CTRL+1"),
        Some(HotkeyMatch::Profile("farm".to_string()))
    );
    assert_eq!(matcher.match_hotkey("Ctrl+2"), None);
    assert_eq!(matcher.match_hotkey(""), None);
}

/// WHAT: Invalid profile hotkeys are dropped on registration
/// WHY: Registering a bad binding is a no-op, not a crash
#[test]
fn given_invalid_profile_hotkey_when_registering_then_entry_dropped() {
    // Given
    let matcher = HotkeyMatcher::default();

    // When
    matcher.register_profile_hotkeys(HashMap::from([
        ("bad".to_string(), "Ctrl+Alt".to_string()),
        ("good".to_string(), "Alt+G".to_string()),
    ]));

    // Then
    let registered = matcher.profile_hotkeys();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered.get("good").map(String::as_str), Some("Alt+G"));
}

/// WHAT: Rebinding a role to an invalid hotkey keeps the old binding
/// WHY: Rejected assignments must leave state untouched
#[test]
fn given_invalid_hotkey_when_setting_role_then_error_and_binding_kept() {
    // Given
    let matcher = HotkeyMatcher::new(HotkeyBindings::default());

    // When
    let result = matcher.set_role(HotkeyRole::Replay, "Shift");

    // Then
    assert!(matches!(result, Err(CoreError::InvalidHotkey { .. })));
    assert_eq!(matcher.roles().replay, "F10");
}

/// WHAT: Collision lookup reports the owner but skips the ignored binding
/// WHY: Re-assigning a binding its own hotkey is not a collision
#[test]
fn given_bound_hotkeys_when_finding_collision_then_owner_reported() {
    // Given
    let matcher = HotkeyMatcher::new(HotkeyBindings::default());
    matcher.register_profile_hotkeys(HashMap::from([("farm".to_string(), "Ctrl+1".to_string())]));
    let replay = HotkeyMatch::Role(HotkeyRole::Replay);

    // When/Then
    assert_eq!(matcher.find_collision("F10", None), Some(replay.clone()));
    assert_eq!(matcher.find_collision("F10", Some(&replay)), None);
    assert_eq!(
        matcher.find_collision("ctrl+1", None),
        Some(HotkeyMatch::Profile("farm".to_string()))
    );
    assert_eq!(matcher.find_collision("Ctrl+9", None), None);
}

/// WHAT: Profile matches display with the PROFILE:: prefix
/// WHY: Logs and notifications use the same string form as hotkey events
#[test]
fn given_profile_match_when_displaying_then_prefixed() {
    // Given/When/Then
    assert_eq!(
        HotkeyMatch::Profile("farm".to_string()).to_string(),
        "PROFILE::farm"
    );
}
