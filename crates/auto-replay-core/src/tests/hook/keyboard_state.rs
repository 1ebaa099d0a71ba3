use crate::{
    hook::{HookFlags, KeyboardState},
    keys::{
        RawKeyCode,
        translator::{VK_CONTROL, VK_RCONTROL, VK_RMENU},
    },
};

/// WHAT: Either side of a modifier satisfies the generic query
/// WHY: Hotkeys do not distinguish left and right modifiers
#[test]
fn given_right_modifier_down_when_querying_then_generic_modifier_down() {
    // Given
    let state = KeyboardState::new();

    // When
    state.set(RawKeyCode(VK_RCONTROL), true);
    state.set(RawKeyCode(VK_RMENU), true);

    // Then
    assert!(state.ctrl());
    assert!(state.alt());
    assert!(!state.shift());
    assert!(state.is_down(RawKeyCode(VK_CONTROL)));
    assert!(!state.all_released(&[RawKeyCode(VK_CONTROL)]));

    state.reset();
    assert!(state.all_released(&[RawKeyCode(VK_CONTROL), RawKeyCode(VK_RMENU)]));
}

/// WHAT: Out-of-range codes are ignored
/// WHY: The hook thread must never panic on odd input
#[test]
fn given_code_above_table_when_setting_then_ignored() {
    // Given
    let state = KeyboardState::new();

    // When
    state.set(RawKeyCode(0x1FF), true);

    // Then
    assert!(!state.is_down(RawKeyCode(0x1FF)));
}

/// WHAT: Toggling profile keys flips and reports the new value
/// WHY: The session notifies with the value the hook now sees
#[test]
fn given_flags_when_toggling_profile_keys_then_new_value_returned() {
    // Given
    let flags = HookFlags::new(true);

    // When/Then
    assert!(!flags.toggle_profile_keys());
    assert!(!flags.profile_keys_enabled());
    assert!(flags.toggle_profile_keys());
}
