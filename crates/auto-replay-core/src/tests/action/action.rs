use crate::action::{Action, ActionType, MouseButton};

/// WHAT: Negative millisecond inputs are clamped to zero
/// WHY: A delay is never negative, even after clock skew
#[test]
fn given_negative_delay_when_building_action_then_delay_is_zero() {
    // Given/When
    let key = Action::key("A", true, -50);
    let click = Action::mouse(ActionType::LeftClickDown, 10, 20, -1);

    // Then
    assert_eq!(key.delay, 0);
    assert_eq!(click.delay, 0);
    assert_eq!((click.x, click.y), (10, 20));
}

/// WHAT: Bad delay values in JSON load as zero instead of failing
/// WHY: Malformed action data must never crash loading
#[test]
#[allow(clippy::unwrap_used)]
fn given_garbage_delays_when_deserializing_then_clamped_to_zero() {
    // Given: Negative, string, null and fractional delays
    let cases = [
        (r#"{"actionType":"KeyDown","key":"A","delay":-50}"#, 0),
        (r#"{"actionType":"KeyDown","key":"A","delay":"soon"}"#, 0),
        (r#"{"actionType":"KeyDown","key":"A","delay":null}"#, 0),
        (r#"{"actionType":"KeyDown","key":"A","delay":12.7}"#, 12),
        (r#"{"actionType":"KeyDown","key":"A"}"#, 0),
    ];

    for (json, expected) in cases {
        // When
        let action: Action = serde_json::from_str(json).unwrap();

        // Then
        assert_eq!(action.delay, expected, "{json}");
    }
}

/// WHAT: Serialized actions use camelCase and omit transient markers
/// WHY: The persisted shape is shared with the profile layer
#[test]
#[allow(clippy::unwrap_used)]
fn given_marked_action_when_serializing_then_markers_not_persisted() {
    // Given: An action flagged as the insertion point
    let mut action = Action::key("Ctrl", false, 40).with_comment("release");
    action.is_insertion_point = true;

    // When
    let json = serde_json::to_value(&action).unwrap();

    // Then
    assert_eq!(json["actionType"], "KeyUp");
    assert_eq!(json["key"], "Ctrl");
    assert_eq!(json["delay"], 40);
    assert_eq!(json["comment"], "release");
    assert!(json.get("isInsertionPoint").is_none());
    assert!(json.get("is_insertion_point").is_none());
}

/// WHAT: Highlight requires the insertion flag without deselection
/// WHY: Escape hides the marker without forgetting it
#[test]
fn given_marker_flags_when_checking_highlight_then_deselection_hides_it() {
    // Given
    let mut action = Action::new(ActionType::ScrollUp, 0);

    // When/Then
    assert!(!action.should_highlight());
    action.is_insertion_point = true;
    assert!(action.should_highlight());
    action.is_visually_deselected = true;
    assert!(!action.should_highlight());
}

/// WHAT: Button and scroll helpers map to the right action types
/// WHY: Recorder and replayer share these mappings
#[test]
fn given_buttons_and_deltas_when_mapping_then_types_match() {
    // Given/When/Then
    for button in MouseButton::ALL {
        for pressed in [true, false] {
            let action_type = ActionType::for_button(button, pressed);
            assert_eq!(action_type.button(), Some((button, pressed)));
            assert!(action_type.is_mouse());
        }
    }
    assert_eq!(ActionType::for_scroll(120), Some(ActionType::ScrollUp));
    assert_eq!(ActionType::for_scroll(-1), Some(ActionType::ScrollDown));
    assert_eq!(ActionType::for_scroll(0), None);
    assert!(ActionType::for_key(true).is_key());
}
