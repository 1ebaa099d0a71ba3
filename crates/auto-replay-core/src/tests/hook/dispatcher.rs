use crate::{
    action::MouseButton,
    hook::{
        HookDispatcher, HookFlags, HookVerdict, InputEvent, KeyboardState, MouseEventKind,
        RawKeyEvent, RawMouseEvent,
    },
    keys::{
        HotkeyBindings, HotkeyMatch, HotkeyMatcher, HotkeyRole, RawKeyCode,
        translator::{VK_LCONTROL, VK_LSHIFT, VK_RMENU},
    },
};

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::mpsc;

const VK_F9: u16 = 0x78;
const VK_K: u16 = 0x4B;
const VK_A: u16 = 0x41;
const VK_1: u16 = 0x31;

fn dispatcher() -> (HookDispatcher, Arc<HookFlags>, Arc<HotkeyMatcher>) {
    let flags = Arc::new(HookFlags::new(true));
    let matcher = Arc::new(HotkeyMatcher::new(HotkeyBindings::default()));
    let dispatcher = HookDispatcher::new(
        Arc::clone(&flags),
        Arc::new(KeyboardState::new()),
        Arc::clone(&matcher),
    );
    (dispatcher, flags, matcher)
}

fn raw(code: u16, pressed: bool, at: Instant) -> RawKeyEvent {
    RawKeyEvent {
        code: RawKeyCode(code),
        pressed,
        at,
    }
}

fn drain(rx: &mut mpsc::Receiver<InputEvent>) -> Vec<InputEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// WHAT: A role hotkey is suppressed and published only as a hotkey event
/// WHY: The consumed key must not reach other apps or the recorder
#[test]
fn given_role_hotkey_when_pressed_then_suppressed_and_hotkey_published() {
    // Given
    let (dispatcher, _, _) = dispatcher();
    let mut rx = dispatcher.subscribe(16);
    let t0 = Instant::now();

    // When: F9 down, then up 100ms later
    let down = dispatcher.on_keyboard(raw(VK_F9, true, t0));
    let up = dispatcher.on_keyboard(raw(VK_F9, false, t0 + Duration::from_millis(100)));

    // Then: Down suppressed, only the hotkey event published
    assert_eq!(down, HookVerdict::Suppress);
    assert_eq!(up, HookVerdict::Pass);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        InputEvent::Hotkey(h) if h.hotkey == HotkeyMatch::Role(HotkeyRole::Recording)
            && h.composed == "F9"
    ));
}

/// WHAT: A hotkey key-up after the window is published normally
/// WHY: Only the key-up belonging to the consumed press is hidden
#[test]
fn given_late_hotkey_keyup_when_released_then_key_event_published() {
    // Given
    let (dispatcher, _, _) = dispatcher();
    let mut rx = dispatcher.subscribe(16);
    let t0 = Instant::now();
    dispatcher.on_keyboard(raw(VK_F9, true, t0));

    // When: Released after 400ms
    dispatcher.on_keyboard(raw(VK_F9, false, t0 + Duration::from_millis(400)));

    // Then
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[1], InputEvent::Key(k) if !k.pressed && k.name == "F9"));
}

/// WHAT: Modifier state from earlier events composes the hotkey
/// WHY: Ctrl+Shift+K must match the profile-toggle role
#[test]
fn given_held_modifiers_when_main_key_pressed_then_composed_hotkey_matches() {
    // Given: Ctrl and Shift held
    let (dispatcher, _, _) = dispatcher();
    let mut rx = dispatcher.subscribe(16);
    let t0 = Instant::now();
    dispatcher.on_keyboard(raw(VK_LCONTROL, true, t0));
    dispatcher.on_keyboard(raw(VK_LSHIFT, true, t0));

    // When
    let verdict = dispatcher.on_keyboard(raw(VK_K, true, t0));

    // Then: Two modifier key events, then the hotkey
    assert_eq!(verdict, HookVerdict::Suppress);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[2],
        InputEvent::Hotkey(h) if h.hotkey == HotkeyMatch::Role(HotkeyRole::ProfileToggle)
            && h.composed == "Ctrl+Shift+K"
    ));
}

/// WHAT: Ctrl-Left right after Alt-Right is dropped, down and up
/// WHY: AltGr layouts inject a fake Ctrl that would be recorded
#[test]
fn given_altgr_sequence_when_ctrl_left_follows_then_not_published() {
    // Given
    let (dispatcher, _, _) = dispatcher();
    let mut rx = dispatcher.subscribe(16);
    let t0 = Instant::now();

    // When: Alt-Right down, Ctrl-Left 20ms later, both released
    dispatcher.on_keyboard(raw(VK_RMENU, true, t0));
    let ctrl = dispatcher.on_keyboard(raw(VK_LCONTROL, true, t0 + Duration::from_millis(20)));
    dispatcher.on_keyboard(raw(VK_LCONTROL, false, t0 + Duration::from_millis(60)));
    dispatcher.on_keyboard(raw(VK_RMENU, false, t0 + Duration::from_millis(60)));

    // Then: Only the Alt down/up are published; Ctrl passes to the OS
    assert_eq!(ctrl, HookVerdict::Pass);
    let names: Vec<(String, bool)> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            InputEvent::Key(k) => Some((k.name.into_owned(), k.pressed)),
            _ => None,
        })
        .collect();
    assert_eq!(
        names,
        vec![("Alt".to_string(), true), ("Alt".to_string(), false)]
    );
}

/// WHAT: Ctrl-Left outside the AltGr window is published
/// WHY: Real Ctrl presses after Alt must still be recorded
#[test]
fn given_ctrl_left_after_window_when_pressed_then_published() {
    // Given
    let (dispatcher, _, _) = dispatcher();
    let mut rx = dispatcher.subscribe(16);
    let t0 = Instant::now();
    dispatcher.on_keyboard(raw(VK_RMENU, true, t0));

    // When
    dispatcher.on_keyboard(raw(VK_LCONTROL, true, t0 + Duration::from_millis(150)));

    // Then
    assert_eq!(drain(&mut rx).len(), 2);
}

/// WHAT: With ignore-hotkeys set nothing is published or suppressed
/// WHY: Typing into a text field must not trigger or record anything
#[test]
fn given_ignore_hotkeys_when_hotkey_pressed_then_passed_through() {
    // Given
    let (dispatcher, flags, _) = dispatcher();
    let mut rx = dispatcher.subscribe(16);
    flags.set_ignore_hotkeys(true);

    // When
    let verdict = dispatcher.on_keyboard(raw(VK_F9, true, Instant::now()));

    // Then
    assert_eq!(verdict, HookVerdict::Pass);
    assert!(drain(&mut rx).is_empty());
}

/// WHAT: Synthetic echo never matches hotkeys and is tagged
/// WHY: A replayed F9 must not toggle recording
#[test]
fn given_synthetic_echo_when_hotkey_key_arrives_then_key_event_tagged() {
    // Given
    let (dispatcher, flags, _) = dispatcher();
    let mut rx = dispatcher.subscribe(16);
    flags.set_synthetic_echo(true);

    // When
    let verdict = dispatcher.on_keyboard(raw(VK_F9, true, Instant::now()));

    // Then
    assert_eq!(verdict, HookVerdict::Pass);
    let events = drain(&mut rx);
    assert!(matches!(&events[..], [InputEvent::Key(k)] if k.synthetic));
}

/// WHAT: Profile hotkeys are consumed only when enabled and not recording
/// WHY: Switching profiles mid-session would corrupt the recording
#[test]
fn given_profile_hotkey_when_gated_then_consumed_only_when_allowed() {
    // Given: Ctrl+1 bound to a profile, Ctrl held
    let (dispatcher, flags, matcher) = dispatcher();
    matcher.register_profile_hotkeys(HashMap::from([("farm".to_string(), "Ctrl+1".to_string())]));
    let t0 = Instant::now();
    dispatcher.on_keyboard(raw(VK_LCONTROL, true, t0));

    // When/Then: Disabled
    flags.set_profile_keys_enabled(false);
    assert_eq!(dispatcher.on_keyboard(raw(VK_1, true, t0)), HookVerdict::Pass);

    // When/Then: Enabled but recording
    flags.set_profile_keys_enabled(true);
    flags.set_recording(true);
    assert_eq!(dispatcher.on_keyboard(raw(VK_1, true, t0)), HookVerdict::Pass);

    // When/Then: Enabled and idle
    flags.set_recording(false);
    assert_eq!(
        dispatcher.on_keyboard(raw(VK_1, true, t0)),
        HookVerdict::Suppress
    );
}

/// WHAT: A full subscriber drops events without affecting others; closed
/// subscribers are removed
/// WHY: One slow consumer must never break hook delivery
#[test]
fn given_full_and_closed_subscribers_when_publishing_then_others_unaffected() {
    // Given
    let (dispatcher, _, _) = dispatcher();
    let mut small = dispatcher.subscribe(1);
    let mut large = dispatcher.subscribe(16);
    let closed = dispatcher.subscribe(16);
    drop(closed);
    let t0 = Instant::now();

    // When: Three ordinary key events
    for pressed in [true, false, true] {
        dispatcher.on_keyboard(raw(VK_A, pressed, t0));
    }

    // Then
    assert_eq!(drain(&mut small).len(), 1);
    assert_eq!(drain(&mut large).len(), 3);
    assert_eq!(dispatcher.subscriber_count(), 2);
}

/// WHAT: Mouse moves are not published; buttons and wheel are
/// WHY: Only clicks and scroll notches become actions
#[test]
fn given_mouse_events_when_dispatched_then_moves_filtered() {
    // Given
    let (dispatcher, _, _) = dispatcher();
    let mut rx = dispatcher.subscribe(16);
    let at = Instant::now();
    let event = |kind| RawMouseEvent { kind, x: 3, y: 4, at };

    // When
    dispatcher.on_mouse(event(MouseEventKind::Move));
    dispatcher.on_mouse(event(MouseEventKind::Button {
        button: MouseButton::Right,
        pressed: true,
    }));
    dispatcher.on_mouse(event(MouseEventKind::Wheel { delta: -120 }));

    // Then
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], InputEvent::Mouse(m) if m.x == 3 && m.y == 4));
}
