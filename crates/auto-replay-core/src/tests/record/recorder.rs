use crate::{
    action::{Action, ActionList, ActionType, MouseButton},
    hook::MouseEventKind,
    record::{ActionRecorder, DelayMode, RecordOptions},
    tests::support::{key, mouse},
};

use std::time::{Duration, Instant};

const VK_A: u16 = 0x41;
const VK_B: u16 = 0x42;

fn measured() -> RecordOptions {
    RecordOptions {
        delay: DelayMode::Measured,
        ..RecordOptions::default()
    }
}

fn recording(options: RecordOptions) -> ActionRecorder {
    let mut recorder = ActionRecorder::new(options);
    recorder.start();
    recorder
}

/// WHAT: Auto-repeat key-downs yield one KeyDown and one KeyUp
/// WHY: Holding a key must not flood the list with repeats
#[test]
fn given_auto_repeat_when_recording_then_single_down_and_up() {
    // Given
    let mut recorder = recording(RecordOptions::default());
    let mut list = ActionList::new();
    let t0 = Instant::now();

    // When: Down, three repeats, up
    for i in 0..4 {
        recorder.on_key_event(&mut list, &key(VK_A, true, t0 + Duration::from_millis(i * 30)));
    }
    recorder.on_key_event(&mut list, &key(VK_A, false, t0 + Duration::from_millis(200)));

    // Then
    let types: Vec<ActionType> = list.iter().map(|a| a.action_type).collect();
    assert_eq!(types, vec![ActionType::KeyDown, ActionType::KeyUp]);
    assert!(list.iter().all(|a| a.key.as_deref() == Some("A")));
}

/// WHAT: A key-up without a recorded down is still recorded
/// WHY: The down may have happened before recording started
#[test]
fn given_key_held_before_start_when_released_then_key_up_recorded() {
    // Given
    let mut recorder = recording(RecordOptions::default());
    let mut list = ActionList::new();

    // When
    let index = recorder.on_key_event(&mut list, &key(VK_B, false, Instant::now()));

    // Then
    assert_eq!(index, Some(0));
    assert_eq!(list[0].action_type, ActionType::KeyUp);
}

/// WHAT: Insert index 2 on five actions places two new ones at 2 and 3
/// WHY: Consecutive inserted actions stay contiguous and ordered
#[test]
fn given_insert_index_when_recording_two_actions_then_contiguous_insert() {
    // Given: Five existing actions and insert index 2
    let mut list: ActionList = (0..5).map(|_| Action::new(ActionType::ScrollUp, 0)).collect();
    let mut recorder = ActionRecorder::new(RecordOptions::default());
    assert_eq!(recorder.set_insert_index(Some(2), &mut list), Some(2));
    recorder.start();
    let t0 = Instant::now();

    // When
    recorder.on_key_event(&mut list, &key(VK_A, true, t0));
    recorder.on_key_event(&mut list, &key(VK_A, false, t0));

    // Then
    assert_eq!(list.len(), 7);
    assert_eq!(list[2].action_type, ActionType::KeyDown);
    assert_eq!(list[3].action_type, ActionType::KeyUp);
    assert_eq!(recorder.insert_index(), Some(4));
    assert!(list[4].should_highlight());
}

/// WHAT: Out-of-range insert indexes fall back to append
/// WHY: A stale UI selection must not corrupt the list
#[test]
fn given_out_of_range_insert_index_when_setting_then_append_mode() {
    // Given
    let mut list: ActionList = (0..5).map(|_| Action::new(ActionType::ScrollUp, 0)).collect();
    let mut recorder = ActionRecorder::new(RecordOptions::default());

    // When/Then
    assert_eq!(recorder.set_insert_index(Some(6), &mut list), None);
    assert_eq!(recorder.set_insert_index(Some(5), &mut list), Some(5));
}

/// WHAT: Measured delays are wall-clock gaps, zero for the first action
/// WHY: Replay reproduces the user's timing
#[test]
fn given_measured_mode_when_recording_then_delays_are_gaps() {
    // Given
    let mut recorder = recording(measured());
    let mut list = ActionList::new();
    let t0 = Instant::now();

    // When: Events at 0, 120 and 150ms
    recorder.on_key_event(&mut list, &key(VK_A, true, t0));
    recorder.on_key_event(&mut list, &key(VK_A, false, t0 + Duration::from_millis(120)));
    recorder.on_mouse_event(
        &mut list,
        &mouse(
            MouseEventKind::Button {
                button: MouseButton::Left,
                pressed: true,
            },
            7,
            8,
            t0 + Duration::from_millis(150),
        ),
    );

    // Then
    let delays: Vec<u64> = list.iter().map(|a| a.delay).collect();
    assert_eq!(delays, vec![0, 120, 30]);
    assert_eq!((list[2].x, list[2].y), (7, 8));
}

/// WHAT: Ignored auto-repeats do not reset the delay clock
/// WHY: The gap belongs to the previous recorded action
#[test]
fn given_auto_repeat_between_actions_when_measuring_then_gap_from_last_recorded() {
    // Given
    let mut recorder = recording(measured());
    let mut list = ActionList::new();
    let t0 = Instant::now();

    // When
    recorder.on_key_event(&mut list, &key(VK_A, true, t0));
    recorder.on_key_event(&mut list, &key(VK_A, true, t0 + Duration::from_millis(90)));
    recorder.on_key_event(&mut list, &key(VK_A, false, t0 + Duration::from_millis(100)));

    // Then
    assert_eq!(list[1].delay, 100);
}

/// WHAT: Fixed mode gives every action the configured delay
/// WHY: Users often want uniform pacing regardless of capture timing
#[test]
fn given_fixed_mode_when_recording_then_every_delay_fixed() {
    // Given
    let mut recorder = recording(RecordOptions {
        delay: DelayMode::Fixed(75),
        ..RecordOptions::default()
    });
    let mut list = ActionList::new();
    let t0 = Instant::now();

    // When
    recorder.on_key_event(&mut list, &key(VK_A, true, t0));
    recorder.on_key_event(&mut list, &key(VK_A, false, t0 + Duration::from_secs(3)));

    // Then
    assert!(list.iter().all(|a| a.delay == 75));
}

/// WHAT: Disabled categories, synthetic events and zero scroll are ignored
/// WHY: Only requested, physical input becomes actions
#[test]
fn given_filtered_events_when_recording_then_nothing_recorded() {
    // Given: Keyboard and mouse clicks disabled, scroll enabled
    let mut recorder = recording(RecordOptions {
        keyboard: false,
        mouse: false,
        ..RecordOptions::default()
    });
    let mut list = ActionList::new();
    let at = Instant::now();
    let mut echo = mouse(MouseEventKind::Wheel { delta: 120 }, 0, 0, at);
    echo.synthetic = true;

    // When
    recorder.on_key_event(&mut list, &key(VK_A, true, at));
    recorder.on_mouse_event(
        &mut list,
        &mouse(
            MouseEventKind::Button {
                button: MouseButton::Middle,
                pressed: true,
            },
            0,
            0,
            at,
        ),
    );
    recorder.on_mouse_event(&mut list, &echo);
    recorder.on_mouse_event(&mut list, &mouse(MouseEventKind::Wheel { delta: 0 }, 0, 0, at));
    recorder.on_mouse_event(&mut list, &mouse(MouseEventKind::Wheel { delta: -240 }, 1, 2, at));

    // Then: Only the real downward scroll
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].action_type, ActionType::ScrollDown);
}

/// WHAT: Events outside a recording session are ignored
/// WHY: The list only grows while recording
#[test]
fn given_idle_recorder_when_events_arrive_then_list_unchanged() {
    // Given
    let mut recorder = ActionRecorder::new(RecordOptions::default());
    let mut list = ActionList::new();

    // When
    let index = recorder.on_key_event(&mut list, &key(VK_A, true, Instant::now()));

    // Then
    assert_eq!(index, None);
    assert!(list.is_empty());
}

/// WHAT: Stopping clears the insert index and every marker
/// WHY: The next recording appends unless insert mode is set again
#[test]
fn given_insert_mode_when_stopping_then_markers_cleared() {
    // Given
    let mut list: ActionList = (0..3).map(|_| Action::new(ActionType::ScrollUp, 0)).collect();
    let mut recorder = ActionRecorder::new(RecordOptions::default());
    recorder.set_insert_index(Some(1), &mut list);
    recorder.start();

    // When
    recorder.stop(&mut list);

    // Then
    assert_eq!(recorder.insert_index(), None);
    assert!(!recorder.is_recording());
    assert!(list.iter().all(|a| !a.is_insertion_point));
}
