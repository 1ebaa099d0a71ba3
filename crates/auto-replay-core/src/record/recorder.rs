//! Turns published input events into actions while recording.

use crate::{
    action::{Action, ActionList, ActionType},
    hook::{KeyEvent, MouseEvent, MouseEventKind},
};

use std::{collections::HashSet, time::Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

/// How recorded actions get their delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "ms", rename_all = "camelCase")]
pub enum DelayMode {
    /// Wall-clock time since the previous recorded action.
    Measured,
    /// The same fixed delay for every action.
    Fixed(u64),
}

impl Default for DelayMode {
    fn default() -> Self {
        Self::Fixed(100)
    }
}

/// Which input categories are recorded, and how delays are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordOptions {
    /// Record mouse button presses and releases.
    pub mouse: bool,
    /// Record wheel notches.
    pub scroll: bool,
    /// Record key presses and releases.
    pub keyboard: bool,
    /// Delay computation.
    pub delay: DelayMode,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            mouse: true,
            scroll: true,
            keyboard: true,
            delay: DelayMode::default(),
        }
    }
}

/// Recording session state.
///
/// The recorder does not own the action list; the session lends it on every
/// call so recorder and list can never disagree about ownership.
#[derive(Debug, Default)]
pub struct ActionRecorder {
    options: RecordOptions,
    recording: bool,
    down_keys: HashSet<String>,
    last_recorded_at: Option<Instant>,
    insert_index: Option<usize>,
}

impl ActionRecorder {
    /// Create an idle recorder.
    pub fn new(options: RecordOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Current options.
    pub fn options(&self) -> RecordOptions {
        self.options
    }

    /// Replace the options. Takes effect on the next event.
    pub fn set_options(&mut self, options: RecordOptions) {
        self.options = options;
    }

    /// Whether a recording session is open.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Position where the next action will be inserted, if any.
    pub fn insert_index(&self) -> Option<usize> {
        self.insert_index
    }

    /// Open a recording session.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        self.down_keys.clear();
        self.last_recorded_at = None;
        self.recording = true;

        info!(insert_index = ?self.insert_index, "Recorder started");
    }

    /// Close the recording session and leave insert mode.
    #[instrument(skip(self, list))]
    pub fn stop(&mut self, list: &mut ActionList) {
        self.down_keys.clear();
        self.recording = false;
        self.insert_index = None;
        list.clear_insertion_markers();

        info!(actions = list.len(), "Recorder stopped");
    }

    /// Set where the next action goes. `None` or an out-of-range index means
    /// append. Returns the index actually stored.
    pub fn set_insert_index(&mut self, index: Option<usize>, list: &mut ActionList) -> Option<usize> {
        self.insert_index = index.filter(|i| *i <= list.len());
        match self.insert_index {
            Some(i) => list.mark_insertion_point(i),
            None => list.clear_insertion_markers(),
        }

        debug!(requested = ?index, stored = ?self.insert_index, "Insert index set");
        self.insert_index
    }

    /// Leave insert mode without touching the list. Returns the old index.
    pub fn clear_insert_index(&mut self) -> Option<usize> {
        self.insert_index.take()
    }

    /// Record a key transition. Returns the index of the new action.
    pub fn on_key_event(&mut self, list: &mut ActionList, event: &KeyEvent) -> Option<usize> {
        if !self.recording || event.synthetic || !self.options.keyboard {
            return None;
        }

        let name = event.name.as_ref();
        if event.pressed {
            if self.down_keys.contains(name) {
                trace!(key = name, "Auto-repeat ignored");
                return None;
            }
            self.down_keys.insert(name.to_string());
        } else {
            self.down_keys.remove(name);
        }

        let delay = self.next_delay(event.at);
        Some(self.place(list, Action::key(name, event.pressed, delay)))
    }

    /// Record a mouse button or wheel event. Returns the index of the new
    /// action.
    pub fn on_mouse_event(&mut self, list: &mut ActionList, event: &MouseEvent) -> Option<usize> {
        if !self.recording || event.synthetic {
            return None;
        }

        let action_type = match event.kind {
            MouseEventKind::Button { button, pressed } if self.options.mouse => {
                ActionType::for_button(button, pressed)
            }
            MouseEventKind::Wheel { delta } if self.options.scroll => {
                ActionType::for_scroll(delta)?
            }
            _ => return None,
        };

        let delay = self.next_delay(event.at);
        Some(self.place(list, Action::mouse(action_type, event.x, event.y, delay)))
    }

    fn next_delay(&mut self, at: Instant) -> i64 {
        let delay = match self.options.delay {
            DelayMode::Fixed(ms) => i64::try_from(ms).unwrap_or(i64::MAX),
            DelayMode::Measured => self
                .last_recorded_at
                .map(|last| {
                    i64::try_from(at.saturating_duration_since(last).as_millis())
                        .unwrap_or(i64::MAX)
                })
                .unwrap_or(0),
        };
        self.last_recorded_at = Some(at);
        delay
    }

    fn place(&mut self, list: &mut ActionList, action: Action) -> usize {
        match self.insert_index {
            Some(index) if index <= list.len() => {
                list.insert(index, action);
                let next = index + 1;
                self.insert_index = Some(next);
                list.mark_insertion_point(next);
                index
            }
            _ => {
                list.push(action);
                list.len() - 1
            }
        }
    }
}
