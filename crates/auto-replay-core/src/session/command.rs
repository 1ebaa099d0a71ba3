use crate::{
    CoreResult,
    action::{ActionList, Profile},
    keys::HotkeyRole,
    record::RecordOptions,
    replay::ReplayOutcome,
};

use std::collections::HashMap;

use tokio::sync::oneshot;
use uuid::Uuid;

/// Requests sent to a running [`crate::session::Session`].
#[derive(Debug)]
pub enum SessionCommand {
    /// Start or stop recording, as the recording hotkey would.
    ToggleRecording,
    /// Start or stop replay, as the replay hotkey would.
    ToggleReplay,
    /// Loop count (`0` = infinite) and interval for the next replay.
    SetLoopOptions {
        /// Pass count. Negative values become zero.
        count: i64,
        /// Milliseconds between passes. Negative values become zero.
        interval_ms: i64,
    },
    /// Recording filters and delay mode.
    SetRecordOptions(RecordOptions),
    /// Set while a text field in the host UI has focus.
    SetIgnoreHotkeys(bool),
    /// Insert new actions at this index instead of appending.
    SetInsertIndex(Option<usize>),
    /// Replace every profile hotkey.
    RegisterProfileHotkeys(HashMap<String, String>),
    /// Bind a built-in role to a new hotkey.
    AssignRoleHotkey {
        /// Role to rebind.
        role: HotkeyRole,
        /// Composed hotkey.
        hotkey: String,
        /// Receives the outcome.
        reply: oneshot::Sender<CoreResult<()>>,
    },
    /// Bind a profile to a new hotkey.
    AssignProfileHotkey {
        /// Profile name.
        name: String,
        /// Composed hotkey.
        hotkey: String,
        /// Receives the outcome.
        reply: oneshot::Sender<CoreResult<()>>,
    },
    /// Load a profile's actions and options, then replay it if `trigger`
    /// is set. Rejected unless idle.
    ApplyProfile {
        /// Profile name.
        name: String,
        /// Profile contents.
        profile: Box<Profile>,
        /// Hotkey that requested the profile.
        trigger: Option<String>,
        /// Receives `Ok` once the profile replaced the session's list.
        reply: oneshot::Sender<CoreResult<()>>,
    },
    /// Replace the action list. Rejected unless idle.
    ReplaceActions(ActionList),
    /// Empty the action list. Rejected unless idle.
    ClearActions,
    /// Set every action's delay. Rejected unless idle.
    SetAllDelays(i64),
    /// Send a copy of the action list.
    Snapshot(oneshot::Sender<ActionList>),
    /// A replay run ended.
    ReplayFinished {
        /// Replay session that ended.
        session_id: Uuid,
        /// How it ended.
        outcome: ReplayOutcome,
    },
    /// Stop whatever is running and exit the session loop.
    Shutdown,
}
