use crate::{action::ActionList, record::RecordOptions, replay::LoopOptions};

use serde::{Deserialize, Serialize};

/// A named bundle of actions and their recording/replay settings.
///
/// Persisted by the host; the core only consumes and produces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Recorded actions.
    #[serde(default)]
    pub actions: ActionList,
    /// Recording filters and delay mode.
    #[serde(default)]
    pub record: RecordOptions,
    /// Loop count and interval.
    #[serde(default)]
    pub loop_options: LoopOptions,
    /// Hotkey that replays this profile.
    #[serde(default)]
    pub hotkey: Option<String>,
}
