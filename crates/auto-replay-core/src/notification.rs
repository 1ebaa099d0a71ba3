use crate::{action::Action, replay::ReplayOutcome, session::SessionMode};

use uuid::Uuid;

/// Events pushed from the core to presentation collaborators.
///
/// The core never touches presentation state; whoever drains this channel
/// marshals onto its own thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The session entered a new mode.
    StateChanged {
        /// New mode.
        mode: SessionMode,
    },
    /// An action was recorded at `index`.
    ActionRecorded {
        /// Position in the list.
        index: usize,
        /// The new action.
        action: Action,
    },
    /// The replayer is about to execute `action`.
    ActionExecuting {
        /// Position in the replayed list.
        index: usize,
        /// Zero-based loop iteration.
        iteration: u64,
        /// The action being executed.
        action: Action,
    },
    /// Insert mode was entered, moved or left.
    InsertModeChanged {
        /// Current insert index, `None` when appending.
        index: Option<usize>,
    },
    /// The profile-hotkey feature was switched.
    ProfileKeysToggled {
        /// Whether profile hotkeys now fire.
        enabled: bool,
    },
    /// A profile hotkey fired; the profile collaborator should answer with
    /// [`crate::session::SessionCommand::ApplyProfile`].
    ProfileRequested {
        /// Profile name.
        name: String,
        /// Composed hotkey that fired.
        trigger: String,
    },
    /// A replay run ended.
    ReplayFinished {
        /// Replay session.
        session_id: Uuid,
        /// How it ended.
        outcome: ReplayOutcome,
    },
}
