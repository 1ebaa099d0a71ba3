use std::{fmt, time::Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which mode the session is in, with per-session bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Neither recording nor replaying.
    #[default]
    Idle,
    /// Recording input into the action list.
    Recording {
        /// Unique session ID for log correlation.
        session_id: Uuid,
        /// When recording started.
        started_at: Instant,
    },
    /// Replaying the action list.
    Replaying {
        /// Unique session ID for log correlation.
        session_id: Uuid,
        /// When replay started.
        started_at: Instant,
    },
}

impl SessionState {
    /// Mode without session data.
    pub fn mode(&self) -> SessionMode {
        match self {
            Self::Idle => SessionMode::Idle,
            Self::Recording { .. } => SessionMode::Recording,
            Self::Replaying { .. } => SessionMode::Replaying,
        }
    }

    /// ID of the active recording or replay session.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            Self::Idle => None,
            Self::Recording { session_id, .. } | Self::Replaying { session_id, .. } => {
                Some(*session_id)
            }
        }
    }
}

/// Data-less projection of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    /// Neither recording nor replaying.
    Idle,
    /// Recording.
    Recording,
    /// Replaying.
    Replaying,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Recording => write!(f, "recording"),
            Self::Replaying => write!(f, "replaying"),
        }
    }
}
