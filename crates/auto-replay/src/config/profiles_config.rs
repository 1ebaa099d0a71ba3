use crate::config::default_hotkeys_enabled;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Profile store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilesConfig {
    /// Directory holding one `<name>.json` per profile. Defaults to the
    /// platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Whether profile hotkeys are active at startup.
    #[serde(default = "default_hotkeys_enabled")]
    pub hotkeys_enabled: bool,

    /// Profile loaded at startup and saved on exit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            dir: None,
            hotkeys_enabled: default_hotkeys_enabled(),
            active: None,
        }
    }
}
