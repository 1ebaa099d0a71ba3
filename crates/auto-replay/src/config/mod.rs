#[allow(clippy::module_inception)]
mod config;
mod profiles_config;

pub(crate) use {
    config::{Config, write_atomic},
    profiles_config::ProfilesConfig,
};

pub(crate) const DEFAULT_HOTKEYS_ENABLED: bool = true;
pub(crate) const DEFAULT_ACTIVE_PROFILE: &str = "default";

pub(crate) fn default_hotkeys_enabled() -> bool {
    DEFAULT_HOTKEYS_ENABLED
}
