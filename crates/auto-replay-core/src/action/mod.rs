/// A single recorded input event.
#[allow(clippy::module_inception)]
pub mod action;
/// Ordered action sequence.
pub mod action_list;
/// Named bundle of actions and options.
pub mod profile;

pub use {
    action::{Action, ActionType, MouseButton, clamp_delay},
    action_list::ActionList,
    profile::Profile,
};
