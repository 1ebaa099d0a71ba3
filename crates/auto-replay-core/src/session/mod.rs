/// Requests accepted by a running session.
pub mod command;
/// Shared handles built once at startup.
pub mod context;
pub mod orchestrator;
/// Query for the host UI's selected rows.
pub mod selection;
/// Session modes.
pub mod state;

pub use {
    command::SessionCommand,
    context::InputContext,
    orchestrator::Session,
    selection::{NoSelection, SelectionSource},
    state::{SessionMode, SessionState},
};
