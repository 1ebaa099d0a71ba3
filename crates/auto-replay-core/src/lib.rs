//! Auto-replay Core Library
//!
//! Global input recording and replay: OS hook events are classified by a
//! [`HookDispatcher`], recorded into an [`ActionList`] by the
//! [`ActionRecorder`], and replayed through an [`InputSynthesizer`] by the
//! [`ActionReplayer`]. A [`Session`] arbitrates between the two and resolves
//! global hotkeys.
//!
//! # Example
//!
//! ```no_run
//! use auto_replay_core::{
//!     EnigoSynthesizer, HotkeyBindings, InputContext, LoopOptions, NoSelection, RecordOptions,
//!     Session,
//! };
//!
//! use std::sync::{Arc, Mutex};
//!
//! use tokio::sync::{mpsc, watch};
//!
//! #[tokio::main]
//! async fn main() -> auto_replay_core::CoreResult<()> {
//!     let synthesizer = Arc::new(Mutex::new(EnigoSynthesizer::new()?));
//!     let context = InputContext::new(HotkeyBindings::default(), true, synthesizer);
//!     let dispatcher = context.dispatcher();
//!
//!     let (notify_tx, _notify_rx) = mpsc::unbounded_channel();
//!     let (_command_tx, command_rx) = mpsc::channel(32);
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let session = Session::new(
//!         &context,
//!         RecordOptions::default(),
//!         LoopOptions::default(),
//!         Box::new(NoSelection),
//!         notify_tx,
//!     );
//!
//!     // Feed `dispatcher.on_keyboard` / `on_mouse` from an OS hook.
//!     let actions = session
//!         .run(dispatcher.subscribe(256), command_rx, shutdown_rx)
//!         .await;
//!     println!("{}", actions.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

/// Recorded actions, action lists and profiles.
pub mod action;
mod error;
/// Hook event classification and the hook lifecycle.
pub mod hook;
/// Key names, raw codes and hotkeys.
pub mod keys;
mod notification;
/// Turning hook events into actions.
pub mod record;
/// Synthesizing input from actions.
pub mod replay;
/// Recording/replay state machine and its commands.
pub mod session;

pub use {
    action::{Action, ActionList, ActionType, MouseButton, Profile},
    error::{CoreError, Result as CoreResult},
    hook::{
        GlobalHook, HookBackend, HookDispatcher, HookFlags, HookVerdict, InputEvent,
        KeyboardState, MouseEventKind, RawKeyEvent, RawMouseEvent,
    },
    keys::{HotkeyBindings, HotkeyMatch, HotkeyMatcher, HotkeyRole, RawKeyCode},
    notification::Notification,
    record::{ActionRecorder, DelayMode, RecordOptions},
    replay::{
        ActionReplayer, EnigoSynthesizer, InputSynthesizer, LoopOptions, ReplayOutcome,
        SharedSynthesizer,
    },
    session::{
        InputContext, NoSelection, SelectionSource, Session, SessionCommand, SessionMode,
        SessionState,
    },
};

#[cfg(test)]
mod tests;
