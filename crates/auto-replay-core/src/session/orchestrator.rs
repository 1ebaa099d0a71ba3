//! The recording/replay state machine.
//!
//! One [`Session`] owns the action list, the recorder and the replayer. It
//! drains hook events and commands on a single task, so the list is never
//! touched concurrently: the recorder borrows it while recording, the
//! replayer gets an immutable snapshot while replaying, and bulk edits are
//! only accepted while idle.

use crate::{
    CoreError, CoreResult,
    action::{ActionList, Profile},
    hook::{HookFlags, HotkeyEvent, InputEvent, KeyEvent, MouseEvent},
    keys::{HotkeyMatch, HotkeyMatcher, HotkeyRole, is_valid},
    notification::Notification,
    record::{ActionRecorder, RecordOptions},
    replay::{ActionReplayer, LoopOptions, ReplayOutcome},
    session::{InputContext, SelectionSource, SessionCommand, SessionMode, SessionState},
};

use std::{
    collections::HashMap,
    ops::ControlFlow,
    panic::Location,
    sync::Arc,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Repeated firings of one hotkey inside this window are ignored.
///
/// Holding a hotkey makes the OS auto-repeat its key-down, first after
/// roughly 250-500ms and then every 30ms or so. Each repeat would toggle
/// the mode again. The window counts from the last accepted firing, so a
/// held key toggles once and a deliberate second press after half a
/// second goes through.
pub const HOTKEY_DEBOUNCE: Duration = Duration::from_millis(500);

/// Key that cancels insert mode.
const ESCAPE: &str = "Escape";

/// Owns the mode, the action list and both engines.
pub struct Session {
    state: SessionState,
    actions: ActionList,
    recorder: ActionRecorder,
    replayer: ActionReplayer,
    flags: Arc<HookFlags>,
    matcher: Arc<HotkeyMatcher>,
    selection: Box<dyn SelectionSource>,
    notify: mpsc::UnboundedSender<Notification>,
    internal_tx: mpsc::UnboundedSender<SessionCommand>,
    internal_rx: Option<mpsc::UnboundedReceiver<SessionCommand>>,
    last_fired: HashMap<HotkeyMatch, Instant>,
}

impl Session {
    /// Create an idle session with an empty action list.
    pub fn new(
        context: &InputContext,
        record: RecordOptions,
        loops: LoopOptions,
        selection: Box<dyn SelectionSource>,
        notify: mpsc::UnboundedSender<Notification>,
    ) -> Self {
        let mut replayer = ActionReplayer::new(
            Arc::clone(&context.synthesizer),
            Arc::clone(&context.flags),
            Arc::clone(&context.keyboard),
        );
        replayer.apply_loop_options(loops);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        Self {
            state: SessionState::Idle,
            actions: ActionList::new(),
            recorder: ActionRecorder::new(record),
            replayer,
            flags: Arc::clone(&context.flags),
            matcher: Arc::clone(&context.matcher),
            selection,
            notify,
            internal_tx,
            internal_rx: Some(internal_rx),
            last_fired: HashMap::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current mode.
    pub fn mode(&self) -> SessionMode {
        self.state.mode()
    }

    /// The action list.
    pub fn actions(&self) -> &ActionList {
        &self.actions
    }

    /// Current insert index, if in insert mode.
    pub fn insert_index(&self) -> Option<usize> {
        self.recorder.insert_index()
    }

    /// Current recording options.
    pub fn record_options(&self) -> RecordOptions {
        self.recorder.options()
    }

    /// Current loop options.
    pub fn loop_options(&self) -> LoopOptions {
        self.replayer.loop_options()
    }

    /// Drive the session until shutdown. Returns the final action list.
    #[instrument(skip_all)]
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<InputEvent>,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ActionList {
        let mut internal = match self.internal_rx.take() {
            Some(rx) => rx,
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                self.internal_tx = tx;
                rx
            }
        };

        info!("Session running");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Session shutting down");
                    break;
                }
                Some(cmd) = internal.recv() => {
                    if self.handle_command(cmd).is_break() {
                        break;
                    }
                }
                Some(event) = events.recv() => {
                    self.handle_event(event);
                }
                Some(cmd) = commands.recv() => {
                    if self.handle_command(cmd).is_break() {
                        break;
                    }
                }
                else => {
                    info!("All session channels closed");
                    break;
                }
            }
        }

        self.shutdown().await;
        self.actions
    }

    /// Stop recording and replay. Waits for a running replay to release
    /// its buttons.
    pub async fn shutdown(&mut self) {
        match self.state {
            SessionState::Recording { .. } => self.stop_recording(),
            SessionState::Replaying { .. } => {
                self.replayer.stop_and_wait().await;
                self.enter_idle();
            }
            SessionState::Idle => {}
        }
    }

    /// React to one dispatcher event.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Hotkey(hotkey) => self.handle_hotkey(hotkey),
            InputEvent::Key(key) => self.handle_key(&key),
            InputEvent::Mouse(mouse) => self.handle_mouse(&mouse),
        }
    }

    /// Apply one command. Breaks on [`SessionCommand::Shutdown`].
    pub fn handle_command(&mut self, command: SessionCommand) -> ControlFlow<()> {
        match command {
            SessionCommand::ToggleRecording => self.toggle_recording(),
            SessionCommand::ToggleReplay => self.toggle_replay(None),
            SessionCommand::SetLoopOptions { count, interval_ms } => {
                self.replayer.set_loop_options(count, interval_ms);
            }
            SessionCommand::SetRecordOptions(options) => self.recorder.set_options(options),
            SessionCommand::SetIgnoreHotkeys(ignore) => self.flags.set_ignore_hotkeys(ignore),
            SessionCommand::SetInsertIndex(index) => self.set_insert_index(index),
            SessionCommand::RegisterProfileHotkeys(hotkeys) => {
                self.matcher.register_profile_hotkeys(hotkeys);
            }
            SessionCommand::AssignRoleHotkey {
                role,
                hotkey,
                reply,
            } => {
                let _ = reply.send(self.assign_role_hotkey(role, &hotkey));
            }
            SessionCommand::AssignProfileHotkey {
                name,
                hotkey,
                reply,
            } => {
                let _ = reply.send(self.assign_profile_hotkey(&name, &hotkey));
            }
            SessionCommand::ApplyProfile {
                name,
                profile,
                trigger,
                reply,
            } => {
                let result = self.apply_profile(&name, *profile, trigger);
                if let Err(e) = &result {
                    warn!(profile = %name, error = ?e, "Profile not applied");
                }
                let _ = reply.send(result);
            }
            SessionCommand::ReplaceActions(actions) => {
                if let Err(e) = self.replace_actions(actions) {
                    warn!(error = ?e, "Action list replacement rejected");
                }
            }
            SessionCommand::ClearActions => {
                if let Err(e) = self.replace_actions(ActionList::new()) {
                    warn!(error = ?e, "Action list clear rejected");
                }
            }
            SessionCommand::SetAllDelays(delay_ms) => {
                if let Err(e) = self.set_all_delays(delay_ms) {
                    warn!(error = ?e, "Bulk delay edit rejected");
                }
            }
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.actions.clone());
            }
            SessionCommand::ReplayFinished {
                session_id,
                outcome,
            } => self.on_replay_finished(session_id, outcome),
            SessionCommand::Shutdown => {
                info!("Shutdown requested");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Replace the action list. Only allowed while idle.
    #[track_caller]
    pub fn replace_actions(&mut self, actions: ActionList) -> CoreResult<()> {
        self.ensure_idle("replace actions")?;
        self.actions = actions;
        self.actions.clear_insertion_markers();
        debug!(actions = self.actions.len(), "Action list replaced");
        Ok(())
    }

    /// Set every action's delay. Only allowed while idle.
    #[track_caller]
    pub fn set_all_delays(&mut self, delay_ms: i64) -> CoreResult<()> {
        self.ensure_idle("edit delays")?;
        self.actions.set_all_delays(delay_ms);
        Ok(())
    }

    /// Rebind a role after checking validity and collisions.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn assign_role_hotkey(&mut self, role: HotkeyRole, hotkey: &str) -> CoreResult<()> {
        self.check_assignable(hotkey, &HotkeyMatch::Role(role))?;
        self.matcher.set_role(role, hotkey)
    }

    /// Bind a profile hotkey after checking validity and collisions.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn assign_profile_hotkey(&mut self, name: &str, hotkey: &str) -> CoreResult<()> {
        self.check_assignable(hotkey, &HotkeyMatch::Profile(name.to_string()))?;

        let mut hotkeys = self.matcher.profile_hotkeys();
        hotkeys.insert(name.to_string(), hotkey.trim().to_string());
        self.matcher.register_profile_hotkeys(hotkeys);

        info!(profile = name, hotkey, "Profile hotkey bound");
        Ok(())
    }

    #[track_caller]
    fn check_assignable(&self, hotkey: &str, owner: &HotkeyMatch) -> CoreResult<()> {
        if !is_valid(hotkey) {
            return Err(CoreError::InvalidHotkey {
                hotkey: hotkey.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if let Some(existing) = self.matcher.find_collision(hotkey.trim(), Some(owner)) {
            return Err(CoreError::HotkeyCollision {
                hotkey: hotkey.to_string(),
                owner: existing.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    #[track_caller]
    fn ensure_idle(&self, operation: &str) -> CoreResult<()> {
        if self.mode() == SessionMode::Idle {
            return Ok(());
        }
        Err(CoreError::SessionBusy {
            reason: format!("cannot {} while {}", operation, self.mode()),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn handle_hotkey(&mut self, event: HotkeyEvent) {
        if self.debounced(&event) {
            debug!(hotkey = %event.hotkey, "Hotkey debounced");
            return;
        }

        match event.hotkey {
            HotkeyMatch::Role(HotkeyRole::Recording) => self.toggle_recording(),
            HotkeyMatch::Role(HotkeyRole::Replay) => self.toggle_replay(Some(event.composed)),
            HotkeyMatch::Role(HotkeyRole::ProfileToggle) => {
                let enabled = self.flags.toggle_profile_keys();
                info!(enabled, "Profile hotkeys toggled");
                self.send(Notification::ProfileKeysToggled { enabled });
            }
            HotkeyMatch::Profile(name) => {
                if !self.flags.profile_keys_enabled() || self.mode() != SessionMode::Idle {
                    debug!(profile = %name, mode = %self.mode(), "Profile hotkey ignored");
                    return;
                }
                info!(profile = %name, "Profile requested by hotkey");
                self.send(Notification::ProfileRequested {
                    name,
                    trigger: event.composed,
                });
            }
        }
    }

    fn debounced(&mut self, event: &HotkeyEvent) -> bool {
        if let Some(last) = self.last_fired.get(&event.hotkey)
            && event.at.saturating_duration_since(*last) < HOTKEY_DEBOUNCE
        {
            return true;
        }
        self.last_fired.insert(event.hotkey.clone(), event.at);
        false
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.name == ESCAPE {
            if !event.synthetic && self.mode() != SessionMode::Replaying && event.pressed {
                self.cancel_insert_mode();
            }
            return;
        }

        if let Some(index) = self.recorder.on_key_event(&mut self.actions, event) {
            self.announce_recorded(index);
        }
    }

    fn handle_mouse(&mut self, event: &MouseEvent) {
        if let Some(index) = self.recorder.on_mouse_event(&mut self.actions, event) {
            self.announce_recorded(index);
        }
    }

    fn announce_recorded(&self, index: usize) {
        if let Some(action) = self.actions.get(index) {
            self.send(Notification::ActionRecorded {
                index,
                action: action.clone(),
            });
        }
        if self.recorder.insert_index().is_some() {
            self.send(Notification::InsertModeChanged {
                index: self.recorder.insert_index(),
            });
        }
    }

    /// Leave insert mode and hide the insertion markers.
    pub fn cancel_insert_mode(&mut self) {
        let previous = self.recorder.clear_insert_index();
        self.actions.deselect_insertion_markers();
        if previous.is_some() {
            info!(previous = ?previous, "Insert mode cancelled");
            self.send(Notification::InsertModeChanged { index: None });
        }
    }

    fn set_insert_index(&mut self, index: Option<usize>) {
        if self.mode() == SessionMode::Replaying {
            warn!("Insert index ignored while replaying");
            return;
        }
        let stored = self.recorder.set_insert_index(index, &mut self.actions);
        self.send(Notification::InsertModeChanged { index: stored });
    }

    /// Start recording, or stop it if already recording. Stops a running
    /// replay first.
    pub fn toggle_recording(&mut self) {
        match self.state {
            SessionState::Recording { .. } => self.stop_recording(),
            SessionState::Replaying { .. } => {
                self.stop_replay();
                self.start_recording();
            }
            SessionState::Idle => self.start_recording(),
        }
    }

    /// Start replaying, or stop if already replaying. Stops a running
    /// recording first.
    pub fn toggle_replay(&mut self, trigger: Option<String>) {
        match self.state {
            SessionState::Replaying { .. } => self.stop_replay(),
            SessionState::Recording { .. } => {
                self.stop_recording();
                self.start_replay(trigger);
            }
            SessionState::Idle => self.start_replay(trigger),
        }
    }

    #[instrument(skip(self))]
    fn start_recording(&mut self) {
        if let Some(index) = self.selection.min_selected_index() {
            let stored = self.recorder.set_insert_index(Some(index), &mut self.actions);
            self.send(Notification::InsertModeChanged { index: stored });
        }

        self.recorder.start();
        let session_id = Uuid::new_v4();
        self.state = SessionState::Recording {
            session_id,
            started_at: Instant::now(),
        };
        self.flags.set_recording(true);

        info!(session_id = %session_id, insert_index = ?self.recorder.insert_index(), "Recording started");
        self.send(Notification::StateChanged {
            mode: SessionMode::Recording,
        });
    }

    #[instrument(skip(self))]
    fn stop_recording(&mut self) {
        let SessionState::Recording {
            session_id,
            started_at,
        } = self.state
        else {
            return;
        };

        self.recorder.stop(&mut self.actions);
        self.flags.set_recording(false);
        self.state = SessionState::Idle;

        info!(
            session_id = %session_id,
            duration_ms = started_at.elapsed().as_millis(),
            actions = self.actions.len(),
            "Recording stopped"
        );
        self.send(Notification::InsertModeChanged { index: None });
        self.send(Notification::StateChanged {
            mode: SessionMode::Idle,
        });
    }

    #[instrument(skip(self))]
    fn start_replay(&mut self, trigger: Option<String>) {
        if self.actions.is_empty() {
            info!("Nothing to replay");
            return;
        }

        let session_id = Uuid::new_v4();
        let finished = self.internal_tx.clone();

        // Start the run first; state only changes once it is really running.
        let started = self.replayer.start(
            session_id,
            self.actions.snapshot(),
            trigger,
            self.notify.clone(),
            move |outcome| {
                let _ = finished.send(SessionCommand::ReplayFinished {
                    session_id,
                    outcome,
                });
            },
        );
        if let Err(e) = started {
            warn!(error = ?e, "Replay not started");
            return;
        }

        self.state = SessionState::Replaying {
            session_id,
            started_at: Instant::now(),
        };
        self.flags.set_replay_active(true);
        self.send(Notification::StateChanged {
            mode: SessionMode::Replaying,
        });
    }

    #[instrument(skip(self))]
    fn stop_replay(&mut self) {
        if self.mode() != SessionMode::Replaying {
            return;
        }
        self.replayer.stop();
        self.enter_idle();
    }

    fn enter_idle(&mut self) {
        if let SessionState::Replaying {
            session_id,
            started_at,
        } = self.state
        {
            info!(
                session_id = %session_id,
                duration_ms = started_at.elapsed().as_millis(),
                "Replay stopped"
            );
        }
        self.state = SessionState::Idle;
        self.flags.set_replay_active(false);
        self.send(Notification::StateChanged {
            mode: SessionMode::Idle,
        });
    }

    fn on_replay_finished(&mut self, session_id: Uuid, outcome: ReplayOutcome) {
        self.replayer.clear_finished(session_id);
        self.send(Notification::ReplayFinished {
            session_id,
            outcome,
        });

        if self.state.session_id() == Some(session_id) {
            debug!(session_id = %session_id, outcome = ?outcome, "Replay finished");
            self.enter_idle();
        } else {
            debug!(session_id = %session_id, "Stale replay completion ignored");
        }
    }

    /// Take over a profile's actions and options, then replay them when
    /// `trigger` is set. Only allowed while idle.
    #[track_caller]
    #[instrument(skip(self, profile), fields(actions = profile.actions.len()))]
    pub fn apply_profile(
        &mut self,
        name: &str,
        profile: Profile,
        trigger: Option<String>,
    ) -> CoreResult<()> {
        self.ensure_idle("apply a profile")?;

        self.actions = profile.actions;
        self.actions.clear_insertion_markers();
        self.recorder.set_options(profile.record);
        self.replayer.apply_loop_options(profile.loop_options);

        info!(profile = name, "Profile applied");

        if trigger.is_some() {
            self.start_replay(trigger);
        }
        Ok(())
    }

    fn send(&self, notification: Notification) {
        let _ = self.notify.send(notification);
    }
}
