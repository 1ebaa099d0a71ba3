//! Replays an action list as synthesized input.
//!
//! A run is a spawned tokio task. Its only suspension points are the
//! per-action delay, the inter-loop interval and the hotkey-release wait,
//! and each of them races the run's [`CancellationToken`].

use crate::{
    CoreError, CoreResult,
    action::{Action, ActionType},
    hook::{HookFlags, KeyboardState},
    keys::{RawKeyCode, key_stroke, resolve},
    notification::Notification,
    replay::{ButtonReleaseGuard, EchoGuard, SharedSynthesizer},
};

use std::{
    panic::Location,
    sync::{Arc, PoisonError},
    time::Duration,
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Longest wait for the trigger hotkey to be released.
///
/// Replaying while the trigger's modifiers are still held would turn the
/// first synthesized keys into shortcuts. Past two seconds the user is
/// holding the keys on purpose, so the replay starts anyway.
pub const RELEASE_WAIT_MAX: Duration = Duration::from_secs(2);

/// Poll period while waiting for the trigger hotkey to be released.
///
/// Key state is a set of atomics, so polling is cheap. 10ms is below what
/// a person can notice between letting go of a key and the replay
/// starting.
pub const RELEASE_POLL: Duration = Duration::from_millis(10);

/// Loop count and interval for a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoopOptions {
    /// Number of passes. `0` repeats until stopped.
    pub count: u32,
    /// Milliseconds between passes.
    pub interval_ms: u64,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            count: 1,
            interval_ms: 1000,
        }
    }
}

impl LoopOptions {
    /// Build options from unchecked values. Negatives become zero.
    pub fn new(count: i64, interval_ms: i64) -> Self {
        Self {
            count: u32::try_from(count.max(0)).unwrap_or(u32::MAX),
            interval_ms: u64::try_from(interval_ms).unwrap_or(0),
        }
    }

    /// Whether the replay repeats until stopped.
    pub fn is_infinite(&self) -> bool {
        self.count == 0
    }
}

/// How a replay run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Every requested pass ran.
    Completed {
        /// Passes executed.
        iterations: u64,
    },
    /// Stopped before finishing.
    Cancelled {
        /// Full passes executed before cancellation.
        iterations: u64,
    },
}

struct RunningReplay {
    session_id: Uuid,
    token: CancellationToken,
    handle: JoinHandle<ReplayOutcome>,
}

/// Starts and cancels replay runs.
pub struct ActionReplayer {
    synthesizer: SharedSynthesizer,
    flags: Arc<HookFlags>,
    keyboard: Arc<KeyboardState>,
    options: LoopOptions,
    running: Option<RunningReplay>,
}

impl ActionReplayer {
    /// Create a replayer that injects through `synthesizer`.
    pub fn new(
        synthesizer: SharedSynthesizer,
        flags: Arc<HookFlags>,
        keyboard: Arc<KeyboardState>,
    ) -> Self {
        Self {
            synthesizer,
            flags,
            keyboard,
            options: LoopOptions::default(),
            running: None,
        }
    }

    /// Current loop options.
    pub fn loop_options(&self) -> LoopOptions {
        self.options
    }

    /// Set loop count and interval. Negative values are clamped to zero.
    /// Applies to the next run.
    pub fn set_loop_options(&mut self, count: i64, interval_ms: i64) {
        self.options = LoopOptions::new(count, interval_ms);
    }

    /// Replace the loop options.
    pub fn apply_loop_options(&mut self, options: LoopOptions) {
        self.options = options;
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Start a run over `actions`.
    ///
    /// When `trigger` names the hotkey that started the replay, the run
    /// first waits for its keys to be released. `on_finish` is called once
    /// with the outcome when the run ends, cancelled or not.
    #[track_caller]
    #[instrument(skip(self, actions, notify, on_finish), fields(actions = actions.len()))]
    pub fn start<F>(
        &mut self,
        session_id: Uuid,
        actions: Arc<[Action]>,
        trigger: Option<String>,
        notify: mpsc::UnboundedSender<Notification>,
        on_finish: F,
    ) -> CoreResult<()>
    where
        F: FnOnce(ReplayOutcome) + Send + 'static,
    {
        if self.is_running() {
            return Err(CoreError::ReplayAlreadyRunning {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let token = CancellationToken::new();
        let run = ReplayRun {
            session_id,
            actions,
            trigger,
            options: self.options,
            synthesizer: Arc::clone(&self.synthesizer),
            flags: Arc::clone(&self.flags),
            keyboard: Arc::clone(&self.keyboard),
            notify,
            token: token.clone(),
        };

        let handle = tokio::spawn(async move {
            let outcome = run.execute().await;
            on_finish(outcome);
            outcome
        });

        self.running = Some(RunningReplay {
            session_id,
            token,
            handle,
        });

        info!(
            session_id = %session_id,
            count = self.options.count,
            interval_ms = self.options.interval_ms,
            "Replay started"
        );

        Ok(())
    }

    /// Cancel the current run, if any, and release all mouse buttons.
    ///
    /// Returns without waiting for the run. The release happens here as well
    /// as in the run itself, since a run that already ended on its own has
    /// disarmed its guard.
    #[instrument(skip(self))]
    pub fn stop(&mut self) {
        let Some(run) = self.running.take() else {
            return;
        };
        run.token.cancel();
        info!(
            session_id = %run.session_id,
            finished = run.handle.is_finished(),
            "Replay cancellation requested"
        );
        ButtonReleaseGuard::release_all(&self.synthesizer, &self.flags);
    }

    /// Cancel the current run, wait for it to finish and release all mouse
    /// buttons.
    pub async fn stop_and_wait(&mut self) -> Option<ReplayOutcome> {
        let run = self.running.take()?;
        run.token.cancel();
        let outcome = match run.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = ?e, "Replay task failed");
                None
            }
        };
        if !matches!(outcome, Some(ReplayOutcome::Cancelled { .. })) {
            ButtonReleaseGuard::release_all(&self.synthesizer, &self.flags);
        }
        outcome
    }

    /// Forget a run that has already reported its outcome.
    pub fn clear_finished(&mut self, session_id: Uuid) {
        if self
            .running
            .as_ref()
            .is_some_and(|run| run.session_id == session_id)
        {
            self.running = None;
        }
    }
}

impl Drop for ActionReplayer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct ReplayRun {
    session_id: Uuid,
    actions: Arc<[Action]>,
    trigger: Option<String>,
    options: LoopOptions,
    synthesizer: SharedSynthesizer,
    flags: Arc<HookFlags>,
    keyboard: Arc<KeyboardState>,
    notify: mpsc::UnboundedSender<Notification>,
    token: CancellationToken,
}

impl ReplayRun {
    async fn execute(self) -> ReplayOutcome {
        let guard = ButtonReleaseGuard::new(Arc::clone(&self.synthesizer), Arc::clone(&self.flags));

        if let Some(trigger) = &self.trigger {
            self.wait_for_release(trigger).await;
        }

        let mut iterations: u64 = 0;
        if self.actions.is_empty() || self.token.is_cancelled() {
            return self.finish(guard, iterations);
        }

        loop {
            for (index, action) in self.actions.iter().enumerate() {
                if !self.wait(Duration::from_millis(action.delay)).await {
                    return self.finish(guard, iterations);
                }

                let _ = self.notify.send(Notification::ActionExecuting {
                    index,
                    iteration: iterations,
                    action: action.clone(),
                });
                self.perform(action);
            }

            iterations += 1;
            debug!(session_id = %self.session_id, iterations, "Replay pass complete");

            if !self.options.is_infinite() && iterations >= u64::from(self.options.count) {
                break;
            }
            if !self.wait(Duration::from_millis(self.options.interval_ms)).await {
                return self.finish(guard, iterations);
            }
        }

        guard.disarm();
        info!(session_id = %self.session_id, iterations, "Replay completed");
        ReplayOutcome::Completed { iterations }
    }

    fn finish(&self, guard: ButtonReleaseGuard, iterations: u64) -> ReplayOutcome {
        if self.token.is_cancelled() {
            drop(guard);
            info!(session_id = %self.session_id, iterations, "Replay cancelled");
            ReplayOutcome::Cancelled { iterations }
        } else {
            guard.disarm();
            ReplayOutcome::Completed { iterations }
        }
    }

    /// Sleep unless cancelled first. Returns `false` on cancellation.
    async fn wait(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return !self.token.is_cancelled();
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    async fn wait_for_release(&self, trigger: &str) {
        let codes: Vec<RawKeyCode> = trigger
            .split('+')
            .filter_map(|token| resolve(token.trim()).ok())
            .collect();
        let polls = RELEASE_WAIT_MAX.as_millis() / RELEASE_POLL.as_millis();

        for _ in 0..polls {
            if self.keyboard.all_released(&codes) {
                return;
            }
            if !self.wait(RELEASE_POLL).await {
                return;
            }
        }

        warn!(trigger, "Hotkey still held, replaying anyway");
    }

    fn perform(&self, action: &Action) {
        let mut synth = self
            .synthesizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let result = match action.action_type {
            ActionType::KeyDown | ActionType::KeyUp => {
                let Some(name) = action.key.as_deref() else {
                    warn!(action_type = %action.action_type, "Key action without key, skipped");
                    return;
                };
                let stroke = match key_stroke(name) {
                    Ok(stroke) => stroke,
                    Err(e) => {
                        warn!(key = name, error = ?e, "Unresolvable key, skipped");
                        return;
                    }
                };
                let _echo = EchoGuard::new(&self.flags);
                synth.key(stroke, action.action_type == ActionType::KeyDown)
            }
            ActionType::ScrollUp | ActionType::ScrollDown => {
                let notches = if action.action_type == ActionType::ScrollUp { 1 } else { -1 };
                let _echo = EchoGuard::new(&self.flags);
                synth
                    .move_to(action.x, action.y)
                    .and_then(|()| synth.scroll(notches))
            }
            other => {
                let Some((button, pressed)) = other.button() else {
                    return;
                };
                let _echo = EchoGuard::new(&self.flags);
                synth
                    .move_to(action.x, action.y)
                    .and_then(|()| synth.button(button, pressed))
            }
        };

        if let Err(e) = result {
            warn!(action_type = %action.action_type, error = ?e, "Synthesis failed, skipped");
        }
    }
}
