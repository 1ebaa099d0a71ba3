use crate::{AppError, AppResult, ProfileStore, config::Config};

use std::{panic::Location, path::PathBuf};

use auto_replay_core::{ActionList, Notification, SessionCommand};
use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, trace, warn};

/// Process shell around a running session.
///
/// Logs the session's notifications, serves profile requests from the
/// profile store and saves the action list to the active profile when the
/// session ends.
pub struct App {
    pub(crate) config: Config,
    pub(crate) config_path: PathBuf,
    pub(crate) profiles: ProfileStore,
    pub(crate) active_profile: String,
    pub(crate) command_tx: mpsc::Sender<SessionCommand>,
    pub(crate) notify_rx: mpsc::UnboundedReceiver<Notification>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) session: JoinHandle<ActionList>,
}

impl App {
    /// Run until Ctrl+C or until the session ends.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!(profile = %self.active_profile, "Auto-Replay running");

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    if let Err(e) = result {
                        error!(error = ?e, "Failed to listen for Ctrl+C");
                    }
                    info!("Shutdown requested");
                    if let Err(e) = self.command_tx.send(SessionCommand::Shutdown).await {
                        warn!(error = ?e, "Session already stopped");
                    }
                    break;
                }

                notification = self.notify_rx.recv() => {
                    let Some(notification) = notification else {
                        info!("Session channel closed, shutting down");
                        break;
                    };
                    if let Err(e) = self.handle_notification(notification).await {
                        error!(error = ?e, "Failed to handle notification");
                    }
                }
            }
        }

        let _ = self.shutdown_tx.send(true);

        let actions = self.session.await.map_err(|e| AppError::TaskFailed {
            reason: format!("Session task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        save_actions(&self.profiles, &self.active_profile, actions)?;

        info!("Auto-Replay shut down successfully");

        Ok(())
    }

    /// React to one session notification.
    pub(crate) async fn handle_notification(
        &mut self,
        notification: Notification,
    ) -> AppResult<()> {
        match notification {
            Notification::StateChanged { mode } => info!(mode = %mode, "Mode changed"),
            Notification::ActionRecorded { index, action } => {
                debug!(index, action_type = %action.action_type, key = ?action.key, "Action recorded");
            }
            Notification::ActionExecuting {
                index,
                iteration,
                action,
            } => {
                trace!(index, iteration, action_type = %action.action_type, "Executing action");
            }
            Notification::InsertModeChanged { index } => {
                debug!(index = ?index, "Insert index changed");
            }
            Notification::ReplayFinished {
                session_id,
                outcome,
            } => info!(session_id = %session_id, outcome = ?outcome, "Replay finished"),
            Notification::ProfileKeysToggled { enabled } => {
                info!(enabled, "Profile hotkeys toggled");
                self.config.profiles.hotkeys_enabled = enabled;
                self.config.save_to(&self.config_path)?;
            }
            Notification::ProfileRequested { name, trigger } => {
                self.load_profile(&name, trigger).await?;
            }
        }
        Ok(())
    }

    /// Switch to profile `name` and replay it once `trigger` is released.
    ///
    /// The session's current list is saved to the outgoing profile first.
    /// `name` only becomes the active profile after the session accepted it.
    #[instrument(skip(self))]
    async fn load_profile(&mut self, name: &str, trigger: String) -> AppResult<()> {
        if !self.profiles.exists(name) {
            return Err(AppError::ProfileError {
                name: name.to_string(),
                reason: "Profile not found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let current = self.snapshot(name).await?;
        save_actions(&self.profiles, &self.active_profile, current)?;
        debug!(profile = %self.active_profile, "Outgoing profile saved");

        let profile = self.profiles.load(name)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(
            name,
            SessionCommand::ApplyProfile {
                name: name.to_string(),
                profile: Box::new(profile),
                trigger: Some(trigger),
                reply: reply_tx,
            },
        )
        .await?;

        let applied = reply_rx.await.map_err(|e| AppError::ProfileError {
            name: name.to_string(),
            reason: format!("Session dropped the request: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        applied?;

        info!(from = %self.active_profile, to = name, "Active profile switched");
        self.active_profile = name.to_string();
        Ok(())
    }

    /// Copy of the session's current action list.
    async fn snapshot(&self, name: &str) -> AppResult<ActionList> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(name, SessionCommand::Snapshot(reply_tx)).await?;
        reply_rx.await.map_err(|e| AppError::ProfileError {
            name: name.to_string(),
            reason: format!("Session dropped the snapshot request: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn send(&self, name: &str, command: SessionCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ProfileError {
                name: name.to_string(),
                reason: format!("Session not running: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Store `actions` in profile `name`, keeping its hotkey and options.
#[track_caller]
pub(crate) fn save_actions(
    profiles: &ProfileStore,
    name: &str,
    actions: ActionList,
) -> AppResult<()> {
    let mut profile = profiles.load_or_default(name)?;
    profile.actions = actions;
    profiles.save(name, &profile)
}
