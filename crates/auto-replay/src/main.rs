//! Auto-Replay: global input recorder and replayer with hotkey control.

mod app;
mod config;
mod error;
mod profile_store;
mod rdev_hook;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    profile_store::ProfileStore,
    rdev_hook::RdevHookBackend,
};

use crate::config::Config;

use std::sync::{Arc, Mutex};

use auto_replay_core::{EnigoSynthesizer, GlobalHook, InputContext, NoSelection, Session};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "auto_replay=debug,auto_replay_core=debug";

/// Per-subscriber capacity of the hook event channel.
const EVENT_CAPACITY: usize = 1024;

/// Capacity of the session command channel.
const COMMAND_CAPACITY: usize = 32;

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config_path = match Config::default_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to locate config: {:?}", e);
            std::process::exit(1);
        }
    };

    let config = match Config::load_from(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let profiles = match config.profiles_dir() {
        Ok(dir) => ProfileStore::new(dir),
        Err(e) => {
            error!("Failed to locate profile directory: {:?}", e);
            std::process::exit(1);
        }
    };

    let synthesizer = match EnigoSynthesizer::new() {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to create input synthesizer: {:?}", e);
            std::process::exit(1);
        }
    };

    let context = InputContext::new(
        config.hotkeys.clone(),
        config.profiles.hotkeys_enabled,
        synthesizer,
    );
    context
        .matcher
        .register_profile_hotkeys(profiles.hotkeys());

    let dispatcher = Arc::new(context.dispatcher());
    let events_rx = dispatcher.subscribe(EVENT_CAPACITY);

    let mut hook = GlobalHook::new(RdevHookBackend::new(), dispatcher);
    if let Err(e) = hook.start() {
        error!("Failed to install input hook: {:?}", e);
        std::process::exit(1);
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut session = Session::new(
            &context,
            config.recording,
            config.replay,
            Box::new(NoSelection),
            notify_tx,
        );

        let active_profile = config.active_profile().to_string();
        if profiles.exists(&active_profile) {
            match profiles.load(&active_profile) {
                Ok(profile) => {
                    if let Err(e) = session.apply_profile(&active_profile, profile, None) {
                        warn!(error = ?e, "Active profile not applied, starting empty");
                    }
                }
                Err(e) => warn!(error = ?e, "Active profile not loaded, starting empty"),
            }
        }

        let session = tokio::spawn(session.run(events_rx, command_rx, shutdown_rx));

        let app = App {
            config,
            config_path,
            profiles,
            active_profile,
            command_tx,
            notify_rx,
            shutdown_tx,
            session,
        };

        if let Err(e) = app.run().await {
            error!(error = ?e, "App error");
        }
    });

    hook.stop();
    info!("Input hook removed");
}
