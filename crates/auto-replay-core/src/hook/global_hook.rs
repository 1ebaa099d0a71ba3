use crate::{CoreResult, hook::HookDispatcher};

use std::sync::Arc;

use tracing::{info, instrument, warn};

/// OS glue that delivers raw input to a [`HookDispatcher`].
pub trait HookBackend: Send {
    /// Install the keyboard and mouse hooks and route them to `dispatcher`.
    ///
    /// Must fail with [`crate::CoreError::HookInstallFailed`] if either hook
    /// cannot be installed.
    fn install(&mut self, dispatcher: Arc<HookDispatcher>) -> CoreResult<()>;

    /// Remove the hooks. Called at most once per successful install.
    fn uninstall(&mut self);
}

/// Owns the hook lifecycle. Hooks are removed when this is dropped.
pub struct GlobalHook<B: HookBackend> {
    backend: B,
    dispatcher: Arc<HookDispatcher>,
    installed: bool,
}

impl<B: HookBackend> GlobalHook<B> {
    /// Wrap a backend. Nothing is installed until [`GlobalHook::start`].
    pub fn new(backend: B, dispatcher: Arc<HookDispatcher>) -> Self {
        Self {
            backend,
            dispatcher,
            installed: false,
        }
    }

    /// Install the hooks if they are not installed yet.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        if self.installed {
            return Ok(());
        }

        self.backend.install(Arc::clone(&self.dispatcher))?;
        self.installed = true;

        info!("Input hooks installed");
        Ok(())
    }

    /// Remove the hooks if they are installed.
    ///
    /// Key-ups that happen while detached are never seen, so every key is
    /// marked up again.
    #[instrument(skip(self))]
    pub fn stop(&mut self) {
        if !self.installed {
            return;
        }

        self.backend.uninstall();
        self.dispatcher.keyboard().reset();
        self.installed = false;

        info!("Input hooks removed");
    }

    /// Whether the hooks are currently installed.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Dispatcher the hooks feed.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.dispatcher
    }
}

impl<B: HookBackend> Drop for GlobalHook<B> {
    fn drop(&mut self) {
        if self.installed {
            warn!("Input hooks still installed on drop, removing");
            self.stop();
        }
    }
}
