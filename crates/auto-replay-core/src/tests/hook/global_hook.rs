use crate::{
    CoreError, CoreResult,
    hook::{GlobalHook, HookBackend, HookDispatcher, HookFlags, KeyboardState, RawKeyEvent},
    keys::{HotkeyMatcher, RawKeyCode, translator::VK_LCONTROL},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

use error_location::ErrorLocation;

#[derive(Default)]
struct Counters {
    installs: AtomicUsize,
    uninstalls: AtomicUsize,
}

struct CountingBackend {
    counters: Arc<Counters>,
    fail: bool,
}

impl HookBackend for CountingBackend {
    fn install(&mut self, _dispatcher: Arc<HookDispatcher>) -> CoreResult<()> {
        if self.fail {
            return Err(CoreError::HookInstallFailed {
                reason: "denied".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.counters.installs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn uninstall(&mut self) {
        self.counters.uninstalls.fetch_add(1, Ordering::SeqCst);
    }
}

fn hook(fail: bool) -> (GlobalHook<CountingBackend>, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let dispatcher = Arc::new(HookDispatcher::new(
        Arc::new(HookFlags::default()),
        Arc::new(KeyboardState::new()),
        Arc::new(HotkeyMatcher::default()),
    ));
    let backend = CountingBackend {
        counters: Arc::clone(&counters),
        fail,
    };
    (GlobalHook::new(backend, dispatcher), counters)
}

/// WHAT: start and stop are idempotent
/// WHY: Double installation would chain the hook twice
#[test]
#[allow(clippy::unwrap_used)]
fn given_hook_when_started_and_stopped_twice_then_backend_called_once_each() {
    // Given
    let (mut hook, counters) = hook(false);

    // When
    hook.start().unwrap();
    hook.start().unwrap();
    hook.stop();
    hook.stop();

    // Then
    assert_eq!(counters.installs.load(Ordering::SeqCst), 1);
    assert_eq!(counters.uninstalls.load(Ordering::SeqCst), 1);
    assert!(!hook.is_installed());
}

/// WHAT: Dropping an installed hook uninstalls it
/// WHY: A dangling hook chain outlives the process otherwise
#[test]
#[allow(clippy::unwrap_used)]
fn given_installed_hook_when_dropped_then_uninstalled() {
    // Given
    let (mut hook, counters) = hook(false);
    hook.start().unwrap();

    // When
    drop(hook);

    // Then
    assert_eq!(counters.uninstalls.load(Ordering::SeqCst), 1);
}

/// WHAT: Installation failure surfaces as HookInstallFailed
/// WHY: The host treats this as a fatal startup error
#[test]
fn given_failing_backend_when_starting_then_error_and_not_installed() {
    // Given
    let (mut hook, counters) = hook(true);

    // When
    let result = hook.start();

    // Then
    assert!(matches!(result, Err(CoreError::HookInstallFailed { .. })));
    assert!(!hook.is_installed());
    drop(hook);
    assert_eq!(counters.uninstalls.load(Ordering::SeqCst), 0);
}

/// WHAT: Stopping the hook forgets which keys were held
/// WHY: A key released while detached would otherwise stay down and leak
/// into hotkey composition after the next start
#[test]
#[allow(clippy::unwrap_used)]
fn given_ctrl_held_when_hook_stopped_then_key_state_cleared() {
    // Given
    let (mut hook, _counters) = hook(false);
    hook.start().unwrap();
    hook.dispatcher().on_keyboard(RawKeyEvent {
        code: RawKeyCode(VK_LCONTROL),
        pressed: true,
        at: Instant::now(),
    });
    assert!(hook.dispatcher().keyboard().ctrl());

    // When
    hook.stop();
    hook.start().unwrap();

    // Then
    assert!(!hook.dispatcher().keyboard().ctrl());
}
