//! [`InputSynthesizer`] backed by `enigo`.
//!
//! `Enigo` is not `Send` on every platform, so one instance lives on a
//! dedicated worker thread and each call is a request/reply round trip.

use crate::{
    CoreError, CoreResult,
    action::MouseButton,
    keys::KeyStroke,
    replay::InputSynthesizer,
};

use std::{
    panic::Location,
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

enum Request {
    Key {
        stroke: KeyStroke,
        pressed: bool,
        reply: Sender<CoreResult<()>>,
    },
    MoveTo {
        x: i32,
        y: i32,
        reply: Sender<CoreResult<()>>,
    },
    Button {
        button: MouseButton,
        pressed: bool,
        reply: Sender<CoreResult<()>>,
    },
    Scroll {
        notches: i32,
        reply: Sender<CoreResult<()>>,
    },
    Cursor {
        reply: Sender<CoreResult<(i32, i32)>>,
    },
}

/// Handle to the enigo worker thread. The thread exits when this is dropped.
pub struct EnigoSynthesizer {
    requests: Sender<Request>,
}

impl EnigoSynthesizer {
    /// Start the worker and create its `Enigo` instance.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let (requests, rx) = mpsc::channel::<Request>();
        let (init_tx, init_rx) = mpsc::channel::<CoreResult<()>>();

        let caller = Location::caller();

        thread::Builder::new()
            .name("auto-replay-synth".to_string())
            .spawn(move || worker(rx, init_tx))
            .map_err(|e| CoreError::SynthesisFailed {
                reason: format!("Failed to spawn synthesis thread: {}", e),
                location: ErrorLocation::from(caller),
            })?;

        init_rx.recv().map_err(|e| CoreError::SynthesisFailed {
            reason: format!("Synthesis thread exited during startup: {}", e),
            location: ErrorLocation::from(caller),
        })??;

        info!("EnigoSynthesizer initialized");

        Ok(Self { requests })
    }

    #[track_caller]
    fn call<T>(&self, build: impl FnOnce(Sender<CoreResult<T>>) -> Request) -> CoreResult<T> {
        let caller = Location::caller();
        let (reply, response) = mpsc::channel();

        self.requests
            .send(build(reply))
            .map_err(|_| CoreError::SynthesisFailed {
                reason: "Synthesis thread is gone".to_string(),
                location: ErrorLocation::from(caller),
            })?;

        response.recv().map_err(|_| CoreError::SynthesisFailed {
            reason: "Synthesis thread dropped the request".to_string(),
            location: ErrorLocation::from(caller),
        })?
    }
}

impl InputSynthesizer for EnigoSynthesizer {
    fn key(&mut self, stroke: KeyStroke, pressed: bool) -> CoreResult<()> {
        self.call(|reply| Request::Key {
            stroke,
            pressed,
            reply,
        })
    }

    fn move_to(&mut self, x: i32, y: i32) -> CoreResult<()> {
        self.call(|reply| Request::MoveTo { x, y, reply })
    }

    fn button(&mut self, button: MouseButton, pressed: bool) -> CoreResult<()> {
        self.call(|reply| Request::Button {
            button,
            pressed,
            reply,
        })
    }

    fn scroll(&mut self, notches: i32) -> CoreResult<()> {
        self.call(|reply| Request::Scroll { notches, reply })
    }

    fn cursor_position(&mut self) -> CoreResult<(i32, i32)> {
        self.call(|reply| Request::Cursor { reply })
    }
}

fn worker(requests: Receiver<Request>, init: Sender<CoreResult<()>>) {
    let mut enigo = match Enigo::new(&Settings::default()) {
        Ok(enigo) => enigo,
        Err(e) => {
            let _ = init.send(Err(synthesis_failed(format!(
                "Failed to create Enigo: {}",
                e
            ))));
            return;
        }
    };
    if init.send(Ok(())).is_err() {
        return;
    }

    while let Ok(request) = requests.recv() {
        // A dropped reply receiver only means the caller gave up waiting.
        match request {
            Request::Key {
                stroke,
                pressed,
                reply,
            } => {
                let _ = reply.send(press_key(&mut enigo, stroke, pressed));
            }
            Request::MoveTo { x, y, reply } => {
                let result = enigo
                    .move_mouse(x, y, Coordinate::Abs)
                    .map_err(|e| synthesis_failed(format!("Failed to move cursor: {}", e)));
                let _ = reply.send(result);
            }
            Request::Button {
                button,
                pressed,
                reply,
            } => {
                let result = enigo
                    .button(enigo_button(button), direction(pressed))
                    .map_err(|e| {
                        synthesis_failed(format!("Failed to send {:?} button: {}", button, e))
                    });
                let _ = reply.send(result);
            }
            Request::Scroll { notches, reply } => {
                // enigo scrolls down for positive lengths.
                let result = enigo
                    .scroll(-notches, Axis::Vertical)
                    .map_err(|e| synthesis_failed(format!("Failed to scroll: {}", e)));
                let _ = reply.send(result);
            }
            Request::Cursor { reply } => {
                let result = enigo
                    .location()
                    .map_err(|e| synthesis_failed(format!("Failed to read cursor: {}", e)));
                let _ = reply.send(result);
            }
        }
    }

    debug!("Synthesis thread stopped");
}

#[track_caller]
fn synthesis_failed(reason: String) -> CoreError {
    CoreError::SynthesisFailed {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

fn direction(pressed: bool) -> Direction {
    if pressed {
        Direction::Press
    } else {
        Direction::Release
    }
}

fn enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

/// Scan-code injection. Extended keys go by virtual key so enigo sets the
/// extended flag.
#[cfg(target_os = "windows")]
fn press_key(enigo: &mut Enigo, stroke: KeyStroke, pressed: bool) -> CoreResult<()> {
    let result = if stroke.extended || stroke.scan == 0 {
        enigo.key(enigo::Key::Other(u32::from(stroke.code.0)), direction(pressed))
    } else {
        enigo.raw(stroke.scan, direction(pressed))
    };
    result.map_err(|e| synthesis_failed(format!("Failed to send key {}: {}", stroke.name(), e)))
}

#[cfg(not(target_os = "windows"))]
fn press_key(enigo: &mut Enigo, stroke: KeyStroke, pressed: bool) -> CoreResult<()> {
    let name = stroke.name();
    let Some(key) = portable_key(&name) else {
        tracing::warn!(key = %name, "Key has no portable mapping on this platform");
        return Err(CoreError::UnknownKey {
            name: name.into_owned(),
            location: ErrorLocation::from(Location::caller()),
        });
    };
    enigo
        .key(key, direction(pressed))
        .map_err(|e| synthesis_failed(format!("Failed to send key {}: {}", name, e)))
}

#[cfg(not(target_os = "windows"))]
fn portable_key(name: &str) -> Option<enigo::Key> {
    use enigo::Key;

    let key = match name {
        "Ctrl" => Key::Control,
        "Alt" => Key::Alt,
        "Shift" => Key::Shift,
        "Win" => Key::Meta,
        "Escape" => Key::Escape,
        "Enter" => Key::Return,
        "Space" => Key::Space,
        "Tab" => Key::Tab,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,
        "Left" => Key::LeftArrow,
        "Right" => Key::RightArrow,
        "Up" => Key::UpArrow,
        "Down" => Key::DownArrow,
        "CapsLock" => Key::CapsLock,
        "F1" => Key::F1,
        "F2" => Key::F2,
        "F3" => Key::F3,
        "F4" => Key::F4,
        "F5" => Key::F5,
        "F6" => Key::F6,
        "F7" => Key::F7,
        "F8" => Key::F8,
        "F9" => Key::F9,
        "F10" => Key::F10,
        "F11" => Key::F11,
        "F12" => Key::F12,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Unicode(c.to_ascii_lowercase()),
                _ => return None,
            }
        }
    };
    Some(key)
}
