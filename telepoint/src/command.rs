use std::cell::RefCell;

use telepoint_ipc::{Command, PositionInfo, Response, SettingsInfo};

use crate::core::{Point, PositionStore, SettingsChange, SettingsStore, StationaryDetector};
use crate::macos::{format_shortcut, parse_shortcut, HotkeyManager};
use crate::platform::CursorSystem;
use crate::teleport::TeleportEngine;

/// Process one IPC command against daemon state. Runs on the main thread;
/// settings mutations notify through the settings change channel, which the
/// main loop drains after this returns.
pub fn handle_command<S: CursorSystem>(
    cmd: &Command,
    system: &S,
    store: &RefCell<PositionStore>,
    settings: &RefCell<SettingsStore>,
    engine: &RefCell<TeleportEngine>,
    now: f64,
) -> Response {
    match cmd {
        Command::Save => {
            let position = system.cursor_position();
            store.borrow_mut().set(position);
            tracing::info!("Manual save: ({}, {})", position.x, position.y);
            Response::Position {
                position: Some(PositionInfo {
                    x: position.x,
                    y: position.y,
                }),
            }
        }
        Command::Teleport => match teleport_to_saved(system, store, engine, now) {
            Some(_) => Response::Ok,
            None => Response::Error {
                message: "No position saved yet".to_string(),
            },
        },
        Command::GetPosition => Response::Position {
            position: store
                .borrow()
                .get()
                .map(|p| PositionInfo { x: p.x, y: p.y }),
        },
        Command::GetSettings => {
            let settings = settings.borrow();
            Response::Settings {
                settings: SettingsInfo {
                    save_interval: settings.save_interval(),
                    shortcut: settings.shortcut().map(|b| format_shortcut(&b)),
                },
            }
        }
        Command::SetInterval { seconds } => {
            if !seconds.is_finite() || *seconds <= 0.0 {
                return Response::Error {
                    message: format!("Save interval must be positive, got {}", seconds),
                };
            }
            settings.borrow_mut().set_save_interval(*seconds);
            Response::Ok
        }
        Command::SetShortcut { key } => match parse_shortcut(key) {
            Ok(binding) => {
                settings.borrow_mut().set_shortcut(Some(binding));
                Response::Ok
            }
            Err(e) => Response::Error { message: e },
        },
        Command::ClearShortcut => {
            settings.borrow_mut().set_shortcut(None);
            Response::Ok
        }
        Command::Quit => {
            tracing::info!("Quit command received");
            Response::Ok
        }
    }
}

/// Teleport to the saved position, if there is one. Shared by the hotkey
/// trigger path and the IPC `teleport` command. An empty store is a no-op.
pub fn teleport_to_saved<S: CursorSystem>(
    system: &S,
    store: &RefCell<PositionStore>,
    engine: &RefCell<TeleportEngine>,
    now: f64,
) -> Option<Point> {
    let Some(target) = store.borrow().get() else {
        tracing::info!("No position saved yet, ignoring teleport");
        return None;
    };

    engine.borrow_mut().teleport(system, target, now);
    Some(target)
}

/// React to one settings change notification: an interval change restarts
/// the detector (stale accumulated duration never survives), a shortcut
/// change rebinds the hotkey. Each change touches only its own component.
pub fn apply_settings_change(
    change: SettingsChange,
    settings: &RefCell<SettingsStore>,
    detector: &RefCell<StationaryDetector>,
    hotkeys: &RefCell<HotkeyManager>,
) {
    match change {
        SettingsChange::SaveInterval => {
            let interval = settings.borrow().save_interval();
            detector.borrow_mut().restart(interval);
            tracing::info!("Save interval changed to {}s, tracking restarted", interval);
        }
        SettingsChange::Shortcut => {
            let shortcut = settings.borrow().shortcut();
            hotkeys.borrow_mut().rebind(shortcut);
        }
    }
}
