use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::macos::{Modifiers, ShortcutBinding};

pub const DEFAULT_SAVE_INTERVAL: f64 = 5.0;

/// Default shortcut: cmd-shift-f1.
pub fn default_shortcut() -> ShortcutBinding {
    ShortcutBinding {
        key_code: 0x7A,
        modifiers: Modifiers {
            cmd: true,
            shift: true,
            ..Default::default()
        },
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub save_interval: f64,
    pub shortcut: Option<ShortcutBinding>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_interval: DEFAULT_SAVE_INTERVAL,
            shortcut: Some(default_shortcut()),
        }
    }
}

/// What changed. Receivers re-read the store rather than carrying values
/// through the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    SaveInterval,
    Shortcut,
}

/// Owns the daemon settings, persists them to a JSON file on every
/// mutation, and pushes a typed change notification for the main loop to
/// drain. Mutations and reads all happen on the main thread.
pub struct SettingsStore {
    settings: Settings,
    path: Option<PathBuf>,
    change_tx: Sender<SettingsChange>,
}

impl SettingsStore {
    /// Load settings from the default config location. A missing file means
    /// defaults; an unreadable or malformed file is logged and treated the
    /// same way.
    pub fn load(change_tx: Sender<SettingsChange>) -> Self {
        Self::with_path(default_settings_path(), change_tx)
    }

    pub fn with_path(path: Option<PathBuf>, change_tx: Sender<SettingsChange>) -> Self {
        let settings = path
            .as_deref()
            .and_then(|p| match fs::read_to_string(p) {
                Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                    Ok(settings) => Some(settings),
                    Err(e) => {
                        tracing::warn!("Malformed settings file {:?}, using defaults: {}", p, e);
                        None
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => {
                    tracing::warn!("Failed to read settings file {:?}: {}", p, e);
                    None
                }
            })
            .map(|mut s| {
                if s.save_interval <= 0.0 {
                    s.save_interval = DEFAULT_SAVE_INTERVAL;
                }
                s
            })
            .unwrap_or_default();

        Self {
            settings,
            path,
            change_tx,
        }
    }

    pub fn save_interval(&self) -> f64 {
        self.settings.save_interval
    }

    pub fn shortcut(&self) -> Option<ShortcutBinding> {
        self.settings.shortcut
    }

    pub fn set_save_interval(&mut self, seconds: f64) {
        self.settings.save_interval = seconds;
        self.persist();
        self.notify(SettingsChange::SaveInterval);
    }

    pub fn set_shortcut(&mut self, shortcut: Option<ShortcutBinding>) {
        self.settings.shortcut = shortcut;
        self.persist();
        self.notify(SettingsChange::Shortcut);
    }

    fn persist(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let write = || -> anyhow::Result<()> {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let json = serde_json::to_string_pretty(&self.settings)?;
            fs::write(path, json)?;
            Ok(())
        };
        if let Err(e) = write() {
            tracing::warn!("Failed to persist settings to {:?}: {}", path, e);
        }
    }

    fn notify(&self, change: SettingsChange) {
        if self.change_tx.send(change).is_err() {
            tracing::debug!("Settings change dropped (no receiver)");
        }
    }
}

fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("telepoint").join("settings.json"))
}
