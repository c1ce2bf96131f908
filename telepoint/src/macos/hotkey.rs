use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop, CFRunLoopSource};
use core_graphics::event::{
    CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
    CGEventType, CallbackResult, EventField,
};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

/// macOS virtual key codes for every key a shortcut may use. Key codes
/// outside this table are unsupported and leave no binding active.
const KEY_TABLE: &[(u16, &str)] = &[
    // Letters
    (0x00, "a"),
    (0x0B, "b"),
    (0x08, "c"),
    (0x02, "d"),
    (0x0E, "e"),
    (0x03, "f"),
    (0x05, "g"),
    (0x04, "h"),
    (0x22, "i"),
    (0x26, "j"),
    (0x28, "k"),
    (0x25, "l"),
    (0x2E, "m"),
    (0x2D, "n"),
    (0x1F, "o"),
    (0x23, "p"),
    (0x0C, "q"),
    (0x0F, "r"),
    (0x01, "s"),
    (0x11, "t"),
    (0x20, "u"),
    (0x09, "v"),
    (0x0D, "w"),
    (0x07, "x"),
    (0x10, "y"),
    (0x06, "z"),
    // Numbers
    (0x12, "1"),
    (0x13, "2"),
    (0x14, "3"),
    (0x15, "4"),
    (0x17, "5"),
    (0x16, "6"),
    (0x1A, "7"),
    (0x1C, "8"),
    (0x19, "9"),
    (0x1D, "0"),
    // Special keys
    (0x24, "return"),
    (0x30, "tab"),
    (0x31, "space"),
    (0x33, "delete"),
    (0x35, "escape"),
    (0x7B, "left"),
    (0x7C, "right"),
    (0x7D, "down"),
    (0x7E, "up"),
    (0x7A, "f1"),
    (0x78, "f2"),
    (0x63, "f3"),
    (0x76, "f4"),
    (0x60, "f5"),
    (0x61, "f6"),
    (0x62, "f7"),
    (0x64, "f8"),
    (0x65, "f9"),
    (0x6D, "f10"),
    (0x67, "f11"),
    (0x6F, "f12"),
    // Punctuation
    (0x1B, "minus"),
    (0x18, "equal"),
    (0x21, "leftbracket"),
    (0x1E, "rightbracket"),
    (0x2A, "backslash"),
    (0x29, "semicolon"),
    (0x27, "quote"),
    (0x2B, "comma"),
    (0x2F, "period"),
    (0x2C, "slash"),
    (0x32, "grave"),
];

/// Look up the name of a supported key. `None` means the code is not a
/// supported physical key.
pub fn key_name(code: u16) -> Option<&'static str> {
    KEY_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

pub fn key_code(name: &str) -> Option<u16> {
    let lower = name.to_lowercase();
    let lookup = match lower.as_str() {
        "enter" => "return",
        "backspace" => "delete",
        "esc" => "escape",
        other => other,
    };
    KEY_TABLE
        .iter()
        .find(|(_, n)| *n == lookup)
        .map(|(c, _)| *c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub cmd: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShortcutBinding {
    pub key_code: u16,
    pub modifiers: Modifiers,
}

pub fn parse_shortcut(key_str: &str) -> Result<ShortcutBinding, String> {
    let parts: Vec<&str> = key_str.split('-').collect();
    if parts.is_empty() {
        return Err("Empty key string".to_string());
    }

    let mut modifiers = Modifiers::default();
    let key_part = parts.last().unwrap();

    for part in &parts[..parts.len() - 1] {
        match part.to_lowercase().as_str() {
            "cmd" | "super" | "command" => modifiers.cmd = true,
            "alt" | "opt" | "option" => modifiers.alt = true,
            "ctrl" | "control" => modifiers.ctrl = true,
            "shift" => modifiers.shift = true,
            _ => return Err(format!("Unknown modifier: {}", part)),
        }
    }

    let key_code =
        key_code(key_part).ok_or_else(|| format!("Unsupported key: {}", key_part))?;

    Ok(ShortcutBinding {
        key_code,
        modifiers,
    })
}

pub fn format_shortcut(binding: &ShortcutBinding) -> String {
    let mut parts = Vec::new();
    if binding.modifiers.cmd {
        parts.push("cmd");
    }
    if binding.modifiers.alt {
        parts.push("alt");
    }
    if binding.modifiers.ctrl {
        parts.push("ctrl");
    }
    if binding.modifiers.shift {
        parts.push("shift");
    }
    parts.push(key_name(binding.key_code).unwrap_or("unsupported"));
    parts.join("-")
}

/// Marker event sent to the main thread when the bound shortcut fires.
#[derive(Debug, Clone, Copy)]
pub struct HotkeyTrigger;

/// Owns the keyboard event tap for the single active shortcut. Rebinding
/// tears the previous tap down completely before installing the new one,
/// so two bindings are never live at once.
pub struct HotkeyManager {
    binding: Option<ShortcutBinding>,
    trigger_tx: mpsc::Sender<HotkeyTrigger>,
    tap: Option<HotkeyTap>,
}

impl HotkeyManager {
    pub fn new(trigger_tx: mpsc::Sender<HotkeyTrigger>) -> Self {
        Self {
            binding: None,
            trigger_tx,
            tap: None,
        }
    }

    pub fn active_binding(&self) -> Option<ShortcutBinding> {
        self.binding
    }

    /// Replace the active shortcut. An unsupported key code or a tap
    /// creation failure is logged and leaves no binding active; the daemon
    /// keeps running either way.
    pub fn rebind(&mut self, binding: Option<ShortcutBinding>) {
        self.tap = None;
        self.binding = None;

        let Some(binding) = binding else {
            tracing::info!("No shortcut configured");
            return;
        };

        if key_name(binding.key_code).is_none() {
            tracing::warn!(
                "Unsupported key code {} in shortcut, no binding active",
                binding.key_code
            );
            return;
        }

        match self.create_tap(binding) {
            Ok(tap) => {
                tracing::info!("Shortcut bound: {}", format_shortcut(&binding));
                self.tap = Some(tap);
                self.binding = Some(binding);
            }
            Err(e) => {
                tracing::warn!("Failed to bind {}: {}", format_shortcut(&binding), e);
            }
        }
    }

    fn create_tap(&self, binding: ShortcutBinding) -> Result<HotkeyTap, String> {
        let tx = self.trigger_tx.clone();

        let tap = CGEventTap::new(
            CGEventTapLocation::Session,
            CGEventTapPlacement::HeadInsertEventTap,
            CGEventTapOptions::Default,
            vec![CGEventType::KeyDown],
            move |_proxy, _event_type, event| {
                let key_code =
                    event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
                let flags = event.get_flags();

                let modifiers = Modifiers {
                    cmd: flags.contains(CGEventFlags::CGEventFlagCommand),
                    alt: flags.contains(CGEventFlags::CGEventFlagAlternate),
                    ctrl: flags.contains(CGEventFlags::CGEventFlagControl),
                    shift: flags.contains(CGEventFlags::CGEventFlagShift),
                };

                if key_code == binding.key_code && modifiers == binding.modifiers {
                    tracing::debug!("Shortcut triggered: {}", format_shortcut(&binding));
                    if tx.send(HotkeyTrigger).is_err() {
                        tracing::error!("Failed to send hotkey trigger");
                    }
                    return CallbackResult::Drop;
                }

                CallbackResult::Keep
            },
        )
        .map_err(|_| {
            "Failed to create event tap. Make sure Accessibility permission is granted."
        })?;

        tap.enable();

        let source = tap
            .mach_port()
            .create_runloop_source(0)
            .map_err(|_| "Failed to create run loop source")?;

        CFRunLoop::get_current().add_source(&source, unsafe { kCFRunLoopCommonModes });

        Ok(HotkeyTap {
            _tap: tap,
            _source: source,
        })
    }
}

struct HotkeyTap {
    _tap: CGEventTap<'static>,
    _source: CFRunLoopSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let binding = parse_shortcut("a").unwrap();
        assert_eq!(binding.key_code, 0x00);
        assert_eq!(binding.modifiers, Modifiers::default());
    }

    #[test]
    fn test_parse_with_modifiers() {
        let binding = parse_shortcut("cmd-shift-f1").unwrap();
        assert_eq!(binding.key_code, 0x7A);
        assert!(binding.modifiers.cmd);
        assert!(binding.modifiers.shift);
        assert!(!binding.modifiers.alt);
        assert!(!binding.modifiers.ctrl);
    }

    #[test]
    fn test_parse_modifier_aliases() {
        assert!(parse_shortcut("super-a").unwrap().modifiers.cmd);
        assert!(parse_shortcut("command-a").unwrap().modifiers.cmd);
        assert!(parse_shortcut("opt-a").unwrap().modifiers.alt);
        assert!(parse_shortcut("option-a").unwrap().modifiers.alt);
        assert!(parse_shortcut("control-a").unwrap().modifiers.ctrl);
    }

    #[test]
    fn test_parse_key_aliases() {
        assert_eq!(parse_shortcut("enter").unwrap().key_code, 0x24);
        assert_eq!(parse_shortcut("return").unwrap().key_code, 0x24);
        assert_eq!(parse_shortcut("esc").unwrap().key_code, 0x35);
        assert_eq!(parse_shortcut("backspace").unwrap().key_code, 0x33);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let binding = parse_shortcut("ALT-Return").unwrap();
        assert!(binding.modifiers.alt);
        assert_eq!(binding.key_code, 0x24);
    }

    #[test]
    fn test_parse_error_unknown_key() {
        assert!(parse_shortcut("alt-unknown").is_err());
    }

    #[test]
    fn test_parse_error_unknown_modifier() {
        assert!(parse_shortcut("meta-a").is_err());
    }

    #[test]
    fn test_unsupported_key_code_has_no_name() {
        assert_eq!(key_name(0xFF), None);
        assert_eq!(key_name(0x7A), Some("f1"));
    }

    #[test]
    fn test_key_table_roundtrip() {
        for (code, name) in KEY_TABLE {
            assert_eq!(key_code(name), Some(*code), "table entry: {}", name);
            assert_eq!(key_name(*code), Some(*name));
        }
    }

    #[test]
    fn test_format_shortcut() {
        let binding = ShortcutBinding {
            key_code: 0x31,
            modifiers: Modifiers {
                cmd: true,
                alt: true,
                ctrl: true,
                shift: true,
            },
        };
        assert_eq!(format_shortcut(&binding), "cmd-alt-ctrl-shift-space");
    }

    #[test]
    fn test_parse_format_roundtrip() {
        let inputs = ["a", "alt-1", "cmd-shift-f1", "ctrl-grave"];
        for input in inputs {
            let binding = parse_shortcut(input).unwrap();
            let formatted = format_shortcut(&binding);
            let reparsed = parse_shortcut(&formatted).unwrap();
            assert_eq!(binding, reparsed, "roundtrip failed for: {}", input);
        }
    }

    #[test]
    fn test_rebind_none_clears_binding() {
        let (tx, _rx) = mpsc::channel();
        let mut manager = HotkeyManager::new(tx);
        manager.rebind(None);
        assert_eq!(manager.active_binding(), None);
    }

    #[test]
    fn test_rebind_unsupported_key_leaves_no_binding() {
        let (tx, _rx) = mpsc::channel();
        let mut manager = HotkeyManager::new(tx);
        manager.rebind(Some(ShortcutBinding {
            key_code: 0xFF,
            modifiers: Modifiers::default(),
        }));
        assert_eq!(manager.active_binding(), None);
    }
}
