use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // Position operations
    Save,
    Teleport,
    GetPosition,

    // Settings operations
    SetInterval { seconds: f64 },
    SetShortcut { key: String },
    ClearShortcut,
    GetSettings,

    // Control
    Quit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Error { message: String },
    Position { position: Option<PositionInfo> },
    Settings { settings: SettingsInfo },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsInfo {
    /// Seconds the cursor must stay put before its position is saved.
    pub save_interval: f64,
    /// Active shortcut in `cmd-shift-f1` form, if one is bound.
    pub shortcut: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_roundtrip() {
        let commands = [
            Command::Save,
            Command::Teleport,
            Command::GetPosition,
            Command::SetInterval { seconds: 2.5 },
            Command::SetShortcut {
                key: "cmd-shift-f1".to_string(),
            },
            Command::ClearShortcut,
            Command::GetSettings,
            Command::Quit,
        ];

        for cmd in commands {
            let json = serde_json::to_string(&cmd).unwrap();
            let back: Command = serde_json::from_str(&json).unwrap();
            assert_eq!(
                serde_json::to_string(&back).unwrap(),
                json,
                "roundtrip failed for {:?}",
                cmd
            );
        }
    }

    #[test]
    fn test_response_position_json_shape() {
        let response = Response::Position {
            position: Some(PositionInfo { x: 100.0, y: 250.5 }),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"type\":\"position\""));

        let back: Response = serde_json::from_str(&json).unwrap();
        match back {
            Response::Position { position: Some(p) } => {
                assert_eq!(p.x, 100.0);
                assert_eq!(p.y, 250.5);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_response_empty_position() {
        let json = serde_json::to_string(&Response::Position { position: None }).unwrap();
        let back: Response = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Response::Position { position: None }));
    }
}
