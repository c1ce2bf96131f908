pub mod command;

pub use command::{Command, PositionInfo, Response, SettingsInfo};
