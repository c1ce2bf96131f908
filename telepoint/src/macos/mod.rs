mod accessibility;
mod cursor;
mod display;
mod hotkey;

pub use accessibility::*;
pub use cursor::*;
pub use display::*;
pub use hotkey::*;
