use crate::core::Point;

/// Single-slot holder for the last saved cursor position. Last write wins;
/// the slot is empty until the first save and is not persisted.
#[derive(Debug, Default)]
pub struct PositionStore {
    saved: Option<Point>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, position: Point) {
        self.saved = Some(position);
    }

    pub fn get(&self) -> Option<Point> {
        self.saved
    }
}
