use crate::core::Point;
use crate::macos::ScreenGeometry;

/// Trait over the OS cursor and display primitives.
/// This abstraction allows mocking in tests.
///
/// Note the coordinate conventions: `cursor_position` reports in
/// bottom-left-origin (y-up) space, while `warp_cursor` expects
/// top-left-origin (y-down) space. The teleport engine converts between
/// the two.
pub trait CursorSystem {
    /// Cursor position in measurement space (bottom-left origin, y-up).
    fn cursor_position(&self) -> Point;
    /// Move the cursor. `point` is in warp space (top-left origin, y-down).
    fn warp_cursor(&self, point: Point);
    /// The primary display, queried live. `None` when no display is active.
    fn primary_display(&self) -> Option<ScreenGeometry>;
    /// All active displays, queried live.
    fn displays(&self) -> Vec<ScreenGeometry>;
}

/// macOS implementation of CursorSystem
#[derive(Default)]
pub struct MacosCursorSystem;

impl CursorSystem for MacosCursorSystem {
    fn cursor_position(&self) -> Point {
        crate::macos::cursor_position()
    }

    fn warp_cursor(&self, point: Point) {
        crate::macos::warp_cursor(point);
    }

    fn primary_display(&self) -> Option<ScreenGeometry> {
        crate::macos::get_primary_display()
    }

    fn displays(&self) -> Vec<ScreenGeometry> {
        crate::macos::get_all_displays()
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::macos::Bounds;
    use std::cell::{Cell, RefCell};

    /// Fake cursor backend. By default it honors warps exactly, translating
    /// the warped point back into measurement space against the primary
    /// display so `cursor_position` reports what a real warp would produce.
    pub struct MockCursorSystem {
        pub displays: Vec<ScreenGeometry>,
        position: Cell<Point>,
        warps: RefCell<Vec<Point>>,
        /// Offset added to the cursor position after every warp, to
        /// simulate a warp landing off target.
        pub warp_error: Point,
    }

    impl MockCursorSystem {
        pub fn new() -> Self {
            Self {
                displays: vec![create_test_display(1, 0.0, 0.0, 1920.0, 1080.0)],
                position: Cell::new(Point::default()),
                warps: RefCell::new(Vec::new()),
                warp_error: Point::default(),
            }
        }

        pub fn without_displays(mut self) -> Self {
            self.displays.clear();
            self
        }

        pub fn with_cursor_at(self, position: Point) -> Self {
            self.position.set(position);
            self
        }

        pub fn with_warp_error(mut self, error: Point) -> Self {
            self.warp_error = error;
            self
        }

        /// Every warp point received, in warp space.
        pub fn warps(&self) -> Vec<Point> {
            self.warps.borrow().clone()
        }

        pub fn set_position(&self, position: Point) {
            self.position.set(position);
        }
    }

    impl Default for MockCursorSystem {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CursorSystem for MockCursorSystem {
        fn cursor_position(&self) -> Point {
            self.position.get()
        }

        fn warp_cursor(&self, point: Point) {
            self.warps.borrow_mut().push(point);

            // Mirror what the OS does: the warp lands in warp space, and
            // subsequent position reads are flipped back into measurement
            // space against the primary display height.
            let landed = match self.primary_display() {
                Some(primary) => Point::new(point.x, primary.frame.height - point.y),
                None => point,
            };
            self.position.set(Point::new(
                landed.x + self.warp_error.x,
                landed.y + self.warp_error.y,
            ));
        }

        fn primary_display(&self) -> Option<ScreenGeometry> {
            self.displays.iter().find(|d| d.is_main).cloned()
        }

        fn displays(&self) -> Vec<ScreenGeometry> {
            self.displays.clone()
        }
    }

    pub fn create_test_display(
        id: u32,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> ScreenGeometry {
        ScreenGeometry {
            id,
            frame: Bounds {
                x,
                y,
                width,
                height,
            },
            scale_factor: 2.0,
            is_main: id == 1,
        }
    }
}
