use core_graphics::display::CGWarpMouseCursorPosition;
use core_graphics::geometry::CGPoint;
use objc2_app_kit::NSEvent;

use crate::core::Point;

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGAssociateMouseAndMouseCursorPosition(connected: u32) -> i32;
}

/// Current cursor position as reported by AppKit: bottom-left origin,
/// y grows upward.
pub fn cursor_position() -> Point {
    let location = unsafe { NSEvent::mouseLocation() };
    Point::new(location.x, location.y)
}

/// Warp the cursor. `point` is in Core Graphics coordinates: top-left
/// origin, y grows downward. After the warp, mouse input is re-associated
/// with the cursor so subsequent events are not suppressed.
pub fn warp_cursor(point: Point) {
    let cg_point = CGPoint::new(point.x, point.y);
    let result = unsafe { CGWarpMouseCursorPosition(cg_point) };
    if result != 0 {
        tracing::warn!(
            "Failed to warp cursor to ({}, {}): error {}",
            point.x,
            point.y,
            result
        );
    } else {
        tracing::debug!("Warped cursor to ({}, {})", point.x, point.y);
    }

    unsafe {
        CGAssociateMouseAndMouseCursorPosition(1);
    }
}
