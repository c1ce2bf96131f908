use crate::core::Point;

/// Convert between the coordinate space cursor positions are reported in
/// (bottom-left origin, y grows upward) and the space the warp primitive
/// expects (top-left origin, y grows downward).
///
/// The x axis is shared; y is flipped against the reference display's
/// height. Applying the conversion twice with the same height returns the
/// original point, so one function serves both directions.
///
/// The reference height is always the primary display's, even when the
/// cursor sits on another display; per-monitor scale factors are not
/// corrected for. Known limitation of the single-display flip.
pub fn to_warp_space(point: Point, reference_height: f64) -> Point {
    Point::new(point.x, reference_height - point.y)
}
