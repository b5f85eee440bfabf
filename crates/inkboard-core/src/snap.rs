//! Grid snapping for object placement.

use kurbo::Point;

/// Grid cell size in world pixels.
pub const GRID_SIZE: f64 = 10.0;

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point) -> Point {
    Point::new(
        (point.x / GRID_SIZE).round() * GRID_SIZE,
        (point.y / GRID_SIZE).round() * GRID_SIZE,
    )
}

/// Snap a point only when snapping is enabled.
pub fn maybe_snap(point: Point, enabled: bool) -> Point {
    if enabled { snap_to_grid(point) } else { point }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_rounds_to_nearest() {
        let snapped = snap_to_grid(Point::new(14.0, 16.0));
        assert!((snapped.x - 10.0).abs() < f64::EPSILON);
        assert!((snapped.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_midpoint_rounds_up() {
        let snapped = snap_to_grid(Point::new(15.0, -15.0));
        assert!((snapped.x - 20.0).abs() < f64::EPSILON);
        assert!((snapped.y + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_grid_point_unchanged() {
        let snapped = snap_to_grid(Point::new(30.0, 40.0));
        assert_eq!(snapped, Point::new(30.0, 40.0));
    }

    #[test]
    fn test_maybe_snap_disabled() {
        let point = Point::new(14.3, 16.7);
        assert_eq!(maybe_snap(point, false), point);
        assert_eq!(maybe_snap(point, true), Point::new(10.0, 20.0));
    }
}
