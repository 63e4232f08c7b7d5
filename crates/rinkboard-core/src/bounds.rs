//! Rink geometry: world bounds and coordinate clamping.
//!
//! World coordinates are in meters with the center spot at the origin.

use kurbo::{Point, Rect};

/// Physical extent of the rink.
pub const BOUNDS: Rect = Rect::new(-15.0, -7.5, 15.0, 7.5);

/// Distance kept between a spawned token and the boards.
pub const SPAWN_MARGIN: f64 = 0.6;

/// Distance of a goalkeeper's home spot from its own end.
pub const GOAL_LINE_OFFSET: f64 = 2.0;

/// Clamp a value into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Area new tokens may be spawned in (bounds shrunk by [`SPAWN_MARGIN`]).
pub fn spawn_area() -> Rect {
    BOUNDS.inset(-SPAWN_MARGIN)
}

/// Clamp a point into the given rectangle.
pub fn clamp_to(point: Point, area: Rect) -> Point {
    Point::new(
        clamp(point.x, area.x0, area.x1),
        clamp(point.y, area.y0, area.y1),
    )
}

/// Clamp a point into the rink.
pub fn clamp_to_bounds(point: Point) -> Point {
    clamp_to(point, BOUNDS)
}
