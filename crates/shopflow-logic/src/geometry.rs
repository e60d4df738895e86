//! Point and segment math used by perception and layout handling.
//!
//! Pure functions, no state. `segments_intersect` tests for a *proper*
//! crossing: segments that merely touch at an endpoint or overlap
//! colinearly do not count. Sightlines are cast from points that may sit
//! exactly on a wall (spawn positions on an entrance span), so touching
//! must not block them.

use serde::{Deserialize, Serialize};

/// A 2D point in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Cross product of (b - a) and (c - a); sign gives the turn direction.
fn cross(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let len_sq = a.distance_squared(&b);
    if len_sq <= f32::EPSILON {
        return p.distance(&a);
    }
    let t = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    p.distance(&proj)
}

/// Whether segment `p1`-`p2` properly crosses segment `p3`-`p4`.
///
/// Endpoint contact and colinear overlap return `false`.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn point_segment_distance_interior() {
        let d = point_segment_distance(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-6);
    }

    #[test]
    fn point_segment_distance_past_endpoint() {
        let d = point_segment_distance(
            Point::new(13.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn point_segment_distance_degenerate_segment() {
        let d = point_segment_distance(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
        ));
    }

    #[test]
    fn endpoint_touch_is_not_a_crossing() {
        // Sightline starting exactly on a wall must not be blocked by it.
        assert!(!segments_intersect(
            Point::new(5.0, 0.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        ));
    }

    #[test]
    fn colinear_overlap_is_not_a_crossing() {
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(15.0, 0.0),
        ));
    }

    #[test]
    fn wall_blocks_sightline() {
        // Vertical wall between viewer and target.
        assert!(segments_intersect(
            Point::new(0.0, 5.0),
            Point::new(20.0, 5.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ));
    }
}
