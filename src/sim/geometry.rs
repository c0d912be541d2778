//! Line/segment vs circle tests for blockade collisions
//!
//! All functions are pure and never divide by the segment length, so a
//! zero-length segment cannot produce NaN.

use glam::DVec2;

use crate::settings::CollisionMode;

/// Infinite-line test: does the line through `p1` and `p2` pass within `r`
/// of `center`?
///
/// Solves `a·t² + b·t + c = 0` for the parameterized line `p1 + t·(p2 - p1)`
/// and reports a non-negative discriminant. Points beyond either end of the
/// segment count, which makes this stricter than a bounded segment test.
///
/// A zero-length segment (`a == 0`) degenerates to a point-in-circle test.
pub fn segment_intersects_circle(p1: DVec2, p2: DVec2, center: DVec2, r: f64) -> bool {
    let d = p2 - p1;
    let f = p1 - center;

    let a = d.length_squared();
    let c = f.length_squared() - r * r;

    if a == 0.0 {
        return c <= 0.0;
    }

    let b = 2.0 * d.dot(f);
    let discriminant = b * b - 4.0 * a * c;
    discriminant >= 0.0
}

/// Distance from `p` to the closest point of segment `p1`-`p2`
pub fn distance_to_segment(p: DVec2, p1: DVec2, p2: DVec2) -> f64 {
    let seg = p2 - p1;
    let len_sq = seg.length_squared();

    if len_sq == 0.0 {
        return (p - p1).length();
    }

    let t = ((p - p1).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = p1 + seg * t;
    (p - closest).length()
}

/// Bounded segment test: does the segment itself come within `r` of `center`?
#[inline]
pub fn segment_circle_contact(p1: DVec2, p2: DVec2, center: DVec2, r: f64) -> bool {
    distance_to_segment(center, p1, p2) <= r
}

/// Dispatch on the configured collision mode
#[inline]
pub fn blockade_collision(mode: CollisionMode, p1: DVec2, p2: DVec2, center: DVec2, r: f64) -> bool {
    match mode {
        CollisionMode::InfiniteLine => segment_intersects_circle(p1, p2, center, r),
        CollisionMode::Segment => segment_circle_contact(p1, p2, center, r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_through_circle() {
        let c = DVec2::new(100.0, 100.0);
        assert!(segment_intersects_circle(
            DVec2::new(0.0, 100.0),
            DVec2::new(10.0, 100.0),
            c,
            40.0
        ));
    }

    #[test]
    fn test_line_missing_circle() {
        let c = DVec2::new(100.0, 100.0);
        // Horizontal line 50 units away from a 40-unit circle
        assert!(!segment_intersects_circle(
            DVec2::new(0.0, 150.0),
            DVec2::new(10.0, 150.0),
            c,
            40.0
        ));
    }

    #[test]
    fn test_tangent_line_counts_as_hit() {
        let c = DVec2::new(0.0, 0.0);
        assert!(segment_intersects_circle(
            DVec2::new(-5.0, 40.0),
            DVec2::new(5.0, 40.0),
            c,
            40.0
        ));
    }

    #[test]
    fn test_infinite_line_flags_extension() {
        // The short segment ends far before the circle, but its extension crosses it
        let p1 = DVec2::new(0.0, 0.0);
        let p2 = DVec2::new(5.0, 0.0);
        let c = DVec2::new(300.0, 0.0);
        assert!(segment_intersects_circle(p1, p2, c, 40.0));
        assert!(!segment_circle_contact(p1, p2, c, 40.0));
    }

    #[test]
    fn test_degenerate_segment_is_point_test() {
        let c = DVec2::new(400.0, 200.0);
        let inside = DVec2::new(410.0, 210.0);
        let outside = DVec2::new(400.0, 550.0);
        assert!(segment_intersects_circle(inside, inside, c, 40.0));
        assert!(!segment_intersects_circle(outside, outside, c, 40.0));
        assert!(segment_circle_contact(inside, inside, c, 40.0));
        assert!(!segment_circle_contact(outside, outside, c, 40.0));
    }

    #[test]
    fn test_distance_to_segment_clamps() {
        let p1 = DVec2::new(0.0, 0.0);
        let p2 = DVec2::new(10.0, 0.0);
        assert!((distance_to_segment(DVec2::new(5.0, 3.0), p1, p2) - 3.0).abs() < 1e-12);
        assert!((distance_to_segment(DVec2::new(13.0, 4.0), p1, p2) - 5.0).abs() < 1e-12);
        assert!((distance_to_segment(DVec2::new(-3.0, 0.0), p1, p1) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_blockade_collision_dispatch() {
        let p1 = DVec2::new(0.0, 0.0);
        let p2 = DVec2::new(5.0, 0.0);
        let c = DVec2::new(300.0, 0.0);
        assert!(blockade_collision(CollisionMode::InfiniteLine, p1, p2, c, 40.0));
        assert!(!blockade_collision(CollisionMode::Segment, p1, p2, c, 40.0));
    }
}
