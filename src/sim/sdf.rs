//! Signed distance helpers for rounded rectangles
//!
//! The track centreline and both band edges are rounded rectangles, so one
//! SDF covers all of them. Negative inside, positive outside.

use glam::Vec2;

/// Signed distance from `p` to a rounded rectangle
///
/// `half_extents` are the full half-length/half-height (corners included),
/// `radius` is the corner radius and must not exceed either half extent.
pub fn sd_rounded_rect(p: Vec2, center: Vec2, half_extents: Vec2, radius: f32) -> f32 {
    let q = (p - center).abs() - (half_extents - Vec2::splat(radius));
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - radius
}

/// Outward unit normal of the nearest rounded-rectangle edge
pub fn rounded_rect_normal(p: Vec2, center: Vec2, half_extents: Vec2, radius: f32) -> Vec2 {
    let rel = p - center;
    let sign = Vec2::new(
        if rel.x < 0.0 { -1.0 } else { 1.0 },
        if rel.y < 0.0 { -1.0 } else { 1.0 },
    );
    let q = rel.abs() - (half_extents - Vec2::splat(radius));

    if q.x > 0.0 && q.y > 0.0 {
        // Corner arc: normal points away from the arc center
        (q.normalize_or_zero()) * sign
    } else if q.x > q.y {
        Vec2::new(sign.x, 0.0)
    } else {
        Vec2::new(0.0, sign.y)
    }
}

/// Clockwise (screen space, +Y down) tangent for a given outward normal
#[inline]
pub fn clockwise_tangent(normal: Vec2) -> Vec2 {
    Vec2::new(-normal.y, normal.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sd_rounded_rect_edges() {
        let half = Vec2::new(750.0, 350.0);
        // On the top edge
        assert!(sd_rounded_rect(Vec2::new(0.0, -350.0), Vec2::ZERO, half, 350.0).abs() < 1e-3);
        // Center is deep inside
        assert!((sd_rounded_rect(Vec2::ZERO, Vec2::ZERO, half, 350.0) + 350.0).abs() < 1e-3);
        // Past the corner arc
        let outside = Vec2::new(750.0, 350.0);
        assert!(sd_rounded_rect(outside, Vec2::ZERO, half, 350.0) > 0.0);
    }

    #[test]
    fn test_normal_and_tangent() {
        let half = Vec2::new(750.0, 350.0);
        let n = rounded_rect_normal(Vec2::new(0.0, -300.0), Vec2::ZERO, half, 350.0);
        assert_eq!(n, Vec2::new(0.0, -1.0));
        // Top straight runs toward +X when driving clockwise
        assert_eq!(clockwise_tangent(n), Vec2::new(1.0, 0.0));

        let n = rounded_rect_normal(Vec2::new(760.0, 0.0), Vec2::ZERO, half, 350.0);
        assert_eq!(n, Vec2::new(1.0, 0.0));
        assert_eq!(clockwise_tangent(n), Vec2::new(0.0, 1.0));
    }
}
