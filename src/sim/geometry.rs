//! Rounded-rectangle track geometry
//!
//! A track is a rounded rectangle centreline (`length` × `height`, corner
//! radius `height / 2`) thickened by `road_width`. The drivable band lies
//! between an outer and an inner rounded rectangle derived from it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::sdf::sd_rounded_rect;
use crate::error::{ConfigurationError, require_margin, require_positive};
use crate::normalize_radians;

/// An axis-aligned rounded rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundedRect {
    pub center: Vec2,
    pub half_length: f32,
    pub half_height: f32,
    /// Corner radius
    pub radius: f32,
}

impl RoundedRect {
    pub fn new(center: Vec2, half_length: f32, half_height: f32, radius: f32) -> Self {
        Self {
            center,
            half_length,
            half_height,
            radius,
        }
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_length, self.half_height)
    }

    /// Point containment, edges included
    ///
    /// Inside if the point falls in the central cross (the rectangle minus its
    /// corner squares) or within `radius` of the nearest corner arc center.
    pub fn contains(&self, p: Vec2) -> bool {
        self.contains_with(p, false)
    }

    /// Point containment, edges excluded
    pub fn contains_interior(&self, p: Vec2) -> bool {
        self.contains_with(p, true)
    }

    fn contains_with(&self, p: Vec2, strict: bool) -> bool {
        let within = |value: f32, limit: f32| if strict { value < limit } else { value <= limit };

        let rel = (p - self.center).abs();
        let dx = rel.x - (self.half_length - self.radius);
        let dy = rel.y - (self.half_height - self.radius);

        if dx > 0.0 && dy > 0.0 {
            // Corner square: test against the arc
            return within(dx * dx + dy * dy, self.radius * self.radius);
        }

        within(rel.x, self.half_length) && within(rel.y, self.half_height)
    }

    /// Signed distance to the edge (negative inside)
    pub fn signed_distance(&self, p: Vec2) -> f32 {
        sd_rounded_rect(p, self.center, self.half_extents(), self.radius)
    }
}

/// Rounded-track description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    /// Centreline length along X
    length: f32,
    /// Centreline height along Y; the corner radius is half of this
    height: f32,
    /// Width of the drivable road
    road_width: f32,
    center: Vec2,
}

impl TrackGeometry {
    /// Create a validated track
    ///
    /// Rejects non-positive dimensions, a length shorter than the height, and
    /// a road wider than the track is tall (inner edge would invert).
    pub fn new(
        length: f32,
        height: f32,
        road_width: f32,
        center: Vec2,
    ) -> Result<Self, ConfigurationError> {
        let length = require_positive("track length", length)?;
        let height = require_positive("track height", height)?;
        let road_width = require_positive("road width", road_width)?;
        if !center.is_finite() {
            return Err(ConfigurationError::InvalidDimension {
                name: "track center",
                value: if center.x.is_finite() { center.y } else { center.x },
            });
        }
        if length < height {
            return Err(ConfigurationError::TrackTooShort { length, height });
        }

        let geometry = Self {
            length,
            height,
            road_width,
            center,
        };
        geometry.validate_inner_margin(0.0)?;
        Ok(geometry)
    }

    /// Ensure the inner band edge stays non-negative with the given margin
    pub fn validate_inner_margin(&self, inner_margin: f32) -> Result<(), ConfigurationError> {
        let inner_margin = require_margin("inner margin", inner_margin)?;
        let inner_half_height = self.height / 2.0 - self.road_width / 2.0 - inner_margin;
        if inner_half_height < 0.0 {
            return Err(ConfigurationError::DegenerateTrack { inner_half_height });
        }
        Ok(())
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn road_width(&self) -> f32 {
        self.road_width
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn corner_radius(&self) -> f32 {
        self.height / 2.0
    }

    /// The road centreline
    pub fn centerline(&self) -> RoundedRect {
        self.offset_edge(0.0)
    }

    /// Outer band edge, grown by half the road plus `margin`
    pub fn outer_edge(&self, margin: f32) -> RoundedRect {
        self.offset_edge(self.road_width / 2.0 + margin)
    }

    /// Inner band edge, shrunk by half the road plus `margin`
    pub fn inner_edge(&self, margin: f32) -> RoundedRect {
        self.offset_edge(-(self.road_width / 2.0 + margin))
    }

    fn offset_edge(&self, offset: f32) -> RoundedRect {
        RoundedRect::new(
            self.center,
            self.length / 2.0 + offset,
            self.height / 2.0 + offset,
            self.corner_radius() + offset,
        )
    }

    /// Move the center to the middle of a resized surface; shape is unchanged
    pub fn recenter(&mut self, surface: Vec2) {
        self.center = surface / 2.0;
    }

    /// Angle of `p` around the track center, in [0, 2π)
    ///
    /// Zero is straight up (-Y) from the center and the angle grows clockwise
    /// on screen, matching the heading convention of the vehicle.
    pub fn sector_angle(&self, p: Vec2) -> f32 {
        angle_around(self.center, p)
    }
}

/// Clockwise angle of `p` around `center`, 0 pointing toward -Y, in [0, 2π)
pub fn angle_around(center: Vec2, p: Vec2) -> f32 {
    let rel = p - center;
    normalize_radians(rel.y.atan2(rel.x) + std::f32::consts::FRAC_PI_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn track() -> TrackGeometry {
        TrackGeometry::new(1700.0, 900.0, 160.0, Vec2::ZERO).unwrap()
    }

    #[test]
    fn test_rounded_rect_cross_and_corners() {
        let rect = RoundedRect::new(Vec2::ZERO, 100.0, 50.0, 50.0);
        assert!(rect.contains(Vec2::new(0.0, 50.0)));
        assert!(!rect.contains_interior(Vec2::new(0.0, 50.0)));
        assert!(rect.contains(Vec2::new(100.0, 0.0)));
        // Bounding-box corner is outside the arc
        assert!(!rect.contains(Vec2::new(99.0, 49.0)));
        // 45° point on the corner arc
        let arc_point = Vec2::new(50.0, 0.0) + Vec2::splat(50.0 * (PI / 4.0).cos());
        assert!(rect.contains(arc_point - Vec2::splat(0.01)));
        assert!(!rect.contains(arc_point + Vec2::splat(0.01)));
    }

    #[test]
    fn test_edges_from_geometry() {
        let t = track();
        assert_eq!(t.corner_radius(), 450.0);
        let outer = t.outer_edge(0.0);
        assert_eq!(outer.half_height, 530.0);
        assert_eq!(outer.radius, 530.0);
        let inner = t.inner_edge(35.0);
        assert_eq!(inner.half_length, 850.0 - 80.0 - 35.0);
        assert_eq!(inner.radius, 450.0 - 80.0 - 35.0);
    }

    #[test]
    fn test_rejects_degenerate_tracks() {
        assert!(matches!(
            TrackGeometry::new(1000.0, 100.0, 160.0, Vec2::ZERO),
            Err(ConfigurationError::DegenerateTrack { .. })
        ));
        assert!(matches!(
            TrackGeometry::new(500.0, 900.0, 160.0, Vec2::ZERO),
            Err(ConfigurationError::TrackTooShort { .. })
        ));
        assert!(matches!(
            TrackGeometry::new(f32::NAN, 900.0, 160.0, Vec2::ZERO),
            Err(ConfigurationError::InvalidDimension { .. })
        ));
        assert!(track().validate_inner_margin(400.0).is_err());
        assert!(track().validate_inner_margin(-1.0).is_err());
    }

    #[test]
    fn test_recenter_keeps_shape() {
        let mut t = track();
        t.recenter(Vec2::new(1920.0, 1080.0));
        assert_eq!(t.center(), Vec2::new(960.0, 540.0));
        assert_eq!(t.length(), 1700.0);
        assert_eq!(t.height(), 900.0);
    }

    #[test]
    fn test_sector_angle_orientation() {
        let t = track();
        assert!(t.sector_angle(Vec2::new(0.0, -450.0)).abs() < 1e-5);
        assert!((t.sector_angle(Vec2::new(850.0, 0.0)) - PI / 2.0).abs() < 1e-5);
        assert!((t.sector_angle(Vec2::new(0.0, 450.0)) - PI).abs() < 1e-5);
        assert!((t.sector_angle(Vec2::new(-850.0, 0.0)) - 1.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn test_signed_distance_matches_containment() {
        let rect = track().outer_edge(35.0);
        for &(x, y) in &[(0.0, 0.0), (800.0, 500.0), (900.0, 560.0), (-1000.0, 10.0)] {
            let p = Vec2::new(x, y);
            assert_eq!(rect.contains(p), rect.signed_distance(p) <= 0.0, "{p:?}");
        }
    }
}
