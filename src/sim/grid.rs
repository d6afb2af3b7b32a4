//! Starting grid placement

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::TrackGeometry;

/// Where a vehicle starts, and where it is put back after a timeout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartingPose {
    pub position: Vec2,
    /// Heading in radians; 0 points toward -Y, π/2 toward +X
    pub heading_radians: f32,
}

impl StartingPose {
    /// Heading in degrees, as stored on the vehicle
    pub fn rotation_degrees(&self) -> f32 {
        crate::normalize_degrees(self.heading_radians.to_degrees())
    }
}

/// Anything that can place a vehicle on the grid
pub trait StartingPoseProvider {
    fn starting_pose(&self) -> StartingPose;
}

/// Grid tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingGridConfig {
    /// Distance from the top centreline toward the track center
    pub offset: f32,
}

impl Default for StartingGridConfig {
    fn default() -> Self {
        Self { offset: 40.0 }
    }
}

/// Grid at the top centre of the track, at the start of sector 0
#[derive(Debug, Clone, Copy)]
pub struct StartingGrid {
    geometry: TrackGeometry,
    config: StartingGridConfig,
}

impl StartingGrid {
    pub fn new(geometry: TrackGeometry, config: StartingGridConfig) -> Self {
        Self { geometry, config }
    }

    /// Follow a recentred track
    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.geometry = geometry;
    }
}

impl StartingPoseProvider for StartingGrid {
    fn starting_pose(&self) -> StartingPose {
        let center = self.geometry.center();
        StartingPose {
            position: Vec2::new(
                center.x,
                center.y - self.geometry.height() / 2.0 + self.config.offset,
            ),
            // Pointing along the top straight toward +X (clockwise)
            heading_radians: std::f32::consts::FRAC_PI_2,
        }
    }
}

impl StartingPoseProvider for StartingPose {
    fn starting_pose(&self) -> StartingPose {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_sits_on_top_straight() {
        let geometry = TrackGeometry::new(1500.0, 700.0, 160.0, Vec2::new(800.0, 450.0)).unwrap();
        let grid = StartingGrid::new(geometry, StartingGridConfig::default());
        let pose = grid.starting_pose();
        assert_eq!(pose.position, Vec2::new(800.0, 450.0 - 350.0 + 40.0));
        assert!((pose.rotation_degrees() - 90.0).abs() < 1e-4);
        assert!(geometry.sector_angle(pose.position) < 1e-5);
    }
}
