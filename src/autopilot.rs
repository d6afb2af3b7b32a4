//! Demo driver
//!
//! Follows the track centreline clockwise using the centreline SDF: the
//! outward normal gives the clockwise tangent, and the signed distance pulls
//! the car back toward the line.

use glam::Vec2;

use crate::sim::{
    DriveInput, DriveModel, TrackGeometry, Vehicle, clockwise_tangent, rounded_rect_normal,
};
use crate::{degrees_delta, heading_degrees};

/// Heading error (degrees) tolerated before steering
const STEER_DEADBAND: f32 = 1.0;

/// Bang-bang centreline follower
#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Throttle is released at or above this speed
    pub cruise_speed: f32,
    /// Distance from the line (px) at which the correction saturates
    pub correction_distance: f32,
}

impl Autopilot {
    /// Tuned for a vehicle: flat out in arcade, below drift speed in turbo
    pub fn for_vehicle(vehicle: &Vehicle) -> Self {
        let cruise_speed = match vehicle.model() {
            DriveModel::Arcade => vehicle.config().max_speed,
            DriveModel::Turbo(turbo) => turbo.drift_threshold * 0.9,
        };
        Self {
            cruise_speed,
            correction_distance: 100.0,
        }
    }

    /// Direction the car should be pointing at `position`
    pub fn desired_direction(&self, position: Vec2, geometry: &TrackGeometry) -> Vec2 {
        let line = geometry.centerline();
        let normal = rounded_rect_normal(position, line.center, line.half_extents(), line.radius);
        let offset = line.signed_distance(position) / self.correction_distance;
        (clockwise_tangent(normal) - normal * offset.clamp(-1.0, 1.0)).normalize_or_zero()
    }

    /// Controls for this tick
    pub fn drive(&self, vehicle: &Vehicle, geometry: &TrackGeometry) -> DriveInput {
        let state = &vehicle.state;
        let desired = self.desired_direction(state.position, geometry);
        let error = degrees_delta(state.rotation, heading_degrees(desired));

        DriveInput {
            accelerate: state.velocity < self.cruise_speed,
            steer_right: error > STEER_DEADBAND,
            steer_left: error < -STEER_DEADBAND,
            ..Default::default()
        }
    }
}
