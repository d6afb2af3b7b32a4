//! Turbo Laps - simulation core of a top-down rounded-track racing mini-game
//!
//! Core modules:
//! - `sim`: Deterministic per-tick simulation (track band, vehicle motion, lap timing)
//! - `settings`: Plain-data tuning with JSON parsing and validation
//! - `best_times`: In-memory best race times board
//! - `autopilot`: Centreline-following demo driver
//! - `error`: Configuration errors

pub mod autopilot;
pub mod best_times;
pub mod error;
pub mod settings;
pub mod sim;

pub use best_times::BestTimes;
pub use error::ConfigurationError;
pub use settings::RaceSettings;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta a host may feed the fixed-step accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Reverse speed as a fraction of max speed
    pub const REVERSE_FACTOR: f32 = 0.3;
    /// Per-tick velocity multiplier while the handbrake is held (arcade)
    pub const HANDBRAKE_DECAY: f32 = 0.95;
    /// Per-tick velocity multiplier while coasting (arcade)
    pub const COAST_DECAY: f32 = 0.98;
    /// Per-tick velocity multiplier while the handbrake is held (turbo)
    pub const TURBO_HANDBRAKE_DECAY: f32 = 0.85;
    /// Per-tick velocity multiplier while coasting (turbo)
    pub const TURBO_COAST_DECAY: f32 = 0.95;
    /// Velocity bleed when rotating hard at drift speed
    pub const DRIFT_PENALTY: f32 = 0.98;
    /// Rotation change (degrees per tick) that counts as a hard turn
    pub const DRIFT_ROTATION_DELTA: f32 = 5.0;
    /// Rotation rate (degrees per second) above which a drifting car skids
    pub const SKID_ROTATION_RATE: f32 = 30.0;

    /// Haptic pulse fired when leaving the track (ms)
    pub const HAPTIC_PULSE_MS: u32 = 100;
}

/// Normalize degrees to [0, 360)
#[inline]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Normalize radians to [0, 2π)
#[inline]
pub fn normalize_radians(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `from` to `to` in degrees, in [-180, 180)
#[inline]
pub fn degrees_delta(from: f32, to: f32) -> f32 {
    normalize_degrees(to - from + 180.0) - 180.0
}

/// Unit heading vector for a rotation in degrees.
///
/// Heading 0° points toward -Y (screen up), 90° toward +X.
#[inline]
pub fn heading_vector(rotation_degrees: f32) -> Vec2 {
    let radians = rotation_degrees.to_radians();
    Vec2::new(radians.sin(), -radians.cos())
}

/// Rotation in degrees (in [0, 360)) that points along `dir`
#[inline]
pub fn heading_degrees(dir: Vec2) -> f32 {
    normalize_degrees(dir.x.atan2(-dir.y).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-4);
        assert!((normalize_degrees(725.0) - 5.0).abs() < 1e-3);
        assert!(normalize_degrees(-1e-7) < 360.0);
    }

    #[test]
    fn test_heading_convention() {
        let up = heading_vector(0.0);
        assert!(up.x.abs() < 1e-6 && (up.y + 1.0).abs() < 1e-6);
        let right = heading_vector(90.0);
        assert!((right.x - 1.0).abs() < 1e-6 && right.y.abs() < 1e-6);
        assert!((heading_degrees(Vec2::new(1.0, 0.0)) - 90.0).abs() < 1e-4);
        assert!((heading_degrees(Vec2::new(0.0, 1.0)) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_degrees_delta_wraps() {
        assert!((degrees_delta(350.0, 10.0) - 20.0).abs() < 1e-4);
        assert!((degrees_delta(10.0, 350.0) + 20.0).abs() < 1e-4);
        assert!((degrees_delta(90.0, 90.0)).abs() < 1e-6);
    }
}
