//! Track boundary: on/off-track detection, slowdown and crash recovery

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::RaceEventSink;
use super::geometry::{RoundedRect, TrackGeometry};
use super::grid::StartingPoseProvider;
use super::vehicle::VehicleState;
use crate::consts::HAPTIC_PULSE_MS;
use crate::error::{ConfigurationError, require_margin, require_positive};

/// Boundary tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Extra clearance beyond the outer road edge
    pub outer_margin: f32,
    /// Extra clearance inside the inner road edge
    pub inner_margin: f32,
    /// Time off track before the car is put back on the grid (ms)
    pub max_off_track_ms: f32,
    /// Velocity multiplier applied every off-track tick, in (0, 1]
    pub off_track_slowdown: f32,
    /// When false the band is exactly the road
    pub margins_enabled: bool,
    /// Haptic pulse on leaving the track; `None` disables it
    pub haptic_pulse_ms: Option<u32>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            outer_margin: 35.0,
            inner_margin: 35.0,
            max_off_track_ms: 3000.0,
            off_track_slowdown: 0.95,
            margins_enabled: true,
            haptic_pulse_ms: Some(HAPTIC_PULSE_MS),
        }
    }
}

/// Containment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackStatus {
    #[default]
    OnTrack,
    OffTrack,
}

/// Result of one containment check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryOutcome {
    /// Stayed on track
    OnTrack,
    /// Came back onto the track on its own
    Rejoined,
    /// Just left the track
    LeftTrack,
    /// Still off track, timer running
    OffTrack,
    /// Off track too long; the car must go back to the grid
    TimedOut,
}

/// The drivable band around a track and the off-track timer
#[derive(Debug, Clone)]
pub struct TrackBoundary {
    geometry: TrackGeometry,
    config: BoundaryConfig,
    status: TrackStatus,
    off_track_timer_ms: f32,
}

impl TrackBoundary {
    pub fn new(geometry: TrackGeometry, config: BoundaryConfig) -> Result<Self, ConfigurationError> {
        require_margin("outer margin", config.outer_margin)?;
        require_margin("inner margin", config.inner_margin)?;
        require_positive("max off-track duration", config.max_off_track_ms)?;
        let slowdown = config.off_track_slowdown;
        if !(slowdown > 0.0 && slowdown <= 1.0) {
            return Err(ConfigurationError::InvalidSlowdown(slowdown));
        }
        geometry.validate_inner_margin(config.inner_margin)?;

        Ok(Self {
            geometry,
            config,
            status: TrackStatus::OnTrack,
            off_track_timer_ms: 0.0,
        })
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn status(&self) -> TrackStatus {
        self.status
    }

    pub fn off_track_timer_ms(&self) -> f32 {
        self.off_track_timer_ms
    }

    /// Follow a recentred track; the shape was validated at construction
    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.geometry = geometry;
    }

    /// Outer and inner band edges
    pub fn band_edges(&self, margins_enabled: bool) -> (RoundedRect, RoundedRect) {
        let (outer, inner) = if margins_enabled {
            (self.config.outer_margin, self.config.inner_margin)
        } else {
            (0.0, 0.0)
        };
        (self.geometry.outer_edge(outer), self.geometry.inner_edge(inner))
    }

    /// Inside the outer edge and not strictly inside the inner edge
    pub fn is_point_within_band(&self, p: Vec2, margins_enabled: bool) -> bool {
        let (outer, inner) = self.band_edges(margins_enabled);
        outer.contains(p) && !inner.contains_interior(p)
    }

    /// Center plus the four unrotated footprint corners
    pub fn footprint_samples(position: Vec2, footprint: Vec2) -> [Vec2; 5] {
        let half = footprint / 2.0;
        [
            position,
            position + Vec2::new(-half.x, -half.y),
            position + Vec2::new(half.x, -half.y),
            position + Vec2::new(-half.x, half.y),
            position + Vec2::new(half.x, half.y),
        ]
    }

    /// All footprint samples lie in the band
    pub fn is_vehicle_on_track(&self, position: Vec2, footprint: Vec2) -> bool {
        Self::footprint_samples(position, footprint)
            .iter()
            .all(|&p| self.is_point_within_band(p, self.config.margins_enabled))
    }

    /// Run the containment state machine for one tick
    pub fn check_vehicle_on_track(
        &mut self,
        position: Vec2,
        footprint: Vec2,
        dt_ms: f32,
    ) -> BoundaryOutcome {
        let was_on_track = self.status == TrackStatus::OnTrack;

        if self.is_vehicle_on_track(position, footprint) {
            self.off_track_timer_ms = 0.0;
            self.status = TrackStatus::OnTrack;
            return if was_on_track {
                BoundaryOutcome::OnTrack
            } else {
                BoundaryOutcome::Rejoined
            };
        }

        self.off_track_timer_ms += dt_ms;
        if self.off_track_timer_ms >= self.config.max_off_track_ms {
            self.off_track_timer_ms = 0.0;
            self.status = TrackStatus::OnTrack;
            return BoundaryOutcome::TimedOut;
        }

        self.status = TrackStatus::OffTrack;
        if was_on_track {
            BoundaryOutcome::LeftTrack
        } else {
            BoundaryOutcome::OffTrack
        }
    }

    /// Check containment and apply the consequences to the vehicle
    pub fn enforce(
        &mut self,
        vehicle: &mut VehicleState,
        footprint: Vec2,
        grid: &dyn StartingPoseProvider,
        dt_ms: f32,
        sink: &mut dyn RaceEventSink,
    ) -> BoundaryOutcome {
        let outcome = self.check_vehicle_on_track(vehicle.position, footprint, dt_ms);

        match outcome {
            BoundaryOutcome::OnTrack => {}
            BoundaryOutcome::Rejoined => {
                vehicle.on_track = true;
                vehicle.keys_enabled = true;
                log::debug!("Rejoined track");
            }
            BoundaryOutcome::LeftTrack => {
                vehicle.on_track = false;
                vehicle.keys_enabled = false;
                vehicle.velocity *= self.config.off_track_slowdown;
                sink.on_crash();
                if let Some(duration_ms) = self.config.haptic_pulse_ms {
                    sink.on_haptic_pulse(duration_ms);
                }
                log::info!("Left track at ({:.0}, {:.0})", vehicle.position.x, vehicle.position.y);
            }
            BoundaryOutcome::OffTrack => {
                vehicle.velocity *= self.config.off_track_slowdown;
            }
            BoundaryOutcome::TimedOut => {
                vehicle.reset_to_pose(grid.starting_pose());
                sink.on_reset_to_start();
                log::info!(
                    "Off track for {} ms, back to the starting grid",
                    self.config.max_off_track_ms
                );
            }
        }

        vehicle.off_track_timer_ms = self.off_track_timer_ms;
        outcome
    }

    /// Back on track with a cleared timer
    pub fn reset(&mut self) {
        self.status = TrackStatus::OnTrack;
        self.off_track_timer_ms = 0.0;
    }
}
