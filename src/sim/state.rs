//! Race session state
//!
//! Owns every component of one race: track, boundary, car, grid, lap timer
//! and the best-times board. All timing runs off `elapsed_ms`, a simulation
//! clock that only moves while the race is not paused.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boundary::TrackBoundary;
use super::events::RaceSummary;
use super::geometry::TrackGeometry;
use super::grid::{StartingGrid, StartingPoseProvider};
use super::lap::LapTimer;
use super::vehicle::{DriveModel, Vehicle};
use crate::best_times::BestTimes;
use crate::error::ConfigurationError;
use crate::settings::RaceSettings;

/// Current phase of a race
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Car on the grid, input disabled
    Countdown { remaining_ms: f32 },
    /// Clock running, car under control
    Racing,
    /// Clock frozen
    Paused,
    /// Lap target reached
    Finished,
}

/// One race
#[derive(Debug, Clone)]
pub struct RaceSession {
    settings: RaceSettings,
    /// Host drawing surface size
    surface: Vec2,
    geometry: TrackGeometry,
    grid: StartingGrid,
    /// `None` when the car is only kept inside the surface
    pub boundary: Option<TrackBoundary>,
    pub vehicle: Vehicle,
    pub lap_timer: LapTimer,
    pub best_times: BestTimes,
    pub phase: RacePhase,
    /// Phase to return to when unpausing
    pub(crate) resume_phase: RacePhase,
    /// Simulation clock (ms)
    pub elapsed_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Results of the last finished race
    pub last_summary: Option<RaceSummary>,
    /// Best-times rank of the last finished race
    pub last_rank: Option<usize>,
}

impl RaceSession {
    /// Build a session for a surface of the given size, car on the grid
    pub fn new(settings: RaceSettings, surface: Vec2) -> Result<Self, ConfigurationError> {
        settings.validate()?;

        let geometry = settings.track.geometry(surface)?;
        let boundary = if settings.boundary_enabled {
            Some(TrackBoundary::new(geometry, settings.boundary)?)
        } else {
            None
        };
        let model = match settings.turbo {
            Some(turbo) => DriveModel::Turbo(turbo),
            None => DriveModel::Arcade,
        };
        let vehicle = Vehicle::new(settings.vehicle, model)?;
        let grid = StartingGrid::new(geometry, settings.grid);
        let lap_timer = LapTimer::new(settings.laps)?;
        let best_times = BestTimes::new(settings.best_times_capacity);

        let mut session = Self {
            settings,
            surface,
            geometry,
            grid,
            boundary,
            vehicle,
            lap_timer,
            best_times,
            phase: RacePhase::Racing,
            resume_phase: RacePhase::Racing,
            elapsed_ms: 0.0,
            time_ticks: 0,
            last_summary: None,
            last_rank: None,
        };
        session.restart();
        Ok(session)
    }

    pub fn settings(&self) -> &RaceSettings {
        &self.settings
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn grid(&self) -> &StartingGrid {
        &self.grid
    }

    pub fn surface(&self) -> Vec2 {
        self.surface
    }

    /// Back to the grid for a new race; best times are kept
    pub fn restart(&mut self) {
        self.lap_timer.reset();
        if let Some(boundary) = &mut self.boundary {
            boundary.reset();
        }
        self.vehicle.set_starting_pose(self.grid.starting_pose());
        self.vehicle.set_input_enabled(false);
        self.phase = RacePhase::Countdown {
            remaining_ms: self.settings.countdown_ms,
        };
        self.resume_phase = self.phase;
        self.last_summary = None;
        self.last_rank = None;
        log::info!("Race ready: {} laps", self.settings.laps.max_laps);
    }

    /// Lights out: hand control to the driver and start timing
    pub(crate) fn begin_racing(&mut self) {
        self.phase = RacePhase::Racing;
        self.vehicle.set_input_enabled(true);
        self.lap_timer.start(self.elapsed_ms);
        log::info!("Race started");
    }

    /// Lap target reached
    pub(crate) fn finish(&mut self, summary: RaceSummary) {
        self.vehicle.set_input_enabled(false);
        self.last_rank = self.best_times.add_race_time(summary.total_ms);
        self.last_summary = Some(summary);
        self.phase = RacePhase::Finished;
    }

    /// Keep the track centred on a resized surface
    ///
    /// The car moves with the track so it keeps its place on the road.
    pub fn resize(&mut self, surface: Vec2) {
        let old_center = self.geometry.center();
        self.surface = surface;
        self.geometry.recenter(surface);
        self.grid.set_geometry(self.geometry);
        if let Some(boundary) = &mut self.boundary {
            boundary.set_geometry(self.geometry);
        }
        self.vehicle.state.position += self.geometry.center() - old_center;
        log::debug!("Surface resized to {}x{}", surface.x, surface.y);
    }

    /// Race time so far (ms); 0 before the start
    pub fn race_time_ms(&self) -> f64 {
        self.lap_timer.total_ms(self.elapsed_ms)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RaceSession {
        RaceSession::new(RaceSettings::default(), Vec2::new(1600.0, 900.0)).unwrap()
    }

    #[test]
    fn test_new_session_waits_on_grid() {
        let s = session();
        assert_eq!(s.phase, RacePhase::Countdown { remaining_ms: 3000.0 });
        assert!(!s.vehicle.state.input_enabled);
        assert_eq!(s.vehicle.state.position, Vec2::new(800.0, 140.0));
        assert!((s.vehicle.state.rotation - 90.0).abs() < 1e-4);
        assert!(!s.lap_timer.is_running());
        assert!(s.boundary.is_some());
    }

    #[test]
    fn test_boundary_optional() {
        let settings = RaceSettings {
            boundary_enabled: false,
            ..Default::default()
        };
        let s = RaceSession::new(settings, Vec2::new(1600.0, 900.0)).unwrap();
        assert!(s.boundary.is_none());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = RaceSettings::default();
        settings.laps.max_laps = 0;
        assert!(RaceSession::new(settings, Vec2::new(1600.0, 900.0)).is_err());
    }

    #[test]
    fn test_resize_recenters_everything() {
        let mut s = session();
        s.resize(Vec2::new(2000.0, 1000.0));
        assert_eq!(s.geometry().center(), Vec2::new(1000.0, 500.0));
        assert_eq!(s.grid().starting_pose().position, Vec2::new(1000.0, 190.0));
        assert_eq!(s.vehicle.state.position, Vec2::new(1000.0, 190.0));
        let boundary = s.boundary.as_ref().unwrap();
        assert_eq!(boundary.geometry().center(), Vec2::new(1000.0, 500.0));
    }

    #[test]
    fn test_finish_records_best_time() {
        let mut s = session();
        s.finish(RaceSummary {
            lap_times: vec![10_000.0, 11_000.0],
            lap_sector_times: vec![vec![2500.0; 4], vec![2750.0; 4]],
            total_ms: 21_000.0,
        });
        assert!(s.is_finished());
        assert!(!s.vehicle.state.input_enabled);
        assert_eq!(s.last_rank, Some(1));
        assert_eq!(s.best_times.best(), Some(21_000.0));

        s.restart();
        assert_eq!(s.best_times.times().len(), 1);
        assert!(s.last_summary.is_none());
    }
}
