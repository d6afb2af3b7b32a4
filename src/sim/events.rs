//! Race events emitted by the simulation
//!
//! Hosts implement `RaceEventSink` to drive audio, haptics and HUD updates.
//! Every method has a no-op default so a sink only handles what it cares
//! about.

use serde::{Deserialize, Serialize};

/// Final results handed to `on_race_complete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSummary {
    /// One entry per completed lap (ms)
    pub lap_times: Vec<f64>,
    /// Split times per completed lap (ms)
    pub lap_sector_times: Vec<Vec<f64>>,
    /// Sum of all lap times (ms)
    pub total_ms: f64,
}

impl RaceSummary {
    /// Fastest lap, if any lap was completed
    pub fn best_lap(&self) -> Option<f64> {
        self.lap_times.iter().copied().reduce(f64::min)
    }
}

/// Receiver for simulation events
pub trait RaceEventSink {
    /// A sector was left in the forward direction
    fn on_sector_complete(&mut self, _sector: usize, _time_ms: f64) {}
    /// A valid lap was completed (`lap` is 1-based)
    fn on_lap_complete(&mut self, _lap: u32, _lap_time_ms: f64) {}
    /// The lap target was reached; fires at most once per race
    fn on_race_complete(&mut self, _summary: &RaceSummary) {}
    /// The vehicle just left the drivable band
    fn on_crash(&mut self) {}
    /// Haptic pulse request (ms)
    fn on_haptic_pulse(&mut self, _duration_ms: u32) {}
    /// The vehicle was put back on the starting grid after staying off track
    fn on_reset_to_start(&mut self) {}
}

/// Sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RaceEventSink for NullSink {}

/// A recorded race event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    SectorComplete { sector: usize, time_ms: f64 },
    LapComplete { lap: u32, lap_time_ms: f64 },
    RaceComplete(RaceSummary),
    Crash,
    HapticPulse { duration_ms: u32 },
    ResetToStart,
}

/// Sink that records every event in order
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<RaceEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching `pred`
    pub fn count(&self, pred: impl Fn(&RaceEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl RaceEventSink for EventLog {
    fn on_sector_complete(&mut self, sector: usize, time_ms: f64) {
        self.events.push(RaceEvent::SectorComplete { sector, time_ms });
    }

    fn on_lap_complete(&mut self, lap: u32, lap_time_ms: f64) {
        self.events.push(RaceEvent::LapComplete { lap, lap_time_ms });
    }

    fn on_race_complete(&mut self, summary: &RaceSummary) {
        self.events.push(RaceEvent::RaceComplete(summary.clone()));
    }

    fn on_crash(&mut self) {
        self.events.push(RaceEvent::Crash);
    }

    fn on_haptic_pulse(&mut self, duration_ms: u32) {
        self.events.push(RaceEvent::HapticPulse { duration_ms });
    }

    fn on_reset_to_start(&mut self) {
        self.events.push(RaceEvent::ResetToStart);
    }
}
