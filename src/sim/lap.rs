//! Lap and sector timing
//!
//! The track is split into equal angular sectors around its center. A lap
//! counts only when the car crosses into sector 0 with every sector completed
//! in the forward direction since the last lap.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{RaceEventSink, RaceSummary};
use super::geometry::angle_around;
use crate::error::ConfigurationError;

/// Lap timing tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapConfig {
    pub sector_count: u32,
    /// Laps needed to finish the race
    pub max_laps: u32,
}

impl Default for LapConfig {
    fn default() -> Self {
        Self {
            sector_count: 4,
            max_laps: 5,
        }
    }
}

impl LapConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.sector_count < 1 {
            return Err(ConfigurationError::InvalidSectorCount(self.sector_count));
        }
        if self.max_laps < 1 {
            return Err(ConfigurationError::InvalidMaxLaps(self.max_laps));
        }
        Ok(())
    }
}

/// How a sector change is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectorMove {
    Forward(usize),
    Backward(usize),
    Ambiguous,
}

/// Sector/lap state for one race; all timestamps are simulation ms
#[derive(Debug, Clone)]
pub struct LapTimer {
    config: LapConfig,
    current_sector: usize,
    completed_sectors: Vec<bool>,
    sector_times: Vec<f64>,
    completed_lap_sector_times: Vec<Vec<f64>>,
    lap_times: Vec<f64>,
    lap_count: u32,
    running: bool,
    /// Set by the first `start` after a reset
    started: bool,
    race_completed: bool,
    start_ms: f64,
    last_lap_start_ms: f64,
    last_sector_ms: f64,
    last_update_ms: f64,
}

impl LapTimer {
    pub fn new(config: LapConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let sectors = config.sector_count as usize;
        Ok(Self {
            config,
            current_sector: 0,
            completed_sectors: vec![false; sectors],
            sector_times: vec![0.0; sectors],
            completed_lap_sector_times: Vec::new(),
            lap_times: Vec::new(),
            lap_count: 0,
            running: false,
            started: false,
            race_completed: false,
            start_ms: 0.0,
            last_lap_start_ms: 0.0,
            last_sector_ms: 0.0,
            last_update_ms: 0.0,
        })
    }

    pub fn config(&self) -> &LapConfig {
        &self.config
    }

    fn sector_count(&self) -> usize {
        self.config.sector_count as usize
    }

    /// Sector index for a position around `center`
    pub fn sector_of(&self, position: Vec2, center: Vec2) -> usize {
        let n = self.sector_count();
        let sector_size = TAU / n as f32;
        let sector = (angle_around(center, position) / sector_size).floor() as usize;
        sector.min(n - 1)
    }

    /// Start or resume timing
    ///
    /// Timestamps are only initialized on a fresh run, so a resume keeps the
    /// time already on the clock.
    pub fn start(&mut self, now_ms: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_update_ms = now_ms;

        if self.lap_count == 0 && self.lap_times.is_empty() && !self.started {
            self.started = true;
            self.start_ms = now_ms;
            self.last_lap_start_ms = now_ms;
            self.last_sector_ms = now_ms;
            self.completed_sectors.fill(false);
            log::debug!("Lap timer started at {now_ms:.0} ms");
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Clear all laps and sectors and stop
    pub fn reset(&mut self) {
        self.running = false;
        self.started = false;
        self.race_completed = false;
        self.lap_count = 0;
        self.current_sector = 0;
        self.sector_times.fill(0.0);
        self.completed_sectors.fill(false);
        self.completed_lap_sector_times.clear();
        self.lap_times.clear();
        self.start_ms = 0.0;
        self.last_lap_start_ms = 0.0;
        self.last_sector_ms = 0.0;
        self.last_update_ms = 0.0;
    }

    /// Track the car's sector; returns the summary on the tick the race ends
    pub fn update(
        &mut self,
        position: Vec2,
        center: Vec2,
        now_ms: f64,
        sink: &mut dyn RaceEventSink,
    ) -> Option<RaceSummary> {
        if !self.running {
            return None;
        }
        let previous_ms = self.last_update_ms;
        self.last_update_ms = now_ms;

        let new_sector = self.sector_of(position, center);
        if new_sector == self.current_sector {
            return None;
        }

        match self.classify(new_sector) {
            SectorMove::Forward(steps) => {
                // Multi-sector jumps are replayed one sector at a time
                for step in 1..=steps {
                    let t = previous_ms + (now_ms - previous_ms) * step as f64 / steps as f64;
                    let next = (self.current_sector + 1) % self.sector_count();
                    if let Some(summary) = self.forward(next, t, sink) {
                        return Some(summary);
                    }
                }
            }
            SectorMove::Backward(steps) => {
                for _ in 0..steps {
                    let next = (self.current_sector + self.sector_count() - 1) % self.sector_count();
                    self.backward(next);
                }
            }
            SectorMove::Ambiguous => {
                log::warn!(
                    "Ignoring ambiguous jump from sector {} to {}",
                    self.current_sector,
                    new_sector
                );
                self.current_sector = new_sector;
            }
        }
        None
    }

    /// Follow a teleport (reset to the grid) without crossing any sector
    ///
    /// The lap in progress loses its completed sectors; the lap clock keeps
    /// running, so the time spent off track stays in the lap.
    pub fn resync(&mut self, position: Vec2, center: Vec2, now_ms: f64) {
        let new_sector = self.sector_of(position, center);
        log::debug!(
            "Lap timer resynced from sector {} to {}",
            self.current_sector,
            new_sector
        );
        self.current_sector = new_sector;
        self.completed_sectors.fill(false);
        self.sector_times.fill(0.0);
        self.last_sector_ms = now_ms;
        self.last_update_ms = now_ms;
    }

    fn classify(&self, new_sector: usize) -> SectorMove {
        let n = self.sector_count();
        let diff = (new_sector + n - self.current_sector) % n;
        let back = n - diff;

        if diff == 1 || diff < back {
            SectorMove::Forward(diff)
        } else if back < diff {
            SectorMove::Backward(back)
        } else {
            SectorMove::Ambiguous
        }
    }

    fn forward(
        &mut self,
        new_sector: usize,
        now_ms: f64,
        sink: &mut dyn RaceEventSink,
    ) -> Option<RaceSummary> {
        let finished = self.current_sector;
        let sector_time = now_ms - self.last_sector_ms;
        self.sector_times[finished] = sector_time;
        self.last_sector_ms = now_ms;
        self.completed_sectors[finished] = true;
        self.current_sector = new_sector;
        sink.on_sector_complete(finished, sector_time);
        log::debug!("Sector {} complete in {:.0} ms", finished + 1, sector_time);

        if new_sector != 0 || !self.completed_sectors.iter().all(|&done| done) {
            return None;
        }

        let lap_time = now_ms - self.last_lap_start_ms;
        self.lap_times.push(lap_time);
        self.completed_lap_sector_times.push(self.sector_times.clone());
        self.last_lap_start_ms = now_ms;
        self.lap_count += 1;
        self.sector_times.fill(0.0);
        self.completed_sectors.fill(false);
        sink.on_lap_complete(self.lap_count, lap_time);
        log::info!("Lap {} complete: {:.0} ms", self.lap_count, lap_time);

        if self.lap_count >= self.config.max_laps && !self.race_completed {
            self.race_completed = true;
            self.running = false;
            let summary = RaceSummary {
                lap_times: self.lap_times.clone(),
                lap_sector_times: self.completed_lap_sector_times.clone(),
                total_ms: self.lap_times.iter().sum(),
            };
            sink.on_race_complete(&summary);
            log::info!(
                "Race complete: {} laps in {:.0} ms",
                self.lap_count,
                summary.total_ms
            );
            return Some(summary);
        }
        None
    }

    fn backward(&mut self, new_sector: usize) {
        self.completed_sectors[self.current_sector] = false;
        if new_sector == 0 {
            // Reversing over the line never credits a lap
            self.completed_sectors.fill(false);
        }
        self.current_sector = new_sector;
    }

    pub fn lap_times(&self) -> &[f64] {
        &self.lap_times
    }

    /// Split times of the lap in progress (0 for sectors not yet done)
    pub fn sector_times(&self) -> &[f64] {
        &self.sector_times
    }

    pub fn completed_lap_sector_times(&self) -> &[Vec<f64>] {
        &self.completed_lap_sector_times
    }

    /// Completed laps
    pub fn current_lap(&self) -> u32 {
        self.lap_count
    }

    pub fn current_sector(&self) -> usize {
        self.current_sector
    }

    pub fn completed_sectors(&self) -> &[bool] {
        &self.completed_sectors
    }

    /// Time in the lap in progress; 0 when stopped
    pub fn current_lap_ms(&self, now_ms: f64) -> f64 {
        if self.running {
            now_ms - self.last_lap_start_ms
        } else {
            0.0
        }
    }

    /// Time since the race started; 0 when stopped
    pub fn total_ms(&self, now_ms: f64) -> f64 {
        if self.running {
            now_ms - self.start_ms
        } else {
            0.0
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn race_completed(&self) -> bool {
        self.race_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::{EventLog, RaceEvent};

    const CENTER: Vec2 = Vec2::new(400.0, 300.0);

    /// A point in the middle of `sector`
    fn in_sector(sector: usize, sector_count: usize) -> Vec2 {
        let angle = (sector as f32 + 0.5) * TAU / sector_count as f32;
        CENTER + Vec2::new(angle.sin(), -angle.cos()) * 250.0
    }

    fn timer(sector_count: u32, max_laps: u32) -> LapTimer {
        let mut t = LapTimer::new(LapConfig {
            sector_count,
            max_laps,
        })
        .unwrap();
        t.start(0.0);
        t
    }

    /// Visit sectors in order, one second apart, starting at `t0`
    fn drive(timer: &mut LapTimer, sectors: &[usize], t0: f64, log: &mut EventLog) -> f64 {
        let n = timer.config().sector_count as usize;
        let mut now = t0;
        for &s in sectors {
            now += 1000.0;
            timer.update(in_sector(s, n), CENTER, now, log);
        }
        now
    }

    #[test]
    fn test_sector_of_follows_clockwise_angle() {
        let t = timer(4, 5);
        assert_eq!(t.sector_of(CENTER + Vec2::new(10.0, -100.0), CENTER), 0);
        assert_eq!(t.sector_of(CENTER + Vec2::new(100.0, 10.0), CENTER), 1);
        assert_eq!(t.sector_of(CENTER + Vec2::new(-10.0, 100.0), CENTER), 2);
        assert_eq!(t.sector_of(CENTER + Vec2::new(-100.0, -10.0), CENTER), 3);
    }

    #[test]
    fn test_forward_lap_counts_once() {
        let mut t = timer(4, 5);
        let mut log = EventLog::new();
        drive(&mut t, &[1, 2, 3], 0.0, &mut log);
        assert_eq!(t.completed_sectors(), &[true, true, true, false]);
        assert!(t.lap_times().is_empty());

        drive(&mut t, &[0], 3000.0, &mut log);
        assert_eq!(t.lap_times(), &[4000.0]);
        assert_eq!(t.completed_lap_sector_times(), &[vec![1000.0; 4]]);
        assert_eq!(t.completed_sectors(), &[false; 4]);
        assert_eq!(t.sector_times(), &[0.0; 4]);
        assert_eq!(t.current_lap(), 1);
        assert_eq!(log.count(|e| matches!(e, RaceEvent::SectorComplete { .. })), 4);
        assert_eq!(
            log.count(|e| *e == RaceEvent::LapComplete { lap: 1, lap_time_ms: 4000.0 }),
            1
        );
    }

    #[test]
    fn test_revisited_sectors_still_count_when_all_complete() {
        let mut t = timer(4, 5);
        let mut log = EventLog::new();
        drive(&mut t, &[1, 2, 1, 2, 3, 0], 0.0, &mut log);
        assert_eq!(t.lap_times().len(), 1);
    }

    #[test]
    fn test_reversing_over_the_line_is_not_a_lap() {
        let mut t = timer(4, 5);
        let mut log = EventLog::new();
        // Back into sector 3 and forward again over the line
        let now = drive(&mut t, &[3, 0], 0.0, &mut log);
        assert!(t.lap_times().is_empty());

        // A clean lap, then reversing over the line and crossing it again
        let now = drive(&mut t, &[1, 2, 3, 0, 3, 0], now, &mut log);
        assert_eq!(t.lap_times().len(), 1);
        assert_eq!(t.completed_sectors(), &[false, false, false, true]);

        drive(&mut t, &[1, 2, 1, 0, 3, 2, 3, 0], now, &mut log);
        assert_eq!(t.lap_times().len(), 1);
    }

    #[test]
    fn test_race_completes_once() {
        let mut t = timer(4, 2);
        let mut log = EventLog::new();
        let mut summaries = Vec::new();
        let mut now = 0.0;
        for _ in 0..3 {
            for s in [1, 2, 3, 0] {
                now += 500.0;
                if let Some(summary) = t.update(in_sector(s, 4), CENTER, now, &mut log) {
                    summaries.push(summary);
                }
            }
        }
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].lap_times, vec![2000.0, 2000.0]);
        assert_eq!(summaries[0].total_ms, 4000.0);
        assert_eq!(log.count(|e| matches!(e, RaceEvent::RaceComplete(_))), 1);
        assert!(!t.is_running());
        assert!(t.race_completed());
        assert_eq!(t.lap_times().len(), 2);

        // Starting again without a reset keeps the finished race
        t.start(now);
        for s in [1, 2, 3, 0] {
            now += 500.0;
            t.update(in_sector(s, 4), CENTER, now, &mut log);
        }
        assert_eq!(log.count(|e| matches!(e, RaceEvent::RaceComplete(_))), 1);
    }

    #[test]
    fn test_skipped_sectors_are_replayed() {
        let mut t = timer(8, 5);
        let mut log = EventLog::new();
        t.update(in_sector(3, 8), CENTER, 900.0, &mut log);
        assert_eq!(t.current_sector(), 3);
        assert_eq!(&t.completed_sectors()[..3], &[true, true, true]);
        assert_eq!(&t.sector_times()[..3], &[300.0, 300.0, 300.0]);

        // Backward skip clears the flags it passes
        t.update(in_sector(1, 8), CENTER, 1000.0, &mut log);
        assert_eq!(t.current_sector(), 1);
        assert_eq!(&t.completed_sectors()[..3], &[true, true, false]);
    }

    #[test]
    fn test_half_track_jump_is_ignored() {
        let mut t = timer(4, 5);
        let mut log = EventLog::new();
        t.update(in_sector(2, 4), CENTER, 100.0, &mut log);
        assert_eq!(t.current_sector(), 2);
        assert_eq!(t.completed_sectors(), &[false; 4]);
        assert!(log.events.is_empty());
    }

    #[test]
    fn test_resync_never_credits_a_crossing() {
        let mut t = timer(4, 5);
        let mut log = EventLog::new();
        let now = drive(&mut t, &[1, 2, 3], 0.0, &mut log);

        t.resync(in_sector(0, 4), CENTER, now + 500.0);
        assert_eq!(t.current_sector(), 0);
        assert_eq!(t.completed_sectors(), &[false; 4]);
        assert!(t.lap_times().is_empty());
        assert_eq!(log.count(|e| matches!(e, RaceEvent::SectorComplete { .. })), 3);

        // A full lap from the grid is needed; the lap clock kept running
        drive(&mut t, &[1, 2, 3, 0], now + 500.0, &mut log);
        assert_eq!(t.lap_times(), &[7500.0]);
        assert_eq!(t.completed_lap_sector_times()[0][0], 1000.0);
    }

    #[test]
    fn test_resume_keeps_elapsed_time() {
        let mut t = timer(4, 5);
        let mut log = EventLog::new();
        drive(&mut t, &[1], 0.0, &mut log);
        t.stop();
        assert_eq!(t.total_ms(5000.0), 0.0);
        t.start(5000.0);
        assert_eq!(t.total_ms(6000.0), 6000.0);
        assert_eq!(t.current_lap_ms(6000.0), 6000.0);

        t.reset();
        t.start(7000.0);
        assert_eq!(t.total_ms(8000.0), 1000.0);
        assert_eq!(t.current_sector(), 0);
    }

    #[test]
    fn test_update_ignored_when_stopped() {
        let mut t = LapTimer::new(LapConfig::default()).unwrap();
        let mut log = EventLog::new();
        t.update(in_sector(1, 4), CENTER, 100.0, &mut log);
        assert_eq!(t.current_sector(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            LapTimer::new(LapConfig { sector_count: 0, max_laps: 1 }),
            Err(ConfigurationError::InvalidSectorCount(0))
        ));
        assert!(matches!(
            LapTimer::new(LapConfig { sector_count: 4, max_laps: 0 }),
            Err(ConfigurationError::InvalidMaxLaps(0))
        ));
    }
}
