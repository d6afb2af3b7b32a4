//! Fixed timestep simulation tick
//!
//! Advances a race deterministically. Within a racing tick the order is
//! vehicle motion, then boundary, then lap timing, so the lap timer always
//! sees the position the boundary has already corrected.

use super::boundary::BoundaryOutcome;
use super::events::RaceEventSink;
use super::state::{RacePhase, RaceSession};
use super::vehicle::DriveInput;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Held driving controls
    pub drive: DriveInput,
    /// Pause toggle
    pub pause: bool,
    /// Back to the grid
    pub restart: bool,
}

impl TickInput {
    /// Same controls without the one-shot commands
    fn held_only(&self) -> Self {
        Self {
            drive: self.drive,
            pause: false,
            restart: false,
        }
    }
}

/// Advance the race by one timestep of `dt` seconds
pub fn tick(session: &mut RaceSession, input: &TickInput, dt: f32, sink: &mut dyn RaceEventSink) {
    if input.restart {
        session.restart();
        return;
    }

    // Handle pause toggle
    if input.pause {
        match session.phase {
            RacePhase::Countdown { .. } | RacePhase::Racing => {
                session.resume_phase = session.phase;
                session.phase = RacePhase::Paused;
                log::info!("Paused at {:.0} ms", session.elapsed_ms);
                return;
            }
            RacePhase::Paused => {
                session.phase = session.resume_phase;
                log::info!("Resumed");
            }
            RacePhase::Finished => {}
        }
    }

    // Clock is frozen while paused and after the finish
    if matches!(session.phase, RacePhase::Paused | RacePhase::Finished) {
        return;
    }

    let dt_ms = dt * 1000.0;
    session.time_ticks += 1;
    session.elapsed_ms += f64::from(dt_ms);

    match session.phase {
        RacePhase::Countdown { remaining_ms } => {
            let remaining_ms = remaining_ms - dt_ms;
            if remaining_ms <= 0.0 {
                session.begin_racing();
            } else {
                session.phase = RacePhase::Countdown { remaining_ms };
            }
        }
        RacePhase::Racing => race_step(session, &input.drive, dt, dt_ms, sink),
        RacePhase::Paused | RacePhase::Finished => {}
    }
}

fn race_step(
    session: &mut RaceSession,
    drive: &DriveInput,
    dt: f32,
    dt_ms: f32,
    sink: &mut dyn RaceEventSink,
) {
    session.vehicle.update(drive, dt);

    let footprint = session.vehicle.footprint();
    let surface = session.surface();
    let grid = *session.grid();
    let outcome = match &mut session.boundary {
        Some(boundary) => {
            boundary.enforce(&mut session.vehicle.state, footprint, &grid, dt_ms, sink)
        }
        None => {
            session.vehicle.state.keep_in_bounds(surface, footprint);
            BoundaryOutcome::OnTrack
        }
    };

    let center = session.geometry().center();
    let position = session.vehicle.state.position;
    if outcome == BoundaryOutcome::TimedOut {
        // Put back on the grid, not driven over the line
        session.lap_timer.resync(position, center, session.elapsed_ms);
        return;
    }
    if let Some(summary) = session
        .lap_timer
        .update(position, center, session.elapsed_ms, sink)
    {
        session.finish(summary);
    }
}

/// Fixed-step accumulator for hosts with a variable frame rate
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame delta and return how many `SIM_DT` steps are due
    ///
    /// Long frames are clamped and at most `MAX_SUBSTEPS` steps run, so a
    /// stalled host cannot spiral.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than carrying it into the next frame
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Run one host frame; one-shot commands apply to the first step only
    pub fn run_frame(
        &mut self,
        session: &mut RaceSession,
        input: &TickInput,
        frame_dt: f32,
        sink: &mut dyn RaceEventSink,
    ) -> u32 {
        let substeps = self.advance(frame_dt);
        let held = input.held_only();
        for step in 0..substeps {
            let input = if step == 0 { input } else { &held };
            tick(session, input, SIM_DT, sink);
        }
        substeps
    }

    /// Fraction of a step left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
