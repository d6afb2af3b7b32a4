//! Turbo Laps headless demo
//!
//! Runs an autopilot race at a fixed timestep and logs the results.
//! Usage: `turbo-laps [settings.json]` (set `RUST_LOG=info` to see output)

use std::process::ExitCode;

use glam::Vec2;
use turbo_laps::RaceSettings;
use turbo_laps::autopilot::Autopilot;
use turbo_laps::best_times::format_seconds;
use turbo_laps::consts::SIM_DT;
use turbo_laps::sim::{FixedStep, RaceEventSink, RaceSession, RaceSummary, TickInput};

/// Demo surface, a 1080p window
const SURFACE: Vec2 = Vec2::new(1920.0, 1080.0);
/// Simulated host frame time (60 fps)
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after ten simulated minutes
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Logs race events the way a HUD would show them
#[derive(Default)]
struct ConsoleSink {
    crashes: u32,
}

impl RaceEventSink for ConsoleSink {
    fn on_sector_complete(&mut self, sector: usize, time_ms: f64) {
        log::debug!("S{}: {}", sector + 1, format_seconds(time_ms));
    }

    fn on_lap_complete(&mut self, lap: u32, lap_time_ms: f64) {
        log::info!("Lap {}: {}", lap, format_seconds(lap_time_ms));
    }

    fn on_race_complete(&mut self, summary: &RaceSummary) {
        log::info!("Finished in {}", format_seconds(summary.total_ms));
    }

    fn on_crash(&mut self) {
        self.crashes += 1;
        log::warn!("Crash!");
    }

    fn on_reset_to_start(&mut self) {
        log::warn!("Back to the grid");
    }
}

fn load_settings() -> Result<RaceSettings, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            log::info!("Reading settings from {path}");
            Ok(RaceSettings::from_json(&json)?)
        }
        None => Ok(RaceSettings::default()),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Turbo Laps (headless) starting...");

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Failed to load settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = match RaceSession::new(settings, SURFACE) {
        Ok(session) => session,
        Err(err) => {
            log::error!("Invalid race settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    let pilot = Autopilot::for_vehicle(&session.vehicle);
    let mut step = FixedStep::new();
    let mut sink = ConsoleSink::default();

    let mut frames = 0;
    while !session.is_finished() && frames < MAX_FRAMES {
        let input = TickInput {
            drive: pilot.drive(&session.vehicle, session.geometry()),
            ..Default::default()
        };
        step.run_frame(&mut session, &input, FRAME_DT, &mut sink);
        frames += 1;
    }

    let Some(summary) = session.last_summary.as_ref() else {
        log::error!(
            "Race did not finish after {:.0} simulated seconds",
            frames as f32 * FRAME_DT
        );
        return ExitCode::FAILURE;
    };

    println!("Race complete ({} ticks at {:.0} Hz)", session.time_ticks, 1.0 / SIM_DT);
    let laps = summary.lap_times.iter().zip(&summary.lap_sector_times);
    for (i, (lap, splits)) in laps.enumerate() {
        let sectors: Vec<String> = splits.iter().map(|&t| format_seconds(t)).collect();
        println!("  Lap {}: {}  [{}]", i + 1, format_seconds(*lap), sectors.join(" | "));
    }
    if let Some(best) = summary.best_lap() {
        println!("  Best lap: {}", format_seconds(best));
    }
    println!("  Total: {}", format_seconds(summary.total_ms));
    println!("  Crashes: {}", sink.crashes);
    ExitCode::SUCCESS
}
