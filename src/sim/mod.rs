//! Deterministic simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, time passed in by the caller
//! - No wall clock, no I/O
//! - No rendering or platform dependencies

pub mod boundary;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod lap;
pub mod sdf;
pub mod state;
pub mod tick;
pub mod vehicle;

pub use boundary::{BoundaryConfig, BoundaryOutcome, TrackBoundary, TrackStatus};
pub use events::{EventLog, NullSink, RaceEvent, RaceEventSink, RaceSummary};
pub use geometry::{RoundedRect, TrackGeometry, angle_around};
pub use grid::{StartingGrid, StartingGridConfig, StartingPose, StartingPoseProvider};
pub use lap::{LapConfig, LapTimer};
pub use sdf::{clockwise_tangent, rounded_rect_normal, sd_rounded_rect};
pub use state::{RacePhase, RaceSession};
pub use tick::{FixedStep, TickInput, tick};
pub use vehicle::{
    Action, AnalogStick, BoostPhase, DriveInput, DriveModel, InputSource, TurboConfig,
    TurboState, Vehicle, VehicleConfig, VehicleState,
};
