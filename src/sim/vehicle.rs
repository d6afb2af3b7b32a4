//! Vehicle motion
//!
//! Converts held controls into velocity and rotation, then integrates the
//! position. Two drive models share the same state:
//! - Arcade: velocity snaps to fixed targets, decays while coasting
//! - Turbo: continuous acceleration with drift handling, heat and boost

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::StartingPose;
use crate::consts::*;
use crate::error::{ConfigurationError, require_positive};
use crate::{degrees_delta, heading_vector, normalize_degrees};

/// Discrete controls a host can report as held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Accelerate,
    Brake,
    Handbrake,
    SteerLeft,
    SteerRight,
    Boost,
}

/// Joystick-style analog input
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalogStick {
    /// Unit direction, screen space (+Y down)
    pub direction: Vec2,
    /// Deflection in [0, 1]
    pub magnitude: f32,
    pub active: bool,
}

impl AnalogStick {
    /// Forward/backward axis: pushing up accelerates
    pub fn throttle_axis(&self) -> f32 {
        (-self.direction.y * self.magnitude).clamp(-1.0, 1.0)
    }

    /// Left/right axis: pushing right turns clockwise
    pub fn steer_axis(&self) -> f32 {
        (self.direction.x * self.magnitude).clamp(-1.0, 1.0)
    }
}

/// Host input collaborator
pub trait InputSource {
    /// Whether `action` is currently held
    fn is_held(&self, action: Action) -> bool;

    fn throttle_stick(&self) -> Option<AnalogStick> {
        None
    }

    fn steering_stick(&self) -> Option<AnalogStick> {
        None
    }
}

/// Controls for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveInput {
    pub accelerate: bool,
    pub brake: bool,
    pub handbrake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub boost: bool,
    /// Replaces accelerate/brake while active
    pub throttle_stick: Option<AnalogStick>,
    /// Replaces steer left/right while active
    pub steering_stick: Option<AnalogStick>,
}

impl DriveInput {
    /// Snapshot a host input source
    pub fn sample(source: &dyn InputSource) -> Self {
        Self {
            accelerate: source.is_held(Action::Accelerate),
            brake: source.is_held(Action::Brake),
            handbrake: source.is_held(Action::Handbrake),
            steer_left: source.is_held(Action::SteerLeft),
            steer_right: source.is_held(Action::SteerRight),
            boost: source.is_held(Action::Boost),
            throttle_stick: source.throttle_stick(),
            steering_stick: source.steering_stick(),
        }
    }

    fn active_throttle_stick(&self) -> Option<AnalogStick> {
        self.throttle_stick.filter(|s| s.active)
    }

    fn active_steering_stick(&self) -> Option<AnalogStick> {
        self.steering_stick.filter(|s| s.active)
    }

    /// Combined throttle in [-1, 1]; accelerate wins over brake
    pub fn throttle(&self) -> f32 {
        match self.active_throttle_stick() {
            Some(stick) => stick.throttle_axis(),
            None if self.accelerate => 1.0,
            None if self.brake => -1.0,
            None => 0.0,
        }
    }

    /// Combined steering in [-1, 1]; negative turns left
    pub fn steering(&self) -> f32 {
        match self.active_steering_stick() {
            Some(stick) => stick.steer_axis(),
            None => self.steer_right as i8 as f32 - self.steer_left as i8 as f32,
        }
    }

    /// Everything released while keys are frozen
    fn gated(&self, keys_enabled: bool) -> Self {
        if keys_enabled { *self } else { Self::default() }
    }
}

/// Base vehicle tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Footprint width used for containment and edge clamping
    pub width: f32,
    /// Footprint height used for containment and edge clamping
    pub height: f32,
    /// Top forward speed (px/s)
    pub max_speed: f32,
    /// Steering rate (degrees/s)
    pub turn_speed: f32,
    /// Allow rotation with zero velocity
    pub allow_stationary_turning: bool,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 50.0,
            max_speed: 700.0,
            turn_speed: 200.0,
            allow_stationary_turning: false,
        }
    }
}

impl VehicleConfig {
    /// Stock tuning for the turbo car
    pub fn turbo() -> Self {
        Self {
            max_speed: 1200.0,
            ..Self::default()
        }
    }

    /// Axis-aligned footprint (width, height)
    pub fn footprint(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        require_positive("vehicle width", self.width)?;
        require_positive("vehicle height", self.height)?;
        require_positive("max speed", self.max_speed)?;
        require_positive("turn speed", self.turn_speed)?;
        Ok(())
    }
}

/// Turbo drive model tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurboConfig {
    /// Forward acceleration (px/s²)
    pub acceleration_rate: f32,
    /// Braking rate (px/s², applied twice over)
    pub deceleration_rate: f32,
    /// Speed above which steering and drift behaviour change
    pub drift_threshold: f32,
    /// Steering multiplier past 1.2× the drift threshold
    pub control_reduction_factor: f32,
    /// Heat gained per second while accelerating and moving
    pub heat_generation_rate: f32,
    /// Heat lost per second otherwise
    pub heat_dissipation_rate: f32,
    pub overheat_threshold: f32,
    pub overheat_penalty_ms: f32,
    pub boost_power: f32,
    pub boost_duration_ms: f32,
    pub boost_cooldown_ms: f32,
}

impl Default for TurboConfig {
    fn default() -> Self {
        Self {
            acceleration_rate: 400.0,
            deceleration_rate: 300.0,
            drift_threshold: 600.0,
            control_reduction_factor: 0.6,
            heat_generation_rate: 20.0,
            heat_dissipation_rate: 12.5,
            overheat_threshold: 100.0,
            overheat_penalty_ms: 3000.0,
            boost_power: 1500.0,
            boost_duration_ms: 1000.0,
            boost_cooldown_ms: 5000.0,
        }
    }
}

impl TurboConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let positive = [
            ("acceleration rate", self.acceleration_rate),
            ("deceleration rate", self.deceleration_rate),
            ("drift threshold", self.drift_threshold),
            ("heat generation rate", self.heat_generation_rate),
            ("heat dissipation rate", self.heat_dissipation_rate),
            ("overheat threshold", self.overheat_threshold),
            ("overheat penalty", self.overheat_penalty_ms),
            ("boost power", self.boost_power),
            ("boost duration", self.boost_duration_ms),
            ("boost cooldown", self.boost_cooldown_ms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::InvalidTurbo { name, value });
            }
        }
        let reduction = self.control_reduction_factor;
        if !(reduction > 0.0 && reduction <= 1.0) {
            return Err(ConfigurationError::InvalidTurbo {
                name: "control reduction factor",
                value: reduction,
            });
        }
        Ok(())
    }
}

/// Which physics the vehicle runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DriveModel {
    Arcade,
    Turbo(TurboConfig),
}

/// Boost lifecycle; boosting and cooldown never overlap
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BoostPhase {
    #[default]
    Ready,
    Boosting { elapsed_ms: f32 },
    Cooldown { elapsed_ms: f32 },
}

/// Heat and boost state of the turbo model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TurboState {
    /// In [0, overheat_threshold]
    pub heat: f32,
    pub overheated: bool,
    pub overheat_timer_ms: f32,
    pub boost: BoostPhase,
}

impl TurboState {
    pub fn is_boosting(&self) -> bool {
        matches!(self.boost, BoostPhase::Boosting { .. })
    }

    pub fn boost_on_cooldown(&self) -> bool {
        matches!(self.boost, BoostPhase::Cooldown { .. })
    }
}

/// Mutable vehicle state shared with the track boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub position: Vec2,
    /// Degrees in [0, 360); 0 points toward -Y
    pub rotation: f32,
    /// Signed speed along the heading
    pub velocity: f32,
    pub last_velocity: f32,
    pub last_rotation: f32,
    pub on_track: bool,
    pub off_track_timer_ms: f32,
    /// Master switch; false freezes the vehicle entirely
    pub input_enabled: bool,
    /// False while off track: controls read as released
    pub keys_enabled: bool,
    pub turbo: TurboState,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: 0.0,
            last_velocity: 0.0,
            last_rotation: 0.0,
            on_track: true,
            off_track_timer_ms: 0.0,
            input_enabled: true,
            keys_enabled: true,
            turbo: TurboState::default(),
        }
    }
}

impl VehicleState {
    /// Put the vehicle on a pose at rest (race start or crash recovery)
    pub fn reset_to_pose(&mut self, pose: StartingPose) {
        self.position = pose.position;
        self.rotation = pose.rotation_degrees();
        self.last_rotation = self.rotation;
        self.velocity = 0.0;
        self.last_velocity = 0.0;
        self.on_track = true;
        self.off_track_timer_ms = 0.0;
        self.keys_enabled = true;
        self.turbo = TurboState::default();
    }

    /// Clamp the footprint inside a `surface`-sized area anchored at the origin
    pub fn keep_in_bounds(&mut self, surface: Vec2, footprint: Vec2) {
        let half = footprint / 2.0;
        let max = (surface - half).max(half);
        self.position = self.position.clamp(half, max);
    }
}

/// A drivable vehicle
#[derive(Debug, Clone)]
pub struct Vehicle {
    config: VehicleConfig,
    model: DriveModel,
    pub state: VehicleState,
}

impl Vehicle {
    pub fn new(config: VehicleConfig, model: DriveModel) -> Result<Self, ConfigurationError> {
        config.validate()?;
        if let DriveModel::Turbo(turbo) = &model {
            turbo.validate()?;
        }
        Ok(Self {
            config,
            model,
            state: VehicleState::default(),
        })
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn model(&self) -> &DriveModel {
        &self.model
    }

    pub fn footprint(&self) -> Vec2 {
        self.config.footprint()
    }

    /// Enable or disable the vehicle; disabling also stops it
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.state.input_enabled = enabled;
        if !enabled {
            self.state.velocity = 0.0;
        }
    }

    pub fn set_starting_pose(&mut self, pose: StartingPose) {
        self.state.reset_to_pose(pose);
    }

    /// Advance one tick
    pub fn update(&mut self, input: &DriveInput, dt: f32) {
        if !self.state.input_enabled {
            return;
        }
        let input = input.gated(self.state.keys_enabled);

        let previous_velocity = self.state.velocity;
        let previous_rotation = self.state.rotation;

        match self.model {
            DriveModel::Arcade => {
                self.accelerate_arcade(&input);
                self.steer(&input, dt, self.config.turn_speed);
            }
            // Frozen keys leave the speed to the boundary slowdown
            DriveModel::Turbo(turbo) if self.state.keys_enabled => {
                if self.state.turbo.overheated {
                    // Throttle is cut while the engine cools down
                    self.state.velocity *= TURBO_COAST_DECAY;
                } else {
                    self.accelerate_turbo(&input, dt, &turbo);
                }
                if self.can_turn() {
                    let turn_speed = self.turbo_turn_speed(&turbo);
                    self.steer(&input, dt, turn_speed);
                }
            }
            DriveModel::Turbo(_) => {}
        }

        self.state.rotation = normalize_degrees(self.state.rotation);
        if self.state.velocity != 0.0 {
            self.state.position += heading_vector(self.state.rotation) * self.state.velocity * dt;
        }

        self.state.last_velocity = previous_velocity;
        self.state.last_rotation = previous_rotation;

        if let DriveModel::Turbo(turbo) = self.model {
            let dt_ms = dt * 1000.0;
            self.update_heat(&input, dt, dt_ms, &turbo);
            self.update_boost(&input, dt_ms, &turbo);
        }
    }

    fn accelerate_arcade(&mut self, input: &DriveInput) {
        let max_speed = self.config.max_speed;
        let velocity = &mut self.state.velocity;

        if input.active_throttle_stick().is_some() {
            let throttle = input.throttle();
            if throttle != 0.0 {
                *velocity = max_speed * throttle;
            } else if *velocity != 0.0 {
                *velocity *= COAST_DECAY;
            }
            return;
        }

        if input.accelerate {
            *velocity = max_speed;
        } else if input.brake {
            *velocity = -max_speed * REVERSE_FACTOR;
        } else if input.handbrake {
            *velocity *= HANDBRAKE_DECAY;
        } else if *velocity != 0.0 {
            *velocity *= COAST_DECAY;
        }
    }

    fn accelerate_turbo(&mut self, input: &DriveInput, dt: f32, turbo: &TurboConfig) {
        let boosting = self.state.turbo.is_boosting();
        let throttle = input.throttle();
        let mut target = self.state.velocity;

        if boosting {
            // signum(0.0) is 1.0, so a boost from rest launches forward
            target = target.signum() * turbo.boost_power;
        } else if throttle > 0.0 {
            target += turbo.acceleration_rate * throttle * dt;
        } else if throttle < 0.0 {
            target += turbo.deceleration_rate * 2.0 * throttle * dt;
        } else if input.handbrake {
            target *= TURBO_HANDBRAKE_DECAY;
        } else {
            target *= TURBO_COAST_DECAY;
        }

        let limit = if boosting {
            turbo.boost_power
        } else {
            self.config.max_speed
        };
        self.state.velocity = target.clamp(-limit * REVERSE_FACTOR, limit);
    }

    /// Turn rate at the current speed; also applies the drift speed bleed
    fn turbo_turn_speed(&mut self, turbo: &TurboConfig) -> f32 {
        let mut turn_speed = self.config.turn_speed;

        if self.state.velocity.abs() > turbo.drift_threshold {
            let speed_factor = self.state.velocity.abs() / self.config.max_speed;
            turn_speed *= 1.0 + (speed_factor - 0.5) * 0.8;

            let last_turn = degrees_delta(self.state.last_rotation, self.state.rotation);
            if last_turn.abs() > DRIFT_ROTATION_DELTA {
                self.state.velocity *= DRIFT_PENALTY;
            }
        }
        if self.state.velocity.abs() > turbo.drift_threshold * 1.2 {
            turn_speed *= turbo.control_reduction_factor;
        }
        turn_speed
    }

    fn can_turn(&self) -> bool {
        self.config.allow_stationary_turning || self.state.velocity != 0.0
    }

    fn steer(&mut self, input: &DriveInput, dt: f32, turn_speed: f32) {
        if !self.can_turn() {
            return;
        }
        let steering = input.steering();
        if steering != 0.0 {
            self.state.rotation += steering * turn_speed * dt;
        }
    }

    fn update_heat(&mut self, input: &DriveInput, dt: f32, dt_ms: f32, turbo: &TurboConfig) {
        let state = &mut self.state.turbo;

        if state.overheated {
            state.overheat_timer_ms += dt_ms;
            if state.overheat_timer_ms >= turbo.overheat_penalty_ms {
                state.overheated = false;
                state.overheat_timer_ms = 0.0;
                state.heat = 0.0;
                log::debug!("Engine cooled down");
            }
            return;
        }

        let accelerating = input.throttle() > 0.0;
        if accelerating && self.state.velocity != 0.0 {
            state.heat += turbo.heat_generation_rate * dt;
        } else {
            state.heat -= turbo.heat_dissipation_rate * dt;
        }
        state.heat = state.heat.clamp(0.0, turbo.overheat_threshold);

        if state.heat >= turbo.overheat_threshold {
            state.overheated = true;
            log::info!("Engine overheated, throttle cut for {} ms", turbo.overheat_penalty_ms);
        }
    }

    fn update_boost(&mut self, input: &DriveInput, dt_ms: f32, turbo: &TurboConfig) {
        let state = &mut self.state.turbo;

        state.boost = match state.boost {
            BoostPhase::Boosting { elapsed_ms } => {
                let elapsed_ms = elapsed_ms + dt_ms;
                if elapsed_ms >= turbo.boost_duration_ms {
                    BoostPhase::Cooldown { elapsed_ms: 0.0 }
                } else {
                    BoostPhase::Boosting { elapsed_ms }
                }
            }
            BoostPhase::Cooldown { elapsed_ms } => {
                let elapsed_ms = elapsed_ms + dt_ms;
                if elapsed_ms >= turbo.boost_cooldown_ms {
                    BoostPhase::Ready
                } else {
                    BoostPhase::Cooldown { elapsed_ms }
                }
            }
            BoostPhase::Ready => BoostPhase::Ready,
        };

        if input.boost && state.boost == BoostPhase::Ready {
            state.boost = BoostPhase::Boosting { elapsed_ms: 0.0 };
            log::debug!("Boost engaged");
        }
    }

    /// Above the drift threshold (turbo only)
    pub fn is_drifting(&self) -> bool {
        match &self.model {
            DriveModel::Turbo(turbo) => self.state.velocity.abs() > turbo.drift_threshold,
            DriveModel::Arcade => false,
        }
    }

    /// Drifting while rotating faster than the skid rate; drives skid audio
    pub fn is_skidding(&self, dt: f32) -> bool {
        let turned = degrees_delta(self.state.last_rotation, self.state.rotation).abs();
        self.state.input_enabled
            && self.is_drifting()
            && self.state.velocity != 0.0
            && turned > SKID_ROTATION_RATE * dt
    }

    /// Speed as a fraction of max speed, for gauges
    pub fn speed_fraction(&self) -> f32 {
        self.state.velocity.abs() / self.config.max_speed
    }

    /// Heat as a fraction of the overheat threshold (0 for arcade)
    pub fn heat_fraction(&self) -> f32 {
        match &self.model {
            DriveModel::Turbo(turbo) => self.state.turbo.heat / turbo.overheat_threshold,
            DriveModel::Arcade => 0.0,
        }
    }

    /// Boost availability in [0, 1]; 1 when ready
    pub fn boost_charge(&self) -> f32 {
        match (&self.model, self.state.turbo.boost) {
            (DriveModel::Turbo(_), BoostPhase::Ready) => 1.0,
            (DriveModel::Turbo(turbo), BoostPhase::Cooldown { elapsed_ms }) => {
                (elapsed_ms / turbo.boost_cooldown_ms).min(1.0)
            }
            _ => 0.0,
        }
    }
}
