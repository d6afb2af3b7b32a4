//! Race settings
//!
//! Plain-data tuning for a race. Hosts load it however they like and hand the
//! JSON text (or the struct) to the core; missing fields take defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::sim::{
    BoundaryConfig, LapConfig, StartingGridConfig, TrackGeometry, TurboConfig, VehicleConfig,
};

/// Car presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CarPreset {
    #[default]
    Arcade,
    Turbo,
}

impl CarPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarPreset::Arcade => "Arcade",
            CarPreset::Turbo => "Turbo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arcade" => Some(CarPreset::Arcade),
            "turbo" => Some(CarPreset::Turbo),
            _ => None,
        }
    }
}

/// Track dimensions; the center comes from the host surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub length: f32,
    pub height: f32,
    pub road_width: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            length: 1500.0,
            height: 700.0,
            road_width: 160.0,
        }
    }
}

impl TrackConfig {
    /// Build the geometry centred on a surface of the given size
    pub fn geometry(&self, surface: Vec2) -> Result<TrackGeometry, ConfigurationError> {
        TrackGeometry::new(self.length, self.height, self.road_width, surface / 2.0)
    }
}

/// Everything a race session needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    pub track: TrackConfig,
    pub boundary: BoundaryConfig,
    /// Without a boundary the car is only kept inside the surface
    pub boundary_enabled: bool,
    pub vehicle: VehicleConfig,
    /// Turbo physics when present, arcade otherwise
    pub turbo: Option<TurboConfig>,
    pub laps: LapConfig,
    pub grid: StartingGridConfig,
    /// Countdown before the lights go green (ms)
    pub countdown_ms: f32,
    /// Entries kept on the best-times board
    pub best_times_capacity: usize,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            track: TrackConfig::default(),
            boundary: BoundaryConfig::default(),
            boundary_enabled: true,
            vehicle: VehicleConfig::default(),
            turbo: None,
            laps: LapConfig::default(),
            grid: StartingGridConfig::default(),
            countdown_ms: 3000.0,
            best_times_capacity: crate::best_times::MAX_BEST_TIMES,
        }
    }
}

impl RaceSettings {
    /// Settings for a car preset
    pub fn from_preset(preset: CarPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Swap the car tuning for a preset
    pub fn apply_preset(&mut self, preset: CarPreset) {
        match preset {
            CarPreset::Arcade => {
                self.vehicle = VehicleConfig::default();
                self.turbo = None;
            }
            CarPreset::Turbo => {
                self.vehicle = VehicleConfig::turbo();
                self.turbo = Some(TurboConfig::default());
            }
        }
    }

    pub fn preset(&self) -> CarPreset {
        if self.turbo.is_some() {
            CarPreset::Turbo
        } else {
            CarPreset::Arcade
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded {} race settings", settings.preset().as_str());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Report the first invalid value
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let geometry = self.track.geometry(Vec2::ZERO)?;
        if self.boundary_enabled {
            crate::sim::TrackBoundary::new(geometry, self.boundary)?;
        }
        self.vehicle.validate()?;
        if let Some(turbo) = &self.turbo {
            turbo.validate()?;
        }
        self.laps.validate()?;
        if !(self.countdown_ms.is_finite() && self.countdown_ms >= 0.0) {
            return Err(ConfigurationError::NegativeMargin {
                name: "countdown",
                value: self.countdown_ms,
            });
        }
        if !self.grid.offset.is_finite() {
            return Err(ConfigurationError::InvalidDimension {
                name: "grid offset",
                value: self.grid.offset,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = RaceSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.laps.max_laps, 5);
        assert_eq!(settings.boundary.max_off_track_ms, 3000.0);
        assert!(RaceSettings::from_preset(CarPreset::Turbo).validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = RaceSettings::from_json(
            r#"{ "laps": { "max_laps": 3 }, "track": { "length": 1700.0, "height": 900.0 } }"#,
        )
        .unwrap();
        assert_eq!(settings.laps.max_laps, 3);
        assert_eq!(settings.laps.sector_count, 4);
        assert_eq!(settings.track.road_width, 160.0);
        assert_eq!(settings.track.length, 1700.0);
        assert_eq!(settings.preset(), CarPreset::Arcade);
    }

    #[test]
    fn test_turbo_section_selects_turbo() {
        let settings =
            RaceSettings::from_json(r#"{ "turbo": { "boost_power": 1800.0 } }"#).unwrap();
        assert_eq!(settings.preset(), CarPreset::Turbo);
        assert_eq!(settings.turbo.map(|t| t.boost_power), Some(1800.0));
        assert_eq!(settings.turbo.map(|t| t.drift_threshold), Some(600.0));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            RaceSettings::from_json(r#"{ "laps": { "sector_count": 0 } }"#),
            Err(ConfigurationError::InvalidSectorCount(0))
        ));
        assert!(matches!(
            RaceSettings::from_json(r#"{ "boundary": { "off_track_slowdown": 0.0 } }"#),
            Err(ConfigurationError::InvalidSlowdown(_))
        ));
        assert!(matches!(
            RaceSettings::from_json(r#"{ "track": { "road_width": 900.0 } }"#),
            Err(ConfigurationError::DegenerateTrack { .. })
        ));
        assert!(matches!(
            RaceSettings::from_json("{ not json"),
            Err(ConfigurationError::Parse(_))
        ));
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(CarPreset::from_str("TURBO"), Some(CarPreset::Turbo));
        assert_eq!(CarPreset::from_str("kart"), None);
        assert_eq!(CarPreset::Arcade.as_str(), "Arcade");
    }

    #[test]
    fn test_json_round_trip_keeps_settings() {
        let settings = RaceSettings::from_preset(CarPreset::Turbo);
        let json = settings.to_json().unwrap();
        assert_eq!(RaceSettings::from_json(&json).unwrap(), settings);
    }
}
