//! Configuration errors
//!
//! The simulation math itself never fails; everything that can go wrong is
//! rejected when components are constructed.

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },
    #[error("{name} must be a non-negative finite number, got {value}")]
    NegativeMargin { name: &'static str, value: f32 },
    #[error("track length {length} is shorter than its height {height}")]
    TrackTooShort { length: f32, height: f32 },
    #[error("degenerate track: inner band half-height would be {inner_half_height}")]
    DegenerateTrack { inner_half_height: f32 },
    #[error("off-track slowdown factor must be in (0, 1], got {0}")]
    InvalidSlowdown(f32),
    #[error("sector count must be at least 1, got {0}")]
    InvalidSectorCount(u32),
    #[error("max laps must be at least 1, got {0}")]
    InvalidMaxLaps(u32),
    #[error("turbo {name} is out of range: {value}")]
    InvalidTurbo { name: &'static str, value: f32 },
    #[error("invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reject NaN, infinities, zero and negatives
pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<f32, ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigurationError::InvalidDimension { name, value })
    }
}

/// Reject NaN, infinities and negatives
pub(crate) fn require_margin(name: &'static str, value: f32) -> Result<f32, ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigurationError::NegativeMargin { name, value })
    }
}
