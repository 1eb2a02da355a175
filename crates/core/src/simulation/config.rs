//! Scheduler configuration

use crate::core_types::constants::{DEFAULT_VOLUME, DELTA_TIME, MINIMUM_WIND, WIND_FACTOR};
use crate::error::AtmosError;
use serde::{Deserialize, Serialize};

/// Tunables for an [`crate::AtmosSimulation`]
///
/// The flux and mixing constants are fixed; these only control how the
/// scheduler is driven and what it reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosConfig {
    /// Wall-clock seconds between ticks
    pub update_rate: f32,
    /// Volume of a tile cell (m³)
    pub cell_volume: f32,
    /// Volume of a pipe segment (m³)
    pub pipe_volume: f32,
    /// Velocity component a cell must exceed to emit a wind push
    pub minimum_wind: f32,
    /// Multiplier from cell velocity to pushing force
    pub wind_factor: f32,
    /// Most ticks [`crate::FixedStepDriver`] runs for a single update
    pub max_catch_up_ticks: u32,
}

impl Default for AtmosConfig {
    fn default() -> Self {
        Self {
            update_rate: DELTA_TIME,
            cell_volume: DEFAULT_VOLUME,
            pipe_volume: DEFAULT_VOLUME,
            minimum_wind: MINIMUM_WIND,
            wind_factor: WIND_FACTOR,
            max_catch_up_ticks: 4,
        }
    }
}

impl AtmosConfig {
    /// Check every value is usable
    ///
    /// # Errors
    /// Returns [`AtmosError::InvalidConfig`] naming the first bad field
    pub fn validate(&self) -> Result<(), AtmosError> {
        let positive = [
            ("update_rate", self.update_rate),
            ("cell_volume", self.cell_volume),
            ("pipe_volume", self.pipe_volume),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AtmosError::InvalidConfig(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        for (field, value) in [("minimum_wind", self.minimum_wind), ("wind_factor", self.wind_factor)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AtmosError::InvalidConfig(format!(
                    "{field} must be non-negative, got {value}"
                )));
            }
        }
        if self.max_catch_up_ticks == 0 {
            return Err(AtmosError::InvalidConfig(
                "max_catch_up_ticks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
