//! Physical and numerical constants of the atmospherics solver
//!
//! Pressures are in kPa, temperatures in kelvin, volumes in m³ and amounts in
//! moles. The stability thresholds are tuned together: changing one of them
//! usually changes how quickly cells fall asleep.

/// Fixed simulation step (s)
pub const DELTA_TIME: f32 = 0.1;

/// Universal gas constant [J/(mol·K)]
pub const GAS_CONSTANT: f32 = 8.314;

/// Damping applied to last tick's flux so gas doesn't slosh forever
pub const FLUID_DRAG: f32 = 0.95;

/// Rate of temperature equalization, multiplied by the cell volume
pub const THERMAL_BASE: f32 = 0.024;

/// Fraction of a species gap moved per mixing pass
pub const MIX_RATE: f32 = 0.1;

/// Minimum flux (kPa·s) worth simulating
pub const FLUX_EPSILON: f32 = 0.025;

/// Minimum temperature step (K) worth simulating
pub const THERMAL_EPSILON: f32 = 0.01;

/// Upper bound on a single directional flux
pub const MAX_FLUX: f32 = 1000.0;

/// Mixing amounts below this are replaced by a half-gap split
pub const MIX_SPLIT_THRESHOLD: f32 = 0.05;

/// Species gaps below this are not mixed at all
pub const MIX_MIN_GAP: f32 = 0.01;

/// Pressure gap (kPa) above which a mixed neighbour stays fully active
pub const WAKE_PRESSURE_DELTA: f32 = 0.1;

/// Residual amounts at or below this are deleted when a cell goes inactive
pub const RESIDUAL_PURGE: f32 = 0.1;

/// Neighbour pressure (kPa) that breaches a blocked cell
pub const OVER_PRESSURE_LIMIT: f32 = 2000.0;

/// Force applied per unit of wind velocity
pub const WIND_FACTOR: f32 = 0.2;

/// Minimum wind velocity on either axis required to move objects
pub const MINIMUM_WIND: f32 = 1.0;

/// Maximum moles a device moves per step
pub const MAX_MOLE_TRANSFER: f32 = 2.0;

/// Minimum moles a device moves per step (unless the source holds less)
pub const MIN_MOLE_TRANSFER: f32 = 0.1;

/// Default cell volume (m³)
pub const DEFAULT_VOLUME: f32 = 2.5;

/// Default temperature of a fresh mixture (K)
pub const DEFAULT_TEMPERATURE: f32 = 293.0;
