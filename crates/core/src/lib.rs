//! Atmospherics Core Library
//!
//! A tile-based gas simulation: every grid cell holds a mixture of gases and
//! exchanges pressure, composition and heat with its four neighbours once per
//! fixed simulation step. Cells fall asleep when their surroundings settle and
//! are woken again by external mutation or by neighbouring flow.
//!
//! ## Structure
//!
//! - [`GasMixture`]: per-cell container of species amounts, temperature and volume
//! - [`Cell`] and [`CellGrid`]: activity state machine plus the flux, mixing and
//!   heat exchange passes over a flat arena of cells
//! - [`AtmosDevice`]: pumps, scrubbers and other loop devices stepped after the cells
//! - [`AtmosSimulation`]: the fixed-step scheduler that ties everything together

// Core types and utilities
pub mod core_types;

pub mod device;
pub mod error;
pub mod grid;
pub mod mixture;
pub mod simulation;

// Re-export core types
pub use core_types::{Species, Vec2, SPECIES_COUNT};

pub use device::{AtmosDevice, DeviceContext, GasEndpoint, GasPump, Network, Scrubber};
pub use error::AtmosError;
pub use grid::{Cell, CellGrid, CellId, CellState, Direction, TileLayout};
pub use mixture::GasMixture;
pub use simulation::{
    AtmosConfig, AtmosSimulation, FixedStepDriver, GridSnapshot, GridStats, TickReport, WindPush,
};
