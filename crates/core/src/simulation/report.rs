//! Per-tick results handed back to the caller

use crate::core_types::Vec2;
use crate::grid::CellId;

/// Force to apply to loose objects on a tile this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindPush {
    pub cell: CellId,
    /// `velocity · wind_factor`
    pub force: Vec2,
}

/// Outcome of one scheduler tick
///
/// Over-pressure entries are signals only; the simulation never reacts to
/// them itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Tick number, starting at 1 for the first executed tick (0 for a skipped step)
    pub tick: u64,
    /// Tiles that were `Active` during the simulate phase
    pub active_cells: usize,
    /// Pipe segments that were `Active` during the simulate phase
    pub active_pipes: usize,
    pub wind_pushes: Vec<WindPush>,
    /// Walls facing over-pressure on the tile network
    pub breaches: Vec<CellId>,
    /// Walls facing over-pressure on the pipe network
    pub pipe_breaches: Vec<CellId>,
}

impl TickReport {
    /// True if any wall on either network reported over-pressure
    pub fn has_breach(&self) -> bool {
        !self.breaches.is_empty() || !self.pipe_breaches.is_empty()
    }
}
