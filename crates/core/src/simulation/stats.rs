//! Read-only aggregate statistics over an arena

use crate::grid::{Cell, CellGrid, CellState};
use rayon::prelude::*;

/// Summary of one arena at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridStats {
    pub cells: usize,
    /// Total amount of gas (mol)
    pub total_moles: f32,
    /// Total mass (g)
    pub total_mass: f32,
    /// Mean pressure over open cells (kPa)
    pub mean_pressure: f32,
    /// Highest pressure of any open cell (kPa)
    pub max_pressure: f32,
    pub active: usize,
    pub semi_active: usize,
    pub inactive: usize,
    pub vacuum: usize,
    pub blocked: usize,
}

impl GridStats {
    /// Gather statistics in parallel
    pub fn collect(grid: &CellGrid) -> Self {
        let partial = grid
            .cells()
            .par_iter()
            .map(Self::from_cell)
            .reduce(Self::default, Self::merge);

        let open = partial.cells - partial.blocked - partial.vacuum;
        Self {
            mean_pressure: if open > 0 {
                partial.mean_pressure / open as f32
            } else {
                0.0
            },
            ..partial
        }
    }

    /// Stats of a single cell; `mean_pressure` holds the pressure sum until `collect` divides it
    fn from_cell(cell: &Cell) -> Self {
        let mut stats = Self {
            cells: 1,
            total_moles: cell.total_moles(),
            total_mass: cell.mixture().total_mass(),
            ..Self::default()
        };
        match cell.state() {
            CellState::Active => stats.active = 1,
            CellState::SemiActive => stats.semi_active = 1,
            CellState::Inactive => stats.inactive = 1,
            CellState::Vacuum => stats.vacuum = 1,
            CellState::Blocked => stats.blocked = 1,
        }
        if !matches!(cell.state(), CellState::Blocked | CellState::Vacuum) {
            stats.mean_pressure = cell.pressure();
            stats.max_pressure = cell.pressure();
        }
        stats
    }

    fn merge(a: Self, b: Self) -> Self {
        Self {
            cells: a.cells + b.cells,
            total_moles: a.total_moles + b.total_moles,
            total_mass: a.total_mass + b.total_mass,
            mean_pressure: a.mean_pressure + b.mean_pressure,
            max_pressure: a.max_pressure.max(b.max_pressure),
            active: a.active + b.active,
            semi_active: a.semi_active + b.semi_active,
            inactive: a.inactive + b.inactive,
            vacuum: a.vacuum + b.vacuum,
            blocked: a.blocked + b.blocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellId;
    use approx::assert_relative_eq;

    #[test]
    fn test_collect_counts_states() {
        let mut grid = CellGrid::with_cells(4, 2.5);
        grid.get_mut(CellId::new(0)).unwrap().make_air();
        grid.get_mut(CellId::new(1)).unwrap().make_air();
        grid.get_mut(CellId::new(2)).unwrap().set_blocked(true);
        grid.get_mut(CellId::new(3)).unwrap().set_vacuum();

        let stats = GridStats::collect(&grid);
        assert_eq!(stats.cells, 4);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.blocked, 1);
        assert_eq!(stats.vacuum, 1);
        assert_relative_eq!(stats.total_moles, 2.0 * 103.96, max_relative = 1e-4);

        let air = grid.get(CellId::new(0)).unwrap().pressure();
        assert_relative_eq!(stats.mean_pressure, air, max_relative = 1e-5);
        assert_relative_eq!(stats.max_pressure, air, max_relative = 1e-5);
    }

    #[test]
    fn test_empty_grid() {
        let stats = GridStats::collect(&CellGrid::new());
        assert_eq!(stats, GridStats::default());
    }
}
