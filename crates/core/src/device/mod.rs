//! Loop devices: pumps, scrubbers and anything else that moves gas outside
//! the four-neighbour diffusion model
//!
//! Devices are wired with the same two-pass contract as cells, initialized
//! once after wiring, and stepped once per tick after both flux phases have
//! finished on the tiles. They reach gas through a [`DeviceContext`], which
//! routes every transfer through the cell mutation API so touched cells wake.

pub mod pump;
pub mod scrubber;

pub use pump::GasPump;
pub use scrubber::Scrubber;

use crate::core_types::Species;
use crate::grid::{Cell, CellGrid, CellId, CellState, Direction};
use tracing::trace;

/// Which arena a cell id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Room tiles
    Tiles,
    /// Pipe segments
    Pipes,
}

/// A cell on one of the two networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GasEndpoint {
    pub network: Network,
    pub cell: CellId,
}

impl GasEndpoint {
    /// Tile endpoint
    pub const fn tile(cell: CellId) -> Self {
        Self {
            network: Network::Tiles,
            cell,
        }
    }

    /// Pipe endpoint
    pub const fn pipe(cell: CellId) -> Self {
        Self {
            network: Network::Pipes,
            cell,
        }
    }
}

/// Mutable view of both arenas handed to devices
pub struct DeviceContext<'a> {
    pub tiles: &'a mut CellGrid,
    pub pipes: &'a mut CellGrid,
}

impl<'a> DeviceContext<'a> {
    pub fn new(tiles: &'a mut CellGrid, pipes: &'a mut CellGrid) -> Self {
        Self { tiles, pipes }
    }

    /// Arena of a network
    pub fn grid(&self, network: Network) -> &CellGrid {
        match network {
            Network::Tiles => &*self.tiles,
            Network::Pipes => &*self.pipes,
        }
    }

    fn grid_mut(&mut self, network: Network) -> &mut CellGrid {
        match network {
            Network::Tiles => &mut *self.tiles,
            Network::Pipes => &mut *self.pipes,
        }
    }

    /// Cell behind an endpoint
    pub fn cell(&self, endpoint: GasEndpoint) -> Option<&Cell> {
        self.grid(endpoint.network).get(endpoint.cell)
    }

    /// Pressure at an endpoint (kPa)
    pub fn pressure(&self, endpoint: GasEndpoint) -> Option<f32> {
        self.cell(endpoint).map(Cell::pressure)
    }

    /// Check that gas may leave `from` and enter `to`
    ///
    /// Returns `None` when the transfer can't happen, otherwise whether the
    /// destination is a vacuum that swallows everything it gets.
    fn route(&self, from: GasEndpoint, to: GasEndpoint) -> Option<bool> {
        if from == to {
            return None;
        }
        let source = self.cell(from)?;
        let target = self.cell(to)?;
        if matches!(source.state(), CellState::Blocked | CellState::Vacuum)
            || target.state() == CellState::Blocked
        {
            return None;
        }
        Some(target.state() == CellState::Vacuum)
    }

    /// Move up to `moles` of gas from one endpoint to another, keeping the
    /// source composition. Returns the amount moved.
    pub fn transfer_moles(&mut self, from: GasEndpoint, to: GasEndpoint, moles: f32) -> f32 {
        let Some(into_vacuum) = self.route(from, to) else {
            return 0.0;
        };
        let Some(source) = self.cell(from) else {
            return 0.0;
        };
        let total = source.total_moles();
        if moles <= 0.0 || total <= 0.0 {
            return 0.0;
        }
        let moved = moles.min(total);
        let fraction = moved / total;
        let amounts = *source.amounts();

        for species in Species::ALL {
            let amount = amounts[species.index()] * fraction;
            if amount > 0.0 {
                self.shift(from, to, species, amount, into_vacuum);
            }
        }
        trace!("Moved {moved:.3} mol from {from:?} to {to:?}");
        moved
    }

    /// Move up to `moles` of one species. Returns the amount moved.
    pub fn transfer_species(
        &mut self,
        from: GasEndpoint,
        to: GasEndpoint,
        species: Species,
        moles: f32,
    ) -> f32 {
        let Some(into_vacuum) = self.route(from, to) else {
            return 0.0;
        };
        let available = self
            .cell(from)
            .map_or(0.0, |cell| cell.mixture().get(species));
        let moved = moles.min(available);
        if moved <= 0.0 {
            return 0.0;
        }
        self.shift(from, to, species, moved, into_vacuum);
        trace!("Moved {moved:.3} mol of {species} from {from:?} to {to:?}");
        moved
    }

    fn shift(
        &mut self,
        from: GasEndpoint,
        to: GasEndpoint,
        species: Species,
        amount: f32,
        into_vacuum: bool,
    ) {
        if let Some(cell) = self.grid_mut(from.network).get_mut(from.cell) {
            cell.remove_gas(species, amount);
        }
        if into_vacuum {
            return;
        }
        if let Some(cell) = self.grid_mut(to.network).get_mut(to.cell) {
            cell.add_gas(species, amount);
        }
    }
}

/// A device stepped by the scheduler alongside the cells
///
/// Wiring mirrors [`CellGrid::set_neighbor`]/[`CellGrid::finalize_neighbors`]:
/// the scheduler hands over the device's neighbouring tiles one direction at
/// a time, then calls `finalize_neighbors` once every device is wired.
pub trait AtmosDevice: Send {
    /// Human-readable device name for logs
    fn name(&self) -> &str;

    /// First wiring pass: neighbouring tile in `direction`
    fn set_neighbor(&mut self, neighbor: Option<CellId>, direction: Direction);

    /// Second wiring pass, after every device has received its neighbours
    fn finalize_neighbors(&mut self) {}

    /// Called once after wiring is complete
    fn initialize(&mut self, _ctx: &mut DeviceContext<'_>) {}

    /// Called once per tick after the tile flux phases
    fn step(&mut self, ctx: &mut DeviceContext<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arenas() -> (CellGrid, CellGrid) {
        let mut tiles = CellGrid::with_cells(2, 2.5);
        let mut pipes = CellGrid::with_cells(1, 2.5);
        tiles.finalize_neighbors().unwrap();
        pipes.finalize_neighbors().unwrap();
        (tiles, pipes)
    }

    #[test]
    fn test_transfer_keeps_composition() {
        let (mut tiles, mut pipes) = arenas();
        tiles.get_mut(CellId::new(0)).unwrap().make_air();
        let mut ctx = DeviceContext::new(&mut tiles, &mut pipes);

        let from = GasEndpoint::tile(CellId::new(0));
        let to = GasEndpoint::pipe(CellId::new(0));
        let moved = ctx.transfer_moles(from, to, 10.0);
        assert_relative_eq!(moved, 10.0, max_relative = 1e-5);

        let pipe = ctx.cell(to).unwrap();
        let oxygen_share = pipe.mixture().get(Species::Oxygen) / pipe.total_moles();
        assert_relative_eq!(oxygen_share, 20.79 / 103.96, max_relative = 1e-4);
    }

    #[test]
    fn test_transfer_wakes_destination() {
        let (mut tiles, mut pipes) = arenas();
        tiles.get_mut(CellId::new(0)).unwrap().add_gas(Species::Plasma, 4.0);
        tiles.get_mut(CellId::new(1)).unwrap().state = CellState::Inactive;
        let mut ctx = DeviceContext::new(&mut tiles, &mut pipes);

        let moved = ctx.transfer_species(
            GasEndpoint::tile(CellId::new(0)),
            GasEndpoint::tile(CellId::new(1)),
            Species::Plasma,
            10.0,
        );
        assert_eq!(moved, 4.0);
        assert_eq!(ctx.tiles.get(CellId::new(1)).unwrap().state(), CellState::Active);
    }

    #[test]
    fn test_walls_and_vacuum_endpoints() {
        let (mut tiles, mut pipes) = arenas();
        tiles.get_mut(CellId::new(0)).unwrap().make_air();
        tiles.get_mut(CellId::new(1)).unwrap().set_blocked(true);
        let from = GasEndpoint::tile(CellId::new(0));
        let wall = GasEndpoint::tile(CellId::new(1));

        let mut ctx = DeviceContext::new(&mut tiles, &mut pipes);
        assert_eq!(ctx.transfer_moles(from, wall, 5.0), 0.0);
        assert_eq!(ctx.transfer_moles(from, from, 5.0), 0.0);

        ctx.tiles.get_mut(CellId::new(1)).unwrap().set_blocked(false);
        ctx.tiles.get_mut(CellId::new(1)).unwrap().set_vacuum();
        let before = ctx.cell(from).unwrap().total_moles();
        assert_relative_eq!(ctx.transfer_moles(from, wall, 5.0), 5.0, max_relative = 1e-5);
        assert_relative_eq!(ctx.cell(from).unwrap().total_moles(), before - 5.0, max_relative = 1e-5);
        assert_eq!(ctx.cell(wall).unwrap().total_moles(), 0.0);
        assert_eq!(ctx.cell(wall).unwrap().state(), CellState::Vacuum);
    }
}
