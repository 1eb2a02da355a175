//! Scrubber pulling selected species out of a room into a pipe

use super::{AtmosDevice, DeviceContext, GasEndpoint};
use crate::core_types::constants::MAX_MOLE_TRANSFER;
use crate::core_types::Species;
use crate::grid::{CellId, Direction};
use tracing::debug;

/// Moves filtered species from its tile (and optionally the adjacent tiles)
/// into a pipe segment
#[derive(Debug, Clone)]
pub struct Scrubber {
    tile: CellId,
    outlet: GasEndpoint,
    filter: Vec<Species>,
    /// Also scrub the four neighbouring tiles
    wide: bool,
    /// Per-species transfer cap per tick and tile (mol)
    rate: f32,
    neighbors: [Option<CellId>; 4],
    sources: Vec<GasEndpoint>,
    scrubbed_total: f32,
}

impl Scrubber {
    pub fn new(tile: CellId, outlet: CellId, filter: &[Species]) -> Self {
        Self {
            tile,
            outlet: GasEndpoint::pipe(outlet),
            filter: filter.to_vec(),
            wide: false,
            rate: MAX_MOLE_TRANSFER,
            neighbors: [None; 4],
            sources: Vec::new(),
            scrubbed_total: 0.0,
        }
    }

    /// Scrub the adjacent tiles too
    pub fn wide(mut self) -> Self {
        self.wide = true;
        self
    }

    pub fn filter(&self) -> &[Species] {
        &self.filter
    }

    /// Gas removed since initialization (mol)
    pub fn scrubbed_total(&self) -> f32 {
        self.scrubbed_total
    }
}

impl AtmosDevice for Scrubber {
    fn name(&self) -> &str {
        "scrubber"
    }

    fn set_neighbor(&mut self, neighbor: Option<CellId>, direction: Direction) {
        self.neighbors[direction.index()] = neighbor;
    }

    fn finalize_neighbors(&mut self) {
        self.sources = vec![GasEndpoint::tile(self.tile)];
        if self.wide {
            self.sources
                .extend(self.neighbors.iter().flatten().map(|&id| GasEndpoint::tile(id)));
        }
    }

    fn initialize(&mut self, _ctx: &mut DeviceContext<'_>) {
        self.scrubbed_total = 0.0;
        debug!(
            "Scrubber on tile {} filtering {:?} from {} tiles",
            self.tile.index(),
            self.filter,
            self.sources.len()
        );
    }

    fn step(&mut self, ctx: &mut DeviceContext<'_>) {
        for &source in &self.sources {
            for &species in &self.filter {
                self.scrubbed_total += ctx.transfer_species(source, self.outlet, species, self.rate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellGrid, TileLayout};
    use approx::assert_relative_eq;

    #[test]
    fn test_scrubber_only_takes_filtered_species() {
        let layout = TileLayout::rectangular(2, 1);
        let mut tiles = layout.build_grid(2.5).unwrap();
        let mut pipes = CellGrid::with_cells(1, 2.5);
        pipes.finalize_neighbors().unwrap();

        let room = CellId::new(0);
        tiles.get_mut(room).unwrap().make_air();
        tiles.get_mut(room).unwrap().add_gas(Species::CarbonDioxide, 3.0);
        tiles.get_mut(CellId::new(1)).unwrap().add_gas(Species::CarbonDioxide, 1.0);

        let mut scrubber = Scrubber::new(room, CellId::new(0), &[Species::CarbonDioxide]);
        scrubber.finalize_neighbors();
        let mut ctx = DeviceContext::new(&mut tiles, &mut pipes);
        scrubber.initialize(&mut ctx);
        scrubber.step(&mut ctx);

        let cell = ctx.tiles.get(room).unwrap();
        assert_relative_eq!(cell.mixture().get(Species::CarbonDioxide), 1.0, max_relative = 1e-5);
        assert_relative_eq!(cell.mixture().get(Species::Oxygen), 20.79, max_relative = 1e-5);
        let pipe = ctx.pipes.get(CellId::new(0)).unwrap();
        assert_relative_eq!(pipe.mixture().get(Species::CarbonDioxide), 2.0, max_relative = 1e-5);
        // Narrow mode leaves the neighbour alone
        assert_eq!(ctx.tiles.get(CellId::new(1)).unwrap().mixture().get(Species::CarbonDioxide), 1.0);
    }

    #[test]
    fn test_wide_scrubber_reaches_neighbors() {
        let layout = TileLayout::rectangular(2, 1);
        let mut tiles = layout.build_grid(2.5).unwrap();
        let mut pipes = CellGrid::with_cells(1, 2.5);
        pipes.finalize_neighbors().unwrap();
        tiles.get_mut(CellId::new(1)).unwrap().add_gas(Species::Plasma, 1.5);

        let mut scrubber = Scrubber::new(CellId::new(0), CellId::new(0), &[Species::Plasma]).wide();
        scrubber.set_neighbor(Some(CellId::new(1)), Direction::East);
        scrubber.finalize_neighbors();
        let mut ctx = DeviceContext::new(&mut tiles, &mut pipes);
        scrubber.step(&mut ctx);

        assert_relative_eq!(scrubber.scrubbed_total(), 1.5, max_relative = 1e-5);
        assert_eq!(ctx.tiles.get(CellId::new(1)).unwrap().mixture().get(Species::Plasma), 0.0);
    }
}
