//! Pressure pump between two endpoints

use super::{AtmosDevice, DeviceContext, GasEndpoint};
use crate::core_types::constants::{GAS_CONSTANT, MAX_MOLE_TRANSFER, MIN_MOLE_TRANSFER};
use crate::grid::{CellId, Direction};
use tracing::{debug, warn};

/// Where a pump port gets its endpoint from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Port {
    /// Neighbouring tile, resolved during wiring
    Facing(Direction),
    /// Explicit endpoint (e.g. a pipe segment)
    Fixed(GasEndpoint),
}

/// Pushes gas from its input to its output until the output reaches a target pressure
#[derive(Debug, Clone)]
pub struct GasPump {
    name: String,
    input: Port,
    output: Port,
    /// Output pressure the pump stops at (kPa)
    target_pressure: f32,
    neighbors: [Option<CellId>; 4],
    resolved: Option<(GasEndpoint, GasEndpoint)>,
    /// Gas moved since initialization (mol)
    moved_total: f32,
}

impl GasPump {
    /// Pump between two neighbouring tiles of the tile it is attached to
    pub fn facing(input: Direction, output: Direction, target_pressure: f32) -> Self {
        Self::with_ports(Port::Facing(input), Port::Facing(output), target_pressure)
    }

    /// Pump between two explicit endpoints
    pub fn between(input: GasEndpoint, output: GasEndpoint, target_pressure: f32) -> Self {
        Self::with_ports(Port::Fixed(input), Port::Fixed(output), target_pressure)
    }

    fn with_ports(input: Port, output: Port, target_pressure: f32) -> Self {
        Self {
            name: "gas pump".to_string(),
            input,
            output,
            target_pressure: target_pressure.max(0.0),
            neighbors: [None; 4],
            resolved: None,
            moved_total: 0.0,
        }
    }

    /// Rename for logs
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn target_pressure(&self) -> f32 {
        self.target_pressure
    }

    pub fn set_target_pressure(&mut self, target: f32) {
        self.target_pressure = target.max(0.0);
    }

    /// Gas moved since initialization (mol)
    pub fn moved_total(&self) -> f32 {
        self.moved_total
    }

    /// Resolved `(input, output)` endpoints, `None` until wired or if a side is missing
    pub fn endpoints(&self) -> Option<(GasEndpoint, GasEndpoint)> {
        self.resolved
    }

    fn resolve(&self, port: Port) -> Option<GasEndpoint> {
        match port {
            Port::Facing(direction) => self.neighbors[direction.index()].map(GasEndpoint::tile),
            Port::Fixed(endpoint) => Some(endpoint),
        }
    }

    /// Moles to add at the output to reach the target pressure
    fn wanted_moles(&self, ctx: &DeviceContext<'_>, output: GasEndpoint) -> f32 {
        let Some(cell) = ctx.cell(output) else {
            return 0.0;
        };
        let deficit = self.target_pressure - cell.pressure();
        if deficit <= 0.0 {
            return 0.0;
        }
        let temperature = cell.temperature();
        if temperature <= 0.0 {
            return MAX_MOLE_TRANSFER;
        }
        let moles = deficit * 1000.0 * cell.mixture().volume() / (GAS_CONSTANT * temperature);
        moles.clamp(MIN_MOLE_TRANSFER, MAX_MOLE_TRANSFER)
    }
}

impl AtmosDevice for GasPump {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_neighbor(&mut self, neighbor: Option<CellId>, direction: Direction) {
        self.neighbors[direction.index()] = neighbor;
    }

    fn finalize_neighbors(&mut self) {
        self.resolved = match (self.resolve(self.input), self.resolve(self.output)) {
            (Some(input), Some(output)) if input != output => Some((input, output)),
            _ => {
                warn!("{}: missing or identical input/output, pump stays idle", self.name);
                None
            }
        };
    }

    fn initialize(&mut self, _ctx: &mut DeviceContext<'_>) {
        self.moved_total = 0.0;
        debug!("{}: endpoints {:?}", self.name, self.resolved);
    }

    fn step(&mut self, ctx: &mut DeviceContext<'_>) {
        let Some((input, output)) = self.resolved else {
            return;
        };
        let wanted = self.wanted_moles(ctx, output);
        if wanted > 0.0 {
            self.moved_total += ctx.transfer_moles(input, output, wanted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellGrid, TileLayout};
    use approx::assert_relative_eq;

    /// Three tiles in a row, pump attached to the middle one
    fn row() -> (CellGrid, CellGrid, GasPump) {
        let layout = TileLayout::rectangular(3, 1);
        let tiles = layout.build_grid(2.5).unwrap();
        let mut pipes = CellGrid::new();
        pipes.finalize_neighbors().unwrap();

        let mut pump = GasPump::facing(Direction::West, Direction::East, 200.0);
        let middle = layout.cell_at(1, 0).unwrap();
        for direction in Direction::ALL {
            pump.set_neighbor(tiles.get(middle).unwrap().neighbor(direction), direction);
        }
        pump.finalize_neighbors();
        (tiles, pipes, pump)
    }

    #[test]
    fn test_pump_moves_capped_amount() {
        let (mut tiles, mut pipes, mut pump) = row();
        tiles.get_mut(CellId::new(0)).unwrap().make_air();
        assert_eq!(
            pump.endpoints(),
            Some((GasEndpoint::tile(CellId::new(0)), GasEndpoint::tile(CellId::new(2))))
        );

        let mut ctx = DeviceContext::new(&mut tiles, &mut pipes);
        pump.initialize(&mut ctx);
        pump.step(&mut ctx);

        assert_relative_eq!(pump.moved_total(), MAX_MOLE_TRANSFER, max_relative = 1e-5);
        assert_relative_eq!(
            ctx.tiles.get(CellId::new(2)).unwrap().total_moles(),
            MAX_MOLE_TRANSFER,
            max_relative = 1e-5
        );
    }

    #[test]
    fn test_pump_stops_at_target() {
        let (mut tiles, mut pipes, mut pump) = row();
        tiles.get_mut(CellId::new(0)).unwrap().make_air();
        tiles.get_mut(CellId::new(2)).unwrap().make_air();
        pump.set_target_pressure(50.0);

        let mut ctx = DeviceContext::new(&mut tiles, &mut pipes);
        pump.step(&mut ctx);
        assert_eq!(pump.moved_total(), 0.0);
    }

    #[test]
    fn test_pump_without_input_is_idle() {
        let mut pump = GasPump::facing(Direction::North, Direction::East, 200.0);
        pump.set_neighbor(Some(CellId::new(1)), Direction::East);
        pump.finalize_neighbors();
        assert_eq!(pump.endpoints(), None);
    }
}
