//! Tick scheduler
//!
//! [`AtmosSimulation`] owns the tile arena, the pipe arena and the attached
//! loop devices. Every tick runs in a fixed order:
//!
//! 1. flux calculation on every `Active` tile, then flux application on every
//!    `Active`/`SemiActive` tile
//! 2. wind pushes collected from tile velocities
//! 3. walls polled for over-pressure
//! 4. devices stepped
//! 5. both flux phases over the pipe segments
//!
//! Nothing here is threaded; the caller drives ticks through [`AtmosSimulation::step`]
//! or [`AtmosSimulation::update`] and mutates cells only between ticks.
//! Arenas rewired between ticks are finalized again before the next one runs.

pub mod clock;
pub mod config;
pub mod report;
pub mod snapshot;
pub mod stats;

pub use clock::FixedStepDriver;
pub use config::AtmosConfig;
pub use report::{TickReport, WindPush};
pub use snapshot::{CellSnapshot, GridSnapshot};
pub use stats::GridStats;

use crate::core_types::Species;
use crate::device::{AtmosDevice, DeviceContext};
use crate::error::AtmosError;
use crate::grid::{Cell, CellGrid, CellId, Direction, TileLayout};
use tracing::{debug, info, warn};

/// A device together with the tile it sits on
struct AttachedDevice {
    device: Box<dyn AtmosDevice>,
    tile: CellId,
}

/// Owner of the whole atmospherics state
pub struct AtmosSimulation {
    config: AtmosConfig,
    tiles: CellGrid,
    pipes: CellGrid,
    devices: Vec<AttachedDevice>,
    driver: FixedStepDriver,
    simulating: bool,
    tick: u64,
    /// Walls that reported over-pressure on the previous tick
    breached_tiles: Vec<CellId>,
    breached_pipes: Vec<CellId>,
}

impl AtmosSimulation {
    /// Create a simulation around a tile arena
    ///
    /// # Errors
    /// Returns [`AtmosError::InvalidConfig`] if the configuration is unusable
    pub fn new(config: AtmosConfig, tiles: CellGrid) -> Result<Self, AtmosError> {
        config.validate()?;
        let driver = FixedStepDriver::new(config.update_rate, config.max_catch_up_ticks);
        Ok(Self {
            config,
            tiles,
            pipes: CellGrid::new(),
            devices: Vec::new(),
            driver,
            simulating: false,
            tick: 0,
            breached_tiles: Vec::new(),
            breached_pipes: Vec::new(),
        })
    }

    /// Create a simulation with one empty tile per layout position
    ///
    /// # Errors
    /// Returns an error for an invalid configuration or broken wiring
    pub fn from_layout(config: AtmosConfig, layout: &TileLayout) -> Result<Self, AtmosError> {
        let tiles = layout.build_grid(config.cell_volume)?;
        Self::new(config, tiles)
    }

    /// Replace the pipe arena
    pub fn with_pipes(mut self, pipes: CellGrid) -> Self {
        self.pipes = pipes;
        self
    }

    /// Build the pipe arena from a layout of pipe positions
    ///
    /// # Errors
    /// Propagates wiring errors
    pub fn with_pipe_layout(self, layout: &TileLayout) -> Result<Self, AtmosError> {
        let pipes = layout.build_grid(self.config.pipe_volume)?;
        Ok(self.with_pipes(pipes))
    }

    /// Attach a device on a tile and return its index
    ///
    /// Devices attached after [`AtmosSimulation::initialize`] are wired and
    /// initialized immediately.
    ///
    /// # Errors
    /// Returns [`AtmosError::CellOutOfBounds`] if `tile` is not a tile id
    pub fn attach_device(
        &mut self,
        device: Box<dyn AtmosDevice>,
        tile: CellId,
    ) -> Result<usize, AtmosError> {
        if tile.index() >= self.tiles.len() {
            return Err(AtmosError::CellOutOfBounds {
                id: tile,
                len: self.tiles.len(),
            });
        }
        let mut attached = AttachedDevice { device, tile };
        if self.simulating {
            Self::wire_device(&self.tiles, &mut attached);
            attached.device.finalize_neighbors();
            let mut ctx = DeviceContext::new(&mut self.tiles, &mut self.pipes);
            attached.device.initialize(&mut ctx);
        }
        debug!("Attached {} on tile {}", attached.device.name(), tile.index());
        self.devices.push(attached);
        Ok(self.devices.len() - 1)
    }

    fn wire_device(tiles: &CellGrid, attached: &mut AttachedDevice) {
        let neighbors = tiles
            .get(attached.tile)
            .map_or([None; 4], |cell| *cell.neighbors());
        for (direction, neighbor) in Direction::ALL.into_iter().zip(neighbors) {
            attached.device.set_neighbor(neighbor, direction);
        }
    }

    /// Finish wiring on both networks, initialize devices and start simulating
    ///
    /// # Errors
    /// Returns the first dangling neighbour link found
    pub fn initialize(&mut self) -> Result<(), AtmosError> {
        self.tiles.finalize_neighbors()?;
        self.pipes.finalize_neighbors()?;

        // Every device gets its first pass before any is finalized
        for attached in &mut self.devices {
            Self::wire_device(&self.tiles, attached);
        }
        for attached in &mut self.devices {
            attached.device.finalize_neighbors();
        }
        let mut ctx = DeviceContext::new(&mut self.tiles, &mut self.pipes);
        for attached in &mut self.devices {
            attached.device.initialize(&mut ctx);
        }

        self.driver.reset();
        self.breached_tiles.clear();
        self.breached_pipes.clear();
        self.simulating = true;
        info!(
            "Atmospherics initialized: {} tiles, {} pipes, {} devices",
            self.tiles.len(),
            self.pipes.len(),
            self.devices.len()
        );
        Ok(())
    }

    /// Whether [`AtmosSimulation::initialize`] has run
    pub fn is_simulating(&self) -> bool {
        self.simulating
    }

    /// Run exactly one tick
    pub fn step(&mut self) -> TickReport {
        if !self.simulating {
            warn!("Atmospherics step requested before initialization, skipping");
            return TickReport::default();
        }
        if let Err(err) = self.refinalize() {
            warn!("Atmospherics step skipped, neighbour links are broken: {err}");
            return TickReport::default();
        }
        self.tick += 1;

        let active_cells = self.tiles.run_flux_passes();
        let wind_pushes = self.wind_pushes();

        let breaches = self.tiles.over_pressure_cells();
        for id in newly_breached(&self.breached_tiles, &breaches) {
            warn!("Wall tile {} is holding back over-pressure", id.index());
        }
        self.breached_tiles.clone_from(&breaches);

        let mut ctx = DeviceContext::new(&mut self.tiles, &mut self.pipes);
        for attached in &mut self.devices {
            attached.device.step(&mut ctx);
        }

        let active_pipes = self.pipes.run_flux_passes();
        let pipe_breaches = self.pipes.over_pressure_cells();
        for id in newly_breached(&self.breached_pipes, &pipe_breaches) {
            warn!("Pipe segment {} is holding back over-pressure", id.index());
        }
        self.breached_pipes.clone_from(&pipe_breaches);

        debug!(
            "Atmos tick {}: {} active tiles, {} active pipes, {} wind pushes, {} breaches",
            self.tick,
            active_cells,
            active_pipes,
            wind_pushes.len(),
            breaches.len() + pipe_breaches.len()
        );

        TickReport {
            tick: self.tick,
            active_cells,
            active_pipes,
            wind_pushes,
            breaches,
            pipe_breaches,
        }
    }

    /// Finalize arenas whose links changed since the last tick
    fn refinalize(&mut self) -> Result<(), AtmosError> {
        if !self.tiles.is_finalized() {
            self.tiles.finalize_neighbors()?;
            debug!("Tile links finalized again ({} tiles)", self.tiles.len());
        }
        if !self.pipes.is_finalized() {
            self.pipes.finalize_neighbors()?;
            debug!("Pipe links finalized again ({} pipes)", self.pipes.len());
        }
        Ok(())
    }

    /// Feed elapsed wall-clock time and run every tick that became due
    pub fn update(&mut self, elapsed: f32) -> Vec<TickReport> {
        if !self.simulating {
            return Vec::new();
        }
        let due = self.driver.advance(elapsed);
        (0..due).map(|_| self.step()).collect()
    }

    fn wind_pushes(&self) -> Vec<WindPush> {
        let threshold = self.config.minimum_wind;
        self.tiles
            .iter()
            .filter(|(_, cell)| {
                let velocity = cell.velocity();
                velocity.x.abs() > threshold || velocity.y.abs() > threshold
            })
            .map(|(cell_id, cell)| WindPush {
                cell: cell_id,
                force: cell.velocity() * self.config.wind_factor,
            })
            .collect()
    }

    // Accessors

    pub fn config(&self) -> &AtmosConfig {
        &self.config
    }

    /// Ticks executed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn tiles(&self) -> &CellGrid {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut CellGrid {
        &mut self.tiles
    }

    pub fn pipes(&self) -> &CellGrid {
        &self.pipes
    }

    pub fn pipes_mut(&mut self) -> &mut CellGrid {
        &mut self.pipes
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Attached device by index
    pub fn device(&self, index: usize) -> Option<&dyn AtmosDevice> {
        self.devices.get(index).map(|attached| attached.device.as_ref())
    }

    /// Tile by id
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.tiles.get(id)
    }

    // Between-tick mutation helpers

    /// Add gas to a tile
    ///
    /// # Errors
    /// Returns [`AtmosError::CellOutOfBounds`] for an unknown tile
    pub fn add_gas(&mut self, id: CellId, species: Species, amount: f32) -> Result<(), AtmosError> {
        self.tiles.cell_mut(id)?.add_gas(species, amount);
        Ok(())
    }

    /// Remove gas from a tile
    ///
    /// # Errors
    /// Returns [`AtmosError::CellOutOfBounds`] for an unknown tile
    pub fn remove_gas(
        &mut self,
        id: CellId,
        species: Species,
        amount: f32,
    ) -> Result<(), AtmosError> {
        self.tiles.cell_mut(id)?.remove_gas(species, amount);
        Ok(())
    }

    /// Turn a tile into a wall or open it again
    ///
    /// # Errors
    /// Returns [`AtmosError::CellOutOfBounds`] for an unknown tile
    pub fn set_blocked(&mut self, id: CellId, blocked: bool) -> Result<(), AtmosError> {
        self.tiles.cell_mut(id)?.set_blocked(blocked);
        Ok(())
    }

    /// Turn a tile into a vacuum sink (hull breach)
    ///
    /// # Errors
    /// Returns [`AtmosError::CellOutOfBounds`] for an unknown tile
    pub fn set_vacuum(&mut self, id: CellId) -> Result<(), AtmosError> {
        self.tiles.cell_mut(id)?.set_vacuum();
        Ok(())
    }

    /// Fill every open tile with standard air
    pub fn fill_with_air(&mut self) {
        for index in 0..self.tiles.len() {
            if let Some(cell) = self.tiles.get_mut(CellId::new(index)) {
                cell.make_air();
            }
        }
    }

    pub fn stats(&self) -> GridStats {
        GridStats::collect(&self.tiles)
    }

    pub fn pipe_stats(&self) -> GridStats {
        GridStats::collect(&self.pipes)
    }
}

/// Walls in `current` that were not breached on the previous tick
///
/// Both slices are in ascending id order.
fn newly_breached<'a>(
    previous: &'a [CellId],
    current: &'a [CellId],
) -> impl Iterator<Item = &'a CellId> + 'a {
    current
        .iter()
        .filter(move |id| previous.binary_search(id).is_err())
}
