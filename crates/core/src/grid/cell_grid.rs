//! Flat arena of cells and the two-phase flux solver
//!
//! Cells reference their neighbours by [`CellId`], so the neighbour graph can
//! be cyclic without any shared ownership. One tick over an arena is:
//!
//! 1. [`CellGrid::calculate_flux`] on every `Active` cell: reads own and
//!    neighbour pressures, commits the per-direction flux and mixes species.
//!    Apart from mixing, only neighbour *states* are written in this phase.
//! 2. [`CellGrid::simulate_flux`] on every `Active`/`SemiActive` cell: moves gas
//!    and heat into the neighbours and derives the wind velocity.
//!
//! The same arena type serves both tiles and pipe segments.

use crate::core_types::constants::{
    DELTA_TIME, FLUID_DRAG, FLUX_EPSILON, MAX_FLUX, MIX_MIN_GAP, MIX_RATE, MIX_SPLIT_THRESHOLD,
    OVER_PRESSURE_LIMIT, RESIDUAL_PURGE, THERMAL_BASE, THERMAL_EPSILON, WAKE_PRESSURE_DELTA,
};
use crate::core_types::{Species, Vec2};
use crate::error::AtmosError;
use crate::grid::{Cell, CellId, CellState, Direction};

/// Arena owning every cell of one network (tiles or pipes)
#[derive(Debug, Clone, Default)]
pub struct CellGrid {
    cells: Vec<Cell>,
    /// All neighbour links resolved since the last wiring change
    finalized: bool,
}

impl CellGrid {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena of `count` empty cells with the given volume (m³)
    pub fn with_cells(count: usize, volume: f32) -> Self {
        Self {
            cells: (0..count).map(|_| Cell::new(volume)).collect(),
            finalized: false,
        }
    }

    /// Append a cell and return its id
    pub fn push(&mut self, cell: Cell) -> CellId {
        self.cells.push(cell);
        self.finalized = false;
        CellId::new(self.cells.len() - 1)
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the arena holds no cells
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether every neighbour link has been resolved
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Get a cell
    #[inline]
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    /// Get a cell mutably (for the external mutation API)
    #[inline]
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.index())
    }

    /// Get a cell mutably, reporting unknown ids as an error
    ///
    /// # Errors
    /// Returns [`AtmosError::CellOutOfBounds`] if `id` is not part of this arena
    pub fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell, AtmosError> {
        let len = self.cells.len();
        self.cells
            .get_mut(id.index())
            .ok_or(AtmosError::CellOutOfBounds { id, len })
    }

    /// All cells in id order
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate `(id, cell)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (CellId::new(index), cell))
    }

    /// Total amount of gas in the arena (mol)
    pub fn total_moles(&self) -> f32 {
        self.cells.iter().map(Cell::total_moles).sum()
    }

    fn check(&self, id: CellId) -> Result<(), AtmosError> {
        if id.index() < self.cells.len() {
            Ok(())
        } else {
            Err(AtmosError::CellOutOfBounds {
                id,
                len: self.cells.len(),
            })
        }
    }

    /// First wiring pass: link `id` to `neighbor` in `direction`
    ///
    /// The neighbour does not need to exist yet; links are resolved by
    /// [`CellGrid::finalize_neighbors`] once the whole arena is built.
    ///
    /// # Errors
    /// Returns an error if `id` is unknown or links to itself
    pub fn set_neighbor(
        &mut self,
        id: CellId,
        neighbor: Option<CellId>,
        direction: Direction,
    ) -> Result<(), AtmosError> {
        self.check(id)?;
        if neighbor == Some(id) {
            return Err(AtmosError::SelfNeighbor(id));
        }
        self.cells[id.index()].neighbors[direction.index()] = neighbor;
        self.finalized = false;
        Ok(())
    }

    /// Second wiring pass: verify every link resolves to a cell of this arena
    ///
    /// # Errors
    /// Returns [`AtmosError::CellOutOfBounds`] for the first dangling link
    pub fn finalize_neighbors(&mut self) -> Result<(), AtmosError> {
        let len = self.cells.len();
        for cell in &self.cells {
            if let Some(id) = cell.neighbors.iter().flatten().find(|id| id.index() >= len) {
                return Err(AtmosError::CellOutOfBounds { id: *id, len });
            }
        }
        self.finalized = true;
        Ok(())
    }

    /// Phase 1: compute this tick's flux toward every neighbour
    ///
    /// Writes only the cell's own flux buffer and the *state* of neighbours that
    /// need waking; no neighbour gas is touched except through mixing.
    pub fn calculate_flux(&mut self, id: CellId) {
        let i = id.index();
        if matches!(
            self.cells[i].state,
            CellState::Blocked | CellState::Vacuum
        ) {
            return;
        }

        let pressure = self.cells[i].pressure();
        let neighbors = self.cells[i].neighbors;
        let previous = self.cells[i].flux;
        let mut neighbor_flux = [0.0_f32; 4];
        let mut active_direction = [false; 4];

        for (slot, link) in neighbors.iter().enumerate() {
            let Some(n) = link else { continue };
            let neighbor = &mut self.cells[n.index()];
            if neighbor.state == CellState::Blocked {
                continue;
            }
            active_direction[slot] = neighbor.state != CellState::Vacuum;

            let candidate = (previous[slot] * FLUID_DRAG
                + (pressure - neighbor.pressure()) * DELTA_TIME)
                .min(MAX_FLUX);
            if candidate < 0.0 {
                // Inward flow: the neighbour has to push from its own side
                if neighbor.state != CellState::Vacuum {
                    neighbor.state = CellState::Active;
                }
                continue;
            }
            neighbor_flux[slot] = candidate;
        }

        let cell = &mut self.cells[i];
        cell.active_direction = active_direction;

        if neighbor_flux.iter().any(|&flux| flux > FLUX_EPSILON) {
            // Total outflow can't exceed what the cell holds
            let total: f32 = neighbor_flux.iter().sum();
            let scaling = (pressure / total / DELTA_TIME).min(1.0);
            for (committed, candidate) in cell.flux.iter_mut().zip(neighbor_flux) {
                *committed = candidate * scaling;
            }
        } else {
            cell.flux = [0.0; 4];
            if cell.temp_setting {
                cell.temp_setting = false;
            } else {
                cell.state = CellState::SemiActive;
            }
        }

        if cell.state.is_mixing() {
            self.simulate_mixing(id);
        }
    }

    /// Phase 2: apply the committed flux
    ///
    /// `Active` cells push gas and heat into their neighbours and derive their
    /// velocity; `SemiActive` cells only mix. Other states are left alone.
    pub fn simulate_flux(&mut self, id: CellId) {
        let i = id.index();
        match self.cells[i].state {
            CellState::Active => {
                self.transfer_bulk(i);
                self.exchange_heat(i);
                self.cells[i].velocity = self.net_velocity(i);
            }
            CellState::SemiActive => {
                self.cells[i].velocity = Vec2::zeros();
                self.simulate_mixing(id);
            }
            CellState::Inactive | CellState::Vacuum | CellState::Blocked => {}
        }
    }

    /// Share of the cell's gas leaving toward each neighbour this tick
    ///
    /// Each open direction takes `flux / pressure`. When those shares add up
    /// to more than the whole cell they are scaled down together, so the
    /// outflow is split in proportion to the flux instead of in slot order.
    fn outflow_fractions(&self, i: usize, pressure: f32) -> [f32; 4] {
        let cell = &self.cells[i];
        let mut fractions = [0.0_f32; 4];
        for (slot, link) in cell.neighbors.iter().enumerate() {
            let Some(n) = link else { continue };
            if cell.flux[slot] > 0.0 && self.cells[n.index()].state != CellState::Blocked {
                fractions[slot] = cell.flux[slot] / pressure;
            }
        }

        let total: f32 = fractions.iter().sum();
        if total > 1.0 {
            for fraction in &mut fractions {
                *fraction /= total;
            }
        }
        fractions
    }

    /// Pressure-driven transfer of every species along positive flux
    fn transfer_bulk(&mut self, i: usize) {
        let pressure = self.cells[i].pressure();
        if pressure <= 0.0 {
            return;
        }
        let neighbors = self.cells[i].neighbors;
        let fractions = self.outflow_fractions(i, pressure);

        for species in Species::ALL {
            let available = self.cells[i].mixture.get(species);
            if available <= 0.0 {
                continue;
            }
            for (slot, fraction) in fractions.iter().enumerate() {
                if *fraction <= 0.0 {
                    continue;
                }
                let Some(n) = neighbors[slot] else { continue };
                // Never more than what is left after the earlier directions
                let moved = (available * fraction).min(self.cells[i].mixture.get(species));

                let neighbor = &mut self.cells[n.index()];
                if neighbor.state == CellState::Vacuum {
                    // Absorbed: the vacuum keeps no record of it
                    self.cells[i].active_direction[slot] = false;
                } else {
                    neighbor.mixture.add(species, moved);
                    neighbor.state = CellState::Active;
                }
                self.cells[i].mixture.remove(species, moved);
            }
        }
    }

    /// Symmetric temperature exchange from this cell into colder neighbours
    fn exchange_heat(&mut self, i: usize) {
        let volume = self.cells[i].mixture.volume();
        let neighbors = self.cells[i].neighbors;

        for (slot, link) in neighbors.iter().enumerate() {
            if !self.cells[i].active_direction[slot] {
                continue;
            }
            let Some(n) = link else { continue };
            let n = n.index();
            if matches!(
                self.cells[n].state,
                CellState::Blocked | CellState::Vacuum
            ) {
                continue;
            }

            let own = self.cells[i].temperature();
            let theirs = self.cells[n].temperature();
            let difference = (own - theirs) * THERMAL_BASE * volume;
            if difference > THERMAL_EPSILON {
                self.cells[n].mixture.set_temperature(theirs + difference);
                self.cells[i].mixture.set_temperature(own - difference);
                self.cells[i].temp_setting = true;
            }
        }
    }

    /// Net directional flow around a cell
    ///
    /// x: East outflow − inflow from West − West outflow + inflow from East,
    /// y: North outflow − inflow from North − South outflow + inflow from South.
    fn net_velocity(&self, i: usize) -> Vec2 {
        let cell = &self.cells[i];
        let incoming = |direction: Direction| {
            cell.neighbor(direction).map_or(0.0, |n| {
                self.cells[n.index()].flux[direction.opposite().index()]
            })
        };
        let flux = |direction: Direction| cell.flux[direction.index()];

        let horizontal = flux(Direction::East) - incoming(Direction::West) - flux(Direction::West)
            + incoming(Direction::East);
        let vertical = flux(Direction::North) - incoming(Direction::North)
            - flux(Direction::South)
            + incoming(Direction::South);
        Vec2::new(horizontal, vertical)
    }

    /// Equalize species composition with the neighbours
    ///
    /// Gas only ever moves from the richer side to the poorer side of each
    /// species. A vacuum neighbour counts as empty and swallows what it is
    /// given. A `SemiActive` cell that moved nothing purges residual amounts
    /// and goes `Inactive`, dropping its flux and velocity.
    pub fn simulate_mixing(&mut self, id: CellId) {
        let i = id.index();
        if !self.cells[i].state.is_mixing() {
            return;
        }
        let neighbors = self.cells[i].neighbors;
        let mut mixed = false;

        let has_gas = self.cells[i]
            .mixture
            .amounts()
            .iter()
            .any(|&amount| amount >= MIX_RATE);

        if has_gas {
            for species in Species::ALL {
                for n in neighbors.iter().flatten() {
                    let own = self.cells[i].mixture.get(species);
                    if own <= 0.0 {
                        break;
                    }
                    let n = n.index();
                    let neighbor_state = self.cells[n].state;
                    if neighbor_state == CellState::Blocked {
                        continue;
                    }

                    let gap = own - self.cells[n].mixture.get(species);
                    if gap < MIX_MIN_GAP {
                        continue;
                    }
                    let mut amount = gap * MIX_RATE;
                    if amount < MIX_SPLIT_THRESHOLD {
                        // Tiny residues: split the gap instead of creeping toward it
                        amount = gap / 2.0;
                    }

                    self.cells[i].mixture.remove(species, amount);
                    mixed = true;
                    if neighbor_state == CellState::Vacuum {
                        continue;
                    }
                    self.cells[n].mixture.add(species, amount);

                    let pressure_gap = (self.cells[n].pressure() - self.cells[i].pressure()).abs();
                    self.cells[n].state = if pressure_gap > WAKE_PRESSURE_DELTA {
                        CellState::Active
                    } else {
                        CellState::SemiActive
                    };
                }
            }
        }

        let cell = &mut self.cells[i];
        if !mixed && cell.state == CellState::SemiActive {
            for species in Species::ALL {
                let amount = cell.mixture.get(species);
                if amount > 0.0 && amount <= RESIDUAL_PURGE {
                    cell.mixture.remove(species, amount);
                }
            }
            cell.remove_flux();
            cell.velocity = Vec2::zeros();
            cell.state = CellState::Inactive;
        }
    }

    /// True when a wall is facing a neighbour above [`OVER_PRESSURE_LIMIT`]
    ///
    /// This is a signal only; nothing is changed.
    pub fn check_over_pressure(&self, id: CellId) -> bool {
        let cell = &self.cells[id.index()];
        cell.state == CellState::Blocked
            && cell
                .neighbors
                .iter()
                .flatten()
                .any(|n| self.cells[n.index()].pressure() > OVER_PRESSURE_LIMIT)
    }

    /// Run both phases over the whole arena and return how many cells were `Active`
    ///
    /// An arena whose links changed since the last
    /// [`CellGrid::finalize_neighbors`] is left untouched.
    pub fn run_flux_passes(&mut self) -> usize {
        if !self.finalized {
            return 0;
        }

        for index in 0..self.cells.len() {
            if self.cells[index].state == CellState::Active {
                self.calculate_flux(CellId::new(index));
            }
        }

        let mut active = 0;
        for index in 0..self.cells.len() {
            let id = CellId::new(index);
            match self.cells[index].state {
                CellState::Active => {
                    self.simulate_flux(id);
                    active += 1;
                }
                CellState::SemiActive => self.simulate_flux(id),
                CellState::Inactive | CellState::Vacuum | CellState::Blocked => {}
            }
        }
        active
    }

    /// Ids of walls currently reporting over-pressure
    pub fn over_pressure_cells(&self) -> Vec<CellId> {
        (0..self.cells.len())
            .map(CellId::new)
            .filter(|&id| self.check_over_pressure(id))
            .collect()
    }
}
