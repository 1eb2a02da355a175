//! Single atmospherics cell and its activity states
//!
//! A [`Cell`] owns one [`GasMixture`], links to up to four neighbours by
//! [`CellId`], and carries the per-direction flux that persists between ticks
//! as a momentum term. Every external gas or heat mutation wakes the cell.

use crate::core_types::{Species, Vec2, SPECIES_COUNT};
use crate::mixture::GasMixture;
use serde::{Deserialize, Serialize};

/// Index of a cell inside a [`crate::CellGrid`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(usize);

impl CellId {
    /// Wrap an arena index
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Neighbour slot of a cell
///
/// The discriminants are the slot indices used by the flux buffer:
/// North=0, South=1, West=2, East=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +y
    North,
    /// -y
    South,
    /// -x
    West,
    /// +x
    East,
}

impl Direction {
    /// All directions in slot order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Slot index
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::East => 3,
        }
    }

    /// Convert from a slot index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Direction pointing back
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Grid offset `(dx, dy)` of the neighbour in this direction
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }
}

/// Activity state of a cell
///
/// - `Active`: equalizes pressure and temperature and mixes gases
/// - `SemiActive`: mixes gases, no pressure push
/// - `Inactive`: dormant, skipped every tick
/// - `Vacuum`: drains neighbours, never receives
/// - `Blocked`: wall, excluded from flow and polled for over-pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    /// Full equalization and mixing
    #[default]
    Active,
    /// Mixing only
    SemiActive,
    /// Dormant
    Inactive,
    /// Sink with infinite capacity
    Vacuum,
    /// Wall
    Blocked,
}

impl CellState {
    /// Convert from u8 for external encodings
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CellState::Active),
            1 => Some(CellState::SemiActive),
            2 => Some(CellState::Inactive),
            3 => Some(CellState::Vacuum),
            4 => Some(CellState::Blocked),
            _ => None,
        }
    }

    /// Convert to u8 for external encodings
    pub fn as_u8(&self) -> u8 {
        match self {
            CellState::Active => 0,
            CellState::SemiActive => 1,
            CellState::Inactive => 2,
            CellState::Vacuum => 3,
            CellState::Blocked => 4,
        }
    }

    /// States that take part in mixing
    #[inline]
    pub fn is_mixing(&self) -> bool {
        matches!(self, CellState::Active | CellState::SemiActive)
    }
}

/// One grid location of the atmospherics simulation
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) mixture: GasMixture,
    /// Neighbour links indexed by [`Direction::index`]
    pub(crate) neighbors: [Option<CellId>; 4],
    /// Committed flux toward each neighbour, kept as next tick's momentum
    pub(crate) flux: [f32; 4],
    pub(crate) velocity: Vec2,
    pub(crate) state: CellState,
    /// Set when a heat exchange happened, holds off demotion to `SemiActive` once
    pub(crate) temp_setting: bool,
    /// Directions that took part in the last flux calculation (heat exchange targets)
    pub(crate) active_direction: [bool; 4],
}

impl Default for Cell {
    fn default() -> Self {
        Self::from_mixture(GasMixture::default())
    }
}

impl Cell {
    /// Create an empty, active cell with the given volume (m³)
    pub fn new(volume: f32) -> Self {
        Self::from_mixture(GasMixture::new(volume))
    }

    /// Create an active cell around an existing mixture
    pub fn from_mixture(mixture: GasMixture) -> Self {
        Cell {
            mixture,
            neighbors: [None; 4],
            flux: [0.0; 4],
            velocity: Vec2::zeros(),
            state: CellState::Active,
            temp_setting: false,
            active_direction: [false; 4],
        }
    }

    // Mutation API. Gas mutations are ignored on walls and wake the cell otherwise.

    /// Add moles of a species
    pub fn add_gas(&mut self, species: Species, amount: f32) {
        if self.state == CellState::Blocked {
            return;
        }
        self.mixture.add(species, amount);
        self.state = CellState::Active;
    }

    /// Remove moles of a species
    pub fn remove_gas(&mut self, species: Species, amount: f32) {
        if self.state == CellState::Blocked {
            return;
        }
        self.mixture.remove(species, amount);
        self.state = CellState::Active;
    }

    /// Overwrite all species amounts
    pub fn set_gasses(&mut self, amounts: &[f32]) {
        if self.state == CellState::Blocked {
            return;
        }
        self.mixture.set_all(amounts);
        self.state = CellState::Active;
    }

    /// Remove all gas
    pub fn clear(&mut self) {
        if self.state == CellState::Blocked {
            return;
        }
        self.mixture.clear();
        self.state = CellState::Active;
    }

    /// Replace the contents with standard air at 293 K
    pub fn make_air(&mut self) {
        if self.state == CellState::Blocked {
            return;
        }
        self.mixture.fill_standard_air();
        self.state = CellState::Active;
    }

    /// Heat toward `target` (K)
    pub fn add_heat(&mut self, target: f32) {
        if self.state == CellState::Blocked {
            return;
        }
        self.mixture.add_heat(target);
        self.state = CellState::Active;
    }

    /// Cool toward `target` (K)
    pub fn remove_heat(&mut self, target: f32) {
        if self.state == CellState::Blocked {
            return;
        }
        self.mixture.remove_heat(target);
        self.state = CellState::Active;
    }

    /// Turn the cell into a wall, or reopen it as an active cell
    pub fn set_blocked(&mut self, blocked: bool) {
        if blocked {
            self.state = CellState::Blocked;
            self.remove_flux();
            self.velocity = Vec2::zeros();
        } else {
            self.state = CellState::Active;
        }
    }

    /// Empty the cell and turn it into a vacuum sink
    pub fn set_vacuum(&mut self) {
        self.mixture.clear();
        self.remove_flux();
        self.velocity = Vec2::zeros();
        self.state = CellState::Vacuum;
    }

    /// Forget the flux momentum
    pub fn remove_flux(&mut self) {
        self.flux = [0.0; 4];
    }

    // Query API

    /// Activity state
    #[inline]
    pub fn state(&self) -> CellState {
        self.state
    }

    /// Owned gas mixture
    #[inline]
    pub fn mixture(&self) -> &GasMixture {
        &self.mixture
    }

    /// Wind velocity derived from the last flux imbalance
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Committed flux per direction
    #[inline]
    pub fn flux(&self) -> &[f32; 4] {
        &self.flux
    }

    /// Neighbour in a direction
    #[inline]
    pub fn neighbor(&self, direction: Direction) -> Option<CellId> {
        self.neighbors[direction.index()]
    }

    /// All neighbour links in slot order
    #[inline]
    pub fn neighbors(&self) -> &[Option<CellId>; 4] {
        &self.neighbors
    }

    /// Pressure (kPa)
    #[inline]
    pub fn pressure(&self) -> f32 {
        self.mixture.pressure()
    }

    /// Partial pressure of one species (kPa)
    pub fn partial_pressure(&self, species: Species) -> f32 {
        self.mixture.partial_pressure(species)
    }

    /// Total amount of gas (mol)
    #[inline]
    pub fn total_moles(&self) -> f32 {
        self.mixture.total_moles()
    }

    /// Temperature (K)
    #[inline]
    pub fn temperature(&self) -> f32 {
        self.mixture.temperature()
    }

    /// Raw species amounts (mol)
    #[inline]
    pub fn amounts(&self) -> &[f32; SPECIES_COUNT] {
        self.mixture.amounts()
    }

    /// Enough oxygen and plasma present for a fire to take hold
    pub fn is_burnable(&self) -> bool {
        self.mixture.get(Species::Oxygen) > 1.0 && self.mixture.get(Species::Plasma) > 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_conversion() {
        for value in 0..5 {
            let state = CellState::from_u8(value).unwrap();
            assert_eq!(state.as_u8(), value);
        }
        assert_eq!(CellState::from_u8(5), None);
    }

    #[test]
    fn test_direction_opposites() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            let (dx, dy) = direction.offset();
            let (ox, oy) = direction.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
            assert_eq!(Direction::from_index(direction.index()), Some(direction));
        }
    }

    #[test]
    fn test_gas_mutation_wakes_cell() {
        let mut cell = Cell::new(2.5);
        cell.state = CellState::Inactive;
        cell.add_gas(Species::Oxygen, 3.0);
        assert_eq!(cell.state(), CellState::Active);

        cell.state = CellState::Inactive;
        cell.remove_gas(Species::Oxygen, 1.0);
        assert_eq!(cell.state(), CellState::Active);
        assert_eq!(cell.mixture().get(Species::Oxygen), 2.0);

        cell.state = CellState::Inactive;
        cell.add_heat(400.0);
        assert_eq!(cell.state(), CellState::Active);
    }

    #[test]
    fn test_blocked_cell_ignores_gas() {
        let mut cell = Cell::new(2.5);
        cell.add_gas(Species::Nitrogen, 10.0);
        cell.set_blocked(true);

        cell.add_gas(Species::Nitrogen, 10.0);
        cell.remove_gas(Species::Nitrogen, 5.0);
        cell.set_gasses(&[1.0, 1.0, 1.0, 1.0]);
        cell.clear();
        assert_eq!(cell.mixture().get(Species::Nitrogen), 10.0);
        assert_eq!(cell.state(), CellState::Blocked);

        cell.set_blocked(false);
        assert_eq!(cell.state(), CellState::Active);
    }

    #[test]
    fn test_vacuum_and_air() {
        let mut cell = Cell::new(2.5);
        cell.make_air();
        assert!(cell.total_moles() > 100.0);
        assert!(!cell.is_burnable());

        cell.add_gas(Species::Plasma, 2.0);
        assert!(cell.is_burnable());

        cell.set_vacuum();
        assert_eq!(cell.state(), CellState::Vacuum);
        assert_eq!(cell.total_moles(), 0.0);
    }
}
