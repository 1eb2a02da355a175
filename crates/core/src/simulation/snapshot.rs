//! Save and restore the persistent part of an arena
//!
//! Only what survives a reload is captured: species amounts, temperature and
//! the cell state as its [`CellState::as_u8`] code. Flux momentum, velocity
//! and activity are transient and restart from scratch, so every restored
//! open cell comes back `Active`; walls and vacuums keep their state.

use crate::core_types::{Vec2, SPECIES_COUNT};
use crate::error::AtmosError;
use crate::grid::{CellGrid, CellId, CellState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Persistent state of one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub amounts: [f32; SPECIES_COUNT],
    pub temperature: f32,
    /// [`CellState`] code
    pub state: u8,
}

/// Persistent state of a whole arena, in id order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub cells: Vec<CellSnapshot>,
}

impl GridSnapshot {
    /// Load a snapshot from a JSON file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AtmosError> {
        let contents = fs::read_to_string(path).map_err(|e| AtmosError::SnapshotIo(e.to_string()))?;

        let snapshot: Self = serde_json::from_str(&contents)
            .map_err(|e| AtmosError::SnapshotParse(e.to_string()))?;

        Ok(snapshot)
    }

    /// Save the snapshot as pretty-printed JSON
    ///
    /// # Errors
    /// Returns error if file cannot be written or snapshot cannot be serialized
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AtmosError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AtmosError::SnapshotSerialize(e.to_string()))?;

        fs::write(path, contents).map_err(|e| AtmosError::SnapshotIo(e.to_string()))?;

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl CellGrid {
    /// Capture amounts, temperatures and states
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            cells: self
                .cells()
                .iter()
                .map(|cell| CellSnapshot {
                    amounts: *cell.amounts(),
                    temperature: cell.temperature(),
                    state: cell.state().as_u8(),
                })
                .collect(),
        }
    }

    /// Overwrite every cell from a snapshot of the same size
    ///
    /// Neighbour links are kept; flux, velocity and the heat flag are reset.
    ///
    /// # Errors
    /// Returns [`AtmosError::SnapshotMismatch`] if the cell counts differ and
    /// [`AtmosError::SnapshotParse`] for an unknown state code. The grid is
    /// left untouched on error.
    pub fn restore(&mut self, snapshot: &GridSnapshot) -> Result<(), AtmosError> {
        if snapshot.len() != self.len() {
            return Err(AtmosError::SnapshotMismatch {
                expected: self.len(),
                found: snapshot.len(),
            });
        }
        let states = snapshot
            .cells
            .iter()
            .enumerate()
            .map(|(index, saved)| {
                CellState::from_u8(saved.state).ok_or_else(|| {
                    AtmosError::SnapshotParse(format!(
                        "unknown state {} for cell {index}",
                        saved.state
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (index, (saved, state)) in snapshot.cells.iter().zip(states).enumerate() {
            let Some(cell) = self.get_mut(CellId::new(index)) else {
                continue;
            };
            cell.mixture.clear();
            if state != CellState::Vacuum {
                cell.mixture.set_all(&saved.amounts);
            }
            cell.mixture.set_temperature(saved.temperature);
            cell.flux = [0.0; 4];
            cell.velocity = Vec2::zeros();
            cell.temp_setting = false;
            cell.active_direction = [false; 4];
            cell.state = match state {
                CellState::Blocked | CellState::Vacuum => state,
                CellState::Active | CellState::SemiActive | CellState::Inactive => {
                    CellState::Active
                }
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Species;
    use crate::grid::TileLayout;

    fn seeded_grid() -> CellGrid {
        let mut grid = TileLayout::rectangular(3, 1).build_grid(2.5).unwrap();
        let cell = grid.get_mut(CellId::new(0)).unwrap();
        cell.make_air();
        cell.add_gas(Species::Plasma, 1.25);
        cell.mixture.set_temperature(310.5);
        grid.get_mut(CellId::new(1)).unwrap().set_blocked(true);
        grid.get_mut(CellId::new(2)).unwrap().set_vacuum();
        grid
    }

    #[test]
    fn test_restore_is_lossless() {
        let grid = seeded_grid();
        let snapshot = grid.snapshot();

        let mut restored = TileLayout::rectangular(3, 1).build_grid(2.5).unwrap();
        restored.restore(&snapshot).unwrap();

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.get(CellId::new(0)).unwrap().state(), CellState::Active);
        assert_eq!(restored.get(CellId::new(1)).unwrap().state(), CellState::Blocked);
        assert_eq!(restored.get(CellId::new(2)).unwrap().state(), CellState::Vacuum);
        assert_eq!(restored.get(CellId::new(0)).unwrap().temperature(), 310.5);
    }

    #[test]
    fn test_restore_rejects_size_mismatch() {
        let snapshot = seeded_grid().snapshot();
        let mut small = CellGrid::with_cells(2, 2.5);
        assert_eq!(
            small.restore(&snapshot),
            Err(AtmosError::SnapshotMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_restore_rejects_unknown_state() {
        let mut snapshot = seeded_grid().snapshot();
        snapshot.cells[2].state = 9;
        let mut grid = seeded_grid();

        assert!(matches!(
            grid.restore(&snapshot),
            Err(AtmosError::SnapshotParse(_))
        ));
        assert_eq!(grid.get(CellId::new(2)).unwrap().state(), CellState::Vacuum);
    }

    #[test]
    fn test_sleeping_cells_restore_awake() {
        let mut grid = seeded_grid();
        grid.get_mut(CellId::new(0)).unwrap().state = CellState::Inactive;
        let snapshot = grid.snapshot();
        assert_eq!(snapshot.cells[0].state, CellState::Inactive.as_u8());

        grid.restore(&snapshot).unwrap();
        assert_eq!(grid.get(CellId::new(0)).unwrap().state(), CellState::Active);
    }

    #[test]
    fn test_json_file_round_trip() {
        let snapshot = seeded_grid().snapshot();
        let path = std::env::temp_dir().join(format!("atmos-snapshot-{}.json", std::process::id()));

        snapshot.save(&path).unwrap();
        let loaded = GridSnapshot::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, snapshot);

        assert!(matches!(
            GridSnapshot::load(path.with_extension("missing")),
            Err(AtmosError::SnapshotIo(_))
        ));
    }
}
