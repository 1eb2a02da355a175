//! Errors surfaced by grid wiring, configuration and snapshots
//!
//! Gas arithmetic never fails: negative amounts are clamped and empty
//! mixtures are handled explicitly. Errors only come from structural misuse
//! (bad cell ids, bad neighbour links, invalid configuration) and from
//! snapshot I/O.

use crate::grid::CellId;

/// Errors that can occur while building or driving an atmospherics simulation
#[derive(Debug, Clone, PartialEq)]
pub enum AtmosError {
    /// A cell id does not exist in the arena it was used with
    CellOutOfBounds {
        /// Offending id
        id: CellId,
        /// Number of cells in the arena
        len: usize,
    },
    /// A cell was wired as its own neighbour
    SelfNeighbor(CellId),
    /// A configuration value is out of range
    InvalidConfig(String),
    /// Snapshot does not match the arena it is restored into
    SnapshotMismatch {
        /// Cells in the arena
        expected: usize,
        /// Cells in the snapshot
        found: usize,
    },
    /// Failed to read or write a snapshot file
    SnapshotIo(String),
    /// Failed to parse snapshot contents
    SnapshotParse(String),
    /// Failed to serialize a snapshot
    SnapshotSerialize(String),
}

impl std::fmt::Display for AtmosError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtmosError::CellOutOfBounds { id, len } => {
                write!(f, "Cell {} out of bounds for grid of {len} cells", id.index())
            }
            AtmosError::SelfNeighbor(id) => {
                write!(f, "Cell {} cannot be its own neighbour", id.index())
            }
            AtmosError::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            AtmosError::SnapshotMismatch { expected, found } => write!(
                f,
                "Snapshot holds {found} cells but the grid has {expected}"
            ),
            AtmosError::SnapshotIo(msg) => write!(f, "Snapshot I/O failed: {msg}"),
            AtmosError::SnapshotParse(msg) => write!(f, "Failed to parse snapshot: {msg}"),
            AtmosError::SnapshotSerialize(msg) => {
                write!(f, "Failed to serialize snapshot: {msg}")
            }
        }
    }
}

impl std::error::Error for AtmosError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AtmosError::CellOutOfBounds {
            id: CellId::new(7),
            len: 4,
        };
        assert_eq!(err.to_string(), "Cell 7 out of bounds for grid of 4 cells");

        let err = AtmosError::SnapshotMismatch {
            expected: 9,
            found: 3,
        };
        assert_eq!(err.to_string(), "Snapshot holds 3 cells but the grid has 9");
    }
}
