//! Tile coordinates to cell id mapping
//!
//! The simulation itself only knows cell ids and neighbour links. A
//! [`TileLayout`] is the integration layer that turns a set of integer tile
//! positions into a wired [`CellGrid`].

use crate::error::AtmosError;
use crate::grid::{CellGrid, CellId, Direction};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Set of occupied tile positions with stable ids
#[derive(Debug, Clone, Default)]
pub struct TileLayout {
    index: FxHashMap<(i32, i32), CellId>,
    positions: Vec<(i32, i32)>,
}

impl TileLayout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Fully occupied `width × height` rectangle with its origin at `(0, 0)`
    ///
    /// Ids are assigned row by row, so `(x, y)` gets `y * width + x`.
    pub fn rectangular(width: u32, height: u32) -> Self {
        let mut layout = Self::new();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                layout.insert(x, y);
            }
        }
        layout
    }

    /// Occupy a tile and return its id; an already occupied tile keeps its id
    pub fn insert(&mut self, x: i32, y: i32) -> CellId {
        if let Some(&id) = self.index.get(&(x, y)) {
            return id;
        }
        let id = CellId::new(self.positions.len());
        self.positions.push((x, y));
        self.index.insert((x, y), id);
        id
    }

    /// Cell at a tile position
    #[inline]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<CellId> {
        self.index.get(&(x, y)).copied()
    }

    /// Tile position of a cell
    #[inline]
    pub fn position(&self, id: CellId) -> Option<(i32, i32)> {
        self.positions.get(id.index()).copied()
    }

    /// Number of occupied tiles
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Neighbour ids of a cell in slot order; missing tiles are `None`
    pub fn neighbors_of(&self, id: CellId) -> [Option<CellId>; 4] {
        let mut neighbors = [None; 4];
        if let Some((x, y)) = self.position(id) {
            for direction in Direction::ALL {
                let (dx, dy) = direction.offset();
                neighbors[direction.index()] = self.cell_at(x + dx, y + dy);
            }
        }
        neighbors
    }

    /// Build an arena with one empty cell per tile and wire both passes
    ///
    /// # Errors
    /// Propagates wiring errors from [`CellGrid::set_neighbor`] and
    /// [`CellGrid::finalize_neighbors`]
    pub fn build_grid(&self, volume: f32) -> Result<CellGrid, AtmosError> {
        let mut grid = CellGrid::with_cells(self.len(), volume);
        for index in 0..self.len() {
            let id = CellId::new(index);
            for (direction, neighbor) in Direction::ALL.into_iter().zip(self.neighbors_of(id)) {
                grid.set_neighbor(id, neighbor, direction)?;
            }
        }
        grid.finalize_neighbors()?;
        debug!("Wired {} tiles into a cell grid", self.len());
        Ok(grid)
    }
}
