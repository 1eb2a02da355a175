//! Grid-based atmospherics modules

pub mod cell;
pub mod cell_grid;
pub mod layout;

// Re-export main types
pub use cell::*;
pub use cell_grid::*;
pub use layout::*;
