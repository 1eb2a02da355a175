//! Core types and utilities

pub mod constants;
pub mod species;
pub mod vec2;

pub use species::{Species, SPECIES_COUNT};
pub use vec2::Vec2;
