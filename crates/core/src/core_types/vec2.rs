//! Vector type alias for planar wind velocities and forces.

use nalgebra::Vector2;

/// 2D vector type for cell velocities and the forces derived from them.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`. The x axis runs
/// West to East and the y axis runs South to North.
pub type Vec2 = Vector2<f32>;
