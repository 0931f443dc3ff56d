//! Constructors for curves, surfaces and volumes.

mod curve;
mod surface;
mod volume;

pub use curve::{chord_length_params, cubic_curve, interpolate, line};
pub use surface::{edge_curves, loft};
pub use volume::extrude;
