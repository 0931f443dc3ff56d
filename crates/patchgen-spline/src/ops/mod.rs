//! Operations on [`SplineObject`](crate::SplineObject): knot insertion,
//! splitting, order changes, rearrangement and rigid transforms.

mod knots;
mod order;
mod rearrange;
mod transform;

pub use order::make_compatible;
