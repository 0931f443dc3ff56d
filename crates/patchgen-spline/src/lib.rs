//! Patchgen spline kernel: B-spline and NURBS curves, surfaces and volumes
//! with the construction and refinement operations used by mesh recipes.

pub mod factory;
pub mod kernel;
pub mod nurbs;
mod object;
pub mod ops;

pub use kernel::SplineKernel;
pub use nurbs::BSplineBasis;
pub use object::SplineObject;
pub use patchgen_core::EndCondition;
