//! B-spline basis functions and knot vector algorithms.

pub mod basis;
pub mod knot;

pub use basis::BSplineBasis;
pub use knot::{basis_functions, basis_functions_derivs, find_span, greville, unique_knots};
