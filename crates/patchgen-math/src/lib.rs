pub mod grading;
pub mod roots;
pub mod transform;

pub use glam::{DAffine3, DMat3, DMat4, DQuat, DVec2, DVec3, DVec4};
pub use grading::{
    first_step_for_span, geometric_knots, geometric_sum, graded_sequence, solve_ratio_for_count,
    solve_ratio_for_span, GradedFit,
};
pub use roots::{find_root, RootError};
pub use transform::Transform;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
/// Projective control point `(x*w, y*w, z*w, w)`.
pub type HPoint = DVec4;
