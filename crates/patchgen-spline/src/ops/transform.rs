//! Rigid and affine transforms, applied to the projective control points.

use patchgen_math::{Transform, Vector3};

use crate::object::SplineObject;

impl SplineObject {
    pub fn transform(mut self, transform: &Transform) -> Self {
        for h in &mut self.control_points {
            *h = transform.transform_hpoint(*h);
        }
        self
    }

    pub fn translate(self, offset: Vector3) -> Self {
        self.transform(&Transform::from_translation(offset))
    }

    /// Rotate by `angle` radians about `axis` through the origin.
    pub fn rotate(self, angle: f64, axis: Vector3) -> Self {
        self.transform(&Transform::from_rotation(angle, axis))
    }

    /// Mirror in the plane through the origin with normal `normal`.
    pub fn reflect(self, normal: Vector3) -> Self {
        self.transform(&Transform::from_reflection(normal))
    }

    pub fn scale(self, factor: f64) -> Self {
        self.transform(&Transform::from_scale(factor))
    }
}
