use crate::{DMat4, DVec4, DQuat, HPoint, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Affine transform applied to patch control points (rotation, translation,
/// reflection, uniform scaling).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub matrix: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        Self::from_mat4(DMat4::IDENTITY)
    }

    pub fn from_translation(t: Vector3) -> Self {
        Self::from_mat4(DMat4::from_translation(t))
    }

    /// Rotation by `angle` radians about `axis` through the origin.
    pub fn from_rotation(angle: f64, axis: Vector3) -> Self {
        let axis = if axis.length_squared() < 1e-30 {
            Vector3::Z
        } else {
            axis.normalize()
        };
        Self::from_mat4(DMat4::from_quat(DQuat::from_axis_angle(axis, angle)))
    }

    /// Mirror in the plane through the origin with normal `normal`.
    pub fn from_reflection(normal: Vector3) -> Self {
        let n = normal.normalize_or_zero();
        // Householder: I - 2 n n^T
        let col = |e: Vector3| (e - 2.0 * n.dot(e) * n).extend(0.0);
        Self::from_mat4(DMat4::from_cols(
            col(Vector3::X),
            col(Vector3::Y),
            col(Vector3::Z),
            DVec4::W,
        ))
    }

    pub fn from_scale(factor: f64) -> Self {
        Self::from_mat4(DMat4::from_scale(Vector3::splat(factor)))
    }

    pub fn from_mat4(m: DMat4) -> Self {
        Self {
            matrix: m.to_cols_array(),
        }
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.matrix)
    }

    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.to_mat4().transform_point3(p)
    }

    /// Transform a projective control point. The affine matrix acts on
    /// homogeneous coordinates directly, so weights are preserved.
    pub fn transform_hpoint(&self, p: HPoint) -> HPoint {
        self.to_mat4() * p
    }

    pub fn then(&self, other: &Transform) -> Transform {
        Self::from_mat4(other.to_mat4() * self.to_mat4())
    }

    pub fn inverse(&self) -> Option<Transform> {
        let m = self.to_mat4();
        if m.determinant().abs() < 1e-15 {
            None
        } else {
            Some(Self::from_mat4(m.inverse()))
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{dvec3, dvec4};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_translation() {
        let t = Transform::from_translation(dvec3(10.0, 20.0, 30.0));
        let result = t.transform_point(dvec3(1.0, 2.0, 3.0));
        assert!((result - dvec3(11.0, 22.0, 33.0)).length() < 1e-10);
    }

    #[test]
    fn test_quarter_turn_about_z() {
        let t = Transform::from_rotation(FRAC_PI_2, Vector3::Z);
        let result = t.transform_point(dvec3(1.0, 0.0, 0.0));
        assert!((result - dvec3(0.0, 1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_reflection_flips_normal_component() {
        let t = Transform::from_reflection(Vector3::X);
        let result = t.transform_point(dvec3(2.0, 3.0, -1.0));
        assert!((result - dvec3(-2.0, 3.0, -1.0)).length() < 1e-12);
        assert!((t.to_mat4().determinant() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_translation_scales_with_weight() {
        let t = Transform::from_translation(dvec3(1.0, 0.0, 0.0));
        // (2, 0, 0) with weight 0.5 stored projectively
        let p = t.transform_hpoint(dvec4(1.0, 0.0, 0.0, 0.5));
        assert!((p.truncate() / p.w - dvec3(3.0, 0.0, 0.0)).length() < 1e-12);
        assert!((p.w - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::from_translation(dvec3(10.0, 20.0, 30.0))
            .then(&Transform::from_rotation(0.3, Vector3::Y));
        let inv = t.inverse().unwrap();
        let p = dvec3(1.0, 2.0, 3.0);
        let result = inv.transform_point(t.transform_point(p));
        assert!((result - p).length() < 1e-10);
    }
}
