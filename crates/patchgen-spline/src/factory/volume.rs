//! Volume constructors.

use patchgen_core::{PatchgenError, Result};
use patchgen_math::Vector3;

use crate::nurbs::BSplineBasis;
use crate::object::SplineObject;

/// Sweep `patch` along `offset`, appending a linear direction over `[0, 1]`.
pub fn extrude(patch: &SplineObject, offset: Vector3) -> Result<SplineObject> {
    if patch.pardim() >= 3 {
        return Err(PatchgenError::Geometry("cannot extrude a volume".into()));
    }
    let mut bases = patch.bases.clone();
    bases.push(BSplineBasis::bezier(2, 0.0, 1.0));
    let lifted = patch
        .control_points
        .iter()
        .map(|h| *h + (offset * h.w).extend(0.0));
    let cps = patch.control_points.iter().copied().chain(lifted).collect();
    SplineObject::from_parts(bases, cps, patch.rational)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{edge_curves, line};
    use patchgen_math::DVec3;

    #[test]
    fn test_extrude_square_to_box() {
        let s = edge_curves(&[
            line(DVec3::ZERO, DVec3::X),
            line(DVec3::Y, DVec3::new(1.0, 1.0, 0.0)),
        ])
        .unwrap();
        let v = extrude(&s, DVec3::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(v.shape(), vec![2, 2, 2]);
        let p = v.evaluate(&[0.5, 0.5, 0.5]).unwrap();
        assert!((p - DVec3::new(0.5, 0.5, 1.5)).length() < 1e-15);
        assert!(extrude(&v, DVec3::Z).is_err());
    }

    #[test]
    fn test_extrude_curve_gives_surface() {
        let c = extrude(&line(DVec3::ZERO, DVec3::X), DVec3::Y).unwrap();
        assert_eq!(c.pardim(), 2);
        assert!((c.corners()[3] - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-15);
    }
}
