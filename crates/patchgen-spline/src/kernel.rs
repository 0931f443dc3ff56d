use patchgen_core::{EndCondition, GeometryProvider, Result};
use patchgen_math::{Point3, Vector3};

use crate::factory;
use crate::object::SplineObject;

/// [`GeometryProvider`] backed by [`SplineObject`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SplineKernel;

impl GeometryProvider for SplineKernel {
    type Patch = SplineObject;

    fn line(&self, a: Point3, b: Point3) -> SplineObject {
        factory::line(a, b)
    }

    fn interpolate_curve(
        &self,
        points: &[Point3],
        end: EndCondition,
        params: Option<&[f64]>,
    ) -> Result<SplineObject> {
        factory::cubic_curve(points, end, params)
    }

    fn edge_curves(&self, curves: &[SplineObject]) -> Result<SplineObject> {
        factory::edge_curves(curves)
    }

    fn loft(&self, curves: &[SplineObject]) -> Result<SplineObject> {
        factory::loft(curves)
    }

    fn split(
        &self,
        patch: &SplineObject,
        direction: usize,
        params: &[f64],
    ) -> Result<Vec<SplineObject>> {
        patch.split(direction, params)
    }

    fn refine(&self, patch: &SplineObject, direction: usize, n: usize) -> Result<SplineObject> {
        patch.refine(direction, n)
    }

    fn raise_order(&self, patch: &SplineObject, amounts: &[usize]) -> Result<SplineObject> {
        patch.raise_order(amounts)
    }

    fn extrude(&self, patch: &SplineObject, offset: Vector3) -> Result<SplineObject> {
        factory::extrude(patch, offset)
    }

    fn rotate(&self, patch: &SplineObject, angle: f64, axis: Vector3) -> SplineObject {
        patch.clone().rotate(angle, axis)
    }

    fn translate(&self, patch: &SplineObject, offset: Vector3) -> SplineObject {
        patch.clone().translate(offset)
    }

    fn reflect(&self, patch: &SplineObject, normal: Vector3) -> SplineObject {
        patch.clone().reflect(normal)
    }

    fn evaluate(&self, patch: &SplineObject, params: &[f64]) -> Result<Point3> {
        patch.evaluate(params)
    }
}
