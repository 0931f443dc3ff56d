use glam::DVec3;

use crate::error::Result;
use crate::net::ControlNet;

/// Validate structural integrity of a geometric/topological entity.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// What the registry and the exporter need to know about a patch.
///
/// Patches are opaque geometric objects; anything that can report its
/// dimension and orders, lower its order and hand out an exact control net
/// can be registered and exported.
pub trait ParametricPatch: Clone {
    /// Number of parametric directions (1 curve, 2 surface, 3 volume).
    fn pardim(&self) -> usize;

    /// Polynomial order (degree + 1) per parametric direction.
    fn order(&self) -> Vec<usize>;

    /// Lower the order by `amounts[d]` along each direction `d`.
    fn lower_order(&self, amounts: &[usize]) -> Result<Self>;

    /// The exact control-net representation of the patch.
    fn control_net(&self) -> ControlNet;
}

/// End condition for interpolating curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndCondition {
    /// Zero second derivative at both ends.
    #[default]
    Natural,
    /// Pure interpolation, knots averaged from the parameter values.
    Free,
}

/// Curve/surface/volume construction primitives used by domain recipes.
///
/// Every operation is assumed to preserve shared boundaries exactly at
/// matching parameter values; the registry only records which boundaries
/// are meant to coincide.
pub trait GeometryProvider {
    type Patch: ParametricPatch;

    /// Straight line from `a` to `b`, parametrized over `[0, 1]`.
    fn line(&self, a: DVec3, b: DVec3) -> Self::Patch;

    /// Cubic curve through `points`, at `params` when given and at
    /// cumulative chord length otherwise.
    fn interpolate_curve(
        &self,
        points: &[DVec3],
        end: EndCondition,
        params: Option<&[f64]>,
    ) -> Result<Self::Patch>;

    /// Surface spanned by two opposite (ruled) or four cyclic (Coons) curves.
    fn edge_curves(&self, curves: &[Self::Patch]) -> Result<Self::Patch>;

    /// Surface interpolating a sequence of curves.
    fn loft(&self, curves: &[Self::Patch]) -> Result<Self::Patch>;

    /// Split at parameter values along `direction`.
    fn split(
        &self,
        patch: &Self::Patch,
        direction: usize,
        params: &[f64],
    ) -> Result<Vec<Self::Patch>>;

    /// Insert `n` uniformly spaced knots in every knot span along `direction`.
    fn refine(&self, patch: &Self::Patch, direction: usize, n: usize) -> Result<Self::Patch>;

    fn raise_order(&self, patch: &Self::Patch, amounts: &[usize]) -> Result<Self::Patch>;

    fn lower_order(&self, patch: &Self::Patch, amounts: &[usize]) -> Result<Self::Patch> {
        patch.lower_order(amounts)
    }

    /// Sweep a patch along `offset`, adding one parametric direction.
    fn extrude(&self, patch: &Self::Patch, offset: DVec3) -> Result<Self::Patch>;

    /// Rotate by `angle` radians about `axis` through the origin.
    fn rotate(&self, patch: &Self::Patch, angle: f64, axis: DVec3) -> Self::Patch;

    fn translate(&self, patch: &Self::Patch, offset: DVec3) -> Self::Patch;

    /// Mirror in the plane through the origin with the given normal.
    fn reflect(&self, patch: &Self::Patch, normal: DVec3) -> Self::Patch;

    /// Physical point at the given parameters (one per direction).
    fn evaluate(&self, patch: &Self::Patch, params: &[f64]) -> Result<DVec3>;
}
