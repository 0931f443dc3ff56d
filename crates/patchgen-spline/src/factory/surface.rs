//! Surface constructors from boundary and section curves.

use patchgen_core::{PatchgenError, Result};
use patchgen_math::{HPoint, Point3};
use tracing::trace;

use crate::nurbs::BSplineBasis;
use crate::object::SplineObject;
use crate::ops::make_compatible;

const MATCH_TOL: f64 = 1e-8;

fn check_curves(curves: &[SplineObject]) -> Result<()> {
    if curves.iter().any(|c| c.pardim() != 1) {
        return Err(PatchgenError::Geometry("expected curves only".into()));
    }
    Ok(())
}

fn same_point(a: HPoint, b: HPoint) -> bool {
    (a.truncate() / a.w).distance(b.truncate() / b.w) < MATCH_TOL
}

fn first_cp(c: &SplineObject) -> HPoint {
    c.control_points[0]
}

fn last_cp(c: &SplineObject) -> HPoint {
    c.control_points[c.control_points.len() - 1]
}

/// Stack compatible patches of dimension `d` along a new last direction.
fn stack(layers: &[SplineObject], basis: BSplineBasis) -> Result<SplineObject> {
    let mut bases = layers[0].bases.clone();
    bases.push(basis);
    let cps = layers.iter().flat_map(|l| l.control_points.iter().copied()).collect();
    let rational = layers.iter().any(|l| l.rational);
    SplineObject::from_parts(bases, cps, rational)
}

/// Linear interpolation between two curves, the second direction running
/// from `a` to `b` over `[0, 1]`.
fn ruled(a: &SplineObject, b: &SplineObject) -> Result<SplineObject> {
    let both = make_compatible(&[a.clone(), b.clone()])?;
    stack(&both, BSplineBasis::bezier(2, 0.0, 1.0))
}

/// Reorder and reverse four curves into a directed loop.
fn chain_loop(mut curves: Vec<SplineObject>) -> Result<Vec<SplineObject>> {
    for i in 0..3 {
        let end = last_cp(&curves[i]);
        for j in i + 1..4 {
            if same_point(end, first_cp(&curves[j])) {
                curves.swap(i + 1, j);
                break;
            }
            if same_point(end, last_cp(&curves[j])) {
                curves[j] = curves[j].reverse(0)?;
                curves.swap(i + 1, j);
                break;
            }
        }
    }
    let closed = (0..4).all(|i| same_point(last_cp(&curves[i]), first_cp(&curves[(i + 1) % 4])));
    if !closed {
        return Err(PatchgenError::Geometry("four edge curves do not form a closed loop".into()));
    }
    Ok(curves)
}

/// Surface bounded by the given curves.
///
/// Two curves give the ruled surface between them. Four curves are
/// arranged into a closed loop (bottom, right, top, left) and filled with a
/// bilinearly blended Coons patch.
pub fn edge_curves(curves: &[SplineObject]) -> Result<SplineObject> {
    check_curves(curves)?;
    match curves.len() {
        2 => ruled(&curves[0], &curves[1]),
        4 => {
            let looped = chain_loop(curves.to_vec())?;
            let bottom = &looped[0];
            let right = &looped[1];
            let top = looped[2].reverse(0)?;
            let left = looped[3].reverse(0)?;

            let (v0, v1) = left.domain(0)?;
            let (u0, u1) = bottom.domain(0)?;
            let s1 = ruled(bottom, &top)?.reparam(1, v0, v1)?;
            let s2 = ruled(&left, right)?.swap(0, 1)?.reparam(0, u0, u1)?;
            let corners = vec![first_cp(bottom), last_cp(bottom), first_cp(&top), last_cp(&top)];
            let s3 = SplineObject::from_parts(
                vec![BSplineBasis::bezier(2, u0, u1), BSplineBasis::bezier(2, v0, v1)],
                corners,
                s1.rational,
            )?;

            let parts = make_compatible(&[s1, s2, s3])?;
            let mut coons = parts[0].clone();
            for ((c, b), a) in coons
                .control_points
                .iter_mut()
                .zip(&parts[1].control_points)
                .zip(&parts[2].control_points)
            {
                *c += *b - *a;
            }
            Ok(coons)
        }
        n => Err(PatchgenError::Geometry(format!(
            "edge_curves takes 2 or 4 curves, got {n}"
        ))),
    }
}

/// Surface interpolating the curves in sequence; the second direction
/// passes through each curve in turn.
pub fn loft(curves: &[SplineObject]) -> Result<SplineObject> {
    check_curves(curves)?;
    let n = curves.len();
    if n < 2 {
        return Err(PatchgenError::Geometry("loft needs at least two curves".into()));
    }
    if n == 2 {
        return ruled(&curves[0], &curves[1]);
    }

    let (basis, params) = if n == 3 {
        let basis = BSplineBasis::bezier(3, 0.0, 1.0);
        let params = basis.greville();
        (basis, params)
    } else {
        let centers: Vec<_> = curves
            .iter()
            .map(|c| c.points().iter().sum::<Point3>() / c.control_points.len() as f64)
            .collect();
        let mut dist = vec![0.0];
        for w in centers.windows(2) {
            let last = dist[dist.len() - 1];
            dist.push(last + w[0].distance(w[1]));
        }
        if dist.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(PatchgenError::Geometry("lofted curves must be distinct".into()));
        }
        let mut knots = vec![dist[0]; 4];
        knots.extend_from_slice(&dist[2..n - 2]);
        knots.extend([dist[n - 1]; 4]);
        (BSplineBasis::new(4, knots)?, dist)
    };
    trace!(curves = n, order = basis.order, "lofting");

    let inverse = basis
        .collocation(&params)
        .try_inverse()
        .ok_or_else(|| PatchgenError::Geometry("singular loft interpolation".into()))?;
    let compatible = make_compatible(curves)?;
    let data = stack(&compatible, basis.clone())?;
    data.apply_operator(1, basis, &inverse)
}
