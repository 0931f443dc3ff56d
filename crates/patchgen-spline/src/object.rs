//! Tensor-product spline patch of parametric dimension 1 to 3.

use nalgebra::DMatrix;
use patchgen_core::{ControlNet, ParametricPatch, PatchgenError, Result, Tolerance};
use patchgen_math::{HPoint, Point3};
use serde::{Deserialize, Serialize};

use crate::nurbs::BSplineBasis;

/// A B-spline or NURBS curve, surface or volume in 3D.
///
/// Control points are stored projectively (`x*w, y*w, z*w, w`) with the
/// first parametric direction running fastest, so every linear operation
/// (knot insertion, order change, interpolation) treats rational and
/// polynomial patches alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineObject {
    pub(crate) bases: Vec<BSplineBasis>,
    pub(crate) control_points: Vec<HPoint>,
    pub(crate) rational: bool,
}

impl SplineObject {
    /// Polynomial patch from Cartesian control points.
    pub fn new(bases: Vec<BSplineBasis>, control_points: Vec<Point3>) -> Result<Self> {
        let cps = control_points.into_iter().map(|p| p.extend(1.0)).collect();
        Self::from_parts(bases, cps, false)
    }

    /// Rational patch from projective control points.
    pub fn new_rational(bases: Vec<BSplineBasis>, control_points: Vec<HPoint>) -> Result<Self> {
        if control_points.iter().any(|p| p.w <= 0.0) {
            return Err(PatchgenError::Geometry("weights must be positive".into()));
        }
        Self::from_parts(bases, control_points, true)
    }

    pub(crate) fn from_parts(
        bases: Vec<BSplineBasis>,
        control_points: Vec<HPoint>,
        rational: bool,
    ) -> Result<Self> {
        if bases.is_empty() || bases.len() > 3 {
            return Err(PatchgenError::Geometry(format!(
                "parametric dimension {} is not supported",
                bases.len()
            )));
        }
        let expected: usize = bases.iter().map(BSplineBasis::num_functions).product();
        if control_points.len() != expected {
            return Err(PatchgenError::Geometry(format!(
                "expected {expected} control points, got {}",
                control_points.len()
            )));
        }
        Ok(Self {
            bases,
            control_points,
            rational,
        })
    }

    pub fn from_control_net(net: &ControlNet) -> Result<Self> {
        if !net.is_consistent() {
            return Err(PatchgenError::Geometry("inconsistent control net".into()));
        }
        if !(1..=3).contains(&net.dimension) {
            return Err(PatchgenError::Geometry(format!(
                "physical dimension {} is not supported",
                net.dimension
            )));
        }
        let bases = net
            .bases
            .iter()
            .map(BSplineBasis::try_from)
            .collect::<Result<Vec<_>>>()?;
        let dim = net.dimension;
        let cps = net
            .coefficients
            .iter()
            .map(|c| {
                let mut h = HPoint::new(0.0, 0.0, 0.0, 1.0);
                for (k, &v) in c[..dim].iter().enumerate() {
                    h[k] = v;
                }
                if net.rational {
                    h.w = c[dim];
                }
                h
            })
            .collect();
        Self::from_parts(bases, cps, net.rational)
    }

    pub fn pardim(&self) -> usize {
        self.bases.len()
    }

    pub fn bases(&self) -> &[BSplineBasis] {
        &self.bases
    }

    pub fn basis(&self, direction: usize) -> Result<&BSplineBasis> {
        self.bases.get(direction).ok_or_else(|| {
            PatchgenError::Geometry(format!(
                "direction {direction} out of range for a {}D patch",
                self.pardim()
            ))
        })
    }

    pub fn is_rational(&self) -> bool {
        self.rational
    }

    /// Number of control points along each direction.
    pub fn shape(&self) -> Vec<usize> {
        self.bases.iter().map(BSplineBasis::num_functions).collect()
    }

    pub fn order(&self) -> Vec<usize> {
        self.bases.iter().map(|b| b.order).collect()
    }

    pub fn knots(&self, direction: usize) -> Result<&[f64]> {
        Ok(&self.basis(direction)?.knots)
    }

    pub fn domain(&self, direction: usize) -> Result<(f64, f64)> {
        let b = self.basis(direction)?;
        Ok((b.start(), b.end()))
    }

    pub fn control_points(&self) -> &[HPoint] {
        &self.control_points
    }

    /// Cartesian control points.
    pub fn points(&self) -> Vec<Point3> {
        self.control_points.iter().map(|h| h.truncate() / h.w).collect()
    }

    /// Flat storage index of a multi-index.
    pub fn index(&self, multi: &[usize]) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for (&i, basis) in multi.iter().zip(&self.bases) {
            index += i * stride;
            stride *= basis.num_functions();
        }
        index
    }

    /// Evaluate the projective point at one parameter per direction.
    pub fn evaluate_h(&self, params: &[f64]) -> Result<HPoint> {
        if params.len() != self.pardim() {
            return Err(PatchgenError::Geometry(format!(
                "{} parameters given for a {}D patch",
                params.len(),
                self.pardim()
            )));
        }
        let tol = Tolerance::default();
        let mut evals = Vec::with_capacity(params.len());
        for (basis, &t) in self.bases.iter().zip(params) {
            if !basis.contains(t, tol) {
                return Err(PatchgenError::Geometry(format!(
                    "parameter {t} outside [{}, {}]",
                    basis.start(),
                    basis.end()
                )));
            }
            evals.push(basis.evaluate(t));
        }

        let total: usize = evals.iter().map(|(_, v)| v.len()).product();
        let mut result = HPoint::ZERO;
        for flat in 0..total {
            let mut rem = flat;
            let mut weight = 1.0;
            let mut index = 0;
            let mut stride = 1;
            for ((first, values), basis) in evals.iter().zip(&self.bases) {
                let k = rem % values.len();
                rem /= values.len();
                weight *= values[k];
                index += (first + k) * stride;
                stride *= basis.num_functions();
            }
            result += weight * self.control_points[index];
        }
        Ok(result)
    }

    /// Evaluate the physical point at one parameter per direction.
    pub fn evaluate(&self, params: &[f64]) -> Result<Point3> {
        let h = self.evaluate_h(params)?;
        Ok(h.truncate() / h.w)
    }

    /// Corner points, first direction fastest.
    pub fn corners(&self) -> Vec<Point3> {
        let shape = self.shape();
        let d = self.pardim();
        (0..1usize << d)
            .map(|c| {
                let multi: Vec<usize> = (0..d)
                    .map(|k| if (c >> k) & 1 == 1 { shape[k] - 1 } else { 0 })
                    .collect();
                let h = self.control_points[self.index(&multi)];
                h.truncate() / h.w
            })
            .collect()
    }

    /// Apply `f` to every line of control points running along `direction`.
    ///
    /// Each call receives one line and must return `new_len` points; the
    /// result is the reassembled control point array.
    pub(crate) fn map_lines<F>(
        &self,
        direction: usize,
        new_len: usize,
        mut f: F,
    ) -> Result<Vec<HPoint>>
    where
        F: FnMut(&[HPoint]) -> Result<Vec<HPoint>>,
    {
        let shape = self.shape();
        let n = shape[direction];
        let inner: usize = shape[..direction].iter().product();
        let outer: usize = shape[direction + 1..].iter().product();

        let mut out = vec![HPoint::ZERO; inner * new_len * outer];
        let mut line = Vec::with_capacity(n);
        for block in 0..outer {
            for k in 0..inner {
                line.clear();
                line.extend((0..n).map(|i| self.control_points[k + inner * (i + n * block)]));
                let mapped = f(&line)?;
                if mapped.len() != new_len {
                    return Err(PatchgenError::Geometry(format!(
                        "line mapped to {} points, expected {new_len}",
                        mapped.len()
                    )));
                }
                for (i, p) in mapped.into_iter().enumerate() {
                    out[k + inner * (i + new_len * block)] = p;
                }
            }
        }
        Ok(out)
    }

    /// Replace the basis along `direction`, mapping control point lines
    /// through the dense operator `m` (`new_n x old_n`).
    pub(crate) fn apply_operator(
        &self,
        direction: usize,
        basis: BSplineBasis,
        m: &DMatrix<f64>,
    ) -> Result<Self> {
        let new_n = basis.num_functions();
        let cps = self.map_lines(direction, new_n, |line| {
            Ok((0..new_n)
                .map(|i| {
                    line.iter()
                        .enumerate()
                        .fold(HPoint::ZERO, |acc, (j, p)| acc + m[(i, j)] * *p)
                })
                .collect())
        })?;
        let mut bases = self.bases.clone();
        bases[direction] = basis;
        Self::from_parts(bases, cps, self.rational)
    }
}

impl ParametricPatch for SplineObject {
    fn pardim(&self) -> usize {
        self.bases.len()
    }

    fn order(&self) -> Vec<usize> {
        SplineObject::order(self)
    }

    fn lower_order(&self, amounts: &[usize]) -> Result<Self> {
        SplineObject::lower_order(self, amounts)
    }

    fn control_net(&self) -> ControlNet {
        ControlNet {
            dimension: 3,
            rational: self.rational,
            bases: self.bases.iter().map(BSplineBasis::to_knot_basis).collect(),
            coefficients: self
                .control_points
                .iter()
                .map(|h| {
                    if self.rational {
                        vec![h.x, h.y, h.z, h.w]
                    } else {
                        vec![h.x, h.y, h.z]
                    }
                })
                .collect(),
        }
    }
}
