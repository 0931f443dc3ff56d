//! One-dimensional B-spline basis: order plus clamped knot vector.

use nalgebra::DMatrix;
use patchgen_core::{KnotBasis, PatchgenError, Result, Tolerance};
use serde::{Deserialize, Serialize};

use super::knot::{basis_functions, basis_functions_derivs, find_span, greville, unique_knots};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSplineBasis {
    pub order: usize,
    pub knots: Vec<f64>,
}

impl BSplineBasis {
    /// Build a basis, checking the knot vector is non-decreasing and clamped.
    pub fn new(order: usize, knots: Vec<f64>) -> Result<Self> {
        if order == 0 {
            return Err(PatchgenError::Geometry("basis order must be at least 1".into()));
        }
        if knots.len() < 2 * order {
            return Err(PatchgenError::Geometry(format!(
                "{} knots are too few for order {order}",
                knots.len()
            )));
        }
        if knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(PatchgenError::Geometry("knot vector is decreasing".into()));
        }
        let n = knots.len();
        let clamped = knots[..order].iter().all(|&k| k == knots[0])
            && knots[n - order..].iter().all(|&k| k == knots[n - 1]);
        if !clamped || knots[0] >= knots[n - 1] {
            return Err(PatchgenError::Geometry(
                "knot vector must be clamped with a non-empty domain".into(),
            ));
        }
        Ok(Self { order, knots })
    }

    /// `[0,0,1,1]`-style Bezier basis of the given order on `[start, end]`.
    pub fn bezier(order: usize, start: f64, end: f64) -> Self {
        let mut knots = vec![start; order];
        knots.extend(std::iter::repeat(end).take(order));
        Self { order, knots }
    }

    pub fn degree(&self) -> usize {
        self.order - 1
    }

    pub fn num_functions(&self) -> usize {
        self.knots.len() - self.order
    }

    pub fn start(&self) -> f64 {
        self.knots[self.order - 1]
    }

    pub fn end(&self) -> f64 {
        self.knots[self.knots.len() - self.order]
    }

    pub fn contains(&self, t: f64, tol: Tolerance) -> bool {
        t >= self.start() - tol.knot && t <= self.end() + tol.knot
    }

    /// Index of the first non-zero function and the values of all
    /// `order` non-zero functions at `t`.
    pub fn evaluate(&self, t: f64) -> (usize, Vec<f64>) {
        let p = self.degree();
        let t = t.clamp(self.start(), self.end());
        let span = find_span(p, &self.knots, self.num_functions() - 1, t);
        (span - p, basis_functions(p, &self.knots, span, t))
    }

    /// Like [`evaluate`](Self::evaluate) with derivatives up to `nders`.
    pub fn evaluate_derivs(&self, t: f64, nders: usize) -> (usize, Vec<Vec<f64>>) {
        let p = self.degree();
        let t = t.clamp(self.start(), self.end());
        let span = find_span(p, &self.knots, self.num_functions() - 1, t);
        (span - p, basis_functions_derivs(p, &self.knots, span, t, nders))
    }

    /// Dense matrix of basis values: row `i` holds all functions at `params[i]`.
    pub fn collocation(&self, params: &[f64]) -> DMatrix<f64> {
        self.collocation_derivs(params, 0)
    }

    /// Dense matrix of `nders`-th derivatives at each parameter.
    pub fn collocation_derivs(&self, params: &[f64], nders: usize) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(params.len(), self.num_functions());
        for (i, &t) in params.iter().enumerate() {
            let (first, ders) = self.evaluate_derivs(t, nders);
            for (j, &v) in ders[nders].iter().enumerate() {
                m[(i, first + j)] = v;
            }
        }
        m
    }

    pub fn greville(&self) -> Vec<f64> {
        greville(self.degree(), &self.knots)
    }

    pub fn unique_knots(&self, tol: Tolerance) -> Vec<(f64, usize)> {
        unique_knots(&self.knots, tol.knot)
    }

    /// Interior knots only, with multiplicities.
    pub fn interior_knots(&self, tol: Tolerance) -> Vec<(f64, usize)> {
        let mut unique = self.unique_knots(tol);
        if unique.len() < 2 {
            return Vec::new();
        }
        unique.pop();
        unique.remove(0);
        unique
    }

    pub fn multiplicity(&self, t: f64, tol: Tolerance) -> usize {
        self.knots.iter().filter(|&&k| tol.knot_eq(k, t)).count()
    }

    /// Basis of order `order + amount` spanning the old space: every
    /// distinct knot gains `amount` in multiplicity.
    pub fn raised(&self, amount: usize, tol: Tolerance) -> Self {
        let order = self.order + amount;
        let mut knots = vec![self.start(); order];
        for (k, m) in self.interior_knots(tol) {
            knots.extend(std::iter::repeat(k).take(m + amount));
        }
        knots.extend(std::iter::repeat(self.end()).take(order));
        Self { order, knots }
    }

    /// Basis of order `order - amount` keeping the continuity at every
    /// interior knot where possible.
    pub fn lowered(&self, amount: usize, tol: Tolerance) -> Result<Self> {
        if amount >= self.order {
            return Err(PatchgenError::Geometry(format!(
                "cannot lower order {} by {amount}",
                self.order
            )));
        }
        let order = self.order - amount;
        let mut knots = vec![self.start(); order];
        for (k, m) in self.interior_knots(tol) {
            knots.extend(std::iter::repeat(k).take(m.saturating_sub(amount).max(1)));
        }
        knots.extend(std::iter::repeat(self.end()).take(order));
        Ok(Self { order, knots })
    }

    /// Mirror the parametrization: `t -> start + end - t`.
    pub fn reversed(&self) -> Self {
        let (a, b) = (self.start(), self.end());
        Self {
            order: self.order,
            knots: self.knots.iter().rev().map(|&k| a + b - k).collect(),
        }
    }

    /// Affine reparametrization onto `[start, end]`.
    pub fn reparametrized(&self, start: f64, end: f64) -> Self {
        let (a, b) = (self.start(), self.end());
        let scale = (end - start) / (b - a);
        Self {
            order: self.order,
            knots: self.knots.iter().map(|&k| start + (k - a) * scale).collect(),
        }
    }

    pub fn to_knot_basis(&self) -> KnotBasis {
        KnotBasis::new(self.order, self.knots.clone())
    }
}

impl TryFrom<&KnotBasis> for BSplineBasis {
    type Error = PatchgenError;

    fn try_from(basis: &KnotBasis) -> Result<Self> {
        Self::new(basis.order, basis.knots.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_two_spans() -> BSplineBasis {
        BSplineBasis::new(4, vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 2.0]).unwrap()
    }

    #[test]
    fn test_domain_and_count() {
        let b = cubic_two_spans();
        assert_eq!(b.num_functions(), 5);
        assert_eq!((b.start(), b.end()), (0.0, 2.0));
    }

    #[test]
    fn test_rejects_unclamped() {
        assert!(BSplineBasis::new(2, vec![0.0, 1.0, 2.0, 3.0]).is_err());
        assert!(BSplineBasis::new(2, vec![0.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn test_raise_and_lower_knots() {
        let tol = Tolerance::default();
        let b = cubic_two_spans();
        let up = b.raised(1, tol);
        assert_eq!(up.order, 5);
        assert_eq!(up.knots, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
        let down = up.lowered(1, tol).unwrap();
        assert_eq!(down, b);
        assert!(b.lowered(4, tol).is_err());
    }

    #[test]
    fn test_lower_keeps_c0_knot() {
        let tol = Tolerance::default();
        let knots = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0];
        let b = BSplineBasis::new(4, knots).unwrap();
        let down = b.lowered(2, tol).unwrap();
        assert_eq!(down.knots, vec![0.0, 0.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_collocation_rows_sum_to_one() {
        let b = cubic_two_spans();
        let m = b.collocation(&b.greville());
        assert_eq!(m.nrows(), 5);
        for i in 0..m.nrows() {
            assert!((m.row(i).sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reversed_and_reparametrized() {
        let b = BSplineBasis::new(2, vec![0.0, 0.0, 0.25, 1.0, 1.0]).unwrap();
        assert_eq!(b.reversed().knots, vec![0.0, 0.0, 0.75, 1.0, 1.0]);
        assert_eq!(b.reparametrized(2.0, 6.0).knots, vec![2.0, 2.0, 3.0, 6.0, 6.0]);
    }
}
