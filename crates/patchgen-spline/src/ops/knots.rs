use patchgen_core::{PatchgenError, Result, Tolerance};
use patchgen_math::{geometric_knots, HPoint};
use tracing::trace;

use crate::nurbs::{find_span, BSplineBasis};
use crate::object::SplineObject;

/// Boehm insertion of `t` into one line of control points.
fn insert_into_line(basis: &BSplineBasis, line: &[HPoint], t: f64) -> Vec<HPoint> {
    let p = basis.degree();
    let n = line.len() - 1;
    let k = find_span(p, &basis.knots, n, t);
    let u = &basis.knots;

    (0..=n + 1)
        .map(|i| {
            if i + p <= k {
                line[i]
            } else if i <= k {
                let alpha = (t - u[i]) / (u[i + p] - u[i]);
                alpha * line[i] + (1.0 - alpha) * line[i - 1]
            } else {
                line[i - 1]
            }
        })
        .collect()
}

impl SplineObject {
    /// Insert a single knot at `t` along `direction` without changing the shape.
    pub fn insert_knot(&self, direction: usize, t: f64) -> Result<Self> {
        let tol = Tolerance::default();
        let basis = self.basis(direction)?;
        if t <= basis.start() + tol.knot || t >= basis.end() - tol.knot {
            return Err(PatchgenError::Geometry(format!(
                "knot {t} is not inside ({}, {})",
                basis.start(),
                basis.end()
            )));
        }
        if basis.multiplicity(t, tol) >= basis.order {
            return Err(PatchgenError::Geometry(format!(
                "knot {t} already has full multiplicity {}",
                basis.order
            )));
        }

        let new_n = basis.num_functions() + 1;
        let cps = self.map_lines(direction, new_n, |line| Ok(insert_into_line(basis, line, t)))?;

        let mut knots = basis.knots.clone();
        let at = knots.partition_point(|&k| k <= t);
        knots.insert(at, t);
        let mut bases = self.bases.clone();
        bases[direction] = BSplineBasis {
            order: basis.order,
            knots,
        };
        Self::from_parts(bases, cps, self.rational)
    }

    pub fn insert_knots(&self, direction: usize, knots: &[f64]) -> Result<Self> {
        let mut out = self.clone();
        for &t in knots {
            out = out.insert_knot(direction, t)?;
        }
        Ok(out)
    }

    /// Insert `n` evenly spaced knots into every non-empty knot span.
    pub fn refine(&self, direction: usize, n: usize) -> Result<Self> {
        let tol = Tolerance::default();
        let unique = self.basis(direction)?.unique_knots(tol);
        let new_knots: Vec<f64> = unique
            .windows(2)
            .flat_map(|w| {
                let (a, b) = (w[0].0, w[1].0);
                (1..=n).map(move |j| a + (b - a) * j as f64 / (n + 1) as f64)
            })
            .collect();
        trace!(direction, inserted = new_knots.len(), "uniform refinement");
        self.insert_knots(direction, &new_knots)
    }

    /// Insert `n` knots over the whole domain so consecutive knot spans grow
    /// by `ratio` away from the start (or from the end when `reverse`).
    /// Values already present in the knot vector are skipped.
    pub fn geometric_refine(
        &self,
        direction: usize,
        ratio: f64,
        n: usize,
        reverse: bool,
    ) -> Result<Self> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(PatchgenError::config("ratio", format!("{ratio} must be positive")));
        }
        let tol = Tolerance::default();
        let basis = self.basis(direction)?;
        let new_knots: Vec<f64> = geometric_knots(basis.start(), basis.end(), ratio, n, reverse)
            .into_iter()
            .filter(|&t| basis.multiplicity(t, tol) == 0)
            .collect();
        self.insert_knots(direction, &new_knots)
    }

    /// Affinely map the parametrization along `direction` onto `[start, end]`.
    pub fn reparam(&self, direction: usize, start: f64, end: f64) -> Result<Self> {
        if !(end > start) {
            return Err(PatchgenError::Geometry(format!("empty domain [{start}, {end}]")));
        }
        let mut out = self.clone();
        out.bases[direction] = self.basis(direction)?.reparametrized(start, end);
        Ok(out)
    }

    /// Keep only control point indices `range` along `direction`.
    fn restrict(
        &self,
        direction: usize,
        range: std::ops::Range<usize>,
        basis: BSplineBasis,
    ) -> Result<Self> {
        let len = range.len();
        let cps = self.map_lines(direction, len, |line| Ok(line[range.clone()].to_vec()))?;
        let mut bases = self.bases.clone();
        bases[direction] = basis;
        Self::from_parts(bases, cps, self.rational)
    }

    /// Split in two at parameter `t` along `direction`.
    pub fn split_at(&self, direction: usize, t: f64) -> Result<(Self, Self)> {
        let tol = Tolerance::default();
        let p = self.basis(direction)?.degree();

        let mut full = self.clone();
        let present = full.basis(direction)?.multiplicity(t, tol);
        for _ in present..p {
            full = full.insert_knot(direction, t)?;
        }
        if present == 0 && p == 0 {
            full = full.insert_knot(direction, t)?;
        }

        let basis = full.basis(direction)?;
        let order = basis.order;
        let s = basis.multiplicity(t, tol);
        let a = basis
            .knots
            .iter()
            .position(|&k| tol.knot_eq(k, t))
            .ok_or_else(|| PatchgenError::Geometry(format!("split knot {t} missing")))?;
        let n = basis.num_functions();

        let mut left_knots = basis.knots[..a].to_vec();
        left_knots.extend(std::iter::repeat(t).take(order));
        let mut right_knots = vec![t; order];
        right_knots.extend_from_slice(&basis.knots[a + s..]);

        let left_basis = BSplineBasis::new(order, left_knots)?;
        let right_basis = BSplineBasis::new(order, right_knots)?;
        let right_first = (a + s).saturating_sub(order);

        let left = full.restrict(direction, 0..left_basis.num_functions(), left_basis)?;
        let right = full.restrict(direction, right_first..n, right_basis)?;
        Ok((left, right))
    }

    /// Split at every parameter in `params` along `direction`.
    pub fn split(&self, direction: usize, params: &[f64]) -> Result<Vec<Self>> {
        let mut params = params.to_vec();
        params.sort_by(f64::total_cmp);

        let mut pieces = Vec::with_capacity(params.len() + 1);
        let mut rest = self.clone();
        for t in params {
            let (left, right) = rest.split_at(direction, t)?;
            pieces.push(left);
            rest = right;
        }
        pieces.push(rest);
        Ok(pieces)
    }
}
