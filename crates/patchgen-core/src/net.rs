//! Exact discrete representation of a tensor-product spline patch.

use serde::{Deserialize, Serialize};

/// Knot vector and polynomial order along one parametric direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnotBasis {
    pub order: usize,
    pub knots: Vec<f64>,
}

impl KnotBasis {
    pub fn new(order: usize, knots: Vec<f64>) -> Self {
        Self { order, knots }
    }

    /// Number of basis functions (control points along this direction).
    pub fn num_functions(&self) -> usize {
        self.knots.len().saturating_sub(self.order)
    }
}

/// Control points, optional weights and knot vectors of one patch.
///
/// `coefficients` holds one entry per control point with the first
/// parametric direction running fastest. Each entry has `dimension`
/// components, plus a trailing weight when `rational`; rational entries
/// are stored projectively (`x*w, y*w, z*w, w`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlNet {
    pub dimension: usize,
    pub rational: bool,
    pub bases: Vec<KnotBasis>,
    pub coefficients: Vec<Vec<f64>>,
}

impl ControlNet {
    pub fn pardim(&self) -> usize {
        self.bases.len()
    }

    /// Expected number of control points implied by the knot vectors.
    pub fn expected_len(&self) -> usize {
        self.bases.iter().map(KnotBasis::num_functions).product()
    }

    /// Width of one coefficient entry.
    pub fn width(&self) -> usize {
        self.dimension + usize::from(self.rational)
    }

    pub fn is_consistent(&self) -> bool {
        !self.bases.is_empty()
            && self.bases.iter().all(|b| b.order >= 1 && b.knots.len() > b.order)
            && self.coefficients.len() == self.expected_len()
            && self.coefficients.iter().all(|c| c.len() == self.width())
    }
}
