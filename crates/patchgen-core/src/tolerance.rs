/// Numeric tolerances shared by the spacer and the spline kernel.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Absolute residual accepted by the root finder (in span units)
    pub residual: f64,
    /// Two parameter values closer than this are the same knot
    pub knot: f64,
}

impl Tolerance {
    pub const DEFAULT_RESIDUAL: f64 = 1e-7;
    pub const DEFAULT_KNOT: f64 = 1e-10;

    pub fn new(residual: f64, knot: f64) -> Self {
        Self { residual, knot }
    }

    pub fn default_precision() -> Self {
        Self {
            residual: Self::DEFAULT_RESIDUAL,
            knot: Self::DEFAULT_KNOT,
        }
    }

    /// Check if two parameter values denote the same knot
    pub fn knot_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.knot
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
