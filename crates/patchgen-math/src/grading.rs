//! Geometrically graded parameter spacing.
//!
//! A graded spacing starts with a small step near a feature (typically a
//! wall boundary layer) and grows each following step by a constant ratio.
//! Since element counts are integers while spans are fixed, the ratio is the
//! quantity solved for.

use patchgen_core::{PatchgenError, Result};
use tracing::debug;

use crate::roots::find_root;

/// Below this distance from 1 a ratio is treated as uniform spacing.
const UNIFORM_EPS: f64 = 1e-12;

/// `count + 1` points starting at `start`, with steps
/// `first_step, first_step*ratio, first_step*ratio^2, ...`.
///
/// The sequence is strictly increasing for positive `first_step` and any
/// finite positive `ratio`.
pub fn graded_sequence(start: f64, first_step: f64, ratio: f64, count: usize) -> Vec<f64> {
    debug_assert!(ratio.is_finite() && ratio > 0.0, "ratio must be finite and positive");

    let mut points = Vec::with_capacity(count + 1);
    let mut point = start;
    let mut step = first_step;
    points.push(point);
    for _ in 0..count {
        point += step;
        step *= ratio;
        points.push(point);
    }
    points
}

/// Sum of the first `count` steps of a graded spacing.
pub fn geometric_sum(first_step: f64, ratio: f64, count: usize) -> f64 {
    let delta = ratio - 1.0;
    if delta.abs() < UNIFORM_EPS {
        first_step * count as f64
    } else {
        first_step * (ratio.powi(count as i32) - 1.0) / delta
    }
}

/// First step such that `count` steps growing by `ratio` cover exactly `span`.
pub fn first_step_for_span(span: f64, ratio: f64, count: usize) -> f64 {
    span / geometric_sum(1.0, ratio, count)
}

/// Solve for the ratio `r` with `first_step * (r^count - 1)/(r - 1) = span`
/// to within `tolerance` (absolute, span units).
///
/// The unknown is `delta = r - 1`, bracketed around zero on `(-1, inf)` and
/// then bisected.
pub fn solve_ratio_for_span(
    first_step: f64,
    span: f64,
    count: usize,
    tolerance: f64,
) -> Result<f64> {
    let divergence = || PatchgenError::NumericDivergence {
        first_step,
        span,
        count,
    };
    if !(first_step.is_finite() && span.is_finite() && tolerance > 0.0) {
        return Err(divergence());
    }

    let overshoot = |delta: f64| geometric_sum(first_step, 1.0 + delta, count) - span;
    let delta = find_root(overshoot, 0.0, (-1.0, f64::INFINITY), tolerance).map_err(|e| {
        debug!(first_step, span, count, error = %e, "graded ratio solve failed");
        divergence()
    })?;

    let ratio = 1.0 + delta;
    debug!(first_step, span, count, ratio, "solved graded ratio");
    Ok(ratio)
}

/// Result of fitting an integer number of graded steps to a span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradedFit {
    pub count: usize,
    pub ratio: f64,
    pub first_step: f64,
}

impl GradedFit {
    pub fn sequence(&self, start: f64) -> Vec<f64> {
        graded_sequence(start, self.first_step, self.ratio, self.count)
    }

    pub fn span(&self) -> f64 {
        geometric_sum(self.first_step, self.ratio, self.count)
    }
}

/// Smallest step count that covers `span` starting from `first_step` and
/// growing by `ratio`, with the ratio then re-solved so the rounded-up count
/// covers the span exactly.
///
/// Rounding is always upwards, so the realized ratio never exceeds the
/// requested one when coarsening.
pub fn solve_ratio_for_count(
    first_step: f64,
    span: f64,
    ratio: f64,
    tolerance: f64,
) -> Result<GradedFit> {
    if !(first_step.is_finite() && first_step > 0.0) {
        return Err(PatchgenError::config(
            "first_step",
            format!("{first_step} must be positive"),
        ));
    }
    if !(span.is_finite() && span > 0.0) {
        return Err(PatchgenError::config("span", format!("{span} must be positive")));
    }
    if span < first_step {
        return Err(PatchgenError::config(
            "span",
            format!("{span} is shorter than the first step {first_step}"),
        ));
    }
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(PatchgenError::config("ratio", format!("{ratio} must be positive")));
    }

    let exact = if (ratio - 1.0).abs() < UNIFORM_EPS {
        span / first_step
    } else {
        let arg = 1.0 - (1.0 - ratio) * span / first_step;
        if arg <= 0.0 {
            return Err(PatchgenError::config(
                "ratio",
                format!("steps shrinking by {ratio} from {first_step} never cover {span}"),
            ));
        }
        arg.ln() / ratio.ln()
    };
    let count = (exact.ceil() as usize).max(1);

    let ratio = solve_ratio_for_span(first_step, span, count, tolerance)?;
    debug!(first_step, span, count, ratio, "fitted graded step count");
    Ok(GradedFit {
        count,
        ratio,
        first_step,
    })
}

/// `count` interior parameter values splitting `[start, end]` into `count + 1`
/// intervals that grow by `ratio` away from `start` (or away from `end`
/// when `reverse`). Returned in increasing order.
pub fn geometric_knots(start: f64, end: f64, ratio: f64, count: usize, reverse: bool) -> Vec<f64> {
    let first = first_step_for_span(end - start, ratio, count + 1);
    let points = graded_sequence(start, first, ratio, count + 1);
    let interior = &points[1..=count];
    if reverse {
        interior.iter().rev().map(|&t| start + end - t).collect()
    } else {
        interior.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use patchgen_core::Tolerance;

    #[test]
    fn test_graded_sequence_scenario() {
        let seq = graded_sequence(0.5, 0.1, 1.05, 10);
        assert_eq!(seq.len(), 11);
        assert_eq!(seq[0], 0.5);
        let expected = 0.5 + (0..10).map(|i| 0.1 * 1.05f64.powi(i)).sum::<f64>();
        assert!((seq[10] - expected).abs() < 1e-6);
        assert!((seq[10] - 1.7577893).abs() < 1e-6);
    }

    #[test]
    fn test_graded_sequence_monotonic() {
        for &ratio in &[0.7, 0.95, 1.0, 1.05, 1.3] {
            for &count in &[1usize, 5, 40] {
                let seq = graded_sequence(-2.0, 0.01, ratio, count);
                assert_eq!(seq[0], -2.0);
                assert!(seq.windows(2).all(|w| w[1] > w[0]), "ratio {ratio} count {count}");
            }
        }
    }

    #[test]
    fn test_graded_sequence_refining() {
        let seq = graded_sequence(0.0, 1.0, 0.5, 3);
        assert_eq!(seq, vec![0.0, 1.0, 1.5, 1.75]);
    }

    #[test]
    fn test_geometric_sum_uniform_limit() {
        assert_relative_eq!(geometric_sum(0.2, 1.0, 7), 1.4, epsilon = 1e-14);
        assert_relative_eq!(geometric_sum(0.2, 1.0 + 1e-9, 7), 1.4, epsilon = 1e-6);
    }

    #[test]
    fn test_solve_ratio_grid() {
        let default_tol = Tolerance::default().residual;
        for &first_step in &[1e-3, 0.01, 1.0] {
            for &tol in &[default_tol, 1e-9] {
                for &factor in &[10.0, 100.0, 1000.0] {
                    for &count in &[5usize, 20, 80] {
                        let span = factor * first_step;
                        let ratio = solve_ratio_for_span(first_step, span, count, tol).unwrap();
                        let sum: f64 =
                            (0..count).map(|i| first_step * ratio.powi(i as i32)).sum();
                        assert!(
                            (sum - span).abs() <= tol,
                            "span {span} count {count}: ratio {ratio} sums to {sum}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_solve_ratio_refining() {
        // 20 steps of 0.01 overshoot a span of 0.1, so the ratio must shrink
        let ratio = solve_ratio_for_span(0.01, 0.1, 20, 1e-10).unwrap();
        assert!(ratio < 1.0);
        assert_relative_eq!(geometric_sum(0.01, ratio, 20), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_solve_ratio_degenerate_inputs() {
        let cases = [(0.1, -1.0, 10), (-0.1, 1.0, 10), (0.1, 1.0, 0), (0.0, 1.0, 5)];
        for (first_step, span, count) in cases {
            match solve_ratio_for_span(first_step, span, count, 1e-7) {
                Err(PatchgenError::NumericDivergence { count: c, .. }) => assert_eq!(c, count),
                other => panic!(
                    "expected divergence for ({first_step}, {span}, {count}), got {other:?}"
                ),
            }
        }
    }

    #[test]
    fn test_solve_ratio_for_count_rounds_up() {
        // boundary layer setup from the cylinder benchmark
        let first_step = first_step_for_span(0.1, 1.05, 10);
        let fit = solve_ratio_for_count(first_step, 9.5, 1.05, 1e-9).unwrap();

        let exact = (1.0 + 0.05 * 9.5 / first_step).ln() / 1.05f64.ln();
        assert_eq!(fit.count, exact.ceil() as usize);
        assert!(fit.ratio <= 1.05 + 1e-12);
        assert_relative_eq!(fit.span(), 9.5, epsilon = 1e-8);
        let seq = fit.sequence(0.5);
        assert_eq!(seq.len(), fit.count + 1);
        assert_relative_eq!(seq[fit.count], 10.0, epsilon = 1e-8);
    }

    #[test]
    fn test_solve_ratio_for_count_uniform() {
        let fit = solve_ratio_for_count(0.3, 1.0, 1.0, 1e-10).unwrap();
        assert_eq!(fit.count, 4);
        assert!(fit.ratio < 1.0);
        assert_relative_eq!(fit.span(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_solve_ratio_for_count_span_below_first_step() {
        match solve_ratio_for_count(0.1, 0.05, 1.05, Tolerance::default().residual) {
            Err(PatchgenError::Configuration { parameter, .. }) => assert_eq!(parameter, "span"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_solve_ratio_for_count_unreachable() {
        // steps 1, 0.5, 0.25, ... never reach 3
        assert!(matches!(
            solve_ratio_for_count(1.0, 3.0, 0.5, 1e-9),
            Err(PatchgenError::Configuration { parameter: "ratio", .. })
        ));
    }

    #[test]
    fn test_geometric_knots() {
        let knots = geometric_knots(0.0, 1.0, 2.0, 2, false);
        // intervals 1/7, 2/7, 4/7
        assert_eq!(knots.len(), 2);
        assert_relative_eq!(knots[0], 1.0 / 7.0, epsilon = 1e-14);
        assert_relative_eq!(knots[1], 3.0 / 7.0, epsilon = 1e-14);

        let reversed = geometric_knots(0.0, 1.0, 2.0, 2, true);
        assert_relative_eq!(reversed[0], 4.0 / 7.0, epsilon = 1e-14);
        assert_relative_eq!(reversed[1], 6.0 / 7.0, epsilon = 1e-14);
    }
}
