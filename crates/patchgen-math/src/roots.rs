//! Derivative-free root finding: bracket expansion followed by bisection.
//!
//! The target function only needs to be monotonic on the search domain; it
//! is never differentiated, so kinks and flat extremes are fine.

use thiserror::Error;
use tracing::trace;

/// Bracket expansions tried on each side before giving up.
pub const MAX_EXPANSIONS: usize = 64;
/// Bisection steps; enough to shrink any finite bracket to float resolution.
pub const MAX_BISECTIONS: usize = 200;
/// First trial offset from the origin on an unbounded side.
pub const INITIAL_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RootError {
    #[error("no sign change found around {origin} after {expansions} expansions")]
    NoBracket { origin: f64, expansions: usize },

    #[error("bisection stalled in [{low}, {high}] with residual {residual}")]
    NoConvergence { low: f64, high: f64, residual: f64 },

    #[error("function is not finite at {at}")]
    NonFinite { at: f64 },
}

/// Find `x` in `limits` with `|f(x)| < tolerance`.
///
/// `origin` must lie strictly inside `limits`; either limit may be infinite.
pub fn find_root<F>(f: F, origin: f64, limits: (f64, f64), tolerance: f64) -> Result<f64, RootError>
where
    F: Fn(f64) -> f64,
{
    let (low, high) = expand_bracket(&f, origin, limits)?;
    bisect(&f, low, high, tolerance)
}

/// Walk outwards from `origin` on both sides until `f` changes sign.
///
/// On an unbounded side the offset doubles every expansion; towards a
/// finite limit the remaining distance is halved instead, so the limit
/// itself is never evaluated.
pub fn expand_bracket<F>(f: &F, origin: f64, limits: (f64, f64)) -> Result<(f64, f64), RootError>
where
    F: Fn(f64) -> f64,
{
    let f0 = f(origin);
    if f0.is_nan() {
        return Err(RootError::NonFinite { at: origin });
    }
    if f0 == 0.0 {
        return Ok((origin, origin));
    }

    let (lower_limit, upper_limit) = limits;
    let mut step = INITIAL_STEP;
    let mut up = origin;
    let mut down = origin;

    for i in 0..MAX_EXPANSIONS {
        let next_up = if upper_limit.is_finite() {
            up + 0.5 * (upper_limit - up)
        } else {
            origin + step
        };
        let next_down = if lower_limit.is_finite() {
            down - 0.5 * (down - lower_limit)
        } else {
            origin - step
        };
        step *= 2.0;

        let f_up = f(next_up);
        if !f_up.is_nan() && f_up * f0 <= 0.0 {
            trace!(low = up, high = next_up, expansions = i + 1, "bracket found above origin");
            return Ok((up, next_up));
        }
        let f_down = f(next_down);
        if !f_down.is_nan() && f_down * f0 <= 0.0 {
            trace!(low = next_down, high = down, expansions = i + 1, "bracket found below origin");
            return Ok((next_down, down));
        }

        up = next_up;
        down = next_down;
    }

    Err(RootError::NoBracket {
        origin,
        expansions: MAX_EXPANSIONS,
    })
}

/// Bisect a sign-changing bracket until the residual drops below `tolerance`.
pub fn bisect<F>(f: &F, low: f64, high: f64, tolerance: f64) -> Result<f64, RootError>
where
    F: Fn(f64) -> f64,
{
    let mut a = low;
    let mut b = high;
    let mut fa = f(a);
    if fa.abs() < tolerance {
        return Ok(a);
    }
    let fb = f(b);
    if fb.abs() < tolerance {
        return Ok(b);
    }

    let mut residual = fa;
    for i in 0..MAX_BISECTIONS {
        let m = 0.5 * (a + b);
        let fm = f(m);
        if fm.is_nan() {
            return Err(RootError::NonFinite { at: m });
        }
        trace!(iteration = i, x = m, residual = fm, "bisection step");
        if fm.abs() < tolerance {
            return Ok(m);
        }
        residual = fm;
        if (fm < 0.0) == (fa < 0.0) {
            a = m;
            fa = fm;
        } else {
            b = m;
        }
    }

    Err(RootError::NoConvergence {
        low: a,
        high: b,
        residual,
    })
}
