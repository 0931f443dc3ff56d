//! Curve constructors.

use nalgebra::DMatrix;
use patchgen_core::{EndCondition, PatchgenError, Result};
use patchgen_math::Point3;

use crate::nurbs::BSplineBasis;
use crate::object::SplineObject;

/// Straight line from `a` to `b` over `[0, 1]`.
pub fn line(a: Point3, b: Point3) -> SplineObject {
    SplineObject {
        bases: vec![BSplineBasis::bezier(2, 0.0, 1.0)],
        control_points: vec![a.extend(1.0), b.extend(1.0)],
        rational: false,
    }
}

/// Cumulative chord length parameters starting at 0.
pub fn chord_length_params(points: &[Point3]) -> Vec<f64> {
    let mut params = Vec::with_capacity(points.len());
    let mut t = 0.0;
    params.push(t);
    for w in points.windows(2) {
        t += w[0].distance(w[1]);
        params.push(t);
    }
    params
}

fn check_params(points: &[Point3], params: &[f64]) -> Result<()> {
    if params.len() != points.len() {
        return Err(PatchgenError::Geometry(format!(
            "{} parameters given for {} points",
            params.len(),
            points.len()
        )));
    }
    if params.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(PatchgenError::Geometry(
            "interpolation parameters must be strictly increasing".into(),
        ));
    }
    Ok(())
}

/// Solve `a * x = points` (padded with zero rows) for Cartesian control points.
fn solve_points(a: DMatrix<f64>, points: &[Point3]) -> Result<Vec<Point3>> {
    let rhs = DMatrix::from_fn(a.nrows(), 3, |i, k| points.get(i).map_or(0.0, |p| p[k]));
    let x = a
        .lu()
        .solve(&rhs)
        .ok_or_else(|| PatchgenError::Geometry("singular interpolation matrix".into()))?;
    Ok((0..x.nrows())
        .map(|i| Point3::new(x[(i, 0)], x[(i, 1)], x[(i, 2)]))
        .collect())
}

/// Curve of the given order through `points` at `params`, with interior
/// knots averaged from the parameters.
pub fn interpolate(points: &[Point3], params: &[f64], order: usize) -> Result<SplineObject> {
    check_params(points, params)?;
    if order < 2 || points.len() < order {
        return Err(PatchgenError::Geometry(format!(
            "{} points cannot be interpolated with order {order}",
            points.len()
        )));
    }
    let p = order - 1;
    let n = points.len();
    let mut knots = vec![params[0]; order];
    knots.extend((1..n - p).map(|j| params[j..j + p].iter().sum::<f64>() / p as f64));
    knots.extend(std::iter::repeat(params[n - 1]).take(order));

    let basis = BSplineBasis::new(order, knots)?;
    let cps = solve_points(basis.collocation(params), points)?;
    SplineObject::new(vec![basis], cps)
}

/// Cubic curve through `points`.
///
/// Parameters default to cumulative chord length. `Natural` puts a knot at
/// every parameter and asks for vanishing second derivatives at both ends;
/// `Free` is plain interpolation with averaged knots.
pub fn cubic_curve(
    points: &[Point3],
    end: EndCondition,
    params: Option<&[f64]>,
) -> Result<SplineObject> {
    if points.len() < 2 {
        return Err(PatchgenError::Geometry("a curve needs at least two points".into()));
    }
    let params = match params {
        Some(p) => p.to_vec(),
        None => chord_length_params(points),
    };
    check_params(points, &params)?;

    match end {
        EndCondition::Free => interpolate(points, &params, 4.min(points.len())),
        EndCondition::Natural => {
            let n = params.len();
            let (t0, t1) = (params[0], params[n - 1]);
            let mut knots = vec![t0; 4];
            knots.extend_from_slice(&params[1..n - 1]);
            knots.extend([t1; 4]);
            let basis = BSplineBasis::new(4, knots)?;

            let values = basis.collocation(&params);
            let curvature = basis.collocation_derivs(&[t0, t1], 2);
            let mut a = DMatrix::zeros(n + 2, basis.num_functions());
            a.rows_mut(0, n).copy_from(&values);
            a.rows_mut(n, 2).copy_from(&curvature);

            let cps = solve_points(a, points)?;
            SplineObject::new(vec![basis], cps)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchgen_math::DVec3;

    #[test]
    fn test_line() {
        let l = line(DVec3::ZERO, DVec3::new(2.0, 2.0, 0.0));
        assert_eq!(l.order(), vec![2]);
        assert!((l.evaluate(&[0.25]).unwrap() - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-15);
    }

    #[test]
    fn test_interpolate_passes_through_points() {
        let points: Vec<DVec3> = (0..6)
            .map(|i| {
                let t = i as f64 * 0.4;
                DVec3::new(t.cos(), t.sin(), 0.1 * t)
            })
            .collect();
        let params = chord_length_params(&points);
        let c = interpolate(&points, &params, 4).unwrap();
        assert_eq!(c.shape(), vec![6]);
        for (p, &t) in points.iter().zip(&params) {
            assert!((c.evaluate(&[t]).unwrap() - *p).length() < 1e-12);
        }
    }

    #[test]
    fn test_natural_cubic_of_collinear_points_is_straight() {
        let points: Vec<DVec3> = [0.5, 0.625, 0.75, 1.0, 1.5, 2.0]
            .iter()
            .map(|&x| DVec3::new(x, 0.0, 0.0))
            .collect();
        let c = cubic_curve(&points, EndCondition::Natural, None).unwrap();
        assert_eq!(c.shape(), vec![points.len() + 2]);
        assert_eq!(c.domain(0).unwrap(), (0.0, 1.5));
        // chord-length parametrization of a straight line is the arc length
        for i in 0..=30 {
            let t = 1.5 * i as f64 / 30.0;
            let p = c.evaluate(&[t]).unwrap();
            assert!((p - DVec3::new(0.5 + t, 0.0, 0.0)).length() < 1e-12, "at {t}: {p}");
        }
        // knots sit at the data parameters
        assert_eq!(&c.knots(0).unwrap()[4..8], &[0.125, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn test_natural_end_curvature_vanishes() {
        let points = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(3.0, 1.0, 0.0),
        ];
        let params = [0.0, 1.0, 2.0, 3.0];
        let c = cubic_curve(&points, EndCondition::Natural, Some(&params)).unwrap();
        for (p, &t) in points.iter().zip(&params) {
            assert!((c.evaluate(&[t]).unwrap() - *p).length() < 1e-12);
        }
        let basis = c.basis(0).unwrap();
        for t in [0.0, 3.0] {
            let (first, ders) = basis.evaluate_derivs(t, 2);
            let second = ders[2]
                .iter()
                .enumerate()
                .fold(DVec3::ZERO, |acc, (j, &v)| acc + v * c.points()[first + j]);
            assert!(second.length() < 1e-10);
        }
    }

    #[test]
    fn test_free_with_few_points() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0)];
        let c = cubic_curve(&points, EndCondition::Free, None).unwrap();
        assert_eq!(c.order(), vec![3]);
    }

    #[test]
    fn test_rejects_repeated_points() {
        let points = vec![DVec3::ZERO, DVec3::ZERO, DVec3::X];
        assert!(cubic_curve(&points, EndCondition::Natural, None).is_err());
        assert!(cubic_curve(&points[..1], EndCondition::Natural, None).is_err());
    }
}
