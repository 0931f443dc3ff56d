use approx::assert_relative_eq;
use patchgen_core::{GeometryProvider, ParametricPatch};
use patchgen_math::{first_step_for_span, graded_sequence, DVec3};
use patchgen_spline::{EndCondition, SplineKernel, SplineObject};
use std::f64::consts::{FRAC_PI_4, PI};

fn radial(kernel: &SplineKernel) -> SplineObject {
    let dr = first_step_for_span(4.5, 1.1, 12);
    let xs = graded_sequence(0.5, dr, 1.1, 12);
    let points: Vec<DVec3> = xs.iter().map(|&x| DVec3::new(x, 0.0, 0.0)).collect();
    kernel.interpolate_curve(&points, EndCondition::Natural, None).unwrap()
}

fn assert_edges_match(a: &SplineObject, a_idx: u8, b: &SplineObject, b_idx: u8, reverse: bool) {
    let ea = a.boundary(a_idx).unwrap();
    let eb = b.boundary(b_idx).unwrap();
    let (s0, s1) = ea.domain(0).unwrap();
    let (t0, t1) = eb.domain(0).unwrap();
    for i in 0..=10 {
        let f = i as f64 / 10.0;
        let g = if reverse { 1.0 - f } else { f };
        let pa = ea.evaluate(&[s0 + f * (s1 - s0)]).unwrap();
        let pb = eb.evaluate(&[t0 + g * (t1 - t0)]).unwrap();
        assert!((pa - pb).length() < 1e-9, "edge {a_idx} vs {b_idx} differ: {pa} {pb}");
    }
}

#[test]
fn test_graded_radial_curve() {
    let kernel = SplineKernel;
    let r = radial(&kernel);
    let ends = r.corners();
    assert_relative_eq!(ends[0].x, 0.5, epsilon = 1e-12);
    assert_relative_eq!(ends[1].x, 5.0, epsilon = 1e-9);
    // 13 data points, two extra end conditions
    assert_eq!(r.shape(), vec![15]);
}

#[test]
fn test_ogrid_ring_split_into_quarters() {
    let kernel = SplineKernel;
    let r = radial(&kernel);
    let knots = r.knots(0).unwrap();
    let middle = knots[knots.len() / 2];
    let mut halves = kernel.split(&r, 0, &[middle]).unwrap();
    let inner = halves.remove(0).rotate(FRAC_PI_4, DVec3::Z);

    let nel = 4;
    let sections: Vec<SplineObject> = (0..=4 * nel)
        .map(|k| kernel.rotate(&inner, 2.0 * PI * k as f64 / (4 * nel) as f64, DVec3::Z))
        .collect();
    let ring = kernel.loft(&sections).unwrap();
    let v = ring.knots(1).unwrap().to_vec();
    let ring = ring
        .insert_knot(1, 0.5 * (v[0] + v[4]))
        .unwrap()
        .insert_knot(1, 0.5 * (v[v.len() - 1] + v[v.len() - 5]))
        .unwrap();
    let v = ring.knots(1).unwrap().to_vec();
    let cuts: Vec<f64> = (1..4).map(|k| v[k * nel + 3]).collect();
    let quarters = kernel.split(&ring, 1, &cuts).unwrap();
    assert_eq!(quarters.len(), 4);

    for (k, q) in quarters.iter().enumerate() {
        assert_eq!(q.pardim(), 2);
        let next = &quarters[(k + 1) % 4];
        if k < 3 {
            assert_edges_match(q, 4, next, 3, false);
        }
    }

    // inner boundary lies on the cylinder
    for q in &quarters {
        let wall = q.boundary(1).unwrap();
        let (a, b) = wall.domain(0).unwrap();
        for i in 0..=6 {
            let p = wall.evaluate(&[a + (b - a) * i as f64 / 6.0]).unwrap();
            assert_relative_eq!(p.length(), 0.5, epsilon = 2e-3);
        }
    }
}

#[test]
fn test_order_lowering_through_trait() {
    let kernel = SplineKernel;
    let s = kernel
        .edge_curves(&[
            kernel.line(DVec3::ZERO, DVec3::X),
            kernel.line(DVec3::Y, DVec3::new(1.0, 1.0, 0.0)),
        ])
        .unwrap();
    let raised = kernel.raise_order(&s, &[2, 2]).unwrap();
    assert_eq!(ParametricPatch::order(&raised), vec![4, 4]);
    let lowered = kernel.lower_order(&raised, &[2, 2]).unwrap();
    assert_eq!(lowered.order(), vec![2, 2]);
    for (a, b) in lowered.points().iter().zip(s.points()) {
        assert!((*a - b).length() < 1e-12);
    }
}

#[test]
fn test_extrude_and_volume_faces() {
    let kernel = SplineKernel;
    let square = kernel
        .edge_curves(&[
            kernel.line(DVec3::ZERO, DVec3::X),
            kernel.line(DVec3::Y, DVec3::new(1.0, 1.0, 0.0)),
        ])
        .unwrap();
    let square = kernel.refine(&square, 0, 3).unwrap();
    let block = kernel.extrude(&square, DVec3::new(0.0, 0.0, 2.0)).unwrap();
    assert_eq!(block.shape(), vec![5, 2, 2]);
    let p = kernel.evaluate(&block, &[0.5, 0.5, 1.0]).unwrap();
    assert!((p - DVec3::new(0.5, 0.5, 2.0)).length() < 1e-14);

    let copy = kernel.translate(&block, DVec3::new(1.0, 0.0, 0.0));
    assert_edges_match(&block.boundary(2).unwrap(), 1, &copy.boundary(1).unwrap(), 1, false);
}

#[test]
fn test_reflect_mirrors_curve() {
    let kernel = SplineKernel;
    let c = kernel
        .interpolate_curve(
            &[DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 1.0, 0.0), DVec3::new(3.0, 0.0, 0.0)],
            EndCondition::Free,
            None,
        )
        .unwrap();
    let m = kernel.reflect(&c, DVec3::Y);
    let p = c.evaluate(&[0.7]).unwrap();
    let q = m.evaluate(&[0.7]).unwrap();
    assert_relative_eq!(p.x, q.x, epsilon = 1e-14);
    assert_relative_eq!(p.y, -q.y, epsilon = 1e-14);
}
