use patchgen_core::{PatchgenError, Result};

use crate::object::SplineObject;

impl SplineObject {
    /// Reverse the parametrization along `direction`.
    pub fn reverse(&self, direction: usize) -> Result<Self> {
        let basis = self.basis(direction)?;
        let n = basis.num_functions();
        let cps = self.map_lines(direction, n, |line| Ok(line.iter().rev().copied().collect()))?;
        let mut bases = self.bases.clone();
        bases[direction] = basis.reversed();
        Self::from_parts(bases, cps, self.rational)
    }

    /// Exchange two parametric directions.
    pub fn swap(&self, d1: usize, d2: usize) -> Result<Self> {
        self.basis(d1)?;
        self.basis(d2)?;
        let shape = self.shape();
        let mut perm: Vec<usize> = (0..self.pardim()).collect();
        perm.swap(d1, d2);
        let new_shape: Vec<usize> = perm.iter().map(|&d| shape[d]).collect();

        let mut old = vec![0; shape.len()];
        let cps = (0..self.control_points.len())
            .map(|flat| {
                let mut rem = flat;
                for (k, &n) in new_shape.iter().enumerate() {
                    old[perm[k]] = rem % n;
                    rem /= n;
                }
                self.control_points[self.index(&old)]
            })
            .collect();
        let bases = perm.iter().map(|&d| self.bases[d].clone()).collect();
        Self::from_parts(bases, cps, self.rational)
    }

    /// The patch of one dimension lower at the start or end of `direction`.
    pub fn section(&self, direction: usize, at_end: bool) -> Result<Self> {
        let n = self.basis(direction)?.num_functions();
        if self.pardim() == 1 {
            return Err(PatchgenError::Geometry(
                "the boundary of a curve is a point, not a patch".into(),
            ));
        }
        let pick = if at_end { n - 1 } else { 0 };
        let cps = self.map_lines(direction, 1, |line| Ok(vec![line[pick]]))?;
        let mut bases = self.bases.clone();
        bases.remove(direction);
        Self::from_parts(bases, cps, self.rational)
    }

    /// Boundary by 1-based local index: 1/2 are the start/end of the first
    /// direction, 3/4 of the second, 5/6 of the third.
    pub fn boundary(&self, index: u8) -> Result<Self> {
        let max = 2 * self.pardim() as u8;
        if index == 0 || index > max {
            return Err(PatchgenError::Geometry(format!(
                "boundary {index} out of range 1..={max}"
            )));
        }
        let direction = usize::from((index - 1) / 2);
        self.section(direction, index % 2 == 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::{edge_curves, extrude, line};
    use patchgen_math::DVec3;

    #[test]
    fn test_reverse_curve() {
        let l = line(DVec3::ZERO, DVec3::X).insert_knot(0, 0.25).unwrap();
        let r = l.reverse(0).unwrap();
        assert_eq!(r.knots(0).unwrap(), &[0.0, 0.0, 0.75, 1.0, 1.0]);
        assert!((r.evaluate(&[0.2]).unwrap() - l.evaluate(&[0.8]).unwrap()).length() < 1e-14);
    }

    #[test]
    fn test_swap_surface() {
        let bottom = line(DVec3::ZERO, DVec3::X).refine(0, 1).unwrap();
        let s = edge_curves(&[bottom.clone(), bottom.translate(DVec3::Y)]).unwrap();
        let t = s.swap(0, 1).unwrap();
        assert_eq!(t.shape(), vec![2, 3]);
        let p = s.evaluate(&[0.3, 0.9]).unwrap();
        assert!((t.evaluate(&[0.9, 0.3]).unwrap() - p).length() < 1e-14);
    }

    #[test]
    fn test_boundaries_of_volume() {
        let bottom = line(DVec3::ZERO, DVec3::X);
        let s = edge_curves(&[bottom.clone(), bottom.clone().translate(DVec3::Y)]).unwrap();
        let v = extrude(&s, DVec3::new(0.0, 0.0, 2.0)).unwrap();
        assert_eq!(v.pardim(), 3);

        let top = v.boundary(6).unwrap();
        assert_eq!(top.pardim(), 2);
        for c in top.corners() {
            assert!((c.z - 2.0).abs() < 1e-14);
        }
        let east = v.boundary(2).unwrap();
        for c in east.corners() {
            assert!((c.x - 1.0).abs() < 1e-14);
        }
        assert!(v.boundary(0).is_err());
        assert!(v.boundary(7).is_err());
        assert!(bottom.boundary(1).is_err());
    }
}
