use patchgen_core::{PatchgenError, Result, Tolerance};
use tracing::trace;

use crate::nurbs::BSplineBasis;
use crate::object::SplineObject;

impl SplineObject {
    /// Project onto `basis` along `direction` by interpolating at its
    /// Greville abscissae. Exact whenever the new space contains the old one.
    fn change_basis(&self, direction: usize, basis: BSplineBasis) -> Result<Self> {
        let old = self.basis(direction)?;
        let g = basis.greville();
        let m = basis
            .collocation(&g)
            .lu()
            .solve(&old.collocation(&g))
            .ok_or_else(|| {
                PatchgenError::Geometry(format!(
                    "singular interpolation onto order {} along direction {direction}",
                    basis.order
                ))
            })?;
        self.apply_operator(direction, basis, &m)
    }

    fn check_amounts(&self, amounts: &[usize]) -> Result<()> {
        if amounts.len() != self.pardim() {
            return Err(PatchgenError::Geometry(format!(
                "{} order amounts given for a {}D patch",
                amounts.len(),
                self.pardim()
            )));
        }
        Ok(())
    }

    /// Raise the order by `amounts[d]` along each direction. The shape is
    /// unchanged.
    pub fn raise_order(&self, amounts: &[usize]) -> Result<Self> {
        self.check_amounts(amounts)?;
        let tol = Tolerance::default();
        let mut out = self.clone();
        for (direction, &amount) in amounts.iter().enumerate() {
            if amount == 0 {
                continue;
            }
            let basis = out.bases[direction].raised(amount, tol);
            out = out.change_basis(direction, basis)?;
        }
        Ok(out)
    }

    /// Lower the order by `amounts[d]` along each direction.
    ///
    /// Interior knot multiplicities drop by the same amount (never below
    /// one) and the new control points interpolate the old patch at the
    /// Greville points, so the ends are kept exactly.
    pub fn lower_order(&self, amounts: &[usize]) -> Result<Self> {
        self.check_amounts(amounts)?;
        let tol = Tolerance::default();
        let mut out = self.clone();
        for (direction, &amount) in amounts.iter().enumerate() {
            if amount == 0 {
                continue;
            }
            let basis = out.bases[direction].lowered(amount, tol)?;
            let from = out.bases[direction].order;
            trace!(direction, from, to = basis.order, "lowering order");
            out = out.change_basis(direction, basis)?;
        }
        Ok(out)
    }

    /// Raise or lower each direction to the given order.
    pub fn set_order(&self, orders: &[usize]) -> Result<Self> {
        self.check_amounts(orders)?;
        let current = self.order();
        let up: Vec<usize> = orders
            .iter()
            .zip(&current)
            .map(|(&o, &c)| o.saturating_sub(c))
            .collect();
        let down: Vec<usize> = orders
            .iter()
            .zip(&current)
            .map(|(&o, &c)| c.saturating_sub(o))
            .collect();
        self.raise_order(&up)?.lower_order(&down)
    }
}

/// Bring patches onto common bases: equal orders, the domain of the first
/// patch and the union of all interior knots along every direction.
pub fn make_compatible(patches: &[SplineObject]) -> Result<Vec<SplineObject>> {
    let Some(first) = patches.first() else {
        return Ok(Vec::new());
    };
    let pardim = first.pardim();
    if patches.iter().any(|p| p.pardim() != pardim) {
        return Err(PatchgenError::Geometry(
            "cannot make patches of different dimension compatible".into(),
        ));
    }

    let tol = Tolerance::default();
    let mut out = patches.to_vec();
    for direction in 0..pardim {
        let order = out.iter().map(|p| p.bases[direction].order).max().unwrap_or(1);
        let (start, end) = first.domain(direction)?;
        for patch in &mut out {
            let mut amounts = vec![0; pardim];
            amounts[direction] = order - patch.bases[direction].order;
            *patch = patch.raise_order(&amounts)?;
            let (a, b) = patch.domain(direction)?;
            if !tol.knot_eq(a, start) || !tol.knot_eq(b, end) {
                *patch = patch.reparam(direction, start, end)?;
            }
        }

        let mut target: Vec<(f64, usize)> = Vec::new();
        for patch in &out {
            for (k, m) in patch.bases[direction].interior_knots(tol) {
                match target.iter_mut().find(|(t, _)| tol.knot_eq(*t, k)) {
                    Some(entry) => entry.1 = entry.1.max(m),
                    None => target.push((k, m)),
                }
            }
        }
        for patch in &mut out {
            let basis = &patch.bases[direction];
            let missing: Vec<f64> = target
                .iter()
                .flat_map(|&(k, m)| {
                    let have = basis.multiplicity(k, tol);
                    std::iter::repeat(k).take(m.saturating_sub(have))
                })
                .collect();
            *patch = patch.insert_knots(direction, &missing)?;
        }
    }
    Ok(out)
}
