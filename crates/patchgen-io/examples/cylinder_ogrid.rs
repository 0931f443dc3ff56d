//! Inner and outer O-grid rings around a cylinder, exported at the
//! configured order.
//!
//! ```text
//! cargo run -p patchgen-io --example cylinder_ogrid                # defaults
//! cargo run -p patchgen-io --example cylinder_ogrid -- run.json    # overrides
//! RUST_LOG=patchgen_io=info cargo run -p patchgen-io --example cylinder_ogrid
//! ```

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use patchgen_core::{EndCondition, GeneratorConfig, GeometryProvider, Result, Tolerance};
use patchgen_io::export;
use patchgen_math::{first_step_for_span, graded_sequence, solve_ratio_for_count, DVec3};
use patchgen_spline::{SplineKernel, SplineObject};
use patchgen_topology::{EntityKind, PatchRegistry};

const QUARTERS: [&str; 4] = ["u", "l", "d", "r"];

/// Radial curve on the x axis through the given radii.
fn radial(kernel: &SplineKernel, radii: &[f64]) -> Result<SplineObject> {
    let points: Vec<DVec3> = radii.iter().map(|&x| DVec3::new(x, 0.0, 0.0)).collect();
    kernel.interpolate_curve(&points, EndCondition::Natural, None)
}

/// Four quarter patches swept from `curve`, the first centred on +y.
fn quarters(
    kernel: &SplineKernel,
    curve: &SplineObject,
    sections: usize,
) -> Result<Vec<SplineObject>> {
    (0..4)
        .map(|k| {
            let start = FRAC_PI_4 + k as f64 * FRAC_PI_2;
            let curves: Vec<SplineObject> = (0..=sections)
                .map(|j| {
                    let angle = start + FRAC_PI_2 * j as f64 / sections as f64;
                    kernel.rotate(curve, angle, DVec3::Z)
                })
                .collect();
            kernel.loft(&curves)
        })
        .collect()
}

/// Raise every direction to at least `order`.
fn at_least(kernel: &SplineKernel, patch: SplineObject, order: usize) -> Result<SplineObject> {
    let amounts: Vec<usize> = patch.order().iter().map(|&o| order.saturating_sub(o)).collect();
    if amounts.iter().all(|&a| a == 0) {
        return Ok(patch);
    }
    kernel.raise_order(&patch, &amounts)
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => GeneratorConfig::from_path(path)?,
        None => GeneratorConfig::default(),
    };
    cfg.validate()?;

    let kernel = SplineKernel;
    let r = cfg.radius();
    let r_mid = r + cfg.boundary_layer_thickness();
    let r_out = cfg.half_width();
    let sections = (cfg.nel_circumference / 4).max(3);

    // boundary layer: fixed element count, first step from its thickness
    let nel = cfg.nel_boundary_layer;
    let dr = first_step_for_span(r_mid - r, cfg.grading, nel);
    let inner = radial(&kernel, &graded_sequence(r, dr, cfg.grading, nel))?;

    // outside it: keep growing from the last layer step, count rounded up
    let next_step = dr * cfg.grading.powi(nel as i32);
    let fit = solve_ratio_for_count(
        next_step,
        r_out - r_mid,
        cfg.grading,
        Tolerance::default().residual,
    )?;
    let outer = radial(&kernel, &fit.sequence(r_mid))?;

    let dim = cfg.dimension();
    let mut reg = PatchRegistry::new(dim);
    for (prefix, curve) in [("i", &inner), ("o", &outer)] {
        for (name, patch) in QUARTERS.iter().zip(quarters(&kernel, curve, sections)?) {
            let patch = if dim == 3 {
                kernel.extrude(&patch, DVec3::new(0.0, 0.0, cfg.height))?
            } else {
                patch
            };
            reg.add(format!("{prefix}{name}"), at_least(&kernel, patch, cfg.order)?)?;
        }
    }

    let side = if dim == 3 { EntityKind::Face } else { EntityKind::Edge };
    for q in 0..4 {
        let (this, next) = (QUARTERS[q], QUARTERS[(q + 1) % 4]);
        for prefix in ["i", "o"] {
            reg.connect(&format!("{prefix}{this}"), 4, &format!("{prefix}{next}"), 3, false)?;
        }
        reg.connect(&format!("i{this}"), 2, &format!("o{this}"), 1, false)?;
        reg.mark_boundary("cylinder", &format!("i{this}"), 1, side)?;
        reg.mark_boundary("farfield", &format!("o{this}"), 2, side)?;
        if dim == 3 {
            for prefix in ["i", "o"] {
                reg.mark_boundary("bottom", &format!("{prefix}{this}"), 5, side)?;
                reg.mark_boundary("top", &format!("{prefix}{this}"), 6, side)?;
            }
        }
    }

    let summary = export(&reg, &cfg.out, cfg.order)?;
    println!(
        "wrote {} patches to {} and {}",
        summary.patches,
        summary.geometry.display(),
        summary.descriptor.display()
    );
    Ok(())
}
