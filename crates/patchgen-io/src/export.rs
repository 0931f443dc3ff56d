//! Registry export: one `.g2` geometry file plus one `.xinp` connectivity
//! descriptor, both named after a common base path.

use std::ffi::OsString;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use patchgen_core::{ControlNet, ParametricPatch, PatchgenError, Result, Validate};
use patchgen_topology::PatchRegistry;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::g2;
use crate::xinp::ConnectivityDescriptor;

/// What a successful export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub geometry: PathBuf,
    pub descriptor: PathBuf,
    pub patches: usize,
    pub connections: usize,
    pub sets: usize,
}

/// Writes a registry at a fixed polynomial order in every direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyExporter {
    order: usize,
}

impl TopologyExporter {
    pub fn new(order: usize) -> Self {
        Self { order }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Control nets of every patch in registration order, each lowered to
    /// the export order.
    pub fn control_nets<P: ParametricPatch>(
        &self,
        registry: &PatchRegistry<P>,
    ) -> Result<Vec<ControlNet>> {
        registry
            .patches()
            .map(|entry| {
                let current = entry.patch.order();
                if current.iter().any(|&o| o < self.order) {
                    return Err(PatchgenError::UnsupportedOrderIncrease {
                        patch: entry.name.clone(),
                        current,
                        requested: self.order,
                    });
                }
                let amounts: Vec<usize> = current.iter().map(|&o| o - self.order).collect();
                if amounts.iter().all(|&a| a == 0) {
                    return Ok(entry.patch.control_net());
                }
                debug!(patch = %entry.name, ?current, order = self.order, "lowering order");
                Ok(entry.patch.lower_order(&amounts)?.control_net())
            })
            .collect()
    }

    /// Write `<base>.g2` and `<base>.xinp`.
    ///
    /// Nothing is created unless every patch can be brought to the export
    /// order. Both files are written to temporaries next to their targets
    /// and moved into place together.
    pub fn export<P: ParametricPatch>(
        &self,
        registry: &PatchRegistry<P>,
        base: impl AsRef<Path>,
    ) -> Result<ExportSummary> {
        registry.validate()?;
        let nets = self.control_nets(registry)?;

        let base = base.as_ref();
        let geometry = with_suffix(base, ".g2");
        let descriptor = with_suffix(base, ".xinp");
        let patchfile = geometry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                PatchgenError::config("out", format!("{} has no file name", base.display()))
            })?;

        let model = ConnectivityDescriptor::from_registry(registry, patchfile)?;

        let g2_tmp = write_temp(&geometry, |w| g2::write_g2(w, &nets))?;
        let xinp_tmp = write_temp(&descriptor, |w| Ok(w.write_all(model.to_xml().as_bytes())?))?;

        g2_tmp.persist(&geometry).map_err(|e| e.error)?;
        if let Err(e) = xinp_tmp.persist(&descriptor) {
            let _ = fs::remove_file(&geometry);
            return Err(e.error.into());
        }

        let summary = ExportSummary {
            geometry,
            descriptor,
            patches: nets.len(),
            connections: model.topology.len(),
            sets: model.topologysets.len(),
        };
        info!(
            geometry = %summary.geometry.display(),
            descriptor = %summary.descriptor.display(),
            patches = summary.patches,
            connections = summary.connections,
            sets = summary.sets,
            "exported registry"
        );
        Ok(summary)
    }
}

/// Export `registry` at `order` to `<base>.g2` and `<base>.xinp`.
pub fn export<P: ParametricPatch>(
    registry: &PatchRegistry<P>,
    base: impl AsRef<Path>,
    order: usize,
) -> Result<ExportSummary> {
    TopologyExporter::new(order).export(registry, base)
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Temporary file in the target's directory holding what `fill` wrote.
fn write_temp<F>(target: &Path, fill: F) -> Result<NamedTempFile>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
{
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        fill(&mut writer)?;
        writer.flush()?;
    }
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_is_appended() {
        assert_eq!(with_suffix(Path::new("out/cyl"), ".g2"), PathBuf::from("out/cyl.g2"));
        assert_eq!(with_suffix(Path::new("run.v1"), ".xinp"), PathBuf::from("run.v1.xinp"));
    }
}
