use patchgen_core::{ParametricPatch, PatchId, PatchgenError, RegistryError, Result, Validate};
use std::collections::HashSet;

use super::patches::PatchRegistry;
use super::types::*;

impl<P: ParametricPatch> PatchRegistry<P> {
    fn name_of(&self, key: PatchKey) -> Result<&str> {
        self.patches
            .get(key)
            .map(|e| e.name.as_str())
            .ok_or_else(|| PatchgenError::Geometry(format!("dangling patch key {key:?}")))
    }
}

impl<P: ParametricPatch> Validate for PatchRegistry<P> {
    fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.dimension) {
            return Err(PatchgenError::config(
                "dimension",
                format!("{} is not 1, 2 or 3", self.dimension),
            ));
        }

        // 1. Ids follow registration order and names resolve both ways
        if self.order.len() != self.patches.len() || self.names.len() != self.patches.len() {
            return Err(PatchgenError::Geometry(format!(
                "registry holds {} patches but orders {} and names {}",
                self.patches.len(),
                self.order.len(),
                self.names.len()
            )));
        }
        for (i, &key) in self.order.iter().enumerate() {
            let name = self.name_of(key)?;
            let entry = &self.patches[key];
            if entry.id != PatchId::from_index(i) || self.names.get(name) != Some(&key) {
                return Err(PatchgenError::Geometry(format!(
                    "patch '{name}' has id {} at position {}",
                    entry.id,
                    i + 1
                )));
            }
            if entry.patch.pardim() != self.dimension {
                return Err(PatchgenError::Geometry(format!(
                    "patch '{name}' is {}D in a {}D model",
                    entry.patch.pardim(),
                    self.dimension
                )));
            }
        }

        // 2. Connections join valid boundaries, each claimed once
        let mut seen = HashSet::new();
        for conn in &self.connections {
            for side in [conn.master, conn.slave] {
                let name = self.name_of(side.patch)?;
                let max = 2 * self.patches[side.patch].patch.pardim() as u8;
                if !(1..=max).contains(&side.boundary) {
                    return Err(RegistryError::InvalidEntity {
                        patch: name.to_string(),
                        kind: "boundary",
                        index: side.boundary,
                        max,
                    }
                    .into());
                }
                if !seen.insert(side) {
                    return Err(RegistryError::DuplicateBoundary {
                        patch: name.to_string(),
                        boundary: side.boundary,
                    }
                    .into());
                }
            }
        }
        if seen != self.claimed {
            return Err(PatchgenError::Geometry(
                "claimed boundaries do not match the connections".into(),
            ));
        }

        // 3. Set items are valid entities of their kind
        for set in &self.sets {
            for item in &set.items {
                let name = self.name_of(item.patch)?;
                let max = set.kind.count_on(self.patches[item.patch].patch.pardim());
                if !item.index.within(max) {
                    return Err(RegistryError::InvalidEntity {
                        patch: name.to_string(),
                        kind: set.kind.as_str(),
                        index: item.index.offending(max),
                        max,
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}
