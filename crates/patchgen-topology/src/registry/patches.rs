use std::collections::{HashMap, HashSet};

use patchgen_core::{ParametricPatch, PatchId, RegistryError, Result};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::debug;

use super::types::*;

/// Patches of one generation run with their pairwise connections and named
/// boundary sets.
///
/// Patch ids are assigned in registration order and never change, since
/// patches cannot be removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRegistry<P> {
    pub(crate) dimension: usize,
    pub(crate) patches: SlotMap<PatchKey, PatchEntry<P>>,
    pub(crate) order: Vec<PatchKey>,
    pub(crate) names: HashMap<String, PatchKey>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) claimed: HashSet<BoundaryRef>,
    pub(crate) sets: Vec<BoundarySet>,
}

impl<P: ParametricPatch> PatchRegistry<P> {
    /// Empty registry for a model of the given dimension (2 or 3).
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            patches: SlotMap::with_key(),
            order: Vec::new(),
            names: HashMap::new(),
            connections: Vec::new(),
            claimed: HashSet::new(),
            sets: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Register `patch` under `name`.
    pub fn add(&mut self, name: impl Into<String>, patch: P) -> Result<PatchId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name).into());
        }
        let id = PatchId::from_index(self.order.len());
        let key = self.patches.insert(PatchEntry {
            name: name.clone(),
            id,
            patch,
        });
        self.order.push(key);
        debug!(%name, %id, "registered patch");
        self.names.insert(name, key);
        Ok(id)
    }

    /// Register several patches at once, in order.
    pub fn add_all<N, I>(&mut self, names: &[N], patches: I) -> Result<Vec<PatchId>>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = P>,
    {
        names
            .iter()
            .zip(patches)
            .map(|(name, patch)| self.add(name.as_ref(), patch))
            .collect()
    }

    fn key(&self, name: &str) -> Result<PatchKey> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownPatch(name.to_string()).into())
    }

    fn check_boundary(&self, key: PatchKey, boundary: u8) -> Result<()> {
        let entry = &self.patches[key];
        let max = 2 * entry.patch.pardim() as u8;
        if !(1..=max).contains(&boundary) {
            return Err(RegistryError::InvalidEntity {
                patch: entry.name.clone(),
                kind: "boundary",
                index: boundary,
                max,
            }
            .into());
        }
        Ok(())
    }

    /// Record that boundary `boundary_a` of `a` coincides with boundary
    /// `boundary_b` of `b`, with opposite parametrization when `reversed`.
    ///
    /// Each (patch, boundary) may take part in one connection only.
    pub fn connect(
        &mut self,
        a: &str,
        boundary_a: u8,
        b: &str,
        boundary_b: u8,
        reversed: bool,
    ) -> Result<()> {
        let ka = self.key(a)?;
        let kb = self.key(b)?;
        let (dim_a, dim_b) = (self.patches[ka].patch.pardim(), self.patches[kb].patch.pardim());
        if dim_a != dim_b {
            return Err(RegistryError::DimensionMismatch {
                a: a.to_string(),
                dim_a,
                b: b.to_string(),
                dim_b,
            }
            .into());
        }
        self.check_boundary(ka, boundary_a)?;
        self.check_boundary(kb, boundary_b)?;

        let master = BoundaryRef {
            patch: ka,
            boundary: boundary_a,
        };
        let slave = BoundaryRef {
            patch: kb,
            boundary: boundary_b,
        };
        for (side, name) in [(master, a), (slave, b)] {
            if self.claimed.contains(&side) || master == slave {
                return Err(RegistryError::DuplicateBoundary {
                    patch: name.to_string(),
                    boundary: side.boundary,
                }
                .into());
            }
        }

        self.claimed.insert(master);
        self.claimed.insert(slave);
        self.connections.push(Connection {
            master,
            slave,
            reversed,
        });
        debug!(a, boundary_a, b, boundary_b, reversed, "connected patches");
        Ok(())
    }

    /// Append entity `index` of `patch` to the set `set` of the given kind.
    ///
    /// The same entity may appear in any number of sets, including twice in
    /// the same one.
    pub fn mark_boundary(
        &mut self,
        set: &str,
        patch: &str,
        index: impl Into<EntityIndex>,
        kind: EntityKind,
    ) -> Result<()> {
        let key = self.key(patch)?;
        let index = index.into();
        let max = kind.count_on(self.patches[key].patch.pardim());
        if !index.within(max) {
            return Err(RegistryError::InvalidEntity {
                patch: patch.to_string(),
                kind: kind.as_str(),
                index: index.offending(max),
                max,
            }
            .into());
        }

        let item = EntityRef { patch: key, index };
        match self.sets.iter().position(|s| s.name == set && s.kind == kind) {
            Some(pos) => self.sets[pos].items.push(item),
            None => {
                let new_set = BoundarySet {
                    name: set.to_string(),
                    kind,
                    items: vec![item],
                };
                // keep sets of one name together, kinds in first-seen order
                match self.sets.iter().rposition(|s| s.name == set) {
                    Some(last) => self.sets.insert(last + 1, new_set),
                    None => self.sets.push(new_set),
                }
            }
        }
        debug!(set, patch, %index, %kind, "marked boundary");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&P> {
        let key = self.names.get(name)?;
        Some(&self.patches[*key].patch)
    }

    /// Mutable access to a patch's geometry. Its name and id are fixed.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut P> {
        let key = self.names.get(name)?;
        Some(&mut self.patches[*key].patch)
    }

    pub fn id_of(&self, name: &str) -> Option<PatchId> {
        let key = self.names.get(name)?;
        Some(self.patches[*key].id)
    }

    pub fn entry(&self, key: PatchKey) -> Option<&PatchEntry<P>> {
        self.patches.get(key)
    }

    /// Id of the patch behind a stored key.
    pub fn id(&self, key: PatchKey) -> Option<PatchId> {
        self.patches.get(key).map(|e| e.id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Boundary sets grouped by name in first-seen order, then by kind.
    pub fn boundary_sets(&self) -> &[BoundarySet] {
        &self.sets
    }

    /// Whether `boundary` of `name` already takes part in a connection.
    pub fn is_connected(&self, name: &str, boundary: u8) -> bool {
        self.names.get(name).is_some_and(|&patch| {
            self.claimed.contains(&BoundaryRef { patch, boundary })
        })
    }
}
