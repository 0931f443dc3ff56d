use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct PatchKey;
}

/// Topological kind of a boundary set's entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Vertex,
    Edge,
    Face,
}

impl EntityKind {
    /// Topological dimension of the entity.
    pub fn dim(self) -> usize {
        match self {
            Self::Vertex => 0,
            Self::Edge => 1,
            Self::Face => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Face => "face",
        }
    }

    /// Kind of the boundaries that connect patches of dimension `pardim`.
    pub fn boundary_of(pardim: usize) -> Option<Self> {
        match pardim {
            1 => Some(Self::Vertex),
            2 => Some(Self::Edge),
            3 => Some(Self::Face),
            _ => None,
        }
    }

    /// Number of entities of this kind on the boundary of a patch of
    /// dimension `pardim`: `C(d, k) * 2^(d - k)` for `k < d`, zero otherwise.
    pub fn count_on(self, pardim: usize) -> u8 {
        let k = self.dim();
        if k >= pardim || pardim > 3 {
            return 0;
        }
        let binomial = (0..k).fold(1, |acc, i| acc * (pardim - i) / (i + 1));
        (binomial << (pardim - k)) as u8
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-based local entity index. Vertices of volumes are sometimes addressed
/// by a pair of indices, emitted as `"i j"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityIndex {
    Single(u8),
    Pair(u8, u8),
}

impl EntityIndex {
    /// Every component lies in `1..=max`.
    pub fn within(self, max: u8) -> bool {
        let ok = |i: u8| (1..=max).contains(&i);
        match self {
            Self::Single(i) => ok(i),
            Self::Pair(i, j) => ok(i) && ok(j),
        }
    }

    /// First offending component, for error reporting.
    pub(crate) fn offending(self, max: u8) -> u8 {
        match self {
            Self::Pair(i, j) if (1..=max).contains(&i) => j,
            Self::Single(i) | Self::Pair(i, _) => i,
        }
    }
}

impl From<u8> for EntityIndex {
    fn from(i: u8) -> Self {
        Self::Single(i)
    }
}

impl From<(u8, u8)> for EntityIndex {
    fn from((i, j): (u8, u8)) -> Self {
        Self::Pair(i, j)
    }
}

impl std::fmt::Display for EntityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(i) => write!(f, "{i}"),
            Self::Pair(i, j) => write!(f, "{i} {j}"),
        }
    }
}

/// One side of a connection: a codimension-one boundary of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundaryRef {
    pub patch: PatchKey,
    pub boundary: u8,
}

/// Two patches sharing a boundary. Stored as registered; the exporter
/// orders the sides by patch id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub master: BoundaryRef,
    pub slave: BoundaryRef,
    pub reversed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub patch: PatchKey,
    pub index: EntityIndex,
}

/// Named group of entities of one kind, e.g. all edges on the inflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundarySet {
    pub name: String,
    pub kind: EntityKind,
    pub items: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchEntry<P> {
    pub name: String,
    pub id: patchgen_core::PatchId,
    pub patch: P,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_counts() {
        assert_eq!(EntityKind::Vertex.count_on(1), 2);
        assert_eq!(EntityKind::Vertex.count_on(2), 4);
        assert_eq!(EntityKind::Edge.count_on(2), 4);
        assert_eq!(EntityKind::Face.count_on(2), 0);
        assert_eq!(EntityKind::Vertex.count_on(3), 8);
        assert_eq!(EntityKind::Edge.count_on(3), 12);
        assert_eq!(EntityKind::Face.count_on(3), 6);
    }

    #[test]
    fn test_entity_index_display_and_range() {
        assert_eq!(EntityIndex::from(3).to_string(), "3");
        assert_eq!(EntityIndex::from((2, 5)).to_string(), "2 5");
        assert!(EntityIndex::Pair(1, 8).within(8));
        assert!(!EntityIndex::Pair(1, 9).within(8));
        assert_eq!(EntityIndex::Pair(1, 9).offending(8), 9);
        assert!(!EntityIndex::Single(0).within(4));
    }
}
