/// Stable 1-based patch number, equal to the patch's registration order.
///
/// This is the number downstream solvers see in the geometry file and the
/// connectivity descriptor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PatchId(u32);

impl PatchId {
    /// Build the id for the patch at zero-based registration position `index`.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Zero-based registration position.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl std::fmt::Display for PatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_one_based() {
        let id = PatchId::from_index(0);
        assert_eq!(id.value(), 1);
        assert_eq!(id.index(), 0);
        assert_eq!(id.to_string(), "1");
        assert!(PatchId::from_index(3) > PatchId::from_index(2));
    }
}
