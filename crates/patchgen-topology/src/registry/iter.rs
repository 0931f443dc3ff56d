use slotmap::SlotMap;

use super::patches::PatchRegistry;
use super::types::*;

/// Registered patch names in registration order.
pub struct PatchNames<'a, P> {
    patches: &'a SlotMap<PatchKey, PatchEntry<P>>,
    keys: std::slice::Iter<'a, PatchKey>,
}

impl<'a, P> Iterator for PatchNames<'a, P> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let key = self.keys.next()?;
        self.patches.get(*key).map(|e| e.name.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

/// Registered patches in registration order.
pub struct Patches<'a, P> {
    patches: &'a SlotMap<PatchKey, PatchEntry<P>>,
    keys: std::slice::Iter<'a, PatchKey>,
}

impl<'a, P> Iterator for Patches<'a, P> {
    type Item = &'a PatchEntry<P>;

    fn next(&mut self) -> Option<&'a PatchEntry<P>> {
        let key = self.keys.next()?;
        self.patches.get(*key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<P> PatchRegistry<P> {
    pub fn patch_names(&self) -> PatchNames<'_, P> {
        PatchNames {
            patches: &self.patches,
            keys: self.order.iter(),
        }
    }

    pub fn patches(&self) -> Patches<'_, P> {
        Patches {
            patches: &self.patches,
            keys: self.order.iter(),
        }
    }
}
