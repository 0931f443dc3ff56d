//! Patchgen topology: the patch registry with connections and boundary sets.

pub mod registry;

pub use registry::*;
