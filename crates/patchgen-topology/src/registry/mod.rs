mod iter;
pub mod patches;
pub mod types;
mod validate;

pub use iter::{PatchNames, Patches};
pub use patches::PatchRegistry;
pub use types::*;
