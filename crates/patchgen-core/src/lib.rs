pub mod config;
pub mod error;
pub mod id;
pub mod net;
pub mod tolerance;
pub mod traits;

pub use config::GeneratorConfig;
pub use error::{PatchgenError, RegistryError, Result};
pub use id::PatchId;
pub use net::{ControlNet, KnotBasis};
pub use tolerance::Tolerance;
pub use traits::{EndCondition, GeometryProvider, ParametricPatch, Validate};
