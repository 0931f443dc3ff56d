use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchgenError {
    #[error("Configuration error: {parameter}: {reason}")]
    Configuration {
        parameter: &'static str,
        reason: String,
    },

    #[error(
        "Numeric divergence: no graded spacing with first step {first_step} covers span {span} in {count} steps"
    )]
    NumericDivergence {
        first_step: f64,
        span: f64,
        count: usize,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Patch '{patch}' has order {current:?}, cannot export at higher order {requested}")]
    UnsupportedOrderIncrease {
        patch: String,
        current: Vec<usize>,
        requested: usize,
    },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural inconsistencies in a patch registry.
///
/// These always indicate a bug in the recipe composing the registry and are
/// never recovered from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("patch '{0}' is already registered")]
    DuplicateName(String),

    #[error("patch '{0}' is not registered")]
    UnknownPatch(String),

    #[error("boundary {boundary} of patch '{patch}' is already connected")]
    DuplicateBoundary { patch: String, boundary: u8 },

    #[error("{kind} {index} is not a valid local index on patch '{patch}' (valid: 1..={max})")]
    InvalidEntity {
        patch: String,
        kind: &'static str,
        index: u8,
        max: u8,
    },

    #[error("cannot connect '{a}' ({dim_a}D) to '{b}' ({dim_b}D)")]
    DimensionMismatch {
        a: String,
        dim_a: usize,
        b: String,
        dim_b: usize,
    },
}

impl PatchgenError {
    pub fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PatchgenError>;
