use thiserror::Error;

/// Result type for planning operations
pub type Result<T> = std::result::Result<T, PlanError>;

/// Precondition violations in the supplied entity lists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A position coordinate is NaN or infinite
    #[error("entity {index} has a non-finite position ({x}, {y})")]
    NonFinitePosition { index: usize, x: f64, y: f64 },

    /// An entity footprint has no cells
    #[error("entity {index} has an empty footprint (size {size})")]
    EmptyFootprint { index: usize, size: u32 },

    /// Two pumpjacks share an id, so rotations could not be attributed
    #[error("duplicate entity id {0}")]
    DuplicateId(u32),

    /// The entities are spread too far apart to be addressed by a local grid
    #[error("grid extent {width}x{height} exceeds the addressable range")]
    GridTooLarge { width: u64, height: u64 },
}

/// Errors surfaced by the generators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// The input was malformed
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The caller's budget ran out before the run finished
    #[error("Planning cancelled during {stage}")]
    Cancelled { stage: String },
}

impl PlanError {
    /// Create a cancellation error for the named stage
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }
}
