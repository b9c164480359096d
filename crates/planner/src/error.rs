use query_builder::accumulator::AccumulatorError;
use thiserror::Error;

/// Everything that can stop a filter from being built.
///
/// All variants except `Accumulator` are raised before the accumulator is
/// touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    #[error("association `{entity}.{field}` targets `{target}`, which has no metadata")]
    MetadataInconsistency {
        entity: String,
        field: String,
        target: String,
    },

    #[error("parameter `{0}` would be bound twice")]
    DuplicateParameterBinding(String),

    #[error("filter nests {depth} levels deep, the maximum is {max}")]
    MaxDepthExceeded { depth: usize, max: usize },

    #[error("invalid query spec: {0}")]
    InvalidSpecShape(String),

    #[error("invalid builder configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),
}
