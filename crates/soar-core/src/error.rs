//! Error types for the task engine.

use thiserror::Error;

/// Parse and configuration failures.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("unknown advance mode `{0}`")]
    UnknownAdvanceMode(String),
    #[error("unknown task factory `{0}`")]
    UnknownFactory(String),
    #[error("unknown point type `{0}`")]
    UnknownPointType(String),
    #[error("invalid task behaviour: {0}")]
    Behaviour(#[from] serde_json::Error),
}

/// Structural problems found by task validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("task has no start point")]
    NoStart,
    #[error("task has no finish point")]
    NoFinish,
    #[error("point {0} must be a start point")]
    NotStart(usize),
    #[error("point {0} must be a finish point")]
    NotFinish(usize),
    #[error("point {0} is a start or finish point in an intermediate position")]
    MisplacedEndpoint(usize),
}
