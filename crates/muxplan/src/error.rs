use thiserror::Error;

/// Errors that abort plan compilation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Probe data or its stream list is missing or malformed; no plan is produced
    #[error("Invalid probe input: {0}")]
    InvalidInput(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PlanError>;
