//! Error types for the cutter crate

use thiserror::Error;

/// Cutter error types
#[derive(Error, Debug, Clone)]
pub enum CutterError {
    /// Invalid model configuration (weights, shot counts, α/β)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The MILP admits no feasible assignment
    #[error("The cut-and-shoot model is infeasible")]
    Infeasible,

    /// The underlying solver failed for another reason
    #[error("Solver error: {0}")]
    Solver(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CutterError>;
