//! Error types for the circuit crate

use thiserror::Error;

/// Circuit error types
#[derive(Error, Debug, Clone)]
pub enum CircuitError {
    #[error("Invalid qubit index {0}, circuit has {1} qubits")]
    InvalidQubitIndex(usize, usize),

    #[error("Invalid classical bit index {0}, circuit has {1} classical bits")]
    InvalidClassicalIndex(usize, usize),

    #[error("Gate {gate} references qubit {qubit} more than once")]
    DuplicateQubit { gate: String, qubit: usize },

    #[error("State vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Measurement error: {0}")]
    MeasurementError(String),

    #[error("Backend {backend} failed: {reason}")]
    BackendFailure { backend: String, reason: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CircuitError>;
