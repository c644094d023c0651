//! Error types for the runtime crate

use cutshot_circuits::CircuitError;
use cutshot_cutter::CutterError;
use thiserror::Error;

/// Runtime error types
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Circuit construction or simulation error
    #[error("Circuit error: {0}")]
    Circuit(#[from] CircuitError),

    /// Cutter/scheduler error (configuration or infeasibility)
    #[error("Cutter error: {0}")]
    Cutter(#[from] CutterError),

    /// A merged bitstring disagrees with the declared active-qubit count
    #[error("Shape error in variant {variant}: bitstring '{bitstring}' has width {actual}, expected {expected}")]
    Shape {
        variant: String,
        bitstring: String,
        expected: usize,
        actual: usize,
    },

    /// A backend rejected a variant (recovered per-variant by the dispatcher)
    #[error("Backend error for variant {variant}: {reason}")]
    Backend { variant: String, reason: String },

    /// The plan references a subcircuit the constructor did not produce
    #[error("Subcircuit {0} is missing from the constructed variants")]
    MissingSubcircuit(usize),

    /// Every variant execution failed; no backend accepted work
    #[error("No variant produced results; all backends refused work")]
    NoResults,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RuntimeError>;
