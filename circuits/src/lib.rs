//! # Cutshot Circuit Model
//!
//! Circuit construction, gate-DAG extraction and state-vector execution for
//! the Cutshot pipeline.
//!
//! ## Features
//!
//! - **Gates**: the gate set used by the cutting pipeline (Pauli, Hadamard,
//!   phase, rotations, CNOT family, Toffoli, IsingZZ)
//! - **Circuit**: circuit construction over named quantum registers, with
//!   measurement and barrier operations
//! - **CircuitDag**: dense-index gate DAG with vertex weights and unique
//!   wire-dependency edges (the cutter's input)
//! - **QuantumRegister**: state-vector simulation
//! - **ExecutionBackend**: shot-based execution yielding bitstring counts
//! - **Noise**: optional depolarising channel for noisy-mixed backends
//!
//! ## Example
//!
//! ```rust
//! use cutshot_circuits::{Circuit, ExecutionBackend, StatevectorBackend};
//!
//! // Build a Bell pair and measure it
//! let mut circuit = Circuit::new(2).h(0).cx(0, 1);
//! circuit.measure_all();
//!
//! let backend = StatevectorBackend::with_seed("sim", 7);
//! let counts = backend.run(&circuit, 1024).unwrap();
//! assert_eq!(counts.values().sum::<u64>(), 1024);
//! ```

pub mod backend;
pub mod circuit;
pub mod dag;
pub mod error;
pub mod gates;
pub mod noise;
pub mod register;

pub use backend::{Counts, ExecutionBackend, StatevectorBackend};
pub use circuit::{Circuit, Operation, RegisterSpec};
pub use dag::{CircuitDag, DagVertex};
pub use error::{CircuitError, Result};
pub use gates::{Gate, GateType};
pub use noise::{NoiseChannel, NoiseModel};
pub use register::{QuantumRegister, StateVector};

use num_complex::Complex64;

/// Complex number type alias
pub type Complex = Complex64;

/// Zero complex number
pub const ZERO: Complex = Complex64::new(0.0, 0.0);

/// One complex number
pub const ONE: Complex = Complex64::new(1.0, 0.0);

/// Imaginary unit
pub const I: Complex = Complex64::new(0.0, 1.0);

/// 1/sqrt(2) for Hadamard normalization
pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Module version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(ZERO.re, 0.0);
        assert_eq!(ONE.re, 1.0);
        assert_eq!(I.im, 1.0);
    }
}
