//! Execution backends
//!
//! A backend takes a measured circuit and a shot count and returns raw
//! bitstring counts, the way a QPU job does. The state-vector backend is the
//! only concrete implementation; the trait is the seam where hardware
//! submission would plug in.
//!
//! Bitstring convention: classical bit 0 is the leftmost character, so a
//! probability vector is indexed by `int(bitstring, 2)` with clbit 0 in the
//! most significant position.

use crate::{Circuit, CircuitError, NoiseModel, Operation, QuantumRegister, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Raw measurement counts keyed by bitstring
pub type Counts = BTreeMap<String, u64>;

/// Shot-based circuit execution
pub trait ExecutionBackend: Send + Sync {
    /// Backend name (for logs and error reports)
    fn name(&self) -> &str;

    /// Execute the circuit for `shots` samples and return raw counts
    fn run(&self, circuit: &Circuit, shots: u64) -> Result<Counts>;
}

/// State-vector simulator backend
///
/// Job submission is serialised through an internal lock so that a backend
/// handle can be shared read-only across dispatcher tasks.
#[derive(Debug)]
pub struct StatevectorBackend {
    name: String,
    noise: Option<NoiseModel>,
    rng: Mutex<StdRng>,
}

impl StatevectorBackend {
    /// Create a backend with an entropy-seeded RNG
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            noise: None,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a backend with a fixed RNG seed (reproducible sampling)
    pub fn with_seed(name: &str, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            noise: None,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Attach a noise model
    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.noise = Some(noise);
        self
    }

    /// True if a noise model is attached
    pub fn is_noisy(&self) -> bool {
        self.noise.is_some()
    }
}

impl ExecutionBackend for StatevectorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, circuit: &Circuit, shots: u64) -> Result<Counts> {
        let mut register = QuantumRegister::new(circuit.num_qubits);
        let mut rng = self.rng.lock().map_err(|_| {
            CircuitError::BackendFailure {
                backend: self.name.clone(),
                reason: "rng poisoned".to_string(),
            }
        })?;

        // clbit -> measured qubit, in program order
        let mut measured: BTreeMap<usize, usize> = BTreeMap::new();
        let mut measured_wires = vec![false; circuit.num_qubits];

        for op in &circuit.operations {
            match op {
                Operation::Gate { gate, qubits } => {
                    if qubits.iter().any(|&q| measured_wires[q]) {
                        return Err(CircuitError::InvalidState(format!(
                            "gate {} after measurement; only terminal measurements are supported",
                            gate.name
                        )));
                    }
                    register.apply_gate(gate, qubits)?;
                    if let Some(noise) = &self.noise {
                        noise.apply_after_gate(&mut register.state, qubits, &mut *rng)?;
                    }
                }
                Operation::Measure { qubit, clbit } => {
                    measured.insert(*clbit, *qubit);
                    measured_wires[*qubit] = true;
                }
                Operation::Barrier { .. } => {}
            }
        }

        if measured.is_empty() {
            return Err(CircuitError::MeasurementError(format!(
                "circuit '{}' has no measurements",
                circuit.name
            )));
        }

        tracing::debug!(
            backend = %self.name,
            circuit = %circuit.name,
            shots,
            "sampling circuit"
        );
        let outcomes = register.sample_outcomes(shots, &mut *rng);

        let mut counts = Counts::new();
        for outcome in outcomes {
            let bitstring: String = (0..circuit.num_clbits)
                .map(|clbit| match measured.get(&clbit) {
                    Some(&q) if (outcome >> q) & 1 == 1 => '1',
                    _ => '0',
                })
                .collect();
            *counts.entry(bitstring).or_insert(0) += 1;
        }

        Ok(counts)
    }
}
