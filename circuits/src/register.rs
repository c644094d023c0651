//! Quantum register - multi-qubit state vector simulation
//!
//! This module provides the simulation engine behind the execution backend.
//! Gates are applied directly on the amplitude vector (the amplitude index
//! encodes qubit q as bit q), so circuits of QAOA size stay tractable.

use crate::{Circuit, CircuitError, Complex, Gate, Operation, Result, ONE, ZERO};
use rand::Rng;

/// State vector representation of a quantum register
#[derive(Debug, Clone)]
pub struct StateVector {
    /// Number of qubits
    pub num_qubits: usize,
    /// State amplitudes (length = 2^num_qubits)
    amplitudes: Vec<Complex>,
}

impl StateVector {
    /// Create a new state vector initialized to |0...0⟩
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1 << num_qubits;
        let mut amplitudes = vec![ZERO; dim];
        amplitudes[0] = ONE;
        Self {
            num_qubits,
            amplitudes,
        }
    }

    /// Create from existing amplitudes
    pub fn from_amplitudes(amplitudes: Vec<Complex>) -> Result<Self> {
        let dim = amplitudes.len();
        if dim == 0 || (dim & (dim - 1)) != 0 {
            return Err(CircuitError::InvalidState(
                "amplitudes length must be a power of 2".to_string(),
            ));
        }
        let num_qubits = dim.trailing_zeros() as usize;
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Get the dimension (2^n)
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Get amplitude for a basis state
    pub fn amplitude(&self, index: usize) -> Complex {
        self.amplitudes.get(index).copied().unwrap_or(ZERO)
    }

    /// Get all amplitudes
    pub fn amplitudes(&self) -> &[Complex] {
        &self.amplitudes
    }

    /// Normalize the state vector
    pub fn normalize(&mut self) {
        let norm: f64 = self
            .amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt();
        if norm > 1e-15 {
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
    }

    /// Check if normalized
    pub fn is_normalized(&self) -> bool {
        let norm_sq: f64 = self.amplitudes.iter().map(|a| a.norm_sqr()).sum();
        (norm_sq - 1.0).abs() < 1e-10
    }

    /// Probability distribution over basis states
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Probability of measuring a specific basis state
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitudes
            .get(index)
            .map(|a| a.norm_sqr())
            .unwrap_or(0.0)
    }

    /// Apply a gate to the listed qubits
    ///
    /// `qubits[0]` is the most significant qubit of the gate matrix index,
    /// matching the |q₀q₁⟩ ordering of the matrices in [`Gate`].
    pub fn apply_gate(&mut self, gate: &Gate, qubits: &[usize]) -> Result<()> {
        let k = qubits.len();
        if k != gate.num_qubits {
            return Err(CircuitError::InvalidParameter(format!(
                "gate {} expects {} qubits, got {}",
                gate.name, gate.num_qubits, k
            )));
        }
        for (i, &q) in qubits.iter().enumerate() {
            if q >= self.num_qubits {
                return Err(CircuitError::InvalidQubitIndex(q, self.num_qubits));
            }
            if qubits[..i].contains(&q) {
                return Err(CircuitError::DuplicateQubit {
                    gate: gate.name.clone(),
                    qubit: q,
                });
            }
        }

        let matrix = gate.matrix();
        let dim = self.dimension();
        let span = 1usize << k;
        let gate_mask: usize = qubits.iter().map(|&q| 1usize << q).sum();

        // Precompute the amplitude-index offset of each gate-matrix index
        let offsets: Vec<usize> = (0..span)
            .map(|g| {
                let mut offset = 0;
                for (j, &q) in qubits.iter().enumerate() {
                    if (g >> (k - 1 - j)) & 1 == 1 {
                        offset |= 1 << q;
                    }
                }
                offset
            })
            .collect();

        let mut scratch = vec![ZERO; span];
        for base in 0..dim {
            if base & gate_mask != 0 {
                continue;
            }
            for (g, s) in scratch.iter_mut().enumerate() {
                *s = self.amplitudes[base | offsets[g]];
            }
            for r in 0..span {
                let mut acc = ZERO;
                for c in 0..span {
                    acc += matrix[(r, c)] * scratch[c];
                }
                self.amplitudes[base | offsets[r]] = acc;
            }
        }

        Ok(())
    }
}

/// Quantum register with simulation capabilities
#[derive(Debug, Clone)]
pub struct QuantumRegister {
    /// The quantum state
    pub state: StateVector,
}

impl QuantumRegister {
    /// Create a new quantum register with n qubits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            state: StateVector::new(num_qubits),
        }
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.state.num_qubits
    }

    /// Reset to |0...0⟩
    pub fn reset(&mut self) {
        self.state = StateVector::new(self.num_qubits());
    }

    /// Apply a gate
    pub fn apply_gate(&mut self, gate: &Gate, qubits: &[usize]) -> Result<()> {
        self.state.apply_gate(gate, qubits)
    }

    /// Apply every gate of a measurement-free circuit
    ///
    /// Barriers are ignored. Measurement operations are rejected; circuits
    /// containing them must go through an execution backend.
    pub fn apply_circuit(&mut self, circuit: &Circuit) -> Result<()> {
        for op in &circuit.operations {
            match op {
                Operation::Gate { gate, qubits } => self.state.apply_gate(gate, qubits)?,
                Operation::Barrier { .. } => {}
                Operation::Measure { .. } => {
                    return Err(CircuitError::MeasurementError(
                        "circuit contains measurements; execute it on a backend".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Sample measurement outcomes (as amplitude indices) without collapsing
    pub fn sample_outcomes<R: Rng>(&self, shots: u64, rng: &mut R) -> Vec<usize> {
        let probs = self.state.probabilities();
        let mut cdf = Vec::with_capacity(probs.len());
        let mut acc = 0.0;
        for p in &probs {
            acc += p;
            cdf.push(acc);
        }

        (0..shots)
            .map(|_| {
                let r: f64 = rng.gen::<f64>() * acc;
                cdf.partition_point(|&c| c < r).min(probs.len() - 1)
            })
            .collect()
    }
}

impl std::fmt::Display for QuantumRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.num_qubits();
        let terms: Vec<String> = (0..self.state.dimension())
            .filter_map(|i| {
                let amp = self.state.amplitude(i);
                if amp.norm_sqr() > 1e-10 {
                    let basis: String = (0..n)
                        .map(|b| if (i >> b) & 1 == 1 { '1' } else { '0' })
                        .collect();
                    Some(format!("({:.4})|{}⟩", amp, basis))
                } else {
                    None
                }
            })
            .collect();
        write!(f, "{}", terms.join(" + "))
    }
}
