//! Noise models for noisy-mixed backends
//!
//! Noise is opt-in: a backend carries `Option<NoiseModel>` and clean
//! simulators never pay for it.

use crate::{Gate, Result, StateVector};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Types of noise channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseChannel {
    /// Depolarizing noise: applies a random Pauli with probability p
    Depolarizing,
    /// Bit flip: X error with probability p
    BitFlip,
    /// Phase flip: Z error with probability p
    PhaseFlip,
}

/// A noise model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Error probability per touched qubit per gate
    pub error_rate: f64,
    /// Active noise channel
    pub channel: NoiseChannel,
}

impl NoiseModel {
    /// Depolarizing model with the given per-qubit error rate
    pub fn depolarizing(error_rate: f64) -> Self {
        Self {
            error_rate,
            channel: NoiseChannel::Depolarizing,
        }
    }

    /// Stochastically inject an error on each touched qubit
    pub fn apply_after_gate<R: Rng>(
        &self,
        state: &mut StateVector,
        qubits: &[usize],
        rng: &mut R,
    ) -> Result<()> {
        if self.error_rate <= 0.0 {
            return Ok(());
        }
        for &q in qubits {
            if rng.gen::<f64>() >= self.error_rate {
                continue;
            }
            let error = match self.channel {
                NoiseChannel::BitFlip => Gate::x(),
                NoiseChannel::PhaseFlip => Gate::z(),
                NoiseChannel::Depolarizing => match rng.gen_range(0..3) {
                    0 => Gate::x(),
                    1 => Gate::y(),
                    _ => Gate::z(),
                },
            };
            state.apply_gate(&error, &[q])?;
        }
        Ok(())
    }
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self::depolarizing(0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_rate_is_identity() {
        let model = NoiseModel::depolarizing(0.0);
        let mut state = StateVector::new(2);
        let before = state.amplitudes().to_vec();
        let mut rng = StdRng::seed_from_u64(1);
        model.apply_after_gate(&mut state, &[0, 1], &mut rng).unwrap();
        assert_eq!(state.amplitudes(), &before[..]);
    }

    #[test]
    fn test_certain_bit_flip() {
        let model = NoiseModel {
            error_rate: 1.0,
            channel: NoiseChannel::BitFlip,
        };
        let mut state = StateVector::new(1);
        let mut rng = StdRng::seed_from_u64(1);
        model.apply_after_gate(&mut state, &[0], &mut rng).unwrap();
        assert!(state.probability(1) > 0.999);
    }
}
