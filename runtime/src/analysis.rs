//! Post-analysis helpers
//!
//! Ground-truth execution of the uncut circuit and the Hellinger distance
//! used to judge reconstruction quality.

use crate::Result;
use cutshot_circuits::{Circuit, ExecutionBackend};

/// Run the uncut circuit and expand the counts into a dense probability
/// vector indexed by the big-endian bitstring value
pub fn ground_truth_vector(
    circuit: &Circuit,
    backend: &dyn ExecutionBackend,
    shots: u64,
) -> Result<Vec<f64>> {
    let mut prepared = circuit.clone();
    if !prepared.has_measurements() {
        prepared.num_clbits = prepared.num_qubits;
        prepared.measure_all();
    }

    let counts = backend.run(&prepared, shots)?;
    let total: u64 = counts.values().sum();
    let width = prepared.num_clbits;

    let mut vec = vec![0.0; 1 << width];
    for (bitstring, count) in counts {
        if let Ok(index) = usize::from_str_radix(&bitstring, 2) {
            vec[index] = count as f64 / total as f64;
        }
    }
    Ok(vec)
}

/// Hellinger distance between two distributions (normalised internally)
pub fn hellinger_distance(p: &[f64], q: &[f64]) -> f64 {
    let sum_p: f64 = p.iter().sum();
    let sum_q: f64 = q.iter().sum();
    if sum_p <= 0.0 || sum_q <= 0.0 {
        return 1.0;
    }

    let mut acc = 0.0;
    for (a, b) in p.iter().zip(q.iter()) {
        let diff = (a / sum_p).sqrt() - (b / sum_q).sqrt();
        acc += diff * diff;
    }
    (0.5 * acc).sqrt()
}
