//! Cross-QPU merge and normalisation
//!
//! Variants of the same name are shot-split across QPUs, so their raw
//! counts are additive. Merging sums the counts, recomputes the shot total
//! and normalises to probabilities. Merging is commutative and associative
//! over the per-QPU result lists.

use crate::{ConstructedVariants, InitState, MeasBasis, QpuResults, Result, RuntimeError};
use cutshot_circuits::Counts;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// A merged, normalised variant distribution with its metadata
#[derive(Debug, Clone, Serialize)]
pub struct VariantDistribution {
    /// The owning subcircuit
    pub sub_id: usize,
    /// bitstring → probability, keys sorted
    pub probabilities: BTreeMap<String, f64>,
    /// Total shots across all QPUs
    pub total_shots: u64,
    /// Local qubit indices in use
    pub active_qubits: Vec<usize>,
    /// local qubit → initialisation state
    pub initialized_info: BTreeMap<usize, InitState>,
    /// local qubit → measurement basis
    pub measured_info: BTreeMap<usize, MeasBasis>,
    /// local qubit → global wire
    pub qbit_map: BTreeMap<usize, usize>,
}

/// Merge per-QPU results and normalise counts into probabilities
///
/// A bitstring whose width disagrees with the variant's active-qubit count
/// is a fatal shape error. Variants that produced no counts anywhere are
/// absent from the output (the reconstruction treats them as zero).
pub fn merge_and_normalize(
    qpu_results: &[QpuResults],
    variants: &ConstructedVariants,
) -> Result<BTreeMap<String, VariantDistribution>> {
    let metadata = variants.by_name();

    let mut merged_counts: BTreeMap<String, Counts> = BTreeMap::new();
    let mut total_shots: BTreeMap<String, u64> = BTreeMap::new();

    for results in qpu_results {
        for (name, record) in results {
            let entry = merged_counts.entry(name.clone()).or_default();
            for (bitstring, count) in &record.counts {
                *entry.entry(bitstring.trim().to_string()).or_insert(0) += count;
            }
            *total_shots.entry(name.clone()).or_insert(0) +=
                record.counts.values().sum::<u64>();
        }
    }

    let mut distributions = BTreeMap::new();
    for (name, counts) in merged_counts {
        let shots = total_shots[&name];
        if shots == 0 {
            continue;
        }
        let Some(variant) = metadata.get(&name) else {
            warn!(variant = %name, "results for an unknown variant; skipping");
            continue;
        };

        let width = variant.active_qubits.len();
        let mut probabilities = BTreeMap::new();
        for (bitstring, count) in counts {
            if bitstring.len() != width {
                return Err(RuntimeError::Shape {
                    variant: name.clone(),
                    bitstring: bitstring.clone(),
                    expected: width,
                    actual: bitstring.len(),
                });
            }
            probabilities.insert(bitstring, count as f64 / shots as f64);
        }

        distributions.insert(
            name,
            VariantDistribution {
                sub_id: variant.sub_id(),
                probabilities,
                total_shots: shots,
                active_qubits: variant.active_qubits.clone(),
                initialized_info: variant.initialized_info.clone(),
                measured_info: variant.measured_info.clone(),
                qbit_map: variant.qbit_map.clone(),
            },
        );
    }

    Ok(distributions)
}
