//! Variant dispatch
//!
//! Expands the plan's shot table into per-QPU work lists, groups circuits
//! by shot count, and collects raw counts per variant name. Submission is
//! serialised per backend; a failure on one variant drops only that variant.

use crate::{ConstructedVariants, Result, RuntimeError};
use cutshot_circuits::{Circuit, Counts};
use cutshot_cutter::{CutPlan, QpuRegistry};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Raw execution result of one variant on one QPU
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    /// bitstring → count
    pub counts: Counts,
    /// Total shots observed
    pub total_shots: u64,
}

/// Per-QPU execution results keyed by variant name
pub type QpuResults = BTreeMap<String, ExecutionRecord>;

/// Clone a variant circuit for execution, appending a full measurement
/// layer when the circuit has none
fn prepare_for_execution(circuit: &Circuit) -> Circuit {
    let mut prepared = circuit.clone();
    if !prepared.has_measurements() {
        prepared.num_clbits = prepared.num_qubits;
        prepared.measure_all();
    }
    prepared
}

/// Execute every variant on its assigned QPUs and collect raw counts
///
/// Returns one result map per QPU that received work. Backend failures are
/// surfaced per-variant: logged and dropped, never aborting siblings.
pub fn dispatch(
    plan: &CutPlan,
    variants: &ConstructedVariants,
    qpus: &QpuRegistry,
) -> Result<Vec<QpuResults>> {
    // (qpu index) → [(name, circuit, shots)]
    let mut assignments: BTreeMap<usize, Vec<(String, Circuit, u64)>> = BTreeMap::new();
    for sub in &plan.subcircuits {
        let sub_variants = variants
            .by_subcircuit
            .get(&sub.id)
            .ok_or(RuntimeError::MissingSubcircuit(sub.id))?;
        for (&qpu_index, &shots) in &sub.shots {
            if shots == 0 {
                continue;
            }
            let jobs = assignments.entry(qpu_index).or_default();
            for variant in sub_variants {
                jobs.push((variant.name(), variant.circuit.clone(), shots));
            }
        }
    }

    let mut all_results = Vec::with_capacity(assignments.len());
    for (qpu_index, jobs) in assignments {
        let Some(qpu) = qpus.get_by_index(qpu_index) else {
            warn!(qpu = qpu_index, "plan references an unknown QPU; skipping");
            continue;
        };

        // Batch by shot count, the way jobs are grouped for submission
        let mut by_shots: BTreeMap<u64, Vec<(String, Circuit)>> = BTreeMap::new();
        for (name, circuit, shots) in jobs {
            by_shots.entry(shots).or_default().push((name, circuit));
        }

        let mut results = QpuResults::new();
        for (shots, group) in by_shots {
            debug!(
                qpu = qpu_index,
                shots,
                circuits = group.len(),
                "submitting variant batch"
            );
            for (name, circuit) in group {
                let prepared = prepare_for_execution(&circuit);
                match qpu.backend().run(&prepared, shots) {
                    Ok(counts) => {
                        let total_shots = counts.values().sum();
                        results.insert(
                            name,
                            ExecutionRecord {
                                counts,
                                total_shots,
                            },
                        );
                    }
                    Err(err) => {
                        warn!(
                            variant = %name,
                            qpu = qpu_index,
                            error = %err,
                            "variant execution failed; dropping variant"
                        );
                    }
                }
            }
        }

        info!(
            qpu = qpu_index,
            variants = results.len(),
            "collected QPU results"
        );
        all_results.push(results);
    }

    Ok(all_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_variants;
    use cutshot_circuits::{Circuit, CircuitDag};
    use cutshot_cutter::{CutSet, QpuDescriptor, QpuKind, SubcircuitSolution};
    use std::collections::BTreeMap as Map;

    fn single_sub_plan(shots: Map<usize, u64>) -> CutPlan {
        CutPlan {
            subcircuits: vec![SubcircuitSolution {
                id: 0,
                vertices: vec![0, 1],
                shots,
                cuts: CutSet::default(),
                gate_qubits: 3,
                init_qubits: 0,
                measured_qubits: 0,
                input_qubits: 3,
                contributing_qubits: 3,
            }],
            num_cuts: 0,
            makespan: 0.0,
            objective: 0.0,
            qpu_times: Map::new(),
        }
    }

    fn registry(n: usize) -> QpuRegistry {
        let descriptors: Vec<QpuDescriptor> = (0..n)
            .map(|i| QpuDescriptor {
                kind: QpuKind::Simulator,
                execution_time: 1,
                queue_time: 0,
                capacity: 8,
                index: i,
            })
            .collect();
        QpuRegistry::from_descriptors(&descriptors)
    }

    #[test]
    fn test_dispatch_collects_counts() {
        let circuit = Circuit::bell_state();
        let dag = CircuitDag::from_circuit(&circuit);
        let plan = single_sub_plan(Map::from([(0, 256)]));
        let variants = build_variants(&plan, &circuit, &dag).unwrap();

        let results = dispatch(&plan, &variants, &registry(1)).unwrap();
        assert_eq!(results.len(), 1);
        let record = results[0].get("sub_0_in__out_").unwrap();
        assert_eq!(record.total_shots, 256);
        assert_eq!(record.counts.values().sum::<u64>(), 256);
    }

    #[test]
    fn test_shot_split_across_qpus() {
        let circuit = Circuit::bell_state();
        let dag = CircuitDag::from_circuit(&circuit);
        let plan = single_sub_plan(Map::from([(0, 100), (1, 156)]));
        let variants = build_variants(&plan, &circuit, &dag).unwrap();

        let results = dispatch(&plan, &variants, &registry(2)).unwrap();
        assert_eq!(results.len(), 2);
        let total: u64 = results
            .iter()
            .map(|r| r.get("sub_0_in__out_").unwrap().total_shots)
            .sum();
        assert_eq!(total, 256);
    }

    #[test]
    fn test_auto_measure_layer() {
        let circuit = Circuit::bell_state();
        let prepared = prepare_for_execution(&circuit);
        assert!(prepared.has_measurements());
        assert_eq!(prepared.num_clbits, 2);
        // The original variant circuit is untouched
        assert!(!circuit.has_measurements());
    }
}
