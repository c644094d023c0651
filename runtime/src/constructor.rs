//! Variant construction
//!
//! For each subcircuit of the plan, enumerates every combination of cut-in
//! initialisation states and cut-out measurement bases and assembles the
//! corresponding circuits. Subcircuits build in parallel; the variants of
//! one subcircuit share their base circuit and are generated sequentially.
//!
//! Determinism: wires sort by (register name, index); enumeration follows
//! the fixed option orders with the rightmost cut varying fastest. Building
//! twice yields bit-identical names and circuits.

use crate::{InitState, MeasBasis, Result, Variant, VariantKey};
use cutshot_circuits::{Circuit, CircuitDag, Operation};
use cutshot_cutter::{CutPlan, SubcircuitSolution};
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Default bound on the construction worker pool
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// The full variant family of a plan, grouped by subcircuit
#[derive(Debug, Clone, Default)]
pub struct ConstructedVariants {
    /// subcircuit id → variants in enumeration order
    pub by_subcircuit: BTreeMap<usize, Vec<Variant>>,
}

impl ConstructedVariants {
    /// Total number of variants
    pub fn len(&self) -> usize {
        self.by_subcircuit.values().map(|v| v.len()).sum()
    }

    /// True when no variants were produced
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate every variant
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.by_subcircuit.values().flatten()
    }

    /// Index the variants by name
    pub fn by_name(&self) -> BTreeMap<String, &Variant> {
        self.iter().map(|v| (v.name(), v)).collect()
    }
}

/// Enumerate all length-`len` combinations, rightmost position fastest
fn combos<T: Copy>(options: &[T], len: usize) -> Vec<Vec<T>> {
    if len == 0 {
        return vec![Vec::new()];
    }
    (0..len)
        .map(|_| options.iter().copied())
        .multi_cartesian_product()
        .collect()
}

/// The unique wires of the given vertices, sorted by (register name, index)
fn ordered_wires(circuit: &Circuit, dag: &CircuitDag, vertices: &[usize]) -> Vec<usize> {
    let set: BTreeSet<usize> = vertices
        .iter()
        .flat_map(|&v| dag.vertex(v).qubits.iter().copied())
        .collect();
    let mut wires: Vec<usize> = set.into_iter().collect();
    wires.sort_by(|&a, &b| {
        let (reg_a, idx_a) = circuit.wire_label(a);
        let (reg_b, idx_b) = circuit.wire_label(b);
        (reg_a, idx_a).cmp(&(reg_b, idx_b))
    });
    wires
}

/// The wires carried by a set of cuts: for each cut edge, the wires shared
/// by its two endpoint operations. Cuts whose own-side vertex is a barrier
/// are filtered out. Ordered by (register name, index).
fn cut_wires(
    circuit: &Circuit,
    dag: &CircuitDag,
    cuts: &[cutshot_cutter::CutEdge],
    own_is_source: bool,
) -> Vec<usize> {
    let mut set: BTreeSet<usize> = BTreeSet::new();
    for cut in cuts {
        let (src, tgt) = cut.edge;
        let own = if own_is_source { src } else { tgt };
        if dag.vertex(own).op.is_barrier() {
            continue;
        }
        let src_wires: BTreeSet<usize> = dag.vertex(src).qubits.iter().copied().collect();
        for &wire in &dag.vertex(tgt).qubits {
            if src_wires.contains(&wire) {
                set.insert(wire);
            }
        }
    }
    let mut wires: Vec<usize> = set.into_iter().collect();
    wires.sort_by(|&a, &b| circuit.wire_label(a).cmp(&circuit.wire_label(b)));
    wires
}

/// Build all variants for every subcircuit of the plan, with the default
/// worker bound
pub fn build_variants(
    plan: &CutPlan,
    circuit: &Circuit,
    dag: &CircuitDag,
) -> Result<ConstructedVariants> {
    build_variants_bounded(plan, circuit, dag, DEFAULT_MAX_WORKERS)
}

/// Build all variants with an explicit bound on the worker pool
///
/// Subcircuits are independent tasks; variants within a subcircuit share
/// their base circuits and build sequentially.
pub fn build_variants_bounded(
    plan: &CutPlan,
    circuit: &Circuit,
    dag: &CircuitDag,
    max_workers: usize,
) -> Result<ConstructedVariants> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.max(1))
        .build()
    {
        Ok(pool) => pool.install(|| construct_all(plan, circuit, dag)),
        Err(err) => {
            warn!(%err, "could not build constructor pool; using the global pool");
            construct_all(plan, circuit, dag)
        }
    }
}

fn construct_all(plan: &CutPlan, circuit: &Circuit, dag: &CircuitDag) -> Result<ConstructedVariants> {
    let built: Result<Vec<(usize, Vec<Variant>)>> = plan
        .subcircuits
        .par_iter()
        .map(|sub| build_subcircuit_variants(circuit, dag, sub).map(|v| (sub.id, v)))
        .collect();

    let by_subcircuit: BTreeMap<usize, Vec<Variant>> = built?.into_iter().collect();
    Ok(ConstructedVariants { by_subcircuit })
}

/// Build the `4^in × 4^out` variant family of one subcircuit
fn build_subcircuit_variants(
    circuit: &Circuit,
    dag: &CircuitDag,
    sub: &SubcircuitSolution,
) -> Result<Vec<Variant>> {
    // Local qubit layout: every wire the assigned vertices touch
    let layout = ordered_wires(circuit, dag, &sub.vertices);
    let local: BTreeMap<usize, usize> = layout
        .iter()
        .enumerate()
        .map(|(idx, &wire)| (wire, idx))
        .collect();
    let qbit_map: BTreeMap<usize, usize> = layout
        .iter()
        .enumerate()
        .map(|(idx, &wire)| (idx, wire))
        .collect();
    let num_qubits = layout.len();

    let q_in = cut_wires(circuit, dag, &sub.cuts.incoming, false);
    let q_out = cut_wires(circuit, dag, &sub.cuts.outgoing, true);

    let in_combos = combos(&InitState::ALL, q_in.len());
    let out_combos = combos(&MeasBasis::ALL, q_out.len());

    let mut variants = Vec::with_capacity(in_combos.len() * out_combos.len());

    for in_combo in &in_combos {
        let init_for: BTreeMap<usize, InitState> =
            q_in.iter().copied().zip(in_combo.iter().copied()).collect();

        let base = build_base_circuit(dag, sub, &local, num_qubits, &init_for)?;

        let initialized_info: BTreeMap<usize, InitState> = init_for
            .iter()
            .map(|(&wire, &state)| (local[&wire], state))
            .collect();

        for out_combo in &out_combos {
            let mut qc = base.clone();
            let mut measured_info = BTreeMap::new();
            for (&wire, &basis) in q_out.iter().zip(out_combo.iter()) {
                let idx = local[&wire];
                for gate in basis.rotation_gates() {
                    qc.add_gate(gate, vec![idx])?;
                }
                measured_info.insert(idx, basis);
            }

            let key = VariantKey {
                sub_id: sub.id,
                inputs: q_in.iter().copied().zip(in_combo.iter().copied()).collect(),
                outputs: q_out
                    .iter()
                    .copied()
                    .zip(out_combo.iter().copied())
                    .collect(),
            };
            qc.name = key.to_string();

            variants.push(Variant {
                key,
                circuit: qc,
                active_qubits: (0..num_qubits).collect(),
                initialized_info: initialized_info.clone(),
                measured_info,
                qbit_map: qbit_map.clone(),
                shots: sub.total_shots(),
            });
        }
    }

    debug!(
        subcircuit = sub.id,
        cut_in = q_in.len(),
        cut_out = q_out.len(),
        variants = variants.len(),
        "generated subcircuit variants"
    );

    Ok(variants)
}

/// Replay the subcircuit's vertices into a fresh m-qubit circuit
///
/// Measurements are skipped; the state preparation for each cut-in wire is
/// prepended at the wire's first touch, once.
fn build_base_circuit(
    dag: &CircuitDag,
    sub: &SubcircuitSolution,
    local: &BTreeMap<usize, usize>,
    num_qubits: usize,
    init_for: &BTreeMap<usize, InitState>,
) -> Result<Circuit> {
    let mut qc = Circuit::with_name(num_qubits, &format!("sub_{}", sub.id));
    let mut initialized: BTreeSet<usize> = BTreeSet::new();

    for &v in &sub.vertices {
        let vertex = dag.vertex(v);
        if vertex.op.is_measure() {
            continue;
        }

        for &wire in &vertex.qubits {
            if init_for.contains_key(&wire) && initialized.insert(wire) {
                for gate in init_for[&wire].preparation_gates() {
                    qc.add_gate(gate, vec![local[&wire]])?;
                }
            }
        }

        match &vertex.op {
            Operation::Gate { gate, qubits } => {
                let mapped: Vec<usize> = qubits.iter().map(|q| local[q]).collect();
                qc.add_gate(gate.clone(), mapped)?;
            }
            Operation::Barrier { qubits } => {
                let mapped: Vec<usize> = qubits.iter().map(|q| local[q]).collect();
                qc.barrier(mapped);
            }
            Operation::Measure { .. } => unreachable!(),
        }
    }

    Ok(qc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutshot_cutter::{CutEdge, CutSet};
    use std::collections::BTreeMap as Map;

    /// A Bell circuit cut between H(0) and CX(0,1)
    fn bell_cut_plan() -> (Circuit, CircuitDag, CutPlan) {
        let circuit = Circuit::bell_state();
        let dag = CircuitDag::from_circuit(&circuit);
        let cut = CutEdge { id: 0, edge: (0, 1) };
        let plan = CutPlan {
            subcircuits: vec![
                SubcircuitSolution {
                    id: 0,
                    vertices: vec![0],
                    shots: Map::from([(0, 1024)]),
                    cuts: CutSet {
                        incoming: vec![],
                        outgoing: vec![cut],
                    },
                    gate_qubits: 1,
                    init_qubits: 0,
                    measured_qubits: 1,
                    input_qubits: 1,
                    contributing_qubits: 0,
                },
                SubcircuitSolution {
                    id: 1,
                    vertices: vec![1],
                    shots: Map::from([(0, 1024)]),
                    cuts: CutSet {
                        incoming: vec![cut],
                        outgoing: vec![],
                    },
                    gate_qubits: 2,
                    init_qubits: 1,
                    measured_qubits: 0,
                    input_qubits: 3,
                    contributing_qubits: 3,
                },
            ],
            num_cuts: 1,
            makespan: 0.0,
            objective: 0.0,
            qpu_times: Map::new(),
        };
        (circuit, dag, plan)
    }

    #[test]
    fn test_bell_cut_variant_counts() {
        let (circuit, dag, plan) = bell_cut_plan();
        let variants = build_variants(&plan, &circuit, &dag).unwrap();

        // Upstream: 4 measurement bases; downstream: 4 init states
        assert_eq!(variants.by_subcircuit[&0].len(), 4);
        assert_eq!(variants.by_subcircuit[&1].len(), 4);
        assert_eq!(variants.len(), 8);
    }

    #[test]
    fn test_upstream_basis_changes() {
        let (circuit, dag, plan) = bell_cut_plan();
        let variants = build_variants(&plan, &circuit, &dag).unwrap();
        let upstream = &variants.by_subcircuit[&0];

        // Base circuit is a single H; I/Z add nothing, X adds H, Y adds S†+H
        let gate_counts: Vec<usize> = upstream.iter().map(|v| v.circuit.gate_count()).collect();
        assert_eq!(gate_counts, vec![1, 2, 3, 1]);

        let x_variant = &upstream[1];
        assert_eq!(x_variant.measured_info.get(&0), Some(&MeasBasis::X));
        assert_eq!(x_variant.circuit.operations.last().unwrap().name(), "h");
    }

    #[test]
    fn test_downstream_initialisations() {
        let (circuit, dag, plan) = bell_cut_plan();
        let variants = build_variants(&plan, &circuit, &dag).unwrap();
        let downstream = &variants.by_subcircuit[&1];

        // |0⟩ adds nothing, |1⟩ one X, |+⟩ one H, |i⟩ H then S; the CX follows
        let gate_counts: Vec<usize> = downstream.iter().map(|v| v.circuit.gate_count()).collect();
        assert_eq!(gate_counts, vec![1, 2, 2, 3]);

        for variant in downstream {
            assert_eq!(variant.num_qubits(), 2);
            assert_eq!(variant.qbit_map, Map::from([(0, 0), (1, 1)]));
            // The init lands on the cut wire (local 0), before the CX
            assert_eq!(variant.initialized_info.keys().copied().collect::<Vec<_>>(), vec![0]);
            assert_eq!(variant.circuit.operations.last().unwrap().name(), "cx");
        }
    }

    #[test]
    fn test_no_cut_yields_single_variant() {
        let circuit = Circuit::new(1).h(0);
        let dag = CircuitDag::from_circuit(&circuit);
        let plan = CutPlan {
            subcircuits: vec![SubcircuitSolution {
                id: 0,
                vertices: vec![0],
                shots: Map::from([(0, 128)]),
                cuts: CutSet::default(),
                gate_qubits: 1,
                init_qubits: 0,
                measured_qubits: 0,
                input_qubits: 1,
                contributing_qubits: 1,
            }],
            num_cuts: 0,
            makespan: 0.0,
            objective: 0.0,
            qpu_times: Map::new(),
        };
        let variants = build_variants(&plan, &circuit, &dag).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants.by_subcircuit[&0][0].name(), "sub_0_in__out_");
    }

    #[test]
    fn test_measurements_skipped_in_replay() {
        let mut circuit = Circuit::new(1).h(0);
        circuit.measure_all();
        let dag = CircuitDag::from_circuit(&circuit);
        let plan = CutPlan {
            subcircuits: vec![SubcircuitSolution {
                id: 0,
                vertices: vec![0, 1],
                shots: Map::from([(0, 128)]),
                cuts: CutSet::default(),
                gate_qubits: 2,
                init_qubits: 0,
                measured_qubits: 0,
                input_qubits: 2,
                contributing_qubits: 2,
            }],
            num_cuts: 0,
            makespan: 0.0,
            objective: 0.0,
            qpu_times: Map::new(),
        };
        let variants = build_variants(&plan, &circuit, &dag).unwrap();
        let variant = &variants.by_subcircuit[&0][0];
        assert!(!variant.circuit.has_measurements());
        assert_eq!(variant.circuit.gate_count(), 1);
    }

    #[test]
    fn test_construction_is_deterministic() {
        let (circuit, dag, plan) = bell_cut_plan();
        let first = build_variants(&plan, &circuit, &dag).unwrap();
        let second = build_variants(&plan, &circuit, &dag).unwrap();

        let names_first: Vec<String> = first.iter().map(|v| v.name()).collect();
        let names_second: Vec<String> = second.iter().map(|v| v.name()).collect();
        assert_eq!(names_first, names_second);

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.circuit.to_qasm(), b.circuit.to_qasm());
        }
    }
}
