//! End-to-end pipeline tests
//!
//! Covers the full chain on small circuits with seeded backends: plan
//! invariants, variant-family sizes, reconstruction quality on cut-free
//! partitions and the infeasibility sentinel.

use cutshot_circuits::{Circuit, CircuitDag, StatevectorBackend};
use cutshot_cutter::{CutterError, Qpu, QpuDescriptor, QpuKind, QpuRegistry};
use cutshot_runtime::pipeline::{self, PipelineConfig, ReconstructionMode};
use cutshot_runtime::{ground_truth_vector, hellinger_distance, RuntimeError};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A registry of seeded simulators: (capacity, execution_time, queue_time)
fn seeded_registry(specs: &[(u64, u64, u64)], seed: u64) -> QpuRegistry {
    let qpus: Vec<Qpu> = specs
        .iter()
        .enumerate()
        .map(|(i, &(capacity, execution_time, queue_time))| {
            let descriptor = QpuDescriptor {
                kind: if queue_time == 0 {
                    QpuKind::Simulator
                } else {
                    QpuKind::Hardware
                },
                execution_time,
                queue_time,
                capacity,
                index: i,
            };
            Qpu::from_descriptor(&descriptor).with_backend(Arc::new(
                StatevectorBackend::with_seed(&format!("sim-{i}"), seed + i as u64),
            ))
        })
        .collect();
    QpuRegistry::new(qpus)
}

fn config(shots: u64, subcircuits: usize, alpha: f64, beta: f64) -> PipelineConfig {
    PipelineConfig {
        shots_per_subcircuit: shots,
        num_subcircuits: subcircuits,
        alpha,
        beta,
        mode: ReconstructionMode::FullDefinition,
        ..PipelineConfig::default()
    }
}

#[test]
fn single_qubit_hadamard_on_one_qpu() {
    let mut circuit = Circuit::new(1).h(0);
    circuit.measure_all();

    let qpus = seeded_registry(&[(10, 1, 0)], 17);
    let report = pipeline::run(&circuit, &qpus, &config(1024, 2, 0.5, 0.5)).unwrap();

    assert_eq!(report.plan.subcircuits.len(), 1);
    assert_eq!(report.plan.num_cuts, 0);
    assert_eq!(report.variant_count, 1);
    assert_eq!(report.plan.subcircuits[0].total_shots(), 1024);

    // ≈ {0: 0.5, 1: 0.5} within 3σ of the binomial
    assert_eq!(report.distribution.len(), 2);
    let sigma = (0.25f64 / 1024.0).sqrt();
    assert!((report.distribution[0] - 0.5).abs() < 3.0 * sigma + 1e-9);
    assert!((report.distribution[1] - 0.5).abs() < 3.0 * sigma + 1e-9);
}

#[test]
fn disjoint_bell_pairs_reconstruct_as_kronecker() {
    // Two independent H·CX pairs; no QPU fits the whole circuit (d = 6),
    // so the plan splits into the two components with zero cuts
    let circuit = Circuit::new(4).h(0).cx(0, 1).h(2).cx(2, 3);
    let qpus = seeded_registry(&[(3, 1, 0), (3, 1, 0)], 23);

    let report = pipeline::run(&circuit, &qpus, &config(4096, 2, 0.5, 0.5)).unwrap();

    assert_eq!(report.plan.num_cuts, 0);
    assert_eq!(report.plan.subcircuits.len(), 2);
    assert_eq!(report.variant_count, 2);
    assert_eq!(report.total_qubits, 4);
    for sub in &report.plan.subcircuits {
        assert_eq!(sub.total_shots(), 4096);
        assert!(sub.input_qubits <= 3);
    }

    // Distribution sums to one and matches an uncut reference run
    let sum: f64 = report.distribution.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);

    let reference = StatevectorBackend::with_seed("reference", 99);
    let truth = ground_truth_vector(&circuit, &reference, 8192).unwrap();
    let distance = hellinger_distance(&report.distribution, &truth);
    assert!(distance < 0.1, "Hellinger distance too large: {distance}");

    // Mass sits on the four correlated outcomes
    for index in [0b0000, 0b0011, 0b1100, 0b1111] {
        assert!(report.distribution[index] > 0.15);
    }
}

#[test]
fn dynamic_definition_matches_full_definition() {
    let circuit = Circuit::new(4).h(0).cx(0, 1).h(2).cx(2, 3);
    let qpus = seeded_registry(&[(3, 1, 0), (3, 1, 0)], 31);

    let mut fd_config = config(2048, 2, 0.5, 0.5);
    fd_config.mode = ReconstructionMode::FullDefinition;
    let fd = pipeline::run(&circuit, &seeded_registry(&[(3, 1, 0), (3, 1, 0)], 31), &fd_config)
        .unwrap();

    let mut dd_config = config(2048, 2, 0.5, 0.5);
    dd_config.mode = ReconstructionMode::DynamicDefinition;
    let dd = pipeline::run(&circuit, &qpus, &dd_config).unwrap();

    assert_eq!(fd.distribution.len(), dd.distribution.len());
    for (a, b) in fd.distribution.iter().zip(dd.distribution.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn forced_cut_produces_full_variant_family() {
    // Bridged Bell pairs: H(0) CX(0,1) H(2) CX(2,3) CX(1,2); the whole
    // circuit needs d = 8, so the plan must cut somewhere
    let circuit = Circuit::new(4).h(0).cx(0, 1).h(2).cx(2, 3).cx(1, 2);
    let qpus = seeded_registry(&[(4, 1, 0), (7, 1, 0)], 41);

    let report = pipeline::run(&circuit, &qpus, &config(512, 2, 0.5, 0.5)).unwrap();

    assert!(report.plan.num_cuts >= 1);
    assert_eq!(report.plan.subcircuits.len(), 2);

    // Variant family sizes follow 4^|Q_in| · 4^|Q_out| per subcircuit
    let dag = CircuitDag::from_circuit(&circuit);
    let shared_wires = |cuts: &[cutshot_cutter::CutEdge]| {
        cuts.iter()
            .flat_map(|cut| {
                let (src, tgt) = cut.edge;
                let src_wires: BTreeSet<usize> = dag.vertex(src).qubits.iter().copied().collect();
                dag.vertex(tgt)
                    .qubits
                    .iter()
                    .copied()
                    .filter(move |w| src_wires.contains(w))
                    .collect::<Vec<usize>>()
            })
            .collect::<BTreeSet<usize>>()
            .len() as u32
    };
    let expected: usize = report
        .plan
        .subcircuits
        .iter()
        .map(|sub| {
            let q_in = shared_wires(&sub.cuts.incoming);
            let q_out = shared_wires(&sub.cuts.outgoing);
            4usize.pow(q_in) * 4usize.pow(q_out)
        })
        .sum();
    assert_eq!(report.variant_count, expected);

    // Every record carries the payload of its role
    assert!(!report.records.is_empty());
    for record in &report.records {
        match record.role {
            cutshot_runtime::CutRole::Upstream => assert!(record.measurement_bases.is_some()),
            cutshot_runtime::CutRole::Downstream => assert!(record.init_states.is_some()),
        }
    }

    // The signed sum either normalises to one or cancels to the zero vector
    let sum: f64 = report.distribution.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9 || sum.abs() < 1e-9);
}

#[test]
fn infeasible_capacity_surfaces_sentinel() {
    let circuit = Circuit::new(2).cx(0, 1);
    let qpus = seeded_registry(&[(1, 1, 0), (1, 1, 0)], 7);

    let err = pipeline::run(&circuit, &qpus, &config(64, 2, 0.5, 0.5)).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Cutter(CutterError::Infeasible)
    ));
}

#[test]
fn invalid_weights_surface_config_error() {
    let mut circuit = Circuit::new(1).h(0);
    circuit.measure_all();
    let qpus = seeded_registry(&[(4, 1, 0)], 3);

    let err = pipeline::run(&circuit, &qpus, &config(64, 1, 0.9, 0.3)).unwrap_err();
    assert!(matches!(err, RuntimeError::Cutter(CutterError::Config(_))));
}
