//! Example circuit generators
//!
//! Small circuit families for exercising the pipeline: the two-Bell-pair
//! bridge circuit, Grover search, a ripple-carry adder over named registers
//! and QAOA max-cut circuits over clustered chain graphs.

use crate::config::QaoaConfig;
use anyhow::{bail, Result};
use cutshot_circuits::Circuit;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::f64::consts::PI;

/// Two Bell pairs bridged by a CX: the classic small cutting example
pub fn simple_circuit() -> Circuit {
    let mut circuit = Circuit::with_name(4, "simple")
        .h(0)
        .cx(0, 1)
        .h(2)
        .cx(2, 3)
        .cx(1, 2);
    circuit.measure_all();
    circuit
}

/// Measured Bell pair
pub fn bell_circuit() -> Circuit {
    let mut circuit = Circuit::bell_state();
    circuit.measure_all();
    circuit
}

/// Measured GHZ state on n qubits
pub fn ghz_circuit(n: usize) -> Circuit {
    let mut circuit = Circuit::ghz_state(n);
    circuit.measure_all();
    circuit
}

/// Phase flip on the all-ones state, the oracle and diffuser core
fn all_ones_phase_flip(circuit: Circuit) -> Circuit {
    let n = circuit.num_qubits;
    match n {
        1 => circuit.z(0),
        2 => circuit.cz(0, 1),
        // MCZ via H·CCX·H on the last qubit
        3 => circuit.h(2).ccx(0, 1, 2).h(2),
        _ => circuit,
    }
}

/// Grover search for the all-ones state (n ≤ 3)
pub fn grover_circuit(n: usize) -> Result<Circuit> {
    if n == 0 || n > 3 {
        bail!("grover generator supports 1 to 3 qubits, got {n}");
    }

    let mut circuit = Circuit::with_name(n, "grover").h_all();

    let iterations = (PI / 4.0 * ((1u64 << n) as f64).sqrt()).round().max(1.0) as usize;
    for _ in 0..iterations {
        // Oracle: phase flip on |1…1⟩
        circuit = all_ones_phase_flip(circuit);
        // Diffuser: reflect about the mean
        circuit = circuit.h_all().x_all();
        circuit = all_ones_phase_flip(circuit);
        circuit = circuit.x_all().h_all();
    }

    circuit.measure_all();
    Ok(circuit)
}

/// Ripple-carry adder over named registers a[n], b[n], c[n+1]
///
/// Measures a, b and the final carry into a (2n+1)-bit classical register.
pub fn ripple_carry_adder(n: usize) -> Result<Circuit> {
    if n == 0 {
        bail!("adder width must be positive");
    }

    let a = |i: usize| i;
    let b = |i: usize| n + i;
    let c = |i: usize| 2 * n + i;

    let mut circuit = Circuit::with_registers("rca", &[("a", n), ("b", n), ("c", n + 1)])
        .classical_bits(2 * n + 1);
    for i in 0..n {
        circuit = circuit
            .ccx(a(i), b(i), c(i + 1))
            .cx(a(i), b(i))
            .ccx(b(i), c(i), c(i + 1));
    }
    circuit = circuit.cx(c(n - 1), c(n));

    for i in 0..n {
        circuit.measure(a(i), i)?;
    }
    for i in 0..n {
        circuit.measure(b(i), n + i)?;
    }
    circuit.measure(c(n), 2 * n)?;

    Ok(circuit)
}

/// An undirected clustered chain graph: r Erdős–Rényi clusters of n nodes
/// joined through (r−1) separators of k nodes
struct ClusteredChainGraph {
    edges: BTreeSet<(usize, usize)>,
    clusters: Vec<Vec<usize>>,
    separators: Vec<Vec<usize>>,
    num_nodes: usize,
}

fn clustered_chain_graph(
    n: usize,
    r: usize,
    k: usize,
    q1: f64,
    q2: f64,
    rng: &mut StdRng,
) -> Result<ClusteredChainGraph> {
    if r == 0 {
        bail!("number of clusters must be greater than 0");
    }

    let clusters: Vec<Vec<usize>> = (0..r).map(|i| (i * n..(i + 1) * n).collect()).collect();
    let separator_base = r * n;
    let separators: Vec<Vec<usize>> = (0..r.saturating_sub(1))
        .map(|j| (separator_base + j * k..separator_base + (j + 1) * k).collect())
        .collect();
    let num_nodes = r * n + r.saturating_sub(1) * k;

    let mut edges = BTreeSet::new();

    // Erdős–Rényi edges inside each cluster
    for cluster in &clusters {
        for (i, &u) in cluster.iter().enumerate() {
            for &v in &cluster[i + 1..] {
                if rng.gen::<f64>() < q1 {
                    edges.insert((u, v));
                }
            }
        }
    }

    // Separator nodes bridge into both neighbouring clusters
    for (j, separator) in separators.iter().enumerate() {
        for &s in separator {
            for &c in clusters[j].iter().chain(clusters[j + 1].iter()) {
                if rng.gen::<f64>() < q2 {
                    edges.insert((c.min(s), c.max(s)));
                }
            }
        }
    }

    Ok(ClusteredChainGraph {
        edges,
        clusters,
        separators,
        num_nodes,
    })
}

/// QAOA-max-cut circuit over a clustered chain graph
pub fn qaoa_maxcut_circuit(config: &QaoaConfig) -> Result<Circuit> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let graph = clustered_chain_graph(config.n, config.r, config.k, 0.7, 0.3, &mut rng)?;

    // Fixed variational parameters per layer
    let params: [(f64, f64); 2] = [(0.1, 0.2), (0.3, 0.4)];

    let mut circuit = Circuit::with_name(graph.num_nodes, "qaoa-maxcut").h_all();

    for layer in 0..config.layers {
        let (gamma, beta) = params[layer % params.len()];

        // Cost layer cluster by cluster, including the adjacent separators
        for (i, cluster) in graph.clusters.iter().enumerate() {
            let mut nodes: BTreeSet<usize> = cluster.iter().copied().collect();
            if i > 0 {
                nodes.extend(&graph.separators[i - 1]);
            }
            if i < graph.separators.len() {
                nodes.extend(&graph.separators[i]);
            }
            for &(u, v) in &graph.edges {
                if nodes.contains(&u) && nodes.contains(&v) {
                    circuit = circuit.rzz(2.0 * gamma, u, v);
                }
            }
        }

        // Mixer layer
        for w in 0..graph.num_nodes {
            circuit = circuit.rx(2.0 * beta, w);
        }
    }

    circuit.measure_all();
    Ok(circuit)
}

/// Generate one circuit per config record
pub fn generate_from_configs(configs: &[QaoaConfig]) -> Result<Vec<Circuit>> {
    configs.iter().map(qaoa_maxcut_circuit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_circuit_shape() {
        let circuit = simple_circuit();
        assert_eq!(circuit.num_qubits, 4);
        assert_eq!(circuit.gate_count(), 5);
        assert!(circuit.has_measurements());
    }

    #[test]
    fn test_grover_two_qubits() {
        let circuit = grover_circuit(2).unwrap();
        assert_eq!(circuit.num_qubits, 2);
        assert!(circuit.has_measurements());
        assert!(grover_circuit(5).is_err());
    }

    #[test]
    fn test_rca_registers() {
        let circuit = ripple_carry_adder(2).unwrap();
        assert_eq!(circuit.num_qubits, 7); // a[2] + b[2] + c[3]
        assert_eq!(circuit.num_clbits, 5);
        assert_eq!(circuit.wire_label(0), ("a", 0));
        assert_eq!(circuit.wire_label(4), ("c", 0));
    }

    #[test]
    fn test_qaoa_deterministic_with_seed() {
        let config = QaoaConfig {
            n: 3,
            r: 2,
            k: 1,
            layers: 1,
            seed: Some(11),
        };
        let a = qaoa_maxcut_circuit(&config).unwrap();
        let b = qaoa_maxcut_circuit(&config).unwrap();
        assert_eq!(a.to_qasm(), b.to_qasm());
        assert_eq!(a.num_qubits, 7); // 2 clusters of 3 + 1 separator
    }
}
