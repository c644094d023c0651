//! Gate DAG extraction
//!
//! Flattens a circuit into the dependency graph the cutter consumes: each
//! operation becomes a vertex with a dense local index (program order, which
//! is already topological), weighted by the number of wires it touches.
//! Directed edges connect consecutive touches of the same wire; duplicates
//! across multi-wire gates are collapsed.

use crate::{Circuit, Operation};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

/// A vertex of the gate DAG
#[derive(Debug, Clone)]
pub struct DagVertex {
    /// Dense local index in [0, V)
    pub index: usize,
    /// Vertex weight: number of wires the operation touches
    pub weight: u64,
    /// The wires touched, in argument order
    pub qubits: Vec<usize>,
    /// The operation payload, carried through unchanged
    pub op: Operation,
}

/// The extracted gate DAG of a circuit
#[derive(Debug, Clone)]
pub struct CircuitDag {
    graph: DiGraph<usize, ()>,
    vertices: Vec<DagVertex>,
    edges: Vec<(usize, usize)>,
    num_wires: usize,
}

impl CircuitDag {
    /// Extract the DAG of a circuit
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut vertices = Vec::with_capacity(circuit.operations.len());
        let mut edge_set: BTreeSet<(usize, usize)> = BTreeSet::new();
        let mut last_touch: HashMap<usize, usize> = HashMap::new();

        for (index, op) in circuit.operations.iter().enumerate() {
            let qubits = op.qubits();
            for &wire in &qubits {
                if let Some(&prev) = last_touch.get(&wire) {
                    edge_set.insert((prev, index));
                }
                last_touch.insert(wire, index);
            }
            vertices.push(DagVertex {
                index,
                weight: qubits.len() as u64,
                qubits,
                op: op.clone(),
            });
        }

        let edges: Vec<(usize, usize)> = edge_set.into_iter().collect();

        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..vertices.len()).map(|i| graph.add_node(i)).collect();
        for &(u, v) in &edges {
            graph.add_edge(nodes[u], nodes[v], ());
        }

        Self {
            graph,
            vertices,
            edges,
            num_wires: circuit.num_qubits,
        }
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of wires in the source circuit
    pub fn num_wires(&self) -> usize {
        self.num_wires
    }

    /// All vertices in dense-index order
    pub fn vertices(&self) -> &[DagVertex] {
        &self.vertices
    }

    /// Vertex by local index
    pub fn vertex(&self, index: usize) -> &DagVertex {
        &self.vertices[index]
    }

    /// Vertex weights indexed by local index
    pub fn vertex_weights(&self) -> Vec<u64> {
        self.vertices.iter().map(|v| v.weight).collect()
    }

    /// Unique directed edges in local-index coordinates, sorted
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Vertex indices in a topological order
    ///
    /// Program order is topological by construction; this re-derives the
    /// order from the graph as a consistency check.
    pub fn topological_order(&self) -> Vec<usize> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n]).collect())
            .unwrap_or_else(|_| (0..self.vertices.len()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Circuit;

    #[test]
    fn test_bell_extraction() {
        let mut circuit = Circuit::bell_state();
        circuit.measure_all();
        let dag = CircuitDag::from_circuit(&circuit);

        // H, CX, M(0), M(1)
        assert_eq!(dag.num_vertices(), 4);
        assert_eq!(dag.vertex_weights(), vec![1, 2, 1, 1]);
        assert_eq!(dag.edges(), &[(0, 1), (1, 2), (1, 3)]);
    }

    #[test]
    fn test_duplicate_edges_collapsed() {
        // Two consecutive CX(0,1): both wires induce the same edge
        let circuit = Circuit::new(2).cx(0, 1).cx(0, 1);
        let dag = CircuitDag::from_circuit(&circuit);
        assert_eq!(dag.edges(), &[(0, 1)]);
    }

    #[test]
    fn test_disjoint_components_have_no_cross_edges() {
        let circuit = Circuit::new(4).h(0).cx(0, 1).h(2).cx(2, 3);
        let dag = CircuitDag::from_circuit(&circuit);
        assert_eq!(dag.edges(), &[(0, 1), (2, 3)]);
    }

    #[test]
    fn test_topological_order_matches_program_order() {
        let circuit = Circuit::new(3).h(0).cx(0, 1).cx(1, 2);
        let dag = CircuitDag::from_circuit(&circuit);
        let order = dag.topological_order();
        let mut position = vec![0usize; order.len()];
        for (pos, &v) in order.iter().enumerate() {
            position[v] = pos;
        }
        for &(u, v) in dag.edges() {
            assert!(position[u] < position[v]);
        }
    }

    #[test]
    fn test_no_edges_circuit() {
        let circuit = Circuit::new(2).h(0).h(1);
        let dag = CircuitDag::from_circuit(&circuit);
        assert!(dag.edges().is_empty());
        assert_eq!(dag.num_vertices(), 2);
    }
}
