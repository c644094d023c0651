//! Typed solver output
//!
//! The solver result is a plain data record per subcircuit instead of a
//! string-keyed map: vertex membership, the shot table, both cut directions
//! and the qubit accounting the MILP derived.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A cut edge, identified by a plan-wide cut id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutEdge {
    /// Plan-wide cut identifier (dense, deterministic edge order)
    pub id: usize,
    /// The cut DAG edge in local vertex indices (source, target)
    pub edge: (usize, usize),
}

/// The cuts touching one subcircuit, split by direction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CutSet {
    /// Cuts whose target vertex lies in this subcircuit
    pub incoming: Vec<CutEdge>,
    /// Cuts whose source vertex lies in this subcircuit
    pub outgoing: Vec<CutEdge>,
}

/// One subcircuit of the solved plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcircuitSolution {
    /// Subcircuit id (the MILP's subcircuit slot)
    pub id: usize,
    /// Assigned vertex indices, ascending
    pub vertices: Vec<usize>,
    /// Shot assignment: QPU index → shots
    pub shots: BTreeMap<usize, u64>,
    /// Cuts touching this subcircuit
    pub cuts: CutSet,
    /// a[c]: summed vertex weights
    pub gate_qubits: i64,
    /// p[c]: additional initialisation qubits (inbound cuts)
    pub init_qubits: i64,
    /// o[c]: qubits measured out at cuts (outbound cuts)
    pub measured_qubits: i64,
    /// d[c] = a + p: input qubits, the capacity the subcircuit needs
    pub input_qubits: i64,
    /// f[c] = a + p − o: contributing qubits
    pub contributing_qubits: i64,
}

impl SubcircuitSolution {
    /// Target vertices of the inbound cuts (the cut-in vertices)
    pub fn cut_in_vertices(&self) -> Vec<usize> {
        self.cuts.incoming.iter().map(|c| c.edge.1).collect()
    }

    /// Source vertices of the outbound cuts (the cut-out vertices)
    pub fn cut_out_vertices(&self) -> Vec<usize> {
        self.cuts.outgoing.iter().map(|c| c.edge.0).collect()
    }

    /// Total shots assigned across the fleet
    pub fn total_shots(&self) -> u64 {
        self.shots.values().sum()
    }
}

/// The solved cut-and-shoot plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutPlan {
    /// Non-empty subcircuits, ascending by id
    pub subcircuits: Vec<SubcircuitSolution>,
    /// Number of cut edges (endpoints in different subcircuits)
    pub num_cuts: usize,
    /// Solved makespan T
    pub makespan: f64,
    /// Objective value α·K/K_max + β·T/T_max
    pub objective: f64,
    /// Per-QPU busy time T_q (only QPUs with T_q > 0)
    pub qpu_times: BTreeMap<usize, f64>,
}

impl CutPlan {
    /// Look up a subcircuit by id
    pub fn subcircuit(&self, id: usize) -> Option<&SubcircuitSolution> {
        self.subcircuits.iter().find(|s| s.id == id)
    }

    /// The tomographic base coefficient 1/16^C for this plan
    pub fn base_coefficient(&self) -> f64 {
        1.0 / 16f64.powi(self.num_cuts as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_vertex_accessors() {
        let sub = SubcircuitSolution {
            id: 1,
            vertices: vec![2, 3],
            shots: BTreeMap::from([(0, 512), (1, 512)]),
            cuts: CutSet {
                incoming: vec![CutEdge { id: 0, edge: (1, 2) }],
                outgoing: vec![CutEdge { id: 1, edge: (3, 4) }],
            },
            gate_qubits: 3,
            init_qubits: 1,
            measured_qubits: 1,
            input_qubits: 4,
            contributing_qubits: 3,
        };
        assert_eq!(sub.cut_in_vertices(), vec![2]);
        assert_eq!(sub.cut_out_vertices(), vec![3]);
        assert_eq!(sub.total_shots(), 1024);
    }

    #[test]
    fn test_base_coefficient() {
        let plan = CutPlan {
            subcircuits: vec![],
            num_cuts: 2,
            makespan: 0.0,
            objective: 0.0,
            qpu_times: BTreeMap::new(),
        };
        assert!((plan.base_coefficient() - 1.0 / 256.0).abs() < 1e-15);
    }
}
