//! Flat per-cut records
//!
//! One record per (variant, cut): upstream records for out-cuts carry the
//! measurement bases, downstream records for in-cuts carry the init states.
//! Each record keeps the variant's probability table and the local→global
//! qubit mapping a downstream consumer needs to project the distribution.

use crate::{InitState, MeasBasis, VariantDistribution};
use cutshot_cutter::CutPlan;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The side of the cut a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutRole {
    /// The subcircuit owning the cut's source vertex (measured side)
    Upstream,
    /// The subcircuit owning the cut's target vertex (initialised side)
    Downstream,
}

/// One flat record for post-analysis
#[derive(Debug, Clone, Serialize)]
pub struct CutRecord {
    /// The owning subcircuit
    pub subcircuit_id: usize,
    /// Plan-wide cut identifier
    pub cut_id: usize,
    /// The cut DAG edge (source vertex, target vertex)
    pub edge: (usize, usize),
    /// Which side of the cut this record describes
    pub role: CutRole,
    /// The variant the distribution belongs to
    pub variant: String,
    /// local qubit → basis (upstream records only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_bases: Option<BTreeMap<usize, MeasBasis>>,
    /// local qubit → init state (downstream records only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_states: Option<BTreeMap<usize, InitState>>,
    /// bitstring → probability
    pub output_distribution: BTreeMap<String, f64>,
    /// local qubit → global qubit
    pub bitstring_mapping: BTreeMap<usize, usize>,
}

/// Produce the flat record list for every (variant, cut) pair
pub fn format_records(
    plan: &CutPlan,
    distributions: &BTreeMap<String, VariantDistribution>,
) -> Vec<CutRecord> {
    let mut records = Vec::new();

    for (name, dist) in distributions {
        let Some(sub) = plan.subcircuit(dist.sub_id) else {
            continue;
        };

        for cut in &sub.cuts.outgoing {
            records.push(CutRecord {
                subcircuit_id: sub.id,
                cut_id: cut.id,
                edge: cut.edge,
                role: CutRole::Upstream,
                variant: name.clone(),
                measurement_bases: Some(dist.measured_info.clone()),
                init_states: None,
                output_distribution: dist.probabilities.clone(),
                bitstring_mapping: dist.qbit_map.clone(),
            });
        }

        for cut in &sub.cuts.incoming {
            records.push(CutRecord {
                subcircuit_id: sub.id,
                cut_id: cut.id,
                edge: cut.edge,
                role: CutRole::Downstream,
                variant: name.clone(),
                measurement_bases: None,
                init_states: Some(dist.initialized_info.clone()),
                output_distribution: dist.probabilities.clone(),
                bitstring_mapping: dist.qbit_map.clone(),
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutshot_cutter::{CutEdge, CutSet, SubcircuitSolution};
    use std::collections::BTreeMap as Map;

    fn plan_with_one_cut() -> CutPlan {
        let cut = CutEdge { id: 0, edge: (0, 1) };
        CutPlan {
            subcircuits: vec![
                SubcircuitSolution {
                    id: 0,
                    vertices: vec![0],
                    shots: Map::from([(0, 64)]),
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
                    shots: Map::from([(0, 64)]),
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
        }
    }

    fn distribution(sub_id: usize, with_basis: bool) -> VariantDistribution {
        VariantDistribution {
            sub_id,
            probabilities: Map::from([("0".to_string(), 1.0)]),
            total_shots: 64,
            active_qubits: vec![0],
            initialized_info: if with_basis {
                Map::new()
            } else {
                Map::from([(0, InitState::Plus)])
            },
            measured_info: if with_basis {
                Map::from([(0, MeasBasis::X)])
            } else {
                Map::new()
            },
            qbit_map: Map::from([(0, 0)]),
        }
    }

    #[test]
    fn test_roles_and_payloads() {
        let plan = plan_with_one_cut();
        let distributions = Map::from([
            ("sub_0_in__out_q0-X".to_string(), distribution(0, true)),
            ("sub_1_in_q0-|+>_out_".to_string(), distribution(1, false)),
        ]);

        let records = format_records(&plan, &distributions);
        assert_eq!(records.len(), 2);

        let upstream = records
            .iter()
            .find(|r| r.role == CutRole::Upstream)
            .unwrap();
        assert_eq!(upstream.subcircuit_id, 0);
        assert_eq!(upstream.edge, (0, 1));
        assert!(upstream.measurement_bases.is_some());
        assert!(upstream.init_states.is_none());

        let downstream = records
            .iter()
            .find(|r| r.role == CutRole::Downstream)
            .unwrap();
        assert_eq!(downstream.subcircuit_id, 1);
        assert_eq!(downstream.cut_id, 0);
        assert!(downstream.init_states.is_some());
    }

    #[test]
    fn test_record_serialises_without_empty_fields() {
        let plan = plan_with_one_cut();
        let distributions = Map::from([("sub_0_in__out_q0-X".to_string(), distribution(0, true))]);
        let records = format_records(&plan, &distributions);
        let json = serde_json::to_string(&records[0]).unwrap();
        assert!(json.contains("\"role\":\"upstream\""));
        assert!(json.contains("\"measurement_bases\""));
        assert!(!json.contains("init_states"));
    }
}
