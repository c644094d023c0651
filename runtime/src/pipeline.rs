//! End-to-end pipeline
//!
//! Wires the stages together: DAG extraction → MILP cut/schedule → variant
//! construction → dispatch → merge → reconstruction → flat records.

use crate::{
    build_variants_bounded, dd_reconstruct, dispatch, fd_reconstruct, format_records,
    merge_and_normalize, CutRecord, Result, RuntimeError,
};
use cutshot_circuits::{Circuit, CircuitDag};
use cutshot_cutter::{CutModel, CutPlan, QpuRegistry};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How the global distribution is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionMode {
    /// Dense Kronecker-product summation
    #[default]
    FullDefinition,
    /// Sparse per-index reconstruction
    DynamicDefinition,
}

/// Pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Shots assigned to each non-empty subcircuit
    pub shots_per_subcircuit: u64,
    /// Number of subcircuit slots offered to the MILP
    pub num_subcircuits: usize,
    /// Objective weight of the cut count
    pub alpha: f64,
    /// Objective weight of the makespan
    pub beta: f64,
    /// Reconstruction mode
    pub mode: ReconstructionMode,
    /// Worker bound for the variant constructor
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_max_workers() -> usize {
    crate::DEFAULT_MAX_WORKERS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            shots_per_subcircuit: 1024,
            num_subcircuits: 4,
            alpha: 0.5,
            beta: 0.5,
            mode: ReconstructionMode::FullDefinition,
            max_workers: crate::DEFAULT_MAX_WORKERS,
        }
    }
}

/// The pipeline's complete output
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The solved cut-and-shoot plan
    pub plan: CutPlan,
    /// The reconstructed global distribution over the concatenated
    /// subcircuit qubits (2^(Σ mᵢ) entries)
    pub distribution: Vec<f64>,
    /// Flat per-cut records
    pub records: Vec<CutRecord>,
    /// Number of constructed variants
    pub variant_count: usize,
    /// Σ mᵢ: qubits of the reconstructed space
    pub total_qubits: usize,
}

/// Run the full cut-and-shoot pipeline on one circuit
pub fn run(circuit: &Circuit, qpus: &QpuRegistry, config: &PipelineConfig) -> Result<PipelineReport> {
    let dag = CircuitDag::from_circuit(circuit);
    info!(
        vertices = dag.num_vertices(),
        edges = dag.edges().len(),
        "extracted circuit DAG"
    );

    let model = CutModel::from_dag(
        &dag,
        qpus,
        config.shots_per_subcircuit,
        config.num_subcircuits,
        config.alpha,
        config.beta,
    )?;
    let plan = model.solve()?;

    let variants = build_variants_bounded(&plan, circuit, &dag, config.max_workers)?;
    let variant_count = variants.len();
    info!(variant_count, num_cuts = plan.num_cuts, "constructed variants");

    let results = dispatch(&plan, &variants, qpus)?;
    let merged = merge_and_normalize(&results, &variants)?;
    if merged.is_empty() {
        return Err(RuntimeError::NoResults);
    }

    let base_coeff = plan.base_coefficient();
    let distribution = match config.mode {
        ReconstructionMode::FullDefinition => fd_reconstruct(&merged, base_coeff)?,
        ReconstructionMode::DynamicDefinition => dd_reconstruct(&merged, base_coeff)?,
    };
    let total_qubits = distribution.len().trailing_zeros() as usize;

    let records = format_records(&plan, &merged);

    Ok(PipelineReport {
        plan,
        distribution,
        records,
        variant_count,
        total_qubits,
    })
}
