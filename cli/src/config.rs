//! JSON configuration records
//!
//! Two external records drive a run: the QAOA generator parameters and the
//! QPU fleet descriptors. Both are plain serde structs loaded from JSON
//! files; a built-in default fleet mirrors the usual five-QPU setup with
//! injected metrics.

use anyhow::{Context, Result};
use cutshot_cutter::{QpuDescriptor, QpuKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters of one generated QAOA-max-cut circuit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaoaConfig {
    /// Nodes per cluster
    pub n: usize,
    /// Number of clusters
    pub r: usize,
    /// Nodes per separator
    pub k: usize,
    /// QAOA layers
    pub layers: usize,
    /// RNG seed
    pub seed: Option<u64>,
}

/// Load a list of QAOA circuit configs from a JSON file
pub fn load_qaoa_configs(path: &Path) -> Result<Vec<QaoaConfig>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading circuit config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parsing circuit config {}", path.display()))
}

/// Load QPU descriptors from a JSON file
pub fn load_qpu_descriptors(path: &Path) -> Result<Vec<QpuDescriptor>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading QPU descriptors {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parsing QPU descriptors {}", path.display()))
}

/// The built-in five-QPU fleet: three simulators and two hardware entries
/// with injected scheduling metrics
pub fn default_fleet() -> Vec<QpuDescriptor> {
    vec![
        QpuDescriptor {
            kind: QpuKind::Simulator,
            execution_time: 10,
            queue_time: 0,
            capacity: 70,
            index: 0,
        },
        QpuDescriptor {
            kind: QpuKind::Simulator,
            execution_time: 12,
            queue_time: 0,
            capacity: 70,
            index: 1,
        },
        QpuDescriptor {
            kind: QpuKind::NoisyMixed,
            execution_time: 70,
            queue_time: 3,
            capacity: 70,
            index: 2,
        },
        QpuDescriptor {
            kind: QpuKind::Hardware,
            execution_time: 3,
            queue_time: 6,
            capacity: 50,
            index: 3,
        },
        QpuDescriptor {
            kind: QpuKind::Hardware,
            execution_time: 100,
            queue_time: 100,
            capacity: 100,
            index: 4,
        },
    ]
}
