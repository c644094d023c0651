//! QPU registry
//!
//! Each QPU carries the scheduling metrics the MILP consumes (capacity,
//! per-shot execution time, fixed queue/setup time) and the backend handle
//! the dispatcher submits jobs to. Metrics can be overridden after
//! construction, which is how simulated metrics are injected for hardware
//! entries.

use cutshot_circuits::{ExecutionBackend, NoiseModel, StatevectorBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The kind of processor behind a QPU entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QpuKind {
    /// Clean state-vector simulator
    Simulator,
    /// Hardware device (simulated here; queue time applies)
    Hardware,
    /// Simulator with a stochastic depolarising channel
    NoisyMixed,
}

/// JSON descriptor for one QPU (see the external-interface contract)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpuDescriptor {
    /// Backend kind selector
    pub kind: QpuKind,
    /// Per-shot execution time (integer ticks)
    pub execution_time: u64,
    /// Fixed setup cost, charged only if the QPU is used
    pub queue_time: u64,
    /// Maximum qubits
    pub capacity: u64,
    /// Stable index used in shot assignments
    pub index: usize,
}

/// A quantum processing unit
#[derive(Clone)]
pub struct Qpu {
    /// Stable index
    pub index: usize,
    /// Processor kind
    pub kind: QpuKind,
    /// Maximum qubits
    pub capacity: u64,
    /// Per-shot execution time
    pub execution_time: u64,
    /// Fixed setup cost, charged only if used
    pub queue_time: u64,
    backend: Arc<dyn ExecutionBackend>,
}

impl Qpu {
    /// Create a QPU from its descriptor, building the matching backend
    pub fn from_descriptor(desc: &QpuDescriptor) -> Self {
        let name = format!("qpu-{}", desc.index);
        let backend: Arc<dyn ExecutionBackend> = match desc.kind {
            QpuKind::Simulator | QpuKind::Hardware => Arc::new(StatevectorBackend::new(&name)),
            QpuKind::NoisyMixed => {
                Arc::new(StatevectorBackend::new(&name).with_noise(NoiseModel::default()))
            }
        };
        // Simulators have no queue
        let queue_time = match desc.kind {
            QpuKind::Simulator => 0,
            _ => desc.queue_time,
        };
        Self {
            index: desc.index,
            kind: desc.kind,
            capacity: desc.capacity,
            execution_time: desc.execution_time,
            queue_time,
            backend,
        }
    }

    /// Replace the backend handle (used by tests for seeded runs)
    pub fn with_backend(mut self, backend: Arc<dyn ExecutionBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Override scheduling metrics (injects simulated metrics for hardware)
    pub fn update_metrics(&mut self, execution_time: u64, queue_time: u64, capacity: u64) {
        self.execution_time = execution_time;
        self.queue_time = queue_time;
        self.capacity = capacity;
    }

    /// The backend handle jobs are submitted to
    pub fn backend(&self) -> &Arc<dyn ExecutionBackend> {
        &self.backend
    }
}

impl std::fmt::Debug for Qpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Qpu")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("capacity", &self.capacity)
            .field("execution_time", &self.execution_time)
            .field("queue_time", &self.queue_time)
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// The QPU fleet the scheduler distributes shots over
#[derive(Debug, Clone, Default)]
pub struct QpuRegistry {
    qpus: Vec<Qpu>,
}

impl QpuRegistry {
    /// Build a registry from QPU values
    pub fn new(qpus: Vec<Qpu>) -> Self {
        Self { qpus }
    }

    /// Build a registry from JSON descriptors
    pub fn from_descriptors(descriptors: &[QpuDescriptor]) -> Self {
        Self {
            qpus: descriptors.iter().map(Qpu::from_descriptor).collect(),
        }
    }

    /// Number of QPUs
    pub fn len(&self) -> usize {
        self.qpus.len()
    }

    /// True when the fleet is empty
    pub fn is_empty(&self) -> bool {
        self.qpus.is_empty()
    }

    /// QPUs in registry order
    pub fn as_slice(&self) -> &[Qpu] {
        &self.qpus
    }

    /// Iterate the fleet
    pub fn iter(&self) -> std::slice::Iter<'_, Qpu> {
        self.qpus.iter()
    }

    /// Look up a QPU by its stable index
    pub fn get_by_index(&self, index: usize) -> Option<&Qpu> {
        self.qpus.iter().find(|q| q.index == index)
    }
}
