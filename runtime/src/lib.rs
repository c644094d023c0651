//! # Cutshot Runtime
//!
//! Everything downstream of the solved cut plan: variant construction,
//! dispatch to QPU backends, count merging, reconstruction of the global
//! distribution and the flat per-cut records.
//!
//! ## Pipeline
//!
//! - **constructor**: enumerates the `4^in × 4^out` variant family per
//!   subcircuit (task-parallel across subcircuits)
//! - **dispatcher**: groups variants by (QPU, shots) and collects raw counts
//! - **merge**: sums counts across QPUs and normalises to probabilities
//! - **reconstruct**: full-definition (Kronecker sum) or dynamic-definition
//!   (per-index) reassembly with signed tomographic coefficients
//! - **formatter**: flat (subcircuit, cut, role) records for post-analysis
//! - **pipeline**: the end-to-end wiring
//!
//! ## Example
//!
//! ```rust
//! use cutshot_circuits::Circuit;
//! use cutshot_cutter::{QpuDescriptor, QpuKind, QpuRegistry};
//! use cutshot_runtime::pipeline::{self, PipelineConfig};
//!
//! let mut circuit = Circuit::new(1).h(0);
//! circuit.measure_all();
//!
//! let qpus = QpuRegistry::from_descriptors(&[QpuDescriptor {
//!     kind: QpuKind::Simulator,
//!     execution_time: 1,
//!     queue_time: 0,
//!     capacity: 8,
//!     index: 0,
//! }]);
//!
//! let config = PipelineConfig {
//!     shots_per_subcircuit: 512,
//!     num_subcircuits: 1,
//!     ..PipelineConfig::default()
//! };
//! let report = pipeline::run(&circuit, &qpus, &config).unwrap();
//! assert_eq!(report.plan.num_cuts, 0);
//! ```

pub mod analysis;
pub mod constructor;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod merge;
pub mod pipeline;
pub mod reconstruct;
pub mod variant;

pub use analysis::{ground_truth_vector, hellinger_distance};
pub use constructor::{build_variants, build_variants_bounded, ConstructedVariants, DEFAULT_MAX_WORKERS};
pub use dispatcher::{dispatch, ExecutionRecord, QpuResults};
pub use error::{Result, RuntimeError};
pub use formatter::{format_records, CutRecord, CutRole};
pub use merge::{merge_and_normalize, VariantDistribution};
pub use pipeline::{PipelineConfig, PipelineReport, ReconstructionMode};
pub use reconstruct::{dd_reconstruct, effective_coefficient, fd_reconstruct, probability_vector};
pub use variant::{InitState, MeasBasis, Variant, VariantKey};

/// Module version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
