//! # Cutshot Cutter/Scheduler
//!
//! Joint circuit cutting and shot scheduling as a mixed-integer linear
//! program: gate vertices are assigned to subcircuits, edges crossing
//! subcircuit boundaries become cuts, and measurement shots are distributed
//! over a heterogeneous QPU fleet so that a weighted combination of cut
//! count and makespan is minimised.
//!
//! ## Components
//!
//! - **Qpu / QpuRegistry**: the fleet description (capacity, per-shot
//!   execution time, queue time, backend handle)
//! - **CutModel**: the MILP formulation and its black-box solve
//! - **CutPlan / SubcircuitSolution**: the typed solver output consumed by
//!   the variant constructor and the dispatcher
//!
//! ## Example
//!
//! ```rust
//! use cutshot_cutter::{CutModel, QpuDescriptor, QpuKind, QpuRegistry};
//!
//! let registry = QpuRegistry::from_descriptors(&[QpuDescriptor {
//!     kind: QpuKind::Simulator,
//!     execution_time: 1,
//!     queue_time: 0,
//!     capacity: 10,
//!     index: 0,
//! }]);
//!
//! // One H gate, no edges: a single subcircuit with every shot on QPU 0
//! let model = CutModel::new(vec![], vec![1], &registry, 1024, 2, 0.5, 0.5).unwrap();
//! let plan = model.solve().unwrap();
//! assert_eq!(plan.num_cuts, 0);
//! assert_eq!(plan.subcircuits.len(), 1);
//! ```

pub mod error;
pub mod model;
pub mod qpu;
pub mod solution;

pub use error::{CutterError, Result};
pub use model::CutModel;
pub use qpu::{Qpu, QpuDescriptor, QpuKind, QpuRegistry};
pub use solution::{CutEdge, CutPlan, CutSet, SubcircuitSolution};

/// Module version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
