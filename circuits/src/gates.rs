//! Quantum gates used by the cutting pipeline
//!
//! ## Single-qubit gates
//! - Pauli gates: X, Y, Z
//! - Hadamard: H
//! - Phase gates: S, S†, T, T†
//! - Rotation gates: Rx, Ry, Rz
//!
//! ## Two-qubit gates
//! - CNOT (CX), CY, CZ
//! - SWAP
//! - Controlled phase, IsingZZ
//!
//! ## Three-qubit gates
//! - Toffoli (CCX)

use crate::{Complex, FRAC_1_SQRT_2, I, ONE, ZERO};
use nalgebra::{DMatrix, Matrix2, Matrix4};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Gate type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateType {
    // Single-qubit gates
    Identity,
    PauliX,
    PauliY,
    PauliZ,
    Hadamard,
    Phase,    // S gate
    PhaseDag, // S†
    TGate,
    TGateDag, // T†

    // Parameterized single-qubit gates
    Rx,
    Ry,
    Rz,

    // Two-qubit gates
    CNOT,
    CZ,
    CY,
    SWAP,
    CPhase,
    IsingZZ,

    // Three-qubit gates
    Toffoli,

    // Custom gate
    Custom,
}

/// A quantum gate with its matrix representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    /// Gate type
    pub gate_type: GateType,
    /// Gate name
    pub name: String,
    /// Number of qubits the gate acts on
    pub num_qubits: usize,
    /// Optional parameter (for Rx, Ry, Rz, CPhase, IsingZZ)
    pub parameter: Option<f64>,
    /// Gate matrix (flattened, row-major)
    matrix_data: Vec<(f64, f64)>, // (re, im) pairs
    matrix_rows: usize,
}

impl Gate {
    /// Create a custom gate from a matrix
    pub fn custom(name: &str, matrix: DMatrix<Complex>) -> Self {
        let n = matrix.nrows();
        let num_qubits = (n as f64).log2() as usize;

        let matrix_data: Vec<(f64, f64)> = matrix.iter().map(|c| (c.re, c.im)).collect();

        Self {
            gate_type: GateType::Custom,
            name: name.to_string(),
            num_qubits,
            parameter: None,
            matrix_data,
            matrix_rows: n,
        }
    }

    fn from_matrix_2x2(gate_type: GateType, name: &str, m: Matrix2<Complex>) -> Self {
        // nalgebra stores column-major; flatten row-major for matrix()
        let matrix_data = vec![
            (m[(0, 0)].re, m[(0, 0)].im),
            (m[(0, 1)].re, m[(0, 1)].im),
            (m[(1, 0)].re, m[(1, 0)].im),
            (m[(1, 1)].re, m[(1, 1)].im),
        ];
        Self {
            gate_type,
            name: name.to_string(),
            num_qubits: 1,
            parameter: None,
            matrix_data,
            matrix_rows: 2,
        }
    }

    fn from_matrix_4x4(gate_type: GateType, name: &str, m: Matrix4<Complex>) -> Self {
        let mut matrix_data = Vec::with_capacity(16);
        for r in 0..4 {
            for c in 0..4 {
                matrix_data.push((m[(r, c)].re, m[(r, c)].im));
            }
        }
        Self {
            gate_type,
            name: name.to_string(),
            num_qubits: 2,
            parameter: None,
            matrix_data,
            matrix_rows: 4,
        }
    }

    /// Get the gate matrix
    pub fn matrix(&self) -> DMatrix<Complex> {
        let n = self.matrix_rows;
        let data: Vec<Complex> = self
            .matrix_data
            .iter()
            .map(|(re, im)| Complex::new(*re, *im))
            .collect();
        DMatrix::from_row_slice(n, n, &data)
    }

    /// Get the adjoint (conjugate transpose) of the gate
    pub fn adjoint(&self) -> Self {
        let m = self.matrix();
        let adj = m.adjoint();
        let mut matrix_data = Vec::with_capacity(self.matrix_data.len());
        for r in 0..self.matrix_rows {
            for c in 0..self.matrix_rows {
                matrix_data.push((adj[(r, c)].re, adj[(r, c)].im));
            }
        }

        Self {
            gate_type: self.gate_type,
            name: format!("{}†", self.name),
            num_qubits: self.num_qubits,
            parameter: self.parameter,
            matrix_data,
            matrix_rows: self.matrix_rows,
        }
    }

    /// Check if the gate is unitary
    pub fn is_unitary(&self) -> bool {
        let m = self.matrix();
        let product = &m * m.adjoint();
        let identity = DMatrix::identity(m.nrows(), m.ncols());

        (product - identity).norm() < 1e-10
    }

    // ==================== Single-Qubit Gates ====================

    /// Identity gate I
    pub fn identity() -> Self {
        Self::from_matrix_2x2(GateType::Identity, "id", Matrix2::identity())
    }

    /// Pauli-X gate (NOT gate, bit flip)
    /// |0⟩ ↔ |1⟩
    pub fn x() -> Self {
        Self::from_matrix_2x2(GateType::PauliX, "x", Matrix2::new(ZERO, ONE, ONE, ZERO))
    }

    /// Pauli-Y gate
    pub fn y() -> Self {
        Self::from_matrix_2x2(GateType::PauliY, "y", Matrix2::new(ZERO, -I, I, ZERO))
    }

    /// Pauli-Z gate (phase flip)
    /// |0⟩ → |0⟩, |1⟩ → -|1⟩
    pub fn z() -> Self {
        Self::from_matrix_2x2(GateType::PauliZ, "z", Matrix2::new(ONE, ZERO, ZERO, -ONE))
    }

    /// Hadamard gate
    /// Creates superposition: |0⟩ → |+⟩, |1⟩ → |−⟩
    pub fn h() -> Self {
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        Self::from_matrix_2x2(GateType::Hadamard, "h", Matrix2::new(h, h, h, -h))
    }

    /// S gate (phase gate, √Z)
    /// |0⟩ → |0⟩, |1⟩ → i|1⟩
    pub fn s() -> Self {
        Self::from_matrix_2x2(GateType::Phase, "s", Matrix2::new(ONE, ZERO, ZERO, I))
    }

    /// S† gate (inverse of S)
    pub fn sdg() -> Self {
        Self::from_matrix_2x2(GateType::PhaseDag, "sdg", Matrix2::new(ONE, ZERO, ZERO, -I))
    }

    /// T gate (π/8 gate, √S)
    pub fn t() -> Self {
        let t_phase = Complex::from_polar(1.0, PI / 4.0);
        Self::from_matrix_2x2(GateType::TGate, "t", Matrix2::new(ONE, ZERO, ZERO, t_phase))
    }

    /// T† gate (inverse of T)
    pub fn tdg() -> Self {
        let t_phase = Complex::from_polar(1.0, -PI / 4.0);
        Self::from_matrix_2x2(
            GateType::TGateDag,
            "tdg",
            Matrix2::new(ONE, ZERO, ZERO, t_phase),
        )
    }

    /// Rotation around X-axis: Rx(θ) = exp(-iθX/2)
    pub fn rx(theta: f64) -> Self {
        let cos = Complex::new((theta / 2.0).cos(), 0.0);
        let sin = Complex::new(0.0, -(theta / 2.0).sin());
        let mut gate = Self::from_matrix_2x2(GateType::Rx, "rx", Matrix2::new(cos, sin, sin, cos));
        gate.parameter = Some(theta);
        gate
    }

    /// Rotation around Y-axis: Ry(θ) = exp(-iθY/2)
    pub fn ry(theta: f64) -> Self {
        let cos = Complex::new((theta / 2.0).cos(), 0.0);
        let sin = Complex::new((theta / 2.0).sin(), 0.0);
        let mut gate = Self::from_matrix_2x2(GateType::Ry, "ry", Matrix2::new(cos, -sin, sin, cos));
        gate.parameter = Some(theta);
        gate
    }

    /// Rotation around Z-axis: Rz(θ) = exp(-iθZ/2)
    pub fn rz(theta: f64) -> Self {
        let neg_phase = Complex::from_polar(1.0, -theta / 2.0);
        let pos_phase = Complex::from_polar(1.0, theta / 2.0);
        let mut gate = Self::from_matrix_2x2(
            GateType::Rz,
            "rz",
            Matrix2::new(neg_phase, ZERO, ZERO, pos_phase),
        );
        gate.parameter = Some(theta);
        gate
    }

    // ==================== Two-Qubit Gates ====================

    /// CNOT gate (controlled-X, CX)
    /// |00⟩ → |00⟩, |01⟩ → |01⟩, |10⟩ → |11⟩, |11⟩ → |10⟩
    pub fn cnot() -> Self {
        Self::from_matrix_4x4(
            GateType::CNOT,
            "cx",
            Matrix4::new(
                ONE, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO,
                ONE, ZERO,
            ),
        )
    }

    /// CZ gate (controlled-Z)
    pub fn cz() -> Self {
        Self::from_matrix_4x4(
            GateType::CZ,
            "cz",
            Matrix4::new(
                ONE, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO,
                ZERO, -ONE,
            ),
        )
    }

    /// CY gate (controlled-Y)
    pub fn cy() -> Self {
        Self::from_matrix_4x4(
            GateType::CY,
            "cy",
            Matrix4::new(
                ONE, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ZERO, -I, ZERO, ZERO, I,
                ZERO,
            ),
        )
    }

    /// SWAP gate
    pub fn swap() -> Self {
        Self::from_matrix_4x4(
            GateType::SWAP,
            "swap",
            Matrix4::new(
                ONE, ZERO, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO,
                ZERO, ONE,
            ),
        )
    }

    /// Controlled-phase gate: diag(1, 1, 1, e^{iθ})
    pub fn cphase(theta: f64) -> Self {
        let phase = Complex::from_polar(1.0, theta);
        let mut gate = Self::from_matrix_4x4(
            GateType::CPhase,
            "cp",
            Matrix4::new(
                ONE, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO,
                ZERO, phase,
            ),
        );
        gate.parameter = Some(theta);
        gate
    }

    /// IsingZZ coupling gate: Rzz(θ) = exp(-iθ ZZ/2)
    pub fn rzz(theta: f64) -> Self {
        let neg = Complex::from_polar(1.0, -theta / 2.0);
        let pos = Complex::from_polar(1.0, theta / 2.0);
        let mut gate = Self::from_matrix_4x4(
            GateType::IsingZZ,
            "rzz",
            Matrix4::new(
                neg, ZERO, ZERO, ZERO, ZERO, pos, ZERO, ZERO, ZERO, ZERO, pos, ZERO, ZERO, ZERO,
                ZERO, neg,
            ),
        );
        gate.parameter = Some(theta);
        gate
    }

    // ==================== Three-Qubit Gates ====================

    /// Toffoli gate (CCX): flips the target when both controls are |1⟩
    pub fn toffoli() -> Self {
        let mut m = DMatrix::from_element(8, 8, ZERO);
        for i in 0..6 {
            m[(i, i)] = ONE;
        }
        m[(6, 7)] = ONE;
        m[(7, 6)] = ONE;

        let matrix_data: Vec<(f64, f64)> = (0..8)
            .flat_map(|r| (0..8).map(move |c| (r, c)))
            .map(|(r, c)| (m[(r, c)].re, m[(r, c)].im))
            .collect();

        Self {
            gate_type: GateType::Toffoli,
            name: "ccx".to_string(),
            num_qubits: 3,
            parameter: None,
            matrix_data,
            matrix_rows: 8,
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.parameter {
            Some(p) => write!(f, "{}({:.4})", self.name, p),
            None => write!(f, "{}", self.name),
        }
    }
}
