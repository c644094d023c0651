//! Quantum circuit construction over named registers
//!
//! A circuit is an ordered list of operations (gates, measurements,
//! barriers) over a flat qubit index space. Qubits are grouped into named
//! registers so that wire identities stay stable and sortable when circuits
//! are cut apart and reassembled.

use crate::{CircuitError, Gate, Result};
use serde::{Deserialize, Serialize};

/// A named quantum register occupying a contiguous block of wire indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterSpec {
    /// Register name
    pub name: String,
    /// Number of qubits in the register
    pub size: usize,
    /// Index of the register's first wire in the flat qubit space
    pub offset: usize,
}

/// A single operation in a quantum circuit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    /// A unitary gate applied to the listed qubits (first index is the
    /// most significant gate-matrix qubit)
    Gate { gate: Gate, qubits: Vec<usize> },
    /// Projective measurement of one qubit into one classical bit
    Measure { qubit: usize, clbit: usize },
    /// Scheduling barrier across the listed qubits
    Barrier { qubits: Vec<usize> },
}

impl Operation {
    /// Operation name ("measure", "barrier" or the gate name)
    pub fn name(&self) -> &str {
        match self {
            Operation::Gate { gate, .. } => &gate.name,
            Operation::Measure { .. } => "measure",
            Operation::Barrier { .. } => "barrier",
        }
    }

    /// The qubits the operation touches, in argument order
    pub fn qubits(&self) -> Vec<usize> {
        match self {
            Operation::Gate { qubits, .. } => qubits.clone(),
            Operation::Measure { qubit, .. } => vec![*qubit],
            Operation::Barrier { qubits } => qubits.clone(),
        }
    }

    /// True for measurement operations
    pub fn is_measure(&self) -> bool {
        matches!(self, Operation::Measure { .. })
    }

    /// True for barrier operations
    pub fn is_barrier(&self) -> bool {
        matches!(self, Operation::Barrier { .. })
    }
}

/// A quantum circuit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits
    pub num_qubits: usize,
    /// Number of classical bits
    pub num_clbits: usize,
    /// Quantum registers covering the qubit space
    pub registers: Vec<RegisterSpec>,
    /// Circuit operations in program order
    pub operations: Vec<Operation>,
    /// Circuit name
    pub name: String,
}

impl Circuit {
    /// Create a new circuit with n qubits in a single register `q`
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            num_clbits: num_qubits,
            registers: vec![RegisterSpec {
                name: String::from("q"),
                size: num_qubits,
                offset: 0,
            }],
            operations: Vec::new(),
            name: String::from("circuit"),
        }
    }

    /// Create a named circuit
    pub fn with_name(num_qubits: usize, name: &str) -> Self {
        let mut circuit = Self::new(num_qubits);
        circuit.name = name.to_string();
        circuit
    }

    /// Create a circuit from a list of (register name, size) pairs
    pub fn with_registers(name: &str, specs: &[(&str, usize)]) -> Self {
        let mut registers = Vec::with_capacity(specs.len());
        let mut offset = 0;
        for (reg_name, size) in specs {
            registers.push(RegisterSpec {
                name: reg_name.to_string(),
                size: *size,
                offset,
            });
            offset += size;
        }
        Self {
            num_qubits: offset,
            num_clbits: offset,
            registers,
            operations: Vec::new(),
            name: name.to_string(),
        }
    }

    /// Set the number of classical bits
    pub fn classical_bits(mut self, n: usize) -> Self {
        self.num_clbits = n;
        self
    }

    /// The (register name, in-register index) label of a wire
    pub fn wire_label(&self, qubit: usize) -> (&str, usize) {
        for reg in &self.registers {
            if qubit >= reg.offset && qubit < reg.offset + reg.size {
                return (&reg.name, qubit - reg.offset);
            }
        }
        ("q", qubit)
    }

    /// Get total operation count
    pub fn op_count(&self) -> usize {
        self.operations.len()
    }

    /// Count of gate operations (measurements and barriers excluded)
    pub fn gate_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Gate { .. }))
            .count()
    }

    /// True if the circuit contains at least one measurement
    pub fn has_measurements(&self) -> bool {
        self.operations.iter().any(|op| op.is_measure())
    }

    /// Get circuit depth (number of layers, barriers excluded)
    pub fn depth(&self) -> usize {
        if self.operations.is_empty() {
            return 0;
        }

        // Track when each qubit becomes free
        let mut qubit_layers = vec![0usize; self.num_qubits];

        for op in &self.operations {
            if op.is_barrier() {
                continue;
            }
            let qubits = op.qubits();
            let max_layer = qubits.iter().map(|&q| qubit_layers[q]).max().unwrap_or(0);
            for &q in &qubits {
                qubit_layers[q] = max_layer + 1;
            }
        }

        qubit_layers.into_iter().max().unwrap_or(0)
    }

    /// Add a gate to the circuit
    ///
    /// Rejects out-of-range wires and duplicate wire arguments.
    pub fn add_gate(&mut self, gate: Gate, qubits: Vec<usize>) -> Result<&mut Self> {
        if qubits.len() != gate.num_qubits {
            return Err(CircuitError::InvalidParameter(format!(
                "gate {} expects {} qubits, got {}",
                gate.name,
                gate.num_qubits,
                qubits.len()
            )));
        }
        for (i, &q) in qubits.iter().enumerate() {
            if q >= self.num_qubits {
                return Err(CircuitError::InvalidQubitIndex(q, self.num_qubits));
            }
            if qubits[..i].contains(&q) {
                return Err(CircuitError::DuplicateQubit {
                    gate: gate.name.clone(),
                    qubit: q,
                });
            }
        }
        self.operations.push(Operation::Gate { gate, qubits });
        Ok(self)
    }

    /// Add a measurement of `qubit` into `clbit`
    pub fn measure(&mut self, qubit: usize, clbit: usize) -> Result<&mut Self> {
        if qubit >= self.num_qubits {
            return Err(CircuitError::InvalidQubitIndex(qubit, self.num_qubits));
        }
        if clbit >= self.num_clbits {
            return Err(CircuitError::InvalidClassicalIndex(clbit, self.num_clbits));
        }
        self.operations.push(Operation::Measure { qubit, clbit });
        Ok(self)
    }

    /// Measure every qubit into the classical bit of the same index
    pub fn measure_all(&mut self) -> &mut Self {
        self.num_clbits = self.num_clbits.max(self.num_qubits);
        for q in 0..self.num_qubits {
            self.operations.push(Operation::Measure { qubit: q, clbit: q });
        }
        self
    }

    /// Add a barrier across the given qubits (all qubits when empty)
    pub fn barrier(&mut self, qubits: Vec<usize>) -> &mut Self {
        let qubits = if qubits.is_empty() {
            (0..self.num_qubits).collect()
        } else {
            qubits
        };
        self.operations.push(Operation::Barrier { qubits });
        self
    }

    // ==================== Single-Qubit Gates ====================

    /// Apply Identity gate
    pub fn id(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::identity(), vec![qubit]).ok();
        self
    }

    /// Apply Pauli-X gate
    pub fn x(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::x(), vec![qubit]).ok();
        self
    }

    /// Apply Pauli-Y gate
    pub fn y(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::y(), vec![qubit]).ok();
        self
    }

    /// Apply Pauli-Z gate
    pub fn z(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::z(), vec![qubit]).ok();
        self
    }

    /// Apply Hadamard gate
    pub fn h(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::h(), vec![qubit]).ok();
        self
    }

    /// Apply S gate
    pub fn s(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::s(), vec![qubit]).ok();
        self
    }

    /// Apply S† gate
    pub fn sdg(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::sdg(), vec![qubit]).ok();
        self
    }

    /// Apply T gate
    pub fn t(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::t(), vec![qubit]).ok();
        self
    }

    /// Apply T† gate
    pub fn tdg(mut self, qubit: usize) -> Self {
        self.add_gate(Gate::tdg(), vec![qubit]).ok();
        self
    }

    /// Apply Rx rotation
    pub fn rx(mut self, theta: f64, qubit: usize) -> Self {
        self.add_gate(Gate::rx(theta), vec![qubit]).ok();
        self
    }

    /// Apply Ry rotation
    pub fn ry(mut self, theta: f64, qubit: usize) -> Self {
        self.add_gate(Gate::ry(theta), vec![qubit]).ok();
        self
    }

    /// Apply Rz rotation
    pub fn rz(mut self, theta: f64, qubit: usize) -> Self {
        self.add_gate(Gate::rz(theta), vec![qubit]).ok();
        self
    }

    // ==================== Two-Qubit Gates ====================

    /// Apply CNOT gate
    pub fn cnot(mut self, control: usize, target: usize) -> Self {
        self.add_gate(Gate::cnot(), vec![control, target]).ok();
        self
    }

    /// Alias for CNOT
    pub fn cx(self, control: usize, target: usize) -> Self {
        self.cnot(control, target)
    }

    /// Apply CZ gate
    pub fn cz(mut self, qubit1: usize, qubit2: usize) -> Self {
        self.add_gate(Gate::cz(), vec![qubit1, qubit2]).ok();
        self
    }

    /// Apply CY gate
    pub fn cy(mut self, control: usize, target: usize) -> Self {
        self.add_gate(Gate::cy(), vec![control, target]).ok();
        self
    }

    /// Apply SWAP gate
    pub fn swap(mut self, qubit1: usize, qubit2: usize) -> Self {
        self.add_gate(Gate::swap(), vec![qubit1, qubit2]).ok();
        self
    }

    /// Apply controlled-phase gate
    pub fn cphase(mut self, theta: f64, qubit1: usize, qubit2: usize) -> Self {
        self.add_gate(Gate::cphase(theta), vec![qubit1, qubit2]).ok();
        self
    }

    /// Apply IsingZZ coupling gate
    pub fn rzz(mut self, theta: f64, qubit1: usize, qubit2: usize) -> Self {
        self.add_gate(Gate::rzz(theta), vec![qubit1, qubit2]).ok();
        self
    }

    // ==================== Three-Qubit Gates ====================

    /// Apply Toffoli gate
    pub fn toffoli(mut self, control1: usize, control2: usize, target: usize) -> Self {
        self.add_gate(Gate::toffoli(), vec![control1, control2, target])
            .ok();
        self
    }

    /// Alias for Toffoli
    pub fn ccx(self, control1: usize, control2: usize, target: usize) -> Self {
        self.toffoli(control1, control2, target)
    }

    // ==================== Multi-Qubit Operations ====================

    /// Apply Hadamard to all qubits
    pub fn h_all(mut self) -> Self {
        for q in 0..self.num_qubits {
            self = self.h(q);
        }
        self
    }

    /// Apply X to all qubits
    pub fn x_all(mut self) -> Self {
        for q in 0..self.num_qubits {
            self = self.x(q);
        }
        self
    }

    // ==================== Export ====================

    /// Convert to OpenQASM 2.0 text
    pub fn to_qasm(&self) -> String {
        let mut qasm = String::new();
        qasm.push_str("OPENQASM 2.0;\n");
        qasm.push_str("include \"qelib1.inc\";\n\n");
        for reg in &self.registers {
            qasm.push_str(&format!("qreg {}[{}];\n", reg.name, reg.size));
        }
        qasm.push_str(&format!("creg c[{}];\n\n", self.num_clbits));

        let fmt_wire = |q: usize| {
            let (name, idx) = self.wire_label(q);
            format!("{}[{}]", name, idx)
        };

        for op in &self.operations {
            match op {
                Operation::Gate { gate, qubits } => {
                    let args: Vec<String> = qubits.iter().map(|&q| fmt_wire(q)).collect();
                    match gate.parameter {
                        Some(p) => {
                            qasm.push_str(&format!("{}({}) {};\n", gate.name, p, args.join(", ")))
                        }
                        None => qasm.push_str(&format!("{} {};\n", gate.name, args.join(", "))),
                    }
                }
                Operation::Measure { qubit, clbit } => {
                    qasm.push_str(&format!("measure {} -> c[{}];\n", fmt_wire(*qubit), clbit));
                }
                Operation::Barrier { qubits } => {
                    let args: Vec<String> = qubits.iter().map(|&q| fmt_wire(q)).collect();
                    qasm.push_str(&format!("barrier {};\n", args.join(", ")));
                }
            }
        }

        qasm
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Circuit '{}' ({} qubits, depth {})",
            self.name,
            self.num_qubits,
            self.depth()
        )?;
        for (i, op) in self.operations.iter().enumerate() {
            writeln!(f, "  {}: {} on {:?}", i, op.name(), op.qubits())?;
        }
        Ok(())
    }
}

// ==================== Common Circuit Patterns ====================

impl Circuit {
    /// Create a Bell state circuit
    pub fn bell_state() -> Self {
        Circuit::with_name(2, "bell").h(0).cnot(0, 1)
    }

    /// Create a GHZ state circuit for n qubits
    pub fn ghz_state(n: usize) -> Self {
        let mut circuit = Circuit::with_name(n, "ghz").h(0);
        for i in 0..n - 1 {
            circuit = circuit.cnot(i, i + 1);
        }
        circuit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_creation() {
        let circuit = Circuit::new(3).h(0).cnot(0, 1).cnot(1, 2);

        assert_eq!(circuit.num_qubits, 3);
        assert_eq!(circuit.gate_count(), 3);
        assert!(!circuit.has_measurements());
    }

    #[test]
    fn test_circuit_depth() {
        let circuit = Circuit::new(2)
            .h(0)
            .h(1) // parallel with previous H
            .cnot(0, 1);

        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut circuit = Circuit::new(2);
        let err = circuit.add_gate(Gate::cnot(), vec![1, 1]).unwrap_err();
        assert!(matches!(err, CircuitError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_named_registers() {
        let circuit = Circuit::with_registers("adder", &[("a", 2), ("b", 2), ("c", 3)]);
        assert_eq!(circuit.num_qubits, 7);
        assert_eq!(circuit.wire_label(0), ("a", 0));
        assert_eq!(circuit.wire_label(3), ("b", 1));
        assert_eq!(circuit.wire_label(6), ("c", 2));
    }

    #[test]
    fn test_measure_all() {
        let mut circuit = Circuit::bell_state();
        circuit.measure_all();
        assert!(circuit.has_measurements());
        assert_eq!(circuit.op_count(), 4);
    }

    #[test]
    fn test_qasm_export() {
        let mut circuit = Circuit::bell_state();
        circuit.measure_all();
        let qasm = circuit.to_qasm();
        assert!(qasm.contains("OPENQASM 2.0;"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("cx q[0], q[1];"));
        assert!(qasm.contains("measure q[1] -> c[1];"));
    }

    #[test]
    fn test_ghz_state() {
        let circuit = Circuit::ghz_state(4);
        assert_eq!(circuit.num_qubits, 4);
        assert_eq!(circuit.gate_count(), 4); // 1 H + 3 CNOTs
    }
}
