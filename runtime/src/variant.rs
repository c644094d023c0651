//! Variant identity and metadata
//!
//! A variant is one concrete realisation of a subcircuit: one choice of
//! initialisation state per cut-in wire and one measurement basis per
//! cut-out wire. Identity is the structured [`VariantKey`]; the rendered
//! name is display-only and is never parsed back.

use cutshot_circuits::{Circuit, Complex, Gate, FRAC_1_SQRT_2, I, ONE, ZERO};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Initialisation state of a cut-in wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitState {
    /// |0⟩ → (1, 0)
    Zero,
    /// |1⟩ → (0, 1)
    One,
    /// |+⟩ → (1, 1)/√2
    Plus,
    /// |i⟩ → (1, i)/√2
    PlusI,
}

impl InitState {
    /// Enumeration order used by the constructor
    pub const ALL: [InitState; 4] = [
        InitState::Zero,
        InitState::One,
        InitState::Plus,
        InitState::PlusI,
    ];

    /// The rendered symbol of the state
    pub fn symbol(&self) -> &'static str {
        match self {
            InitState::Zero => "|0>",
            InitState::One => "|1>",
            InitState::Plus => "|+>",
            InitState::PlusI => "|i>",
        }
    }

    /// The amplitude pair of the state
    pub fn amplitudes(&self) -> [Complex; 2] {
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        match self {
            InitState::Zero => [ONE, ZERO],
            InitState::One => [ZERO, ONE],
            InitState::Plus => [h, h],
            InitState::PlusI => [h, I * h],
        }
    }

    /// Gates preparing the state from |0⟩
    pub fn preparation_gates(&self) -> Vec<Gate> {
        match self {
            InitState::Zero => vec![],
            InitState::One => vec![Gate::x()],
            InitState::Plus => vec![Gate::h()],
            // S·H|0⟩ = (|0⟩ + i|1⟩)/√2
            InitState::PlusI => vec![Gate::h(), Gate::s()],
        }
    }
}

impl fmt::Display for InitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Measurement basis of a cut-out wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasBasis {
    I,
    X,
    Y,
    Z,
}

impl MeasBasis {
    /// Enumeration order used by the constructor
    pub const ALL: [MeasBasis; 4] = [MeasBasis::I, MeasBasis::X, MeasBasis::Y, MeasBasis::Z];

    /// The rendered letter of the basis
    pub fn letter(&self) -> &'static str {
        match self {
            MeasBasis::I => "I",
            MeasBasis::X => "X",
            MeasBasis::Y => "Y",
            MeasBasis::Z => "Z",
        }
    }

    /// True for the bases that flip the tomographic coefficient sign
    pub fn is_signed(&self) -> bool {
        matches!(self, MeasBasis::X | MeasBasis::Y)
    }

    /// The basis-change gates appended before measurement:
    /// X → H, Y → S†·H, Z/I → identity
    pub fn rotation_gates(&self) -> Vec<Gate> {
        match self {
            MeasBasis::I | MeasBasis::Z => vec![],
            MeasBasis::X => vec![Gate::h()],
            MeasBasis::Y => vec![Gate::sdg(), Gate::h()],
        }
    }
}

impl fmt::Display for MeasBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Structured variant identity: (subcircuit id, input combo, output combo)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    /// The owning subcircuit
    pub sub_id: usize,
    /// Per cut-in wire (global index, init state), in layout order
    pub inputs: Vec<(usize, InitState)>,
    /// Per cut-out wire (global index, basis), in layout order
    pub outputs: Vec<(usize, MeasBasis)>,
}

impl fmt::Display for VariantKey {
    /// `sub_{c}_in_q{i}-{sym}[_q{j}-{sym}]*_out_q{k}-{basis}[_q{l}-{basis}]*`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs = self
            .inputs
            .iter()
            .map(|(wire, state)| format!("q{}-{}", wire, state))
            .collect::<Vec<_>>()
            .join("_");
        let outputs = self
            .outputs
            .iter()
            .map(|(wire, basis)| format!("q{}-{}", wire, basis))
            .collect::<Vec<_>>()
            .join("_");
        write!(f, "sub_{}_in_{}_out_{}", self.sub_id, inputs, outputs)
    }
}

/// One concrete circuit realisation of a subcircuit
#[derive(Debug, Clone)]
pub struct Variant {
    /// Structured identity
    pub key: VariantKey,
    /// The built circuit (no measurement operations; the dispatcher appends
    /// a full measurement layer)
    pub circuit: Circuit,
    /// Local qubit indices in use (0..m)
    pub active_qubits: Vec<usize>,
    /// local qubit → initialisation state, for cut-in wires
    pub initialized_info: BTreeMap<usize, InitState>,
    /// local qubit → measurement basis, for cut-out wires
    pub measured_info: BTreeMap<usize, MeasBasis>,
    /// local qubit → global wire
    pub qbit_map: BTreeMap<usize, usize>,
    /// Shots the owning subcircuit receives in total
    pub shots: u64,
}

impl Variant {
    /// The owning subcircuit id
    pub fn sub_id(&self) -> usize {
        self.key.sub_id
    }

    /// The deterministic variant name
    pub fn name(&self) -> String {
        self.key.to_string()
    }

    /// Number of local qubits
    pub fn num_qubits(&self) -> usize {
        self.active_qubits.len()
    }
}
