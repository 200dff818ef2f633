// src/operations/mod.rs

//! Defines the reversible operations a circuit is made of.
//!
//! Every primitive is a multi-controlled NOT: a target line flipped when all of
//! its (line, polarity) controls are satisfied. NOT, CNOT and Toffoli are the
//! zero-, one- and two-control cases. Each primitive is its own inverse.

pub mod cost;

use crate::circuits::Circuit;
use crate::core::{LineId, RevError};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub use cost::{gate_cnot_cost, gate_cost, sequence_cnot_cost, sequence_cost, PERES_PAIR_COST};

/// One control of a gate: the line and whether it fires on 1 (positive) or 0 (negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Control {
    pub line: LineId,
    pub positive: bool,
}

impl Control {
    /// Control that fires when the line holds 1.
    pub fn pos(line: LineId) -> Self {
        Self { line, positive: true }
    }

    /// Control that fires when the line holds 0.
    pub fn neg(line: LineId) -> Self {
        Self { line, positive: false }
    }

    /// Control with polarity taken from a bit pattern (`true` = positive).
    pub fn with_polarity(line: LineId, positive: bool) -> Self {
        Self { line, positive }
    }

    pub fn is_satisfied(&self, bits: &[bool]) -> bool {
        bits[self.line.0] == self.positive
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.line, if self.positive { "" } else { "'" })
    }
}

/// Coarse classification of a gate by its number of controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    Not,
    Cnot,
    Toffoli,
    MultiControlled,
}

/// A multi-controlled NOT over flat line indices.
///
/// Controls are kept sorted by line, so two gates with the same control set
/// compare equal regardless of the order the controls were given in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gate {
    target: LineId,
    controls: Vec<Control>,
}

impl Gate {
    /// Builds a gate, rejecting repeated lines (a control on the target, or the
    /// same line controlled twice).
    pub fn new(target: LineId, mut controls: Vec<Control>) -> Result<Self, RevError> {
        controls.sort();
        let mut seen = HashSet::with_capacity(controls.len() + 1);
        seen.insert(target);
        for c in &controls {
            if !seen.insert(c.line) {
                return Err(RevError::invalid_gate(format!(
                    "line {} appears more than once in gate targeting {}",
                    c.line, target
                )));
            }
        }
        Ok(Self { target, controls })
    }

    /// Unconditional NOT.
    pub fn not(target: LineId) -> Self {
        Self { target, controls: Vec::new() }
    }

    /// Positively controlled NOT.
    pub fn cnot(control: LineId, target: LineId) -> Self {
        debug_assert_ne!(control, target, "CNOT control and target must differ");
        Self { target, controls: vec![Control::pos(control)] }
    }

    /// Doubly (positively) controlled NOT.
    pub fn toffoli(c1: LineId, c2: LineId, target: LineId) -> Self {
        debug_assert!(c1 != c2 && c1 != target && c2 != target, "Toffoli lines must be distinct");
        let mut controls = vec![Control::pos(c1), Control::pos(c2)];
        controls.sort();
        Self { target, controls }
    }

    pub fn target(&self) -> LineId {
        self.target
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    /// True when the gate has controls and all of them are negative.
    pub fn all_controls_negative(&self) -> bool {
        !self.controls.is_empty() && self.controls.iter().all(|c| !c.positive)
    }

    pub fn kind(&self) -> GateKind {
        match self.controls.len() {
            0 => GateKind::Not,
            1 => GateKind::Cnot,
            2 => GateKind::Toffoli,
            _ => GateKind::MultiControlled,
        }
    }

    /// Every line the gate touches, target first.
    pub fn lines(&self) -> Vec<LineId> {
        std::iter::once(self.target).chain(self.controls.iter().map(|c| c.line)).collect()
    }

    /// The same gate with every line `l` replaced by `map[l]`.
    /// `map` must be injective and cover every line of the gate.
    pub(crate) fn remap(&self, map: &[LineId]) -> Gate {
        let mut controls: Vec<Control> = self
            .controls
            .iter()
            .map(|c| Control { line: map[c.line.0], positive: c.positive })
            .collect();
        controls.sort();
        Gate { target: map[self.target.0], controls }
    }

    /// Whether all controls are satisfied by `bits`.
    pub fn is_active(&self, bits: &[bool]) -> bool {
        self.controls.iter().all(|c| c.is_satisfied(bits))
    }

    /// Applies the gate to a classical basis state.
    pub fn apply(&self, bits: &mut [bool]) {
        if self.is_active(bits) {
            bits[self.target.0] = !bits[self.target.0];
        }
    }

    /// Quantum cost of this gate alone.
    pub fn quantum_cost(&self) -> u64 {
        gate_cost(self.controls.len(), self.all_controls_negative())
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{} ", self.controls.len() + 1)?;
        for c in &self.controls {
            write!(f, "{},", c)?;
        }
        write!(f, "{}", self.target)
    }
}

/// One element of a circuit: either a primitive gate, or a whole sub-circuit
/// embedded through an explicit line map.
///
/// Embeddings are kept as they are and only expanded into primitives when a
/// flat gate list is requested, so deeply nested compositions stay cheap to
/// build and share (the sub-circuit sits behind an `Arc`).
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A single multi-controlled NOT.
    Primitive(Gate),

    /// A sub-circuit whose local line `i` is the parent's line `line_map[i]`.
    Embedding {
        circuit: Arc<Circuit>,
        line_map: Vec<LineId>,
        /// Run the sub-circuit backwards (its inverse).
        inverted: bool,
    },
}

impl Operation {
    /// Returns the parent lines this operation may touch.
    pub fn involved_lines(&self) -> Vec<LineId> {
        match self {
            Operation::Primitive(gate) => gate.lines(),
            Operation::Embedding { line_map, .. } => line_map.clone(),
        }
    }

    /// The operation undoing this one.
    pub fn inverse(&self) -> Operation {
        match self {
            Operation::Primitive(gate) => Operation::Primitive(gate.clone()),
            Operation::Embedding { circuit, line_map, inverted } => Operation::Embedding {
                circuit: Arc::clone(circuit),
                line_map: line_map.clone(),
                inverted: !inverted,
            },
        }
    }
}

impl From<Gate> for Operation {
    fn from(gate: Gate) -> Self {
        Operation::Primitive(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(i: usize) -> LineId {
        LineId(i)
    }

    #[test]
    fn test_gate_rejects_repeated_lines() {
        assert!(Gate::new(l(0), vec![Control::pos(l(0))]).is_err());
        assert!(Gate::new(l(2), vec![Control::pos(l(1)), Control::neg(l(1))]).is_err());
        assert!(Gate::new(l(2), vec![Control::pos(l(1)), Control::neg(l(0))]).is_ok());
    }

    #[test]
    fn test_controls_are_canonically_ordered() -> Result<(), RevError> {
        let g1 = Gate::new(l(3), vec![Control::pos(l(2)), Control::neg(l(0))])?;
        let g2 = Gate::new(l(3), vec![Control::neg(l(0)), Control::pos(l(2))])?;
        assert_eq!(g1, g2);
        assert_eq!(g1.to_string(), "T3 b0',b2,b3");
        Ok(())
    }

    #[test]
    fn test_gate_is_self_inverse() -> Result<(), RevError> {
        let gate = Gate::new(l(2), vec![Control::pos(l(0)), Control::neg(l(1))])?;
        for x in 0..8u8 {
            let mut bits: Vec<bool> = (0..3).map(|i| (x >> i) & 1 == 1).collect();
            let before = bits.clone();
            gate.apply(&mut bits);
            gate.apply(&mut bits);
            assert_eq!(bits, before);
        }
        Ok(())
    }

    #[test]
    fn test_negative_control_polarity() -> Result<(), RevError> {
        let gate = Gate::new(l(1), vec![Control::neg(l(0))])?;
        let mut bits = vec![false, false];
        gate.apply(&mut bits);
        assert_eq!(bits, vec![false, true]);
        let mut bits = vec![true, false];
        gate.apply(&mut bits);
        assert_eq!(bits, vec![true, false]);
        Ok(())
    }
}
