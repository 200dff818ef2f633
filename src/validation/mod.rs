// src/validation/mod.rs

//! Classical checks of what a circuit computes.
//!
//! Every gate maps basis states to basis states, so running the flattened gate
//! list over a bit vector tells exactly what the network does to that input.
//! These helpers back the test-suite and the synthesizer's self-check.

use crate::circuits::Circuit;
use crate::core::{BitState, LineId, RevError};
use crate::operations::Gate;
use crate::synthesis::TruthTable;

/// Applies `gates` in order to `state`.
pub fn run(gates: &[Gate], state: &mut BitState) {
    let bits = state.bits_mut();
    for gate in gates {
        gate.apply(bits);
    }
}

/// A circuit flattened once, for evaluating many inputs.
pub struct Evaluator<'a> {
    circuit: &'a Circuit,
    gates: Vec<Gate>,
}

impl<'a> Evaluator<'a> {
    pub fn new(circuit: &'a Circuit) -> Self {
        Self { circuit, gates: circuit.flatten() }
    }

    /// Runs the circuit on the state holding `inputs` (register name, value);
    /// every other line starts at 0.
    pub fn run(&self, inputs: &[(&str, u64)]) -> Result<BitState, RevError> {
        let mut state = BitState::zeros(self.circuit.num_lines());
        for (name, value) in inputs {
            let reg = self.circuit.register(name)?;
            if reg.width() < 64 && value >> reg.width() != 0 {
                return Err(RevError::parameter(format!(
                    "input {} does not fit register {}",
                    value, reg
                )));
            }
            state.write_register(reg, *value);
        }
        self.run_state(&mut state);
        Ok(state)
    }

    /// Runs the circuit on an explicit state.
    pub fn run_state(&self, state: &mut BitState) {
        run(&self.gates, state);
    }
}

/// Runs `circuit` once on `inputs`; see `Evaluator::run`.
pub fn evaluate(circuit: &Circuit, inputs: &[(&str, u64)]) -> Result<BitState, RevError> {
    Evaluator::new(circuit).run(inputs)
}

/// Checks that every ancilla register of `circuit` is 0 in `state`.
pub fn check_ancillas_clean(circuit: &Circuit, state: &BitState) -> Result<(), RevError> {
    for reg in circuit.registers().iter().filter(|r| r.is_ancilla()) {
        let dirty: Vec<String> = reg
            .lines()
            .into_iter()
            .filter(|&l| state.get(l))
            .map(|l| circuit.line_name(l))
            .collect();
        if !dirty.is_empty() {
            return Err(RevError::validation(format!(
                "ancilla register {} left with {} set by '{}'",
                reg,
                dirty.join(","),
                circuit.name()
            )));
        }
    }
    Ok(())
}

/// Checks that `circuit` computes `target ^= table(inputs)` on every assignment
/// and leaves every other line unchanged.
pub fn check_truth_table(circuit: &Circuit, inputs: &[LineId], target: LineId, table: &TruthTable) -> Result<(), RevError> {
    if inputs.len() != table.num_inputs() {
        return Err(RevError::validation(format!(
            "table has {} inputs, {} lines given",
            table.num_inputs(),
            inputs.len()
        )));
    }
    let gates = circuit.flatten();
    for (assignment, &expected) in table.bits().iter().enumerate() {
        let mut state = BitState::zeros(circuit.num_lines());
        state.write(inputs, assignment as u64);
        let before = state.clone();
        run(&gates, &mut state);
        if state.get(target) != expected {
            return Err(RevError::validation(format!(
                "'{}' gives {} on input {}, table says {}",
                circuit.name(),
                state.get(target),
                assignment,
                expected
            )));
        }
        state.set(target, before.get(target));
        if state != before {
            return Err(RevError::validation(format!(
                "'{}' disturbs non-target lines on input {}",
                circuit.name(),
                assignment
            )));
        }
    }
    Ok(())
}
