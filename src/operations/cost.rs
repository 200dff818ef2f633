// src/operations/cost.rs

//! Quantum cost model for multi-controlled NOT networks.
//!
//! Costs follow the usual reversible-benchmark table, indexed by the number of
//! lines a gate touches (`k` = controls + 1):
//!
//! | k | cost | all controls negative |
//! |---|------|-----------------------|
//! | 1 | 1 | n/a |
//! | 3 | 5 | +1 |
//! | other | 2^k - 3 | +2 |
//!
//! A positive Toffoli sitting next to a positive CNOT between its two controls
//! forms a Peres gate, which costs 4 for the pair instead of 5 + 1.

use super::{Gate, GateKind};

/// Cost of a Toffoli/CNOT pair realizable as one Peres gate.
pub const PERES_PAIR_COST: u64 = 4;

/// Quantum cost of a single gate with `control_count` controls.
pub fn gate_cost(control_count: usize, all_negative: bool) -> u64 {
    let k = control_count + 1;
    match k {
        1 => 1,
        3 => 5 + u64::from(all_negative),
        _ => {
            let base = if k >= 64 { u64::MAX } else { (1u64 << k).saturating_sub(3) };
            base.saturating_add(if all_negative { 2 } else { 0 })
        }
    }
}

fn is_positive_toffoli(g: &Gate) -> bool {
    g.kind() == GateKind::Toffoli && g.controls().iter().all(|c| c.positive)
}

fn is_positive_cnot(g: &Gate) -> bool {
    g.kind() == GateKind::Cnot && g.controls()[0].positive
}

/// Whether `first` and `second` (adjacent, in either order) form a Peres pattern:
/// a positive Toffoli `T(a,b;c)` and a positive CNOT `T(a;b)` or `T(b;a)`.
pub fn is_peres_pair(first: &Gate, second: &Gate) -> bool {
    let (toffoli, cnot) = if is_positive_toffoli(first) && is_positive_cnot(second) {
        (first, second)
    } else if is_positive_cnot(first) && is_positive_toffoli(second) {
        (second, first)
    } else {
        return false;
    };
    let a = toffoli.controls()[0].line;
    let b = toffoli.controls()[1].line;
    let (cc, ct) = (cnot.controls()[0].line, cnot.target());
    (cc == a && ct == b) || (cc == b && ct == a)
}

/// CNOT count of a gate with `control_count` controls, `2c^2 - 2c + 1`
/// (a decomposition without ancillas). Saturates.
pub fn gate_cnot_cost(control_count: usize) -> u64 {
    let c = control_count as u64;
    c.saturating_mul(c)
        .saturating_mul(2)
        .saturating_sub(2 * c)
        .saturating_add(1)
}

/// Total CNOT count of a gate list. No pair discount applies.
pub fn sequence_cnot_cost(gates: &[Gate]) -> u64 {
    gates
        .iter()
        .fold(0u64, |acc, g| acc.saturating_add(gate_cnot_cost(g.control_count())))
}

/// Total cost of an ordered gate list.
///
/// Scans left to right and charges a Peres pair as one unit; each gate joins at
/// most one pair.
pub fn sequence_cost(gates: &[Gate]) -> u64 {
    let mut total = 0u64;
    let mut i = 0;
    while i < gates.len() {
        if i + 1 < gates.len() && is_peres_pair(&gates[i], &gates[i + 1]) {
            total = total.saturating_add(PERES_PAIR_COST);
            i += 2;
        } else {
            total = total.saturating_add(gates[i].quantum_cost());
            i += 1;
        }
    }
    total
}
