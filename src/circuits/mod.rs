// src/circuits/mod.rs

//! Defines structures for representing and building reversible circuits.
//!
//! A `Circuit` is an ordered list of `Operation`s over a fixed, flat line space
//! split into named registers. Circuits are immutable once built: every algebra
//! operation (`append`, `sequence`, `embed`, `invert`) returns a new value.

pub mod tfc;

use crate::core::{LineId, Register, RegisterRole, RevError};
use crate::operations::{sequence_cnot_cost, sequence_cost, Control, Gate, Operation};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

const INVERSE_SUFFIX: &str = "^-1";

/// An ordered sequence of operations over a declared set of lines.
///
/// Data registers come first and ancilla registers last, so the ancilla lines of
/// any circuit form one contiguous block at the end of its line space.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    /// Identifier used in diagrams, logs and the TFC header.
    name: String,

    /// Non-overlapping registers, in declaration order.
    registers: Vec<Register>,

    /// Total number of lines; every line belongs to exactly one register.
    num_lines: usize,

    /// The ordered operations; program order is the semantics.
    operations: Vec<Operation>,
}

impl Circuit {
    /// A circuit with no gates over `line_count` lines, grouped in one data register `v`.
    pub fn empty(line_count: usize) -> Self {
        let registers = if line_count == 0 {
            Vec::new()
        } else {
            vec![Register::new("v", 0, line_count, RegisterRole::Data)]
        };
        Self { name: "empty".to_string(), registers, num_lines: line_count, operations: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Looks up a register by name.
    pub fn register(&self, name: &str) -> Result<&Register, RevError> {
        self.registers
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| RevError::composition(format!("circuit '{}' has no register named '{}'", self.name, name)))
    }

    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// Returns a slice containing the ordered operations of this circuit.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of top-level operations (embeddings count once).
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Lines of every data register, in declaration order.
    pub fn data_lines(&self) -> Vec<LineId> {
        self.registers.iter().filter(|r| !r.is_ancilla()).flat_map(|r| r.lines()).collect()
    }

    /// Lines of every ancilla register, in declaration order.
    pub fn ancilla_lines(&self) -> Vec<LineId> {
        self.registers.iter().filter(|r| r.is_ancilla()).flat_map(|r| r.lines()).collect()
    }

    /// Number of scratch lines the circuit borrows.
    pub fn ancilla_count(&self) -> usize {
        self.registers.iter().filter(|r| r.is_ancilla()).map(|r| r.width()).sum()
    }

    /// Human-readable name of `line`: register name followed by bit index (`a0`, `b3`).
    pub fn line_name(&self, line: LineId) -> String {
        self.registers
            .iter()
            .find(|r| r.contains(line))
            .map(|r| format!("{}{}", r.name(), line.0 - r.offset()))
            .unwrap_or_else(|| line.to_string())
    }

    /// Returns the circuit with `gate` appended.
    pub fn append(mut self, gate: Gate) -> Result<Self, RevError> {
        let op = Operation::Primitive(gate);
        check_operation(self.num_lines, &op)?;
        self.operations.push(op);
        Ok(self)
    }

    /// Concatenates `self` then `next`. Both must share the same line space.
    pub fn sequence(&self, next: &Circuit) -> Result<Circuit, RevError> {
        if self.num_lines != next.num_lines {
            return Err(RevError::composition(format!(
                "cannot sequence '{}' ({} lines) with '{}' ({} lines)",
                self.name, self.num_lines, next.name, next.num_lines
            )));
        }
        let mut operations = self.operations.clone();
        operations.extend(next.operations.iter().cloned());
        Ok(Circuit { operations, ..self.clone() })
    }

    /// Returns the circuit with `sub` appended, local line `i` of `sub` wired to `line_map[i]`.
    ///
    /// Fails with `RevError::Composition` when the map is not injective, does not
    /// cover every line of `sub`, or points outside this circuit.
    pub fn embed(&self, sub: &Arc<Circuit>, line_map: Vec<LineId>) -> Result<Circuit, RevError> {
        let op = Operation::Embedding { circuit: Arc::clone(sub), line_map, inverted: false };
        check_operation(self.num_lines, &op)?;
        let mut out = self.clone();
        out.operations.push(op);
        Ok(out)
    }

    /// The circuit undoing this one: operations in reverse order, embeddings flipped.
    pub fn invert(&self) -> Circuit {
        let name = match self.name.strip_suffix(INVERSE_SUFFIX) {
            Some(base) => base.to_string(),
            None => format!("{}{}", self.name, INVERSE_SUFFIX),
        };
        Circuit {
            name,
            registers: self.registers.clone(),
            num_lines: self.num_lines,
            operations: self.operations.iter().rev().map(Operation::inverse).collect(),
        }
    }

    /// Expands every embedding and returns the primitive gate list, in program order.
    pub fn flatten(&self) -> Vec<Gate> {
        let mut out = Vec::with_capacity(self.operations.len());
        self.flatten_into(None, false, &mut out);
        out
    }

    fn flatten_into(&self, map: Option<&[LineId]>, inverted: bool, out: &mut Vec<Gate>) {
        let mut visit = |op: &Operation| match op {
            Operation::Primitive(gate) => out.push(match map {
                Some(m) => gate.remap(m),
                None => gate.clone(),
            }),
            Operation::Embedding { circuit, line_map, inverted: sub_inverted } => {
                let composed: Vec<LineId> = match map {
                    Some(m) => line_map.iter().map(|l| m[l.0]).collect(),
                    None => line_map.clone(),
                };
                circuit.flatten_into(Some(&composed), inverted ^ sub_inverted, out);
            }
        };
        if inverted {
            self.operations.iter().rev().for_each(&mut visit);
        } else {
            self.operations.iter().for_each(&mut visit);
        }
    }

    /// Same circuit with all embeddings expanded into primitives.
    pub fn flattened(&self) -> Circuit {
        Circuit {
            name: self.name.clone(),
            registers: self.registers.clone(),
            num_lines: self.num_lines,
            operations: self.flatten().into_iter().map(Operation::Primitive).collect(),
        }
    }

    /// Number of primitive gates after expansion.
    pub fn gate_count(&self) -> usize {
        self.operations
            .iter()
            .map(|op| match op {
                Operation::Primitive(_) => 1,
                Operation::Embedding { circuit, .. } => circuit.gate_count(),
            })
            .sum()
    }

    /// Total quantum cost of the expanded gate list (Peres pairs discounted).
    pub fn quantum_cost(&self) -> u64 {
        sequence_cost(&self.flatten())
    }

    /// CNOT count of the expanded gate list.
    pub fn cnot_cost(&self) -> u64 {
        sequence_cnot_cost(&self.flatten())
    }
}

/// Checks that an operation fits a circuit of `num_lines` lines.
fn check_operation(num_lines: usize, op: &Operation) -> Result<(), RevError> {
    match op {
        Operation::Primitive(gate) => {
            if let Some(l) = gate.lines().into_iter().find(|l| l.0 >= num_lines) {
                return Err(RevError::invalid_gate(format!(
                    "gate '{}' uses line {} outside a {}-line circuit",
                    gate, l, num_lines
                )));
            }
            Ok(())
        }
        Operation::Embedding { circuit, line_map, .. } => {
            if line_map.len() != circuit.num_lines() {
                return Err(RevError::composition(format!(
                    "line map for '{}' has {} entries, the circuit has {} lines",
                    circuit.name(),
                    line_map.len(),
                    circuit.num_lines()
                )));
            }
            let mut seen = HashSet::with_capacity(line_map.len());
            for l in line_map {
                if l.0 >= num_lines {
                    return Err(RevError::composition(format!(
                        "line map for '{}' points to {} outside a {}-line circuit",
                        circuit.name(),
                        l,
                        num_lines
                    )));
                }
                if !seen.insert(*l) {
                    return Err(RevError::composition(format!(
                        "line map for '{}' is not injective: {} used twice",
                        circuit.name(),
                        l
                    )));
                }
            }
            Ok(())
        }
    }
}

//-------------------------------------------------------------------------
// Ancilla arena
//-------------------------------------------------------------------------

/// Hands out ranges of a caller-owned block of ancilla lines by index.
///
/// `reserve` takes lines for the rest of the construction (they hold values
/// across several sub-blocks). `borrow` lends the next free lines to one
/// sub-block that returns them clean, so consecutive borrows share lines.
#[derive(Debug, Clone)]
pub struct AncillaArena {
    lines: Vec<LineId>,
    next: usize,
}

impl AncillaArena {
    pub fn new(lines: Vec<LineId>) -> Self {
        Self { lines, next: 0 }
    }

    /// Lines not yet reserved.
    pub fn remaining(&self) -> usize {
        self.lines.len() - self.next
    }

    /// Permanently takes the next `count` lines.
    pub fn reserve(&mut self, count: usize) -> Result<Vec<LineId>, RevError> {
        let lines = self.borrow(count)?;
        self.next += count;
        Ok(lines)
    }

    /// Lends the next `count` free lines without taking them.
    pub fn borrow(&self, count: usize) -> Result<Vec<LineId>, RevError> {
        if count > self.remaining() {
            return Err(RevError::composition(format!(
                "ancilla arena exhausted: {} lines requested, {} available",
                count,
                self.remaining()
            )));
        }
        Ok(self.lines[self.next..self.next + count].to_vec())
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper for constructing `Circuit` instances.
///
/// Registers are declared first (data, then ancilla); gates and embeddings are
/// appended afterwards. Library constructors use the `&mut self` methods, the
/// `add_op` family chains like a classic builder.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new builder for a circuit called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit {
                name: name.into(),
                registers: Vec::new(),
                num_lines: 0,
                operations: Vec::new(),
            },
        }
    }

    fn declare(&mut self, name: &str, width: usize, role: RegisterRole) -> Register {
        debug_assert!(
            self.circuit.registers.iter().all(|r| r.name() != name),
            "register '{}' declared twice",
            name
        );
        let reg = Register::new(name, self.circuit.num_lines, width, role);
        self.circuit.num_lines += width;
        self.circuit.registers.push(reg.clone());
        reg
    }

    /// Declares a data register of `width` lines.
    pub fn data(&mut self, name: &str, width: usize) -> Register {
        debug_assert!(
            self.circuit.registers.iter().all(|r| !r.is_ancilla()),
            "data register '{}' declared after an ancilla register",
            name
        );
        self.declare(name, width, RegisterRole::Data)
    }

    /// Declares an ancilla register of `width` lines.
    pub fn ancilla(&mut self, name: &str, width: usize) -> Register {
        self.declare(name, width, RegisterRole::Ancilla)
    }

    /// Lines declared so far.
    pub fn num_lines(&self) -> usize {
        self.circuit.num_lines
    }

    fn push(&mut self, gate: Gate) {
        debug_assert!(gate.lines().iter().all(|l| l.0 < self.circuit.num_lines));
        self.circuit.operations.push(Operation::Primitive(gate));
    }

    /// NOT on `target`.
    pub fn x(&mut self, target: LineId) -> &mut Self {
        self.push(Gate::not(target));
        self
    }

    /// CNOT from `control` onto `target`.
    pub fn cx(&mut self, control: LineId, target: LineId) -> &mut Self {
        self.push(Gate::cnot(control, target));
        self
    }

    /// Toffoli from `c1`, `c2` onto `target`.
    pub fn ccx(&mut self, c1: LineId, c2: LineId, target: LineId) -> &mut Self {
        self.push(Gate::toffoli(c1, c2, target));
        self
    }

    /// Multi-controlled NOT with arbitrary polarities.
    pub fn mcx(&mut self, target: LineId, controls: Vec<Control>) -> Result<&mut Self, RevError> {
        self.gate(Gate::new(target, controls)?)
    }

    /// Appends a prebuilt gate after checking its lines.
    pub fn gate(&mut self, gate: Gate) -> Result<&mut Self, RevError> {
        let op = Operation::Primitive(gate);
        check_operation(self.circuit.num_lines, &op)?;
        self.circuit.operations.push(op);
        Ok(self)
    }

    /// Appends `sub` wired through `line_map`.
    pub fn embed(&mut self, sub: &Arc<Circuit>, line_map: Vec<LineId>) -> Result<&mut Self, RevError> {
        self.embedding(sub, line_map, false)
    }

    /// Appends the inverse of `sub` wired through `line_map`.
    pub fn embed_inverse(&mut self, sub: &Arc<Circuit>, line_map: Vec<LineId>) -> Result<&mut Self, RevError> {
        self.embedding(sub, line_map, true)
    }

    fn embedding(&mut self, sub: &Arc<Circuit>, line_map: Vec<LineId>, inverted: bool) -> Result<&mut Self, RevError> {
        let op = Operation::Embedding { circuit: Arc::clone(sub), line_map, inverted };
        check_operation(self.circuit.num_lines, &op)?;
        self.circuit.operations.push(op);
        Ok(self)
    }

    /// Adds a single operation; returns `self` for chaining.
    pub fn add_op(mut self, op: Operation) -> Result<Self, RevError> {
        check_operation(self.circuit.num_lines, &op)?;
        self.circuit.operations.push(op);
        Ok(self)
    }

    /// Adds multiple operations; returns `self` for chaining.
    pub fn add_ops<I>(self, ops: I) -> Result<Self, RevError>
    where
        I: IntoIterator<Item = Operation>,
    {
        ops.into_iter().try_fold(self, |b, op| b.add_op(op))
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

//-------------------------------------------------------------------------
// Diagram
//-------------------------------------------------------------------------

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gates = self.flatten();
        if gates.is_empty() {
            return writeln!(f, "revarith::Circuit[{}: 0 gates on {} lines]", self.name, self.num_lines);
        }

        let num_ops = gates.len();
        let labels: Vec<String> = (0..self.num_lines).map(|l| self.line_name(LineId(l))).collect();
        let label_width = labels.iter().map(|s| s.len()).max().unwrap_or(0) + 2;

        const GATE_WIDTH: usize = 3;
        const WIRE: &str = "───";
        const V_WIRE: char = '│';

        let mut op_grid: Vec<Vec<&str>> = vec![vec![WIRE; num_ops]; self.num_lines];
        // v_connect[row][t]: connector drawn below `row` at time `t`
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; self.num_lines];

        for (t, gate) in gates.iter().enumerate() {
            op_grid[gate.target().0][t] = "─⊕─";
            let mut rows = vec![gate.target().0];
            for c in gate.controls() {
                op_grid[c.line.0][t] = if c.positive { "─●─" } else { "─○─" };
                rows.push(c.line.0);
            }
            let (r_min, r_max) = (rows.iter().min().copied(), rows.iter().max().copied());
            if let (Some(lo), Some(hi)) = (r_min, r_max) {
                for row in v_connect.iter_mut().take(hi).skip(lo) {
                    row[t] = V_WIRE;
                }
            }
        }

        writeln!(
            f,
            "revarith::Circuit[{}: {} gates on {} lines, cost {}]",
            self.name,
            num_ops,
            self.num_lines,
            sequence_cost(&gates)
        )?;
        for r in 0..self.num_lines {
            write!(f, "{:<width$}", format!("{}: ", labels[r]), width = label_width)?;
            writeln!(f, "{}", op_grid[r].concat())?;
            if r + 1 < self.num_lines {
                write!(f, "{}", " ".repeat(label_width))?;
                for t in 0..num_ops {
                    write!(f, " {}{}", v_connect[r][t], " ".repeat(GATE_WIDTH - 2))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl short: a summary line, not the whole diagram.
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circuit {{ name: {:?}, registers: [", self.name)?;
        for (i, r) in self.registers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", r)?;
        }
        write!(f, "], operations: {} }}", self.operations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(i: usize) -> LineId {
        LineId(i)
    }

    fn toffoli_block() -> Arc<Circuit> {
        let mut b = CircuitBuilder::new("block");
        let r = b.data("r", 3);
        b.cx(r.line(0), r.line(1)).ccx(r.line(0), r.line(1), r.line(2));
        Arc::new(b.build())
    }

    #[test]
    fn test_embed_rejects_bad_maps() {
        let sub = toffoli_block();
        let parent = Circuit::empty(4);
        assert!(matches!(parent.embed(&sub, vec![l(0), l(1)]), Err(RevError::Composition { .. })));
        assert!(matches!(parent.embed(&sub, vec![l(0), l(1), l(1)]), Err(RevError::Composition { .. })));
        assert!(matches!(parent.embed(&sub, vec![l(0), l(1), l(4)]), Err(RevError::Composition { .. })));
        assert!(parent.embed(&sub, vec![l(3), l(0), l(2)]).is_ok());
    }

    #[test]
    fn test_flatten_remaps_and_inverts() -> Result<(), RevError> {
        let sub = toffoli_block();
        let mut b = CircuitBuilder::new("parent");
        b.data("p", 4);
        b.embed_inverse(&sub, vec![l(3), l(0), l(2)])?;
        let gates = b.build().flatten();
        assert_eq!(gates, vec![Gate::toffoli(l(3), l(0), l(2)), Gate::cnot(l(3), l(0))]);
        Ok(())
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let c = toffoli_block();
        assert_eq!(c.invert().invert(), *c);
        assert_eq!(c.invert().name(), "block^-1");
    }

    #[test]
    fn test_sequence_requires_same_line_space() {
        assert!(Circuit::empty(3).sequence(&Circuit::empty(4)).is_err());
        assert!(Circuit::empty(3).sequence(&Circuit::empty(3)).is_ok());
    }

    #[test]
    fn test_append_checks_range() -> Result<(), RevError> {
        let c = Circuit::empty(2).append(Gate::cnot(l(0), l(1)))?;
        assert_eq!(c.gate_count(), 1);
        assert!(matches!(c.append(Gate::not(l(2))), Err(RevError::InvalidGate { .. })));
        Ok(())
    }

    #[test]
    fn test_arena_borrow_and_reserve() -> Result<(), RevError> {
        let mut arena = AncillaArena::new((10..15).map(LineId).collect());
        assert_eq!(arena.borrow(2)?, vec![l(10), l(11)]);
        assert_eq!(arena.reserve(3)?, vec![l(10), l(11), l(12)]);
        assert_eq!(arena.borrow(2)?, vec![l(13), l(14)]);
        assert!(arena.borrow(3).is_err());
        Ok(())
    }

    #[test]
    fn test_diagram_mentions_lines() {
        let rendered = toffoli_block().to_string();
        assert!(rendered.starts_with("revarith::Circuit[block: 2 gates on 3 lines"));
        assert!(rendered.contains("r0: "));
        assert!(rendered.contains('⊕'));
    }
}
