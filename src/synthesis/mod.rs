// src/synthesis/mod.rs

//! Boolean function synthesis: truth table in, multi-controlled NOT network out.
//!
//! A single-output function is written as an ESOP (exclusive sum of products,
//! an XOR of AND terms). Each term becomes one gate onto the output line, its
//! negated literals becoming negative controls. Three decompositions are
//! produced and the cheapest under the quantum cost model is kept:
//!
//! * the spectral decomposition (`spectral`),
//! * the positive-polarity Reed-Muller expansion,
//! * the minterm expansion.
//!
//! Bijective multi-output tables can instead be synthesized in place with the
//! permutation backend in `hypercube`.

pub mod hypercube;
pub mod spectral;

use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{LineId, RevError, MAX_SYNTHESIS_INPUTS};
use crate::operations::{gate_cost, Control, Gate};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use tracing::trace;

/// A single-output boolean function of `num_inputs` variables.
///
/// `bits[i]` is the output for the input assignment whose bit `k` is variable `k`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TruthTable {
    num_inputs: usize,
    bits: Vec<bool>,
}

impl TruthTable {
    pub fn new(num_inputs: usize, bits: Vec<bool>) -> Result<Self, RevError> {
        if num_inputs > MAX_SYNTHESIS_INPUTS {
            return Err(RevError::parameter(format!(
                "{} inputs exceed the synthesis limit of {}",
                num_inputs, MAX_SYNTHESIS_INPUTS
            )));
        }
        if bits.len() != 1usize << num_inputs {
            return Err(RevError::parameter(format!(
                "truth table of {} inputs needs {} entries, got {}",
                num_inputs,
                1usize << num_inputs,
                bits.len()
            )));
        }
        Ok(Self { num_inputs, bits })
    }

    /// Table of `f` over every assignment.
    pub fn from_fn(num_inputs: usize, f: impl Fn(usize) -> bool) -> Result<Self, RevError> {
        let size = if num_inputs > MAX_SYNTHESIS_INPUTS { 0 } else { 1usize << num_inputs };
        Self::new(num_inputs, (0..size).map(f).collect())
    }

    /// Bit `bit` of every entry of a multi-output table.
    pub fn from_output_bit(num_inputs: usize, values: &[u64], bit: usize) -> Result<Self, RevError> {
        Self::new(num_inputs, values.iter().map(|v| bit < 64 && (v >> bit) & 1 == 1).collect())
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn get(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// A variable or its complement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub var: usize,
    pub positive: bool,
}

impl Literal {
    pub fn negated(self) -> Self {
        Literal { var: self.var, positive: !self.positive }
    }
}

/// An AND of literals over distinct variables, sorted by variable. Empty is the constant 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term {
    literals: Vec<Literal>,
}

impl Term {
    /// Builds a term; literals are sorted by variable. Callers pass distinct variables.
    pub fn new(mut literals: Vec<Literal>) -> Self {
        literals.sort();
        debug_assert!(literals.windows(2).all(|p| p[0].var != p[1].var), "repeated variable in term");
        Self { literals }
    }

    /// The constant 1.
    pub fn one() -> Self {
        Self { literals: Vec::new() }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// This term AND `literal` (whose variable must not already appear).
    pub fn with(mut self, literal: Literal) -> Self {
        self.literals.push(literal);
        Self::new(self.literals)
    }

    fn without(&self, var: usize) -> Self {
        Self { literals: self.literals.iter().copied().filter(|l| l.var != var).collect() }
    }

    fn literal_on(&self, var: usize) -> Option<Literal> {
        self.literals.iter().copied().find(|l| l.var == var)
    }

    fn flipped(&self, var: usize) -> Self {
        Self {
            literals: self.literals.iter().map(|&l| if l.var == var { l.negated() } else { l }).collect(),
        }
    }

    /// Value of the term on the assignment `index`.
    pub fn evaluate(&self, index: usize) -> bool {
        self.literals.iter().all(|l| ((index >> l.var) & 1 == 1) == l.positive)
    }

    /// Cost of the gate this term compiles to.
    pub fn cost(&self) -> u64 {
        let all_negative = !self.literals.is_empty() && self.literals.iter().all(|l| !l.positive);
        gate_cost(self.literals.len(), all_negative)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literals.is_empty() {
            return write!(f, "1");
        }
        for l in &self.literals {
            write!(f, "x{}{}", l.var, if l.positive { "" } else { "'" })?;
        }
        Ok(())
    }
}

/// XOR of terms over `num_inputs` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Esop {
    num_inputs: usize,
    terms: Vec<Term>,
}

impl Esop {
    pub fn new(num_inputs: usize, terms: Vec<Term>) -> Self {
        Self { num_inputs, terms }
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn evaluate(&self, index: usize) -> bool {
        self.terms.iter().fold(false, |acc, t| acc ^ t.evaluate(index))
    }

    /// Sum of per-term gate costs. All gates share one target line, so no
    /// Peres pair can occur and this equals the cost of the emitted gate list.
    pub fn cost(&self) -> u64 {
        self.terms.iter().fold(0u64, |acc, t| acc.saturating_add(t.cost()))
    }

    /// Table computed by this expression.
    pub fn to_table(&self) -> Result<TruthTable, RevError> {
        TruthTable::from_fn(self.num_inputs, |i| self.evaluate(i))
    }

    /// Cancels repeated terms and merges neighbours until no rule applies:
    /// `t x xor t x' = t` and `t xor t x = t x'`.
    pub fn simplify(&self) -> Esop {
        let mut set: BTreeSet<Term> = BTreeSet::new();
        let mut queue: VecDeque<Term> = VecDeque::new();
        for t in &self.terms {
            toggle(&mut set, &mut queue, t.clone());
        }

        while let Some(t) = queue.pop_front() {
            if !set.contains(&t) {
                continue;
            }
            if let Some((partner, merged)) = self.find_merge(&set, &t) {
                set.remove(&t);
                set.remove(&partner);
                toggle(&mut set, &mut queue, merged);
            }
        }
        Esop { num_inputs: self.num_inputs, terms: set.into_iter().collect() }
    }

    fn find_merge(&self, set: &BTreeSet<Term>, t: &Term) -> Option<(Term, Term)> {
        for var in 0..self.num_inputs {
            match t.literal_on(var) {
                Some(lit) => {
                    // t = s x, partner s x'  ->  s
                    let opposite = t.flipped(var);
                    if set.contains(&opposite) {
                        return Some((opposite, t.without(var)));
                    }
                    // t = s x, partner s  ->  s x'
                    let base = t.without(var);
                    if set.contains(&base) {
                        return Some((base.clone(), base.with(lit.negated())));
                    }
                }
                None => {
                    // t = s, partner s x  ->  s x'
                    for positive in [true, false] {
                        let lit = Literal { var, positive };
                        let extended = t.clone().with(lit);
                        if set.contains(&extended) {
                            return Some((extended, t.clone().with(lit.negated())));
                        }
                    }
                }
            }
        }
        None
    }

    /// Gates computing `target ^= expression(inputs)`, one per term.
    pub fn to_gates(&self, inputs: &[LineId], target: LineId) -> Result<Vec<Gate>, RevError> {
        if inputs.len() != self.num_inputs {
            return Err(RevError::composition(format!(
                "expression over {} inputs wired to {} lines",
                self.num_inputs,
                inputs.len()
            )));
        }
        self.terms
            .iter()
            .map(|t| {
                let controls = t
                    .literals
                    .iter()
                    .map(|l| Control::with_polarity(inputs[l.var], l.positive))
                    .collect();
                Gate::new(target, controls)
            })
            .collect()
    }

    /// Circuit over `x[num_inputs]`, `f[1]` computing `f ^= expression(x)`.
    pub fn to_circuit(&self) -> Result<Circuit, RevError> {
        let mut b = CircuitBuilder::new("esop");
        let x = b.data("x", self.num_inputs);
        let f = b.data("f", 1);
        for gate in self.to_gates(&x.lines(), f.line(0))? {
            b.gate(gate)?;
        }
        Ok(b.build())
    }
}

/// Inserts `t`, or removes it if present (`t xor t = 0`).
fn toggle(set: &mut BTreeSet<Term>, queue: &mut VecDeque<Term>, t: Term) {
    if !set.remove(&t) {
        set.insert(t.clone());
        queue.push_back(t);
    }
}

impl fmt::Display for Esop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        let parts: Vec<String> = self.terms.iter().map(Term::to_string).collect();
        write!(f, "{}", parts.join(" ^ "))
    }
}

/// Which decomposition produced a synthesized expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decomposition {
    Spectral,
    ReedMuller,
    Minterm,
}

/// Outcome of `synthesize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    pub esop: Esop,
    pub method: Decomposition,
    /// Quantum cost of the emitted gates.
    pub cost: u64,
}

/// Positive-polarity Reed-Muller expansion (Moebius transform of the table).
pub fn reed_muller(table: &TruthTable) -> Esop {
    let mut coeffs = table.bits.clone();
    let mut h = 1;
    while h < coeffs.len() {
        for i in 0..coeffs.len() {
            if i & h != 0 {
                coeffs[i] ^= coeffs[i ^ h];
            }
        }
        h <<= 1;
    }
    let terms = coeffs
        .iter()
        .enumerate()
        .filter(|(_, c)| **c)
        .map(|(mask, _)| {
            Term::new(
                (0..table.num_inputs)
                    .filter(|v| (mask >> v) & 1 == 1)
                    .map(|var| Literal { var, positive: true })
                    .collect(),
            )
        })
        .collect();
    Esop::new(table.num_inputs, terms)
}

/// One fully specified term per true entry.
pub fn minterms(table: &TruthTable) -> Esop {
    let terms = table
        .bits
        .iter()
        .enumerate()
        .filter(|(_, b)| **b)
        .map(|(idx, _)| {
            Term::new(
                (0..table.num_inputs)
                    .map(|var| Literal { var, positive: (idx >> var) & 1 == 1 })
                    .collect(),
            )
        })
        .collect();
    Esop::new(table.num_inputs, terms)
}

/// Checks that `esop` reproduces `table` on every assignment.
fn verify(table: &TruthTable, esop: &Esop, method: Decomposition) -> Result<(), RevError> {
    match (0..table.bits.len()).find(|&i| esop.evaluate(i) != table.bits[i]) {
        Some(i) => Err(RevError::SynthesisInvariantViolation {
            message: format!("{:?} decomposition disagrees with its table at input {}", method, i),
        }),
        None => Ok(()),
    }
}

/// Synthesizes `table` into the cheapest verified ESOP.
pub fn synthesize(table: &TruthTable) -> Result<SynthesisResult, RevError> {
    let candidates = [
        (Decomposition::Spectral, Esop::new(table.num_inputs, spectral::decompose(&table.bits, table.num_inputs)).simplify()),
        (Decomposition::ReedMuller, reed_muller(table).simplify()),
        (Decomposition::Minterm, minterms(table)),
    ];

    let mut best: Option<SynthesisResult> = None;
    for (method, esop) in candidates {
        verify(table, &esop, method)?;
        let cost = esop.cost();
        trace!(?method, cost, terms = esop.terms.len(), "synthesis candidate");
        let better = match &best {
            None => true,
            Some(b) => cost < b.cost || (cost == b.cost && esop.terms.len() < b.esop.terms.len()),
        };
        if better {
            best = Some(SynthesisResult { esop, method, cost });
        }
    }
    best.ok_or_else(|| RevError::SynthesisInvariantViolation { message: "no candidate decomposition".to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize, f: impl Fn(usize) -> bool) -> TruthTable {
        match TruthTable::from_fn(n, f) {
            Ok(t) => t,
            Err(e) => panic!("bad table: {}", e),
        }
    }

    #[test]
    fn test_simplify_merges_and_cancels() {
        let x0 = Literal { var: 0, positive: true };
        let x1 = Literal { var: 1, positive: true };
        // x0 x1 ^ x0 x1' = x0
        let e = Esop::new(2, vec![Term::new(vec![x0, x1]), Term::new(vec![x0, x1.negated()])]);
        assert_eq!(e.simplify().terms(), &[Term::new(vec![x0])]);
        // x0 ^ x0 x1 = x0 x1'
        let e = Esop::new(2, vec![Term::new(vec![x0]), Term::new(vec![x0, x1])]);
        assert_eq!(e.simplify().terms(), &[Term::new(vec![x0, x1.negated()])]);
        // duplicates cancel
        let e = Esop::new(2, vec![Term::new(vec![x1]), Term::new(vec![x1])]);
        assert!(e.simplify().terms().is_empty());
    }

    #[test]
    fn test_simplify_preserves_function() {
        let t = table(4, |i| (i * 7 + 3) % 5 < 2);
        let e = minterms(&t);
        let s = e.simplify();
        for i in 0..16 {
            assert_eq!(s.evaluate(i), t.get(i));
        }
        assert!(s.terms().len() <= e.terms().len());
    }

    #[test]
    fn test_reed_muller_of_and() {
        let t = table(2, |i| i == 3);
        assert_eq!(reed_muller(&t).terms().len(), 1);
    }

    #[test]
    fn test_constant_tables() -> Result<(), RevError> {
        let zero = synthesize(&table(3, |_| false))?;
        assert!(zero.esop.terms().is_empty());
        assert_eq!(zero.cost, 0);
        let one = synthesize(&table(3, |_| true))?;
        assert_eq!(one.esop.terms(), &[Term::one()]);
        assert_eq!(one.cost, 1);
        Ok(())
    }

    #[test]
    fn test_table_validation() {
        assert!(TruthTable::new(2, vec![true; 3]).is_err());
        assert!(TruthTable::new(17, Vec::new()).is_err());
    }
}
