// src/windowed/mod.rs

//! Windowed modular arithmetic.
//!
//! Instead of one controlled modular addition per operand bit, `w` operand bits
//! are used as the index of a lookup circuit that XORs the precomputed partial
//! product into a temporary register. One modular addition then absorbs the
//! whole window, and the inverse lookup clears the temporary again.

pub mod tables;

use crate::adders::{mod_adder, mod_adder_ancillas, swap_registers};
use crate::circuits::{AncillaArena, Circuit, CircuitBuilder};
use crate::classical::{bit_length, check_modulus, check_window, mod_inverse};
use crate::compiler::Compiler;
use crate::config::Optimization;
use crate::core::{LineId, RevError, MAX_SYNTHESIS_INPUTS};
use crate::operations::{Control, Gate};
use crate::synthesis::hypercube::{pad_to_permutation, permutation_circuit};
use crate::synthesis::{synthesize, TruthTable};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, trace};

pub use tables::{exp_table, exp_window_table, mult_table, offset_table, window_product_table};

/// An immutable table of `2^index_bits` entries of `out_bits` bits each.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupTable {
    index_bits: usize,
    out_bits: usize,
    values: Vec<u64>,
}

impl LookupTable {
    pub fn new(index_bits: usize, out_bits: usize, values: Vec<u64>) -> Result<Self, RevError> {
        if index_bits == 0 || index_bits > MAX_SYNTHESIS_INPUTS {
            return Err(RevError::parameter(format!(
                "lookup index width {} outside 1..={}",
                index_bits, MAX_SYNTHESIS_INPUTS
            )));
        }
        if out_bits == 0 || out_bits > 64 {
            return Err(RevError::parameter(format!("lookup output width {} outside 1..=64", out_bits)));
        }
        if values.len() != 1usize << index_bits {
            return Err(RevError::parameter(format!(
                "lookup table of {} index bits needs {} entries, got {}",
                index_bits,
                1usize << index_bits,
                values.len()
            )));
        }
        if let Some(v) = values.iter().find(|&&v| bit_length(v) > out_bits) {
            return Err(RevError::parameter(format!("table entry {} does not fit in {} bits", v, out_bits)));
        }
        Ok(Self { index_bits, out_bits, values })
    }

    pub fn index_bits(&self) -> usize {
        self.index_bits
    }

    pub fn out_bits(&self) -> usize {
        self.out_bits
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> u64 {
        self.values[index]
    }

    /// Single-output table for output bit `bit`.
    pub fn truth_table(&self, bit: usize) -> Result<TruthTable, RevError> {
        TruthTable::from_output_bit(self.index_bits, &self.values, bit)
    }
}

/// Lookup circuit `out ^= table[index]`.
///
/// Layout: `index[w]`, `out[o]`; the hypercube backend adds an ancilla
/// `scratch[m]` holding the padded permutation.
pub fn lookup(table: &LookupTable, optimization: Optimization) -> Result<Circuit, RevError> {
    let mut b = CircuitBuilder::new(format!("lookup_{}x{}_{}", table.index_bits, table.out_bits, optimization));
    let index = b.data("index", table.index_bits);
    let out = b.data("out", table.out_bits);

    match optimization {
        Optimization::Naive => {
            for (entry, &value) in table.values.iter().enumerate() {
                for bit in (0..table.out_bits).filter(|bit| (value >> bit) & 1 == 1) {
                    let controls = (0..table.index_bits)
                        .map(|k| Control::with_polarity(index.line(k), (entry >> k) & 1 == 1))
                        .collect();
                    b.mcx(out.line(bit), controls)?;
                }
            }
        }
        Optimization::Spectral => {
            let inputs = index.lines();
            let per_bit: Vec<Vec<Gate>> = (0..table.out_bits)
                .into_par_iter()
                .map(|bit| {
                    let result = synthesize(&table.truth_table(bit)?)?;
                    trace!(bit, method = ?result.method, cost = result.cost, "output bit synthesized");
                    result.esop.to_gates(&inputs, out.line(bit))
                })
                .collect::<Result<_, RevError>>()?;
            for gate in per_bit.into_iter().flatten() {
                b.gate(gate)?;
            }
        }
        Optimization::Hypercube => {
            let padded = pad_to_permutation(&table.values, table.out_bits)?;
            let perm = Arc::new(permutation_circuit(&padded.permutation, padded.lines)?);
            let scratch = b.ancilla("scratch", padded.lines);
            for k in 0..table.index_bits {
                b.cx(index.line(k), scratch.line(k));
            }
            b.embed(&perm, scratch.lines())?;
            for bit in 0..table.out_bits {
                b.cx(scratch.line(bit), out.line(bit));
            }
            b.embed_inverse(&perm, scratch.lines())?;
            for k in 0..table.index_bits {
                b.cx(index.line(k), scratch.line(k));
            }
        }
    }

    let circuit = b.build();
    debug!(name = circuit.name(), gates = circuit.gate_count(), cost = circuit.quantum_cost(), "built lookup");
    Ok(circuit)
}

/// Offsets and widths of the windows of an `n`-bit operand; the last may be narrower.
fn windows(n: usize, w: usize) -> Vec<(usize, usize)> {
    (0..n).step_by(w).map(|offset| (offset, w.min(n - offset))).collect()
}

impl Compiler {
    /// Windowed product-accumulate: `out += f(e) * y mod N`.
    ///
    /// Layout: `e[ce]` (omitted when `ce = 0`), `y[n]`, `out[n+1]`, then ancillas
    /// `temp[n]` and `work`. `table_for(width, shift)` returns the table of the
    /// operand window of `width` bits at bit `shift`, indexed by
    /// `m + (e << width)` for operand window value `m` and control value `e`.
    fn product_add<F>(&self, name: String, n: usize, modulus: u64, w: usize, ce: usize, table_for: F) -> Result<Circuit, RevError>
    where
        F: Fn(usize, usize) -> Vec<u64> + Sync,
    {
        check_modulus(n, modulus)?;
        check_window(w, n)?;
        if w + ce > MAX_SYNTHESIS_INPUTS {
            return Err(RevError::parameter(format!(
                "combined lookup index of {} bits exceeds {}",
                w + ce,
                MAX_SYNTHESIS_INPUTS
            )));
        }
        let adder = Arc::new(mod_adder(self.config().adder, n, modulus)?);

        let spans = windows(n, w);
        let lookups: Vec<Arc<Circuit>> = spans
            .par_iter()
            .map(|&(offset, width)| self.lookup(&LookupTable::new(width + ce, n, table_for(width, offset))?))
            .collect::<Result<_, RevError>>()?;

        let scratch = lookups.iter().map(|c| c.ancilla_count()).max().unwrap_or(0);
        let work_width = mod_adder_ancillas(self.config().adder, n).max(scratch);

        let mut b = CircuitBuilder::new(name);
        let e = if ce > 0 { b.data("e", ce).lines() } else { Vec::new() };
        let y = b.data("y", n);
        let out = b.data("out", n + 1);
        let temp = b.ancilla("temp", n);
        let work = b.ancilla("work", work_width);
        let arena = AncillaArena::new(work.lines());

        let add_map: Vec<LineId> = temp
            .lines()
            .into_iter()
            .chain(out.lines())
            .chain(arena.borrow(adder.ancilla_count())?)
            .collect();
        for ((offset, width), table) in spans.iter().zip(&lookups) {
            let map: Vec<LineId> = y
                .slice(*offset..offset + width)
                .into_iter()
                .chain(e.iter().copied())
                .chain(temp.lines())
                .chain(arena.borrow(table.ancilla_count())?)
                .collect();
            b.embed(table, map.clone())?;
            b.embed(&adder, add_map.clone())?;
            b.embed_inverse(table, map)?;
            trace!(offset, width, "window accumulated");
        }
        Ok(b.build())
    }

    /// Windowed modular addition of a multiple: `(y, out) -> (y, (out + k*y) mod N)`
    /// for `y, out < N`.
    ///
    /// Layout: `y[n]`, `out[n+1]`, then ancillas `temp[n]`, `work`.
    pub fn win_add_mod(&self, modulus: u64, w: usize, n: usize, k: u64) -> Result<Circuit, RevError> {
        check_modulus(n, modulus)?;
        let k = k % modulus;
        let circuit = self.product_add(format!("win_add_mod_{}_{}", k, modulus), n, modulus, w, 0, |width, shift| {
            window_product_table(width, k, shift, modulus)
        })?;
        debug!(name = circuit.name(), lines = circuit.num_lines(), gates = circuit.gate_count(), "built windowed adder");
        Ok(circuit)
    }

    /// Windowed in-place multiplication by a constant: `a -> a*k mod N` for `a < N`.
    ///
    /// Layout: `a[n]`, then ancillas `temp[n+1]`, `a_hi[1]`, `work`.
    /// Requires `gcd(k, N) = 1`.
    pub fn win_mult_mod(&self, modulus: u64, w: usize, n: usize, k: u64) -> Result<Circuit, RevError> {
        check_modulus(n, modulus)?;
        let k = k % modulus;
        let k_inv = mod_inverse(k, modulus)?;
        let forward = Arc::new(self.win_add_mod(modulus, w, n, k)?);
        let backward = Arc::new(self.win_add_mod(modulus, w, n, k_inv)?);
        let swap = Arc::new(swap_registers(n)?);

        let mut b = CircuitBuilder::new(format!("win_mult_mod_{}_{}", k, modulus));
        let a = b.data("a", n);
        let temp = b.ancilla("temp", n + 1);
        let a_hi = b.ancilla("a_hi", 1);
        let work = b.ancilla("work", forward.ancilla_count().max(backward.ancilla_count()));
        let arena = AncillaArena::new(work.lines());

        let forward_map: Vec<LineId> = a
            .lines()
            .into_iter()
            .chain(temp.lines())
            .chain(arena.borrow(forward.ancilla_count())?)
            .collect();
        let backward_map: Vec<LineId> = temp
            .slice(0..n)
            .into_iter()
            .chain(a.lines())
            .chain(a_hi.lines())
            .chain(arena.borrow(backward.ancilla_count())?)
            .collect();
        let swap_map: Vec<LineId> = a.lines().into_iter().chain(temp.slice(0..n)).collect();

        // temp = k*a; a -= k^-1 * temp, which is 0; then exchange.
        b.embed(&forward, forward_map)?;
        b.embed_inverse(&backward, backward_map)?;
        b.embed(&swap, swap_map)?;

        let circuit = b.build();
        debug!(name = circuit.name(), lines = circuit.num_lines(), gates = circuit.gate_count(), "built windowed multiplier");
        Ok(circuit)
    }

    /// Windowed modular exponentiation: `(e, x) -> (e, x * k^e mod N)` for `x < N`.
    ///
    /// Layout: `e[ne]`, `x[n]`, then ancillas `out[n+1]`, `x_hi[1]`, `work`.
    /// Each exponent window of `we` bits and each multiplicand window of `wm`
    /// bits share one lookup. Requires `gcd(k, N) = 1`.
    pub fn win_exp_mod(&self, modulus: u64, k: u64, n: usize, ne: usize, we: usize, wm: usize) -> Result<Circuit, RevError> {
        check_modulus(n, modulus)?;
        check_window(we, ne)?;
        check_window(wm, n)?;
        let k = k % modulus;
        let k_inv = mod_inverse(k, modulus)?;
        let swap = Arc::new(swap_registers(n)?);

        let mut rounds = Vec::new();
        for (offset, width) in windows(ne, we) {
            let table_for = |base: u64| {
                move |wm_width: usize, shift: usize| exp_window_table(width, wm_width, base, offset, shift, modulus)
            };
            let forward = self.product_add(format!("exp_window_{}", offset), n, modulus, wm, width, table_for(k))?;
            let backward = self.product_add(format!("exp_window_inv_{}", offset), n, modulus, wm, width, table_for(k_inv))?;
            rounds.push((offset, width, Arc::new(forward), Arc::new(backward)));
        }
        let work_width = rounds
            .iter()
            .map(|(_, _, f, g)| f.ancilla_count().max(g.ancilla_count()))
            .max()
            .unwrap_or(0);

        let mut b = CircuitBuilder::new(format!("win_exp_mod_{}_{}", k, modulus));
        let e = b.data("e", ne);
        let x = b.data("x", n);
        let out = b.ancilla("out", n + 1);
        let x_hi = b.ancilla("x_hi", 1);
        let work = b.ancilla("work", work_width);
        let arena = AncillaArena::new(work.lines());
        let swap_map: Vec<LineId> = x.lines().into_iter().chain(out.slice(0..n)).collect();

        for (offset, width, forward, backward) in &rounds {
            let controls = e.slice(*offset..offset + width);
            let forward_map: Vec<LineId> = controls
                .iter()
                .copied()
                .chain(x.lines())
                .chain(out.lines())
                .chain(arena.borrow(forward.ancilla_count())?)
                .collect();
            let backward_map: Vec<LineId> = controls
                .iter()
                .copied()
                .chain(out.slice(0..n))
                .chain(x.lines())
                .chain(x_hi.lines())
                .chain(arena.borrow(backward.ancilla_count())?)
                .collect();
            b.embed(forward, forward_map)?;
            b.embed_inverse(backward, backward_map)?;
            b.embed(&swap, swap_map.clone())?;
        }

        let circuit = b.build();
        debug!(
            name = circuit.name(),
            lines = circuit.num_lines(),
            ancillas = circuit.ancilla_count(),
            gates = circuit.gate_count(),
            "built windowed exponentiation"
        );
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::evaluate;

    #[test]
    fn test_windows_cover_operand() {
        assert_eq!(windows(5, 2), vec![(0, 2), (2, 2), (4, 1)]);
        assert_eq!(windows(4, 4), vec![(0, 4)]);
    }

    #[test]
    fn test_lookup_table_validation() {
        assert!(LookupTable::new(2, 2, vec![0, 1, 2, 3]).is_ok());
        assert!(LookupTable::new(2, 2, vec![0, 1, 2, 4]).is_err());
        assert!(LookupTable::new(2, 2, vec![0, 1, 2]).is_err());
        assert!(LookupTable::new(0, 2, vec![0]).is_err());
    }

    #[test]
    fn test_naive_lookup_gate_count() -> Result<(), RevError> {
        let table = LookupTable::new(2, 3, vec![0, 1, 3, 7])?;
        let c = lookup(&table, Optimization::Naive)?;
        assert_eq!(c.gate_count(), 6);
        let out = evaluate(&c, &[("index", 2)])?;
        assert_eq!(out.read_register(c.register("out")?), 3);
        Ok(())
    }
}
