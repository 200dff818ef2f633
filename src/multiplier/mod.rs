// src/multiplier/mod.rs

//! Controlled modular multiplication and modular exponentiation by repeated
//! modular addition.

use crate::adders::{controlled_copy, doubly_controlled_set_constant, mod_adder, mod_adder_ancillas};
use crate::circuits::{Circuit, CircuitBuilder};
use crate::classical::{check_modulus, mod_inverse, mod_mul, pow2_power};
use crate::config::AdderKind;
use crate::core::{LineId, RevError};
use std::sync::Arc;
use tracing::{debug, trace};

/// Ancilla lines used by `c_mult_mod(kind, n, ..)`: `temp[n]` plus the modular adder's.
pub fn c_mult_mod_ancillas(kind: AdderKind, n: usize) -> usize {
    n + mod_adder_ancillas(kind, n)
}

/// Controlled modular multiplication by the constant `a`.
///
/// `(c; x, 0) -> (c; x, a*x mod N)` when `c = 1` and `(c; x, 0) -> (c; x, x)`
/// when `c = 0`, for `x < N`.
///
/// Layout: `c[1]`, `x[n]`, `y[n+1]`, then ancillas `temp[n]` and `work`
/// (the modular adder's ancillas).
pub fn c_mult_mod(kind: AdderKind, n: usize, a: u64, modulus: u64) -> Result<Circuit, RevError> {
    check_modulus(n, modulus)?;
    let adder = Arc::new(mod_adder(kind, n, modulus)?);
    let circuit = c_mult_mod_with(kind, n, a, modulus, &adder)?;
    debug!(name = circuit.name(), lines = circuit.num_lines(), gates = circuit.gate_count(), "built controlled multiplier");
    Ok(circuit)
}

/// `c_mult_mod` reusing an already built modular adder for `(kind, n, modulus)`.
fn c_mult_mod_with(
    kind: AdderKind,
    n: usize,
    a: u64,
    modulus: u64,
    adder: &Arc<Circuit>,
) -> Result<Circuit, RevError> {
    let a = a % modulus;
    let mut b = CircuitBuilder::new(format!("c_mult_mod_{}_{}", a, modulus));
    let c = b.data("c", 1);
    let x = b.data("x", n);
    let y = b.data("y", n + 1);
    let temp = b.ancilla("temp", n);
    let work = b.ancilla("work", mod_adder_ancillas(kind, n));

    let add_map: Vec<LineId> = temp.lines().into_iter().chain(y.lines()).chain(work.lines()).collect();

    // a*x = sum over i of x_i * (2^i * a mod N)
    let mut shifted = 1 % modulus;
    for i in 0..n {
        let number = mod_mul(shifted, a, modulus);
        shifted = mod_mul(shifted, 2, modulus);
        if number == 0 {
            trace!(bit = i, "skipping zero partial product");
            continue;
        }
        let load = Arc::new(doubly_controlled_set_constant(n, number)?);
        let load_map: Vec<LineId> = vec![c.line(0), x.line(i)].into_iter().chain(temp.lines()).collect();
        b.embed(&load, load_map.clone())?;
        b.embed(adder, add_map.clone())?;
        b.embed(&load, load_map)?;
    }

    // c = 0: the result is x itself.
    let copy = Arc::new(controlled_copy(n, true)?);
    let copy_map: Vec<LineId> = std::iter::once(c.line(0)).chain(x.lines()).chain(y.slice(0..n)).collect();
    b.embed(&copy, copy_map)?;
    Ok(b.build())
}

/// Modular exponentiation `(x, 0) -> (x, a^x mod N)` with a `2n`-bit exponent.
///
/// Layout: `x[2n]`, `one[n]`, then ancillas `zero[n]`, `cout[1]` and `work`
/// (the controlled multiplier's ancillas). The circuit loads the initial 1 into
/// `one` itself. Requires `gcd(a, N) = 1`.
///
/// Each round multiplies from one buffer into the other under control of an
/// exponent bit, erases the source with the inverse multiplier by the inverse
/// constant, then swaps the roles of the two buffers. After an even number of
/// rounds the result is back in `one`.
pub fn exp_mod(kind: AdderKind, n: usize, a: u64, modulus: u64) -> Result<Circuit, RevError> {
    check_modulus(n, modulus)?;
    let a = a % modulus;
    // Surface a non-invertible base before any gate is emitted.
    mod_inverse(a, modulus)?;
    let adder = Arc::new(mod_adder(kind, n, modulus)?);

    let mut b = CircuitBuilder::new(format!("exp_mod_{}_{}", a, modulus));
    let x = b.data("x", 2 * n);
    let one = b.data("one", n);
    let zero = b.ancilla("zero", n);
    let cout = b.ancilla("cout", 1);
    let work = b.ancilla("work", c_mult_mod_ancillas(kind, n));

    b.x(one.line(0));
    let (mut src, mut dst) = (one.lines(), zero.lines());
    for i in 0..2 * n {
        let factor = pow2_power(a, i, modulus);
        let inverse = mod_inverse(factor, modulus)?;
        let forward = Arc::new(c_mult_mod_with(kind, n, factor, modulus, &adder)?);
        let backward = Arc::new(c_mult_mod_with(kind, n, inverse, modulus, &adder)?);

        let wire = |from: &[LineId], to: &[LineId]| -> Vec<LineId> {
            std::iter::once(x.line(i))
                .chain(from.iter().copied())
                .chain(to.iter().copied())
                .chain(cout.lines())
                .chain(work.lines())
                .collect()
        };
        b.embed(&forward, wire(&src, &dst))?;
        b.embed_inverse(&backward, wire(&dst, &src))?;
        std::mem::swap(&mut src, &mut dst);
        trace!(round = i, factor, inverse, "exponent round");
    }

    let circuit = b.build();
    debug!(
        name = circuit.name(),
        lines = circuit.num_lines(),
        ancillas = circuit.ancilla_count(),
        gates = circuit.gate_count(),
        "built modular exponentiation"
    );
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{check_ancillas_clean, evaluate};

    #[test]
    fn test_exp_mod_small_example() -> Result<(), RevError> {
        let circuit = exp_mod(AdderKind::Cdkm, 2, 2, 3)?;
        let out = evaluate(&circuit, &[("x", 3)])?;
        assert_eq!(out.read_register(circuit.register("one")?), 2);
        assert_eq!(out.read_register(circuit.register("x")?), 3);
        check_ancillas_clean(&circuit, &out)?;
        Ok(())
    }

    #[test]
    fn test_exp_mod_rejects_shared_factor() {
        assert_eq!(
            exp_mod(AdderKind::Vbe, 4, 6, 9).map(|_| ()),
            Err(RevError::InverseNotDefined { value: 6, modulus: 9 })
        );
    }

    #[test]
    fn test_zero_multiplier_keeps_branches() -> Result<(), RevError> {
        let circuit = c_mult_mod(AdderKind::Cdkm, 3, 7, 7)?;
        let on = evaluate(&circuit, &[("c", 1), ("x", 5)])?;
        assert_eq!(on.read_register(circuit.register("y")?), 0);
        let off = evaluate(&circuit, &[("c", 0), ("x", 5)])?;
        assert_eq!(off.read_register(circuit.register("y")?), 5);
        Ok(())
    }
}
