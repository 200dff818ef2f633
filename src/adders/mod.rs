// src/adders/mod.rs

//! Ripple-carry adders and the modular adder built on top of them.
//!
//! Both plain adders realize `(a, b) -> (a, a + b mod 2^(n+1))` with `a` on `n`
//! lines and `b` on `n + 1` lines. The carry scheme (VBE) keeps `n` carry
//! ancillas; the MAJ/UMA scheme (CDKM) computes carries inside `a` and needs a
//! single ancilla. Their inverses subtract.

pub mod primitives;

use crate::circuits::{Circuit, CircuitBuilder};
use crate::classical::{check_modulus, check_width};
use crate::config::AdderKind;
use crate::core::{LineId, RevError};
use crate::operations::Control;
use std::sync::Arc;
use tracing::debug;

pub use primitives::{
    controlled_copy, doubly_controlled_set_constant, neg_controlled_set_constant, set_constant, swap_registers,
};

/// VBE carry block over `[cin, a, b, cout]`: `cout ^= maj(cin, a, b)`, `b ^= a`.
pub fn carry_block() -> Circuit {
    let mut b = CircuitBuilder::new("carry");
    let r = b.data("q", 4);
    let (cin, x, y, cout) = (r.line(0), r.line(1), r.line(2), r.line(3));
    b.ccx(x, y, cout).cx(x, y).ccx(cin, y, cout);
    b.build()
}

/// VBE sum block over `[c, a, b]`: `b ^= a ^ c`.
pub fn sum_block() -> Circuit {
    let mut b = CircuitBuilder::new("sum");
    let r = b.data("q", 3);
    b.cx(r.line(1), r.line(2)).cx(r.line(0), r.line(2));
    b.build()
}

/// CDKM majority block over `[x, y, z]`; leaves the carry on `z`.
pub fn maj_block() -> Circuit {
    let mut b = CircuitBuilder::new("maj");
    let r = b.data("q", 3);
    let (x, y, z) = (r.line(0), r.line(1), r.line(2));
    b.cx(z, y).cx(z, x).ccx(x, y, z);
    b.build()
}

/// Gate pattern of the CDKM un-majority-and-add block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UmaForm {
    /// Toffoli then two CNOTs; fewest gates.
    #[default]
    TwoCnot,
    /// Three CNOTs around NOTs on the middle line; shorter critical path.
    ThreeCnot,
}

/// CDKM un-majority-and-add block over `[x, y, z]`; restores `x`, `z` and leaves the sum bit on `y`.
pub fn uma_block(form: UmaForm) -> Circuit {
    let mut b = CircuitBuilder::new(match form {
        UmaForm::TwoCnot => "uma",
        UmaForm::ThreeCnot => "uma3",
    });
    let r = b.data("q", 3);
    let (x, y, z) = (r.line(0), r.line(1), r.line(2));
    match form {
        UmaForm::TwoCnot => {
            b.ccx(x, y, z).cx(z, x).cx(x, y);
        }
        UmaForm::ThreeCnot => {
            b.x(y).cx(x, y).ccx(x, y, z).x(y).cx(z, x).cx(z, y);
        }
    }
    b.build()
}

/// Ancilla lines used by `plain_adder(kind, n)`.
pub fn adder_ancillas(kind: AdderKind, n: usize) -> usize {
    match kind {
        AdderKind::Vbe => n,
        AdderKind::Cdkm => 1,
    }
}

/// Ancilla lines used by `mod_adder(kind, n, _)`: adder carries, `modulus[n]`, `flag[1]`.
pub fn mod_adder_ancillas(kind: AdderKind, n: usize) -> usize {
    adder_ancillas(kind, n) + n + 1
}

/// Plain in-place adder `(a, b) -> (a, a + b mod 2^(n+1))`.
///
/// Layout: `a[n]`, `b[n+1]`, then the ancilla `carry` register
/// (`n` lines for VBE, one for CDKM).
pub fn plain_adder(kind: AdderKind, n: usize) -> Result<Circuit, RevError> {
    check_width(n)?;
    let circuit = match kind {
        AdderKind::Vbe => vbe_adder(n)?,
        AdderKind::Cdkm => cdkm_adder(n, UmaForm::TwoCnot)?,
    };
    debug!(name = circuit.name(), lines = circuit.num_lines(), gates = circuit.gate_count(), "built plain adder");
    Ok(circuit)
}

fn vbe_adder(n: usize) -> Result<Circuit, RevError> {
    let carry = Arc::new(carry_block());
    let sum = Arc::new(sum_block());

    let mut b = CircuitBuilder::new(format!("vbe_add_{}", n));
    let a = b.data("a", n);
    let y = b.data("b", n + 1);
    let c = b.ancilla("carry", n);

    // Carries ripple up; the last one lands on the top bit of b.
    for i in 0..n {
        let cout = if i + 1 < n { c.line(i + 1) } else { y.line(n) };
        b.embed(&carry, vec![c.line(i), a.line(i), y.line(i), cout])?;
    }
    b.cx(a.line(n - 1), y.line(n - 1));
    b.embed(&sum, vec![c.line(n - 1), a.line(n - 1), y.line(n - 1)])?;
    for j in (0..n - 1).rev() {
        b.embed_inverse(&carry, vec![c.line(j), a.line(j), y.line(j), c.line(j + 1)])?;
        b.embed(&sum, vec![c.line(j), a.line(j), y.line(j)])?;
    }
    Ok(b.build())
}

/// CDKM plain adder with a chosen UMA pattern; `plain_adder(Cdkm, n)` uses `UmaForm::TwoCnot`.
///
/// Same layout and semantics as `plain_adder`.
pub fn cdkm_adder_with(n: usize, form: UmaForm) -> Result<Circuit, RevError> {
    check_width(n)?;
    cdkm_adder(n, form)
}

fn cdkm_adder(n: usize, form: UmaForm) -> Result<Circuit, RevError> {
    let maj = Arc::new(maj_block());
    let uma = Arc::new(uma_block(form));

    let mut b = CircuitBuilder::new(match form {
        UmaForm::TwoCnot => format!("cdkm_add_{}", n),
        UmaForm::ThreeCnot => format!("cdkm3_add_{}", n),
    });
    let a = b.data("a", n);
    let y = b.data("b", n + 1);
    let c = b.ancilla("carry", 1);

    let triple = |i: usize| -> Vec<LineId> {
        let low = if i == 0 { c.line(0) } else { a.line(i - 1) };
        vec![low, y.line(i), a.line(i)]
    };
    for i in 0..n {
        b.embed(&maj, triple(i))?;
    }
    b.cx(a.line(n - 1), y.line(n));
    for i in (0..n).rev() {
        b.embed(&uma, triple(i))?;
    }
    Ok(b.build())
}

/// Modular adder `(a, b) -> (a, (a + b) mod N)` for `0 <= a, b < N < 2^n`.
///
/// Layout: `a[n]`, `b[n+1]`, then ancillas `carry`, `modulus[n]`, `flag[1]`.
/// The top line of `b` must start at 0 and is 0 again at the end.
///
/// Stages: load `N`; add `a`; subtract `N` and copy the borrow into `flag`;
/// clear `modulus` unless the borrow is set and add it back; restore `modulus`;
/// subtract `a` and clear `flag` from the new borrow; add `a` again; unload `N`.
pub fn mod_adder(kind: AdderKind, n: usize, modulus: u64) -> Result<Circuit, RevError> {
    check_modulus(n, modulus)?;
    let adder = Arc::new(plain_adder(kind, n)?);
    let load = Arc::new(set_constant(n, modulus)?);
    let masked = Arc::new(neg_controlled_set_constant(n, modulus)?);

    let mut b = CircuitBuilder::new(format!("mod_add_{}_{}", kind, modulus));
    let a = b.data("a", n);
    let y = b.data("b", n + 1);
    let carry = b.ancilla("carry", adder_ancillas(kind, n));
    let m = b.ancilla("modulus", n);
    let flag = b.ancilla("flag", 1);

    let wire = |src: &[LineId]| -> Vec<LineId> {
        src.iter().copied().chain(y.lines()).chain(carry.lines()).collect()
    };
    let a_map = wire(&a.lines());
    let m_map = wire(&m.lines());
    let flag_map: Vec<LineId> = std::iter::once(flag.line(0)).chain(m.lines()).collect();
    let top = y.line(n);

    b.embed(&load, m.lines())?;
    b.embed(&adder, a_map.clone())?;
    b.embed_inverse(&adder, m_map.clone())?;
    b.cx(top, flag.line(0));
    b.embed(&masked, flag_map.clone())?;
    b.embed(&adder, m_map)?;
    b.embed(&masked, flag_map)?;
    b.embed_inverse(&adder, a_map.clone())?;
    b.mcx(flag.line(0), vec![Control::neg(top)])?;
    b.embed(&adder, a_map)?;
    b.embed(&load, m.lines())?;

    let circuit = b.build();
    debug!(
        name = circuit.name(),
        lines = circuit.num_lines(),
        ancillas = circuit.ancilla_count(),
        gates = circuit.gate_count(),
        "built modular adder"
    );
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{check_ancillas_clean, evaluate};
    use rstest::rstest;

    #[rstest]
    fn test_plain_adder_adds(#[values(AdderKind::Vbe, AdderKind::Cdkm)] kind: AdderKind) -> Result<(), RevError> {
        let n = 3;
        let adder = plain_adder(kind, n)?;
        assert_eq!(adder.ancilla_count(), adder_ancillas(kind, n));
        for a in 0..8u64 {
            for bv in 0..16u64 {
                let out = evaluate(&adder, &[("a", a), ("b", bv)])?;
                assert_eq!(out.read_register(adder.register("a")?), a);
                assert_eq!(out.read_register(adder.register("b")?), (a + bv) % 16);
                check_ancillas_clean(&adder, &out)?;
            }
        }
        Ok(())
    }

    #[rstest]
    fn test_inverse_adder_subtracts(#[values(AdderKind::Vbe, AdderKind::Cdkm)] kind: AdderKind) -> Result<(), RevError> {
        let sub = plain_adder(kind, 2)?.invert();
        let out = evaluate(&sub, &[("a", 3), ("b", 1)])?;
        assert_eq!(out.read_register(sub.register("b")?), (8 + 1 - 3) % 8);
        Ok(())
    }

    #[rstest]
    fn test_uma_forms_agree(#[values(1, 3)] n: usize) -> Result<(), RevError> {
        let two = cdkm_adder_with(n, UmaForm::TwoCnot)?;
        let three = cdkm_adder_with(n, UmaForm::ThreeCnot)?;
        assert_eq!(three.gate_count(), two.gate_count() + 3 * n);
        for a in 0..1u64 << n {
            for bv in 0..1u64 << (n + 1) {
                let out = evaluate(&three, &[("a", a), ("b", bv)])?;
                assert_eq!(out.read_register(three.register("a")?), a);
                assert_eq!(out.read_register(three.register("b")?), (a + bv) % (1 << (n + 1)));
                check_ancillas_clean(&three, &out)?;
                let reference = evaluate(&two, &[("a", a), ("b", bv)])?;
                assert_eq!(out, reference);
            }
        }
        Ok(())
    }

    #[test]
    fn test_single_bit_adders() -> Result<(), RevError> {
        for kind in [AdderKind::Vbe, AdderKind::Cdkm] {
            let adder = plain_adder(kind, 1)?;
            let out = evaluate(&adder, &[("a", 1), ("b", 1)])?;
            assert_eq!(out.read_register(adder.register("b")?), 2);
        }
        Ok(())
    }

    #[test]
    fn test_mod_adder_layout() -> Result<(), RevError> {
        let c = mod_adder(AdderKind::Vbe, 4, 11)?;
        assert_eq!(c.ancilla_count(), mod_adder_ancillas(AdderKind::Vbe, 4));
        assert_eq!(c.ancilla_count(), 9);
        let c = mod_adder(AdderKind::Cdkm, 4, 11)?;
        assert_eq!(c.ancilla_count(), 6);
        assert!(mod_adder(AdderKind::Cdkm, 3, 8).is_err());
        Ok(())
    }
}
