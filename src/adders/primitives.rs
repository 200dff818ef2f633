// src/adders/primitives.rs

//! Small register-level blocks: constant set/reset, controlled copy, swap.
//!
//! Each block is its own inverse, so the same circuit both sets and resets.

use crate::circuits::{Circuit, CircuitBuilder};
use crate::classical::{bit_length, check_width};
use crate::core::RevError;
use crate::operations::Control;

fn check_fits(n: usize, value: u64) -> Result<(), RevError> {
    check_width(n)?;
    if bit_length(value) > n {
        return Err(RevError::parameter(format!("constant {} does not fit in {} bits", value, n)));
    }
    Ok(())
}

fn set_bits(n: usize, value: u64) -> impl Iterator<Item = usize> {
    (0..n).filter(move |i| (value >> i) & 1 == 1)
}

/// `r ^= value` on an `n`-line register `r`. One NOT per set bit.
pub fn set_constant(n: usize, value: u64) -> Result<Circuit, RevError> {
    check_fits(n, value)?;
    let mut b = CircuitBuilder::new(format!("set_{}", value));
    let r = b.data("r", n);
    for i in set_bits(n, value) {
        b.x(r.line(i));
    }
    Ok(b.build())
}

/// `r ^= value` when control `c` is 0. Layout: `c[1]`, `r[n]`.
pub fn neg_controlled_set_constant(n: usize, value: u64) -> Result<Circuit, RevError> {
    check_fits(n, value)?;
    let mut b = CircuitBuilder::new(format!("nc_set_{}", value));
    let c = b.data("c", 1);
    let r = b.data("r", n);
    for i in set_bits(n, value) {
        b.mcx(r.line(i), vec![Control::neg(c.line(0))])?;
    }
    Ok(b.build())
}

/// `r ^= value` when both controls are 1. Layout: `c[2]`, `r[n]`.
pub fn doubly_controlled_set_constant(n: usize, value: u64) -> Result<Circuit, RevError> {
    check_fits(n, value)?;
    let mut b = CircuitBuilder::new(format!("cc_set_{}", value));
    let c = b.data("c", 2);
    let r = b.data("r", n);
    for i in set_bits(n, value) {
        b.ccx(c.line(0), c.line(1), r.line(i));
    }
    Ok(b.build())
}

/// `dst ^= src` when `c` is 1 (or 0 when `negative`). Layout: `c[1]`, `src[n]`, `dst[n]`.
pub fn controlled_copy(n: usize, negative: bool) -> Result<Circuit, RevError> {
    check_width(n)?;
    let name = if negative { "nc_copy" } else { "c_copy" };
    let mut b = CircuitBuilder::new(name);
    let c = b.data("c", 1);
    let src = b.data("src", n);
    let dst = b.data("dst", n);
    for i in 0..n {
        let ctrl = Control::with_polarity(c.line(0), !negative);
        b.mcx(dst.line(i), vec![ctrl, Control::pos(src.line(i))])?;
    }
    Ok(b.build())
}

/// Exchanges two `n`-line registers with three CNOTs per bit. Layout: `a[n]`, `b[n]`.
pub fn swap_registers(n: usize) -> Result<Circuit, RevError> {
    check_width(n)?;
    let mut b = CircuitBuilder::new("swap");
    let x = b.data("a", n);
    let y = b.data("b", n);
    for i in 0..n {
        b.cx(x.line(i), y.line(i)).cx(y.line(i), x.line(i)).cx(x.line(i), y.line(i));
    }
    Ok(b.build())
}
