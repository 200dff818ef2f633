// src/classical/mod.rs

//! Classical number theory behind the circuit constants, and parameter checks.
//!
//! Everything here runs at construction time on plain integers. Products are
//! taken in `u128`, so any modulus up to `2^MAX_REGISTER_WIDTH` is exact.

use crate::core::{RevError, MAX_REGISTER_WIDTH, MAX_SYNTHESIS_INPUTS};
use num_integer::Integer;
use num_traits::PrimInt;

/// Number of bits needed to write `value` (0 for 0).
pub fn bit_length<T: PrimInt>(value: T) -> usize {
    (T::zero().count_zeros() - value.leading_zeros()) as usize
}

/// `(a * b) mod modulus` without overflow.
pub fn mod_mul(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

/// `base^exp mod modulus` by square-and-multiply.
pub fn mod_pow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result = 1u64;
    let mut b = base % modulus;
    while exp > 0 {
        if exp.is_odd() {
            result = mod_mul(result, b, modulus);
        }
        b = mod_mul(b, b, modulus);
        exp >>= 1;
    }
    result
}

/// `a^(2^i) mod modulus`, by squaring `i` times.
pub fn pow2_power(a: u64, i: usize, modulus: u64) -> u64 {
    (0..i).fold(a % modulus, |acc, _| mod_mul(acc, acc, modulus))
}

/// Multiplicative inverse of `value` modulo `modulus`.
///
/// Fails with `RevError::InverseNotDefined` when `gcd(value, modulus) != 1`.
pub fn mod_inverse(value: u64, modulus: u64) -> Result<u64, RevError> {
    let (v, m) = (value as i128, modulus as i128);
    let egcd = v.extended_gcd(&m);
    if modulus == 0 || egcd.gcd != 1 {
        return Err(RevError::InverseNotDefined { value, modulus });
    }
    Ok(egcd.x.rem_euclid(m) as u64)
}

/// Whether `a` and `b` share no factor.
pub fn coprime(a: u64, b: u64) -> bool {
    a.gcd(&b) == 1
}

/// Checks a register width against a modulus: `1 <= n <= 32`, `N >= 2` and `2^n > N`.
pub fn check_modulus(n: usize, modulus: u64) -> Result<(), RevError> {
    if n == 0 || n > MAX_REGISTER_WIDTH {
        return Err(RevError::parameter(format!(
            "register width {} outside 1..={}",
            n, MAX_REGISTER_WIDTH
        )));
    }
    if modulus < 2 {
        return Err(RevError::parameter(format!("modulus {} must be at least 2", modulus)));
    }
    if bit_length(modulus) > n {
        return Err(RevError::parameter(format!(
            "modulus {} needs {} bits, register has {}",
            modulus,
            bit_length(modulus),
            n
        )));
    }
    Ok(())
}

/// Checks a window width against the width of the operand it slices.
pub fn check_window(w: usize, n: usize) -> Result<(), RevError> {
    if w == 0 || w > n {
        return Err(RevError::parameter(format!("window width {} outside 1..={}", w, n)));
    }
    if w > MAX_SYNTHESIS_INPUTS {
        return Err(RevError::parameter(format!(
            "window width {} exceeds the lookup limit of {} inputs",
            w, MAX_SYNTHESIS_INPUTS
        )));
    }
    Ok(())
}

/// Checks a plain register width (no modulus involved).
pub fn check_width(n: usize) -> Result<(), RevError> {
    if n == 0 || n > MAX_REGISTER_WIDTH {
        return Err(RevError::parameter(format!(
            "register width {} outside 1..={}",
            n, MAX_REGISTER_WIDTH
        )));
    }
    Ok(())
}
