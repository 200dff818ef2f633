// src/windowed/tables.rs

//! Classical tables fed to lookup circuits.
//!
//! All tables have `2^w` entries indexed by a window value. Entries are reduced
//! modulo `N`, except the coset offsets of `offset_table`.

use crate::classical::{mod_mul, mod_pow, pow2_power};
use crate::core::RevError;

/// `table[d] = a^d mod N`. With `only_odd`, even entries are left at 0.
pub fn exp_table(w: usize, a: u64, modulus: u64, only_odd: bool) -> Vec<u64> {
    (0..1u64 << w)
        .map(|d| if only_odd && d % 2 == 0 { 0 } else { mod_pow(a, d, modulus) })
        .collect()
}

/// `table[d] = a * d mod N`.
pub fn mult_table(w: usize, a: u64, modulus: u64) -> Vec<u64> {
    (0..1u64 << w).map(|d| mod_mul(a % modulus, d, modulus)).collect()
}

/// `table[j] = j * k * 2^shift mod N`: the contribution of a window at bit `shift`.
pub fn window_product_table(w: usize, k: u64, shift: usize, modulus: u64) -> Vec<u64> {
    let scaled = mod_mul(k % modulus, mod_pow(2, shift as u64, modulus), modulus);
    mult_table(w, scaled, modulus)
}

/// Table over an exponent window (high `we` index bits, value `e`) and a
/// multiplicand window (low `wm` bits, value `m`):
/// `k^(2^exp_shift * e) * m * 2^mult_shift mod N`.
pub fn exp_window_table(we: usize, wm: usize, k: u64, exp_shift: usize, mult_shift: usize, modulus: u64) -> Vec<u64> {
    let base = pow2_power(k, exp_shift, modulus);
    let shift = mod_pow(2, mult_shift as u64, modulus);
    let mut table = Vec::with_capacity(1usize << (we + wm));
    for e in 0..1u64 << we {
        let factor = mod_mul(mod_pow(base, e, modulus), shift, modulus);
        for m in 0..1u64 << wm {
            table.push(mod_mul(factor, m, modulus));
        }
    }
    table
}

/// `table[j] = j * 2^shift * N`, unreduced: the constant offsets that move a
/// residue into its coset when added under control of a padding window at bit `shift`.
///
/// Fails when an entry does not fit a `u64`.
pub fn offset_table(w: usize, shift: usize, modulus: u64) -> Result<Vec<u64>, RevError> {
    (0..1u64 << w)
        .map(|j| {
            j.checked_mul(modulus)
                .and_then(|v| if shift < 64 && v.leading_zeros() as usize >= shift { Some(v << shift) } else { None })
                .ok_or_else(|| {
                    RevError::parameter(format!(
                        "offset {} * 2^{} * {} does not fit in 64 bits",
                        j, shift, modulus
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tables() {
        assert_eq!(exp_table(2, 3, 31, false), vec![1, 3, 9, 27]);
        assert_eq!(exp_table(2, 3, 31, true), vec![0, 3, 0, 27]);
        assert_eq!(mult_table(3, 2, 31), vec![0, 2, 4, 6, 8, 10, 12, 14]);
        assert_eq!(window_product_table(2, 3, 2, 7), vec![0, 5, 3, 1]);
    }

    #[test]
    fn test_offset_table() -> Result<(), RevError> {
        assert_eq!(offset_table(2, 0, 7)?, vec![0, 7, 14, 21]);
        assert_eq!(offset_table(2, 3, 5)?, vec![0, 40, 80, 120]);
        assert!(offset_table(2, 62, 7).is_err());
        Ok(())
    }

    #[test]
    fn test_exp_window_layout() {
        // e in the high bit, m in the low two bits
        let t = exp_window_table(1, 2, 2, 1, 0, 7);
        assert_eq!(t, vec![0, 1, 2, 3, 0, 4, 1, 5]);
    }
}
