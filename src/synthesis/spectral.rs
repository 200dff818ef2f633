// src/synthesis/spectral.rs

//! Recursive spectral (Walsh) decomposition of a truth table into an XOR of
//! product terms.

use super::{Literal, Term};

/// In-place fast Walsh-Hadamard transform. `signal.len()` must be a power of two.
pub fn walsh_hadamard(signal: &mut [i64]) {
    let mut h = 1;
    while h < signal.len() {
        for start in (0..signal.len()).step_by(2 * h) {
            for i in start..start + h {
                let (u, v) = (signal[i], signal[i + h]);
                signal[i] = u + v;
                signal[i + h] = u - v;
            }
        }
        h *= 2;
    }
}

/// Walsh spectrum of a boolean table under the `0 -> +1`, `1 -> -1` encoding.
///
/// Coefficient `w` counts agreements minus disagreements between the table and
/// the parity of the inputs selected by `w`.
pub fn spectrum(table: &[bool]) -> Vec<i64> {
    let mut signal: Vec<i64> = table.iter().map(|&b| if b { -1 } else { 1 }).collect();
    walsh_hadamard(&mut signal);
    signal
}

/// Decomposes `table` (index bit `k` = variable `k`) into product terms whose XOR
/// equals the table.
pub fn decompose(table: &[bool], num_inputs: usize) -> Vec<Term> {
    let vars: Vec<usize> = (0..num_inputs).collect();
    decompose_on(table, &vars)
}

/// Minterm for local index `idx` over `vars`.
fn minterm(idx: usize, vars: &[usize]) -> Term {
    Term::new(
        vars.iter()
            .enumerate()
            .map(|(k, &var)| Literal { var, positive: (idx >> k) & 1 == 1 })
            .collect(),
    )
}

/// `table` has `2^vars.len()` entries; local index bit `k` is variable `vars[k]`.
fn decompose_on(table: &[bool], vars: &[usize]) -> Vec<Term> {
    let ones = table.iter().filter(|&&b| b).count();
    if ones == 0 {
        return Vec::new();
    }
    if ones == table.len() {
        return vec![Term::one()];
    }
    if ones == 1 {
        let idx = table.iter().position(|&b| b).unwrap_or(0);
        return vec![minterm(idx, vars)];
    }

    let k = vars.len();
    let half = table.len() / 2;
    let (top, rest) = (vars[k - 1], &vars[..k - 1]);
    if table[..half] == table[half..] {
        return decompose_on(&table[..half], rest);
    }

    // Best affine approximation: the first coefficient of largest magnitude.
    let coefficients = spectrum(table);
    let (w, s) = coefficients
        .iter()
        .enumerate()
        .fold((0usize, 0i64), |best, (w, &s)| if s.abs() > best.1.abs() { (w, s) } else { best });
    let complement = s < 0;

    let mut terms: Vec<Term> = Vec::new();
    if w == 0 {
        if complement {
            terms.push(Term::one());
        }
    } else {
        // Complementing the first literal complements the whole parity.
        for (pos, bit) in (0..k).filter(|b| (w >> b) & 1 == 1).enumerate() {
            let positive = !(complement && pos == 0);
            terms.push(Term::new(vec![Literal { var: vars[bit], positive }]));
        }
    }

    let residual: Vec<bool> = table
        .iter()
        .enumerate()
        .map(|(idx, &b)| b ^ ((idx & w).count_ones() % 2 == 1) ^ complement)
        .collect();
    let left = residual.iter().filter(|&&b| b).count();
    if left == 0 {
        return terms;
    }
    if left == 1 {
        let idx = residual.iter().position(|&b| b).unwrap_or(0);
        terms.push(minterm(idx, vars));
        return terms;
    }

    // residual = top' * low  xor  top * high
    let low = decompose_on(&residual[..half], rest);
    let high = decompose_on(&residual[half..], rest);
    terms.extend(low.into_iter().map(|t| t.with(Literal { var: top, positive: false })));
    terms.extend(high.into_iter().map(|t| t.with(Literal { var: top, positive: true })));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walsh_of_parity_is_a_single_spike() {
        let table: Vec<bool> = (0..8usize).map(|i| (i & 0b101).count_ones() % 2 == 1).collect();
        let s = spectrum(&table);
        for (w, &c) in s.iter().enumerate() {
            assert_eq!(c, if w == 0b101 { 8 } else { 0 });
        }
    }

    #[test]
    fn test_transform_twice_scales() {
        let mut signal = vec![3, -1, 4, 1, -5, 9, 2, -6];
        let original = signal.clone();
        walsh_hadamard(&mut signal);
        walsh_hadamard(&mut signal);
        let scaled: Vec<i64> = original.iter().map(|v| v * 8).collect();
        assert_eq!(signal, scaled);
    }

    #[test]
    fn test_complemented_parity_is_exact() {
        // not(x0 xor x1) has spectrum -4 at w = 0b11
        let table = vec![true, false, false, true];
        let terms = decompose(&table, 2);
        for (idx, &expected) in table.iter().enumerate() {
            let value = terms.iter().fold(false, |acc, t| acc ^ t.evaluate(idx));
            assert_eq!(value, expected);
        }
        assert_eq!(terms.len(), 2);
    }
}
