// src/synthesis/hypercube.rs

//! Transformation-based synthesis of bijective tables.
//!
//! Positions are fixed from the top of the domain down. For position `i` holding
//! value `v != i`, the bits where `v` and `i` differ are flipped in ascending
//! order, each by a fully controlled NOT that exchanges the current value with
//! its neighbour on the hypercube. Every intermediate value stays below `i`, so
//! positions above `i` are never disturbed.

use crate::circuits::{Circuit, CircuitBuilder};
use crate::classical::bit_length;
use crate::core::{LineId, RevError, MAX_SYNTHESIS_INPUTS};
use crate::operations::{Control, Gate};
use std::collections::HashMap;
use tracing::trace;

/// A table turned into a permutation of `0..2^lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedPermutation {
    /// `permutation[i]` is the image of `i`.
    pub permutation: Vec<u64>,
    /// Width of the permutation domain.
    pub lines: usize,
    /// Width of the original values; the low `value_bits` bits of
    /// `permutation[i]` are the table entry for every original index `i`.
    pub value_bits: usize,
    /// High bits added to tell repeated values apart.
    pub padding_bits: usize,
}

/// Embeds `values` (entries of `value_bits` bits) into a permutation.
///
/// The `k`-th repeat of a value gets `k` written into padding bits above
/// `value_bits`. Indices beyond the table are filled with the unused values in
/// ascending order.
pub fn pad_to_permutation(values: &[u64], value_bits: usize) -> Result<PaddedPermutation, RevError> {
    if values.is_empty() || !values.len().is_power_of_two() {
        return Err(RevError::parameter(format!(
            "table length {} is not a power of two",
            values.len()
        )));
    }
    let index_bits = values.len().trailing_zeros() as usize;
    if let Some(v) = values.iter().find(|&&v| bit_length(v) > value_bits) {
        return Err(RevError::parameter(format!("table value {} does not fit in {} bits", v, value_bits)));
    }

    // Size the padding before shifting any value into it.
    let mut repeats: HashMap<u64, u64> = HashMap::new();
    for &v in values {
        *repeats.entry(v).or_insert(0) += 1;
    }
    let max_repeat = repeats.values().copied().max().unwrap_or(1);
    let padding_bits = bit_length(max_repeat - 1);
    let lines = (value_bits + padding_bits).max(index_bits);
    if lines > MAX_SYNTHESIS_INPUTS {
        return Err(RevError::parameter(format!(
            "padded permutation needs {} lines, limit is {}",
            lines, MAX_SYNTHESIS_INPUTS
        )));
    }

    let mut seen: HashMap<u64, u64> = HashMap::new();
    let mut padded = Vec::with_capacity(values.len());
    for &v in values {
        let count = seen.entry(v).or_insert(0);
        padded.push((*count << value_bits) | v);
        *count += 1;
    }

    let mut used = vec![false; 1usize << lines];
    for &p in &padded {
        used[p as usize] = true;
    }
    let mut free = (0..1u64 << lines).filter(|&v| !used[v as usize]);
    while padded.len() < 1usize << lines {
        match free.next() {
            Some(v) => padded.push(v),
            None => {
                return Err(RevError::SynthesisInvariantViolation {
                    message: "ran out of free values while padding a permutation".to_string(),
                });
            }
        }
    }

    Ok(PaddedPermutation { permutation: padded, lines, value_bits, padding_bits })
}

/// Gate list realizing `permutation` on `lines` lines (`line[k]` = bit `k`).
pub fn permutation_gates(permutation: &[u64], lines: usize) -> Result<Vec<Gate>, RevError> {
    let size = 1usize << lines;
    if permutation.len() != size {
        return Err(RevError::parameter(format!(
            "permutation has {} entries, expected {}",
            permutation.len(),
            size
        )));
    }
    let mut seen = vec![false; size];
    for &v in permutation {
        if v as usize >= size || std::mem::replace(&mut seen[v as usize], true) {
            return Err(RevError::parameter(format!("table is not a permutation of 0..{}", size)));
        }
    }

    let mut current: Vec<u64> = permutation.to_vec();
    let mut position: Vec<usize> = vec![0; size];
    for (i, &v) in current.iter().enumerate() {
        position[v as usize] = i;
    }

    let mut gates = Vec::new();
    for i in (0..size).rev() {
        let mut value = current[i];
        let target = i as u64;
        let diff = value ^ target;
        for j in (0..lines).filter(|j| (diff >> j) & 1 == 1) {
            let next = value ^ (1 << j);
            let controls = (0..lines)
                .filter(|&k| k != j)
                .map(|k| Control::with_polarity(LineId(k), (value >> k) & 1 == 1))
                .collect();
            gates.push(Gate::new(LineId(j), controls)?);

            // The gate exchanges the outputs `value` and `next`.
            let (p, q) = (position[value as usize], position[next as usize]);
            current.swap(p, q);
            position.swap(value as usize, next as usize);
            value = next;
        }
    }
    gates.reverse();
    trace!(lines, gates = gates.len(), "hypercube permutation synthesized");
    Ok(gates)
}

/// Circuit over one data register `q[lines]` mapping each basis value `i` to `permutation[i]`.
pub fn permutation_circuit(permutation: &[u64], lines: usize) -> Result<Circuit, RevError> {
    let gates = permutation_gates(permutation, lines)?;
    let mut b = CircuitBuilder::new("hypercube");
    b.data("q", lines);
    for gate in gates {
        b.gate(gate)?;
    }
    Ok(b.build())
}
