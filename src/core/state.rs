// src/core/state.rs

use super::error::LineId;
use super::register::Register;
use std::fmt;

/// Classical values of every line of a circuit: one computational basis state.
///
/// Reversible gate networks map basis states to basis states, so a bit vector is
/// all that is needed to check what a network computes. Used by the validation
/// helpers and by the synthesizer to confirm its own output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitState {
    bits: Vec<bool>,
}

impl BitState {
    /// All-zero state over `num_lines` lines.
    pub fn zeros(num_lines: usize) -> Self {
        Self { bits: vec![false; num_lines] }
    }

    /// State built from explicit line values.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub(crate) fn bits_mut(&mut self) -> &mut [bool] {
        &mut self.bits
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, line: LineId) -> bool {
        self.bits[line.0]
    }

    pub fn set(&mut self, line: LineId, value: bool) {
        self.bits[line.0] = value;
    }

    /// Reads `lines` as an unsigned integer, `lines[0]` being the least significant bit.
    /// Lines past the 64th are ignored, matching `write`.
    pub fn read(&self, lines: &[LineId]) -> u64 {
        lines
            .iter()
            .take(64)
            .enumerate()
            .filter(|(_, l)| self.bits[l.0])
            .fold(0u64, |acc, (i, _)| acc | (1u64 << i))
    }

    /// Writes `value` into `lines`, `lines[0]` receiving the least significant bit.
    /// Bits of `value` beyond `lines.len()` are ignored.
    pub fn write(&mut self, lines: &[LineId], value: u64) {
        for (i, l) in lines.iter().enumerate() {
            self.bits[l.0] = i < 64 && (value >> i) & 1 == 1;
        }
    }

    pub fn read_register(&self, register: &Register) -> u64 {
        self.read(&register.lines())
    }

    pub fn write_register(&mut self, register: &Register, value: u64) {
        self.write(&register.lines(), value);
    }

    /// Whether every line of `register` is zero.
    pub fn is_register_clear(&self, register: &Register) -> bool {
        register.lines().iter().all(|l| !self.bits[l.0])
    }
}

impl fmt::Display for BitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|")?;
        // Most significant line first, like a ket.
        for b in self.bits.iter().rev() {
            write!(f, "{}", if *b { '1' } else { '0' })?;
        }
        write!(f, ">")
    }
}
