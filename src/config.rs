// src/config.rs

//! Construction-time choices: which ripple-carry adder, which lookup backend.
//!
//! Plain values passed by the caller; nothing here is global.

use std::fmt;

/// Ripple-carry scheme used by every adder-based block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdderKind {
    /// Carry-register adder: `n` carry ancillas.
    Vbe,
    /// MAJ/UMA in-place adder: one carry ancilla.
    #[default]
    Cdkm,
}

impl fmt::Display for AdderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdderKind::Vbe => write!(f, "VBE"),
            AdderKind::Cdkm => write!(f, "CDKM"),
        }
    }
}

/// Backend used to turn a lookup table into gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Optimization {
    /// One fully controlled NOT per set output bit per table entry.
    Naive,
    /// Spectral Reed-Muller synthesis per output bit, cheapest candidate kept.
    #[default]
    Spectral,
    /// Permutation (hypercube) synthesis of the padded table on scratch lines.
    Hypercube,
}

impl fmt::Display for Optimization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Optimization::Naive => write!(f, "naive"),
            Optimization::Spectral => write!(f, "spectral"),
            Optimization::Hypercube => write!(f, "hypercube"),
        }
    }
}

/// Settings shared by all constructors of a `Compiler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompilerConfig {
    pub adder: AdderKind,
    pub optimization: Optimization,
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adder(mut self, adder: AdderKind) -> Self {
        self.adder = adder;
        self
    }

    pub fn with_optimization(mut self, optimization: Optimization) -> Self {
        self.optimization = optimization;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pick_low_resource_choices() {
        let config = CompilerConfig::default();
        assert_eq!(config.adder, AdderKind::Cdkm);
        assert_eq!(config.optimization, Optimization::Spectral);
        let vbe = config.with_adder(AdderKind::Vbe).with_optimization(Optimization::Naive);
        assert_eq!((vbe.adder, vbe.optimization), (AdderKind::Vbe, Optimization::Naive));
    }
}
