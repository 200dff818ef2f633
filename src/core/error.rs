//! Error handling logic

use std::fmt;

/// Unique identifier for a line (one boolean storage cell) of a circuit.
/// The index is flat: it is only meaningful inside the circuit that declared it,
/// and is remapped, never aliased, when that circuit is embedded elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub usize);

impl LineId {
    /// Index of the line inside its circuit.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// Failures surfaced while building arithmetic circuits.
///
/// Every condition is a deterministic function of the classical inputs, so none
/// of them is retried: the caller gets the typed error and no partial circuit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevError {
    /// A classical parameter is out of range: a register too narrow for the
    /// modulus, a window of width zero or wider than its operand, and so on.
    #[error("Parameter Error: {message}")]
    Parameter {
        /// Parameter failure message
        message: String,
    },

    /// A modular inverse was requested for a value sharing a factor with the modulus.
    #[error("Inverse Not Defined: {value} has no inverse modulo {modulus}")]
    InverseNotDefined {
        /// Value whose inverse was requested
        value: u64,
        /// Modulus of the request
        modulus: u64,
    },

    /// The boolean decomposition produced a network that disagrees with its table.
    /// This never happens for a well-formed total function and points at a bug.
    #[error("Synthesis Invariant Violation: {message}")]
    SynthesisInvariantViolation {
        /// SynthesisInvariantViolation failure message
        message: String,
    },

    /// A sub-circuit was embedded with a non-injective or incomplete line map,
    /// or two circuits with different line spaces were sequenced.
    #[error("Composition Error: {message}")]
    Composition {
        /// Composition failure message
        message: String,
    },

    /// A gate references a line twice or a line outside its circuit.
    #[error("Invalid Gate: {message}")]
    InvalidGate {
        /// InvalidGate failure message
        message: String,
    },

    /// A circuit failed a classical check: dirty ancilla, wrong output.
    #[error("Validation Error: {message}")]
    Validation {
        /// Validation failure message
        message: String,
    },

    /// A persisted circuit description could not be parsed.
    #[error("Format Error (line {line}): {message}")]
    Format {
        /// 1-based line number of the offending text
        line: usize,
        /// Format failure message
        message: String,
    },
}

impl RevError {
    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        RevError::Parameter { message: message.into() }
    }

    pub(crate) fn composition(message: impl Into<String>) -> Self {
        RevError::Composition { message: message.into() }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        RevError::Validation { message: message.into() }
    }

    pub(crate) fn invalid_gate(message: impl Into<String>) -> Self {
        RevError::InvalidGate { message: message.into() }
    }
}
