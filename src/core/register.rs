// src/core/register.rs

use super::error::LineId;
use std::fmt;
use std::ops::Range;

/// Whether a register carries caller data or borrowed scratch space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterRole {
    /// Operand or result lines, visible to the caller.
    Data,
    /// Scratch lines: zero on entry, and zero again when the circuit ends.
    Ancilla,
}

/// A named, contiguous, fixed-width group of lines.
///
/// Registers of one circuit never overlap. The width is fixed when the register
/// is declared and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Register {
    name: String,
    offset: usize,
    width: usize,
    role: RegisterRole,
}

impl Register {
    pub(crate) fn new(name: impl Into<String>, offset: usize, width: usize, role: RegisterRole) -> Self {
        Self { name: name.into(), offset, width, role }
    }

    /// Register name, unique inside its circuit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of lines.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Flat index of the first line.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn role(&self) -> RegisterRole {
        self.role
    }

    pub fn is_ancilla(&self) -> bool {
        self.role == RegisterRole::Ancilla
    }

    /// The `i`-th line (bit `i`, least significant first).
    ///
    /// # Panics
    /// Panics if `i >= width`; register offsets are programmer-controlled.
    pub fn line(&self, i: usize) -> LineId {
        assert!(i < self.width, "line {} out of range for register '{}' of width {}", i, self.name, self.width);
        LineId(self.offset + i)
    }

    /// All lines, least significant first.
    pub fn lines(&self) -> Vec<LineId> {
        (self.offset..self.offset + self.width).map(LineId).collect()
    }

    /// Lines of the bit range `range` (clamped to the register width).
    pub fn slice(&self, range: Range<usize>) -> Vec<LineId> {
        let end = range.end.min(self.width);
        (range.start.min(end)..end).map(|i| LineId(self.offset + i)).collect()
    }

    /// Whether `line` belongs to this register.
    pub fn contains(&self, line: LineId) -> bool {
        line.0 >= self.offset && line.0 < self.offset + self.width
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.role {
            RegisterRole::Data => "",
            RegisterRole::Ancilla => " (ancilla)",
        };
        write!(f, "{}[{}]{}", self.name, self.width, kind)
    }
}
