//! Limits shared by the circuit constructors.

/// Size limits enforced at construction time.
pub mod limits {
    /// Widest arithmetic register. Classical values fit a `u64`, products a `u128`.
    pub const MAX_REGISTER_WIDTH: usize = 32;
    /// Most inputs a truth table or lookup index may have (65536 entries).
    pub const MAX_SYNTHESIS_INPUTS: usize = 16;
}
