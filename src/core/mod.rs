// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod register;
pub mod state;

// Re-export public types for convenient access via `revarith::core::TypeName`
pub use error::{LineId, RevError};
pub use register::{Register, RegisterRole};
pub use state::BitState;

pub mod constants;
pub use constants::limits::{MAX_REGISTER_WIDTH, MAX_SYNTHESIS_INPUTS};
