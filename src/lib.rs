// src/lib.rs

//! `revarith` - A compiler for reversible integer arithmetic
//!
//! This library builds, as data, networks of multi-controlled NOT gates that
//! implement modular addition, controlled modular multiplication and modular
//! exponentiation over fixed-width registers, plus the windowed variants that
//! replace runs of controlled additions by table lookups synthesized from
//! their truth tables.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod classical;
pub mod config;
pub mod adders;
pub mod multiplier;
pub mod synthesis;
pub mod windowed;
pub mod compiler;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{BitState, LineId, Register, RegisterRole, RevError};
pub use operations::{Control, Gate, Operation};
pub use circuits::{AncillaArena, Circuit, CircuitBuilder};
pub use circuits::tfc::{from_tfc, to_tfc};
pub use config::{AdderKind, CompilerConfig, Optimization};
pub use compiler::Compiler;
pub use adders::{mod_adder, plain_adder};
pub use multiplier::{c_mult_mod, exp_mod};
pub use synthesis::{synthesize, Esop, SynthesisResult, TruthTable};
pub use windowed::{lookup, LookupTable};
pub use validation::{check_ancillas_clean, check_truth_table, evaluate, Evaluator};

// Example 1: Modular addition
// Builds a 4-bit modular adder for N = 11 and checks one input classically.
/// ```
/// use revarith::{mod_adder, evaluate, check_ancillas_clean, AdderKind, RevError};
///
/// # fn main() -> Result<(), RevError> {
/// let adder = mod_adder(AdderKind::Cdkm, 4, 11)?;
/// println!("{:?}", adder);
///
/// // (7 + 9) mod 11 = 5
/// let out = evaluate(&adder, &[("a", 7), ("b", 9)])?;
/// assert_eq!(out.read_register(adder.register("b")?), 5);
/// assert_eq!(out.read_register(adder.register("a")?), 7);
/// check_ancillas_clean(&adder, &out)?;
/// # Ok(())
/// # }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Windowed multiplication and a synthesized lookup
// Multiplies a register in place by 3 modulo 7 with 2-bit windows, then
// prints one of the lookup circuits in TFC form.
/// ```
/// use revarith::{Compiler, CompilerConfig, LookupTable, Optimization, RevError, evaluate, to_tfc};
///
/// # fn main() -> Result<(), RevError> {
/// let compiler = Compiler::new(CompilerConfig::default().with_optimization(Optimization::Spectral));
/// let mult = compiler.win_mult_mod(7, 2, 3, 3)?;
/// let out = evaluate(&mult, &[("a", 5)])?;
/// assert_eq!(out.read_register(mult.register("a")?), 1); // 5 * 3 = 15 = 1 mod 7
///
/// let table = LookupTable::new(2, 3, vec![0, 3, 6, 2])?;
/// let text = to_tfc(&*compiler.lookup(&table)?);
/// assert!(text.contains("BEGIN"));
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
