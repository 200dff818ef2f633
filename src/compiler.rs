// src/compiler.rs

//! The `Compiler` facade: one configuration plus a memo of synthesized lookups.
//!
//! Lookup synthesis is the expensive step and depends only on the table and the
//! backend, so identical tables requested by different windows, passes or
//! calls are synthesized once and shared through an `Arc`.

use crate::adders::{mod_adder, plain_adder};
use crate::circuits::Circuit;
use crate::config::{CompilerConfig, Optimization};
use crate::core::RevError;
use crate::multiplier::{c_mult_mod, exp_mod};
use crate::windowed::{lookup, LookupTable};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::trace;

type LookupKey = (LookupTable, Optimization);

/// Builds arithmetic circuits under one `CompilerConfig`.
///
/// Safe to share between threads; the lookup memo is behind a mutex.
#[derive(Debug, Default)]
pub struct Compiler {
    config: CompilerConfig,
    lookups: Mutex<HashMap<LookupKey, Arc<Circuit>>>,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config, lookups: Mutex::new(HashMap::new()) }
    }

    pub fn config(&self) -> CompilerConfig {
        self.config
    }

    /// Number of distinct lookup circuits synthesized so far.
    pub fn cached_lookups(&self) -> usize {
        self.lookups.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Lookup circuit for `table` with the configured backend, memoized.
    pub fn lookup(&self, table: &LookupTable) -> Result<Arc<Circuit>, RevError> {
        let key = (table.clone(), self.config.optimization);
        if let Some(hit) = self.lookups.lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
            trace!(index_bits = table.index_bits(), "lookup cache hit");
            return Ok(Arc::clone(hit));
        }
        // Built outside the lock; a concurrent miss on the same key only duplicates work.
        let circuit = Arc::new(lookup(table, self.config.optimization)?);
        let mut cache = self.lookups.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(key).or_insert(circuit)))
    }

    /// `plain_adder` with the configured adder scheme.
    pub fn plain_adder(&self, n: usize) -> Result<Circuit, RevError> {
        plain_adder(self.config.adder, n)
    }

    /// `mod_adder` with the configured adder scheme.
    pub fn mod_adder(&self, n: usize, modulus: u64) -> Result<Circuit, RevError> {
        mod_adder(self.config.adder, n, modulus)
    }

    /// `c_mult_mod` with the configured adder scheme.
    pub fn c_mult_mod(&self, n: usize, a: u64, modulus: u64) -> Result<Circuit, RevError> {
        c_mult_mod(self.config.adder, n, a, modulus)
    }

    /// `exp_mod` with the configured adder scheme.
    pub fn exp_mod(&self, n: usize, a: u64, modulus: u64) -> Result<Circuit, RevError> {
        exp_mod(self.config.adder, n, a, modulus)
    }
}
