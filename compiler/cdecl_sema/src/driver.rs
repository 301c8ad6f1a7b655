//! Analysis of many independent units at once.
//!
//! Each unit gets its own scope tree rooted at a fresh global scope; all of
//! them read the same frozen `Seed` and the same `SharedInterner`. Results
//! come back in input order regardless of scheduling.

use std::sync::Arc;

use cdecl_ir::{Record, SharedInterner};
use rayon::prelude::*;

use crate::config::ResolverConfig;
use crate::resolver::{analyze_unit, UnitAnalysis};
use crate::seed::Seed;

/// Worker stack size. Deeply nested scope trees recurse when snapshotted.
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Analyze every unit in `units` against `seed`, in parallel.
#[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
pub fn analyze_units(
    units: &[Vec<Record>],
    seed: &Arc<Seed>,
    interner: &SharedInterner,
    config: &ResolverConfig,
) -> Vec<UnitAnalysis> {
    if units.len() < 2 {
        return analyze_units_sequential(units, seed, interner, config);
    }

    // A scoped pool is torn down before returning, so no worker outlives
    // the borrowed records.
    rayon::ThreadPoolBuilder::new()
        .stack_size(WORKER_STACK_SIZE)
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| {
                units
                    .par_iter()
                    .map(|records| analyze_unit(records, Arc::clone(seed), interner, config))
                    .collect::<Vec<_>>()
            })
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), analyzing sequentially");
            analyze_units_sequential(units, seed, interner, config)
        })
}

/// Analyze every unit on the calling thread, in order.
pub fn analyze_units_sequential(
    units: &[Vec<Record>],
    seed: &Arc<Seed>,
    interner: &SharedInterner,
    config: &ResolverConfig,
) -> Vec<UnitAnalysis> {
    units
        .iter()
        .map(|records| analyze_unit(records, Arc::clone(seed), interner, config))
        .collect()
}

#[cfg(test)]
mod tests;
