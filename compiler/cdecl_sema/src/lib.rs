//! Semantic resolution of C-family literals and declarations.
//!
//! This crate contains:
//! - `LiteralClassifier`: canonical type and value of integer, character
//!   and floating literals
//! - `ScopeTree`: nested scopes, shadowing, qualified lookup and labels
//! - `NarrowingChecker`: brace-list narrowing rules
//! - `deduce`: `auto` and `decltype` deduction
//! - `analyze_unit` / `analyze_units`: the record pipeline for one unit, and
//!   for many units in parallel against a shared `Seed`
//!
//! # Tracing
//!
//! Set `RUST_LOG=cdecl_sema=debug` and call [`init_tracing`] to see unit
//! summaries and recovered errors; `trace` adds every scope push/pop and
//! declaration.

use std::sync::Once;

mod classify;
mod config;
mod declaration;
mod deduce;
mod driver;
mod error;
mod narrowing;
mod resolver;
mod scope;
mod seed;

pub use classify::{candidates, BaseClass, Classified, LiteralClassifier, SuffixClass};
pub use config::{ResolverConfig, TargetWidths};
pub use declaration::{classify_storage, Declaration, Linkage};
pub use deduce::{
    deduce, deduce_decltype, deduce_with_declarator, DeduceError, DeduceFailure, PlaceholderInit,
};
pub use driver::{analyze_units, analyze_units_sequential};
pub use error::{LiteralError, LiteralErrorKind, SemaError};
pub use narrowing::{NarrowingChecker, NarrowingError};
pub use resolver::{analyze_unit, DeclOutcome, LiteralOutcome, UnitAnalysis, UseOutcome};
pub use scope::{can_nest, DeclId, ScopeHandle, ScopeId, ScopeSnapshot, ScopeTree};
pub use seed::{Seed, SeedBuilder};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing from `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
