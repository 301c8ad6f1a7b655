//! The read-only set of declarations shared by every unit.
//!
//! A `Seed` is built once, frozen behind an `Arc`, and consulted by the
//! global scope of each unit after its own bindings. Units never write to
//! it; `Seed::from_units` builds a new seed from finished units instead.

use std::sync::Arc;

use cdecl_ir::{Name, ScopeKind};
use rustc_hash::FxHashMap;

use crate::declaration::Declaration;
use crate::error::SemaError;
use crate::UnitAnalysis;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Seed {
    declarations: FxHashMap<Name, Declaration>,
}

impl Seed {
    pub fn empty() -> Arc<Seed> {
        Arc::new(Seed::default())
    }

    pub fn builder() -> SeedBuilder {
        SeedBuilder::default()
    }

    pub fn get(&self, name: Name) -> Option<&Declaration> {
        self.declarations.get(&name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    /// Merge the exported declarations of finished units.
    ///
    /// Two units defining the same name is a redefinition; every such
    /// conflict is reported.
    pub fn from_units(units: &[UnitAnalysis]) -> Result<Arc<Seed>, Vec<SemaError>> {
        Self::builder().extend_from_units(units)
    }

    /// A new seed holding this seed's declarations plus those of `units`.
    pub fn extended(&self, units: &[UnitAnalysis]) -> Result<Arc<Seed>, Vec<SemaError>> {
        SeedBuilder {
            declarations: self.declarations.clone(),
        }
        .extend_from_units(units)
    }
}

/// Collects declarations under the same rules as one scope.
#[derive(Clone, Debug, Default)]
pub struct SeedBuilder {
    declarations: FxHashMap<Name, Declaration>,
}

impl SeedBuilder {
    pub fn declare(&mut self, decl: Declaration) -> Result<(), SemaError> {
        if let Some(existing) = self.declarations.get(&decl.name) {
            if existing.conflicts_with(&decl) {
                return Err(SemaError::Redefinition {
                    name: decl.name,
                    scope: ScopeKind::Global,
                    span: decl.span,
                    previous: existing.span,
                });
            }
            if !decl.is_definition {
                return Ok(());
            }
        }
        self.declarations.insert(decl.name, decl);
        Ok(())
    }

    pub fn with(mut self, decl: Declaration) -> Result<Self, SemaError> {
        self.declare(decl)?;
        Ok(self)
    }

    pub fn build(self) -> Arc<Seed> {
        Arc::new(Seed {
            declarations: self.declarations,
        })
    }

    fn extend_from_units(mut self, units: &[UnitAnalysis]) -> Result<Arc<Seed>, Vec<SemaError>> {
        let errors: Vec<SemaError> = units
            .iter()
            .flat_map(|unit| unit.exported.iter().cloned())
            .filter_map(|decl| self.declare(decl).err())
            .collect();
        if errors.is_empty() {
            tracing::debug!(declarations = self.declarations.len(), "seed built");
            Ok(self.build())
        } else {
            Err(errors)
        }
    }
}
