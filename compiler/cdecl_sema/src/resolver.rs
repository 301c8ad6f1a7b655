//! The per-unit pipeline.
//!
//! Records are consumed in document order. Literals go through the
//! classifier; declarations are typed (explicitly, by deduction or by
//! `decltype`), classified for storage, checked against their initializer
//! and bound in the current scope. Every error is recorded with its span
//! and the unit continues unless `abort_on_first_error` is set.

use std::sync::Arc;

use cdecl_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use cdecl_ir::{
    BaseType, ConstValue, DeclareRecord, DeclaratorOp, InitExpr, InitStyle, Initializer, Literal,
    Name, Record, ScopeKind, Span, StringLookup, Type,
};
use smallvec::SmallVec;

use crate::classify::{Classified, LiteralClassifier};
use crate::config::ResolverConfig;
use crate::declaration::{classify_storage, Declaration};
use crate::deduce::{
    deduce_decltype, deduce_with_declarator, DeduceError, DeduceFailure, PlaceholderInit,
};
use crate::error::{LiteralError, SemaError};
use crate::narrowing::{NarrowingChecker, NarrowingError};
use crate::scope::{ScopeSnapshot, ScopeTree};
use crate::seed::Seed;

/// Classification result of one literal, free-standing or in an initializer.
#[derive(Clone, PartialEq, Debug)]
pub struct LiteralOutcome {
    pub span: Span,
    pub result: Result<Classified, LiteralError>,
}

/// Resolution result of one `Declare` record.
#[derive(Clone, PartialEq, Debug)]
pub struct DeclOutcome {
    pub name: Name,
    pub span: Span,
    pub result: Result<Declaration, SemaError>,
}

/// Resolution result of one `Use` record.
#[derive(Clone, PartialEq, Debug)]
pub struct UseOutcome {
    pub name: Name,
    pub span: Span,
    pub resolved: Option<Declaration>,
}

/// Everything the resolver learned about one compilation unit.
#[derive(Clone, PartialEq, Debug)]
pub struct UnitAnalysis {
    pub literals: Vec<LiteralOutcome>,
    pub declarations: Vec<DeclOutcome>,
    pub uses: Vec<UseOutcome>,
    /// Every error, in the order it was raised.
    pub errors: Vec<SemaError>,
    /// Errors, warnings and notes sorted by position.
    pub diagnostics: Vec<Diagnostic>,
    pub scopes: ScopeSnapshot,
    /// Externally linked global declarations, for building the next seed.
    pub exported: Vec<Declaration>,
    /// Set when `abort_on_first_error` stopped the unit early.
    pub aborted: bool,
}

impl UnitAnalysis {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The first declaration outcome for `name`.
    pub fn declaration(&self, name: Name) -> Option<&DeclOutcome> {
        self.declarations.iter().find(|outcome| outcome.name == name)
    }
}

/// Analyze one unit against `seed`.
#[tracing::instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn analyze_unit<I: StringLookup + ?Sized>(
    records: &[Record],
    seed: Arc<Seed>,
    interner: &I,
    config: &ResolverConfig,
) -> UnitAnalysis {
    let mut resolver = UnitResolver::new(seed, interner, config);
    for record in records {
        if resolver.aborted {
            break;
        }
        resolver.record(record);
    }
    resolver.finish()
}

/// A typed initializer operand.
struct Operand {
    ty: Type,
    value: Option<ConstValue>,
    span: Span,
}

struct UnitResolver<'a, I: StringLookup + ?Sized> {
    tree: ScopeTree,
    classifier: LiteralClassifier,
    narrowing: NarrowingChecker,
    interner: &'a I,
    config: &'a ResolverConfig,
    queue: DiagnosticQueue,
    /// Depths at which a `ScopeOpen` was rejected; the matching close is
    /// swallowed.
    rejected_opens: SmallVec<[usize; 4]>,
    literals: Vec<LiteralOutcome>,
    declarations: Vec<DeclOutcome>,
    uses: Vec<UseOutcome>,
    errors: Vec<SemaError>,
    aborted: bool,
}

impl<'a, I: StringLookup + ?Sized> UnitResolver<'a, I> {
    fn new(seed: Arc<Seed>, interner: &'a I, config: &'a ResolverConfig) -> Self {
        UnitResolver {
            tree: ScopeTree::new(seed),
            classifier: LiteralClassifier::new(config.widths),
            narrowing: NarrowingChecker::new(config.widths),
            interner,
            config,
            queue: DiagnosticQueue::with_config(config.diagnostics.clone()),
            rejected_opens: SmallVec::new(),
            literals: Vec::new(),
            declarations: Vec::new(),
            uses: Vec::new(),
            errors: Vec::new(),
            aborted: false,
        }
    }

    fn record(&mut self, record: &Record) {
        match record {
            Record::Literal(lit) => {
                if let Err(err) = self.classify(lit) {
                    self.report(err.into());
                }
            }
            Record::ScopeOpen { kind, name, span } => self.open_scope(*kind, *name, *span),
            Record::ScopeClose { span } => self.close_scope(*span),
            Record::Declare(decl) => {
                let result = self.declare(decl);
                if let Err(err) = &result {
                    self.report(err.clone());
                }
                self.declarations.push(DeclOutcome {
                    name: decl.name,
                    span: decl.span,
                    result,
                });
            }
            Record::Use {
                name,
                qualifier,
                span,
            } => {
                let resolved = match qualifier {
                    None => self.tree.lookup(*name),
                    Some(path) => self.tree.resolve_qualified(path, *name),
                }
                .cloned();
                if resolved.is_none() {
                    self.report(SemaError::UndeclaredName {
                        name: *name,
                        span: *span,
                    });
                }
                self.uses.push(UseOutcome {
                    name: *name,
                    span: *span,
                    resolved,
                });
            }
            Record::Assign { name, span } => {
                if let Some(err) = self.tree.assign(*name, *span).err() {
                    self.report(err);
                }
            }
            Record::Label { name, span } => {
                if let Err(err) = self.tree.declare_label(*name, *span) {
                    self.report(err);
                }
            }
            Record::Goto { name, span } => {
                if let Err(err) = self.tree.goto_label(*name, *span) {
                    self.report(err);
                }
            }
        }
    }

    fn report(&mut self, err: SemaError) {
        tracing::debug!(code = %err.code(), span = ?err.span(), "{err}");
        self.queue.add(err.to_diagnostic(self.interner));
        self.errors.push(err);
        if self.config.abort_on_first_error {
            self.aborted = true;
        }
    }

    fn warn(&mut self, diag: Diagnostic) {
        self.queue.add(diag);
    }

    fn classify(&mut self, lit: &Literal) -> Result<Classified, LiteralError> {
        let result = self.classifier.classify(lit);
        if let Ok(Classified {
            multi_char: true,
            value: ConstValue::Int(value),
            ..
        }) = &result
        {
            let value = *value;
            self.warn(
                Diagnostic::warning(ErrorCode::W0001)
                    .with_message(format!("multi-character literal `{}`", lit.text))
                    .with_label(lit.span, "value is implementation-defined")
                    .with_note(format!("this literal has type `int` and value {value}")),
            );
        }
        self.literals.push(LiteralOutcome {
            span: lit.span,
            result: result.clone(),
        });
        result
    }

    // === Scopes ===

    fn open_scope(&mut self, kind: ScopeKind, name: Option<Name>, span: Span) {
        let opened = match name {
            Some(name) => self.tree.open_named_scope(kind, name, span),
            None => self.tree.open_scope(kind, span),
        };
        if let Err(err) = opened {
            self.rejected_opens.push(self.tree.depth());
            self.report(err);
        }
    }

    fn close_scope(&mut self, span: Span) {
        if self.rejected_opens.last() == Some(&self.tree.depth()) {
            self.rejected_opens.pop();
            return;
        }
        let Some(handle) = self.tree.innermost_handle() else {
            self.report(SemaError::UnbalancedScope {
                span,
                unclosed: None,
            });
            return;
        };
        match self.tree.close_scope(handle, span) {
            Ok(unresolved) => {
                for err in unresolved {
                    self.report(err);
                }
            }
            Err(err) => self.report(err),
        }
    }

    // === Declarations ===

    fn declare(&mut self, record: &DeclareRecord) -> Result<Declaration, SemaError> {
        let operands = match &record.initializer {
            Some(init) => self.operands(init),
            None => Ok(Vec::new()),
        };
        // an explicit type does not depend on the initializer, so the name
        // can still be bound when an operand fails
        let (operands, operand_error) = match operands {
            Ok(operands) => (operands, None),
            Err(err) if matches!(record.base, BaseType::Explicit(_)) => (Vec::new(), Some(err)),
            Err(err) => return Err(err),
        };
        let ty = self.declared_type(record, &operands)?;

        let kind = self.tree.current_kind();
        let (storage, linkage) =
            classify_storage(kind, record.storage, record.is_const, record.is_definition);

        if record.initializer.is_none()
            && record.is_definition
            && kind != ScopeKind::Class
            && (record.is_const || ty.is_reference())
        {
            return Err(SemaError::MissingInitializer {
                name: record.name,
                is_reference: ty.is_reference(),
                span: record.span,
            });
        }

        let init_error = match (&record.initializer, operand_error) {
            (_, Some(err)) => Some(err),
            (Some(init), None) => self.check_initializer(init, &operands, &ty).err(),
            (None, None) => None,
        };

        let constant = match operands.as_slice() {
            [single] if record.is_const && !ty.is_reference() => single
                .value
                .and_then(|value| self.converted_constant(value, &ty)),
            _ => None,
        };

        let decl = Declaration {
            name: record.name,
            ty,
            storage,
            linkage,
            is_const: record.is_const,
            is_definition: record.is_definition,
            initializer: record.initializer.clone(),
            constant,
            span: record.span,
        };
        // a bad initializer still binds the name so later uses resolve
        self.tree.declare(decl.clone())?;
        match init_error {
            Some(err) => Err(err),
            None => Ok(decl),
        }
    }

    fn operands(&mut self, init: &Initializer) -> Result<Vec<Operand>, SemaError> {
        init.elements
            .iter()
            .map(|element| self.operand(element))
            .collect()
    }

    fn operand(&mut self, expr: &InitExpr) -> Result<Operand, SemaError> {
        match expr {
            InitExpr::Literal(lit) => {
                let classified = self.classify(lit)?;
                Ok(Operand {
                    ty: classified.ty,
                    value: Some(classified.value),
                    span: lit.span,
                })
            }
            InitExpr::Name { name, span } => {
                let decl = self
                    .tree
                    .lookup(*name)
                    .ok_or(SemaError::UndeclaredName {
                        name: *name,
                        span: *span,
                    })?;
                Ok(Operand {
                    ty: decl.ty.clone(),
                    value: decl.constant,
                    span: *span,
                })
            }
            InitExpr::Typed { ty, value, span } => Ok(Operand {
                ty: ty.clone(),
                value: *value,
                span: *span,
            }),
        }
    }

    fn declared_type(
        &mut self,
        record: &DeclareRecord,
        operands: &[Operand],
    ) -> Result<Type, SemaError> {
        match &record.base {
            BaseType::Explicit(base) => Ok(apply_declarator(
                base.clone(),
                &record.declarator,
                record.initializer.as_ref(),
            )),
            BaseType::Auto => {
                let Some(init) = &record.initializer else {
                    return Err(SemaError::CannotDeduce {
                        reason: DeduceFailure::NoInitializer,
                        span: record.span,
                    });
                };
                let types: Vec<Type> = operands.iter().map(|op| op.ty.clone()).collect();
                let placeholder = match (init.style, types.as_slice()) {
                    (InitStyle::Copy | InitStyle::Direct, [single]) => PlaceholderInit::Expr(single),
                    (InitStyle::Copy | InitStyle::Direct, many) => {
                        return Err(SemaError::CannotDeduce {
                            reason: DeduceFailure::ParenthesizedList(many.len()),
                            span: init.span,
                        });
                    }
                    (InitStyle::CopyList, all) => PlaceholderInit::CopyList(all),
                    (InitStyle::DirectList, all) => PlaceholderInit::DirectList(all),
                };
                deduce_with_declarator(placeholder, &record.declarator).map_err(|err| match err {
                    DeduceError::AmbiguousListType { first, conflicting } => {
                        SemaError::AmbiguousListType {
                            first,
                            conflicting,
                            span: init.span,
                        }
                    }
                    DeduceError::CannotDeduce(reason) => SemaError::CannotDeduce {
                        reason,
                        span: record.span,
                    },
                })
            }
            BaseType::Decltype {
                operand,
                parenthesized,
            } => {
                let typed = self.operand(operand)?;
                let is_name = matches!(operand, InitExpr::Name { .. });
                let base = deduce_decltype(&typed.ty, *parenthesized && is_name);
                Ok(apply_declarator(
                    base,
                    &record.declarator,
                    record.initializer.as_ref(),
                ))
            }
        }
    }

    /// Capacity and narrowing checks for list-initialization; copy and
    /// direct initialization only note a narrowing conversion.
    fn check_initializer(
        &mut self,
        init: &Initializer,
        operands: &[Operand],
        ty: &Type,
    ) -> Result<(), SemaError> {
        if !init.style.is_list() {
            for op in operands {
                if let Err(NarrowingError { source, target }) =
                    self.narrowing.check(&op.ty, op.value, ty)
                {
                    let message = format!(
                        "implicit conversion from `{}` to `{}` may change the value",
                        source.display(self.interner),
                        target.display(self.interner),
                    );
                    self.warn(
                        Diagnostic::note(ErrorCode::W2001)
                            .with_message(message)
                            .with_label(op.span, "narrowed here"),
                    );
                }
            }
            return Ok(());
        }

        let (target, capacity) = match ty.object_type() {
            Type::Array { element, length } => (element.as_ref(), *length),
            Type::InitializerList(element) => (element.as_ref(), None),
            scalar => (scalar, Some(1)),
        };
        if let Some(capacity) = capacity {
            if operands.len() as u64 > capacity {
                return Err(SemaError::TooManyInitializers {
                    capacity,
                    found: operands.len(),
                    span: init.span,
                });
            }
        }
        for op in operands {
            self.narrowing
                .check(&op.ty, op.value, target)
                .map_err(|NarrowingError { source, target }| SemaError::Narrowing {
                    source,
                    target,
                    span: op.span,
                })?;
        }
        Ok(())
    }

    /// The value a `const` scalar holds after conversion to `ty`, when it
    /// is known exactly.
    fn converted_constant(&self, value: ConstValue, ty: &Type) -> Option<ConstValue> {
        let ty = ty.strip_alias();
        match value {
            ConstValue::Int(v) if ty.is_integral() => {
                let (min, max) = self.config.widths.integer_range(ty)?;
                (min..=max).contains(&v).then_some(ConstValue::Int(v))
            }
            ConstValue::Float(v) if ty.is_floating() => Some(ConstValue::Float(v)),
            _ => None,
        }
    }

    // === End of unit ===

    fn finish(mut self) -> UnitAnalysis {
        while !self.aborted {
            let Some(handle) = self.tree.innermost_handle() else {
                break;
            };
            let id = handle.id();
            self.report(SemaError::UnbalancedScope {
                span: self.tree.span(id),
                unclosed: Some(self.tree.kind(id)),
            });
            let span = self.tree.span(id);
            match self.tree.close_scope(handle, span) {
                Ok(unresolved) => {
                    for err in unresolved {
                        self.report(err);
                    }
                }
                Err(err) => self.report(err),
            }
        }

        tracing::debug!(
            declarations = self.declarations.len(),
            errors = self.errors.len(),
            aborted = self.aborted,
            "unit analyzed"
        );
        UnitAnalysis {
            literals: self.literals,
            declarations: self.declarations,
            uses: self.uses,
            errors: self.errors,
            diagnostics: self.queue.flush(),
            scopes: self.tree.snapshot(),
            exported: self.tree.exported(),
            aborted: self.aborted,
        }
    }
}

/// Apply declarator layers left to right. An unsized outermost array takes
/// its length from a list initializer.
fn apply_declarator(
    base: Type,
    declarator: &[DeclaratorOp],
    initializer: Option<&Initializer>,
) -> Type {
    let last = declarator.len().saturating_sub(1);
    declarator
        .iter()
        .enumerate()
        .fold(base, |ty, (i, op)| match op {
            DeclaratorOp::Pointer => Type::pointer_to(ty),
            DeclaratorOp::Reference => Type::reference_to(ty),
            DeclaratorOp::Array(None) if i == last => {
                let length = initializer
                    .filter(|init| init.style.is_list())
                    .map(|init| init.elements.len() as u64);
                Type::array_of(ty, length)
            }
            DeclaratorOp::Array(length) => Type::array_of(ty, *length),
        })
}
