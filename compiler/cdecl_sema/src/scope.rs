//! Lexical scopes and name binding.
//!
//! Scopes live in an arena and are never freed: closing a scope only marks
//! it closed and pops it from the open stack, so the full tree stays
//! available for qualified lookup and for the final snapshot. Lookup walks
//! parent links from the innermost open scope to the root and then consults
//! the shared cross-unit seed.

use std::sync::Arc;

use cdecl_ir::{Name, ScopeKind, Span};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::declaration::{Declaration, Linkage};
use crate::error::SemaError;
use crate::seed::Seed;

/// Index of a scope in its tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopeId(usize);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a declaration in its tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct DeclId(usize);

/// Proof that a scope was opened; closing takes it back.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "an opened scope must eventually be closed"]
pub struct ScopeHandle {
    id: ScopeId,
    depth: usize,
}

impl ScopeHandle {
    pub fn id(self) -> ScopeId {
        self.id
    }
}

#[derive(Clone, Debug)]
struct Scope {
    kind: ScopeKind,
    name: Option<Name>,
    parent: Option<ScopeId>,
    bindings: FxHashMap<Name, DeclId>,
    children: Vec<ScopeId>,
    is_open: bool,
    span: Span,
}

impl Scope {
    fn new(kind: ScopeKind, name: Option<Name>, parent: Option<ScopeId>, span: Span) -> Self {
        Scope {
            kind,
            name,
            parent,
            bindings: FxHashMap::default(),
            children: Vec::new(),
            is_open: true,
            span,
        }
    }
}

/// Labels of one function. `goto`s may precede their label, so unresolved
/// targets wait until the function closes.
#[derive(Clone, Debug, Default)]
struct LabelTable {
    defined: FxHashMap<Name, Span>,
    pending: Vec<(Name, Span)>,
}

/// Whether a scope of kind `child` may open directly inside `parent`.
pub fn can_nest(parent: ScopeKind, child: ScopeKind) -> bool {
    use ScopeKind::{Block, Class, Function, Global, Namespace, Statement};
    match child {
        Global => false,
        Namespace => matches!(parent, Global | Namespace),
        Class => matches!(parent, Global | Namespace | Class | Function | Block),
        Function => matches!(parent, Global | Namespace | Class),
        Block | Statement => matches!(parent, Function | Block | Statement),
    }
}

/// The scope tree of one unit.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    decls: Vec<Declaration>,
    /// Open scopes, root first. Never empty.
    stack: SmallVec<[ScopeId; 8]>,
    labels: FxHashMap<ScopeId, LabelTable>,
    seed: Arc<Seed>,
}

impl ScopeTree {
    /// A tree holding only the open global scope.
    pub fn new(seed: Arc<Seed>) -> Self {
        ScopeTree {
            scopes: vec![Scope::new(ScopeKind::Global, None, None, Span::DUMMY)],
            decls: Vec::new(),
            stack: smallvec![ScopeId::GLOBAL],
            labels: FxHashMap::default(),
            seed,
        }
    }

    pub fn seed(&self) -> &Arc<Seed> {
        &self.seed
    }

    /// The innermost open scope.
    pub fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId::GLOBAL)
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.kind(self.current())
    }

    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.scopes[id.index()].kind
    }

    pub fn span(&self, id: ScopeId) -> Span {
        self.scopes[id.index()].span
    }

    /// Number of open scopes, the global scope included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn open_scope(&mut self, kind: ScopeKind, span: Span) -> Result<ScopeHandle, SemaError> {
        self.open(kind, None, span)
    }

    /// Open a namespace or class scope that qualified names can reach.
    pub fn open_named_scope(
        &mut self,
        kind: ScopeKind,
        name: Name,
        span: Span,
    ) -> Result<ScopeHandle, SemaError> {
        self.open(kind, Some(name), span)
    }

    fn open(
        &mut self,
        kind: ScopeKind,
        name: Option<Name>,
        span: Span,
    ) -> Result<ScopeHandle, SemaError> {
        let parent = self.current();
        let parent_kind = self.kind(parent);
        if !can_nest(parent_kind, kind) {
            return Err(SemaError::InvalidScopeNesting {
                kind,
                parent: parent_kind,
                span,
            });
        }

        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(kind, name, Some(parent), span));
        self.scopes[parent.index()].children.push(id);
        let depth = self.stack.len();
        self.stack.push(id);
        tracing::trace!(?id, %kind, depth, "open scope");
        Ok(ScopeHandle { id, depth })
    }

    /// Close `handle` and every scope opened after it.
    ///
    /// Returns the `goto`s left unresolved by any function scope this
    /// closes; those are reported, but the close itself succeeded.
    pub fn close_scope(
        &mut self,
        handle: ScopeHandle,
        span: Span,
    ) -> Result<Vec<SemaError>, SemaError> {
        let is_open = handle.depth > 0 && self.stack.get(handle.depth) == Some(&handle.id);
        if !is_open {
            return Err(SemaError::UnbalancedScope {
                span,
                unclosed: None,
            });
        }

        let mut unresolved = Vec::new();
        while self.stack.len() > handle.depth {
            let Some(id) = self.stack.pop() else { break };
            let scope = &mut self.scopes[id.index()];
            scope.is_open = false;
            tracing::trace!(?id, kind = %scope.kind, "close scope");
            if scope.kind == ScopeKind::Function {
                unresolved.extend(self.unresolved_gotos(id));
            }
        }
        Ok(unresolved)
    }

    /// Handle for the innermost open scope, unless only the root is open.
    pub fn innermost_handle(&self) -> Option<ScopeHandle> {
        let depth = self.stack.len() - 1;
        (depth > 0).then(|| ScopeHandle {
            id: self.current(),
            depth,
        })
    }

    /// Handles for every open scope except the root, innermost last.
    pub fn open_handles(&self) -> Vec<ScopeHandle> {
        self.stack
            .iter()
            .enumerate()
            .skip(1)
            .map(|(depth, &id)| ScopeHandle { id, depth })
            .collect()
    }

    /// Bind `decl` in the current scope.
    ///
    /// A compatible repeated non-defining declaration keeps the existing
    /// binding; a definition after non-defining declarations replaces them.
    pub fn declare(&mut self, decl: Declaration) -> Result<DeclId, SemaError> {
        let scope_id = self.current();
        let scope = &self.scopes[scope_id.index()];
        let redefinition = |previous: &Declaration| SemaError::Redefinition {
            name: decl.name,
            scope: scope.kind,
            span: decl.span,
            previous: previous.span,
        };

        if scope.kind == ScopeKind::Global {
            if let Some(seeded) = self.seed.get(decl.name) {
                if seeded.conflicts_with(&decl) {
                    return Err(redefinition(seeded));
                }
            }
        }

        if let Some(&existing_id) = scope.bindings.get(&decl.name) {
            let existing = &self.decls[existing_id.0];
            if existing.conflicts_with(&decl) {
                return Err(redefinition(existing));
            }
            if !decl.is_definition {
                tracing::trace!(name = ?decl.name, "repeated declaration");
                return Ok(existing_id);
            }
        }

        let id = DeclId(self.decls.len());
        tracing::trace!(name = ?decl.name, ty = ?decl.ty, scope = ?scope_id, "declare");
        let name = decl.name;
        self.decls.push(decl);
        self.scopes[scope_id.index()].bindings.insert(name, id);
        Ok(id)
    }

    pub fn declaration(&self, id: DeclId) -> &Declaration {
        &self.decls[id.0]
    }

    /// Innermost visible binding of `name`, falling back to the seed.
    pub fn lookup(&self, name: Name) -> Option<&Declaration> {
        let mut scope = Some(self.current());
        while let Some(id) = scope {
            let data = &self.scopes[id.index()];
            if let Some(&decl) = data.bindings.get(&name) {
                return Some(&self.decls[decl.0]);
            }
            scope = data.parent;
        }
        self.seed.get(name)
    }

    /// Binding of `name` in the current scope only.
    pub fn lookup_local(&self, name: Name) -> Option<&Declaration> {
        self.scopes[self.current().index()]
            .bindings
            .get(&name)
            .map(|&id| &self.decls[id.0])
    }

    /// Resolve `path::name` from the global scope.
    ///
    /// An empty path is `::name`. Every scope matching a path segment is
    /// searched, in the order it was opened, so reopened namespaces all
    /// contribute. Closed scopes take part.
    pub fn resolve_qualified(&self, path: &[Name], name: Name) -> Option<&Declaration> {
        let mut candidates: SmallVec<[ScopeId; 4]> = smallvec![ScopeId::GLOBAL];
        for &segment in path {
            candidates = candidates
                .iter()
                .flat_map(|&id| self.scopes[id.index()].children.iter().copied())
                .filter(|&child| {
                    let scope = &self.scopes[child.index()];
                    scope.name == Some(segment)
                        && matches!(scope.kind, ScopeKind::Namespace | ScopeKind::Class)
                })
                .collect();
            if candidates.is_empty() {
                return None;
            }
        }

        let found = candidates
            .iter()
            .find_map(|&id| self.scopes[id.index()].bindings.get(&name))
            .map(|&id| &self.decls[id.0]);
        if path.is_empty() {
            found.or_else(|| self.seed.get(name))
        } else {
            found
        }
    }

    /// Check an assignment to `name`.
    pub fn assign(&self, name: Name, span: Span) -> Result<&Declaration, SemaError> {
        let decl = self
            .lookup(name)
            .ok_or(SemaError::UndeclaredName { name, span })?;
        let is_reference = decl.ty.is_reference();
        if decl.is_const || is_reference {
            return Err(SemaError::ImmutableBinding {
                name,
                is_reference,
                span,
                declared: decl.span,
            });
        }
        Ok(decl)
    }

    fn enclosing_function(&self) -> Option<ScopeId> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|&id| self.kind(id) == ScopeKind::Function)
    }

    pub fn declare_label(&mut self, name: Name, span: Span) -> Result<(), SemaError> {
        let function = self
            .enclosing_function()
            .ok_or(SemaError::LabelOutsideFunction { name, span })?;
        let table = self.labels.entry(function).or_default();
        if let Some(&previous) = table.defined.get(&name) {
            return Err(SemaError::DuplicateLabel {
                name,
                span,
                previous,
            });
        }
        table.defined.insert(name, span);
        Ok(())
    }

    /// Record a `goto`. Targets not yet defined are checked when the
    /// function closes.
    pub fn goto_label(&mut self, name: Name, span: Span) -> Result<(), SemaError> {
        let function = self
            .enclosing_function()
            .ok_or(SemaError::LabelOutsideFunction { name, span })?;
        let table = self.labels.entry(function).or_default();
        if !table.defined.contains_key(&name) {
            table.pending.push((name, span));
        }
        Ok(())
    }

    /// Where `name` is defined as a label in the enclosing function.
    pub fn lookup_label(&self, name: Name) -> Option<Span> {
        let function = self.enclosing_function()?;
        self.labels.get(&function)?.defined.get(&name).copied()
    }

    fn unresolved_gotos(&mut self, function: ScopeId) -> Vec<SemaError> {
        let Some(table) = self.labels.get_mut(&function) else {
            return Vec::new();
        };
        let pending = std::mem::take(&mut table.pending);
        pending
            .into_iter()
            .filter(|(name, _)| !table.defined.contains_key(name))
            .map(|(name, span)| SemaError::UndeclaredLabel { name, span })
            .collect()
    }

    /// Declarations other units can see: externally linked bindings of the
    /// global scope, in declaration order.
    pub fn exported(&self) -> Vec<Declaration> {
        let mut ids: Vec<DeclId> = self.scopes[ScopeId::GLOBAL.index()]
            .bindings
            .values()
            .copied()
            .collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| &self.decls[id.0])
            .filter(|decl| decl.linkage == Linkage::External)
            .cloned()
            .collect()
    }

    /// A detached copy of the whole tree, open and closed scopes alike.
    pub fn snapshot(&self) -> ScopeSnapshot {
        self.snapshot_of(ScopeId::GLOBAL)
    }

    fn snapshot_of(&self, id: ScopeId) -> ScopeSnapshot {
        let scope = &self.scopes[id.index()];
        let mut bound: Vec<DeclId> = scope.bindings.values().copied().collect();
        bound.sort_unstable();
        let mut labels: Vec<(Name, Span)> = self
            .labels
            .get(&id)
            .map(|table| table.defined.iter().map(|(&n, &s)| (n, s)).collect())
            .unwrap_or_default();
        labels.sort_by_key(|&(_, span)| (span.start, span.end));

        ScopeSnapshot {
            id,
            kind: scope.kind,
            name: scope.name,
            span: scope.span,
            is_open: scope.is_open,
            declarations: bound.into_iter().map(|d| self.decls[d.0].clone()).collect(),
            labels,
            children: scope.children.iter().map(|&c| self.snapshot_of(c)).collect(),
        }
    }
}

/// A scope and its subtree, as recorded at the end of a unit.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopeSnapshot {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub name: Option<Name>,
    pub span: Span,
    pub is_open: bool,
    /// Current binding of each name, in declaration order.
    pub declarations: Vec<Declaration>,
    /// Labels of a function scope, in source order.
    pub labels: Vec<(Name, Span)>,
    pub children: Vec<ScopeSnapshot>,
}

impl ScopeSnapshot {
    /// Depth-first search for the first scope satisfying `pred`.
    pub fn find(&self, pred: &impl Fn(&ScopeSnapshot) -> bool) -> Option<&ScopeSnapshot> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(pred))
    }

    /// Number of scopes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ScopeSnapshot::count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests;
