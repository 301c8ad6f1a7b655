use super::*;
use cdecl_ir::{StorageClass, Type};
use pretty_assertions::assert_eq;

use crate::seed::SeedBuilder;

fn name(local: u32) -> Name {
    Name::new(1, local)
}

fn span(start: u32) -> Span {
    Span::new(start, start + 1)
}

fn var(n: Name, ty: Type, at: u32) -> Declaration {
    Declaration {
        name: n,
        ty,
        storage: StorageClass::Automatic,
        linkage: Linkage::None,
        is_const: false,
        is_definition: true,
        initializer: None,
        constant: None,
        span: span(at),
    }
}

fn global(n: Name, ty: Type, at: u32) -> Declaration {
    Declaration {
        storage: StorageClass::Static,
        linkage: Linkage::External,
        ..var(n, ty, at)
    }
}

fn extern_decl(n: Name, ty: Type, at: u32) -> Declaration {
    Declaration {
        is_definition: false,
        ..global(n, ty, at)
    }
}

fn tree() -> ScopeTree {
    ScopeTree::new(Seed::empty())
}

fn open(tree: &mut ScopeTree, kind: ScopeKind) -> ScopeHandle {
    match tree.open_scope(kind, span(0)) {
        Ok(handle) => handle,
        Err(err) => panic!("cannot open {kind} scope: {err:?}"),
    }
}

#[test]
fn nesting_rules() {
    use ScopeKind::{Block, Class, Function, Global, Namespace, Statement};
    assert!(can_nest(Global, Namespace));
    assert!(can_nest(Namespace, Function));
    assert!(can_nest(Class, Function));
    assert!(can_nest(Function, Block));
    assert!(can_nest(Block, Statement));
    assert!(can_nest(Block, Class));

    assert!(!can_nest(Function, Function));
    assert!(!can_nest(Global, Block));
    assert!(!can_nest(Block, Namespace));
    assert!(!can_nest(Namespace, Global));
}

#[test]
fn invalid_nesting_is_rejected() {
    let mut tree = tree();
    let err = tree.open_scope(ScopeKind::Block, span(3));
    assert_eq!(
        err,
        Err(SemaError::InvalidScopeNesting {
            kind: ScopeKind::Block,
            parent: ScopeKind::Global,
            span: span(3),
        })
    );
    assert_eq!(tree.depth(), 1);
}

#[test]
fn shadowing_and_restoring() {
    let mut tree = tree();
    let x = name(1);
    let f = open(&mut tree, ScopeKind::Function);
    assert!(tree.declare(var(x, Type::int(), 1)).is_ok());

    let inner = open(&mut tree, ScopeKind::Block);
    // an inner declaration shadows silently
    assert!(tree.declare(var(x, Type::double(), 2)).is_ok());
    assert_eq!(tree.lookup(x).map(|d| &d.ty), Some(&Type::double()));

    let unresolved = tree.close_scope(inner, span(3));
    assert_eq!(unresolved, Ok(vec![]));
    assert_eq!(tree.lookup(x).map(|d| &d.ty), Some(&Type::int()));

    assert!(tree.close_scope(f, span(4)).is_ok());
    assert!(tree.lookup(x).is_none());
}

#[test]
fn lookup_ignores_siblings() {
    let mut tree = tree();
    let x = name(1);
    let _f = open(&mut tree, ScopeKind::Function);
    let first = open(&mut tree, ScopeKind::Block);
    assert!(tree.declare(var(x, Type::int(), 1)).is_ok());
    assert!(tree.close_scope(first, span(2)).is_ok());

    let _second = open(&mut tree, ScopeKind::Block);
    assert!(tree.lookup(x).is_none());
    assert!(tree.lookup_local(x).is_none());
}

#[test]
fn redefinition_rules() {
    let mut tree = tree();
    let y = name(2);

    assert!(tree.declare(extern_decl(y, Type::int(), 1)).is_ok());
    // repeated compatible non-defining declaration keeps the first binding
    let first = tree.declare(extern_decl(y, Type::int(), 2));
    let again = tree.declare(extern_decl(y, Type::int(), 3));
    assert_eq!(first, again);

    // differing type conflicts even without definitions
    assert_eq!(
        tree.declare(extern_decl(y, Type::long(), 4)),
        Err(SemaError::Redefinition {
            name: y,
            scope: ScopeKind::Global,
            span: span(4),
            previous: span(1),
        })
    );

    // the definition replaces the declarations
    assert!(tree.declare(global(y, Type::int(), 5)).is_ok());
    assert_eq!(tree.lookup(y).map(|d| d.span), Some(span(5)));

    // a second definition conflicts, whatever its type
    assert!(matches!(
        tree.declare(global(y, Type::double(), 6)),
        Err(SemaError::Redefinition { previous, .. }) if previous == span(5)
    ));
}

#[test]
fn seed_takes_part_in_global_lookup_and_conflicts() {
    let shared = name(3);
    let seed = Seed::builder()
        .with(global(shared, Type::long(), 100))
        .map(SeedBuilder::build)
        .unwrap_or_else(|e| panic!("{e:?}"));
    let mut tree = ScopeTree::new(seed);

    assert_eq!(tree.lookup(shared).map(|d| &d.ty), Some(&Type::long()));
    assert_eq!(
        tree.resolve_qualified(&[], shared).map(|d| d.span),
        Some(span(100))
    );

    // a compatible extern declaration is fine, a second definition is not
    assert!(tree.declare(extern_decl(shared, Type::long(), 1)).is_ok());
    assert!(matches!(
        tree.declare(global(shared, Type::long(), 2)),
        Err(SemaError::Redefinition { previous, .. }) if previous == span(100)
    ));

    // a local binding hides the seed
    let _f = open(&mut tree, ScopeKind::Function);
    assert!(tree.declare(var(shared, Type::char(), 3)).is_ok());
    assert_eq!(tree.lookup(shared).map(|d| &d.ty), Some(&Type::char()));
}

#[test]
fn closing_an_outer_handle_pops_everything_inside() {
    let mut tree = tree();
    let f = open(&mut tree, ScopeKind::Function);
    let _b = open(&mut tree, ScopeKind::Block);
    let _s = open(&mut tree, ScopeKind::Statement);
    assert_eq!(tree.depth(), 4);
    assert_eq!(tree.open_handles().len(), 3);

    assert!(tree.close_scope(f, span(9)).is_ok());
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.current(), ScopeId::GLOBAL);
    assert!(tree.innermost_handle().is_none());
}

#[test]
fn closing_twice_is_unbalanced() {
    let mut tree = tree();
    let f = open(&mut tree, ScopeKind::Function);
    assert!(tree.close_scope(f, span(1)).is_ok());
    assert_eq!(
        tree.close_scope(f, span(2)),
        Err(SemaError::UnbalancedScope {
            span: span(2),
            unclosed: None,
        })
    );
}

#[test]
fn qualified_lookup_searches_reopened_and_closed_namespaces() {
    let mut tree = tree();
    let ns = name(10);
    let (a, b) = (name(11), name(12));

    let first = tree
        .open_named_scope(ScopeKind::Namespace, ns, span(0))
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert!(tree.declare(global(a, Type::int(), 1)).is_ok());
    assert!(tree.close_scope(first, span(2)).is_ok());

    let second = tree
        .open_named_scope(ScopeKind::Namespace, ns, span(3))
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert!(tree.declare(global(b, Type::double(), 4)).is_ok());
    assert!(tree.close_scope(second, span(5)).is_ok());

    assert_eq!(tree.resolve_qualified(&[ns], a).map(|d| d.span), Some(span(1)));
    assert_eq!(tree.resolve_qualified(&[ns], b).map(|d| d.span), Some(span(4)));
    // unqualified lookup from the global scope does not see into namespaces
    assert!(tree.lookup(a).is_none());
    assert!(tree.resolve_qualified(&[], a).is_none());
    assert!(tree.resolve_qualified(&[name(99)], a).is_none());
}

#[test]
fn global_qualifier_skips_block_scopes() {
    let mut tree = tree();
    let x = name(1);
    assert!(tree.declare(global(x, Type::int(), 1)).is_ok());
    let _f = open(&mut tree, ScopeKind::Function);
    assert!(tree.declare(var(x, Type::double(), 2)).is_ok());

    assert_eq!(tree.lookup(x).map(|d| d.span), Some(span(2)));
    assert_eq!(tree.resolve_qualified(&[], x).map(|d| d.span), Some(span(1)));
}

#[test]
fn assignment_to_const_or_reference() {
    let mut tree = tree();
    let (c, r, m) = (name(1), name(2), name(3));
    let _f = open(&mut tree, ScopeKind::Function);
    let constant = Declaration {
        is_const: true,
        ..var(c, Type::int(), 1)
    };
    assert!(tree.declare(constant).is_ok());
    assert!(tree
        .declare(var(r, Type::reference_to(Type::int()), 2))
        .is_ok());
    assert!(tree.declare(var(m, Type::int(), 3)).is_ok());

    assert_eq!(
        tree.assign(c, span(10)).err(),
        Some(SemaError::ImmutableBinding {
            name: c,
            is_reference: false,
            span: span(10),
            declared: span(1),
        })
    );
    assert!(matches!(
        tree.assign(r, span(11)),
        Err(SemaError::ImmutableBinding {
            is_reference: true,
            ..
        })
    ));
    assert!(tree.assign(m, span(12)).is_ok());
    assert!(matches!(
        tree.assign(name(4), span(13)),
        Err(SemaError::UndeclaredName { .. })
    ));
}

#[test]
fn labels_are_function_wide() {
    let mut tree = tree();
    let (done, again) = (name(20), name(21));
    let f = open(&mut tree, ScopeKind::Function);
    let block = open(&mut tree, ScopeKind::Block);
    assert!(tree.declare_label(done, span(5)).is_ok());
    assert!(tree.close_scope(block, span(6)).is_ok());

    // visible outside the block it was written in
    assert_eq!(tree.lookup_label(done), Some(span(5)));
    assert_eq!(
        tree.declare_label(done, span(7)),
        Err(SemaError::DuplicateLabel {
            name: done,
            span: span(7),
            previous: span(5),
        })
    );

    // forward goto resolves once the label appears
    assert!(tree.goto_label(again, span(8)).is_ok());
    assert!(tree.declare_label(again, span(9)).is_ok());
    assert_eq!(tree.close_scope(f, span(10)), Ok(vec![]));
}

#[test]
fn unresolved_gotos_are_reported_on_close() {
    let mut tree = tree();
    let nowhere = name(22);
    let f = open(&mut tree, ScopeKind::Function);
    assert!(tree.goto_label(nowhere, span(3)).is_ok());
    assert_eq!(
        tree.close_scope(f, span(4)),
        Ok(vec![SemaError::UndeclaredLabel {
            name: nowhere,
            span: span(3),
        }])
    );
}

#[test]
fn labels_need_a_function() {
    let mut tree = tree();
    let l = name(23);
    assert_eq!(
        tree.declare_label(l, span(1)),
        Err(SemaError::LabelOutsideFunction {
            name: l,
            span: span(1),
        })
    );
    assert!(matches!(
        tree.goto_label(l, span(2)),
        Err(SemaError::LabelOutsideFunction { .. })
    ));
}

#[test]
fn exported_keeps_external_globals_in_order() {
    let mut tree = tree();
    let (a, b, hidden, local) = (name(1), name(2), name(3), name(4));
    assert!(tree.declare(global(b, Type::int(), 1)).is_ok());
    assert!(tree.declare(global(a, Type::int(), 2)).is_ok());
    let internal = Declaration {
        linkage: Linkage::Internal,
        ..global(hidden, Type::int(), 3)
    };
    assert!(tree.declare(internal).is_ok());
    let _f = open(&mut tree, ScopeKind::Function);
    assert!(tree.declare(var(local, Type::int(), 4)).is_ok());

    let exported: Vec<Name> = tree.exported().iter().map(|d| d.name).collect();
    assert_eq!(exported, vec![b, a]);
}

#[test]
fn snapshot_records_the_whole_tree() {
    let mut tree = tree();
    let (x, l) = (name(1), name(2));
    let f = open(&mut tree, ScopeKind::Function);
    assert!(tree.declare_label(l, span(2)).is_ok());
    let block = open(&mut tree, ScopeKind::Block);
    assert!(tree.declare(var(x, Type::int(), 3)).is_ok());
    assert!(tree.close_scope(block, span(4)).is_ok());

    let snapshot = tree.snapshot();
    assert_eq!(snapshot.count(), 3);
    assert_eq!(snapshot.kind, ScopeKind::Global);

    let function = snapshot
        .find(&|s: &ScopeSnapshot| s.kind == ScopeKind::Function)
        .unwrap_or_else(|| panic!("function scope missing"));
    assert!(function.is_open);
    assert_eq!(function.labels, vec![(l, span(2))]);

    let closed = snapshot
        .find(&|s: &ScopeSnapshot| s.kind == ScopeKind::Block)
        .unwrap_or_else(|| panic!("block scope missing"));
    assert!(!closed.is_open);
    assert_eq!(closed.declarations.len(), 1);
    assert_eq!(closed.declarations[0].name, x);

    assert!(tree.close_scope(f, span(5)).is_ok());
}
