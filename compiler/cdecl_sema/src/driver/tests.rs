use super::*;
use cdecl_ir::{BaseType, DeclareRecord, InitExpr, Initializer, Literal, ScopeKind, Span, Type};
use pretty_assertions::assert_eq;

fn sp(at: u32) -> Span {
    Span::new(at, at + 1)
}

/// A unit that defines `own` and list-initializes a `char` from `shared`.
fn unit_records(interner: &SharedInterner, index: usize) -> Vec<Record> {
    let own = interner.intern(&format!("own_{index}"));
    let shared = interner.intern("shared");
    vec![
        Record::Declare(DeclareRecord::new(own, BaseType::Explicit(Type::int()), sp(0))),
        Record::ScopeOpen {
            kind: ScopeKind::Function,
            name: None,
            span: sp(1),
        },
        Record::Declare(
            DeclareRecord::new(own, BaseType::Explicit(Type::char()), sp(2)).with_init(
                Initializer::direct_list(vec![InitExpr::Name {
                    name: shared,
                    span: sp(3),
                }]),
            ),
        ),
        Record::Literal(Literal::integer(format!("{index}"), sp(4))),
        Record::ScopeClose { span: sp(5) },
    ]
}

fn shared_seed(interner: &SharedInterner) -> Arc<Seed> {
    let shared = interner.intern("shared");
    let seeding = [Record::Declare(
        DeclareRecord::new(shared, BaseType::Explicit(Type::int()), sp(0))
            .constant()
            .with_init(Initializer::copy(InitExpr::Literal(Literal::integer(
                "42",
                sp(1),
            )))),
    )];
    // `const` at global scope has internal linkage, so seed it explicitly
    let unit = analyze_unit(&seeding, Seed::empty(), interner, &ResolverConfig::default());
    let mut builder = Seed::builder();
    for outcome in unit.declarations {
        if let Ok(decl) = outcome.result {
            builder
                .declare(decl)
                .unwrap_or_else(|e| panic!("seeding failed: {e:?}"));
        }
    }
    builder.build()
}

#[test]
fn parallel_matches_sequential() {
    let interner = SharedInterner::new();
    let seed = shared_seed(&interner);
    let units: Vec<Vec<Record>> = (0..16).map(|i| unit_records(&interner, i)).collect();
    let config = ResolverConfig::default();

    let parallel = analyze_units(&units, &seed, &interner, &config);
    let sequential = analyze_units_sequential(&units, &seed, &interner, &config);

    assert_eq!(parallel.len(), 16);
    assert_eq!(parallel, sequential);
    for unit in &parallel {
        assert!(!unit.has_errors(), "{:?}", unit.errors);
        // the seeded constant fits `char`, so the list-initialization is fine
        assert_eq!(unit.declarations.len(), 2);
    }
}

#[test]
fn results_keep_input_order() {
    let interner = SharedInterner::new();
    let seed = shared_seed(&interner);
    let units: Vec<Vec<Record>> = (0..8).map(|i| unit_records(&interner, i)).collect();

    let results = analyze_units(&units, &seed, &interner, &ResolverConfig::default());
    let names: Vec<String> = results
        .iter()
        .map(|unit| interner.lookup(unit.declarations[0].name).to_owned())
        .collect();
    let expected: Vec<String> = (0..8).map(|i| format!("own_{i}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn units_do_not_see_each_other() {
    let interner = SharedInterner::new();
    let a = interner.intern("a");
    let units = vec![
        vec![Record::Declare(DeclareRecord::new(
            a,
            BaseType::Explicit(Type::int()),
            sp(0),
        ))],
        vec![Record::Use {
            name: a,
            qualifier: None,
            span: sp(0),
        }],
    ];

    let results = analyze_units(&units, &Seed::empty(), &interner, &ResolverConfig::default());
    assert!(!results[0].has_errors());
    assert!(results[1].has_errors());

    // once frozen into a seed, the definition is visible
    let seed = Seed::from_units(&results[..1]).unwrap_or_else(|e| panic!("{e:?}"));
    let again = analyze_units(&units[1..], &seed, &interner, &ResolverConfig::default());
    assert!(!again[0].has_errors(), "{:?}", again[0].errors);
}

#[test]
fn empty_batch() {
    let interner = SharedInterner::new();
    let results = analyze_units(&[], &Seed::empty(), &interner, &ResolverConfig::default());
    assert!(results.is_empty());
}
