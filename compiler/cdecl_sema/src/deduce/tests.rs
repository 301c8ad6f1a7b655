use super::*;
use cdecl_ir::Name;
use pretty_assertions::assert_eq;

#[test]
fn by_value_strips_references() {
    let init = Type::reference_to(Type::double());
    assert_eq!(deduce(PlaceholderInit::Expr(&init)), Ok(Type::double()));
}

#[test]
fn by_value_keeps_the_type_verbatim() {
    assert_eq!(deduce(PlaceholderInit::Expr(&Type::short())), Ok(Type::short()));
    let size_t = Type::alias(Name::new(0, 7), Type::ulong());
    assert_eq!(deduce(PlaceholderInit::Expr(&size_t)), Ok(size_t.clone()));
}

#[test]
fn arrays_decay() {
    let array = Type::array_of(Type::int(), Some(3));
    assert_eq!(
        deduce(PlaceholderInit::Expr(&array)),
        Ok(Type::pointer_to(Type::int()))
    );
}

#[test]
fn void_cannot_be_deduced() {
    assert_eq!(
        deduce(PlaceholderInit::Expr(&Type::Void)),
        Err(DeduceError::CannotDeduce(DeduceFailure::VoidInitializer))
    );
}

#[test]
fn copy_list_deduces_initializer_list() {
    let elements = [Type::int(), Type::int(), Type::int()];
    assert_eq!(
        deduce(PlaceholderInit::CopyList(&elements)),
        Ok(Type::initializer_list(Type::int()))
    );
}

#[test]
fn copy_list_with_mixed_types_is_ambiguous() {
    let elements = [Type::int(), Type::double()];
    assert_eq!(
        deduce(PlaceholderInit::CopyList(&elements)),
        Err(DeduceError::AmbiguousListType {
            first: Type::int(),
            conflicting: Type::double()
        })
    );
    // related integer types are not unified
    let elements = [Type::int(), Type::uint()];
    assert!(matches!(
        deduce(PlaceholderInit::CopyList(&elements)),
        Err(DeduceError::AmbiguousListType { .. })
    ));
}

#[test]
fn copy_list_compares_canonical_types() {
    let my_int = Type::alias(Name::new(0, 3), Type::int());
    let elements = [Type::int(), my_int, Type::reference_to(Type::int())];
    assert_eq!(
        deduce(PlaceholderInit::CopyList(&elements)),
        Ok(Type::initializer_list(Type::int()))
    );
}

#[test]
fn empty_copy_list() {
    assert_eq!(
        deduce(PlaceholderInit::CopyList(&[])),
        Err(DeduceError::CannotDeduce(DeduceFailure::EmptyList))
    );
}

#[test]
fn direct_list_needs_one_element() {
    assert_eq!(
        deduce(PlaceholderInit::DirectList(&[Type::int()])),
        Ok(Type::int())
    );
    assert_eq!(
        deduce(PlaceholderInit::DirectList(&[Type::int(), Type::int()])),
        Err(DeduceError::CannotDeduce(DeduceFailure::DirectListArity(2)))
    );
    assert_eq!(
        deduce(PlaceholderInit::DirectList(&[])),
        Err(DeduceError::CannotDeduce(DeduceFailure::DirectListArity(0)))
    );
}

#[test]
fn decltype_preserves_references() {
    let r = Type::reference_to(Type::int());
    assert_eq!(deduce_decltype(&r, false), r);
    assert_eq!(deduce_decltype(&Type::int(), false), Type::int());
}

#[test]
fn decltype_of_parenthesized_name() {
    assert_eq!(
        deduce_decltype(&Type::int(), true),
        Type::reference_to(Type::int())
    );
    let r = Type::reference_to(Type::int());
    assert_eq!(deduce_decltype(&r, true), r);
}

#[test]
fn auto_reference_binds_without_decay() {
    let array = Type::array_of(Type::int(), Some(3));
    assert_eq!(
        deduce_with_declarator(PlaceholderInit::Expr(&array), &[DeclaratorOp::Reference]),
        Ok(Type::reference_to(array.clone()))
    );
    let r = Type::reference_to(Type::double());
    assert_eq!(
        deduce_with_declarator(PlaceholderInit::Expr(&r), &[DeclaratorOp::Reference]),
        Ok(r.clone())
    );
}

#[test]
fn auto_pointer_requires_pointer() {
    let ptr = Type::pointer_to(Type::char());
    assert_eq!(
        deduce_with_declarator(PlaceholderInit::Expr(&ptr), &[DeclaratorOp::Pointer]),
        Ok(ptr.clone())
    );
    assert_eq!(
        deduce_with_declarator(PlaceholderInit::Expr(&Type::int()), &[DeclaratorOp::Pointer]),
        Err(DeduceError::CannotDeduce(DeduceFailure::NotAPointer(Type::int())))
    );
    // an array decays, so `auto*` accepts it
    let array = Type::array_of(Type::int(), Some(2));
    assert_eq!(
        deduce_with_declarator(PlaceholderInit::Expr(&array), &[DeclaratorOp::Pointer]),
        Ok(Type::pointer_to(Type::int()))
    );
}

#[test]
fn array_of_auto_is_rejected() {
    assert_eq!(
        deduce_with_declarator(
            PlaceholderInit::Expr(&Type::int()),
            &[DeclaratorOp::Array(Some(3))]
        ),
        Err(DeduceError::CannotDeduce(DeduceFailure::ArrayOfPlaceholder))
    );
}

#[test]
fn unsupported_declarators() {
    assert_eq!(
        deduce_with_declarator(
            PlaceholderInit::Expr(&Type::int()),
            &[DeclaratorOp::Reference, DeclaratorOp::Reference]
        ),
        Err(DeduceError::CannotDeduce(DeduceFailure::UnsupportedDeclarator))
    );
}
