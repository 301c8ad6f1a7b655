//! Placeholder type deduction for `auto` and `decltype`.
//!
//! By-value `auto` drops references and decays arrays; brace lists deduce
//! `std::initializer_list<T>` from identically typed elements; `decltype`
//! keeps the operand's declared type, references included.

use std::fmt;

use cdecl_ir::{DeclaratorOp, Type};

/// Why a placeholder type could not be deduced.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeduceFailure {
    NoInitializer,
    /// `auto x = {};`
    EmptyList,
    /// `auto x{a, b};`
    DirectListArity(usize),
    /// `auto x(a, b);`
    ParenthesizedList(usize),
    VoidInitializer,
    /// `auto*` initialized from a non-pointer.
    NotAPointer(Type),
    /// `auto x[3]`
    ArrayOfPlaceholder,
    UnsupportedDeclarator,
}

impl fmt::Display for DeduceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeduceFailure::NoInitializer => write!(f, "declaration has no initializer"),
            DeduceFailure::EmptyList => write!(f, "empty brace-enclosed list"),
            DeduceFailure::DirectListArity(n) => {
                write!(f, "direct-list-initialization needs exactly one element, found {n}")
            }
            DeduceFailure::ParenthesizedList(n) => {
                write!(f, "parenthesized initializer needs exactly one element, found {n}")
            }
            DeduceFailure::VoidInitializer => write!(f, "initializer has type `void`"),
            DeduceFailure::NotAPointer(_) => write!(f, "`auto*` initializer is not a pointer"),
            DeduceFailure::ArrayOfPlaceholder => write!(f, "array of placeholder type"),
            DeduceFailure::UnsupportedDeclarator => {
                write!(f, "declarator cannot be combined with a placeholder")
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum DeduceError {
    AmbiguousListType { first: Type, conflicting: Type },
    CannotDeduce(DeduceFailure),
}

impl From<DeduceFailure> for DeduceError {
    fn from(failure: DeduceFailure) -> Self {
        DeduceError::CannotDeduce(failure)
    }
}

/// The initializer of a placeholder declaration, already typed.
#[derive(Copy, Clone, Debug)]
pub enum PlaceholderInit<'a> {
    /// `auto x = e;` or `auto x(e);`
    Expr(&'a Type),
    /// `auto x = { ... };`
    CopyList(&'a [Type]),
    /// `auto x{ ... };`
    DirectList(&'a [Type]),
}

/// Deduce the type of a plain `auto` declaration.
pub fn deduce(init: PlaceholderInit<'_>) -> Result<Type, DeduceError> {
    match init {
        PlaceholderInit::Expr(ty) => decay(ty),
        PlaceholderInit::CopyList(elements) => {
            let Some((first, rest)) = elements.split_first() else {
                return Err(DeduceFailure::EmptyList.into());
            };
            let element = decay(first)?;
            let canonical = element.canonical();
            for other in rest {
                let other = decay(other)?;
                if other.canonical() != canonical {
                    return Err(DeduceError::AmbiguousListType {
                        first: element,
                        conflicting: other,
                    });
                }
            }
            Ok(Type::initializer_list(element))
        }
        PlaceholderInit::DirectList([single]) => decay(single),
        PlaceholderInit::DirectList(elements) => {
            Err(DeduceFailure::DirectListArity(elements.len()).into())
        }
    }
}

/// Deduce `auto` combined with a declarator (`auto&`, `auto*`).
pub fn deduce_with_declarator(
    init: PlaceholderInit<'_>,
    declarator: &[DeclaratorOp],
) -> Result<Type, DeduceError> {
    if declarator
        .iter()
        .any(|op| matches!(op, DeclaratorOp::Array(_)))
    {
        return Err(DeduceFailure::ArrayOfPlaceholder.into());
    }

    match declarator {
        [] => deduce(init),
        // `auto&` binds to the object itself: no decay
        [DeclaratorOp::Reference] => match init {
            PlaceholderInit::Expr(ty) => {
                let referent = strip_reference(ty);
                if matches!(referent.strip_alias(), Type::Void) {
                    return Err(DeduceFailure::VoidInitializer.into());
                }
                Ok(Type::reference_to(referent.clone()))
            }
            list => deduce(list).map(Type::reference_to),
        },
        [DeclaratorOp::Pointer] => {
            let deduced = deduce(init)?;
            if matches!(deduced.strip_alias(), Type::Pointer(_)) {
                Ok(deduced)
            } else {
                Err(DeduceFailure::NotAPointer(deduced).into())
            }
        }
        _ => Err(DeduceFailure::UnsupportedDeclarator.into()),
    }
}

/// `decltype(x)` is the declared type of `x`; `decltype((x))` of a named
/// variable is an lvalue reference to it.
pub fn deduce_decltype(operand: &Type, parenthesized_name: bool) -> Type {
    if parenthesized_name && !operand.is_reference() {
        Type::reference_to(operand.clone())
    } else {
        operand.clone()
    }
}

/// By-value deduction: one reference layer removed, arrays decay to
/// pointers. Aliases on the result are kept.
fn decay(ty: &Type) -> Result<Type, DeduceError> {
    let value = strip_reference(ty);
    match value.strip_alias() {
        Type::Void => Err(DeduceFailure::VoidInitializer.into()),
        Type::Array { element, .. } => Ok(Type::Pointer(element.clone())),
        _ => Ok(value.clone()),
    }
}

fn strip_reference(ty: &Type) -> &Type {
    match ty.strip_alias() {
        Type::Reference(referent) => referent,
        _ => ty,
    }
}

#[cfg(test)]
mod tests;
