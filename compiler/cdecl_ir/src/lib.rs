//! cdecl IR - the data model shared by every resolver phase.
//!
//! This crate contains:
//! - Spans for source locations
//! - Names for interned identifiers
//! - The `Type` model (builtins, pointers, arrays, references, aliases)
//! - Raw `Literal` records
//! - The `Record` stream an external parser hands to the resolver
//!
//! Everything here is plain data. Classification, scoping and deduction
//! live in `cdecl_sema`.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod literal;
mod name;
mod record;
mod span;
mod ty;

pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use literal::{IntBase, Literal, LiteralKind};
pub use name::Name;
pub use record::{
    BaseType, ConstValue, DeclareRecord, DeclaratorOp, InitExpr, InitStyle, Initializer, Record,
    ScopeKind, StorageClass,
};
pub use span::Span;
pub use ty::{CharSign, FloatPrecision, IntWidth, Signedness, Type};
