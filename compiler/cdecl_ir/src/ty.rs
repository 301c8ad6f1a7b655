//! The C-family type model.
//!
//! `Type` is a small owned tree. Aliases wrap their underlying type by value,
//! so an alias chain always bottoms out in a non-alias variant.

use crate::{Name, StringLookup};

/// Signedness of a `char` type.
///
/// Plain `char` is a distinct type from both `signed char` and
/// `unsigned char`, even though it shares a representation with one of them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharSign {
    Plain,
    Signed,
    Unsigned,
}

/// Signedness of a non-character integer type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signedness {
    Signed,
    Unsigned,
}

impl Signedness {
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Signedness::Signed)
    }
}

/// Width class of a non-character integer type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntWidth {
    Short,
    Int,
    Long,
    LongLong,
}

impl IntWidth {
    /// Spelling used in type display (`long long`, ...).
    pub const fn keyword(self) -> &'static str {
        match self {
            IntWidth::Short => "short",
            IntWidth::Int => "int",
            IntWidth::Long => "long",
            IntWidth::LongLong => "long long",
        }
    }
}

/// Floating-point precision. Ordered by rank: `float < double < long double`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloatPrecision {
    Float,
    Double,
    LongDouble,
}

impl FloatPrecision {
    pub const fn keyword(self) -> &'static str {
        match self {
            FloatPrecision::Float => "float",
            FloatPrecision::Double => "double",
            FloatPrecision::LongDouble => "long double",
        }
    }
}

/// A resolved C-family type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Bool,
    Char(CharSign),
    Integer {
        width: IntWidth,
        signedness: Signedness,
    },
    Float(FloatPrecision),
    Void,
    Pointer(Box<Type>),
    Array {
        element: Box<Type>,
        length: Option<u64>,
    },
    Reference(Box<Type>),
    /// A typedef/using name for another type.
    Alias {
        name: Name,
        underlying: Box<Type>,
    },
    /// `std::initializer_list<T>`, produced by brace-list `auto` deduction.
    InitializerList(Box<Type>),
}

impl Type {
    // === Constructors ===

    pub const fn integer(width: IntWidth, signedness: Signedness) -> Type {
        Type::Integer { width, signedness }
    }

    pub const fn short() -> Type {
        Type::integer(IntWidth::Short, Signedness::Signed)
    }

    pub const fn int() -> Type {
        Type::integer(IntWidth::Int, Signedness::Signed)
    }

    pub const fn uint() -> Type {
        Type::integer(IntWidth::Int, Signedness::Unsigned)
    }

    pub const fn long() -> Type {
        Type::integer(IntWidth::Long, Signedness::Signed)
    }

    pub const fn ulong() -> Type {
        Type::integer(IntWidth::Long, Signedness::Unsigned)
    }

    pub const fn long_long() -> Type {
        Type::integer(IntWidth::LongLong, Signedness::Signed)
    }

    pub const fn ulong_long() -> Type {
        Type::integer(IntWidth::LongLong, Signedness::Unsigned)
    }

    pub const fn char() -> Type {
        Type::Char(CharSign::Plain)
    }

    pub const fn float() -> Type {
        Type::Float(FloatPrecision::Float)
    }

    pub const fn double() -> Type {
        Type::Float(FloatPrecision::Double)
    }

    pub const fn long_double() -> Type {
        Type::Float(FloatPrecision::LongDouble)
    }

    pub fn pointer_to(pointee: Type) -> Type {
        Type::Pointer(Box::new(pointee))
    }

    pub fn reference_to(referent: Type) -> Type {
        Type::Reference(Box::new(referent))
    }

    pub fn array_of(element: Type, length: Option<u64>) -> Type {
        Type::Array {
            element: Box::new(element),
            length,
        }
    }

    pub fn alias(name: Name, underlying: Type) -> Type {
        Type::Alias {
            name,
            underlying: Box::new(underlying),
        }
    }

    pub fn initializer_list(element: Type) -> Type {
        Type::InitializerList(Box::new(element))
    }

    // === Queries ===

    /// Follow top-level alias links to the first non-alias variant.
    pub fn strip_alias(&self) -> &Type {
        let mut ty = self;
        while let Type::Alias { underlying, .. } = ty {
            ty = underlying;
        }
        ty
    }

    /// The type an expression of this type designates: aliases and one level
    /// of reference removed.
    pub fn object_type(&self) -> &Type {
        match self.strip_alias() {
            Type::Reference(referent) => referent.strip_alias(),
            other => other,
        }
    }

    /// Deep copy with every alias layer removed, including those nested
    /// below pointers, arrays, references and initializer lists.
    #[must_use]
    pub fn canonical(&self) -> Type {
        match self.strip_alias() {
            Type::Pointer(pointee) => Type::pointer_to(pointee.canonical()),
            Type::Reference(referent) => Type::reference_to(referent.canonical()),
            Type::Array { element, length } => Type::array_of(element.canonical(), *length),
            Type::InitializerList(element) => Type::initializer_list(element.canonical()),
            other => other.clone(),
        }
    }

    /// Whether two types denote the same type once aliases are resolved.
    pub fn same_type(&self, other: &Type) -> bool {
        self.canonical() == other.canonical()
    }

    /// `bool`, any `char` and any sized integer.
    pub fn is_integral(&self) -> bool {
        matches!(
            self.strip_alias(),
            Type::Bool | Type::Char(_) | Type::Integer { .. }
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.strip_alias(), Type::Float(_))
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_integral() || self.is_floating()
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.strip_alias(), Type::Reference(_))
    }

    /// Render the type the way a C++ programmer would spell it.
    pub fn display<I: StringLookup + ?Sized>(&self, interner: &I) -> String {
        let mut out = String::new();
        self.write_into(interner, &mut out);
        out
    }

    fn write_into<I: StringLookup + ?Sized>(&self, interner: &I, out: &mut String) {
        self.write_declarator(interner, "", out);
    }

    /// `declarator` holds the pointer, reference and array parts already
    /// rendered outside `self`, innermost first.
    fn write_declarator<I: StringLookup + ?Sized>(
        &self,
        interner: &I,
        declarator: &str,
        out: &mut String,
    ) {
        match self {
            Type::Pointer(pointee) => {
                pointee.write_declarator(interner, &bind(pointee, '*', declarator), out);
            }
            Type::Reference(referent) => {
                referent.write_declarator(interner, &bind(referent, '&', declarator), out);
            }
            Type::Array { element, length } => {
                let bound = match length {
                    Some(n) => format!("{declarator}[{n}]"),
                    None => format!("{declarator}[]"),
                };
                element.write_declarator(interner, &bound, out);
            }
            _ => {
                self.write_base(interner, out);
                if declarator.starts_with('(') {
                    out.push(' ');
                }
                out.push_str(declarator);
            }
        }
    }

    fn write_base<I: StringLookup + ?Sized>(&self, interner: &I, out: &mut String) {
        match self {
            Type::Bool => out.push_str("bool"),
            Type::Char(CharSign::Plain) => out.push_str("char"),
            Type::Char(CharSign::Signed) => out.push_str("signed char"),
            Type::Char(CharSign::Unsigned) => out.push_str("unsigned char"),
            Type::Integer { width, signedness } => {
                if !signedness.is_signed() {
                    out.push_str("unsigned ");
                }
                out.push_str(width.keyword());
            }
            Type::Float(precision) => out.push_str(precision.keyword()),
            Type::Void => out.push_str("void"),
            Type::Alias { name, .. } => out.push_str(interner.lookup(*name)),
            Type::InitializerList(element) => {
                out.push_str("std::initializer_list<");
                element.write_into(interner, out);
                out.push('>');
            }
            Type::Pointer(_) | Type::Reference(_) | Type::Array { .. } => {
                self.write_into(interner, out);
            }
        }
    }
}

/// Prefix `declarator` with a pointer or reference sigil; an array target
/// binds tighter, so the pair is parenthesized: `int (*)[3]`.
fn bind(target: &Type, sigil: char, declarator: &str) -> String {
    if matches!(target, Type::Array { .. }) {
        format!("({sigil}{declarator})")
    } else {
        format!("{sigil}{declarator}")
    }
}
