//! The declaration stream consumed by the resolver.
//!
//! An external lexer/parser flattens a compilation unit into an ordered
//! sequence of `Record`s. Scope structure is explicit (`ScopeOpen` /
//! `ScopeClose`); declarations carry their base type, declarator and
//! initializer already split apart.

use std::fmt;

use crate::{Literal, Name, Span, Type};

/// The kinds of scope a name can be declared in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    Function,
    Block,
    /// The scope of a `for`/`if`/`switch` init-statement or condition.
    Statement,
}

impl ScopeKind {
    pub const fn name(self) -> &'static str {
        match self {
            ScopeKind::Global => "global",
            ScopeKind::Namespace => "namespace",
            ScopeKind::Class => "class",
            ScopeKind::Function => "function",
            ScopeKind::Block => "block",
            ScopeKind::Statement => "statement",
        }
    }

    /// Namespace-level scopes give declarations static storage by default.
    pub const fn is_namespace_level(self) -> bool {
        matches!(self, ScopeKind::Global | ScopeKind::Namespace)
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage duration of a declared object.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageClass {
    Automatic,
    Static,
    FreeStore,
    ThreadLocal,
    Temporary,
}

impl StorageClass {
    pub const fn name(self) -> &'static str {
        match self {
            StorageClass::Automatic => "automatic",
            StorageClass::Static => "static",
            StorageClass::FreeStore => "free-store",
            StorageClass::ThreadLocal => "thread-local",
            StorageClass::Temporary => "temporary",
        }
    }
}

/// One layer of a declarator, applied to the base type left to right.
///
/// `int* a[3]` is `[Pointer, Array(Some(3))]`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclaratorOp {
    Pointer,
    Reference,
    Array(Option<u64>),
}

/// A compile-time constant value attached to an operand.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstValue {
    Int(i128),
    Float(f64),
}

/// One operand of an initializer.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitExpr {
    Literal(Literal),
    /// A reference to a previously declared name.
    Name { name: Name, span: Span },
    /// An expression already typed by an external collaborator.
    Typed {
        ty: Type,
        value: Option<ConstValue>,
        span: Span,
    },
}

impl InitExpr {
    pub fn span(&self) -> Span {
        match self {
            InitExpr::Literal(lit) => lit.span,
            InitExpr::Name { span, .. } | InitExpr::Typed { span, .. } => *span,
        }
    }
}

/// Syntactic form of an initializer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitStyle {
    /// `T x = e;`
    Copy,
    /// `T x(e);`
    Direct,
    /// `T x = { ... };`
    CopyList,
    /// `T x{ ... };`
    DirectList,
}

impl InitStyle {
    pub const fn is_list(self) -> bool {
        matches!(self, InitStyle::CopyList | InitStyle::DirectList)
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Initializer {
    pub style: InitStyle,
    pub elements: Vec<InitExpr>,
    pub span: Span,
}

impl Initializer {
    pub fn new(style: InitStyle, elements: Vec<InitExpr>, span: Span) -> Self {
        Initializer {
            style,
            elements,
            span,
        }
    }

    /// `= e`
    pub fn copy(element: InitExpr) -> Self {
        let span = element.span();
        Self::new(InitStyle::Copy, vec![element], span)
    }

    /// `= { e, ... }`
    pub fn copy_list(elements: Vec<InitExpr>) -> Self {
        let span = merged_span(&elements);
        Self::new(InitStyle::CopyList, elements, span)
    }

    /// `{ e, ... }`
    pub fn direct_list(elements: Vec<InitExpr>) -> Self {
        let span = merged_span(&elements);
        Self::new(InitStyle::DirectList, elements, span)
    }
}

fn merged_span(elements: &[InitExpr]) -> Span {
    elements
        .iter()
        .map(InitExpr::span)
        .reduce(Span::merge)
        .unwrap_or(Span::DUMMY)
}

/// The type specifier of a declaration.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseType {
    Explicit(Type),
    /// `auto`: deduced from the initializer.
    Auto,
    /// `decltype(operand)`; `parenthesized` marks `decltype((x))`.
    Decltype {
        operand: InitExpr,
        parenthesized: bool,
    },
}

/// A declaration statement.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclareRecord {
    pub name: Name,
    pub span: Span,
    pub base: BaseType,
    pub declarator: Vec<DeclaratorOp>,
    /// Explicit storage specifier; `None` takes the scope's default.
    pub storage: Option<StorageClass>,
    pub is_const: bool,
    /// `false` for `extern` declarations that only introduce the name.
    pub is_definition: bool,
    pub initializer: Option<Initializer>,
}

impl DeclareRecord {
    /// A defining, non-const declaration with default storage.
    pub fn new(name: Name, base: BaseType, span: Span) -> Self {
        DeclareRecord {
            name,
            span,
            base,
            declarator: Vec::new(),
            storage: None,
            is_const: false,
            is_definition: true,
            initializer: None,
        }
    }

    #[must_use]
    pub fn with_init(mut self, initializer: Initializer) -> Self {
        self.initializer = Some(initializer);
        self
    }

    #[must_use]
    pub fn with_declarator(mut self, op: DeclaratorOp) -> Self {
        self.declarator.push(op);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, storage: StorageClass) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Mark as an `extern` declaration that does not define the object.
    #[must_use]
    pub fn non_defining(mut self) -> Self {
        self.is_definition = false;
        self
    }
}

/// One entry of the declaration stream.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Record {
    /// A free-standing literal to classify.
    Literal(Literal),
    /// `name` is set for namespaces and classes.
    ScopeOpen {
        kind: ScopeKind,
        name: Option<Name>,
        span: Span,
    },
    ScopeClose { span: Span },
    Declare(DeclareRecord),
    /// A name reference; `qualifier` of `Some(vec![])` is `::name`.
    Use {
        name: Name,
        qualifier: Option<Vec<Name>>,
        span: Span,
    },
    Assign { name: Name, span: Span },
    Label { name: Name, span: Span },
    Goto { name: Name, span: Span },
}

impl Record {
    pub fn span(&self) -> Span {
        match self {
            Record::Literal(lit) => lit.span,
            Record::Declare(decl) => decl.span,
            Record::ScopeOpen { span, .. }
            | Record::ScopeClose { span }
            | Record::Use { span, .. }
            | Record::Assign { span, .. }
            | Record::Label { span, .. }
            | Record::Goto { span, .. } => *span,
        }
    }
}
