//! Resolver errors and their diagnostics.
//!
//! `LiteralError` is produced by the classifier on its own; `SemaError`
//! covers everything the resolver can report and wraps literal errors so a
//! unit's failures live in one list.

use std::fmt;

use cdecl_diagnostic::{Diagnostic, ErrorCode};
use cdecl_ir::{IntBase, Name, ScopeKind, Span, StringLookup, Type};

use crate::deduce::DeduceFailure;

/// A literal that could not be classified.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LiteralError {
    pub span: Span,
    pub kind: LiteralErrorKind,
}

/// What was wrong with a literal spelling.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LiteralErrorKind {
    /// Digit not valid in the literal's base (`09`, `0b2`).
    InvalidDigit { digit: char, base: IntBase },
    /// Prefix with no digits after it (`0x`).
    MissingDigits { base: IntBase },
    /// Digit separator at the start, end, or doubled.
    MisplacedSeparator,
    InvalidSuffix { suffix: String },
    UnknownEscape { escape: char },
    /// `\u` / `\U` followed by the wrong number of hex digits.
    EscapeDigitCount { escape: char, expected: usize, found: usize },
    /// Octal or hex escape that does not fit the character type.
    EscapeOutOfRange { value: u32 },
    /// Universal character name naming a surrogate or a value past U+10FFFF.
    InvalidCodePoint { value: u32 },
    EmptyCharLiteral,
    UnterminatedChar,
    /// More than one character in a literal with an encoding prefix.
    PrefixedMultiChar,
    HexFloat,
    MalformedFloat,
    /// Value exceeds every candidate type for the literal.
    Overflow { text: String },
}

impl LiteralError {
    #[cold]
    pub fn new(span: Span, kind: LiteralErrorKind) -> Self {
        LiteralError { span, kind }
    }

    #[cold]
    pub fn overflow(span: Span, text: &str) -> Self {
        Self::new(
            span,
            LiteralErrorKind::Overflow {
                text: text.to_owned(),
            },
        )
    }

    /// Overflow is reported separately from malformed spellings.
    pub fn is_overflow(&self) -> bool {
        matches!(self.kind, LiteralErrorKind::Overflow { .. })
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match &self.kind {
            LiteralErrorKind::Overflow { text } => Diagnostic::error(ErrorCode::E0002)
                .with_message(format!("integer literal `{text}` is too large for any integer type"))
                .with_label(self.span, "literal out of range"),
            LiteralErrorKind::InvalidSuffix { suffix } => Diagnostic::error(ErrorCode::E0001)
                .with_message(self.to_string())
                .with_label(self.span, "in this literal")
                .with_suggestion(if suffix.contains(['f', 'F']) {
                    "`f` is only valid on floating literals; add a decimal point"
                } else {
                    "valid integer suffixes are combinations of one `u` with `l` or `ll`"
                }),
            LiteralErrorKind::HexFloat => Diagnostic::error(ErrorCode::E0001)
                .with_message(self.to_string())
                .with_label(self.span, "in this literal")
                .with_note("hexadecimal floating literals are not supported"),
            _ => Diagnostic::error(ErrorCode::E0001)
                .with_message(self.to_string())
                .with_label(self.span, "in this literal"),
        }
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LiteralErrorKind::InvalidDigit { digit, base } => {
                write!(f, "invalid digit `{digit}` in {base} literal")
            }
            LiteralErrorKind::MissingDigits { base } => write!(f, "{base} literal has no digits"),
            LiteralErrorKind::MisplacedSeparator => write!(f, "misplaced digit separator"),
            LiteralErrorKind::InvalidSuffix { suffix } => {
                write!(f, "invalid suffix `{suffix}` on literal")
            }
            LiteralErrorKind::UnknownEscape { escape } => {
                write!(f, "unknown escape sequence `\\{escape}`")
            }
            LiteralErrorKind::EscapeDigitCount {
                escape,
                expected,
                found,
            } => write!(
                f,
                "`\\{escape}` needs exactly {expected} hex digits, found {found}"
            ),
            LiteralErrorKind::EscapeOutOfRange { value } => {
                write!(f, "escape value {value:#x} does not fit the character type")
            }
            LiteralErrorKind::InvalidCodePoint { value } => {
                write!(f, "{value:#X} is not a valid code point")
            }
            LiteralErrorKind::EmptyCharLiteral => write!(f, "empty character literal"),
            LiteralErrorKind::UnterminatedChar => write!(f, "unterminated character literal"),
            LiteralErrorKind::PrefixedMultiChar => {
                write!(f, "character literal with an encoding prefix holds more than one character")
            }
            LiteralErrorKind::HexFloat => write!(f, "hexadecimal floating literal"),
            LiteralErrorKind::MalformedFloat => write!(f, "malformed floating literal"),
            LiteralErrorKind::Overflow { text } => {
                write!(f, "integer literal `{text}` is too large")
            }
        }
    }
}

impl std::error::Error for LiteralError {}

/// Any error the resolver reports for a unit.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum SemaError {
    Literal(LiteralError),
    /// Conflicting declaration of a name already bound in the same scope.
    Redefinition {
        name: Name,
        scope: ScopeKind,
        span: Span,
        previous: Span,
    },
    UndeclaredName { name: Name, span: Span },
    /// `goto` to a label its function never defines.
    UndeclaredLabel { name: Name, span: Span },
    /// Narrowing conversion inside list-initialization.
    Narrowing { source: Type, target: Type, span: Span },
    AmbiguousListType {
        first: Type,
        conflicting: Type,
        span: Span,
    },
    CannotDeduce { reason: DeduceFailure, span: Span },
    InvalidScopeNesting {
        kind: ScopeKind,
        parent: ScopeKind,
        span: Span,
    },
    /// Scope close with no matching open, or a scope left open at end of unit.
    UnbalancedScope { span: Span, unclosed: Option<ScopeKind> },
    /// Assignment to a const object, or to a reference (which would rebind it).
    ImmutableBinding {
        name: Name,
        is_reference: bool,
        span: Span,
        declared: Span,
    },
    MissingInitializer {
        name: Name,
        is_reference: bool,
        span: Span,
    },
    DuplicateLabel { name: Name, span: Span, previous: Span },
    LabelOutsideFunction { name: Name, span: Span },
    TooManyInitializers {
        capacity: u64,
        found: usize,
        span: Span,
    },
}

impl From<LiteralError> for SemaError {
    fn from(err: LiteralError) -> Self {
        SemaError::Literal(err)
    }
}

impl SemaError {
    pub fn span(&self) -> Span {
        match self {
            SemaError::Literal(err) => err.span,
            SemaError::Redefinition { span, .. }
            | SemaError::UndeclaredName { span, .. }
            | SemaError::UndeclaredLabel { span, .. }
            | SemaError::Narrowing { span, .. }
            | SemaError::AmbiguousListType { span, .. }
            | SemaError::CannotDeduce { span, .. }
            | SemaError::InvalidScopeNesting { span, .. }
            | SemaError::UnbalancedScope { span, .. }
            | SemaError::ImmutableBinding { span, .. }
            | SemaError::MissingInitializer { span, .. }
            | SemaError::DuplicateLabel { span, .. }
            | SemaError::LabelOutsideFunction { span, .. }
            | SemaError::TooManyInitializers { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SemaError::Literal(err) if err.is_overflow() => ErrorCode::E0002,
            SemaError::Literal(_) => ErrorCode::E0001,
            SemaError::Redefinition { .. } => ErrorCode::E2001,
            SemaError::UndeclaredName { .. } | SemaError::UndeclaredLabel { .. } => {
                ErrorCode::E2002
            }
            SemaError::Narrowing { .. } => ErrorCode::E2003,
            SemaError::AmbiguousListType { .. } => ErrorCode::E2004,
            SemaError::CannotDeduce { .. } => ErrorCode::E2005,
            SemaError::InvalidScopeNesting { .. } => ErrorCode::E2006,
            SemaError::UnbalancedScope { .. } => ErrorCode::E2007,
            SemaError::ImmutableBinding { .. } => ErrorCode::E2008,
            SemaError::MissingInitializer { .. } => ErrorCode::E2009,
            SemaError::DuplicateLabel { .. } => ErrorCode::E2010,
            SemaError::LabelOutsideFunction { .. } => ErrorCode::E2011,
            SemaError::TooManyInitializers { .. } => ErrorCode::E2012,
        }
    }

    /// Convert to a diagnostic, resolving names and types for display.
    pub fn to_diagnostic<I: StringLookup + ?Sized>(&self, interner: &I) -> Diagnostic {
        let code = self.code();
        match self {
            SemaError::Literal(err) => err.to_diagnostic(),
            SemaError::Redefinition {
                name,
                scope,
                span,
                previous,
            } => {
                let name = interner.lookup(*name);
                Diagnostic::error(code)
                    .with_message(format!("redefinition of `{name}` in {scope} scope"))
                    .with_label(*span, "redefined here")
                    .with_secondary_label(*previous, format!("`{name}` first declared here"))
            }
            SemaError::UndeclaredName { name, span } => {
                let name = interner.lookup(*name);
                Diagnostic::error(code)
                    .with_message(format!("use of undeclared name `{name}`"))
                    .with_label(*span, "not found in this scope")
                    .with_suggestion(format!("check spelling, or declare `{name}` before use"))
            }
            SemaError::UndeclaredLabel { name, span } => {
                let name = interner.lookup(*name);
                Diagnostic::error(code)
                    .with_message(format!("use of undeclared label `{name}`"))
                    .with_label(*span, "no such label in this function")
            }
            SemaError::Narrowing {
                source,
                target,
                span,
            } => {
                let from = source.display(interner);
                let to = target.display(interner);
                Diagnostic::error(code)
                    .with_message(format!(
                        "narrowing conversion from `{from}` to `{to}` in list-initialization"
                    ))
                    .with_label(*span, format!("cannot be narrowed to `{to}`"))
                    .with_suggestion(format!("use `static_cast<{to}>(...)` to convert explicitly"))
            }
            SemaError::AmbiguousListType {
                first,
                conflicting,
                span,
            } => {
                let first = first.display(interner);
                let conflicting = conflicting.display(interner);
                Diagnostic::error(code)
                    .with_message("cannot deduce element type of brace-enclosed list")
                    .with_label(*span, format!("found `{first}` and `{conflicting}`"))
                    .with_note("every element of a deduced initializer list must have the same type")
            }
            SemaError::CannotDeduce { reason, span } => Diagnostic::error(code)
                .with_message(format!("cannot deduce placeholder type: {reason}"))
                .with_label(*span, "in this declaration"),
            SemaError::InvalidScopeNesting { kind, parent, span } => Diagnostic::error(code)
                .with_message(format!("{kind} scope cannot appear inside {parent} scope"))
                .with_label(*span, format!("{kind} scope opened here")),
            SemaError::UnbalancedScope { span, unclosed } => match unclosed {
                Some(kind) => Diagnostic::error(code)
                    .with_message(format!("{kind} scope is never closed"))
                    .with_label(*span, "opened here"),
                None => Diagnostic::error(code)
                    .with_message("scope close without a matching open")
                    .with_label(*span, "unmatched close"),
            },
            SemaError::ImmutableBinding {
                name,
                is_reference,
                span,
                declared,
            } => {
                let name = interner.lookup(*name);
                let (why, what) = if *is_reference {
                    ("a reference cannot be rebound", "reference")
                } else {
                    ("it is const", "const")
                };
                Diagnostic::error(code)
                    .with_message(format!("cannot assign to `{name}`: {why}"))
                    .with_label(*span, "assignment here")
                    .with_secondary_label(*declared, format!("`{name}` declared {what} here"))
            }
            SemaError::MissingInitializer {
                name,
                is_reference,
                span,
            } => {
                let name = interner.lookup(*name);
                let what = if *is_reference { "reference" } else { "const object" };
                Diagnostic::error(code)
                    .with_message(format!("{what} `{name}` must be initialized"))
                    .with_label(*span, "declared without an initializer")
            }
            SemaError::DuplicateLabel {
                name,
                span,
                previous,
            } => {
                let name = interner.lookup(*name);
                Diagnostic::error(code)
                    .with_message(format!("label `{name}` defined twice"))
                    .with_label(*span, "redefined here")
                    .with_secondary_label(*previous, "first defined here")
            }
            SemaError::LabelOutsideFunction { name, span } => {
                let name = interner.lookup(*name);
                Diagnostic::error(code)
                    .with_message(format!("label `{name}` used outside of a function"))
                    .with_label(*span, "not inside a function body")
            }
            SemaError::TooManyInitializers {
                capacity,
                found,
                span,
            } => Diagnostic::error(code)
                .with_message(format!(
                    "too many initializers: expected at most {capacity}, found {found}"
                ))
                .with_label(*span, "excess elements"),
        }
    }
}

/// Names print only through an interner, so this is the short form;
/// `to_diagnostic` gives the full message.
impl fmt::Display for SemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaError::Literal(err) => write!(f, "{err}"),
            SemaError::CannotDeduce { reason, .. } => {
                write!(f, "cannot deduce placeholder type: {reason}")
            }
            other => write!(f, "{} at {:?}", other.code().description(), other.span()),
        }
    }
}

impl std::error::Error for SemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SemaError::Literal(err) => Some(err),
            _ => None,
        }
    }
}
