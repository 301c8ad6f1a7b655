//! Raw literal records as handed over by the lexer.
//!
//! A `Literal` keeps its complete spelling. The integer base and the suffix
//! are split off at construction; turning the spelling into a type and value
//! is the classifier's job.

use std::fmt;

use crate::Span;

/// Which literal grammar a spelling belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiteralKind {
    Integer,
    Character,
    Floating,
}

/// Radix of an integer literal, as selected by its prefix.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntBase {
    Decimal,
    Octal,
    Hex,
    Binary,
}

impl IntBase {
    /// Detect the base from a spelling.
    ///
    /// A leading `0` without `x`/`b` is octal, including the literal `0`.
    pub fn detect(spelling: &str) -> IntBase {
        let bytes = spelling.as_bytes();
        match bytes {
            [b'0', b'x' | b'X', ..] => IntBase::Hex,
            [b'0', b'b' | b'B', ..] => IntBase::Binary,
            [b'0', ..] => IntBase::Octal,
            _ => IntBase::Decimal,
        }
    }

    pub const fn radix(self) -> u32 {
        match self {
            IntBase::Decimal => 10,
            IntBase::Octal => 8,
            IntBase::Hex => 16,
            IntBase::Binary => 2,
        }
    }

    /// Length of the prefix that introduces this base in a spelling.
    ///
    /// The octal `0` doubles as the first digit, so it is not stripped.
    pub const fn prefix_len(self) -> usize {
        match self {
            IntBase::Decimal | IntBase::Octal => 0,
            IntBase::Hex | IntBase::Binary => 2,
        }
    }

    /// Spell `value` in this base, including the prefix.
    pub fn spell(self, value: u128) -> String {
        match self {
            IntBase::Decimal => format!("{value}"),
            IntBase::Octal => format!("0{value:o}"),
            IntBase::Hex => format!("0x{value:X}"),
            IntBase::Binary => format!("0b{value:b}"),
        }
    }
}

impl fmt::Display for IntBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntBase::Decimal => "decimal",
            IntBase::Octal => "octal",
            IntBase::Hex => "hexadecimal",
            IntBase::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// A literal token: kind, complete spelling, integer base and suffix.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
    /// Present for integer literals only.
    pub base: Option<IntBase>,
    pub suffix: String,
    pub span: Span,
}

impl Literal {
    /// An integer literal such as `0x1Fu` or `10'000LL`.
    pub fn integer(text: impl Into<String>, span: Span) -> Self {
        let text = text.into();
        let base = IntBase::detect(&text);
        let suffix = split_suffix(&text, |c| matches!(c, 'u' | 'U' | 'l' | 'L'));
        Literal {
            kind: LiteralKind::Integer,
            base: Some(base),
            suffix,
            text,
            span,
        }
    }

    /// A floating literal such as `1.5`, `2e10f` or `3.0L`.
    pub fn floating(text: impl Into<String>, span: Span) -> Self {
        let text = text.into();
        let suffix = split_suffix(&text, |c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'));
        Literal {
            kind: LiteralKind::Floating,
            base: None,
            suffix,
            text,
            span,
        }
    }

    /// A character literal including quotes and prefix, such as `u'é'`.
    pub fn character(text: impl Into<String>, span: Span) -> Self {
        Literal {
            kind: LiteralKind::Character,
            text: text.into(),
            base: None,
            suffix: String::new(),
            span,
        }
    }

    /// The spelling with the suffix removed, or `None` when `suffix` does
    /// not end `text`.
    pub fn body(&self) -> Option<&str> {
        self.text.strip_suffix(self.suffix.as_str())
    }

    /// The spelling with base prefix and suffix removed.
    pub fn digits(&self) -> &str {
        let prefix = self.base.map_or(0, IntBase::prefix_len);
        self.body().and_then(|body| body.get(prefix..)).unwrap_or("")
    }
}

/// Split off the trailing run of suffix characters.
fn split_suffix(text: &str, is_suffix_char: impl Fn(char) -> bool) -> String {
    let start = text
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_suffix_char(c))
        .last()
        .map_or(text.len(), |(i, _)| i);
    text[start..].to_owned()
}
