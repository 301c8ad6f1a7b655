//! Error codes for resolver diagnostics.

use std::fmt;

/// Error codes for all resolver diagnostics.
///
/// Format: E#### / W#### where the first digit indicates the phase:
/// - E0xxx / W0xxx: literal classification
/// - E2xxx / W2xxx: scopes, declarations, narrowing and deduction
/// - E9xxx: resolver limits
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    // Literal Errors (E0xxx)
    /// Malformed literal (bad digit, escape or suffix)
    E0001,
    /// Integer literal too large for every candidate type
    E0002,

    // Semantic Errors (E2xxx)
    /// Conflicting redefinition in the same scope
    E2001,
    /// Use of an undeclared name or label
    E2002,
    /// Narrowing conversion in list-initialization
    E2003,
    /// Brace-list elements have different types
    E2004,
    /// Placeholder type cannot be deduced
    E2005,
    /// Scope opened where that kind of scope cannot appear
    E2006,
    /// Scope closed that is not open
    E2007,
    /// Assignment to a const object or rebinding of a reference
    E2008,
    /// Const object or reference declared without an initializer
    E2009,
    /// Label defined twice in one function
    E2010,
    /// Label outside of any function
    E2011,
    /// More initializers than the target can hold
    E2012,

    // Limits (E9xxx)
    /// Error limit reached
    E9001,

    // Warnings
    /// Multi-character literal
    W0001,
    /// Narrowing conversion outside list-initialization
    W2001,
}

impl ErrorCode {
    /// All codes, in declaration order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E9001,
        ErrorCode::W0001,
        ErrorCode::W2001,
    ];

    /// Get the code as a string (e.g., "E2001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E9001 => "E9001",
            ErrorCode::W0001 => "W0001",
            ErrorCode::W2001 => "W2001",
        }
    }

    /// One-line description for `--explain`-style listings.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "malformed literal",
            ErrorCode::E0002 => "integer literal is too large",
            ErrorCode::E2001 => "conflicting redefinition",
            ErrorCode::E2002 => "use of undeclared name",
            ErrorCode::E2003 => "narrowing conversion in list-initialization",
            ErrorCode::E2004 => "brace-list elements have different types",
            ErrorCode::E2005 => "cannot deduce placeholder type",
            ErrorCode::E2006 => "scope cannot be nested here",
            ErrorCode::E2007 => "unbalanced scope",
            ErrorCode::E2008 => "cannot assign to immutable binding",
            ErrorCode::E2009 => "missing required initializer",
            ErrorCode::E2010 => "duplicate label",
            ErrorCode::E2011 => "label outside of a function",
            ErrorCode::E2012 => "too many initializers",
            ErrorCode::E9001 => "error limit reached",
            ErrorCode::W0001 => "multi-character literal",
            ErrorCode::W2001 => "implicit narrowing conversion",
        }
    }

    /// Check if this is a literal classification error (E0xxx range).
    pub fn is_literal_error(&self) -> bool {
        matches!(self, ErrorCode::E0001 | ErrorCode::E0002)
    }

    /// Check if this is a warning code (Wxxx range).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W0001 | ErrorCode::W2001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"` or `"w2001"`.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
