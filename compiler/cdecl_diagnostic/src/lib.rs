//! Diagnostic system for resolver errors.
//!
//! Every diagnostic carries:
//! - an error code for searchability
//! - a message (what went wrong)
//! - a primary span (where it went wrong)
//! - notes and suggestions (why, and how to fix it)
//!
//! Diagnostics are collected per compilation unit in a [`DiagnosticQueue`],
//! which orders them by position and enforces an error limit.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
