//! Shared models

mod diagnostic;
mod span;

pub use diagnostic::{Diagnostic, DiagnosticTag, Severity};
pub use span::Span;
