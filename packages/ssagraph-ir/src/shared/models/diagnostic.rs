//! Build diagnostics
//!
//! Per-construct problems never abort a build. They are recorded on the
//! program as `(Severity, Tag, Message, Span)` records instead.

use super::Span;
use serde::{Deserialize, Serialize};

/// Diagnostic severity (ordered: `Hint < Info < Warn < Error`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hint" => Some(Severity::Hint),
            "info" => Some(Severity::Info),
            "warn" | "warning" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Hint
    }
}

/// What kind of problem a diagnostic reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticTag {
    /// Read of a name with no reaching definition anywhere
    UndefinedValue,
    /// Construct the adapter does not lower
    UnsupportedConstruct,
    /// Statement after return / break / continue
    UnreachableCode,
    /// break / continue with no matching target
    InvalidJump,
    /// Switch expression whose value is read without a default arm
    SwitchNoMatch,
    /// Block statement with nothing in it
    EmptyBlock,
    /// Syntax error node reported by the parser
    SyntaxError,
    /// Import that could not be resolved to a module or symbol
    UnresolvedImport,
    /// Builder API used out of order
    BuilderMisuse,
}

impl DiagnosticTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticTag::UndefinedValue => "undefined-value",
            DiagnosticTag::UnsupportedConstruct => "unsupported-construct",
            DiagnosticTag::UnreachableCode => "unreachable-code",
            DiagnosticTag::InvalidJump => "invalid-jump",
            DiagnosticTag::SwitchNoMatch => "switch-no-match",
            DiagnosticTag::EmptyBlock => "empty-block",
            DiagnosticTag::SyntaxError => "syntax-error",
            DiagnosticTag::UnresolvedImport => "unresolved-import",
            DiagnosticTag::BuilderMisuse => "builder-misuse",
        }
    }
}

impl std::fmt::Display for DiagnosticTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub tag: DiagnosticTag,
    pub message: String,
    pub span: Span,
    /// Source file the diagnostic belongs to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, tag: DiagnosticTag, message: impl Into<String>) -> Self {
        Self {
            severity,
            tag,
            message: message.into(),
            span: Span::zero(),
            file: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity.as_str(), self.tag, self.message)?;
        if let Some(ref file) = self.file {
            write!(f, " ({}:{})", file, self.span)?;
        } else if !self.span.is_zero() {
            write!(f, " ({})", self.span)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Hint < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert_eq!(Severity::from_str("WARNING"), Some(Severity::Warn));
        assert_eq!(Severity::from_str("fatal"), None);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(
            Severity::Info,
            DiagnosticTag::UndefinedValue,
            "value undefined: a",
        )
        .with_span(Span::new(3, 4, 3, 5))
        .with_file("Main.java");

        assert_eq!(
            diag.to_string(),
            "[info] undefined-value: value undefined: a (Main.java:3:4-3:5)"
        );
    }
}
