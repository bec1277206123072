//! Source location types
//!
//! These types represent positions in source code. Lines and columns are
//! 1-based / 0-based like the tree-sitter adapters report them; byte offsets
//! index the original source text.

use serde::{Deserialize, Serialize};

/// Span in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
            start_byte: 0,
            end_byte: 0,
        }
    }

    /// Attach byte offsets to a line/column span
    pub fn with_bytes(mut self, start_byte: usize, end_byte: usize) -> Self {
        self.start_byte = start_byte;
        self.end_byte = end_byte;
        self
    }

    /// Create a zero span (0:0-0:0)
    pub fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    pub fn contains_byte(&self, offset: usize) -> bool {
        self.start_byte <= offset && offset < self.end_byte
    }

    pub fn line_count(&self) -> u32 {
        if self.end_line >= self.start_line {
            self.end_line - self.start_line + 1
        } else {
            0
        }
    }

    /// Slice the covered text out of `source`
    ///
    /// Returns `None` for zero spans or offsets outside `source`.
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        if self.end_byte <= self.start_byte {
            return None;
        }
        source.get(self.start_byte..self.end_byte)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains_line() {
        let span = Span::new(10, 0, 20, 0);
        assert!(span.contains_line(10));
        assert!(span.contains_line(15));
        assert!(span.contains_line(20));
        assert!(!span.contains_line(9));
        assert!(!span.contains_line(21));
    }

    #[test]
    fn test_span_line_count() {
        let span = Span::new(10, 0, 20, 0);
        assert_eq!(span.line_count(), 11);
    }

    #[test]
    fn test_span_text_slices_source() {
        let source = "a = foo(b);";
        let span = Span::new(1, 4, 1, 10).with_bytes(4, 10);
        assert_eq!(span.text(source), Some("foo(b)"));
        assert!(span.contains_byte(4));
        assert!(!span.contains_byte(10));
        assert_eq!(Span::zero().text(source), None);
    }
}
