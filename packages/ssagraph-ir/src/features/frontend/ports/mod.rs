//! Language frontend port
//!
//! A frontend owns one tree-sitter grammar and walks its syntax tree into an
//! [`SsaBuilder`]. Parsing is pure and runs on pipeline workers; building
//! runs on the single SSA thread.

use crate::errors::{Result, SsaGraphError};
use crate::features::frontend::domain::{ConstructKind, ExprKind};
use crate::features::ssa::{ImportRequest, ModuleSpec, SsaBuilder};
use crate::shared::models::Span;
use crate::shared::ports::Language;
use tree_sitter::{Language as TSLanguage, Node as TSNode, Parser, Tree};

/// A parsed source file, ready for SSA construction
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    pub path: String,
    pub language: Language,
    pub source: String,
    pub tree: Tree,
}

impl ParsedUnit {
    pub fn root(&self) -> TSNode<'_> {
        self.tree.root_node()
    }

    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// File name without directory and extension (`Foo` for `a/b/Foo.java`)
    pub fn file_stem(&self) -> &str {
        let name = self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path);
        name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
    }
}

pub trait LanguageFrontend: Send + Sync {
    /// Get the tree-sitter grammar for `path`
    fn tree_sitter_language(&self, path: &str) -> TSLanguage;

    /// Language this frontend builds
    fn language(&self) -> Language;

    /// Check if this frontend handles a file extension
    fn supports(&self, ext: &str) -> bool {
        self.language()
            .extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Map a statement node kind onto the closed construct set
    fn map_construct_kind(&self, ts_kind: &str) -> ConstructKind;

    /// Map an expression node kind onto the closed expression set
    fn map_expr_kind(&self, ts_kind: &str) -> ExprKind;

    /// Parse `source`; fails only when the grammar cannot be loaded
    fn parse(&self, path: &str, source: &str) -> Result<ParsedUnit> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.tree_sitter_language(path))
            .map_err(|e| SsaGraphError::parse_error(format!("{}: {}", self.language(), e)))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SsaGraphError::parse_error(format!("{}: parser returned no tree", path)))?;
        Ok(ParsedUnit {
            path: path.to_string(),
            language: self.language(),
            source: source.to_string(),
            tree,
        })
    }

    /// Module identity of a parsed unit (key, package)
    fn module_spec(&self, unit: &ParsedUnit) -> ModuleSpec {
        ModuleSpec::new(unit.path.clone(), self.language())
    }

    /// Candidate module keys an import may name, most specific first
    fn import_candidates(&self, _request: &ImportRequest) -> Vec<String> {
        Vec::new()
    }

    /// Walk the unit's tree inside the current builder
    fn build(&self, builder: &mut SsaBuilder, unit: &ParsedUnit);
}

/// Extension trait to convert tree-sitter nodes to Span
pub trait SpanExt {
    fn to_span(&self) -> Span;
}

impl SpanExt for TSNode<'_> {
    fn to_span(&self) -> Span {
        Span::new(
            self.start_position().row as u32 + 1,
            self.start_position().column as u32,
            self.end_position().row as u32 + 1,
            self.end_position().column as u32,
        )
        .with_bytes(self.start_byte(), self.end_byte())
    }
}
